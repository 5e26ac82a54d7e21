//! Configuration loading from TOML files.
//!
//! Lookup order:
//! 1. `$RECALLBENCH_CONFIG` environment variable
//! 2. `~/.config/recallbench/config.toml`
//! 3. Built-in defaults (everything is optional)

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use recallbench_core::ScoringWeights;

/// Top-level configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub agent: AgentConfig,
    pub run: RunConfig,
    pub scoring: ScoringConfig,
    /// Scenario id → repository-relative files, overriding the built-in map.
    pub explicit_files: BTreeMap<String, Vec<String>>,
}

/// Memory service endpoint.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub base_url: String,
    /// SSE tool endpoint handed to the agent. Default: `<base_url>/mcp/sse`.
    pub sse_url: Option<String>,
    pub timeout_secs: u64,
}

/// Agent runtime settings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub binary: String,
    pub model: Option<String>,
    pub max_turns: u32,
    /// Wall-clock cap per session.
    pub timeout_secs: u64,
}

/// Orchestration settings.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub cooldown_secs: u64,
    /// Repository the agent answers questions about. Default: current directory.
    pub repo_root: Option<String>,
    /// Where result documents land. Default: platform-specific data dir.
    pub results_dir: Option<String>,
    pub tier_recall_limit: usize,
    pub recall_quality_limit: usize,
}

/// Composite weights and judge providers.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub keyword_weight: f64,
    pub judge_weight: f64,
    pub anthropic_model: String,
    pub openrouter_model: String,
    pub judge_timeout_secs: u64,
    /// Fall back to the local CLI judge when no API key is set.
    pub cli_judge: bool,
}

// --- Defaults ---

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:7437".into(),
            sse_url: None,
            timeout_secs: 10,
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            binary: "claude".into(),
            model: None,
            max_turns: 20,
            timeout_secs: 120,
        }
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 5,
            repo_root: None,
            results_dir: None,
            tier_recall_limit: 5,
            recall_quality_limit: 8,
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let weights = ScoringWeights::default();
        Self {
            keyword_weight: weights.keyword,
            judge_weight: weights.judge,
            anthropic_model: "claude-3-haiku-20240307".into(),
            openrouter_model: "gpt-4".into(),
            judge_timeout_secs: 30,
            cli_judge: true,
        }
    }
}

// --- Derived values ---

impl ServiceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn sse_url(&self) -> String {
        self.sse_url
            .clone()
            .unwrap_or_else(|| format!("{}/mcp/sse", self.base_url.trim_end_matches('/')))
    }
}

impl RunConfig {
    pub fn repo_root(&self) -> PathBuf {
        self.repo_root
            .as_ref()
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn results_dir(&self) -> PathBuf {
        self.results_dir
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(default_results_dir)
    }
}

impl ScoringConfig {
    pub fn weights(&self) -> ScoringWeights {
        ScoringWeights {
            keyword: self.keyword_weight,
            judge: self.judge_weight,
        }
    }
}

fn default_results_dir() -> PathBuf {
    directories::ProjectDirs::from("dev", "recallbench", "recallbench")
        .map(|dirs| dirs.data_dir().join("results"))
        .unwrap_or_else(|| PathBuf::from("results"))
}

/// Load config from disk. Returns defaults if no config file exists.
pub fn load_config() -> Result<Config> {
    let path = config_path();

    if let Some(p) = &path {
        if p.exists() {
            let content =
                std::fs::read_to_string(p).with_context(|| format!("reading {}", p.display()))?;
            let config: Config =
                toml::from_str(&content).with_context(|| format!("parsing {}", p.display()))?;
            return Ok(config);
        }
    }

    Ok(Config::default())
}

/// Resolve the config file path.
fn config_path() -> Option<PathBuf> {
    if let Ok(p) = std::env::var("RECALLBENCH_CONFIG") {
        return Some(PathBuf::from(p));
    }

    dirs_home().map(|home| home.join(".config").join("recallbench").join("config.toml"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(PathBuf::from)
}

/// Show the active config path (for `recallbench config`).
pub fn show_config_path() -> String {
    match config_path() {
        Some(p) if p.exists() => format!("{} (loaded)", p.display()),
        Some(p) => format!("{} (not found, using defaults)", p.display()),
        None => "no config path resolved (using defaults)".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.agent.max_turns, 20);
        assert_eq!(config.run.cooldown_secs, 5);
        assert_eq!(config.scoring.weights(), ScoringWeights::default());
        assert_eq!(config.service.sse_url(), "http://127.0.0.1:7437/mcp/sse");
        assert!(config.explicit_files.is_empty());
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml_str = r#"
[run]
cooldown_secs = 0
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.run.cooldown_secs, 0);
        // Other fields should be defaults
        assert_eq!(config.run.tier_recall_limit, 5);
        assert_eq!(config.agent.binary, "claude");
    }

    #[test]
    fn test_parse_full_toml() {
        let toml_str = r#"
[service]
base_url = "http://memory.local:9000/"
timeout_secs = 3

[agent]
binary = "/opt/claude"
model = "sonnet"
max_turns = 8
timeout_secs = 60

[run]
repo_root = "/src/project"
results_dir = "/tmp/results"
tier_recall_limit = 3

[scoring]
keyword_weight = 0.5
judge_weight = 0.5
cli_judge = false

[explicit_files]
ar_1_encryption = ["src/lib.rs"]
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.service.sse_url(), "http://memory.local:9000/mcp/sse");
        assert_eq!(config.service.timeout(), Duration::from_secs(3));
        assert_eq!(config.agent.model.as_deref(), Some("sonnet"));
        assert_eq!(config.run.repo_root(), PathBuf::from("/src/project"));
        assert_eq!(config.run.results_dir(), PathBuf::from("/tmp/results"));
        assert!(!config.scoring.cli_judge);
        assert_eq!(config.explicit_files["ar_1_encryption"], vec!["src/lib.rs"]);
    }

    #[test]
    fn test_effective_config_renders_as_toml() {
        let rendered = toml::to_string_pretty(&Config::default()).unwrap();
        assert!(rendered.contains("[service]"));
        assert!(rendered.contains("max_turns = 20"));
    }

    #[test]
    fn test_show_config_path_not_empty() {
        assert!(!show_config_path().is_empty());
    }
}
