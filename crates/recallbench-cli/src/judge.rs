//! LLM-as-judge providers.
//!
//! Providers are tried in order until one returns a reply that contains a
//! parsable score. Every failure is logged and skipped; an exhausted chain
//! means "no judge score", never zero.

use std::path::Path;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use serde_json::{json, Value};
use tracing::{debug, warn};

use recallbench_core::scoring::extract_judge_score;

use crate::config::ScoringConfig;

const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
const MAX_REPLY_TOKENS: u32 = 10;

pub trait JudgeProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Send the rubric prompt and return the raw reply text.
    fn rate(&self, prompt: &str) -> Result<String>;
}

// ---------------------------------------------------------------------------
// HTTP providers
// ---------------------------------------------------------------------------

fn post_json(req: ureq::Request, body: Value) -> Result<Value> {
    match req.send_json(body) {
        Ok(resp) => resp.into_json::<Value>().context("judge reply is not JSON"),
        Err(ureq::Error::Status(code, resp)) => {
            let body = resp.into_string().unwrap_or_default();
            bail!("HTTP {code}: {}", body.chars().take(200).collect::<String>())
        }
        Err(e) => bail!("{e}"),
    }
}

pub struct AnthropicJudge {
    agent: ureq::Agent,
    api_key: String,
    model: String,
}

impl AnthropicJudge {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            api_key,
            model,
        }
    }
}

fn anthropic_reply_text(json: &Value) -> Option<String> {
    json.get("content")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(|s| s.trim().to_string())
}

impl JudgeProvider for AnthropicJudge {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn rate(&self, prompt: &str) -> Result<String> {
        let req = self
            .agent
            .post(ANTHROPIC_URL)
            .set("x-api-key", &self.api_key)
            .set("anthropic-version", "2023-06-01");
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_REPLY_TOKENS,
            "messages": [{"role": "user", "content": prompt}],
        });
        let reply = post_json(req, body)?;
        anthropic_reply_text(&reply).context("no text block in reply")
    }
}

pub struct OpenRouterJudge {
    agent: ureq::Agent,
    api_key: String,
    model: String,
}

impl OpenRouterJudge {
    pub fn new(api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
            api_key,
            model,
        }
    }
}

fn chat_reply_text(json: &Value) -> Option<String> {
    json.get("choices")?
        .get(0)?
        .get("message")?
        .get("content")?
        .as_str()
        .map(|s| s.trim().to_string())
}

impl JudgeProvider for OpenRouterJudge {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn rate(&self, prompt: &str) -> Result<String> {
        let req = self
            .agent
            .post(OPENROUTER_URL)
            .set("Authorization", &format!("Bearer {}", self.api_key));
        let body = json!({
            "model": self.model,
            "max_tokens": MAX_REPLY_TOKENS,
            "messages": [{"role": "user", "content": prompt}],
        });
        let reply = post_json(req, body)?;
        chat_reply_text(&reply).context("no message content in reply")
    }
}

// ---------------------------------------------------------------------------
// Local CLI provider
// ---------------------------------------------------------------------------

/// Uses the locally authenticated agent CLI; no API key needed.
pub struct CliJudge {
    binary: String,
    timeout: Duration,
}

impl CliJudge {
    pub fn new(binary: String, timeout: Duration) -> Self {
        Self { binary, timeout }
    }
}

impl JudgeProvider for CliJudge {
    fn name(&self) -> &str {
        "cli"
    }

    fn rate(&self, prompt: &str) -> Result<String> {
        let mut child = Command::new(&self.binary)
            .arg("-p")
            .arg(prompt)
            .arg("--max-turns")
            .arg("1")
            .current_dir(std::env::temp_dir().as_path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("failed to spawn '{}'", self.binary))?;

        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(_status)) => break,
                Ok(None) => {
                    if start.elapsed() > self.timeout {
                        let _ = child.kill();
                        let _ = child.wait();
                        bail!("judge timed out after {}s", self.timeout.as_secs());
                    }
                    std::thread::sleep(Duration::from_millis(200));
                }
                Err(e) => bail!("error waiting for judge: {e}"),
            }
        }

        let output = child
            .wait_with_output()
            .context("failed to get judge output")?;
        if !output.status.success() {
            bail!("judge exited with {}", output.status);
        }
        let text = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if text.is_empty() {
            bail!("judge produced no output");
        }
        Ok(text)
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

pub struct JudgeChain {
    providers: Vec<Box<dyn JudgeProvider>>,
}

impl JudgeChain {
    pub fn new(providers: Vec<Box<dyn JudgeProvider>>) -> Self {
        Self { providers }
    }

    /// A chain that never scores.
    pub fn disabled() -> Self {
        Self::new(Vec::new())
    }

    /// Configured API providers in order (Anthropic, then OpenRouter); the
    /// local CLI only when neither key is set.
    pub fn from_config(
        config: &ScoringConfig,
        anthropic_key: Option<String>,
        openrouter_key: Option<String>,
        cli_binary: &str,
    ) -> Self {
        let timeout = Duration::from_secs(config.judge_timeout_secs);
        let mut providers: Vec<Box<dyn JudgeProvider>> = Vec::new();
        if let Some(key) = anthropic_key.filter(|k| !k.is_empty()) {
            providers.push(Box::new(AnthropicJudge::new(
                key,
                config.anthropic_model.clone(),
                timeout,
            )));
        }
        if let Some(key) = openrouter_key.filter(|k| !k.is_empty()) {
            providers.push(Box::new(OpenRouterJudge::new(
                key,
                config.openrouter_model.clone(),
                timeout,
            )));
        }
        if providers.is_empty() && config.cli_judge {
            providers.push(Box::new(CliJudge::new(cli_binary.to_string(), timeout)));
        }
        Self::new(providers)
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_enabled(&self) -> bool {
        !self.providers.is_empty()
    }

    /// First parsable score from the first provider that yields one.
    pub fn score(&self, prompt: &str) -> Option<f64> {
        for provider in &self.providers {
            match provider.rate(prompt) {
                Ok(reply) => match extract_judge_score(&reply) {
                    Some(score) => {
                        debug!("judge {} scored {score}", provider.name());
                        return Some(score);
                    }
                    None => warn!("judge {} reply has no score: {reply:?}", provider.name()),
                },
                Err(e) => warn!("judge {} failed: {e:#}", provider.name()),
            }
        }
        None
    }
}

/// Whether `binary` resolves to something runnable, for prerequisite output.
pub fn binary_available(binary: &str) -> bool {
    if binary.contains(std::path::MAIN_SEPARATOR) {
        return Path::new(binary).is_file();
    }
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(binary).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;

    use super::*;

    /// Replies with a fixed string (or fails) and counts calls.
    pub struct FixedJudge {
        pub reply: Option<&'static str>,
        pub calls: AtomicUsize,
    }

    impl FixedJudge {
        pub fn replying(reply: &'static str) -> Self {
            Self {
                reply: Some(reply),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl JudgeProvider for FixedJudge {
        fn name(&self) -> &str {
            "fixed"
        }

        fn rate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .map(String::from)
                .ok_or_else(|| anyhow!("provider unavailable"))
        }
    }

    impl JudgeProvider for std::sync::Arc<FixedJudge> {
        fn name(&self) -> &str {
            "fixed"
        }

        fn rate(&self, prompt: &str) -> Result<String> {
            self.as_ref().rate(prompt)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    use super::testing::FixedJudge;
    use super::*;

    fn chain_of(judges: &[Arc<FixedJudge>]) -> JudgeChain {
        JudgeChain::new(
            judges
                .iter()
                .map(|j| Box::new(j.clone()) as Box<dyn JudgeProvider>)
                .collect(),
        )
    }

    #[test]
    fn test_reply_parsers() {
        let anthropic = json!({"content": [{"type": "text", "text": " 8.5\n"}]});
        assert_eq!(anthropic_reply_text(&anthropic).as_deref(), Some("8.5"));
        let chat = json!({"choices": [{"message": {"role": "assistant", "content": "7"}}]});
        assert_eq!(chat_reply_text(&chat).as_deref(), Some("7"));
        assert_eq!(chat_reply_text(&json!({"choices": []})), None);
    }

    #[test]
    fn test_chain_falls_through_failures_and_unparsable() {
        let failing = Arc::new(FixedJudge::failing());
        let chatty = Arc::new(FixedJudge::replying("excellent!"));
        let good = Arc::new(FixedJudge::replying("I'd rate this a 9 out of 10"));
        let chain = chain_of(&[failing.clone(), chatty.clone(), good]);
        assert_eq!(chain.score("p"), Some(9.0));
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
        assert_eq!(chatty.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_chain_stops_at_first_score() {
        let first = Arc::new(FixedJudge::replying("7.5"));
        let second = Arc::new(FixedJudge::replying("2"));
        let chain = chain_of(&[first, second.clone()]);
        assert_eq!(chain.score("p"), Some(7.5));
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_exhausted_chain_is_none() {
        let chain = chain_of(&[Arc::new(FixedJudge::failing())]);
        assert_eq!(chain.score("p"), None);
        assert_eq!(JudgeChain::disabled().score("p"), None);
    }

    #[test]
    fn test_from_config_order() {
        let cfg = ScoringConfig::default();
        let both = JudgeChain::from_config(&cfg, Some("a".into()), Some("o".into()), "claude");
        assert_eq!(both.provider_names(), vec!["anthropic", "openrouter"]);

        let none = JudgeChain::from_config(&cfg, None, Some(String::new()), "claude");
        assert_eq!(none.provider_names(), vec!["cli"]);

        let off = ScoringConfig {
            cli_judge: false,
            ..ScoringConfig::default()
        };
        assert!(!JudgeChain::from_config(&off, None, None, "claude").is_enabled());
    }

    #[cfg(unix)]
    #[test]
    fn test_cli_judge_reads_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("judge.sh");
        std::fs::write(&script, "#!/bin/sh\necho 6.5\n").unwrap();
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let judge = CliJudge::new(script.to_string_lossy().into_owned(), Duration::from_secs(10));
        assert_eq!(judge.rate("prompt").unwrap(), "6.5");
        assert!(binary_available(&script.to_string_lossy()));
        assert!(!binary_available("definitely-not-a-real-binary-xyz"));
    }
}
