mod config;
mod judge;
mod modes;
mod orchestrator;
mod recall_quality;
mod results;
mod scoring;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tokio::sync::watch;

use recallbench_agent::{AgentRuntime, ClaudeCliRuntime, DirectPlatform, GatewayPlatform, Platform};
use recallbench_client::HttpMemoryClient;
use recallbench_core::catalog::{self, Suite};
use recallbench_core::{reseed, AggregateStats, Category, GroupStats, MemoryService, Scenario};

use config::Config;
use judge::JudgeChain;
use modes::{ExplicitContextMode, MemoryRecallMode, Mode, NoContextMode, TierRecallMode};
use orchestrator::Orchestrator;
use results::ResultsDocument;
use scoring::Scorer;

#[derive(Parser)]
#[command(
    name = "recallbench",
    version,
    about = "Benchmark memory-augmented AI agents against a fixed scenario catalog"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the benchmark suite
    Run(RunArgs),

    /// Probe the memory service per tier, no agent involved
    RecallQuality {
        /// Only the three-scenario quick subset
        #[arg(long)]
        quick: bool,

        /// Directory for the results file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List catalog scenarios
    List {
        /// Only scenarios of this category (e.g. "multi-hop", "ar")
        #[arg(long)]
        category: Option<Category>,
    },

    /// Check the memory service
    Health,

    /// Print the tables of a saved results file
    Summary {
        /// Path to a benchmark_results_*.json file
        file: PathBuf,
    },

    /// Show the active configuration
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// Which platforms to run against
    #[arg(long, default_value = "both")]
    platform: PlatformChoice,

    /// Which context modes to compare
    #[arg(long, default_value = "all")]
    mode: ModeChoice,

    /// Run only these scenario ids (repeatable)
    #[arg(long = "scenario")]
    scenarios: Vec<String>,

    /// Only the three-scenario quick subset
    #[arg(long)]
    quick: bool,

    /// Which scenario suite to run
    #[arg(long, default_value = "core")]
    suite: SuiteChoice,

    /// Skip the LLM judge; composite falls back to keyword score
    #[arg(long)]
    no_judge: bool,

    /// Directory for the results file
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum PlatformChoice {
    Direct,
    Gateway,
    Both,
}

#[derive(Clone, Copy, ValueEnum)]
enum SuiteChoice {
    Core,
    Conversational,
    Comprehensive,
    All,
}

impl SuiteChoice {
    fn suites(self) -> Vec<Suite> {
        match self {
            SuiteChoice::Core => vec![Suite::Core],
            SuiteChoice::Conversational => vec![Suite::Conversational],
            SuiteChoice::Comprehensive => vec![Suite::Comprehensive],
            SuiteChoice::All => Suite::ALL.to_vec(),
        }
    }

    fn label(self) -> String {
        self.suites()
            .iter()
            .map(Suite::to_string)
            .collect::<Vec<_>>()
            .join("+")
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeChoice {
    All,
    NoContext,
    Explicit,
    Memory,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = config::load_config()?;

    match cli.command {
        Commands::Run(args) => cmd_run(&config, args).await,
        Commands::RecallQuality { quick, output } => cmd_recall_quality(&config, quick, output),
        Commands::List { category } => {
            cmd_list(&config, category);
            Ok(())
        }
        Commands::Health => cmd_health(&config),
        Commands::Summary { file } => cmd_summary(&file),
        Commands::Config => cmd_config(&config),
    }
}

// ---------------------------------------------------------------------------
// Run
// ---------------------------------------------------------------------------

fn memory_client(config: &Config) -> Arc<dyn MemoryService> {
    Arc::new(HttpMemoryClient::new(
        &config.service.base_url,
        config.service.timeout(),
    ))
}

fn suite_ids(quick: bool, suite: SuiteChoice, explicit: &[String]) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    let scenarios = if quick {
        catalog::quick_scenarios()
    } else {
        suite.suites().into_iter().flat_map(Suite::scenarios).collect()
    };
    scenarios.into_iter().map(|s| s.id).collect()
}

/// Catalog defaults, with per-scenario overrides from the config file.
fn explicit_file_map(config: &Config) -> BTreeMap<String, Vec<String>> {
    let mut files = catalog::explicit_files();
    files.extend(config.explicit_files.clone());
    files
}

fn build_modes(
    choice: ModeChoice,
    config: &Config,
    service: &Arc<dyn MemoryService>,
) -> Vec<Box<dyn Mode>> {
    let repo_root = config.run.repo_root();
    let no_context = || Box::new(NoContextMode::new(repo_root.clone())) as Box<dyn Mode>;
    let explicit = || {
        Box::new(ExplicitContextMode::new(
            repo_root.clone(),
            explicit_file_map(config),
        )) as Box<dyn Mode>
    };
    let memory = || {
        Box::new(MemoryRecallMode::new(
            service.clone(),
            repo_root.clone(),
            config.service.sse_url(),
        )) as Box<dyn Mode>
    };
    match choice {
        ModeChoice::All => vec![no_context(), explicit(), memory()],
        ModeChoice::NoContext => vec![no_context()],
        ModeChoice::Explicit => vec![explicit()],
        ModeChoice::Memory => vec![memory()],
    }
}

fn build_platforms(choice: PlatformChoice, config: &Config) -> Vec<Arc<dyn Platform>> {
    let runtime: Arc<dyn AgentRuntime> = Arc::new(ClaudeCliRuntime::new(
        config.agent.binary.clone(),
        config.agent.model.clone(),
        Duration::from_secs(config.agent.timeout_secs),
    ));
    let direct = || Arc::new(DirectPlatform::new(runtime.clone())) as Arc<dyn Platform>;
    let gateway = || Arc::new(GatewayPlatform::new(runtime.clone())) as Arc<dyn Platform>;
    match choice {
        PlatformChoice::Direct => vec![direct()],
        PlatformChoice::Gateway => vec![gateway()],
        PlatformChoice::Both => vec![direct(), gateway()],
    }
}

fn build_judge(config: &Config, disabled: bool) -> JudgeChain {
    if disabled {
        return JudgeChain::disabled();
    }
    JudgeChain::from_config(
        &config.scoring,
        std::env::var("ANTHROPIC_API_KEY").ok(),
        std::env::var("OPENROUTER_API_KEY").ok(),
        &config.agent.binary,
    )
}

fn check_health(service: &dyn MemoryService, base_url: &str) -> Result<()> {
    match service.health() {
        Ok(h) => {
            eprintln!(
                "Memory service: {} at {base_url}{}",
                h.status,
                h.version.map(|v| format!(" (v{v})")).unwrap_or_default()
            );
            Ok(())
        }
        Err(e) => bail!("memory service at {base_url} is not reachable: {e}"),
    }
}

async fn cmd_run(config: &Config, args: RunArgs) -> Result<()> {
    let service = memory_client(config);
    let ids = suite_ids(args.quick, args.suite, &args.scenarios);
    let judge_chain = build_judge(config, args.no_judge);

    eprintln!("Prerequisites:");
    eprintln!(
        "  agent binary '{}': {}",
        config.agent.binary,
        if judge::binary_available(&config.agent.binary) {
            "found"
        } else {
            "NOT FOUND"
        }
    );
    if judge_chain.is_enabled() {
        eprintln!("  judge: {}", judge_chain.provider_names().join(" -> "));
    } else {
        eprintln!("  judge: disabled (composite = keyword score)");
    }

    let orchestrator = Orchestrator::new(
        build_modes(args.mode, config, &service),
        build_platforms(args.platform, config),
        Scorer::new(judge_chain, config.scoring.weights()),
    )
    .with_tier(TierRecallMode::new(
        service.clone(),
        config.run.repo_root(),
        config.run.tier_recall_limit,
    ))
    .with_corpus(service.clone())
    .with_cooldown(Duration::from_secs(config.run.cooldown_secs))
    .with_max_turns(config.agent.max_turns);

    if orchestrator.needs_memory(&ids) {
        check_health(service.as_ref(), &config.service.base_url)?;
    }

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("\nInterrupted; saving collected results.");
            let _ = cancel_tx.send(true);
        }
    });

    let outcome = orchestrator.run(&ids, cancel_rx).await;
    let doc = ResultsDocument::new(
        args.quick,
        args.suite.label(),
        orchestrator.platform_names(),
        orchestrator.mode_names(),
        outcome.plan.total(),
        outcome.records,
        outcome.interrupted,
    );
    let dir = args.output.unwrap_or_else(|| config.run.results_dir());
    let path = results::save(&dir, &doc)?;

    print_summary(&doc.summary);
    println!("Results: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Recall quality
// ---------------------------------------------------------------------------

fn cmd_recall_quality(config: &Config, quick: bool, output: Option<PathBuf>) -> Result<()> {
    let service = memory_client(config);
    check_health(service.as_ref(), &config.service.base_url)?;

    let corpus = catalog::seed_corpus();
    let seeded = reseed(service.as_ref(), &corpus, catalog::CORPUS_LABEL)
        .context("seeding baseline corpus")?;
    eprintln!("Seeded {}/{} corpus records", seeded.accepted, seeded.attempted);

    // Only the core suite is answerable from the baseline corpus.
    let scenarios: Vec<Scenario> = if quick {
        catalog::quick_scenarios()
    } else {
        Suite::Core.scenarios()
    };
    let doc = recall_quality::evaluate(
        service.as_ref(),
        &scenarios,
        config.run.recall_quality_limit,
    );
    let dir = output.unwrap_or_else(|| config.run.results_dir());
    let path = results::save_document(&dir, "recall_quality", &doc)?;

    recall_quality::print_summary(&doc);
    println!("Results: {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Small commands
// ---------------------------------------------------------------------------

fn print_scenarios(title: &str, scenarios: &[Scenario]) {
    println!("\n{title}");
    println!("{:<30} {:<24} {:>6}  question", "id", "category", "quick");
    println!("{}", "─".repeat(90));
    for s in scenarios {
        let quick = if catalog::QUICK_IDS.contains(&s.id.as_str()) {
            "yes"
        } else {
            ""
        };
        println!(
            "{:<30} {:<24} {:>6}  {}",
            s.id,
            s.category.to_string(),
            quick,
            s.question
        );
    }
}

fn cmd_list(config: &Config, category: Option<Category>) {
    if let Some(c) = category {
        let scenarios = catalog::by_category(c);
        print_scenarios(&format!("{c} scenarios"), &scenarios);
        println!("\n{} scenarios", scenarios.len());
        return;
    }

    let mut total = 0;
    for suite in Suite::ALL {
        let scenarios = suite.scenarios();
        total += scenarios.len();
        print_scenarios(&format!("{suite} suite"), &scenarios);
    }
    println!("\n{total} scenarios");

    println!("\nModes:");
    for mode in build_modes(ModeChoice::All, config, &memory_client(config)) {
        println!("  {:<12} {}", mode.name(), mode.description());
    }
    for tier in recallbench_core::Tier::ALL {
        println!(
            "  {:<12} {} recall, no tools (tier-comparison scenarios)",
            TierRecallMode::mode_name(tier),
            tier.search_method()
        );
    }
}

fn cmd_health(config: &Config) -> Result<()> {
    let service = memory_client(config);
    check_health(service.as_ref(), &config.service.base_url)?;
    println!("ok");
    Ok(())
}

fn cmd_summary(file: &std::path::Path) -> Result<()> {
    let doc = results::load(file)?;
    println!(
        "Session {} at {}{}",
        doc.session_id,
        doc.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
        if doc.interrupted { " (interrupted)" } else { "" }
    );
    println!(
        "{} of {} planned runs ({} suite)",
        doc.total_runs, doc.planned_runs, doc.suite
    );
    print_summary(&doc.summary);
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    println!("Config: {}", config::show_config_path());
    println!();
    let rendered = toml::to_string_pretty(config).context("rendering config")?;
    println!("{rendered}");
    Ok(())
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

const TABLE_WIDTH: usize = 96;

fn print_summary(stats: &AggregateStats) {
    println!("\n{}", "\u{2550}".repeat(TABLE_WIDTH));
    println!(
        "Benchmark summary: {} runs, {} scenarios",
        stats.total_runs, stats.total_scenarios
    );
    print_group_table("Mode", &stats.by_mode);
    print_group_table("Platform", &stats.by_platform);
    print_group_table("Scenario", &stats.by_scenario);
    println!("{}", "\u{2550}".repeat(TABLE_WIDTH));
}

fn print_group_table(title: &str, groups: &BTreeMap<String, GroupStats>) {
    println!("{}", "─".repeat(TABLE_WIDTH));
    println!(
        "{:<28} {:>5} {:>9} {:>7} {:>9} {:>8} {:>10} {:>7} {:>7}",
        title, "runs", "time", "tools", "tokens", "keyword", "composite", "judged", "errors"
    );
    for (name, g) in groups {
        println!(
            "{:<28} {:>5} {:>8.1}s {:>7.1} {:>9.0} {:>8.2} {:>10} {:>7} {:>7}",
            name,
            g.count,
            g.avg_elapsed_ms / 1000.0,
            g.avg_tool_calls,
            g.avg_total_tokens,
            g.avg_keyword_score,
            g.avg_composite_score
                .map(|c| format!("{c:.2}"))
                .unwrap_or_else(|| "-".into()),
            g.judged,
            g.errors
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_run_filters() {
        let cli = Cli::try_parse_from([
            "recallbench",
            "run",
            "--platform",
            "direct",
            "--mode",
            "no-context",
            "--scenario",
            "ar_1_encryption",
            "--scenario",
            "cr_1_pin_derivation",
            "--no-judge",
        ])
        .unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(matches!(args.platform, PlatformChoice::Direct));
        assert!(matches!(args.mode, ModeChoice::NoContext));
        assert_eq!(args.scenarios.len(), 2);
        assert!(args.no_judge);
    }

    #[test]
    fn test_suite_ids() {
        assert_eq!(suite_ids(true, SuiteChoice::All, &[]).len(), 3);
        assert_eq!(
            suite_ids(false, SuiteChoice::Core, &[]).len(),
            Suite::Core.scenarios().len()
        );
        assert_eq!(
            suite_ids(false, SuiteChoice::All, &[]).len(),
            catalog::all_scenarios().len()
        );
        let conversational = suite_ids(false, SuiteChoice::Conversational, &[]);
        assert!(conversational.contains(&"pref_1_coding_style".to_string()));
        assert!(!conversational.contains(&"ar_1_encryption".to_string()));
        let picked = vec!["ttl_1_deploy".to_string()];
        assert_eq!(suite_ids(true, SuiteChoice::Core, &picked), picked);
    }

    #[test]
    fn test_cli_parses_suite_and_category() {
        let cli = Cli::try_parse_from(["recallbench", "run", "--suite", "comprehensive"]).unwrap();
        let Commands::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert!(matches!(args.suite, SuiteChoice::Comprehensive));
        assert_eq!(SuiteChoice::All.label(), "core+conversational+comprehensive");

        let cli = Cli::try_parse_from(["recallbench", "list", "--category", "multi-hop"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::List {
                category: Some(Category::MultiHop)
            }
        ));
    }

    #[test]
    fn test_mode_filter() {
        let config = Config::default();
        let service = memory_client(&config);
        let names: Vec<String> = build_modes(ModeChoice::All, &config, &service)
            .iter()
            .map(|m| m.name().to_string())
            .collect();
        assert_eq!(names, vec!["no-context", "explicit", "memory"]);
        assert_eq!(build_modes(ModeChoice::Memory, &config, &service).len(), 1);
        assert_eq!(build_platforms(PlatformChoice::Both, &config).len(), 2);
    }

    #[test]
    fn test_config_overrides_explicit_files() {
        let mut config = Config::default();
        config
            .explicit_files
            .insert("ar_1_encryption".into(), vec!["docs/crypto.md".into()]);
        let files = explicit_file_map(&config);
        assert_eq!(files["ar_1_encryption"], vec!["docs/crypto.md"]);
        assert!(files.contains_key("cr_1_pin_derivation"));
    }
}
