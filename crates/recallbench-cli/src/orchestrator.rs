//! Runs the scenario × mode × platform matrix one cell at a time.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use recallbench_agent::{Platform, TaskOutcome, TaskSpec, ToolServers};
use recallbench_core::{
    catalog, reseed, MemoryRecord, MemoryService, ProbeTelemetry, RunRecord, Scenario, Tier,
};

use crate::modes::{Mode, TierRecallMode};
use crate::scoring::Scorer;

/// Run counts, known before the first run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Plan {
    pub regular: usize,
    pub tier: usize,
}

impl Plan {
    pub fn total(&self) -> usize {
        self.regular + self.tier
    }
}

/// Everything a finished (or interrupted) suite produced.
#[derive(Debug)]
pub struct SuiteOutcome {
    pub plan: Plan,
    pub records: Vec<RunRecord>,
    pub interrupted: bool,
}

/// A requested scenario id, resolved against the catalog.
enum Slot {
    Known(Scenario),
    Missing { id: String, error: String },
}

impl Slot {
    fn resolve(id: &str) -> Self {
        match catalog::find_by_id(id) {
            Ok(s) => Slot::Known(s),
            Err(e) => Slot::Missing {
                id: id.to_string(),
                error: e.to_string(),
            },
        }
    }

    fn is_tier(&self) -> bool {
        matches!(self, Slot::Known(s) if s.category.is_tier_comparison())
    }
}

pub struct Orchestrator {
    modes: Vec<Box<dyn Mode>>,
    platforms: Vec<Arc<dyn Platform>>,
    scorer: Arc<Scorer>,
    tier: Option<TierRecallMode>,
    corpus: Option<Arc<dyn MemoryService>>,
    cooldown: Duration,
    max_turns: u32,
}

impl Orchestrator {
    pub fn new(modes: Vec<Box<dyn Mode>>, platforms: Vec<Arc<dyn Platform>>, scorer: Scorer) -> Self {
        Self {
            modes,
            platforms,
            scorer: Arc::new(scorer),
            tier: None,
            corpus: None,
            cooldown: Duration::from_secs(5),
            max_turns: 20,
        }
    }

    pub fn with_tier(mut self, tier: TierRecallMode) -> Self {
        self.tier = Some(tier);
        self
    }

    /// Service the baseline corpus is re-seeded into before memory-backed suites.
    pub fn with_corpus(mut self, service: Arc<dyn MemoryService>) -> Self {
        self.corpus = Some(service);
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn mode_names(&self) -> Vec<String> {
        self.modes.iter().map(|m| m.name().to_string()).collect()
    }

    pub fn platform_names(&self) -> Vec<String> {
        self.platforms.iter().map(|p| p.name().to_string()).collect()
    }

    pub fn plan(&self, scenario_ids: &[String]) -> Plan {
        let slots: Vec<Slot> = scenario_ids.iter().map(|id| Slot::resolve(id)).collect();
        self.plan_slots(&slots)
    }

    fn plan_slots(&self, slots: &[Slot]) -> Plan {
        let tier = slots.iter().filter(|s| s.is_tier()).count();
        let regular = slots.len() - tier;
        Plan {
            regular: regular * self.modes.len() * self.platforms.len(),
            tier: tier * Tier::ALL.len() * self.platforms.len(),
        }
    }

    /// Whether the suite touches the memory service at all.
    pub fn needs_memory(&self, scenario_ids: &[String]) -> bool {
        let has_tier = scenario_ids
            .iter()
            .any(|id| matches!(catalog::find_by_id(id), Ok(s) if s.category.is_tier_comparison()));
        has_tier || self.modes.iter().any(|m| m.memory().is_some())
    }

    /// Run every cell in order. Setting `cancel` to true stops the sequence;
    /// records collected so far are returned.
    pub async fn run(
        &self,
        scenario_ids: &[String],
        mut cancel: watch::Receiver<bool>,
    ) -> SuiteOutcome {
        let slots: Vec<Slot> = scenario_ids.iter().map(|id| Slot::resolve(id)).collect();
        let plan = self.plan_slots(&slots);
        eprintln!(
            "Planned runs: {} regular + {} tier = {}",
            plan.regular,
            plan.tier,
            plan.total()
        );

        if self.needs_memory(scenario_ids) {
            self.seed_corpus();
        }

        let mut progress = Progress {
            done: 0,
            planned: plan.total(),
            cooldown: self.cooldown,
        };
        let mut records = Vec::with_capacity(plan.total());
        let interrupted = match self
            .run_slots(&slots, &mut progress, &mut records, &mut cancel)
            .await
        {
            Ok(()) => false,
            Err(Interrupted) => {
                warn!("interrupted after {} of {} runs", records.len(), plan.total());
                true
            }
        };

        SuiteOutcome {
            plan,
            records,
            interrupted,
        }
    }

    async fn run_slots(
        &self,
        slots: &[Slot],
        progress: &mut Progress,
        records: &mut Vec<RunRecord>,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<(), Interrupted> {
        for slot in slots.iter().filter(|s| !s.is_tier()) {
            for mode in &self.modes {
                for platform in &self.platforms {
                    let record = match slot {
                        Slot::Known(scenario) => {
                            progress.pause(cancel).await?;
                            progress.announce(&scenario.id, mode.name(), platform.name());
                            self.run_regular(scenario, mode.as_ref(), platform.as_ref(), cancel)
                                .await?
                        }
                        Slot::Missing { id, error } => {
                            warn!("{error}");
                            RunRecord::failed(id, mode.name(), platform.name(), error)
                        }
                    };
                    progress.report(&record);
                    records.push(record);
                }
            }
        }

        for slot in slots {
            let Slot::Known(scenario) = slot else { continue };
            if !scenario.category.is_tier_comparison() {
                continue;
            }
            for tier in Tier::ALL {
                let mode_name = TierRecallMode::mode_name(tier);
                for platform in &self.platforms {
                    progress.pause(cancel).await?;
                    progress.announce(&scenario.id, &mode_name, platform.name());
                    let record = match &self.tier {
                        Some(tier_mode) => {
                            self.run_tier(scenario, tier_mode, tier, platform.as_ref(), cancel)
                                .await?
                        }
                        None => RunRecord::failed(
                            &scenario.id,
                            &mode_name,
                            platform.name(),
                            "tier recall mode not configured",
                        ),
                    };
                    progress.report(&record);
                    records.push(record);
                }
            }
        }
        Ok(())
    }

    fn seed_corpus(&self) {
        let Some(service) = &self.corpus else {
            debug!("no corpus service configured, skipping seed");
            return;
        };
        let corpus = catalog::seed_corpus();
        match reseed(service.as_ref(), &corpus, catalog::CORPUS_LABEL) {
            Ok(outcome) if outcome.all_accepted() => {
                info!("seeded {} corpus records", outcome.accepted)
            }
            Ok(outcome) => warn!(
                "corpus seed: {} of {} records accepted",
                outcome.accepted, outcome.attempted
            ),
            Err(e) => warn!("corpus seed failed: {e}"),
        }
    }

    async fn run_regular(
        &self,
        scenario: &Scenario,
        mode: &dyn Mode,
        platform: &dyn Platform,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<RunRecord, Interrupted> {
        if scenario.category.is_cross_session() {
            prepare_prior_session(scenario, mode);
        }
        prepare_seeds(scenario, mode);

        let mut system_prompt = mode.system_prompt(None);
        if let Some(extra) = mode.supplementary_context(&scenario.id) {
            system_prompt = format!("{system_prompt}\n\n{extra}");
        }
        let task = TaskSpec {
            prompt: scenario.question.clone(),
            system_prompt: Some(system_prompt),
            allowed_tools: mode.allowed_tools(),
            max_turns: self.max_turns,
            working_dir: mode.working_dir(),
            tool_servers: mode.tool_servers(),
        };

        let outcome = interruptible(platform.run_task(&task), cancel).await?;
        let record = record_from(&scenario.id, mode.name(), platform.name(), outcome);
        Ok(self.score(scenario, record, cancel).await)
    }

    async fn run_tier(
        &self,
        scenario: &Scenario,
        tier_mode: &TierRecallMode,
        tier: Tier,
        platform: &dyn Platform,
        cancel: &mut watch::Receiver<bool>,
    ) -> Result<RunRecord, Interrupted> {
        let recall = tier_mode.probe(tier, &scenario.question);
        if let Some(e) = &recall.error {
            warn!("{} {tier} probe failed: {e}", scenario.id);
        }
        let task = TaskSpec {
            prompt: scenario.question.clone(),
            system_prompt: Some(tier_mode.system_prompt(tier, &recall)),
            allowed_tools: tier_mode.allowed_tools(),
            max_turns: TierRecallMode::MAX_TURNS,
            working_dir: tier_mode.working_dir(),
            tool_servers: ToolServers::new(),
        };

        let outcome = interruptible(platform.run_task(&task), cancel).await?;
        let mut record = record_from(
            &scenario.id,
            &TierRecallMode::mode_name(tier),
            platform.name(),
            outcome,
        );
        record.elapsed_ms += recall.elapsed_ms;
        record.probe = Some(ProbeTelemetry::from_result(tier, &recall));
        Ok(self.score(scenario, record, cancel).await)
    }

    /// Judges block on HTTP or a child process, so scoring runs on the
    /// blocking pool. A cancel while the judge is out keeps the record with
    /// keyword scores only; the next pause then stops the sequence.
    async fn score(
        &self,
        scenario: &Scenario,
        record: RunRecord,
        cancel: &mut watch::Receiver<bool>,
    ) -> RunRecord {
        let scorer = Arc::clone(&self.scorer);
        let owned = scenario.clone();
        let unscored = record.clone();
        let task = tokio::task::spawn_blocking(move || scorer.score(&owned, record));
        match interruptible(task, cancel).await {
            Ok(Ok(scored)) => scored,
            Ok(Err(e)) => {
                warn!("{}: scoring task failed: {e}", scenario.id);
                self.scorer.keyword_only(scenario, unscored)
            }
            Err(Interrupted) => {
                debug!("{}: interrupted while judging", scenario.id);
                self.scorer.keyword_only(scenario, unscored)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Per-run setup
// ---------------------------------------------------------------------------

/// Phase one of a cross-session scenario: leave the prior session's context
/// in memory. Modes without cross-session memory get nothing.
fn prepare_prior_session(scenario: &Scenario, mode: &dyn Mode) {
    let Some(context) = &scenario.setup.prior_session_context else {
        return;
    };
    if !mode.supports_cross_session_memory() {
        debug!("{}: {} keeps no cross-session memory", scenario.id, mode.name());
        return;
    }
    let label = scenario.seed_label();
    if let Some(Err(e)) = mode.clear(context, Some(&label)) {
        warn!("{}: clearing prior session failed: {e}", scenario.id);
    }
    let record = MemoryRecord::fact(context.clone(), &["ttl", "learning", &scenario.id], "session")
        .with_label(label);
    if let Some(outcome) = mode.seed(&[record]) {
        if !outcome.all_accepted() {
            warn!("{}: prior session was not stored", scenario.id);
        }
    }
}

/// Replace whatever an earlier run left behind with the scenario's own
/// records: the contradictory pair of a conflict scenario, or the memories a
/// conversational question asks about.
fn prepare_seeds(scenario: &Scenario, mode: &dyn Mode) {
    let Some(seeds) = &scenario.setup.seeds else {
        return;
    };
    if mode.memory().is_none() {
        return;
    }
    let label = scenario.seed_label();
    match mode.clear(&seeds.clear_query, Some(&label)) {
        Some(Ok(cleared)) => debug!(
            "{}: cleared {} of {} stale records",
            scenario.id, cleared.deleted, cleared.matched
        ),
        Some(Err(e)) => warn!("{}: clearing seeded records failed: {e}", scenario.id),
        None => {}
    }
    let labelled: Vec<MemoryRecord> = seeds
        .records
        .iter()
        .cloned()
        .map(|r| r.with_label(label.clone()))
        .collect();
    if let Some(outcome) = mode.seed(&labelled) {
        if !outcome.all_accepted() {
            warn!(
                "{}: {} of {} seeded records stored",
                scenario.id, outcome.accepted, outcome.attempted
            );
        }
    }
}

fn record_from(scenario_id: &str, mode: &str, platform: &str, outcome: TaskOutcome) -> RunRecord {
    let mut record = RunRecord::new(scenario_id, mode, platform);
    record.elapsed_ms = outcome.elapsed_ms;
    record.set_tokens(outcome.input_tokens, outcome.output_tokens);
    record.set_tool_calls(outcome.tool_names());
    record.final_answer = outcome.final_answer;
    record.cost_usd = outcome.cost_usd;
    record.num_turns = outcome.num_turns;
    record.error = outcome.error;
    record
}

// ---------------------------------------------------------------------------
// Sequencing
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Interrupted;

struct Progress {
    done: usize,
    planned: usize,
    cooldown: Duration,
}

impl Progress {
    /// Cool down between runs; the first run starts immediately.
    async fn pause(&self, cancel: &mut watch::Receiver<bool>) -> Result<(), Interrupted> {
        if *cancel.borrow() {
            return Err(Interrupted);
        }
        if self.done > 0 && !self.cooldown.is_zero() {
            interruptible(tokio::time::sleep(self.cooldown), cancel).await?;
        }
        Ok(())
    }

    fn announce(&self, scenario: &str, mode: &str, platform: &str) {
        eprintln!(
            "[{}/{}] {scenario} / {mode} / {platform}",
            self.done + 1,
            self.planned
        );
    }

    fn report(&mut self, record: &RunRecord) {
        self.done += 1;
        match &record.error {
            Some(e) => eprintln!("  error: {e}"),
            None => eprintln!(
                "  score {:.2} (keyword {:.2}, judge {}) in {:.1}s, {} tool calls",
                record.composite_score,
                record.keyword_score,
                record
                    .llm_judge_score
                    .map(|j| format!("{j:.1}"))
                    .unwrap_or_else(|| "-".into()),
                record.elapsed_ms as f64 / 1000.0,
                record.tool_call_count
            ),
        }
    }
}

async fn interruptible<F: Future>(
    fut: F,
    cancel: &mut watch::Receiver<bool>,
) -> Result<F::Output, Interrupted> {
    tokio::select! {
        out = fut => Ok(out),
        _ = cancelled(cancel) => Err(Interrupted),
    }
}

async fn cancelled(cancel: &mut watch::Receiver<bool>) {
    if cancel.wait_for(|c| *c).await.is_err() {
        // Sender gone: nothing can cancel any more.
        std::future::pending::<()>().await;
    }
}
