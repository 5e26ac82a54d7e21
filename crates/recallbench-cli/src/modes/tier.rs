use std::path::PathBuf;
use std::sync::Arc;

use recallbench_core::{format_as_context, probe, MemoryService, RecallResult, Tier};

/// Answers from a single up-front recall at one tier; the agent gets no tools.
///
/// Kept apart from [`super::Mode`]: its prompt depends on a probe result, not
/// only on the scenario.
pub struct TierRecallMode {
    service: Arc<dyn MemoryService>,
    repo_root: PathBuf,
    limit: usize,
}

impl TierRecallMode {
    pub const MAX_TURNS: u32 = 1;

    pub fn new(service: Arc<dyn MemoryService>, repo_root: PathBuf, limit: usize) -> Self {
        Self {
            service,
            repo_root,
            limit,
        }
    }

    pub fn mode_name(tier: Tier) -> String {
        format!("tier_{tier}")
    }

    pub fn probe(&self, tier: Tier, question: &str) -> RecallResult {
        probe(
            self.service.as_ref(),
            question,
            tier.search_method(),
            self.limit,
        )
    }

    pub fn system_prompt(&self, tier: Tier, recall: &RecallResult) -> String {
        format!(
            "You are answering questions about a software codebase.

You have access to memories retrieved from persistent memory ({}):

--- Retrieved Context ---
{}
--- End Context ---

Answer the question using ONLY the retrieved context above. If the context doesn't contain enough information, say so.
Do NOT read files or use tools; rely solely on the retrieved memories.
Repository location: {}",
            tier.label(),
            format_as_context(recall),
            self.repo_root.display()
        )
    }

    pub fn allowed_tools(&self) -> Vec<String> {
        Vec::new()
    }

    pub fn working_dir(&self) -> PathBuf {
        self.repo_root.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::testing::MemoryFake;
    use recallbench_core::{MemoryRecord, SearchMethod};

    fn tier_mode(fake: Arc<MemoryFake>) -> TierRecallMode {
        TierRecallMode::new(fake, PathBuf::from("/repo"), 5)
    }

    #[test]
    fn test_probe_uses_tier_method() {
        let fake = Arc::new(MemoryFake::default());
        fake.store(&MemoryRecord::fact(
            "Zero-knowledge architecture: server cannot decrypt user memories",
            &[],
            "privacy",
        ))
        .unwrap();
        let mode = tier_mode(fake.clone());

        let r = mode.probe(Tier::Free, "server decrypt");
        assert_eq!(r.hits.len(), 1);
        let calls = fake.recall_calls.lock().unwrap();
        assert_eq!(calls[0].search_method, Some(SearchMethod::Keyword));
        assert_eq!(calls[0].limit, 5);
    }

    #[test]
    fn test_prompt_embeds_context() {
        let fake = Arc::new(MemoryFake::default());
        fake.store(&MemoryRecord::fact("sync is incremental", &[], "sync"))
            .unwrap();
        let mode = tier_mode(fake);
        let r = mode.probe(Tier::Pro, "sync");
        let prompt = mode.system_prompt(Tier::Pro, &r);
        assert!(prompt.contains("--- Retrieved Context ---\n[relevance: 0.900] sync is incremental\n--- End Context ---"));
        assert!(prompt.contains("Pro tier"));
        assert!(mode.allowed_tools().is_empty());
    }

    #[test]
    fn test_unreachable_service_still_yields_prompt() {
        let mode = tier_mode(Arc::new(MemoryFake {
            down: true,
            ..Default::default()
        }));
        let r = mode.probe(Tier::Standard, "anything");
        assert!(r.error.is_some());
        assert!(mode
            .system_prompt(Tier::Standard, &r)
            .contains("(no relevant memories found)"));
        assert_eq!(TierRecallMode::mode_name(Tier::Standard), "tier_standard");
    }
}
