//! Context-provisioning strategies compared by the benchmark.

mod explicit;
mod memory;
mod no_context;
mod tier;

use std::path::PathBuf;

use recallbench_agent::ToolServers;
use recallbench_core::{
    clear_matching, seed_batch, BenchResult, ClearOutcome, MemoryRecord, MemoryService, SeedOutcome,
};

pub use explicit::ExplicitContextMode;
pub use memory::MemoryRecallMode;
pub use no_context::NoContextMode;
pub use tier::TierRecallMode;

/// Read, search and edit.
pub const FULL_TOOLS: [&str; 5] = ["Read", "Bash", "Glob", "Edit", "Write"];
/// File tools kept as a fallback next to memory recall.
pub const FALLBACK_TOOLS: [&str; 3] = ["Read", "Bash", "Glob"];

/// Upper bound on hits fetched when clearing seeded records.
const CLEAR_LIMIT: usize = 100;

/// One way of giving the agent context for a question.
///
/// The orchestrator only ever talks to modes through these capabilities.
pub trait Mode: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// The mode's instructions, after `base` when one is given.
    fn system_prompt(&self, base: Option<&str>) -> String;

    fn allowed_tools(&self) -> Vec<String>;

    fn working_dir(&self) -> PathBuf;

    fn supports_cross_session_memory(&self) -> bool {
        false
    }

    /// Extra context appended to the system prompt for one scenario.
    fn supplementary_context(&self, _scenario_id: &str) -> Option<String> {
        None
    }

    /// Tool-server connectors the agent should get in this mode.
    fn tool_servers(&self) -> ToolServers {
        ToolServers::new()
    }

    /// The memory service this mode reads from, if any.
    fn memory(&self) -> Option<&dyn MemoryService> {
        None
    }

    /// Seed records. `None` when the mode has no memory.
    fn seed(&self, records: &[MemoryRecord]) -> Option<SeedOutcome> {
        self.memory().map(|m| seed_batch(m, records))
    }

    /// Delete records matching `query` that carry `label`.
    fn clear(&self, query: &str, label: Option<&str>) -> Option<BenchResult<ClearOutcome>> {
        self.memory()
            .map(|m| clear_matching(m, query, label, CLEAR_LIMIT))
    }
}

fn tools(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| (*t).to_string()).collect()
}

fn join_prompt(base: Option<&str>, own: String) -> String {
    match base {
        Some(b) if !b.is_empty() => format!("{b}\n\n{own}"),
        _ => own,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_prompt() {
        assert_eq!(join_prompt(None, "own".into()), "own");
        assert_eq!(join_prompt(Some(""), "own".into()), "own");
        assert_eq!(join_prompt(Some("base"), "own".into()), "base\n\nown");
    }
}
