use std::path::PathBuf;
use std::sync::Arc;

use recallbench_agent::{ToolServer, ToolServers};
use recallbench_core::MemoryService;

use super::{join_prompt, tools, Mode, FALLBACK_TOOLS};

/// Name the memory service's tool endpoint is registered under.
pub const MEMORY_TOOL_SERVER: &str = "memory";

/// The agent recalls from the memory service first and falls back to files.
pub struct MemoryRecallMode {
    service: Arc<dyn MemoryService>,
    repo_root: PathBuf,
    sse_url: String,
}

impl MemoryRecallMode {
    pub fn new(service: Arc<dyn MemoryService>, repo_root: PathBuf, sse_url: String) -> Self {
        Self {
            service,
            repo_root,
            sse_url,
        }
    }
}

impl Mode for MemoryRecallMode {
    fn name(&self) -> &str {
        "memory"
    }

    fn description(&self) -> &str {
        "Recall from the persistent memory service first, file tools only as fallback"
    }

    fn system_prompt(&self, base: Option<&str>) -> String {
        let own = format!(
            "You are an AI assistant answering questions about the codebase in {}.

You have access to a persistent semantic memory through the recall tool. Your workflow:

1. FIRST: use the recall tool to search memory for relevant information.
   Try several queries if the first one does not return good results.
2. THEN: if recall gives you a confident answer, respond immediately. Do not verify via files
   unless the recalled results are clearly incomplete or contradictory.
3. ONLY IF NEEDED: fall back to file tools (Read, Bash, Glob) for details memory does not cover.

When recalled memories conflict, prefer the one marked current or with the newest version.",
            self.repo_root.display()
        );
        join_prompt(base, own)
    }

    fn allowed_tools(&self) -> Vec<String> {
        tools(&FALLBACK_TOOLS)
    }

    fn working_dir(&self) -> PathBuf {
        self.repo_root.clone()
    }

    fn supports_cross_session_memory(&self) -> bool {
        true
    }

    fn tool_servers(&self) -> ToolServers {
        let mut servers = ToolServers::new();
        servers.insert(
            MEMORY_TOOL_SERVER.to_string(),
            ToolServer::Sse {
                url: self.sse_url.clone(),
            },
        );
        servers
    }

    fn memory(&self) -> Option<&dyn MemoryService> {
        Some(self.service.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::testing::MemoryFake;
    use recallbench_core::MemoryRecord;

    fn mode(fake: Arc<MemoryFake>) -> MemoryRecallMode {
        MemoryRecallMode::new(fake, PathBuf::from("/repo"), "http://m/mcp/sse".into())
    }

    #[test]
    fn test_capabilities() {
        let m = mode(Arc::new(MemoryFake::default()));
        assert!(m.supports_cross_session_memory());
        assert_eq!(m.allowed_tools(), vec!["Read", "Bash", "Glob"]);
        assert!(m.system_prompt(None).contains("FIRST: use the recall tool"));
        assert_eq!(
            m.tool_servers()[MEMORY_TOOL_SERVER],
            ToolServer::Sse {
                url: "http://m/mcp/sse".into()
            }
        );
    }

    #[test]
    fn test_seed_then_clear() {
        let fake = Arc::new(MemoryFake::default());
        let m = mode(fake.clone());
        let records = vec![
            MemoryRecord::fact("PIN key derivation uses email as salt", &["outdated"], "enc")
                .with_label("bench:cr"),
            MemoryRecord::fact("PIN key derivation uses random salt (v0.4.2)", &["current"], "enc")
                .with_label("bench:cr"),
        ];
        let seeded = m.seed(&records).unwrap();
        assert!(seeded.all_accepted());

        let cleared = m.clear("PIN key derivation", Some("bench:cr")).unwrap().unwrap();
        assert_eq!(cleared.deleted, 2);
        assert!(fake.stored.lock().unwrap().is_empty());
    }

    #[test]
    fn test_seed_against_down_service_reports_failures() {
        let fake = Arc::new(MemoryFake {
            down: true,
            ..Default::default()
        });
        let m = mode(fake);
        let outcome = m
            .seed(&[MemoryRecord::fact("x", &[], "s")])
            .unwrap();
        assert_eq!(outcome.accepted, 0);
        assert_eq!(outcome.failures.len(), 1);
    }
}
