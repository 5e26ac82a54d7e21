use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::outcome::TaskOutcome;
use crate::runtime::{AgentRequest, AgentRuntime};
use crate::tool_servers::{self, ToolServers};

pub const GATEWAY_PREAMBLE: &str = "You are an AI assistant running inside a personal AI gateway.
You have access to workspace files including AGENTS.md, MEMORY.md, and memory/*.md daily logs.
You should check memory files for prior context before exploring the codebase.
Your working directory is the project repository.
";

/// One agent task as the orchestrator describes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskSpec {
    pub prompt: String,
    pub system_prompt: Option<String>,
    pub allowed_tools: Vec<String>,
    pub max_turns: u32,
    pub working_dir: PathBuf,
    /// Connectors the mode declares, merged over the project's own config.
    pub tool_servers: ToolServers,
}

/// An agent back-end behind a uniform "run a task" contract.
///
/// `run_task` never fails: transport and runtime errors land in
/// [`TaskOutcome::error`].
#[async_trait]
pub trait Platform: Send + Sync {
    fn name(&self) -> &str;
    async fn run_task(&self, task: &TaskSpec) -> TaskOutcome;
}

async fn execute(
    runtime: &dyn AgentRuntime,
    platform: &str,
    task: &TaskSpec,
    system_prompt: Option<String>,
) -> TaskOutcome {
    let discovered = tool_servers::discover(&task.working_dir);
    let request = AgentRequest {
        prompt: task.prompt.clone(),
        system_prompt,
        allowed_tools: task.allowed_tools.clone(),
        max_turns: task.max_turns,
        working_dir: task.working_dir.clone(),
        tool_servers: tool_servers::merge(discovered, &task.tool_servers),
    };
    debug!(
        "{platform}: {} tools, {} tool servers, max {} turns",
        request.allowed_tools.len(),
        request.tool_servers.len(),
        request.max_turns
    );

    let start = Instant::now();
    let mut events = Vec::new();
    let error = match runtime.query(&request, &mut events).await {
        Ok(()) => None,
        Err(e) => {
            warn!("{platform}: {e:#}");
            Some(format!("{e:#}"))
        }
    };
    let elapsed_ms = start.elapsed().as_millis() as u64;
    TaskOutcome::from_events(&events, elapsed_ms, error)
}

// ---------------------------------------------------------------------------
// Direct
// ---------------------------------------------------------------------------

/// The runtime as-is, with the mode's prompt untouched.
pub struct DirectPlatform {
    runtime: Arc<dyn AgentRuntime>,
}

impl DirectPlatform {
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self { runtime }
    }
}

#[async_trait]
impl Platform for DirectPlatform {
    fn name(&self) -> &str {
        "direct"
    }

    async fn run_task(&self, task: &TaskSpec) -> TaskOutcome {
        execute(
            self.runtime.as_ref(),
            self.name(),
            task,
            task.system_prompt.clone(),
        )
        .await
    }
}

// ---------------------------------------------------------------------------
// Gateway
// ---------------------------------------------------------------------------

/// Simulates a gateway persona that advertises ambient workspace memory files.
pub struct GatewayPlatform {
    runtime: Arc<dyn AgentRuntime>,
    preamble: String,
}

impl GatewayPlatform {
    pub fn new(runtime: Arc<dyn AgentRuntime>) -> Self {
        Self {
            runtime,
            preamble: GATEWAY_PREAMBLE.to_string(),
        }
    }

    fn system_prompt(&self, mode_prompt: Option<&str>) -> String {
        match mode_prompt {
            Some(p) if !p.is_empty() => format!("{}\n{p}", self.preamble),
            _ => self.preamble.clone(),
        }
    }
}

#[async_trait]
impl Platform for GatewayPlatform {
    fn name(&self) -> &str {
        "gateway"
    }

    async fn run_task(&self, task: &TaskSpec) -> TaskOutcome {
        let system = self.system_prompt(task.system_prompt.as_deref());
        execute(self.runtime.as_ref(), self.name(), task, Some(system)).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::{bail, Result};

    use super::*;
    use crate::protocol::{parse_line, AgentEvent};

    /// Records requests and replays fixed stream lines.
    struct ScriptedRuntime {
        lines: Vec<&'static str>,
        fail: Option<&'static str>,
        seen: Mutex<Vec<AgentRequest>>,
    }

    impl ScriptedRuntime {
        fn new(lines: Vec<&'static str>) -> Self {
            Self {
                lines,
                fail: None,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl AgentRuntime for ScriptedRuntime {
        async fn query(&self, request: &AgentRequest, events: &mut Vec<AgentEvent>) -> Result<()> {
            self.seen.lock().unwrap().push(request.clone());
            events.extend(self.lines.iter().filter_map(|l| parse_line(l)));
            if let Some(msg) = self.fail {
                bail!("{msg}");
            }
            Ok(())
        }
    }

    fn task(dir: &std::path::Path) -> TaskSpec {
        TaskSpec {
            prompt: "How do I deploy?".into(),
            system_prompt: Some("MODE PROMPT".into()),
            allowed_tools: vec!["Read".into()],
            max_turns: 20,
            working_dir: dir.to_path_buf(),
            tool_servers: ToolServers::new(),
        }
    }

    const RESULT: &str = r#"{"type":"result","is_error":false,"result":"Run scripts/deploy.sh","usage":{"input_tokens":3,"output_tokens":4}}"#;

    #[tokio::test]
    async fn test_direct_passes_prompt_through() {
        let dir = tempfile::tempdir().unwrap();
        let rt = Arc::new(ScriptedRuntime::new(vec![RESULT]));
        let platform = DirectPlatform::new(rt.clone());
        let out = platform.run_task(&task(dir.path())).await;
        assert_eq!(out.final_answer, "Run scripts/deploy.sh");
        assert_eq!(out.input_tokens + out.output_tokens, 7);
        let seen = rt.seen.lock().unwrap();
        assert_eq!(seen[0].system_prompt.as_deref(), Some("MODE PROMPT"));
    }

    #[tokio::test]
    async fn test_gateway_prepends_preamble() {
        let dir = tempfile::tempdir().unwrap();
        let rt = Arc::new(ScriptedRuntime::new(vec![RESULT]));
        let platform = GatewayPlatform::new(rt.clone());
        platform.run_task(&task(dir.path())).await;
        let seen = rt.seen.lock().unwrap();
        let system = seen[0].system_prompt.clone().unwrap();
        assert!(system.starts_with(GATEWAY_PREAMBLE));
        assert!(system.ends_with("MODE PROMPT"));
        assert!(system.contains("MEMORY.md"));
    }

    #[tokio::test]
    async fn test_runtime_error_becomes_outcome_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut rt = ScriptedRuntime::new(vec![
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"partial answer before the crash"}]}}"#,
        ]);
        rt.fail = Some("agent exited with 1");
        let platform = DirectPlatform::new(Arc::new(rt));
        let out = platform.run_task(&task(dir.path())).await;
        assert_eq!(out.error.as_deref(), Some("agent exited with 1"));
        assert_eq!(out.final_answer, "partial answer before the crash");
    }

    #[tokio::test]
    async fn test_discovered_servers_merge_with_declared() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".mcp.json"),
            r#"{"mcpServers":{"project":{"command":"tool-srv"}}}"#,
        )
        .unwrap();
        let rt = Arc::new(ScriptedRuntime::new(vec![RESULT]));
        let platform = DirectPlatform::new(rt.clone());
        let mut t = task(dir.path());
        t.tool_servers.insert(
            "memory".into(),
            crate::tool_servers::ToolServer::Sse {
                url: "http://127.0.0.1:7437/mcp/sse".into(),
            },
        );
        platform.run_task(&t).await;
        let seen = rt.seen.lock().unwrap();
        let names: Vec<&String> = seen[0].tool_servers.keys().collect();
        assert_eq!(names, vec!["memory", "project"]);
    }
}
