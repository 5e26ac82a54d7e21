use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, warn};

use crate::protocol::{parse_line, AgentEvent};
use crate::tool_servers::{to_mcp_config, ToolServers};

/// Everything a runtime needs for one session.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentRequest {
    pub prompt: String,
    pub system_prompt: Option<String>,
    /// Empty means the agent gets no tools at all.
    pub allowed_tools: Vec<String>,
    pub max_turns: u32,
    pub working_dir: PathBuf,
    pub tool_servers: ToolServers,
}

/// An agent execution back-end.
///
/// Events are appended to `events` as they arrive, so a failed or timed-out
/// session still leaves whatever it produced.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    async fn query(&self, request: &AgentRequest, events: &mut Vec<AgentEvent>) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Claude CLI runtime
// ---------------------------------------------------------------------------

/// Runs `claude -p` headless with `stream-json` output.
pub struct ClaudeCliRuntime {
    pub binary: String,
    pub model: Option<String>,
    pub timeout: Duration,
}

impl ClaudeCliRuntime {
    pub fn new(binary: impl Into<String>, model: Option<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            model,
            timeout,
        }
    }

    fn command(&self, request: &AgentRequest) -> Result<Command> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-p")
            .arg(&request.prompt)
            .arg("--output-format")
            .arg("stream-json")
            .arg("--verbose")
            .arg("--max-turns")
            .arg(request.max_turns.to_string())
            .arg("--permission-mode")
            .arg("bypassPermissions");

        if let Some(model) = &self.model {
            cmd.arg("--model").arg(model);
        }
        if let Some(system) = &request.system_prompt {
            cmd.arg("--system-prompt").arg(system);
        }
        if request.allowed_tools.is_empty() {
            cmd.arg("--tools").arg("");
        } else {
            cmd.arg("--allowedTools").arg(request.allowed_tools.join(","));
        }
        if !request.tool_servers.is_empty() {
            let mcp = serde_json::to_string(&to_mcp_config(&request.tool_servers))
                .context("cannot encode tool-server config")?;
            cmd.arg("--mcp-config").arg(mcp);
        }

        cmd.current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        Ok(cmd)
    }
}

#[async_trait]
impl AgentRuntime for ClaudeCliRuntime {
    async fn query(&self, request: &AgentRequest, events: &mut Vec<AgentEvent>) -> Result<()> {
        let mut child = self
            .command(request)?
            .spawn()
            .with_context(|| format!("failed to spawn '{}'", self.binary))?;

        let stdout = child.stdout.take().context("agent stdout not captured")?;
        let mut stderr = child.stderr.take().context("agent stderr not captured")?;
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            if let Err(e) = stderr.read_to_string(&mut buf).await {
                debug!("cannot read agent stderr: {e}");
            }
            buf
        });

        // A child may close stdout and keep running, so the wait shares the budget.
        let mut lines = BufReader::new(stdout).lines();
        let session = async {
            while let Some(line) = lines
                .next_line()
                .await
                .context("failed to read agent output")?
            {
                if let Some(ev) = parse_line(&line) {
                    events.push(ev);
                }
            }
            child.wait().await.context("error waiting for agent")
        };

        let status = match tokio::time::timeout(self.timeout, session).await {
            Ok(res) => res?,
            Err(_) => {
                if let Err(e) = child.kill().await {
                    warn!("cannot kill timed-out agent: {e}");
                }
                bail!("agent timed out after {}s", self.timeout.as_secs());
            }
        };

        let stderr = stderr_task.await.unwrap_or_default();
        debug!("agent exited with {status}, {} events", events.len());

        if !status.success() {
            let excerpt: String = stderr.chars().take(500).collect();
            warn!("agent exited with {status}");
            bail!("agent exited with {status}: {}", excerpt.trim());
        }
        Ok(())
    }
}
