pub mod outcome;
pub mod platform;
pub mod protocol;
pub mod runtime;
pub mod tool_servers;

pub use outcome::{TaskOutcome, ToolCall};
pub use platform::{DirectPlatform, GatewayPlatform, Platform, TaskSpec, GATEWAY_PREAMBLE};
pub use protocol::{AgentEvent, ContentBlock, ResultSummary, Usage};
pub use runtime::{AgentRequest, AgentRuntime, ClaudeCliRuntime};
pub use tool_servers::{ToolServer, ToolServers};
