use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::protocol::{AgentEvent, ContentBlock, ResultSummary};

/// Text blocks at or below this many characters are treated as filler.
const SUBSTANTIAL_TEXT_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// Uniform result of one agent task, whatever the back-end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub final_answer: String,
    pub tool_calls: Vec<ToolCall>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub elapsed_ms: u64,
    pub cost_usd: Option<f64>,
    pub num_turns: Option<u32>,
    pub error: Option<String>,
}

impl TaskOutcome {
    /// Fold a session's events into an outcome.
    ///
    /// `error` is whatever the runtime call itself raised; a final summary
    /// flagged `is_error` replaces it.
    pub fn from_events(events: &[AgentEvent], elapsed_ms: u64, error: Option<String>) -> Self {
        let mut texts: Vec<&str> = Vec::new();
        let mut tool_calls = Vec::new();
        let mut summary: Option<&ResultSummary> = None;

        for ev in events {
            match ev {
                AgentEvent::Assistant { message } => {
                    for block in &message.content {
                        match block {
                            ContentBlock::Text { text } => texts.push(text),
                            ContentBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                                id: id.clone(),
                                name: name.clone(),
                                input: input.clone(),
                            }),
                            ContentBlock::Other => {}
                        }
                    }
                }
                AgentEvent::Result(s) => summary = Some(s),
                AgentEvent::Other => {}
            }
        }

        let mut outcome = TaskOutcome {
            tool_calls,
            elapsed_ms,
            error,
            ..Default::default()
        };

        if let Some(s) = summary {
            if let Some(usage) = &s.usage {
                outcome.input_tokens = usage.total_input();
                outcome.output_tokens = usage.output_tokens;
            }
            outcome.cost_usd = s.total_cost_usd;
            outcome.num_turns = s.num_turns;
            if let Some(result) = s.result.as_deref().filter(|r| !r.is_empty()) {
                outcome.final_answer = result.to_string();
            }
            if s.is_error {
                outcome.error = Some(
                    s.result
                        .clone()
                        .filter(|r| !r.is_empty())
                        .or(outcome.error.take())
                        .unwrap_or_else(|| format!("agent reported error ({})", s.subtype)),
                );
            }
        }

        if outcome.final_answer.is_empty() {
            outcome.final_answer = pick_answer(&texts);
        }
        outcome
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tool_calls.iter().map(|c| c.name.clone()).collect()
    }
}

/// Latest substantial text block, else every block joined.
fn pick_answer(texts: &[&str]) -> String {
    texts
        .iter()
        .rev()
        .map(|t| t.trim())
        .find(|t| t.chars().count() > SUBSTANTIAL_TEXT_CHARS)
        .map(String::from)
        .unwrap_or_else(|| texts.join("\n"))
}
