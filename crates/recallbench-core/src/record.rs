use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::recall::{RecallResult, Tier};
use crate::scoring::Scores;

/// Recall telemetry attached to tier-comparison runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeTelemetry {
    pub tier: Tier,
    pub requested_method: String,
    pub reported_method: String,
    pub result_count: usize,
    pub top_score: f64,
    pub probe_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeTelemetry {
    pub fn from_result(tier: Tier, result: &RecallResult) -> Self {
        Self {
            tier,
            requested_method: result.requested.to_string(),
            reported_method: result.reported.clone(),
            result_count: result.hits.len(),
            top_score: result.top_score(),
            probe_ms: result.elapsed_ms,
            error: result.error.clone(),
        }
    }
}

/// One (scenario, mode, platform) execution.
///
/// Built by the orchestrator, scored once, then appended to the results
/// document and never touched again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub scenario_id: String,
    pub mode: String,
    pub platform: String,
    pub elapsed_ms: u64,
    pub tool_call_count: usize,
    pub tool_call_names: Vec<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub total_tokens: u64,
    pub final_answer: String,
    #[serde(default)]
    pub cost_usd: Option<f64>,
    #[serde(default)]
    pub num_turns: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub keyword_score: f64,
    #[serde(default)]
    pub llm_judge_score: Option<f64>,
    #[serde(default)]
    pub composite_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe: Option<ProbeTelemetry>,
    pub timestamp: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(
        scenario_id: impl Into<String>,
        mode: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            scenario_id: scenario_id.into(),
            mode: mode.into(),
            platform: platform.into(),
            elapsed_ms: 0,
            tool_call_count: 0,
            tool_call_names: Vec::new(),
            input_tokens: 0,
            output_tokens: 0,
            total_tokens: 0,
            final_answer: String::new(),
            cost_usd: None,
            num_turns: None,
            error: None,
            keyword_score: 0.0,
            llm_judge_score: None,
            composite_score: 0.0,
            probe: None,
            timestamp: Utc::now(),
        }
    }

    /// A cell that never reached the agent.
    pub fn failed(
        scenario_id: impl Into<String>,
        mode: impl Into<String>,
        platform: impl Into<String>,
        error: impl Into<String>,
    ) -> Self {
        let mut rec = Self::new(scenario_id, mode, platform);
        rec.error = Some(error.into());
        rec
    }

    pub fn set_tokens(&mut self, input: u64, output: u64) {
        self.input_tokens = input;
        self.output_tokens = output;
        self.total_tokens = input + output;
    }

    pub fn set_tool_calls(&mut self, names: Vec<String>) {
        self.tool_call_count = names.len();
        self.tool_call_names = names;
    }

    pub fn with_scores(mut self, scores: Scores) -> Self {
        self.keyword_score = scores.keyword;
        self.llm_judge_score = scores.judge;
        self.composite_score = scores.composite;
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::ScoringWeights;

    #[test]
    fn test_failed_record_defaults_to_zero() {
        let rec = RunRecord::failed("ar_1", "memory", "direct", "boom");
        assert!(rec.is_error());
        assert_eq!(rec.total_tokens, 0);
        assert_eq!(rec.composite_score, 0.0);
        assert!(rec.llm_judge_score.is_none());
    }

    #[test]
    fn test_setters_keep_derived_counts() {
        let mut rec = RunRecord::new("s", "m", "p");
        rec.set_tokens(120, 30);
        rec.set_tool_calls(vec!["Read".into(), "Glob".into()]);
        assert_eq!(rec.total_tokens, 150);
        assert_eq!(rec.tool_call_count, 2);
    }

    #[test]
    fn test_json_shape() {
        let rec = RunRecord::new("s", "m", "p")
            .with_scores(Scores::new(0.5, Some(7.0), ScoringWeights::default()));
        let v = serde_json::to_value(&rec).unwrap();
        assert_eq!(v["keyword_score"], 0.5);
        assert_eq!(v["llm_judge_score"], 7.0);
        assert!(v.get("probe").is_none());
        let back: RunRecord = serde_json::from_value(v).unwrap();
        assert_eq!(back, rec);
    }
}
