use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::record::RunRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub count: usize,
    pub avg_elapsed_ms: f64,
    pub avg_tool_calls: f64,
    pub avg_total_tokens: f64,
    pub avg_keyword_score: f64,
    pub avg_composite_score: Option<f64>,
    /// Runs that received a judge score.
    pub judged: usize,
    pub errors: usize,
}

impl GroupStats {
    fn from_records(records: &[&RunRecord]) -> Self {
        if records.is_empty() {
            return Self::default();
        }
        let n = records.len() as f64;
        let mean = |f: &dyn Fn(&RunRecord) -> f64| records.iter().map(|r| f(*r)).sum::<f64>() / n;
        Self {
            count: records.len(),
            avg_elapsed_ms: mean(&|r| r.elapsed_ms as f64),
            avg_tool_calls: mean(&|r| r.tool_call_count as f64),
            avg_total_tokens: mean(&|r| r.total_tokens as f64),
            avg_keyword_score: mean(&|r| r.keyword_score),
            avg_composite_score: Some(mean(&|r| r.composite_score)),
            judged: records.iter().filter(|r| r.llm_judge_score.is_some()).count(),
            errors: records.iter().filter(|r| r.is_error()).count(),
        }
    }
}

/// Derived view over a full record collection. Recomputed, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_scenarios: usize,
    pub total_runs: usize,
    pub modes: Vec<String>,
    pub platforms: Vec<String>,
    pub overall: GroupStats,
    pub by_mode: BTreeMap<String, GroupStats>,
    pub by_platform: BTreeMap<String, GroupStats>,
    pub by_scenario: BTreeMap<String, GroupStats>,
}

impl AggregateStats {
    pub fn from_records(records: &[RunRecord]) -> Self {
        let all: Vec<&RunRecord> = records.iter().collect();
        let scenarios: BTreeSet<&str> = records.iter().map(|r| r.scenario_id.as_str()).collect();

        let by_mode = group_by(records, |r| &r.mode);
        let by_platform = group_by(records, |r| &r.platform);
        let by_scenario = group_by(records, |r| &r.scenario_id);

        Self {
            total_scenarios: scenarios.len(),
            total_runs: records.len(),
            modes: by_mode.keys().cloned().collect(),
            platforms: by_platform.keys().cloned().collect(),
            overall: GroupStats::from_records(&all),
            by_mode,
            by_platform,
            by_scenario,
        }
    }
}

fn group_by<F>(records: &[RunRecord], key: F) -> BTreeMap<String, GroupStats>
where
    F: Fn(&RunRecord) -> &String,
{
    let mut groups: BTreeMap<String, Vec<&RunRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(key(r).clone()).or_default().push(r);
    }
    groups
        .into_iter()
        .map(|(k, v)| (k, GroupStats::from_records(&v)))
        .collect()
}
