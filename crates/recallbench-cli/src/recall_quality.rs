//! Direct recall probes per tier, scored by keyword coverage. No agent involved.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use recallbench_core::{probe, Category, MemoryService, Scenario, Tier};

pub const PHASE: &str = "recall_quality";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierProbe {
    /// Method the service reported.
    pub method: String,
    pub elapsed_ms: u64,
    #[serde(default)]
    pub error: Option<String>,
    pub coverage: f64,
    pub hit_keywords: Vec<String>,
    pub missed_keywords: Vec<String>,
    pub result_count: usize,
    pub top_score: f64,
    #[serde(default)]
    pub avg_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioQuality {
    pub scenario_id: String,
    pub category: Category,
    pub question: String,
    pub tiers: BTreeMap<Tier, TierProbe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallQualityDocument {
    pub phase: String,
    pub completed_at: DateTime<Utc>,
    pub scenario_count: usize,
    pub tiers: Vec<Tier>,
    pub results: Vec<ScenarioQuality>,
}

impl RecallQualityDocument {
    /// Mean coverage per tier over scenarios whose probe succeeded.
    pub fn mean_coverage(&self) -> BTreeMap<Tier, f64> {
        let mut sums: BTreeMap<Tier, (f64, usize)> = BTreeMap::new();
        for result in &self.results {
            for (tier, probe) in &result.tiers {
                if probe.error.is_some() {
                    continue;
                }
                let entry = sums.entry(*tier).or_insert((0.0, 0));
                entry.0 += probe.coverage;
                entry.1 += 1;
            }
        }
        sums.into_iter()
            .map(|(tier, (sum, n))| (tier, sum / n as f64))
            .collect()
    }
}

pub fn probe_tier(
    service: &dyn MemoryService,
    scenario: &Scenario,
    tier: Tier,
    limit: usize,
) -> TierProbe {
    let result = probe(service, &scenario.question, tier.search_method(), limit);
    if let Some(e) = &result.error {
        warn!("{} {tier}: {e}", scenario.id);
    }
    let coverage = result.keyword_coverage(&scenario.ground_truth.keywords);
    TierProbe {
        method: result.reported.clone(),
        elapsed_ms: result.elapsed_ms,
        error: result.error.clone(),
        coverage: coverage.ratio,
        hit_keywords: coverage.hit,
        missed_keywords: coverage.missed,
        result_count: result.hits.len(),
        top_score: result.top_score(),
        avg_score: result.avg_score(),
    }
}

/// Probe every scenario at every tier, printing one line per probe.
pub fn evaluate(
    service: &dyn MemoryService,
    scenarios: &[Scenario],
    limit: usize,
) -> RecallQualityDocument {
    let mut results = Vec::with_capacity(scenarios.len());
    for scenario in scenarios {
        eprintln!("\n{} ({})", scenario.id, scenario.category);
        let mut tiers = BTreeMap::new();
        for tier in Tier::ALL {
            let p = probe_tier(service, scenario, tier, limit);
            eprintln!(
                "  {} {:<8} coverage {:>3.0}%  {} results  top {:.3}  avg {:.3}  {}ms{}",
                marker(p.coverage),
                tier.to_string(),
                p.coverage * 100.0,
                p.result_count,
                p.top_score,
                p.avg_score,
                p.elapsed_ms,
                p.error
                    .as_deref()
                    .map(|e| format!("  ({e})"))
                    .unwrap_or_default()
            );
            tiers.insert(tier, p);
        }
        results.push(ScenarioQuality {
            scenario_id: scenario.id.clone(),
            category: scenario.category,
            question: scenario.question.clone(),
            tiers,
        });
    }
    RecallQualityDocument {
        phase: PHASE.to_string(),
        completed_at: Utc::now(),
        scenario_count: results.len(),
        tiers: Tier::ALL.to_vec(),
        results,
    }
}

pub fn marker(coverage: f64) -> &'static str {
    if coverage >= 0.7 {
        "✅"
    } else if coverage >= 0.4 {
        "⚠️"
    } else {
        "❌"
    }
}

pub fn print_summary(doc: &RecallQualityDocument) {
    let w = 56;
    println!("\n{}", "\u{2550}".repeat(w));
    println!("Recall quality ({} scenarios)", doc.scenario_count);
    println!("{}", "\u{2500}".repeat(w));
    for (tier, mean) in doc.mean_coverage() {
        println!(
            "  {} {:<12} {:>5.1}% mean keyword coverage",
            marker(mean),
            tier.label(),
            mean * 100.0
        );
    }
    println!("{}", "\u{2550}".repeat(w));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modes::testing::MemoryFake;
    use recallbench_core::{catalog, MemoryRecord, SearchMethod};

    #[test]
    fn test_markers() {
        assert_eq!(marker(0.7), "✅");
        assert_eq!(marker(0.5), "⚠️");
        assert_eq!(marker(0.39), "❌");
    }

    #[test]
    fn test_probe_reports_hits_and_misses() {
        let fake = MemoryFake::default();
        fake.store(&MemoryRecord::fact(
            "Memory encryption uses AES-256-GCM",
            &[],
            "crypto",
        ))
        .unwrap();
        let scenario = Scenario::new(
            "s",
            Category::AccurateRetrieval,
            "which encryption is used",
            recallbench_core::GroundTruth::new(&["AES-256-GCM", "PBKDF2"], "", 5),
        );
        let p = probe_tier(&fake, &scenario, Tier::Standard, 8);
        assert_eq!(p.coverage, 0.5);
        assert_eq!(p.hit_keywords, vec!["AES-256-GCM"]);
        assert_eq!(p.missed_keywords, vec!["PBKDF2"]);
        assert_eq!(p.result_count, 1);
        assert!((p.top_score - 0.9).abs() < 1e-9);
        assert!((p.avg_score - 0.9).abs() < 1e-9);
        assert_eq!(p.method, "semantic");

        let calls = fake.recall_calls.lock().unwrap();
        assert_eq!(calls[0].limit, 8);
        assert_eq!(calls[0].search_method, Some(SearchMethod::Semantic));
    }

    #[test]
    fn test_evaluate_covers_every_tier() {
        let fake = MemoryFake::default();
        let scenarios = catalog::quick_scenarios();
        let doc = evaluate(&fake, &scenarios, 8);
        assert_eq!(doc.phase, "recall_quality");
        assert_eq!(doc.scenario_count, scenarios.len());
        for r in &doc.results {
            assert_eq!(r.tiers.len(), 3);
            assert!(r.tiers.values().all(|p| p.result_count == 0));
        }
        assert_eq!(doc.mean_coverage()[&Tier::Pro], 0.0);
    }

    #[test]
    fn test_down_service_excluded_from_mean() {
        let fake = MemoryFake {
            down: true,
            ..Default::default()
        };
        let doc = evaluate(&fake, &catalog::quick_scenarios(), 8);
        assert!(doc.results[0].tiers[&Tier::Free].error.is_some());
        assert!(doc.mean_coverage().is_empty());
    }
}
