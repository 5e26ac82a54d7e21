use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};

use crate::error::BenchResult;
use crate::recall::SearchMethod;

// ---------------------------------------------------------------------------
// MemoryRecord (outbound payload)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    /// A fact. The service calls this type "semantic".
    #[serde(rename = "semantic")]
    Fact,
    Preference,
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fact => write!(f, "semantic"),
            Self::Preference => write!(f, "preference"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    pub content: String,
    #[serde(rename = "type")]
    pub kind: MemoryKind,
    #[serde(rename = "tags")]
    pub labels: Vec<String>,
    pub subject: String,
}

impl MemoryRecord {
    pub fn fact(content: impl Into<String>, labels: &[&str], subject: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind: MemoryKind::Fact,
            labels: labels.iter().map(|l| (*l).to_string()).collect(),
            subject: subject.into(),
        }
    }

    /// A user preference. Same shape as a fact, typed so the service can rank it apart.
    pub fn preference(
        content: impl Into<String>,
        labels: &[&str],
        subject: impl Into<String>,
    ) -> Self {
        Self {
            kind: MemoryKind::Preference,
            ..Self::fact(content, labels, subject)
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Recall wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecallRequest {
    pub query: String,
    pub limit: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_method: Option<SearchMethod>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredMemory {
    pub id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallHit {
    pub memory: StoredMemory,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecallResponse {
    #[serde(default)]
    pub results: Vec<RecallHit>,
    /// Method the service reports it actually used.
    #[serde(default)]
    pub search_method: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

// ---------------------------------------------------------------------------
// MemoryService
// ---------------------------------------------------------------------------

/// The external memory service, consumed as a black box.
///
/// Implementations must bound every call with a timeout; a timeout surfaces as
/// an ordinary error.
pub trait MemoryService: Send + Sync {
    fn store(&self, record: &MemoryRecord) -> BenchResult<()>;
    fn recall(&self, request: &RecallRequest) -> BenchResult<RecallResponse>;
    fn delete(&self, id: &str) -> BenchResult<()>;
    fn health(&self) -> BenchResult<ServiceHealth>;
}

// ---------------------------------------------------------------------------
// Best-effort batch operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct SeedFailure {
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedOutcome {
    pub attempted: usize,
    pub accepted: usize,
    pub failures: Vec<SeedFailure>,
}

impl SeedOutcome {
    pub fn all_accepted(&self) -> bool {
        self.accepted == self.attempted
    }
}

/// Store every record, continuing past individual failures.
pub fn seed_batch(service: &dyn MemoryService, records: &[MemoryRecord]) -> SeedOutcome {
    let mut outcome = SeedOutcome {
        attempted: records.len(),
        ..SeedOutcome::default()
    };
    for (index, record) in records.iter().enumerate() {
        match service.store(record) {
            Ok(()) => outcome.accepted += 1,
            Err(e) => {
                debug!("seed {index} rejected: {e}");
                outcome.failures.push(SeedFailure {
                    index,
                    error: e.to_string(),
                });
            }
        }
    }
    if !outcome.all_accepted() {
        warn!(
            "seeded {}/{} memories",
            outcome.accepted, outcome.attempted
        );
    }
    outcome
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClearOutcome {
    /// Hits returned by the query that carried the label.
    pub matched: usize,
    pub deleted: usize,
    pub failures: Vec<(String, String)>,
}

/// Re-query the service and delete every hit carrying `label`.
///
/// `None` deletes every hit. Delete failures are collected, not propagated;
/// only a failed query is an error.
pub fn clear_matching(
    service: &dyn MemoryService,
    query: &str,
    label: Option<&str>,
    limit: usize,
) -> BenchResult<ClearOutcome> {
    let response = service.recall(&RecallRequest {
        query: query.to_string(),
        limit,
        search_method: None,
    })?;

    let mut outcome = ClearOutcome::default();
    for hit in response.results {
        if let Some(l) = label {
            if !hit.memory.tags.iter().any(|t| t == l) {
                continue;
            }
        }
        outcome.matched += 1;
        match service.delete(&hit.memory.id) {
            Ok(()) => outcome.deleted += 1,
            Err(e) => outcome.failures.push((hit.memory.id.clone(), e.to_string())),
        }
    }
    if !outcome.failures.is_empty() {
        warn!(
            "cleared {}/{} memories for {query:?}",
            outcome.deleted, outcome.matched
        );
    }
    Ok(outcome)
}

/// Idempotently replace `records`: clear labelled copies of each, then store.
pub fn reseed(
    service: &dyn MemoryService,
    records: &[MemoryRecord],
    label: &str,
) -> BenchResult<SeedOutcome> {
    for record in records {
        clear_matching(service, &record.content, Some(label), 100)?;
    }
    let labelled: Vec<MemoryRecord> = records
        .iter()
        .cloned()
        .map(|r| r.with_label(label))
        .collect();
    Ok(seed_batch(service, &labelled))
}


#[cfg(test)]
mod tests {
    use super::fake::FakeService;
    use super::*;

    fn conflict_pair() -> Vec<MemoryRecord> {
        vec![
            MemoryRecord::fact("PIN key derivation uses email as salt", &["outdated"], "encryption")
                .with_label("bench:cr"),
            MemoryRecord::fact(
                "PIN key derivation uses server-generated random salt (v0.4.2)",
                &["current"],
                "encryption",
            )
            .with_label("bench:cr"),
        ]
    }

    #[test]
    fn test_record_serializes_service_shape() {
        let rec = MemoryRecord::fact("x", &["a"], "s");
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["type"], "semantic");
        assert_eq!(json["tags"][0], "a");
        assert_eq!(json["subject"], "s");

        let pref = MemoryRecord::preference("brief updates", &["style"], "Max");
        let json = serde_json::to_value(&pref).unwrap();
        assert_eq!(json["type"], "preference");
        assert_eq!(pref.kind.to_string(), "preference");
    }

    #[test]
    fn test_with_label_is_idempotent() {
        let rec = MemoryRecord::fact("x", &["a"], "s").with_label("a").with_label("b");
        assert_eq!(rec.labels, vec!["a", "b"]);
    }

    #[test]
    fn test_seed_batch_counts_partial_failure() {
        let svc = FakeService {
            fail_store_containing: Some("email".into()),
            ..Default::default()
        };
        let outcome = seed_batch(&svc, &conflict_pair());
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.accepted, 1);
        assert!(!outcome.all_accepted());
        assert_eq!(outcome.failures[0].index, 0);
    }

    #[test]
    fn test_clear_by_shared_query_removes_both_conflicting_records() {
        let svc = FakeService::default();
        assert!(seed_batch(&svc, &conflict_pair()).all_accepted());

        let cleared = clear_matching(&svc, "PIN key derivation", Some("bench:cr"), 100).unwrap();
        assert_eq!(cleared.matched, 2);
        assert_eq!(cleared.deleted, 2);

        let after = svc
            .recall(&RecallRequest {
                query: "PIN key derivation".into(),
                limit: 100,
                search_method: None,
            })
            .unwrap();
        assert!(after
            .results
            .iter()
            .all(|h| !h.memory.tags.contains(&"bench:cr".to_string())));
    }

    #[test]
    fn test_clear_skips_unlabelled_hits() {
        let svc = FakeService::default();
        svc.store(&MemoryRecord::fact("PIN handling lives in login.rs", &[], "code"))
            .unwrap();
        seed_batch(&svc, &conflict_pair());

        let cleared = clear_matching(&svc, "PIN", Some("bench:cr"), 100).unwrap();
        assert_eq!(cleared.deleted, 2);
        assert_eq!(svc.stored.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_clear_continues_past_delete_failures() {
        let svc = FakeService {
            fail_delete: true,
            ..Default::default()
        };
        seed_batch(&svc, &conflict_pair());
        let cleared = clear_matching(&svc, "PIN", None, 100).unwrap();
        assert_eq!(cleared.matched, 2);
        assert_eq!(cleared.deleted, 0);
        assert_eq!(cleared.failures.len(), 2);
    }

    #[test]
    fn test_reseed_is_idempotent() {
        let svc = FakeService::default();
        let records = vec![MemoryRecord::fact("CI builds for 5 platforms", &["ci"], "build")];
        reseed(&svc, &records, "bench:corpus").unwrap();
        reseed(&svc, &records, "bench:corpus").unwrap();
        assert_eq!(svc.stored.lock().unwrap().len(), 1);
    }
}
