//! Persisted benchmark documents.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use recallbench_core::{AggregateStats, RunRecord};

/// One `run` invocation: every record plus aggregates derived from them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    pub quick: bool,
    /// Suites the scenario list was drawn from, e.g. "core+conversational".
    #[serde(default)]
    pub suite: String,
    pub platforms: Vec<String>,
    pub modes: Vec<String>,
    pub planned_runs: usize,
    pub total_runs: usize,
    /// True when Ctrl-C cut the sequence short.
    pub interrupted: bool,
    pub summary: AggregateStats,
    pub results: Vec<RunRecord>,
}

impl ResultsDocument {
    pub fn new(
        quick: bool,
        suite: String,
        platforms: Vec<String>,
        modes: Vec<String>,
        planned_runs: usize,
        results: Vec<RunRecord>,
        interrupted: bool,
    ) -> Self {
        Self {
            session_id: ulid::Ulid::new().to_string(),
            timestamp: Utc::now(),
            quick,
            suite,
            platforms,
            modes,
            planned_runs,
            total_runs: results.len(),
            interrupted,
            summary: AggregateStats::from_records(&results),
            results,
        }
    }
}

/// Write `doc` as `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.json`.
pub fn save_document<T: Serialize>(dir: &Path, prefix: &str, doc: &T) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let stamp = Utc::now().format("%Y%m%d_%H%M%S");
    let mut path = dir.join(format!("{prefix}_{stamp}.json"));
    // Two saves in the same second must not overwrite each other.
    let mut n = 1;
    while path.exists() {
        path = dir.join(format!("{prefix}_{stamp}_{n}.json"));
        n += 1;
    }
    let json = serde_json::to_string_pretty(doc).context("serializing results")?;
    std::fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    info!("results saved to {}", path.display());
    Ok(path)
}

pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub fn save(dir: &Path, doc: &ResultsDocument) -> Result<PathBuf> {
    save_document(dir, "benchmark_results", doc)
}

pub fn load(path: &Path) -> Result<ResultsDocument> {
    load_document(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(records: Vec<RunRecord>) -> ResultsDocument {
        ResultsDocument::new(
            true,
            "core".into(),
            vec!["direct".into()],
            vec!["no-context".into(), "memory".into()],
            2,
            records,
            false,
        )
    }

    #[test]
    fn test_summary_derived_from_results() {
        let d = doc(vec![
            RunRecord::new("a", "memory", "direct"),
            RunRecord::failed("a", "no-context", "direct", "boom"),
        ]);
        assert_eq!(d.total_runs, 2);
        assert_eq!(d.summary.total_runs, 2);
        assert_eq!(d.summary.overall.errors, 1);
        assert_eq!(d.session_id.len(), 26);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let original = doc(vec![RunRecord::new("a", "memory", "direct")]);
        let path = save(dir.path(), &original).unwrap();
        assert!(path
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("benchmark_results_"));
        let loaded = load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_same_second_saves_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let d = doc(vec![]);
        let a = save(dir.path(), &d).unwrap();
        let b = save(dir.path(), &d).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_run_still_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut d = doc(vec![]);
        d.interrupted = true;
        let path = save(&dir.path().join("nested"), &d).unwrap();
        let loaded = load(&path).unwrap();
        assert!(loaded.interrupted);
        assert!(loaded.results.is_empty());
    }

    #[test]
    fn test_documents_without_suite_still_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut v = serde_json::to_value(doc(vec![])).unwrap();
        v.as_object_mut().unwrap().remove("suite");
        let p = dir.path().join("old.json");
        std::fs::write(&p, v.to_string()).unwrap();
        assert_eq!(load(&p).unwrap().suite, "");
    }

    #[test]
    fn test_load_garbage_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("bad.json");
        std::fs::write(&p, "not json").unwrap();
        assert!(load(&p).is_err());
    }
}
