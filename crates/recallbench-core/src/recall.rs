use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::debug;

use crate::memory::{MemoryService, RecallHit, RecallRequest};
use crate::scoring;

// ---------------------------------------------------------------------------
// SearchMethod / Tier
// ---------------------------------------------------------------------------

/// Retrieval algorithm requested from the service, passed through as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    Keyword,
    Semantic,
    Hybrid,
}

impl fmt::Display for SearchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Keyword => write!(f, "keyword"),
            Self::Semantic => write!(f, "semantic"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl std::str::FromStr for SearchMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "keyword" | "lexical" => Ok(Self::Keyword),
            "semantic" => Ok(Self::Semantic),
            "hybrid" => Ok(Self::Hybrid),
            _ => Err(format!("invalid search method: {s}")),
        }
    }
}

/// Product tier; each maps to one search method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Free,
    Standard,
    Pro,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Free, Tier::Standard, Tier::Pro];

    pub fn search_method(self) -> SearchMethod {
        match self {
            Self::Free => SearchMethod::Keyword,
            Self::Standard => SearchMethod::Semantic,
            Self::Pro => SearchMethod::Hybrid,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Free => "Free tier (keyword search only)",
            Self::Standard => "Standard tier (semantic search with embeddings)",
            Self::Pro => "Pro tier (hybrid search: semantic + keyword + RRF fusion)",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Free => write!(f, "free"),
            Self::Standard => write!(f, "standard"),
            Self::Pro => write!(f, "pro"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Self::Free),
            "standard" => Ok(Self::Standard),
            "pro" => Ok(Self::Pro),
            _ => Err(format!("invalid tier: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Probe
// ---------------------------------------------------------------------------

/// Outcome of one search request. Never persisted on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct RecallResult {
    pub requested: SearchMethod,
    /// Method the service says it used; falls back to the requested one.
    pub reported: String,
    pub hits: Vec<RecallHit>,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

impl RecallResult {
    pub fn top_score(&self) -> f64 {
        self.hits.first().map(|h| h.score).unwrap_or(0.0)
    }

    pub fn avg_score(&self) -> f64 {
        if self.hits.is_empty() {
            return 0.0;
        }
        self.hits.iter().map(|h| h.score).sum::<f64>() / self.hits.len() as f64
    }

    /// Fraction of `keywords` present anywhere in the combined hit contents.
    pub fn keyword_coverage(&self, keywords: &[String]) -> Coverage {
        let combined = self
            .hits
            .iter()
            .map(|h| h.memory.content.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        let (hit, missed): (Vec<String>, Vec<String>) = keywords
            .iter()
            .cloned()
            .partition(|k| scoring::contains_keyword(&combined, k));
        let ratio = if keywords.is_empty() {
            0.0
        } else {
            hit.len() as f64 / keywords.len() as f64
        };
        Coverage { ratio, hit, missed }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coverage {
    pub ratio: f64,
    pub hit: Vec<String>,
    pub missed: Vec<String>,
}

/// Issue one recall request. Failures land in `error`, never propagate.
pub fn probe(
    service: &dyn MemoryService,
    query: &str,
    method: SearchMethod,
    limit: usize,
) -> RecallResult {
    let start = Instant::now();
    let request = RecallRequest {
        query: query.to_string(),
        limit,
        search_method: Some(method),
    };
    let result = service.recall(&request);
    let elapsed_ms = start.elapsed().as_millis() as u64;

    match result {
        Ok(resp) => {
            debug!("{method} probe: {} hits in {elapsed_ms}ms", resp.results.len());
            RecallResult {
                requested: method,
                reported: resp.search_method.unwrap_or_else(|| method.to_string()),
                hits: resp.results,
                elapsed_ms,
                error: None,
            }
        }
        Err(e) => RecallResult {
            requested: method,
            reported: method.to_string(),
            hits: Vec::new(),
            elapsed_ms,
            error: Some(e.to_string()),
        },
    }
}

pub const NO_MEMORIES: &str = "(no relevant memories found)";

/// Render hits as one `[relevance: 0.812] content` line each, best first.
pub fn format_as_context(result: &RecallResult) -> String {
    if result.hits.is_empty() {
        return NO_MEMORIES.to_string();
    }
    let mut hits: Vec<&RecallHit> = result.hits.iter().collect();
    hits.sort_by(|a, b| b.score.total_cmp(&a.score));
    hits.iter()
        .map(|h| format!("[relevance: {:.3}] {}", h.score, h.memory.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::fake::FakeService;
    use crate::memory::{MemoryRecord, StoredMemory};

    fn hit(content: &str, score: f64) -> RecallHit {
        RecallHit {
            memory: StoredMemory {
                id: content.into(),
                content: content.into(),
                tags: vec![],
                subject: None,
            },
            score,
        }
    }

    fn result(hits: Vec<RecallHit>) -> RecallResult {
        RecallResult {
            requested: SearchMethod::Hybrid,
            reported: "hybrid".into(),
            hits,
            elapsed_ms: 3,
            error: None,
        }
    }

    #[test]
    fn test_tier_method_mapping() {
        assert_eq!(Tier::Free.search_method(), SearchMethod::Keyword);
        assert_eq!(Tier::Standard.search_method(), SearchMethod::Semantic);
        assert_eq!(Tier::Pro.search_method(), SearchMethod::Hybrid);
        assert_eq!("pro".parse::<Tier>(), Ok(Tier::Pro));
    }

    #[test]
    fn test_search_method_serializes_lowercase() {
        let json = serde_json::to_string(&SearchMethod::Semantic).unwrap();
        assert_eq!(json, "\"semantic\"");
    }

    #[test]
    fn test_format_sorts_by_relevance() {
        let ctx = format_as_context(&result(vec![hit("low", 0.1), hit("high", 0.9)]));
        assert_eq!(ctx, "[relevance: 0.900] high\n[relevance: 0.100] low");
    }

    #[test]
    fn test_format_empty() {
        assert_eq!(format_as_context(&result(vec![])), NO_MEMORIES);
    }

    #[test]
    fn test_coverage_over_combined_contents() {
        let r = result(vec![hit("uses AES-256-GCM", 0.5), hit("pbkdf2 with salt", 0.4)]);
        let cov = r.keyword_coverage(&["AES-256-GCM".into(), "PBKDF2".into(), "RRF".into(), "salt".into()]);
        assert!((cov.ratio - 0.75).abs() < 1e-9);
        assert_eq!(cov.missed, vec!["RRF".to_string()]);
        assert!((r.top_score() - 0.5).abs() < 1e-9);
        assert!((r.avg_score() - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_probe_reports_service_method() {
        let svc = FakeService::default();
        svc.store(&MemoryRecord::fact("sync is incremental", &[], "sync"))
            .unwrap();
        let r = probe(&svc, "sync", SearchMethod::Semantic, 5);
        assert!(r.error.is_none());
        assert_eq!(r.reported, "semantic");
        assert_eq!(r.hits.len(), 1);
    }
}
