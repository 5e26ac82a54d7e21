//! Built-in scenario catalog, explicit-file map and baseline knowledge corpus.

mod comprehensive;
mod conversational;

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};
use crate::memory::MemoryRecord;
use crate::scenario::{Category, GroundTruth, Scenario};

/// Label carried by every baseline corpus record.
pub const CORPUS_LABEL: &str = "bench:corpus";

/// Ids of the fast three-scenario subset.
pub const QUICK_IDS: [&str; 3] = ["ar_1_encryption", "ttl_1_deploy", "cr_1_pin_derivation"];

const DEPLOY_CONTEXT: &str = "The deploy script is at scripts/deploy.sh. It syncs to a public repo M4cs/ctxovrflw-client, tags, and triggers CI.";

// ---------------------------------------------------------------------------
// Suites
// ---------------------------------------------------------------------------

/// A named group of scenarios run together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Suite {
    /// Questions about the benchmarked codebase, answerable from files or memory.
    Core,
    /// Preferences, decisions and people that exist only in memory.
    Conversational,
    /// Temporal, entity, multi-hop and long-term memory abilities.
    Comprehensive,
}

impl Suite {
    pub const ALL: [Suite; 3] = [Suite::Core, Suite::Conversational, Suite::Comprehensive];

    pub fn scenarios(self) -> Vec<Scenario> {
        match self {
            Self::Core => core_scenarios(),
            Self::Conversational => conversational::scenarios(),
            Self::Comprehensive => comprehensive::scenarios(),
        }
    }
}

impl fmt::Display for Suite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Core => write!(f, "core"),
            Self::Conversational => write!(f, "conversational"),
            Self::Comprehensive => write!(f, "comprehensive"),
        }
    }
}

/// Every scenario of every suite; ids are unique across suites.
pub fn all_scenarios() -> Vec<Scenario> {
    Suite::ALL.into_iter().flat_map(Suite::scenarios).collect()
}

/// A scenario whose records are seeded into memory before each memory-backed run.
fn seeded(
    id: &str,
    category: Category,
    question: &str,
    truth: &str,
    keywords: &[&str],
    clear_query: &str,
    records: Vec<MemoryRecord>,
) -> Scenario {
    Scenario::new(id, category, question, GroundTruth::new(keywords, truth, 10))
        .with_seeds(clear_query, records)
}

// ---------------------------------------------------------------------------
// Core scenarios
// ---------------------------------------------------------------------------

fn core_scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(
            "ar_1_encryption",
            Category::AccurateRetrieval,
            "What encryption algorithm does ctxovrflw use for sync? What are the PBKDF2 parameters?",
            GroundTruth::new(
                &[
                    "AES-256-GCM",
                    "PBKDF2",
                    "600,000",
                    "SHA-256",
                    "salt",
                    "encryption",
                    "ctxovrflw-zk-v1-",
                ],
                "AES-256-GCM encryption and PBKDF2 with 600,000 iterations using SHA-256 with server-generated salt prefix ctxovrflw-zk-v1-",
                10,
            ),
        ),
        Scenario::new(
            "ar_2_hybrid_search",
            Category::AccurateRetrieval,
            "How does the hybrid search work? What fusion method is used?",
            GroundTruth::new(
                &[
                    "hybrid",
                    "semantic",
                    "lexical",
                    "BM25",
                    "embeddings",
                    "Reciprocal Rank Fusion",
                    "RRF",
                    "k=60",
                ],
                "Hybrid search combining semantic embeddings with BM25 lexical search using RRF fusion with k=60",
                10,
            ),
        ),
        Scenario::new(
            "ar_3_ci_platforms",
            Category::AccurateRetrieval,
            "What platforms does the CI build for? List all 5.",
            GroundTruth::new(
                &[
                    "Linux x64",
                    "Linux ARM64",
                    "Windows x64",
                    "macOS x64",
                    "macOS ARM64",
                ],
                "All 5 target platforms exactly as stored: Linux x64, Linux ARM64, Windows x64, macOS x64, macOS ARM64",
                10,
            ),
        ),
        Scenario::new(
            "ttl_1_deploy",
            Category::CrossSessionRecall,
            "How do I deploy a new version of ctxovrflw?",
            GroundTruth::new(
                &[
                    "scripts/deploy.sh",
                    "deploy",
                    "script",
                    "M4cs/ctxovrflw-client",
                    "public",
                    "repo",
                    "tag",
                    "CI",
                    "trigger",
                ],
                "Recall the deployment process from an earlier session",
                10,
            ),
        )
        .with_prior_session(DEPLOY_CONTEXT),
        Scenario::new(
            "lru_1_auth_flow",
            Category::LongRangeUnderstanding,
            "Trace the full auth flow from device code request to first encrypted sync. What are all the steps?",
            GroundTruth::new(
                &[
                    "device code",
                    "OAuth",
                    "token",
                    "PIN",
                    "encryption",
                    "key derivation",
                    "encrypted sync",
                    "upload",
                ],
                "device code request -> OAuth token exchange -> PIN-based encryption key derivation -> encrypted sync",
                15,
            ),
        ),
        Scenario::new(
            "cr_1_pin_derivation",
            Category::ConflictResolution,
            "How is the PIN encryption key derived?",
            GroundTruth::new(
                &[
                    "server-generated",
                    "random",
                    "salt",
                    "PIN",
                    "encryption",
                    "key",
                    "v0.4.2",
                    "current",
                ],
                "Prefer the current method (server-generated random salt, v0.4.2) over the outdated email salt",
                10,
            ),
        )
        .with_seeds(
            "PIN key derivation",
            vec![
                MemoryRecord::fact(
                    "PIN key derivation uses email as salt",
                    &["auth", "PIN", "outdated"],
                    "encryption",
                ),
                MemoryRecord::fact(
                    "PIN key derivation uses server-generated random salt (v0.4.2)",
                    &["auth", "PIN", "current", "v0.4.2"],
                    "encryption",
                ),
            ],
        ),
        Scenario::new(
            "tier_1_vague_query",
            Category::TierComparison,
            "How does the project handle security for data at rest?",
            GroundTruth::new(
                &[
                    "AES-256-GCM",
                    "encryption",
                    "PBKDF2",
                    "zero-knowledge",
                    "encrypted data",
                    "salt",
                    "PIN",
                ],
                "Vague query with no lexical match for 'data at rest'; semantic should beat keyword",
                10,
            ),
        ),
        Scenario::new(
            "tier_2_conceptual_query",
            Category::TierComparison,
            "What prevents the cloud service from reading user data?",
            GroundTruth::new(
                &[
                    "zero-knowledge",
                    "cannot decrypt",
                    "encrypted",
                    "encrypt",
                    "PIN",
                    "key derivation",
                    "server",
                ],
                "Conceptual query; 'reading user data' never matches 'zero-knowledge' lexically",
                10,
            ),
        ),
        Scenario::new(
            "tier_3_multi_concept",
            Category::TierComparison,
            "How does the system ensure data integrity and consistency across multiple devices?",
            GroundTruth::new(
                &[
                    "sync",
                    "incremental",
                    "conflict",
                    "encrypted",
                    "upload",
                    "download",
                    "resolution",
                ],
                "Spans sync, encryption and conflict resolution; hybrid should combine both signals",
                10,
            ),
        ),
    ]
}

pub fn quick_scenarios() -> Vec<Scenario> {
    core_scenarios()
        .into_iter()
        .filter(|s| QUICK_IDS.contains(&s.id.as_str()))
        .collect()
}

pub fn find_by_id(id: &str) -> BenchResult<Scenario> {
    all_scenarios()
        .into_iter()
        .find(|s| s.id == id)
        .ok_or_else(|| BenchError::ScenarioNotFound(id.to_string()))
}

pub fn by_category(category: Category) -> Vec<Scenario> {
    all_scenarios()
        .into_iter()
        .filter(|s| s.category == category)
        .collect()
}

// ---------------------------------------------------------------------------
// Explicit-context file map
// ---------------------------------------------------------------------------

/// Scenario id to repository-relative files handed to the explicit-context mode.
pub fn explicit_files() -> BTreeMap<String, Vec<String>> {
    let entries: [(&str, &[&str]); 5] = [
        (
            "ar_1_encryption",
            &[
                "src/crypto/mod.rs",
                "src/crypto/encryption.rs",
                "src/sync/mod.rs",
                "Cargo.toml",
            ],
        ),
        (
            "ar_2_hybrid_search",
            &[
                "src/search/mod.rs",
                "src/search/hybrid.rs",
                "src/search/semantic.rs",
                "src/search/lexical.rs",
            ],
        ),
        (
            "ar_3_ci_platforms",
            &[
                ".github/workflows/ci.yml",
                ".github/workflows/release.yml",
                "Cargo.toml",
            ],
        ),
        (
            "lru_1_auth_flow",
            &[
                "src/device-auth.ts",
                "src/auth.ts",
                "src/login.rs",
                "src/crypto/mod.rs",
                "src/sync/mod.rs",
                "src/api/auth.rs",
            ],
        ),
        (
            "cr_1_pin_derivation",
            &[
                "src/crypto/pin.rs",
                "src/crypto/mod.rs",
                "src/auth/pin.rs",
                "CHANGELOG.md",
            ],
        ),
    ];
    entries
        .into_iter()
        .map(|(id, files)| {
            (
                id.to_string(),
                files.iter().map(|f| (*f).to_string()).collect(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Baseline corpus
// ---------------------------------------------------------------------------

/// Architecture, security, deployment and code-structure facts about the
/// benchmarked project. Conflict records are seeded per scenario instead.
pub fn seed_corpus() -> Vec<MemoryRecord> {
    vec![
        // architecture
        MemoryRecord::fact(
            "ctxovrflw uses AES-256-GCM for encryption with PBKDF2 key derivation using 600,000 iterations and SHA-256. Salt prefix is 'ctxovrflw-zk-v1-' prepended to server-generated random salt before PBKDF2.",
            &["architecture", "security", "encryption", "AES", "PBKDF2"],
            "encryption",
        ),
        MemoryRecord::fact(
            "Hybrid search combines semantic embeddings with BM25 lexical search using Reciprocal Rank Fusion (RRF) with k=60",
            &["architecture", "search", "hybrid", "RRF", "BM25", "semantic"],
            "search",
        ),
        MemoryRecord::fact(
            "Authentication flow: device code request -> OAuth token exchange -> PIN-based encryption key derivation -> encrypted sync",
            &["architecture", "auth", "oauth", "device-code", "PIN"],
            "authentication",
        ),
        MemoryRecord::fact(
            "Sync protocol encrypts memories locally before upload using derived PIN key, supports incremental sync with conflict resolution",
            &["architecture", "sync", "encryption", "incremental", "conflicts"],
            "sync",
        ),
        // security
        MemoryRecord::fact(
            "PIN encryption key derivation uses server-generated random salt (v0.4.2 current method)",
            &["security", "PIN", "salt", "v0.4.2", "current"],
            "encryption",
        ),
        MemoryRecord::fact(
            "Old PIN key derivation used email as salt (pre-v0.4.2, deprecated for security)",
            &["security", "PIN", "email", "salt", "deprecated", "outdated"],
            "encryption",
        ),
        MemoryRecord::fact(
            "Zero-knowledge architecture: server cannot decrypt user memories, only stores encrypted data",
            &["security", "zero-knowledge", "privacy", "encryption"],
            "privacy",
        ),
        MemoryRecord::fact(
            "OAuth scopes: read:memories, write:memories, delete:memories for granular access control",
            &["security", "oauth", "scopes", "access-control"],
            "authorization",
        ),
        // deployment
        MemoryRecord::fact(
            "CI builds for 5 platforms: Linux x64, Linux ARM64, Windows x64, macOS x64, macOS ARM64",
            &["deployment", "CI", "platforms", "linux", "windows", "macos", "arm64"],
            "build",
        ),
        MemoryRecord::fact(
            "Release workflow uses GitHub Actions with matrix builds for cross-platform binaries",
            &["deployment", "github-actions", "matrix", "cross-platform"],
            "ci",
        ),
        MemoryRecord::fact(
            "Deployment script at scripts/deploy.sh syncs to public repo M4cs/ctxovrflw-client and triggers CI",
            &["deployment", "script", "sync", "public-repo", "trigger"],
            "deploy",
        ),
        // code structure
        MemoryRecord::fact(
            "Key authentication files: src/device-auth.ts (device flow), src/auth.ts (tokens), src/login.rs (PIN)",
            &["code", "auth", "files", "device-auth", "login"],
            "codebase",
        ),
        MemoryRecord::fact(
            "Crypto implementation in src/crypto/mod.rs with encryption, key derivation, and PIN handling",
            &["code", "crypto", "files", "encryption", "keys"],
            "codebase",
        ),
        MemoryRecord::fact(
            "Search implementation in src/search/ with hybrid.rs, semantic.rs, and lexical.rs modules",
            &["code", "search", "files", "hybrid", "semantic", "lexical"],
            "codebase",
        ),
        MemoryRecord::fact(
            "Sync logic in src/sync/mod.rs handles encrypted upload/download and conflict resolution",
            &["code", "sync", "files", "upload", "download", "conflicts"],
            "codebase",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let all = all_scenarios();
        let ids: HashSet<&str> = all.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids.len(), all.len());
    }

    #[test]
    fn test_quick_subset_covers_three_categories() {
        let quick = quick_scenarios();
        assert_eq!(quick.len(), 3);
        let cats: HashSet<Category> = quick.iter().map(|s| s.category).collect();
        assert!(cats.contains(&Category::AccurateRetrieval));
        assert!(cats.contains(&Category::CrossSessionRecall));
        assert!(cats.contains(&Category::ConflictResolution));
    }

    #[test]
    fn test_find_by_id() {
        assert_eq!(find_by_id("lru_1_auth_flow").unwrap().ground_truth.points, 15);
        assert!(matches!(
            find_by_id("nope"),
            Err(BenchError::ScenarioNotFound(_))
        ));
    }

    #[test]
    fn test_setup_data_matches_category() {
        for s in all_scenarios() {
            assert_eq!(
                s.setup.prior_session_context.is_some(),
                s.category.is_cross_session(),
                "{}",
                s.id
            );
        }
        let cr = find_by_id("cr_1_pin_derivation").unwrap();
        assert_eq!(cr.setup.seeds.unwrap().records.len(), 2);
    }

    #[test]
    fn test_every_seed_is_reachable_by_its_clear_query() {
        for s in all_scenarios() {
            let Some(seeds) = &s.setup.seeds else { continue };
            assert!(!seeds.records.is_empty(), "{}", s.id);
            let query = seeds.clear_query.to_lowercase();
            for r in &seeds.records {
                assert!(r.content.to_lowercase().contains(&query), "{}: {}", s.id, r.content);
            }
        }
    }

    #[test]
    fn test_suites() {
        assert_eq!(Suite::Core.scenarios().len(), 9);
        assert_eq!(Suite::Conversational.scenarios().len(), 11);
        assert_eq!(Suite::Comprehensive.scenarios().len(), 22);
        assert_eq!(all_scenarios().len(), 42);
        // Only the core suite relies on the baseline corpus.
        for suite in [Suite::Conversational, Suite::Comprehensive] {
            assert!(suite.scenarios().iter().all(|s| s.setup.seeds.is_some()));
        }
        assert_eq!(Suite::Comprehensive.to_string(), "comprehensive");
    }

    #[test]
    fn test_by_category_spans_suites() {
        assert_eq!(by_category(Category::TierComparison).len(), 3);
        assert_eq!(by_category(Category::MultiHop).len(), 3);
        // cr_1 plus the two contradiction scenarios
        assert_eq!(by_category(Category::ConflictResolution).len(), 3);
        assert!(by_category(Category::Preferences)
            .iter()
            .all(|s| s.setup.seeds.as_ref().unwrap().records[0].kind == crate::memory::MemoryKind::Preference));
    }

    #[test]
    fn test_explicit_files_skip_tier_and_cross_session() {
        let map = explicit_files();
        assert!(map.contains_key("ar_1_encryption"));
        assert!(!map.contains_key("ttl_1_deploy"));
        assert!(!map.contains_key("tier_1_vague_query"));
    }

    #[test]
    fn test_corpus_is_nonempty_facts() {
        let corpus = seed_corpus();
        assert!(corpus.len() >= 10);
        assert!(corpus.iter().all(|r| !r.labels.is_empty()));
    }
}
