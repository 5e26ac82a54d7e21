pub mod catalog;
pub mod error;
pub mod memory;
pub mod recall;
pub mod record;
pub mod scenario;
pub mod scoring;
pub mod summary;

pub use error::{BenchError, BenchResult};
pub use memory::{
    clear_matching, reseed, seed_batch, ClearOutcome, MemoryKind, MemoryRecord, MemoryService,
    RecallHit, RecallRequest, RecallResponse, SeedOutcome, ServiceHealth, StoredMemory,
};
pub use recall::{format_as_context, probe, RecallResult, SearchMethod, Tier};
pub use record::{ProbeTelemetry, RunRecord};
pub use scenario::{Category, GroundTruth, Scenario, SetupData};
pub use scoring::{Scores, ScoringWeights};
pub use summary::{AggregateStats, GroupStats};
