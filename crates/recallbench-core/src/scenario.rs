use serde::{Deserialize, Serialize};
use std::fmt;

use crate::memory::MemoryRecord;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    AccurateRetrieval,
    CrossSessionRecall,
    LongRangeUnderstanding,
    ConflictResolution,
    TierComparison,
    // Conversational suite
    Preferences,
    Relationships,
    ProjectContext,
    CrossAgent,
    Reminders,
    // Comprehensive suite
    TemporalReasoning,
    EntityTracking,
    PreferenceEvolution,
    MultiHop,
    LongTermConsistency,
    SocialContext,
    SpatialContext,
    PersonalFacts,
}

impl Category {
    /// Tier scenarios run the three-way tier path instead of the mode cross-product.
    pub fn is_tier_comparison(self) -> bool {
        matches!(self, Self::TierComparison)
    }

    pub fn is_cross_session(self) -> bool {
        matches!(self, Self::CrossSessionRecall)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AccurateRetrieval => write!(f, "Accurate Retrieval"),
            Self::CrossSessionRecall => write!(f, "Cross-Session Recall"),
            Self::LongRangeUnderstanding => write!(f, "Long-Range Understanding"),
            Self::ConflictResolution => write!(f, "Conflict Resolution"),
            Self::TierComparison => write!(f, "Tier Comparison"),
            Self::Preferences => write!(f, "Preferences"),
            Self::Relationships => write!(f, "Relationships"),
            Self::ProjectContext => write!(f, "Project Context"),
            Self::CrossAgent => write!(f, "Cross-Agent"),
            Self::Reminders => write!(f, "Reminders"),
            Self::TemporalReasoning => write!(f, "Temporal"),
            Self::EntityTracking => write!(f, "Entity Tracking"),
            Self::PreferenceEvolution => write!(f, "Preference Evolution"),
            Self::MultiHop => write!(f, "Multi-hop"),
            Self::LongTermConsistency => write!(f, "Long-term"),
            Self::SocialContext => write!(f, "Social"),
            Self::SpatialContext => write!(f, "Spatial"),
            Self::PersonalFacts => write!(f, "Personal"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', ' '], "_").as_str() {
            "accurate_retrieval" | "ar" => Ok(Self::AccurateRetrieval),
            "cross_session_recall" | "test_time_learning" | "ttl" => Ok(Self::CrossSessionRecall),
            "long_range_understanding" | "lru" => Ok(Self::LongRangeUnderstanding),
            "conflict_resolution" | "contradiction" | "cr" => Ok(Self::ConflictResolution),
            "tier_comparison" | "tier" => Ok(Self::TierComparison),
            "preferences" | "preference" | "pref" => Ok(Self::Preferences),
            "relationships" | "rel" => Ok(Self::Relationships),
            "project_context" | "proj" => Ok(Self::ProjectContext),
            "cross_agent" | "agent" => Ok(Self::CrossAgent),
            "reminders" | "remind" => Ok(Self::Reminders),
            "temporal" | "temporal_reasoning" => Ok(Self::TemporalReasoning),
            "entity_tracking" | "entity" => Ok(Self::EntityTracking),
            "preference_evolution" | "pref_evo" => Ok(Self::PreferenceEvolution),
            "multi_hop" | "multihop" => Ok(Self::MultiHop),
            "long_term" | "long_term_consistency" | "longterm" => Ok(Self::LongTermConsistency),
            "social" | "social_context" => Ok(Self::SocialContext),
            "spatial" | "spatial_context" => Ok(Self::SpatialContext),
            "personal" | "personal_facts" => Ok(Self::PersonalFacts),
            _ => Err(format!("invalid category: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// GroundTruth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    /// Required keywords or phrases, in catalog order.
    pub keywords: Vec<String>,
    pub description: String,
    pub points: u32,
}

impl GroundTruth {
    pub fn new(keywords: &[&str], description: impl Into<String>, points: u32) -> Self {
        Self {
            keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            description: description.into(),
            points,
        }
    }
}

// ---------------------------------------------------------------------------
// Setup data
// ---------------------------------------------------------------------------

/// Records a memory-backed run needs in the service before it starts: the
/// contradictory pair of a conflict scenario, or the facts a conversational
/// question is about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedSet {
    /// Query that recalls every seeded record; used to clear them again.
    pub clear_query: String,
    pub records: Vec<MemoryRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SetupData {
    /// What the agent was told in an earlier session (cross-session scenarios).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prior_session_context: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seeds: Option<SeedSet>,
}

// ---------------------------------------------------------------------------
// Scenario
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub id: String,
    pub category: Category,
    pub question: String,
    pub ground_truth: GroundTruth,
    #[serde(default)]
    pub setup: SetupData,
}

impl Scenario {
    pub fn new(
        id: impl Into<String>,
        category: Category,
        question: impl Into<String>,
        ground_truth: GroundTruth,
    ) -> Self {
        Self {
            id: id.into(),
            category,
            question: question.into(),
            ground_truth,
            setup: SetupData::default(),
        }
    }

    pub fn with_prior_session(mut self, context: impl Into<String>) -> Self {
        self.setup.prior_session_context = Some(context.into());
        self
    }

    pub fn with_seeds(mut self, clear_query: impl Into<String>, records: Vec<MemoryRecord>) -> Self {
        self.setup.seeds = Some(SeedSet {
            clear_query: clear_query.into(),
            records,
        });
        self
    }

    /// Label carried by every record the harness seeds for this scenario.
    pub fn seed_label(&self) -> String {
        format!("bench:{}", self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_aliases() {
        assert_eq!("ttl".parse::<Category>(), Ok(Category::CrossSessionRecall));
        assert_eq!(
            "Tier Comparison".parse::<Category>(),
            Ok(Category::TierComparison)
        );
        assert_eq!(
            "conflict-resolution".parse::<Category>(),
            Ok(Category::ConflictResolution)
        );
        assert_eq!("Multi-hop".parse::<Category>(), Ok(Category::MultiHop));
        assert_eq!("long-term".parse::<Category>(), Ok(Category::LongTermConsistency));
        assert!("nonsense".parse::<Category>().is_err());
    }

    #[test]
    fn test_display_parses_back() {
        let all = [
            Category::AccurateRetrieval,
            Category::CrossSessionRecall,
            Category::LongRangeUnderstanding,
            Category::ConflictResolution,
            Category::TierComparison,
            Category::Preferences,
            Category::Relationships,
            Category::ProjectContext,
            Category::CrossAgent,
            Category::Reminders,
            Category::TemporalReasoning,
            Category::EntityTracking,
            Category::PreferenceEvolution,
            Category::MultiHop,
            Category::LongTermConsistency,
            Category::SocialContext,
            Category::SpatialContext,
            Category::PersonalFacts,
        ];
        for c in all {
            assert_eq!(c.to_string().parse::<Category>(), Ok(c), "{c}");
        }
    }

    #[test]
    fn test_builder_sets_setup() {
        let s = Scenario::new(
            "x",
            Category::CrossSessionRecall,
            "q?",
            GroundTruth::new(&["a"], "d", 10),
        )
        .with_prior_session("remember this");
        assert_eq!(s.setup.prior_session_context.as_deref(), Some("remember this"));
        assert!(s.setup.seeds.is_none());
        assert_eq!(s.seed_label(), "bench:x");
    }
}
