use tracing::debug;

use recallbench_core::scoring::{judge_prompt, keyword_score};
use recallbench_core::{RunRecord, Scenario, Scores, ScoringWeights};

use crate::judge::JudgeChain;

/// Turns an unscored run record into a scored one.
pub struct Scorer {
    judge: JudgeChain,
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(judge: JudgeChain, weights: ScoringWeights) -> Self {
        Self { judge, weights }
    }

    pub fn scores_for(&self, scenario: &Scenario, record: &RunRecord) -> Scores {
        // Only the answer text counts; an errored run may still carry one.
        if record.final_answer.trim().is_empty() {
            return Scores::new(0.0, None, self.weights);
        }
        let keyword = keyword_score(&record.final_answer, &scenario.ground_truth.keywords);
        let judge = if record.is_error() {
            None
        } else {
            self.judge.score(&judge_prompt(
                &scenario.question,
                &record.final_answer,
                &scenario.ground_truth,
            ))
        };
        debug!(
            "{} / {} / {}: keyword={keyword:.2} judge={judge:?}",
            record.scenario_id, record.mode, record.platform
        );
        Scores::new(keyword, judge, self.weights)
    }

    pub fn score(&self, scenario: &Scenario, record: RunRecord) -> RunRecord {
        let scores = self.scores_for(scenario, &record);
        record.with_scores(scores)
    }

    /// Keyword coverage alone, for runs whose judge call was abandoned.
    pub fn keyword_only(&self, scenario: &Scenario, record: RunRecord) -> RunRecord {
        let keyword = keyword_score(&record.final_answer, &scenario.ground_truth.keywords);
        record.with_scores(Scores::new(keyword, None, self.weights))
    }
}
