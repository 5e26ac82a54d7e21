use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use crate::scenario::GroundTruth;

// ---------------------------------------------------------------------------
// Keyword score
// ---------------------------------------------------------------------------

/// Case-insensitive substring match.
pub fn contains_keyword(text: &str, keyword: &str) -> bool {
    text.to_lowercase().contains(&keyword.to_lowercase())
}

/// Fraction of `keywords` found in `answer`. No keywords scores 0.
pub fn keyword_score(answer: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() || answer.is_empty() {
        return 0.0;
    }
    let answer = answer.to_lowercase();
    let matched = keywords
        .iter()
        .filter(|k| answer.contains(&k.to_lowercase()))
        .count();
    matched as f64 / keywords.len() as f64
}

// ---------------------------------------------------------------------------
// Judge
// ---------------------------------------------------------------------------

pub fn judge_prompt(question: &str, answer: &str, truth: &GroundTruth) -> String {
    format!(
        "You are an expert evaluator scoring technical answers about a software codebase.

Question: {question}

Student Answer: {answer}

Expected Information: {}

Key Facts to Look For: {}

Score this answer from 0-10 based on:
- Accuracy (40%): Are the technical facts correct?
- Completeness (40%): Does it cover the key points?
- Relevance (20%): Does it directly answer the question?

Respond with ONLY a number from 0 to 10 (can include one decimal, e.g. 7.5). Nothing else.",
        truth.description,
        truth.keywords.join(", ")
    )
}

fn score_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"\b([0-9](?:\.[0-9])?|10)\b").ok())
        .as_ref()
}

/// First integer or one-decimal number in a judge reply, clamped to [0, 10].
pub fn extract_judge_score(reply: &str) -> Option<f64> {
    let caps = score_pattern()?.captures(reply.trim())?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(value.clamp(0.0, 10.0))
}

// ---------------------------------------------------------------------------
// Composite
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    pub keyword: f64,
    pub judge: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            keyword: 0.4,
            judge: 0.6,
        }
    }
}

/// Without a judge score the composite is the keyword score, unweighted.
pub fn composite_score(keyword: f64, judge: Option<f64>, weights: ScoringWeights) -> f64 {
    match judge {
        Some(j) => weights.keyword * keyword + weights.judge * (j / 10.0),
        None => keyword,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Scores {
    pub keyword: f64,
    pub judge: Option<f64>,
    pub composite: f64,
}

impl Scores {
    pub fn new(keyword: f64, judge: Option<f64>, weights: ScoringWeights) -> Self {
        Self {
            keyword,
            judge,
            composite: composite_score(keyword, judge, weights),
        }
    }
}
