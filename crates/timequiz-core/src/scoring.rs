//! Score computation with a wrong-answer penalty, and feedback tiers.
//!
//! Each question is worth `MAX_SCORE / total` points. A wrong answer costs a
//! quarter of that; unanswered questions cost nothing. The final score is
//! rounded to one decimal and never drops below zero.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Best possible score.
pub const MAX_SCORE: f64 = 10.0;

/// Fraction of a question's points deducted per wrong answer.
pub const WRONG_ANSWER_PENALTY: f64 = 0.25;

/// Qualitative feedback bucket for a final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackTier {
    /// The played set had no questions.
    NoData,
    /// Below 5.
    Fail,
    /// 5 up to (not including) 7.
    Pass,
    /// 7 up to (not including) the maximum.
    PassExcellent,
    /// Exactly the maximum.
    Perfect,
}

impl FeedbackTier {
    /// Tier for a final score in `[0, MAX_SCORE]`.
    pub fn for_score(score: f64) -> Self {
        if score < 5.0 {
            FeedbackTier::Fail
        } else if score < 7.0 {
            FeedbackTier::Pass
        } else if score < MAX_SCORE {
            FeedbackTier::PassExcellent
        } else {
            FeedbackTier::Perfect
        }
    }

    /// User-facing feedback line.
    pub fn message(self) -> &'static str {
        match self {
            FeedbackTier::NoData => {
                "No questions were attempted, or score could not be calculated."
            }
            FeedbackTier::Fail => "You failed. Better luck next time!",
            FeedbackTier::Pass => "You passed! Good effort.",
            FeedbackTier::PassExcellent => "You passed! Excellent work!",
            FeedbackTier::Perfect => "Perfect Score! Absolutely brilliant!",
        }
    }
}

impl fmt::Display for FeedbackTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedbackTier::NoData => write!(f, "no data"),
            FeedbackTier::Fail => write!(f, "fail"),
            FeedbackTier::Pass => write!(f, "pass"),
            FeedbackTier::PassExcellent => write!(f, "pass (excellent)"),
            FeedbackTier::Perfect => write!(f, "perfect"),
        }
    }
}

/// Derived score for a set of final counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// In `[0, MAX_SCORE]`, one decimal place.
    pub final_score: f64,
    /// In `[0, 100]`.
    pub progress_percent: f64,
    pub tier: FeedbackTier,
}

impl ScoreResult {
    /// Compute the score for `correct` and `incorrect` answers out of `total`
    /// questions in the played set.
    ///
    /// `total` may exceed `correct + incorrect` when a quiz timed out.
    pub fn compute(correct: u32, incorrect: u32, total: u32) -> Self {
        if total == 0 {
            return Self {
                final_score: 0.0,
                progress_percent: 0.0,
                tier: FeedbackTier::NoData,
            };
        }

        let points_per_question = MAX_SCORE / f64::from(total);
        let raw = points_per_question
            * (f64::from(correct) - WRONG_ANSWER_PENALTY * f64::from(incorrect));
        let final_score = round_one_decimal(raw).max(0.0);
        let progress_percent = (final_score / MAX_SCORE * 100.0).max(0.0);

        Self {
            final_score,
            progress_percent,
            tier: FeedbackTier::for_score(final_score),
        }
    }
}

/// Round half up to one decimal place.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0 + 0.5).floor() / 10.0
}
