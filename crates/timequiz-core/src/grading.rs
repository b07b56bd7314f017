//! Answer normalization and grading.

use crate::error::QuestionDefect;
use crate::model::Question;

/// Outcome of grading one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    pub is_correct: bool,
    /// Set when the question record is malformed; such answers are never correct.
    pub defect: Option<QuestionDefect>,
}

/// Trim, then collapse every run of whitespace (including non-breaking
/// spaces) into one ASCII space.
pub fn normalize_answer(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Grade `selected` against the question's correct answer.
///
/// Comparison is exact on normalized forms. A malformed question grades as
/// incorrect and the defect is logged.
pub fn grade(question: &Question, selected: &str) -> Grade {
    if let Some(defect) = question.defect() {
        tracing::warn!("grading malformed question as incorrect: {defect}");
        return Grade {
            is_correct: false,
            defect: Some(defect),
        };
    }

    let is_correct = normalize_answer(question.correct_text()) == normalize_answer(selected);
    Grade {
        is_correct,
        defect: None,
    }
}
