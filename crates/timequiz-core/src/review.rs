//! Post-quiz review built from the stored attempt history.

use serde::Serialize;

use crate::error::QuizError;
use crate::grading::normalize_answer;
use crate::model::{AttemptRecord, Table};
use crate::persistence::{CompletedSummary, Persistence};
use crate::scoring::ScoreResult;
use crate::traits::KvStore;

/// How one answer option is marked in the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptionMark {
    /// Selected and correct.
    SelectedCorrect,
    /// Selected but wrong.
    SelectedWrong,
    /// Not selected, but this was the correct answer.
    MissedCorrect,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewOption {
    pub text: String,
    pub mark: OptionMark,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewItem {
    /// One-based position in the quiz.
    pub number: usize,
    pub question_id: u32,
    pub question_text: String,
    pub table: Option<Table>,
    pub options: Vec<ReviewOption>,
    pub is_correct: bool,
    pub explanation: String,
}

impl ReviewItem {
    pub fn from_attempt(number: usize, attempt: &AttemptRecord) -> Self {
        let selected_text = attempt.selected_answer_text.as_deref().map(normalize_answer);
        let correct_text = normalize_answer(&attempt.correct_answer_text);
        let options = attempt
            .options
            .iter()
            .map(|text| {
                let normalized = normalize_answer(text);
                let selected = selected_text.as_deref() == Some(normalized.as_str());
                let correct = correct_text == normalized;
                let mark = match (selected, correct) {
                    (true, _) if attempt.is_correct => OptionMark::SelectedCorrect,
                    (true, _) => OptionMark::SelectedWrong,
                    (false, true) => OptionMark::MissedCorrect,
                    (false, false) => OptionMark::Neutral,
                };
                ReviewOption {
                    text: text.clone(),
                    mark,
                }
            })
            .collect();

        Self {
            number,
            question_id: attempt.question_id,
            question_text: attempt.question_text.clone(),
            table: attempt.table.clone(),
            options,
            is_correct: attempt.is_correct,
            explanation: attempt.explanation.clone(),
        }
    }

    /// Heading for the explanation block.
    pub fn verdict(&self) -> &'static str {
        if self.is_correct {
            "Your answer was correct!"
        } else {
            "Explanation"
        }
    }
}

/// Everything the detailed results view shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizReview {
    pub summary: Option<CompletedSummary>,
    pub score: Option<ScoreResult>,
    pub items: Vec<ReviewItem>,
}

impl QuizReview {
    pub fn new(attempts: &[AttemptRecord], summary: Option<CompletedSummary>) -> Self {
        let score = summary
            .as_ref()
            .map(|s| ScoreResult::compute(s.correct, s.incorrect, s.total));
        Self {
            summary,
            score,
            items: attempts
                .iter()
                .enumerate()
                .map(|(i, a)| ReviewItem::from_attempt(i + 1, a))
                .collect(),
        }
    }

    /// Load the review of the last completed quiz.
    ///
    /// Fails with `MissingNavigationContext` when neither an attempt history
    /// nor a summary is stored.
    pub fn load<S: KvStore>(persistence: &mut Persistence<S>) -> Result<Self, QuizError> {
        let attempts = persistence.load_completed_attempts().unwrap_or_default();
        let summary = persistence.load_summary();
        if attempts.is_empty() && summary.is_none() {
            return Err(QuizError::MissingNavigationContext);
        }
        Ok(Self::new(&attempts, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DEFAULT_DURATION_SECS;
    use crate::traits::MemoryStore;
    use chrono::Utc;

    fn attempt(selected: &str, correct: &str) -> AttemptRecord {
        AttemptRecord {
            question_id: 4,
            question_text: "Pick".into(),
            table: None,
            options: vec!["a".into(), "b".into(), "c".into()],
            selected_answer_text: Some(selected.into()),
            correct_answer_text: correct.into(),
            is_correct: selected == correct,
            explanation: "because".into(),
        }
    }

    fn marks(item: &ReviewItem) -> Vec<OptionMark> {
        item.options.iter().map(|o| o.mark).collect()
    }

    #[test]
    fn correct_answer_is_marked() {
        let item = ReviewItem::from_attempt(1, &attempt("b", "b"));
        assert_eq!(
            marks(&item),
            vec![
                OptionMark::Neutral,
                OptionMark::SelectedCorrect,
                OptionMark::Neutral
            ]
        );
        assert_eq!(item.verdict(), "Your answer was correct!");
    }

    #[test]
    fn wrong_answer_shows_missed_correct() {
        let item = ReviewItem::from_attempt(2, &attempt("a", "c"));
        assert_eq!(
            marks(&item),
            vec![
                OptionMark::SelectedWrong,
                OptionMark::Neutral,
                OptionMark::MissedCorrect
            ]
        );
        assert_eq!(item.number, 2);
        assert_eq!(item.verdict(), "Explanation");
    }

    #[test]
    fn missed_correct_matches_after_normalization() {
        let mut record = attempt("a", "c");
        record.options[2] = "1 100".into();
        record.correct_answer_text = "1\u{a0} 100".into();
        let item = ReviewItem::from_attempt(1, &record);
        assert_eq!(item.options[2].mark, OptionMark::MissedCorrect);
    }

    #[test]
    fn selected_option_matches_after_normalization() {
        let mut record = attempt(" b ", "b");
        record.is_correct = true;
        let item = ReviewItem::from_attempt(1, &record);
        assert_eq!(
            marks(&item),
            vec![
                OptionMark::Neutral,
                OptionMark::SelectedCorrect,
                OptionMark::Neutral
            ]
        );
    }

    #[test]
    fn load_without_history_is_missing_context() {
        let mut persistence = Persistence::new(MemoryStore::new(), DEFAULT_DURATION_SECS);
        assert_eq!(
            QuizReview::load(&mut persistence),
            Err(QuizError::MissingNavigationContext)
        );
    }

    #[test]
    fn load_builds_items_and_score() {
        let mut persistence = Persistence::new(MemoryStore::new(), DEFAULT_DURATION_SECS);
        let attempts = vec![attempt("a", "a"), attempt("b", "c")];
        let summary = CompletedSummary {
            session_id: None,
            quiz_key: Some("letters".into()),
            correct: 1,
            incorrect: 1,
            total: 2,
            timed_out: false,
            completed_at: Some(Utc::now()),
        };
        persistence.save_completed(&attempts, &summary).unwrap();

        let review = QuizReview::load(&mut persistence).unwrap();
        assert_eq!(review.items.len(), 2);
        let score = review.score.unwrap();
        // 5 * (1 - 0.25) = 3.75 -> 3.8
        assert!((score.final_score - 3.8).abs() < 1e-9);
    }
}
