//! Core data model types for timequiz.
//!
//! Quiz sets and questions come from the question bank and are never
//! mutated. `SessionState` is the single mutable aggregate, owned by
//! [`QuizSession`](crate::session::QuizSession).

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuestionDefect;
use crate::grading::normalize_answer;

/// Default quiz duration: two hours.
pub const DEFAULT_DURATION_SECS: u32 = 2 * 60 * 60;

/// A named, ordered collection of questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSet {
    /// Lookup key (e.g. "geography").
    pub key: String,
    /// Display name.
    pub name: String,
    /// Optional description shown in listings.
    #[serde(default)]
    pub description: String,
    /// Questions in play order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// A single multiple-choice question.
///
/// Text fields default to empty so that a malformed record still loads and
/// can be flagged by [`Question::defect`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique within its quiz set.
    pub id: u32,
    /// Question text.
    #[serde(default)]
    pub prompt: String,
    /// Optional table shown with the prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    /// Answer option texts, in display order.
    #[serde(default)]
    pub answers: Vec<String>,
    /// The canonical answer and its explanation.
    #[serde(default)]
    pub correct_answer: Option<CorrectAnswer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub headers: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectAnswer {
    /// Must match one of the question's options after normalization.
    pub text: String,
    #[serde(default)]
    pub explanation: String,
}

impl Question {
    /// Returns the first schema violation in this record, if any.
    pub fn defect(&self) -> Option<QuestionDefect> {
        if self.prompt.trim().is_empty() {
            return Some(QuestionDefect::EmptyPrompt(self.id));
        }
        if self.answers.is_empty() {
            return Some(QuestionDefect::NoAnswers(self.id));
        }
        let Some(correct) = &self.correct_answer else {
            return Some(QuestionDefect::MissingCorrectAnswer(self.id));
        };
        let wanted = normalize_answer(&correct.text);
        if !self.answers.iter().any(|a| normalize_answer(a) == wanted) {
            return Some(QuestionDefect::CorrectAnswerNotInOptions {
                id: self.id,
                answer: correct.text.clone(),
            });
        }
        None
    }

    /// Text of the correct answer, or empty if the record has none.
    pub fn correct_text(&self) -> &str {
        self.correct_answer
            .as_ref()
            .map(|c| c.text.as_str())
            .unwrap_or_default()
    }

    pub fn explanation(&self) -> &str {
        self.correct_answer
            .as_ref()
            .map(|c| c.explanation.as_str())
            .unwrap_or_default()
    }
}

/// Immutable record of one answered question.
///
/// Snapshots everything needed to review the question later, so the review
/// does not depend on the question bank still being available.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub question_id: u32,
    pub question_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<Table>,
    pub options: Vec<String>,
    /// The option text exactly as selected (not normalized).
    pub selected_answer_text: Option<String>,
    pub correct_answer_text: String,
    pub is_correct: bool,
    #[serde(default)]
    pub explanation: String,
}

impl AttemptRecord {
    /// Build the record for `question` answered with `selected`.
    pub fn new(question: &Question, selected: Option<&str>, is_correct: bool) -> Self {
        Self {
            question_id: question.id,
            question_text: question.prompt.clone(),
            table: question.table.clone(),
            options: question.answers.clone(),
            selected_answer_text: selected.map(str::to_string),
            correct_answer_text: question.correct_text().to_string(),
            is_correct,
            explanation: question.explanation().to_string(),
        }
    }
}

/// Lifecycle stage of a quiz session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    Idle,
    InProgress,
    Finished,
    TimedOut,
}

impl Phase {
    /// True for `Finished` and `TimedOut`.
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished | Phase::TimedOut)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Idle => write!(f, "idle"),
            Phase::InProgress => write!(f, "in progress"),
            Phase::Finished => write!(f, "finished"),
            Phase::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Full mutable state of one quiz session.
///
/// This is also the shape of the persisted in-progress snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    pub quiz_key: Option<String>,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub correct_count: u32,
    pub incorrect_count: u32,
    pub attempts: Vec<AttemptRecord>,
    pub time_remaining_secs: u32,
    pub phase: Phase,
}

impl SessionState {
    /// A cleared, idle session with a full clock.
    pub fn idle(duration_secs: u32) -> Self {
        Self {
            session_id: None,
            quiz_key: None,
            questions: Vec::new(),
            current_index: 0,
            correct_count: 0,
            incorrect_count: 0,
            attempts: Vec::new(),
            time_remaining_secs: duration_secs,
            phase: Phase::Idle,
        }
    }

    /// The question at `current_index`, if any.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// Check the structural invariants of a running session.
    ///
    /// Counts, attempts and the question pointer must agree, and the pointer
    /// must still point at an unanswered question.
    pub fn check_in_progress(&self, duration_secs: u32) -> Result<(), String> {
        if self.phase != Phase::InProgress {
            return Err(format!("phase is {}, expected in progress", self.phase));
        }
        if self.time_remaining_secs == 0 {
            return Err("no time remaining".into());
        }
        if self.time_remaining_secs > duration_secs {
            return Err(format!(
                "time remaining {}s exceeds quiz duration {}s",
                self.time_remaining_secs, duration_secs
            ));
        }
        if self.questions.is_empty() {
            return Err("no questions".into());
        }
        let answered = self.correct_count as usize + self.incorrect_count as usize;
        if answered != self.attempts.len() || answered != self.current_index {
            return Err(format!(
                "counts disagree: {} correct + {} incorrect, {} attempts, index {}",
                self.correct_count,
                self.incorrect_count,
                self.attempts.len(),
                self.current_index
            ));
        }
        if self.current_index >= self.questions.len() {
            return Err(format!(
                "index {} past last question ({})",
                self.current_index,
                self.questions.len()
            ));
        }
        Ok(())
    }
}

/// Payload emitted when a session reaches `Finished` or `TimedOut`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizOutcome {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub timed_out: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(answers: &[&str], correct: Option<&str>) -> Question {
        Question {
            id: 7,
            prompt: "Pick one".into(),
            table: None,
            answers: answers.iter().map(|s| s.to_string()).collect(),
            correct_answer: correct.map(|c| CorrectAnswer {
                text: c.into(),
                explanation: "because".into(),
            }),
        }
    }

    #[test]
    fn well_formed_question_has_no_defect() {
        assert_eq!(question(&["a", "b"], Some("b")).defect(), None);
    }

    #[test]
    fn defect_detection() {
        let mut q = question(&["a"], Some("a"));
        q.prompt = "   ".into();
        assert_eq!(q.defect(), Some(QuestionDefect::EmptyPrompt(7)));

        assert_eq!(
            question(&[], Some("a")).defect(),
            Some(QuestionDefect::NoAnswers(7))
        );
        assert_eq!(
            question(&["a"], None).defect(),
            Some(QuestionDefect::MissingCorrectAnswer(7))
        );
        assert!(matches!(
            question(&["a"], Some("z")).defect(),
            Some(QuestionDefect::CorrectAnswerNotInOptions { id: 7, .. })
        ));
    }

    #[test]
    fn correct_answer_matches_options_after_normalization() {
        let q = question(&["Paris France", "Rome"], Some("Paris\u{a0} France"));
        assert_eq!(q.defect(), None);
    }

    #[test]
    fn attempt_record_keeps_raw_selection() {
        let q = question(&["  a  ", "b"], Some("a"));
        let attempt = AttemptRecord::new(&q, Some("  a  "), true);
        assert_eq!(attempt.selected_answer_text.as_deref(), Some("  a  "));
        assert_eq!(attempt.correct_answer_text, "a");
        assert_eq!(attempt.explanation, "because");
        assert_eq!(attempt.options.len(), 2);
    }

    #[test]
    fn phase_serializes_snake_case() {
        let json = serde_json::to_string(&Phase::TimedOut).unwrap();
        assert_eq!(json, "\"timed_out\"");
        assert!(Phase::Finished.is_terminal());
        assert!(!Phase::InProgress.is_terminal());
    }

    #[test]
    fn idle_state_passes_no_in_progress_check() {
        let state = SessionState::idle(DEFAULT_DURATION_SECS);
        assert_eq!(state.time_remaining_secs, 7200);
        assert!(state.check_in_progress(DEFAULT_DURATION_SECS).is_err());
    }
}
