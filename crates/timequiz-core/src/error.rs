//! Error types for the quiz core.
//!
//! Session errors are returned synchronously from the state machine and
//! always leave the session unchanged. Question defects and storage errors
//! are non-fatal: callers log them and carry on.

use thiserror::Error;

/// Errors returned by session mutators and the review builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizError {
    /// `start` was asked for a quiz key that is unknown or has no questions.
    #[error("invalid quiz selection '{key}': {reason}")]
    InvalidSelection { key: String, reason: String },

    /// The operation requires a running quiz.
    #[error("no quiz is in progress")]
    NotInProgress,

    /// The session is running but has no question at the current index.
    #[error("no current question at index {0}")]
    NoCurrentQuestion(usize),

    /// An answer was submitted without selecting an option.
    #[error("no answer selected")]
    EmptySelection,

    /// A persisted snapshot failed to parse or violated session invariants.
    #[error("corrupt persisted state: {0}")]
    CorruptPersistedState(String),

    /// Results or review were requested but no completed quiz is on record.
    #[error("no completed quiz found; start a new quiz first")]
    MissingNavigationContext,
}

/// Schema violations in a question record.
///
/// A defective question can still be played; grading always marks it
/// incorrect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionDefect {
    #[error("question {0} has an empty prompt")]
    EmptyPrompt(u32),

    #[error("question {0} has no answer options")]
    NoAnswers(u32),

    #[error("question {0} has no correct answer")]
    MissingCorrectAnswer(u32),

    #[error("question {id}: correct answer '{answer}' is not one of the options")]
    CorrectAnswerNotInOptions { id: u32, answer: String },
}

/// Errors from a key-value storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error for key '{key}': {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode value for key '{key}': {message}")]
    Encode { key: String, message: String },

    #[error("invalid storage key '{0}'")]
    InvalidKey(String),
}
