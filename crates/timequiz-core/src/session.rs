//! The quiz session state machine.
//!
//! ```text
//! Idle --start--> InProgress --last answer--> Finished
//!                     |  ^                         |
//!               pause |  | resume                  |
//!                     v  |                         |
//!                  (timer off)   --time up--> TimedOut
//!
//! any phase --cancel--> Idle
//! ```
//!
//! All transitions run to completion on the caller's thread. The session
//! arms and disarms its [`Clock`]; whoever drives the clock feeds each tick
//! back through [`QuizSession::tick`].

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use uuid::Uuid;

use crate::error::QuizError;
use crate::grading::grade;
use crate::model::{
    AttemptRecord, Phase, Question, QuizOutcome, SessionState, DEFAULT_DURATION_SECS,
};
use crate::persistence::{CompletedSummary, Persistence};
use crate::traits::{Clock, KvStore, QuestionBank};

/// Interval between timer ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Configuration for a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time allowed for a whole quiz, in seconds. Must be at least 1.
    pub duration_secs: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            duration_secs: DEFAULT_DURATION_SECS,
        }
    }
}

/// Result of submitting one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Answered {
    pub is_correct: bool,
    /// Set when this answer finished the quiz.
    pub outcome: Option<QuizOutcome>,
}

/// A single quiz session with its storage and timer.
pub struct QuizSession<S, C> {
    bank: Arc<dyn QuestionBank>,
    persistence: Persistence<S>,
    clock: C,
    config: SessionConfig,
    state: SessionState,
    timer_active: bool,
    last_outcome: Option<QuizOutcome>,
}

impl<S: KvStore, C: Clock> QuizSession<S, C> {
    pub fn new(bank: Arc<dyn QuestionBank>, store: S, clock: C, config: SessionConfig) -> Self {
        let duration_secs = config.duration_secs.max(1);
        let config = SessionConfig { duration_secs };
        Self {
            bank,
            persistence: Persistence::new(store, duration_secs),
            clock,
            config,
            state: SessionState::idle(duration_secs),
            timer_active: false,
            last_outcome: None,
        }
    }

    // -----------------------------------------------------------------------
    // Mutators
    // -----------------------------------------------------------------------

    /// Adopt a resumable snapshot from storage, if there is one.
    ///
    /// Returns `true` when a quiz was resumed; the timer is running again.
    pub fn restore(&mut self) -> bool {
        let Some(state) = self.persistence.load_in_progress() else {
            return false;
        };

        tracing::info!(
            "resuming quiz '{}' at question {} of {} ({}s left)",
            state.quiz_key.as_deref().unwrap_or("?"),
            state.current_index + 1,
            state.questions.len(),
            state.time_remaining_secs
        );
        self.state = state;
        self.last_outcome = None;
        self.start_timer();
        true
    }

    /// Start the quiz `quiz_key` from scratch.
    ///
    /// Any running quiz is discarded. On error the session is unchanged.
    pub fn start(&mut self, quiz_key: &str) -> Result<(), QuizError> {
        let set = match self.bank.quiz_set(quiz_key) {
            Some(set) if !set.questions.is_empty() => set,
            Some(_) => return Err(invalid_selection(quiz_key, "quiz has no questions")),
            None => return Err(invalid_selection(quiz_key, "unknown quiz")),
        };

        self.state = SessionState {
            session_id: Some(Uuid::new_v4()),
            quiz_key: Some(set.key.clone()),
            questions: set.questions.clone(),
            current_index: 0,
            correct_count: 0,
            incorrect_count: 0,
            attempts: Vec::new(),
            time_remaining_secs: self.config.duration_secs,
            phase: Phase::InProgress,
        };
        self.last_outcome = None;
        tracing::info!(
            "started quiz '{}' ({} questions, {}s)",
            set.key,
            self.state.questions.len(),
            self.config.duration_secs
        );

        self.start_timer();
        self.save_snapshot();
        Ok(())
    }

    /// Advance the timer by one second.
    ///
    /// Ignored unless a quiz is running with the timer active. Returns the
    /// outcome when this tick ran out the clock.
    pub fn tick(&mut self) -> Option<QuizOutcome> {
        if self.state.phase != Phase::InProgress || !self.timer_active {
            return None;
        }

        self.state.time_remaining_secs = self.state.time_remaining_secs.saturating_sub(1);
        tracing::trace!("tick: {}s left", self.state.time_remaining_secs);

        if self.state.time_remaining_secs == 0 {
            tracing::info!(
                "time is up after {} of {} questions",
                self.state.current_index,
                self.state.questions.len()
            );
            return Some(self.finish(Phase::TimedOut));
        }

        self.save_snapshot();
        None
    }

    /// Grade `selected` against the current question and move on.
    pub fn submit_answer(&mut self, selected: &str) -> Result<Answered, QuizError> {
        if self.state.phase != Phase::InProgress {
            return Err(QuizError::NotInProgress);
        }
        if selected.trim().is_empty() {
            return Err(QuizError::EmptySelection);
        }
        let question = self
            .state
            .current_question()
            .ok_or(QuizError::NoCurrentQuestion(self.state.current_index))?;

        let grade = grade(question, selected);
        let attempt = AttemptRecord::new(question, Some(selected), grade.is_correct);

        self.state.attempts.push(attempt);
        if grade.is_correct {
            self.state.correct_count += 1;
        } else {
            self.state.incorrect_count += 1;
        }
        self.state.current_index += 1;

        if self.state.current_index >= self.state.questions.len() {
            let outcome = self.finish(Phase::Finished);
            return Ok(Answered {
                is_correct: grade.is_correct,
                outcome: Some(outcome),
            });
        }

        self.save_snapshot();
        Ok(Answered {
            is_correct: grade.is_correct,
            outcome: None,
        })
    }

    /// Suspend the timer without touching phase or counts.
    pub fn pause(&mut self) {
        if self.timer_active {
            self.clock.cancel();
            self.timer_active = false;
            tracing::debug!("timer paused at {}s", self.state.time_remaining_secs);
        }
    }

    /// Restart the timer if the quiz can still run.
    ///
    /// Returns whether the timer is running afterwards.
    pub fn resume(&mut self) -> bool {
        if self.state.phase == Phase::InProgress
            && self.state.time_remaining_secs > 0
            && !self.timer_active
        {
            self.start_timer();
            tracing::debug!("timer resumed at {}s", self.state.time_remaining_secs);
        }
        self.timer_active
    }

    /// Abandon the quiz and wipe its persisted state and history.
    pub fn cancel(&mut self) {
        self.stop_timer();
        if let Some(key) = &self.state.quiz_key {
            tracing::info!("cancelled quiz '{key}'");
        }
        self.state = SessionState::idle(self.config.duration_secs);
        self.last_outcome = None;
        if let Err(e) = self.persistence.clear_all() {
            tracing::warn!("failed to clear stored quiz data: {e}");
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn quiz_key(&self) -> Option<&str> {
        self.state.quiz_key.as_deref()
    }

    /// Display name of the running quiz, falling back to its key.
    pub fn quiz_name(&self) -> Option<String> {
        let key = self.state.quiz_key.as_deref()?;
        Some(
            self.bank
                .quiz_set(key)
                .map(|set| set.name.clone())
                .unwrap_or_else(|| key.to_string()),
        )
    }

    /// The question awaiting an answer, while a quiz runs.
    pub fn current_question(&self) -> Option<&Question> {
        if self.state.phase != Phase::InProgress {
            return None;
        }
        self.state.current_question()
    }

    /// One-based number of the current question.
    pub fn question_number(&self) -> usize {
        (self.state.current_index + 1).min(self.state.questions.len())
    }

    pub fn total_questions(&self) -> usize {
        self.state.questions.len()
    }

    pub fn time_remaining_secs(&self) -> u32 {
        self.state.time_remaining_secs
    }

    /// Remaining time as `HH:MM:SS`.
    pub fn formatted_time_remaining(&self) -> String {
        format_hms(self.state.time_remaining_secs)
    }

    pub fn timer_active(&self) -> bool {
        self.timer_active
    }

    pub fn attempts(&self) -> &[AttemptRecord] {
        &self.state.attempts
    }

    /// Outcome of the quiz that most recently ended in this session.
    pub fn last_outcome(&self) -> Option<QuizOutcome> {
        self.last_outcome
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn start_timer(&mut self) {
        self.clock.schedule_tick(TICK_INTERVAL);
        self.timer_active = true;
    }

    fn stop_timer(&mut self) {
        self.clock.cancel();
        self.timer_active = false;
    }

    fn save_snapshot(&mut self) {
        if let Err(e) = self.persistence.save_in_progress(&self.state) {
            tracing::warn!("failed to save quiz progress: {e}");
        }
    }

    /// Enter a terminal phase: stop the clock, move the attempt history into
    /// the completed record and drop the snapshot.
    fn finish(&mut self, phase: Phase) -> QuizOutcome {
        self.stop_timer();
        self.state.phase = phase;

        let outcome = QuizOutcome {
            correct: self.state.correct_count,
            incorrect: self.state.incorrect_count,
            total: self.state.questions.len() as u32,
            timed_out: phase == Phase::TimedOut,
        };
        let summary = CompletedSummary {
            session_id: self.state.session_id,
            quiz_key: self.state.quiz_key.clone(),
            correct: outcome.correct,
            incorrect: outcome.incorrect,
            total: outcome.total,
            timed_out: outcome.timed_out,
            completed_at: Some(Utc::now()),
        };

        if let Err(e) = self.persistence.clear_in_progress() {
            tracing::warn!("failed to remove quiz snapshot: {e}");
        }
        if let Err(e) = self
            .persistence
            .save_completed(&self.state.attempts, &summary)
        {
            tracing::warn!("failed to save quiz results: {e}");
        }

        tracing::info!(
            "quiz '{}' {}: {} correct, {} incorrect, {} total",
            self.state.quiz_key.as_deref().unwrap_or("?"),
            phase,
            outcome.correct,
            outcome.incorrect,
            outcome.total
        );
        self.last_outcome = Some(outcome);
        outcome
    }
}

fn invalid_selection(key: &str, reason: &str) -> QuizError {
    let err = QuizError::InvalidSelection {
        key: key.to_string(),
        reason: reason.to_string(),
    };
    tracing::warn!("{err}");
    err
}

/// Format seconds as zero-padded `HH:MM:SS`.
pub fn format_hms(total_secs: u32) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}
