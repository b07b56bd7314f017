//! Mirrors session state and completed-quiz history into a [`KvStore`].
//!
//! Two independent records live in the store: the in-progress snapshot,
//! rewritten on every change while a quiz runs, and the completed-quiz
//! record (attempt history plus summary counts), written once when a quiz
//! ends and kept until the next completed quiz or an explicit reset.
//!
//! Loading is best-effort. Anything that fails to parse or validate is
//! logged, deleted and reported as absent.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{QuizError, StoreError};
use crate::model::{AttemptRecord, QuizOutcome, SessionState};
use crate::traits::KvStore;

/// Key of the in-progress snapshot.
pub const KEY_IN_PROGRESS: &str = "quiz_state";
/// Key of the completed attempt history.
pub const KEY_ATTEMPTS: &str = "quiz_user_attempts";
/// Key of the full completed-quiz summary record.
pub const KEY_SUMMARY: &str = "quiz_summary";
pub const KEY_TOTAL: &str = "quiz_total_questions";
pub const KEY_CORRECT: &str = "quiz_correct_answers";
pub const KEY_INCORRECT: &str = "quiz_incorrect_answers";

/// Summary of the last completed quiz.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedSummary {
    #[serde(default)]
    pub session_id: Option<Uuid>,
    #[serde(default)]
    pub quiz_key: Option<String>,
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    #[serde(default)]
    pub timed_out: bool,
    /// Unknown when only the scalar counters survived.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl CompletedSummary {
    pub fn outcome(&self) -> QuizOutcome {
        QuizOutcome {
            correct: self.correct,
            incorrect: self.incorrect,
            total: self.total,
            timed_out: self.timed_out,
        }
    }
}

/// Persistence adapter over a key-value store.
#[derive(Debug, Clone)]
pub struct Persistence<S> {
    store: S,
    duration_secs: u32,
}

impl<S: KvStore> Persistence<S> {
    /// `duration_secs` bounds the remaining time a valid snapshot may carry.
    pub fn new(store: S, duration_secs: u32) -> Self {
        Self {
            store,
            duration_secs,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Overwrite the in-progress snapshot.
    pub fn save_in_progress(&mut self, state: &SessionState) -> Result<(), StoreError> {
        let json = encode(KEY_IN_PROGRESS, state)?;
        self.store.set(KEY_IN_PROGRESS, &json)?;
        tracing::debug!(
            "saved snapshot: question {} of {}, {}s left",
            state.current_index + 1,
            state.questions.len(),
            state.time_remaining_secs
        );
        Ok(())
    }

    /// Load a resumable snapshot.
    ///
    /// Only a snapshot that is still in progress, has time left and satisfies
    /// the session invariants is returned. Anything else is deleted.
    pub fn load_in_progress(&mut self) -> Option<SessionState> {
        let state: SessionState = self.read(KEY_IN_PROGRESS)?;

        match state.check_in_progress(self.duration_secs) {
            Ok(()) => Some(state),
            Err(reason) => {
                let err = QuizError::CorruptPersistedState(reason);
                tracing::warn!("discarding in-progress snapshot: {err}");
                self.discard(KEY_IN_PROGRESS);
                None
            }
        }
    }

    pub fn clear_in_progress(&mut self) -> Result<(), StoreError> {
        self.store.delete(KEY_IN_PROGRESS)
    }

    /// Record a finished or timed-out quiz, replacing the previous record.
    pub fn save_completed(
        &mut self,
        attempts: &[AttemptRecord],
        summary: &CompletedSummary,
    ) -> Result<(), StoreError> {
        self.store.set(KEY_ATTEMPTS, &encode(KEY_ATTEMPTS, attempts)?)?;
        self.store.set(KEY_SUMMARY, &encode(KEY_SUMMARY, summary)?)?;
        self.store.set(KEY_TOTAL, &summary.total.to_string())?;
        self.store.set(KEY_CORRECT, &summary.correct.to_string())?;
        self.store.set(KEY_INCORRECT, &summary.incorrect.to_string())?;
        tracing::debug!(
            "saved completed quiz: {} attempt(s), {}/{} correct",
            attempts.len(),
            summary.correct,
            summary.total
        );
        Ok(())
    }

    /// Attempt history of the last completed quiz.
    pub fn load_completed_attempts(&mut self) -> Option<Vec<AttemptRecord>> {
        self.read(KEY_ATTEMPTS)
    }

    /// Summary of the last completed quiz.
    ///
    /// Built from the three scalar counters; the richer summary record fills
    /// in the session details when it is present and agrees with them.
    pub fn load_summary(&mut self) -> Option<CompletedSummary> {
        let total = self.read_count(KEY_TOTAL)?;
        let correct = self.read_count(KEY_CORRECT)?;
        let incorrect = self.read_count(KEY_INCORRECT)?;

        let record: Option<CompletedSummary> = self.read(KEY_SUMMARY);
        match record {
            Some(record)
                if record.total == total
                    && record.correct == correct
                    && record.incorrect == incorrect =>
            {
                Some(record)
            }
            _ => Some(CompletedSummary {
                session_id: None,
                quiz_key: None,
                correct,
                incorrect,
                total,
                timed_out: false,
                completed_at: None,
            }),
        }
    }

    /// Remove the completed-quiz record and its counters.
    pub fn clear_completed(&mut self) -> Result<(), StoreError> {
        for key in [KEY_ATTEMPTS, KEY_SUMMARY, KEY_TOTAL, KEY_CORRECT, KEY_INCORRECT] {
            self.store.delete(key)?;
        }
        Ok(())
    }

    /// Remove everything this adapter manages.
    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.clear_in_progress()?;
        self.clear_completed()
    }

    fn read<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("treating '{key}' as absent: {e}");
                return None;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                let err = QuizError::CorruptPersistedState(format!("{key}: {e}"));
                tracing::warn!("discarding stored value: {err}");
                self.discard(key);
                None
            }
        }
    }

    fn read_count(&mut self, key: &str) -> Option<u32> {
        let raw = match self.store.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                tracing::warn!("treating '{key}' as absent: {e}");
                return None;
            }
        };
        match raw.trim().parse() {
            Ok(n) => Some(n),
            Err(e) => {
                tracing::warn!("discarding stored counter '{key}' ({raw:?}): {e}");
                self.discard(key);
                None
            }
        }
    }

    fn discard(&mut self, key: &str) {
        if let Err(e) = self.store.delete(key) {
            tracing::warn!("failed to delete '{key}': {e}");
        }
    }
}

fn encode<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::Encode {
        key: key.to_string(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CorrectAnswer, Phase, Question, DEFAULT_DURATION_SECS};
    use crate::traits::MemoryStore;

    fn question(id: u32) -> Question {
        Question {
            id,
            prompt: format!("Question {id}"),
            table: None,
            answers: vec!["yes".into(), "no".into()],
            correct_answer: Some(CorrectAnswer {
                text: "yes".into(),
                explanation: "obviously".into(),
            }),
        }
    }

    fn running_state() -> SessionState {
        let questions = vec![question(1), question(2), question(3)];
        let attempt = AttemptRecord::new(&questions[0], Some("yes"), true);
        SessionState {
            session_id: Some(Uuid::new_v4()),
            quiz_key: Some("basics".into()),
            questions,
            current_index: 1,
            correct_count: 1,
            incorrect_count: 0,
            attempts: vec![attempt],
            time_remaining_secs: 4000,
            phase: Phase::InProgress,
        }
    }

    fn adapter() -> (MemoryStore, Persistence<MemoryStore>) {
        let store = MemoryStore::new();
        (store.clone(), Persistence::new(store, DEFAULT_DURATION_SECS))
    }

    fn summary(correct: u32, incorrect: u32, total: u32) -> CompletedSummary {
        CompletedSummary {
            session_id: None,
            quiz_key: Some("basics".into()),
            correct,
            incorrect,
            total,
            timed_out: false,
            completed_at: Some(Utc::now()),
        }
    }

    #[test]
    fn snapshot_round_trip() {
        let (_, mut persistence) = adapter();
        let state = running_state();
        persistence.save_in_progress(&state).unwrap();
        assert_eq!(persistence.load_in_progress(), Some(state));
    }

    #[test]
    fn save_overwrites_previous_snapshot() {
        let (_, mut persistence) = adapter();
        let mut state = running_state();
        persistence.save_in_progress(&state).unwrap();
        state.time_remaining_secs = 10;
        persistence.save_in_progress(&state).unwrap();
        assert_eq!(
            persistence.load_in_progress().map(|s| s.time_remaining_secs),
            Some(10)
        );
    }

    #[test]
    fn finished_snapshot_is_discarded() {
        let (store, mut persistence) = adapter();
        let mut state = running_state();
        state.phase = Phase::Finished;
        persistence.save_in_progress(&state).unwrap();

        assert!(persistence.load_in_progress().is_none());
        assert!(store.get(KEY_IN_PROGRESS).unwrap().is_none());
    }

    #[test]
    fn snapshot_without_time_is_discarded() {
        let (store, mut persistence) = adapter();
        let mut state = running_state();
        state.time_remaining_secs = 0;
        persistence.save_in_progress(&state).unwrap();

        assert!(persistence.load_in_progress().is_none());
        assert!(store.get(KEY_IN_PROGRESS).unwrap().is_none());
    }

    #[test]
    fn inconsistent_counts_are_discarded() {
        let (_, mut persistence) = adapter();
        let mut state = running_state();
        state.correct_count = 2;
        persistence.save_in_progress(&state).unwrap();
        assert!(persistence.load_in_progress().is_none());
    }

    #[test]
    fn unparsable_snapshot_is_deleted() {
        let (mut store, mut persistence) = adapter();
        store.set(KEY_IN_PROGRESS, "{not json").unwrap();

        assert!(persistence.load_in_progress().is_none());
        assert!(store.get(KEY_IN_PROGRESS).unwrap().is_none());
    }

    #[test]
    fn completed_record_round_trip() {
        let (store, mut persistence) = adapter();
        let state = running_state();
        persistence
            .save_completed(&state.attempts, &summary(1, 0, 3))
            .unwrap();

        let attempts = persistence.load_completed_attempts().unwrap();
        assert_eq!(attempts, state.attempts);

        let loaded = persistence.load_summary().unwrap();
        assert_eq!(loaded.outcome().total, 3);
        assert_eq!(loaded.quiz_key.as_deref(), Some("basics"));
        assert_eq!(store.get(KEY_CORRECT).unwrap().as_deref(), Some("1"));
    }

    #[test]
    fn summary_falls_back_to_counters() {
        let (mut store, mut persistence) = adapter();
        store.set(KEY_TOTAL, "10").unwrap();
        store.set(KEY_CORRECT, "8").unwrap();
        store.set(KEY_INCORRECT, "2").unwrap();

        let loaded = persistence.load_summary().unwrap();
        assert_eq!((loaded.correct, loaded.incorrect, loaded.total), (8, 2, 10));
        assert!(loaded.quiz_key.is_none());
        assert!(loaded.completed_at.is_none());
    }

    #[test]
    fn summary_needs_all_counters() {
        let (mut store, mut persistence) = adapter();
        store.set(KEY_TOTAL, "10").unwrap();
        store.set(KEY_CORRECT, "8").unwrap();
        assert!(persistence.load_summary().is_none());

        store.set(KEY_INCORRECT, "two").unwrap();
        assert!(persistence.load_summary().is_none());
        assert!(store.get(KEY_INCORRECT).unwrap().is_none());
    }

    #[test]
    fn clear_all_removes_everything() {
        let (store, mut persistence) = adapter();
        let state = running_state();
        persistence.save_in_progress(&state).unwrap();
        persistence
            .save_completed(&state.attempts, &summary(1, 0, 3))
            .unwrap();

        persistence.clear_all().unwrap();
        assert!(store.keys().is_empty());
    }

    #[test]
    fn completed_record_survives_snapshot_clear() {
        let (_, mut persistence) = adapter();
        let state = running_state();
        persistence.save_in_progress(&state).unwrap();
        persistence
            .save_completed(&state.attempts, &summary(1, 0, 3))
            .unwrap();
        persistence.clear_in_progress().unwrap();

        assert!(persistence.load_in_progress().is_none());
        assert!(persistence.load_completed_attempts().is_some());
    }
}
