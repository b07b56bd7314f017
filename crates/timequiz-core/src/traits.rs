//! Capability traits injected into the session, plus in-memory
//! implementations.
//!
//! The session never touches the filesystem, the wall clock or global state
//! directly; it goes through these traits. `timequiz-store` provides the
//! durable [`KvStore`], `timequiz-cli` provides a tokio-backed [`Clock`].

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::StoreError;
use crate::model::QuizSet;

// ---------------------------------------------------------------------------
// Question bank
// ---------------------------------------------------------------------------

/// Read-only source of quiz sets.
pub trait QuestionBank: Send + Sync {
    /// Look up a quiz set by key.
    fn quiz_set(&self, key: &str) -> Option<&QuizSet>;

    /// All quiz keys, in a stable order.
    fn quiz_keys(&self) -> Vec<String>;
}

/// Question bank held entirely in memory, keyed by quiz key.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBank {
    sets: BTreeMap<String, QuizSet>,
}

impl InMemoryBank {
    pub fn new(sets: impl IntoIterator<Item = QuizSet>) -> Self {
        let mut bank = Self::default();
        for set in sets {
            bank.insert(set);
        }
        bank
    }

    /// Add a quiz set, replacing any set with the same key.
    pub fn insert(&mut self, set: QuizSet) {
        if let Some(previous) = self.sets.insert(set.key.clone(), set) {
            tracing::warn!("quiz key '{}' defined more than once, keeping the last", previous.key);
        }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuizSet> {
        self.sets.values()
    }
}

impl QuestionBank for InMemoryBank {
    fn quiz_set(&self, key: &str) -> Option<&QuizSet> {
        self.sets.get(key)
    }

    fn quiz_keys(&self) -> Vec<String> {
        self.sets.keys().cloned().collect()
    }
}

// ---------------------------------------------------------------------------
// Key-value storage
// ---------------------------------------------------------------------------

/// Durable string key-value storage.
///
/// Every `set` replaces the whole value for its key (last write wins).
pub trait KvStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing a missing key is not an error.
    fn delete(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store. Clones share the same underlying map, so a test can keep
/// a handle and inspect what the session wrote.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the stored keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still structurally valid.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Source of periodic timer ticks.
///
/// The session arms the clock when a quiz starts or resumes and cancels it
/// when the quiz pauses or ends. Delivering ticks back to the session is the
/// driver's job: it calls [`QuizSession::tick`](crate::session::QuizSession::tick)
/// for every tick the clock produces.
pub trait Clock {
    /// Start producing a tick every `interval`, replacing any running schedule.
    fn schedule_tick(&mut self, interval: Duration);

    /// Stop producing ticks. Cancelling an idle clock is a no-op.
    fn cancel(&mut self);
}

/// Clock driven by hand, for tests and deterministic replays.
///
/// Records what the session asked for; clones share that record.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    state: Arc<Mutex<ManualClockState>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClockState {
    pub interval: Option<Duration>,
    pub schedules: u32,
    pub cancels: u32,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a tick schedule is currently armed.
    pub fn is_scheduled(&self) -> bool {
        self.snapshot().interval.is_some()
    }

    pub fn snapshot(&self) -> ManualClockState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Clock for ManualClock {
    fn schedule_tick(&mut self, interval: Duration) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.interval = Some(interval);
        state.schedules += 1;
    }

    fn cancel(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.interval.take().is_some() {
            state.cancels += 1;
        }
    }
}
