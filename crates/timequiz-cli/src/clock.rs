//! Tokio-backed timer for interactive play.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use timequiz_core::traits::Clock;

/// Sends `()` on a channel once per interval while scheduled.
///
/// Each `schedule_tick` spawns a task on the current tokio runtime; `cancel`
/// aborts it. Must be used from within a runtime.
pub struct IntervalClock {
    ticks: mpsc::UnboundedSender<()>,
    task: Option<JoinHandle<()>>,
}

impl IntervalClock {
    /// Create a clock and the receiver its ticks arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<()>) {
        let (ticks, rx) = mpsc::unbounded_channel();
        (Self { ticks, task: None }, rx)
    }

    pub fn is_scheduled(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Clock for IntervalClock {
    fn schedule_tick(&mut self, interval: Duration) {
        self.cancel();
        let ticks = self.ticks.clone();
        self.task = Some(tokio::spawn(async move {
            // first tick one full interval from now, not immediately
            let mut timer = interval_at(Instant::now() + interval, interval);
            timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                timer.tick().await;
                if ticks.send(()).is_err() {
                    break;
                }
            }
        }));
    }

    fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for IntervalClock {
    fn drop(&mut self) {
        self.cancel();
    }
}
