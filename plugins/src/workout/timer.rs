use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pagestate_core::render::TextPatch;

pub const TIMER_ID: &str = "workout-timer";

/// Session stopwatch. The running start is persisted so a reload keeps
/// counting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutTimer {
    #[serde(default)]
    running_since: Option<DateTime<Utc>>,
    #[serde(default)]
    accumulated_secs: i64,
}

impl WorkoutTimer {
    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    /// Returns false when already running.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.running_since.is_some() {
            return false;
        }
        self.running_since = Some(now);
        true
    }

    /// Returns false when not running.
    pub fn stop(&mut self, now: DateTime<Utc>) -> bool {
        match self.running_since.take() {
            Some(since) => {
                self.accumulated_secs += (now - since).num_seconds().max(0);
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> i64 {
        let running = self
            .running_since
            .map(|since| (now - since).num_seconds().max(0))
            .unwrap_or(0);
        self.accumulated_secs + running
    }

    pub fn display(&self, now: DateTime<Utc>) -> String {
        format_elapsed(self.elapsed_secs(now))
    }

    /// Text-only update for the timer element; `None` while stopped.
    pub fn tick(&self, now: DateTime<Utc>) -> Option<TextPatch> {
        self.is_running()
            .then(|| TextPatch::new(TIMER_ID, self.display(now)))
    }
}

/// "MM:SS", or "H:MM:SS" from one hour on.
pub fn format_elapsed(secs: i64) -> String {
    let secs = secs.max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{h}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
