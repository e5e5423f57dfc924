//! Deterministic timer set
//!
//! Each timer kind has at most one pending deadline. Time is a `Duration`
//! offset from mount, so callers own the clock: the async session feeds it
//! from the runtime, tests feed it by hand.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

/// Timers owned by the playback view
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Forces an exit from loading
    Liveness,
    /// Delayed unmute after play-start (desktop)
    DelayedUnmute,
    /// Idle hide of on-screen controls
    HideControls,
}

#[derive(Debug, Clone, Default)]
pub struct Timers {
    deadlines: BTreeMap<TimerKind, Duration>,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `at`, replacing any pending deadline
    pub fn schedule(&mut self, kind: TimerKind, at: Duration) {
        debug!(timer = ?kind, at_ms = at.as_millis() as u64, "Timer scheduled");
        self.deadlines.insert(kind, at);
    }

    /// Cancel `kind`. Returns true if it was pending
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        self.deadlines.remove(&kind).is_some()
    }

    pub fn cancel_all(&mut self) {
        self.deadlines.clear();
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.deadlines.contains_key(&kind)
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<Duration> {
        self.deadlines.get(&kind).copied()
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Duration> {
        self.deadlines.values().min().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Remove and return every timer due at `now`, earliest first
    pub fn expire(&mut self, now: Duration) -> Vec<TimerKind> {
        let mut due: Vec<(Duration, TimerKind)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(kind, at)| (*at, *kind))
            .collect();
        due.sort();

        for (_, kind) in &due {
            self.deadlines.remove(kind);
        }

        due.into_iter().map(|(_, kind)| kind).collect()
    }
}
