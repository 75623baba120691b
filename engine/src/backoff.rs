//! Retry-interval state for the sync engine.
//!
//! The interval starts at a relaxed idle value, doubles on every failed
//! delivery up to a ceiling, snaps to a fast value after a success so the
//! remaining backlog drains quickly, and collapses to near-zero when the
//! user forces a sync or connectivity comes back.

use serde::{Deserialize, Serialize};

/// Idle interval between drain attempts (10 seconds).
pub const INITIAL_INTERVAL_MS: u64 = 10_000;
/// Interval after a successful delivery with backlog remaining (1 second).
pub const FAST_INTERVAL_MS: u64 = 1_000;
/// Interval after a manual sync request or regained connectivity.
pub const COLLAPSED_INTERVAL_MS: u64 = 100;
/// Backoff ceiling (5 minutes).
pub const MAX_INTERVAL_MS: u64 = 300_000;

/// Exponential backoff state for the drain timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Backoff {
    current_ms: u64,
}

impl Backoff {
    /// Start at the idle interval.
    pub fn new() -> Self {
        Self {
            current_ms: INITIAL_INTERVAL_MS,
        }
    }

    /// The current wait before the next drain attempt, in milliseconds.
    pub fn current_ms(&self) -> u64 {
        self.current_ms
    }

    /// A delivery succeeded: snap to the fast interval to drain backlog.
    pub fn on_success(&mut self) {
        self.current_ms = FAST_INTERVAL_MS;
    }

    /// A delivery failed: double the interval, capped at the ceiling.
    pub fn on_failure(&mut self) {
        self.current_ms = (self.current_ms.saturating_mul(2)).min(MAX_INTERVAL_MS);
    }

    /// Manual sync or connectivity regained: collapse to near-immediate.
    pub fn collapse(&mut self) {
        self.current_ms = COLLAPSED_INTERVAL_MS;
    }

    /// The queue emptied: return to the idle interval.
    pub fn reset(&mut self) {
        self.current_ms = INITIAL_INTERVAL_MS;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}
