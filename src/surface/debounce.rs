//! Trailing-edge debounce bookkeeping.
//!
//! The surface never sleeps. It asks the runtime to arm a timer and later
//! receives a `TimerFired` event carrying the timer's handle. Every restart
//! hands out a fresh handle, so a timer that was cancelled but still fires
//! (the runtime raced it) is recognized as stale and ignored.

use serde::{Deserialize, Serialize};

/// Identifies one armed debounce timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Debounce timer state for one input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Debouncer {
    delay_ms: u64,
    generation: u64,
    armed: Option<TimerHandle>,
}

impl Debouncer {
    #[must_use]
    pub const fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            generation: 0,
            armed: None,
        }
    }

    #[must_use]
    pub const fn delay_ms(&self) -> u64 {
        self.delay_ms
    }

    /// The currently armed timer, if any.
    #[must_use]
    pub const fn armed(&self) -> Option<TimerHandle> {
        self.armed
    }

    /// Disarms the pending timer and returns its handle so the runtime can
    /// cancel it.
    pub fn cancel(&mut self) -> Option<TimerHandle> {
        self.armed.take()
    }

    /// Arms a new timer, replacing any pending one.
    ///
    /// Returns `(replaced, armed)`.
    pub fn restart(&mut self) -> (Option<TimerHandle>, TimerHandle) {
        let replaced = self.cancel();
        self.generation += 1;
        let handle = TimerHandle(self.generation);
        self.armed = Some(handle);
        (replaced, handle)
    }

    /// Consumes a fired timer.
    ///
    /// Returns `true` only for the currently armed handle; anything else is a
    /// superseded timer.
    pub fn fire(&mut self, handle: TimerHandle) -> bool {
        if self.armed == Some(handle) {
            self.armed = None;
            true
        } else {
            tracing::trace!(handle = handle.get(), "ignoring superseded debounce timer");
            false
        }
    }
}
