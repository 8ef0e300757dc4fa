//! Trailing-edge debouncing driven by the caller's clock.
//!
//! Nothing here sleeps or spawns: the host passes `now` in and polls when
//! its own timer fires, so the same logic runs natively and in wasm.

use std::time::Duration;

use web_time::Instant;

/// Holds the latest triggered value until `wait` passes without another
/// trigger.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
    wait: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(wait: Duration) -> Self {
        Self {
            wait,
            pending: None,
        }
    }

    pub fn wait(&self) -> Duration {
        self.wait
    }

    /// Restart the window with `value`, dropping any earlier value.
    pub fn trigger(&mut self, now: Instant, value: T) {
        self.pending = Some((now + self.wait, value));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// When the pending value becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Take the value if its window has passed.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if now >= *deadline => self.cancel(),
            _ => None,
        }
    }
}
