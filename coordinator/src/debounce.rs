//! Trailing debounce for DOM-change bursts.
//!
//! A mutation observer can fire dozens of times for one visual page
//! update. The debouncer collapses such a burst into a single cycle,
//! timed from the *last* signal: every new signal replaces the pending
//! deadline. The coordinator is not "busy" while a window is open; new
//! signals just re-arm it.

use tokio::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Register a signal; the pending deadline (if any) is replaced.
    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// The instant the pending window closes, if one is open.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarm after firing (or to cancel outright).
    pub fn clear(&mut self) {
        self.deadline = None;
    }
}
