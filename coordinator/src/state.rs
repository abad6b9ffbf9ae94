use std::fmt;

/// Per-context cycle state machine.
///
/// `Idle → Scraping → Computing → Persisting → Idle`, with `Suppressed`
/// reachable from `Idle` when the triggering signal is not actionable
/// (page is not a tracked page type). Every transition has a guaranteed
/// path back to `Idle`, including on failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Scraping,
    Computing,
    Persisting,
    Suppressed,
}

impl fmt::Display for CycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CycleState::Idle => "Idle",
            CycleState::Scraping => "Scraping",
            CycleState::Computing => "Computing",
            CycleState::Persisting => "Persisting",
            CycleState::Suppressed => "Suppressed",
        };
        f.write_str(s)
    }
}

/// How one invocation of the cycle entry point ended. The entry point
/// itself never errors; handled failures surface here and in the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Full pipeline ran (persistence may still have warned).
    Completed,
    /// A cycle was already in flight; this trigger was discarded, not
    /// queued.
    Dropped,
    /// Trigger was not actionable for the current page context.
    Suppressed,
    /// A step failed; logged, state returned to Idle.
    Failed,
}

impl CycleOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, CycleOutcome::Completed)
    }
}
