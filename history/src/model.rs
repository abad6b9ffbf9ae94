use chrono::{DateTime, Utc};
use market::types::RunnerSnapshot;
use serde::{Deserialize, Serialize};

/// One scrape cycle's worth of snapshots for one market.
///
/// Entries are appended by the bounded store and never mutated after
/// creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: DateTime<Utc>,
    pub runners: Vec<RunnerSnapshot>,
}

/// Retention limits for per-market history.
#[derive(Debug, Clone, Copy)]
pub struct HistoryLimits {
    /// Hard cap on entries per market; the oldest is evicted first.
    pub max_entries: usize,
    /// Entries older than this are purged by the periodic sweep.
    pub max_age_days: i64,
}

impl Default for HistoryLimits {
    fn default() -> Self {
        Self {
            max_entries: 100,
            max_age_days: 7,
        }
    }
}
