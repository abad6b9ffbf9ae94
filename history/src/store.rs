//! Bounded per-market price history.
//!
//! Append-only time series keyed by market id, with two independent
//! eviction policies:
//!   • count-based: strict FIFO once a market exceeds `max_entries`
//!   • age-based: a periodic sweep purges entries older than
//!     `max_age_days` and drops market keys that end up empty
//!
//! When retention is disabled (the "store history" toggle), the sweep
//! clears everything for every market regardless of age.

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Duration, Utc};

use crate::model::{HistoryEntry, HistoryLimits};

#[derive(Debug)]
pub struct PriceHistory {
    markets: HashMap<String, VecDeque<HistoryEntry>>,
    limits: HistoryLimits,
    retention_enabled: bool,
}

impl Default for PriceHistory {
    fn default() -> Self {
        Self::new(HistoryLimits::default())
    }
}

impl PriceHistory {
    pub fn new(limits: HistoryLimits) -> Self {
        Self {
            markets: HashMap::new(),
            limits,
            retention_enabled: true,
        }
    }

    /// Append one entry to a market's series, evicting the oldest entry
    /// when the cap is exceeded. No-op while retention is disabled.
    pub fn append(&mut self, market_id: &str, entry: HistoryEntry) {
        if !self.retention_enabled {
            return;
        }

        let series = self.markets.entry(market_id.to_string()).or_default();
        series.push_back(entry);

        while series.len() > self.limits.max_entries {
            series.pop_front();
        }
    }

    /// Purge entries older than the retention window; markets whose
    /// series empties out lose their key entirely. Returns the number
    /// of entries removed.
    ///
    /// With retention disabled this clears all history for all markets
    /// immediately, whatever their age.
    pub fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        if !self.retention_enabled {
            return self.clear_all();
        }

        let cutoff = now - Duration::days(self.limits.max_age_days);
        let mut removed = 0;

        self.markets.retain(|market_id, series| {
            let before = series.len();
            series.retain(|entry| entry.timestamp >= cutoff);
            removed += before - series.len();

            if series.is_empty() {
                tracing::debug!(market_id, "market history emptied by sweep");
                false
            } else {
                true
            }
        });

        removed
    }

    /// Drop everything. Returns the number of entries removed.
    pub fn clear_all(&mut self) -> usize {
        let removed = self.markets.values().map(VecDeque::len).sum();
        self.markets.clear();
        removed
    }

    /// Drop one market's series (owning tab/session closed).
    pub fn remove_market(&mut self, market_id: &str) {
        self.markets.remove(market_id);
    }

    pub fn set_retention(&mut self, enabled: bool) {
        self.retention_enabled = enabled;
    }

    pub fn retention_enabled(&self) -> bool {
        self.retention_enabled
    }

    pub fn entries(&self, market_id: &str) -> Option<&VecDeque<HistoryEntry>> {
        self.markets.get(market_id)
    }

    pub fn market_count(&self) -> usize {
        self.markets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markets.is_empty()
    }

    /// Plain key → entries mapping for persistence. Market order is not
    /// significant; entry order within a market is chronological,
    /// oldest first.
    pub fn serialize(&self) -> HashMap<String, Vec<HistoryEntry>> {
        self.markets
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
            .collect()
    }

    /// Rebuild from a persisted mapping, re-applying the entry cap in
    /// case limits shrank since the data was written.
    pub fn load(&mut self, map: HashMap<String, Vec<HistoryEntry>>) {
        self.markets.clear();
        for (market_id, entries) in map {
            if entries.is_empty() {
                continue;
            }
            let mut series: VecDeque<HistoryEntry> = entries.into();
            while series.len() > self.limits.max_entries {
                series.pop_front();
            }
            self.markets.insert(market_id, series);
        }
    }

    /// Full history as a JSON document for external download.
    pub fn export_json(&self, now: DateTime<Utc>) -> serde_json::Value {
        serde_json::json!({
            "exported_at": now,
            "markets": self.serialize(),
        })
    }
}
