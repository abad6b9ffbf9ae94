use history::model::HistoryLimits;

/// Tracker configuration surface.
///
/// Consumed by the coordinator, owned by whoever hosts it (options
/// page, environment, test harness). `enable_notifications` and
/// `store_history` can additionally be flipped at runtime through the
/// coordinator's setters; everything else is fixed for the lifetime of
/// the instance.
#[derive(Clone, Debug)]
pub struct TrackerConfig {
    /// Fixed scrape interval in seconds.
    pub update_interval_secs: u64,

    /// Relative move (in percent, 1.0 = 1%) a price must make before
    /// an alert fires.
    pub price_change_threshold_percent: f64,

    /// Master switch for the notification sink.
    pub enable_notifications: bool,

    /// Master switch for history retention. Turning it off clears all
    /// stored history for all markets immediately.
    pub store_history: bool,

    /// Age-based retention window for history entries.
    pub history_duration_days: i64,

    /// Per-market cap on retained history entries (FIFO eviction).
    pub max_history_entries: usize,

    /// Quiet window for coalescing DOM-change bursts, timed from the
    /// last signal.
    pub debounce_ms: u64,

    /// How often the age-based history sweep runs.
    pub sweep_interval_secs: u64,

    /// First retry delay for a failed secondary odds lookup; doubles
    /// per attempt.
    pub odds_retry_base_ms: u64,

    /// Attempts before a secondary odds lookup is reported unavailable.
    pub odds_max_attempts: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            update_interval_secs: 5,
            price_change_threshold_percent: 1.0,
            enable_notifications: true,
            store_history: true,
            history_duration_days: 7,
            max_history_entries: 100,
            debounce_ms: 300,
            sweep_interval_secs: 24 * 60 * 60,
            odds_retry_base_ms: 500,
            odds_max_attempts: 3,
        }
    }
}

impl TrackerConfig {
    /// Build a config from environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            update_interval_secs: env_parse("TRACKER_UPDATE_INTERVAL_SECS")
                .unwrap_or(defaults.update_interval_secs),
            price_change_threshold_percent: env_parse("TRACKER_THRESHOLD_PERCENT")
                .unwrap_or(defaults.price_change_threshold_percent),
            enable_notifications: env_parse("TRACKER_NOTIFICATIONS")
                .unwrap_or(defaults.enable_notifications),
            store_history: env_parse("TRACKER_STORE_HISTORY").unwrap_or(defaults.store_history),
            history_duration_days: env_parse("TRACKER_HISTORY_DAYS")
                .unwrap_or(defaults.history_duration_days),
            max_history_entries: env_parse("TRACKER_MAX_HISTORY_ENTRIES")
                .unwrap_or(defaults.max_history_entries),
            debounce_ms: env_parse("TRACKER_DEBOUNCE_MS").unwrap_or(defaults.debounce_ms),
            ..defaults
        }
    }

    pub fn history_limits(&self) -> HistoryLimits {
        HistoryLimits {
            max_entries: self.max_history_entries,
            max_age_days: self.history_duration_days,
        }
    }

    /// Threshold as the fraction the significance filter expects.
    pub fn threshold_fraction(&self) -> f64 {
        self.price_change_threshold_percent / 100.0
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
