//! UpdateCoordinator
//!
//! Serializes the ingest → compute → alert → persist pipeline per
//! scrape cycle. Responsibilities:
//!   • Claim the cycle state machine (at most one cycle in flight;
//!     extra triggers are dropped, not queued)
//!   • Normalize scraped rows and diff them against the
//!     previous-observation cache
//!   • Run the significance filter and hand alerts to the sink
//!   • Append to bounded history and persist it (write failures are
//!     non-fatal; memory stays authoritative)
//!   • Merge secondary odds into the display model, discarding results
//!     whose market context went stale while the request was in flight
//!
//! The coordinator is an Arc-managed async service in the same shape as
//! the market manager: long-lived tasks capture `Arc<Self>` freely. All
//! cache/history mutation for a cycle happens inside one synchronous
//! block, before the first await of the persistence phase, so two
//! interleaved cycles can never corrupt a per-key "previous" pointer.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tokio::time::{Duration, Instant, MissedTickBehavior};

use history::model::HistoryEntry;
use history::persist::KeyValueStore;
use history::store::PriceHistory;
use market::alert::evaluate_alerts;
use market::delta::{ObservationCache, compute_delta};
use market::matcher::{MatcherConfig, find_best_match};
use market::normalize::normalize_batch;
use market::types::{DisplayModel, DisplayRunner, PriceAlert};

use crate::config::TrackerConfig;
use crate::debounce::Debouncer;
use crate::error::TrackerError;
use crate::odds::fetch_odds_with_retry;
use crate::state::{CycleOutcome, CycleState};
use crate::types::{AlertSink, DisplaySink, OddsProvider, Scraper, Trigger};

/// Storage key under which the serialized history map lives.
const HISTORY_KEY: &str = "price_history";

/// Fallback market key when the scraper could not identify one.
const UNKNOWN_MARKET: &str = "unknown";

/// Runtime-flippable switches (options page messages).
#[derive(Debug, Clone, Copy)]
struct Toggles {
    notifications_enabled: bool,
    store_history: bool,
}

/// Latest secondary odds, tagged with the market context that was
/// current when the request went out.
#[derive(Debug, Clone)]
struct AltOdds {
    market_id: String,
    odds: Vec<(String, f64)>,
}

pub struct UpdateCoordinator {
    cfg: TrackerConfig,
    matcher_cfg: MatcherConfig,

    scraper: Arc<dyn Scraper>,
    kv: Arc<dyn KeyValueStore>,
    alert_sink: Arc<dyn AlertSink>,
    display_sink: Arc<dyn DisplaySink>,
    odds_provider: Option<Arc<dyn OddsProvider>>,

    state: Mutex<CycleState>,
    toggles: Mutex<Toggles>,
    current_market: Mutex<Option<String>>,
    cache: Mutex<ObservationCache>,
    history: Mutex<PriceHistory>,
    alt_odds: Mutex<Option<AltOdds>>,
}

impl UpdateCoordinator {
    /// Build a coordinator and restore persisted history. A failed or
    /// corrupt read is logged and ignored; the engine starts empty.
    pub async fn new(
        cfg: TrackerConfig,
        scraper: Arc<dyn Scraper>,
        kv: Arc<dyn KeyValueStore>,
        alert_sink: Arc<dyn AlertSink>,
        display_sink: Arc<dyn DisplaySink>,
        odds_provider: Option<Arc<dyn OddsProvider>>,
    ) -> Arc<Self> {
        let mut history = PriceHistory::new(cfg.history_limits());
        history.set_retention(cfg.store_history);

        let toggles = Toggles {
            notifications_enabled: cfg.enable_notifications,
            store_history: cfg.store_history,
        };

        let coordinator = Arc::new(Self {
            cfg,
            matcher_cfg: MatcherConfig::default(),
            scraper,
            kv,
            alert_sink,
            display_sink,
            odds_provider,
            state: Mutex::new(CycleState::Idle),
            toggles: Mutex::new(toggles),
            current_market: Mutex::new(None),
            cache: Mutex::new(ObservationCache::new()),
            history: Mutex::new(history),
            alt_odds: Mutex::new(None),
        });

        coordinator.restore_history().await;
        coordinator
    }

    async fn restore_history(self: &Arc<Self>) {
        match self.kv.get(HISTORY_KEY).await {
            Ok(Some(doc)) => match serde_json::from_value(doc) {
                Ok(map) => {
                    let mut history = self.history.lock().await;
                    history.load(map);
                    tracing::info!(
                        markets = history.market_count(),
                        "restored persisted price history"
                    );
                }
                Err(e) => tracing::warn!(error = %e, "persisted history is corrupt, starting empty"),
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "history read failed, starting empty"),
        }
    }

    pub async fn state(&self) -> CycleState {
        *self.state.lock().await
    }

    /// Run one full cycle: the only entry point triggers reach.
    ///
    /// Never errors out: handled failures surface in the outcome and
    /// the logs, and the state machine always lands back on `Idle`.
    pub async fn run_cycle(self: &Arc<Self>) -> CycleOutcome {
        {
            let mut st = self.state.lock().await;
            if *st != CycleState::Idle {
                tracing::debug!(state = %*st, "trigger dropped, cycle already in flight");
                return CycleOutcome::Dropped;
            }
            if !self.scraper.is_actionable() {
                *st = CycleState::Suppressed;
                drop(st);
                tracing::debug!("page context not tracked, cycle suppressed");
                *self.state.lock().await = CycleState::Idle;
                return CycleOutcome::Suppressed;
            }
            *st = CycleState::Scraping;
        }

        let outcome = match self.run_cycle_inner().await {
            Ok(()) => CycleOutcome::Completed,
            Err(e) => {
                tracing::warn!(error = %e, "update cycle failed");
                CycleOutcome::Failed
            }
        };

        *self.state.lock().await = CycleState::Idle;
        outcome
    }

    async fn run_cycle_inner(self: &Arc<Self>) -> Result<(), TrackerError> {
        let batch = self.scraper.scrape().await.map_err(TrackerError::Scrape)?;

        self.set_state(CycleState::Computing).await;

        let snapshots = normalize_batch(&batch);
        let market_key = batch
            .market_id
            .clone()
            .unwrap_or_else(|| UNKNOWN_MARKET.to_string());

        let toggles = *self.toggles.lock().await;
        let threshold = self.cfg.threshold_fraction();

        // Market context switch: old observations would produce garbage
        // deltas against a different race, so drop them.
        let market_changed = {
            let mut current = self.current_market.lock().await;
            let changed = current.as_deref() != Some(market_key.as_str());
            if changed {
                if let Some(old) = current.take() {
                    self.cache.lock().await.clear_market(&old);
                }
                *current = Some(market_key.clone());
            }
            changed
        };

        let alt = {
            let alt = self.alt_odds.lock().await;
            match &*alt {
                Some(a) if a.market_id == market_key => Some(a.odds.clone()),
                _ => None,
            }
        };

        // Compute phase: cache overwrite, delta, alerts and history
        // append all happen in this one synchronous block, with no
        // suspension point until the guards drop.
        let (display, alerts, persist_doc) = {
            let mut cache = self.cache.lock().await;
            let mut history = self.history.lock().await;

            let mut runners = Vec::with_capacity(snapshots.len());
            let mut alerts: Vec<PriceAlert> = Vec::new();

            for snap in &snapshots {
                let previous = cache.record(&market_key, snap.clone());
                let delta = compute_delta(previous.as_ref(), snap);

                if toggles.notifications_enabled {
                    if let Some(prev) = previous.as_ref() {
                        alerts.extend(evaluate_alerts(&delta, prev, threshold));
                    }
                }

                let alt_price = alt.as_ref().and_then(|candidates| {
                    find_best_match(&snap.runner_name, candidates, &self.matcher_cfg).copied()
                });

                runners.push(DisplayRunner {
                    name: snap.runner_name.clone(),
                    back_price: snap.back_price,
                    lay_price: snap.lay_price,
                    back_delta: delta.back_delta,
                    lay_delta: delta.lay_delta,
                    alt_price,
                });
            }

            if toggles.store_history && !snapshots.is_empty() {
                history.append(
                    &market_key,
                    HistoryEntry {
                        timestamp: batch.captured_at,
                        runners: snapshots.clone(),
                    },
                );
            }

            let persist_doc = if toggles.store_history {
                serde_json::to_value(history.serialize()).ok()
            } else {
                None
            };

            let display = DisplayModel {
                market_id: batch.market_id.clone(),
                runners,
                last_updated: batch.captured_at,
            };

            (display, alerts, persist_doc)
        };

        self.set_state(CycleState::Persisting).await;

        if let Some(doc) = persist_doc {
            if let Err(e) = self.persist_history(doc).await {
                // Non-fatal: the in-memory store stays authoritative
                // and the append is not rolled back.
                tracing::warn!(error = %e, "history write failed");
            }
        }

        self.display_sink.render(display).await;
        for alert in alerts {
            self.alert_sink.notify(alert).await;
        }

        if market_changed {
            self.spawn_odds_fetch(market_key);
        }

        Ok(())
    }

    async fn persist_history(&self, doc: serde_json::Value) -> Result<(), TrackerError> {
        self.kv
            .set(HISTORY_KEY, doc)
            .await
            .map_err(TrackerError::Persistence)
    }

    async fn set_state(&self, next: CycleState) {
        let mut st = self.state.lock().await;
        tracing::debug!(from = %*st, to = %next, "cycle transition");
        *st = next;
    }

    /// Kick off an out-of-band secondary odds lookup tagged with the
    /// market context current at request time.
    fn spawn_odds_fetch(self: &Arc<Self>, market_id: String) {
        let Some(provider) = self.odds_provider.clone() else {
            return;
        };

        let me = Arc::clone(self);
        let base_delay = Duration::from_millis(self.cfg.odds_retry_base_ms);
        let max_attempts = self.cfg.odds_max_attempts;

        tokio::spawn(async move {
            match fetch_odds_with_retry(provider.as_ref(), &market_id, base_delay, max_attempts)
                .await
            {
                Ok(odds) => me.apply_odds(market_id, odds).await,
                Err(e) => tracing::warn!(market_id, error = %e, "secondary odds unavailable"),
            }
        });
    }

    /// Accept a completed odds lookup, unless the market context moved
    /// on while the request was in flight.
    pub async fn apply_odds(self: &Arc<Self>, market_id: String, odds: Vec<(String, f64)>) {
        {
            let current = self.current_market.lock().await;
            if current.as_deref() != Some(market_id.as_str()) {
                tracing::debug!(market_id, "discarding odds result for stale market context");
                return;
            }
        }

        *self.alt_odds.lock().await = Some(AltOdds { market_id, odds });
    }

    /// Age-based history sweep; persists the shrunken map when anything
    /// was removed. With history storage disabled this clears all
    /// markets regardless of age.
    pub async fn sweep_history(self: &Arc<Self>) -> usize {
        let (removed, doc) = {
            let mut history = self.history.lock().await;
            let removed = history.sweep(Utc::now());
            let doc = if removed > 0 {
                serde_json::to_value(history.serialize()).ok()
            } else {
                None
            };
            (removed, doc)
        };

        if removed > 0 {
            tracing::info!(removed, "swept old history entries");
            if let Some(doc) = doc {
                if let Err(e) = self.persist_history(doc).await {
                    tracing::warn!(error = %e, "history write failed after sweep");
                }
            }
        }

        removed
    }

    /// Flip history retention at runtime. Disabling clears everything,
    /// in memory and in the durable store, immediately.
    pub async fn set_store_history(self: &Arc<Self>, enabled: bool) {
        self.toggles.lock().await.store_history = enabled;

        let removed = {
            let mut history = self.history.lock().await;
            history.set_retention(enabled);
            if enabled { 0 } else { history.clear_all() }
        };

        if !enabled {
            tracing::info!(removed, "history storage disabled, cleared all markets");
            if let Err(e) = self.kv.remove(HISTORY_KEY).await {
                tracing::warn!(error = %e, "failed to remove persisted history");
            }
        }
    }

    pub async fn set_notifications_enabled(&self, enabled: bool) {
        self.toggles.lock().await.notifications_enabled = enabled;
    }

    /// Full serialized history for external download, wrapped with an
    /// export timestamp.
    pub async fn export_history(&self) -> serde_json::Value {
        self.history.lock().await.export_json(Utc::now())
    }

    /// Drive the coordinator from a trigger channel until it closes.
    ///
    /// Owns the scrape interval, the DOM-change debouncer and the
    /// periodic sweep. Everything funnels into `run_cycle`, which
    /// enforces the one-in-flight rule.
    pub async fn run(self: Arc<Self>, mut triggers: mpsc::Receiver<Trigger>) {
        let mut scrape_tick =
            tokio::time::interval(Duration::from_secs(self.cfg.update_interval_secs.max(1)));
        scrape_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut sweep_tick =
            tokio::time::interval(Duration::from_secs(self.cfg.sweep_interval_secs.max(1)));
        sweep_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval() fires immediately; swallow the startup sweep tick.
        sweep_tick.tick().await;

        let mut debounce = Debouncer::new(Duration::from_millis(self.cfg.debounce_ms));

        loop {
            let deadline = debounce.deadline();

            tokio::select! {
                maybe = triggers.recv() => match maybe {
                    None => break,
                    Some(Trigger::DomChanged) => debounce.signal(Instant::now()),
                    Some(Trigger::ManualRefresh) => {
                        self.run_cycle().await;
                    }
                },
                _ = scrape_tick.tick() => {
                    self.run_cycle().await;
                }
                _ = sleep_or_pending(deadline) => {
                    debounce.clear();
                    self.run_cycle().await;
                }
                _ = sweep_tick.tick() => {
                    self.sweep_history().await;
                }
            }
        }

        tracing::info!("trigger channel closed, coordinator stopping");
    }
}

async fn sleep_or_pending(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}
