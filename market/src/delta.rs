//! Delta calculator.
//!
//! Compares a fresh snapshot against the previous observation for the
//! same `(market, runner)` key. Deltas are only ever computed between
//! two numeric observations of the same side; everything else is `None`.

use std::collections::HashMap;

use crate::types::{PriceDelta, RunnerSnapshot};

/// Truncate a signed delta to tick precision (two decimals), toward
/// zero. Truncation means a sub-tick float wobble can never promote a
/// 0.95% move into a full 1% one; the small epsilon absorbs f64
/// representation error on exact two-decimal differences.
pub fn truncate_tick(x: f64) -> f64 {
    ((x * 100.0) + x.signum() * 1e-7).trunc() / 100.0
}

/// Compute signed per-side deltas (new − previous).
///
/// `previous == None` (first observation for the key) yields `None` on
/// both sides, as does any side whose prior price was missing.
pub fn compute_delta(previous: Option<&RunnerSnapshot>, current: &RunnerSnapshot) -> PriceDelta {
    let side_delta = |prev: Option<f64>, cur: Option<f64>| match (prev, cur) {
        (Some(p), Some(c)) => Some(truncate_tick(c - p)),
        _ => None,
    };

    let (back_delta, lay_delta) = match previous {
        Some(prev) => (
            side_delta(prev.back_price, current.back_price),
            side_delta(prev.lay_price, current.lay_price),
        ),
        None => (None, None),
    };

    PriceDelta {
        runner_name: current.runner_name.clone(),
        market_id: current.market_id.clone(),
        back_delta,
        lay_delta,
    }
}

/// Most-recent snapshot per `(market_id, runner_name)` key.
///
/// Ephemeral by design: it exists solely so the next cycle has
/// something to diff against, holds exactly one entry per active runner
/// key, and is overwritten rather than appended. It is owned by the
/// coordinator instance, never shared globally.
#[derive(Debug, Default)]
pub struct ObservationCache {
    inner: HashMap<(String, String), RunnerSnapshot>,
}

impl ObservationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` as the latest observation for its key and
    /// return whatever it replaced.
    pub fn record(&mut self, market_key: &str, snapshot: RunnerSnapshot) -> Option<RunnerSnapshot> {
        self.inner
            .insert((market_key.to_string(), snapshot.runner_name.clone()), snapshot)
    }

    pub fn get(&self, market_key: &str, runner_name: &str) -> Option<&RunnerSnapshot> {
        self.inner
            .get(&(market_key.to_string(), runner_name.to_string()))
    }

    /// Drop every cached observation for one market (page navigated
    /// away, race context torn down).
    pub fn clear_market(&mut self, market_key: &str) {
        self.inner.retain(|(m, _), _| m != market_key);
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn snap(name: &str, back: Option<f64>, lay: Option<f64>) -> RunnerSnapshot {
        RunnerSnapshot {
            runner_name: name.into(),
            market_id: Some("mkt-1".into()),
            back_price: back,
            lay_price: lay,
            back_size: None,
            lay_size: None,
            observed_at: Utc::now(),
        }
    }

    #[test]
    fn first_observation_yields_null_deltas() {
        let d = compute_delta(None, &snap("Fast Runner", Some(2.0), Some(2.1)));

        assert_eq!(d.back_delta, None);
        assert_eq!(d.lay_delta, None);
    }

    #[test]
    fn both_sides_numeric_yields_signed_deltas() {
        let prev = snap("Fast Runner", Some(2.0), Some(3.0));
        let cur = snap("Fast Runner", Some(2.5), Some(2.8));

        let d = compute_delta(Some(&prev), &cur);

        assert_eq!(d.back_delta, Some(0.5));
        assert_eq!(d.lay_delta, Some(-0.2));
    }

    #[test]
    fn missing_prior_side_yields_null_for_that_side_only() {
        let prev = snap("Fast Runner", Some(2.0), None);
        let cur = snap("Fast Runner", Some(2.2), Some(2.4));

        let d = compute_delta(Some(&prev), &cur);

        assert_eq!(d.back_delta, Some(0.2));
        assert_eq!(d.lay_delta, None);
    }

    #[test]
    fn deltas_truncate_to_tick_precision() {
        let prev = snap("Fast Runner", Some(2.0), None);
        let cur = snap("Fast Runner", Some(2.019), None);

        let d = compute_delta(Some(&prev), &cur);

        // 0.019 is under a full tick; truncation keeps it at 0.01
        // rather than rounding up to 0.02.
        assert_eq!(d.back_delta, Some(0.01));
    }

    #[test]
    fn truncation_survives_float_noise_on_exact_ticks() {
        let prev = snap("Fast Runner", Some(2.88), None);
        let cur = snap("Fast Runner", Some(2.9), None);

        let d = compute_delta(Some(&prev), &cur);
        assert_eq!(d.back_delta, Some(0.02));
    }

    #[test]
    fn cache_overwrites_per_key() {
        let mut cache = ObservationCache::new();

        assert!(cache.record("mkt-1", snap("Fast Runner", Some(2.0), None)).is_none());
        let replaced = cache.record("mkt-1", snap("Fast Runner", Some(2.5), None));

        assert_eq!(replaced.unwrap().back_price, Some(2.0));
        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("mkt-1", "Fast Runner").unwrap().back_price,
            Some(2.5)
        );
    }

    #[test]
    fn clear_market_only_touches_that_market() {
        let mut cache = ObservationCache::new();
        cache.record("mkt-1", snap("Fast Runner", Some(2.0), None));
        cache.record("mkt-2", snap("Slow Horse", Some(8.0), None));

        cache.clear_market("mkt-1");

        assert!(cache.get("mkt-1", "Fast Runner").is_none());
        assert!(cache.get("mkt-2", "Slow Horse").is_some());
    }
}
