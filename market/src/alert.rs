//! Significance filter.
//!
//! Decides whether a computed delta is a big enough relative move to
//! bother the user. Pure; the "notifications enabled" switch lives in
//! configuration upstream, not here.

use crate::types::{Direction, PriceAlert, PriceDelta, RunnerSnapshot, Side};

/// Evaluate one delta against a relative threshold (a fraction, 0.01
/// meaning 1%). Back and lay are judged independently, so one delta can
/// yield up to two alerts.
///
/// A side alerts iff its previous price exists, is non-zero, and
/// `|delta| / previous >= threshold`. Zero deltas never alert.
pub fn evaluate_alerts(
    delta: &PriceDelta,
    previous: &RunnerSnapshot,
    threshold: f64,
) -> Vec<PriceAlert> {
    let sides = [
        (Side::Back, delta.back_delta, previous.back_price),
        (Side::Lay, delta.lay_delta, previous.lay_price),
    ];

    let mut alerts = Vec::new();

    for (side, side_delta, prev_price) in sides {
        let (Some(d), Some(prev)) = (side_delta, prev_price) else {
            continue;
        };
        if d == 0.0 || prev == 0.0 {
            continue;
        }

        if (d / prev).abs() >= threshold {
            alerts.push(PriceAlert {
                runner_name: delta.runner_name.clone(),
                side,
                delta: d,
                previous_price: prev,
                new_price: crate::delta::truncate_tick(prev + d),
                direction: if d > 0.0 {
                    Direction::Increase
                } else {
                    Direction::Decrease
                },
            });
        }
    }

    alerts
}
