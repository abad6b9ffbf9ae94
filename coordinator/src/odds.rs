//! Secondary odds lookup with bounded retry.
//!
//! A failed or timed-out lookup is retried with a doubling delay, at
//! most `max_attempts` times in total. After that the caller is told
//! the data is unavailable; it is never retried indefinitely and never
//! blocks the primary display.

use tokio::time::Duration;

use crate::error::TrackerError;
use crate::types::OddsProvider;

pub async fn fetch_odds_with_retry(
    provider: &dyn OddsProvider,
    market_id: &str,
    base_delay: Duration,
    max_attempts: u32,
) -> Result<Vec<(String, f64)>, TrackerError> {
    let mut delay = base_delay;
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match provider.fetch_odds(market_id).await {
            Ok(odds) => return Ok(odds),
            Err(e) => {
                tracing::debug!(market_id, attempt, error = %e, "secondary odds fetch failed");
                last_error = Some(e);

                if attempt < max_attempts {
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                }
            }
        }
    }

    Err(TrackerError::OddsLookup {
        attempts: max_attempts,
        last_error: last_error.unwrap_or_else(|| anyhow::anyhow!("no attempts were made")),
    })
}
