//! Snapshot normalizer.
//!
//! Turns the scraper's loosely-typed rows into canonical
//! `RunnerSnapshot`s. This is a pure transform: one malformed row is
//! dropped, the rest of the batch proceeds, and nothing here errors.

use crate::types::{RawRunnerRecord, RunnerSnapshot, ScrapeBatch};

/// Normalize a full scrape batch.
///
/// Rows are dropped when:
/// - the name is empty after trimming, or
/// - neither price side parses to a number.
pub fn normalize_batch(batch: &ScrapeBatch) -> Vec<RunnerSnapshot> {
    batch
        .records
        .iter()
        .filter_map(|rec| normalize_record(rec, batch))
        .collect()
}

fn normalize_record(rec: &RawRunnerRecord, batch: &ScrapeBatch) -> Option<RunnerSnapshot> {
    let name = rec.name.trim();
    if name.is_empty() {
        tracing::debug!("dropping scraped row with no usable name");
        return None;
    }

    let back_price = parse_price(rec.back_price.as_deref());
    let lay_price = parse_price(rec.lay_price.as_deref());

    // A snapshot with no price on either side carries no information.
    if back_price.is_none() && lay_price.is_none() {
        tracing::debug!(runner = name, "dropping scraped row with no parsable price");
        return None;
    }

    Some(RunnerSnapshot {
        runner_name: name.to_string(),
        market_id: batch.market_id.clone(),
        back_price,
        lay_price,
        back_size: parse_price(rec.back_size.as_deref()),
        lay_size: parse_price(rec.lay_size.as_deref()),
        observed_at: batch.captured_at,
    })
}

/// Defensive numeric parse for scraped cell text. Strips currency
/// symbols and thousands separators; anything that still fails to parse
/// becomes `None` rather than an error.
fn parse_price(raw: Option<&str>) -> Option<f64> {
    let cleaned: String = raw?
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | '£' | '€' | ','))
        .collect();

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
