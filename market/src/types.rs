use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row as the page scraper handed it over: untrimmed name, prices
/// still raw DOM text (possibly with currency symbols). Nothing here is
/// guaranteed to parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawRunnerRecord {
    pub name: String,
    pub back_price: Option<String>,
    pub lay_price: Option<String>,
    pub back_size: Option<String>,
    pub lay_size: Option<String>,
}

/// A scrape cycle's worth of raw rows, plus where and when they came from.
#[derive(Debug, Clone)]
pub struct ScrapeBatch {
    pub market_id: Option<String>,
    pub captured_at: DateTime<Utc>,
    pub records: Vec<RawRunnerRecord>,
}

/// Canonical observation of one runner's prices at one point in time.
///
/// The normalizer guarantees that at least one of `back_price` /
/// `lay_price` is present; records where both sides failed to parse are
/// dropped before a snapshot is ever built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSnapshot {
    pub runner_name: String,
    pub market_id: Option<String>,
    pub back_price: Option<f64>,
    pub lay_price: Option<f64>,
    pub back_size: Option<f64>,
    pub lay_size: Option<f64>,
    pub observed_at: DateTime<Utc>,
}

/// Signed per-side price movement between two snapshots of the same
/// runner key. `None` means no prior numeric observation existed for
/// that side, not "no movement".
#[derive(Debug, Clone, PartialEq)]
pub struct PriceDelta {
    pub runner_name: String,
    pub market_id: Option<String>,
    pub back_delta: Option<f64>,
    pub lay_delta: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Back,
    Lay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Increase,
    Decrease,
}

/// A price movement the significance filter judged worth telling the
/// user about. Sent to the notification sink fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceAlert {
    pub runner_name: String,
    pub side: Side,
    pub delta: f64,
    pub previous_price: f64,
    pub new_price: f64,
    pub direction: Direction,
}

/// One runner row as the presentation layer should show it.
///
/// `alt_price` is the matched price from the secondary odds source;
/// `None` renders as "unavailable" and never blocks the rest of the row.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayRunner {
    pub name: String,
    pub back_price: Option<f64>,
    pub lay_price: Option<f64>,
    pub back_delta: Option<f64>,
    pub lay_delta: Option<f64>,
    pub alt_price: Option<f64>,
}

/// Everything the presentation layer needs for one completed cycle.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayModel {
    pub market_id: Option<String>,
    pub runners: Vec<DisplayRunner>,
    pub last_updated: DateTime<Utc>,
}
