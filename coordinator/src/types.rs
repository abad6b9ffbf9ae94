//! Collaborator seams of the update coordinator.
//!
//! The scraper, the presentation layer, the notification sink and the
//! secondary odds source are all external to the engine; they are
//! injected as trait objects so tests can substitute doubles and so the
//! trigger's origin (DOM observer, timer, message) stays irrelevant to
//! the core.

use market::types::{DisplayModel, PriceAlert, ScrapeBatch};

/// An external signal asking the coordinator to run a cycle.
///
/// `DomChanged` bursts are coalesced by the debouncer; a manual refresh
/// runs immediately (subject to the one-in-flight rule).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    DomChanged,
    ManualRefresh,
}

/// Produces raw runner rows from the live page.
#[async_trait::async_trait]
pub trait Scraper: Send + Sync {
    /// Whether the current page context is a tracked page type at all.
    /// When false, triggers are suppressed instead of scraped.
    fn is_actionable(&self) -> bool;

    async fn scrape(&self) -> anyhow::Result<ScrapeBatch>;
}

/// Shows a price alert to the user. Fire-and-forget; the coordinator
/// never consumes a return value.
#[async_trait::async_trait]
pub trait AlertSink: Send + Sync {
    async fn notify(&self, alert: PriceAlert);
}

/// Renders the per-cycle display model (overlay, popup, whatever).
#[async_trait::async_trait]
pub trait DisplaySink: Send + Sync {
    async fn render(&self, model: DisplayModel);
}

/// Secondary odds source, keyed by the same market ids as the primary
/// scrape. Runner names on this side follow the other site's
/// formatting; reconciliation is the fuzzy matcher's job.
#[async_trait::async_trait]
pub trait OddsProvider: Send + Sync {
    async fn fetch_odds(&self, market_id: &str) -> anyhow::Result<Vec<(String, f64)>>;
}
