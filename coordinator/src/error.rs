use thiserror::Error;

/// Failures the coordinator handles at its own boundary.
///
/// None of these ever escape a cycle entry point: scrape failures end
/// the cycle, persistence failures are logged with the in-memory state
/// left authoritative, and exhausted odds lookups degrade to
/// "unavailable" in the display model. Malformed scrape rows are not
/// errors at all; the normalizer drops them row by row.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("scrape failed: {0}")]
    Scrape(anyhow::Error),

    #[error("persistence failed: {0}")]
    Persistence(anyhow::Error),

    #[error("odds lookup failed after {attempts} attempts: {last_error}")]
    OddsLookup { attempts: u32, last_error: anyhow::Error },
}
