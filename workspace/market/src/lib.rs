//! Market data access: the ticker catalog, price providers and the cached
//! history loader.

pub mod cache;
pub mod error;
pub mod loader;
pub mod retry;
pub mod source;
pub mod synthetic;
pub mod ticker;
pub mod yahoo;

pub use cache::CachedPriceLoader;
pub use error::{MarketError, Result};
pub use loader::{HistoryLoader, PriceLoader};
pub use retry::{Backoff, RetryPolicy};
pub use source::{HistoryRequest, PriceSource};
pub use synthetic::SyntheticSource;
pub use ticker::Ticker;
pub use yahoo::YahooChartSource;

use chrono::NaiveDate;
use std::time::Duration;

/// First day of every loaded history unless configured otherwise.
pub fn default_history_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap_or_default()
}

/// Returns the loader used by the dashboard: `source` behind a per-ticker
/// cache with the given capacity and TTL.
pub fn cached_loader<S: PriceSource + 'static>(
    source: S,
    start: NaiveDate,
    capacity: usize,
    ttl: Duration,
) -> CachedPriceLoader<HistoryLoader<S>> {
    CachedPriceLoader::new(HistoryLoader::new(source, start), capacity, ttl)
}
