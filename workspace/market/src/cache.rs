use async_trait::async_trait;
use cached::{Cached, TimedSizedCache};
use common::PriceHistory;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, trace};

use crate::error::Result;
use crate::loader::PriceLoader;
use crate::ticker::Ticker;

/// A caching wrapper for PriceLoader implementations.
///
/// Features:
/// - One entry per ticker with a size bound and TTL
/// - Per-ticker invalidation and full clearing
/// - Any `cached::Cached` store can be injected
/// - Thread-safe implementation using Arc<Mutex<>>; the lock is never held
///   while the inner loader runs
pub struct CachedPriceLoader<
    T: PriceLoader,
    C: Cached<Ticker, PriceHistory> = TimedSizedCache<Ticker, PriceHistory>,
> {
    /// The wrapped loader
    inner: T,
    /// Loaded histories keyed by ticker
    cache: Arc<Mutex<C>>,
}

impl<T: PriceLoader, C: Cached<Ticker, PriceHistory>> CachedPriceLoader<T, C> {
    /// Creates a new caching loader with a custom cache store.
    pub fn new_with_store(inner: T, cache_store: C) -> Self {
        Self {
            inner,
            cache: Arc::new(Mutex::new(cache_store)),
        }
    }

    /// Removes all cached histories.
    pub fn clear_cache(&self) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.cache_clear();
        }
    }

    /// Returns the number of cached histories.
    pub fn cache_size(&self) -> usize {
        if let Ok(cache) = self.cache.lock() {
            cache.cache_size()
        } else {
            0
        }
    }
}

impl<T: PriceLoader> CachedPriceLoader<T, TimedSizedCache<Ticker, PriceHistory>> {
    /// Creates a new caching loader.
    ///
    /// # Arguments
    /// * `inner` - The loader to wrap with caching
    /// * `cache_size` - Maximum number of tickers kept
    /// * `ttl` - Time to live of a cached history, in whole seconds
    pub fn new(inner: T, cache_size: usize, ttl: Duration) -> Self {
        Self::new_with_store(
            inner,
            TimedSizedCache::with_size_and_lifespan(cache_size, ttl.as_secs()),
        )
    }

    /// Creates a new caching loader with default settings.
    ///
    /// Default settings:
    /// - Cache size: 16 entries
    /// - TTL: 1 hour
    pub fn with_defaults(inner: T) -> Self {
        Self::new(inner, 16, Duration::from_secs(3600))
    }
}

impl<T: PriceLoader, C: Cached<Ticker, PriceHistory>> fmt::Debug for CachedPriceLoader<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedPriceLoader")
            .field("inner", &self.inner)
            .field("cache_size", &self.cache_size())
            .finish()
    }
}

#[async_trait]
impl<T, C> PriceLoader for CachedPriceLoader<T, C>
where
    T: PriceLoader,
    C: Cached<Ticker, PriceHistory> + Send,
{
    async fn load(&self, ticker: Ticker) -> Result<PriceHistory> {
        if let Ok(mut cache) = self.cache.lock() {
            if let Some(history) = cache.cache_get(&ticker) {
                trace!(%ticker, "Price history served from cache");
                return Ok(history.clone());
            }
        }

        let history = self.inner.load(ticker).await?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.cache_set(ticker, history.clone());
        }
        debug!(%ticker, rows = history.len(), "Price history cached");

        Ok(history)
    }

    fn invalidate(&self, ticker: Ticker) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.cache_remove(&ticker);
        }
        self.inner.invalidate(ticker);
    }

    fn provider(&self) -> &'static str {
        self.inner.provider()
    }
}
