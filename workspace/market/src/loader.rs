use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use common::{PriceHistory, PricePoint};
use std::fmt::Debug;
use tracing::{debug, info, instrument, warn};

use crate::error::{MarketError, Result};
use crate::source::{HistoryRequest, PriceSource};
use crate::ticker::Ticker;

/// Loads the full daily history of a catalog ticker.
#[async_trait]
pub trait PriceLoader: Send + Sync + Debug {
    /// Returns the history from the configured start date up to today,
    /// ordered by ascending date and never empty.
    async fn load(&self, ticker: Ticker) -> Result<PriceHistory>;

    /// Drops anything remembered about `ticker`. No-op for loaders without state.
    fn invalidate(&self, _ticker: Ticker) {}

    /// Name of the underlying data provider.
    fn provider(&self) -> &'static str;
}

/// Loader that asks a [`PriceSource`] on every call and normalizes the result.
#[derive(Debug)]
pub struct HistoryLoader<S: PriceSource> {
    source: S,
    start: NaiveDate,
    today: Option<NaiveDate>,
}

impl<S: PriceSource> HistoryLoader<S> {
    pub fn new(source: S, start: NaiveDate) -> Self {
        Self {
            source,
            start,
            today: None,
        }
    }

    /// Pins "today" instead of reading the clock.
    pub fn new_with_today(source: S, start: NaiveDate, today: NaiveDate) -> Self {
        Self {
            source,
            start,
            today: Some(today),
        }
    }

    fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Utc::now().date_naive())
    }
}

#[async_trait]
impl<S: PriceSource> PriceLoader for HistoryLoader<S> {
    #[instrument(skip(self))]
    async fn load(&self, ticker: Ticker) -> Result<PriceHistory> {
        let request = HistoryRequest::new(ticker.symbol(), self.start, self.today())?;
        debug!(
            provider = self.source.name(),
            symbol = %request.symbol,
            start = %request.start,
            end = %request.end,
            "Fetching daily history"
        );

        let raw = self.source.fetch_daily(&request).await?;
        let fetched = raw.len();
        let points = normalize(raw, request.start, request.end);

        if points.is_empty() {
            warn!(symbol = %request.symbol, fetched, "Provider returned no usable rows");
            return Err(MarketError::EmptySeries {
                symbol: request.symbol,
            });
        }

        info!(
            symbol = %request.symbol,
            rows = points.len(),
            dropped = fetched - points.len(),
            "Daily history loaded"
        );
        Ok(PriceHistory::new(ticker.label(), ticker.symbol(), points))
    }

    fn provider(&self) -> &'static str {
        self.source.name()
    }
}

/// Keeps finite records inside `[start, end]`, sorted by date with one record
/// per date (the last one delivered wins).
pub fn normalize(mut points: Vec<PricePoint>, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
    points.retain(|p| {
        start <= p.date
            && p.date <= end
            && [p.open, p.high, p.low, p.close].iter().all(|v| v.is_finite())
    });
    points.sort_by_key(|p| p.date);
    points.reverse();
    points.dedup_by_key(|p| p.date);
    points.reverse();
    points
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn point(date: NaiveDate, close: f64) -> PricePoint {
        PricePoint {
            date,
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            adj_close: None,
            volume: 10,
        }
    }

    /// Returns a fixed set of rows and counts how often it was asked.
    #[derive(Debug, Default)]
    pub(crate) struct FixedSource {
        pub rows: Vec<PricePoint>,
        pub calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PriceSource for FixedSource {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn fetch_daily(&self, _request: &HistoryRequest) -> Result<Vec<PricePoint>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows.clone())
        }
    }

    #[test]
    fn test_normalize_sorts_dedups_and_clips() {
        let rows = vec![
            point(date(2024, 1, 3), 3.0),
            point(date(2023, 12, 29), 0.5),
            point(date(2024, 1, 2), 2.0),
            point(date(2024, 1, 3), 3.5),
            point(date(2024, 1, 9), 9.0),
            point(date(2024, 1, 4), f64::NAN),
        ];

        let points = normalize(rows, date(2024, 1, 1), date(2024, 1, 8));

        assert_eq!(
            points.iter().map(|p| (p.date, p.close)).collect::<Vec<_>>(),
            vec![(date(2024, 1, 2), 2.0), (date(2024, 1, 3), 3.5)]
        );
    }

    #[tokio::test]
    async fn test_load_labels_history() {
        let source = FixedSource {
            rows: vec![point(date(2024, 1, 2), 2.0), point(date(2024, 1, 3), 3.0)],
            ..Default::default()
        };
        let loader = HistoryLoader::new_with_today(source, date(2024, 1, 1), date(2024, 1, 5));

        let history = loader.load(Ticker::IciciBank).await.unwrap();
        assert_eq!(history.label, "ICICI Bank");
        assert_eq!(history.symbol, "ICICIBANK.NS");
        assert_eq!(history.len(), 2);
        assert_eq!(loader.provider(), "fixed");
    }

    #[tokio::test]
    async fn test_load_empty_series_is_an_error() {
        let source = FixedSource {
            rows: vec![point(date(2010, 1, 4), 2.0)],
            ..Default::default()
        };
        let loader = HistoryLoader::new_with_today(source, date(2024, 1, 1), date(2024, 1, 5));

        match loader.load(Ticker::Ril).await {
            Err(MarketError::EmptySeries { symbol }) => assert_eq!(symbol, "RELIANCE.NS"),
            other => panic!("expected EmptySeries, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_load_all_tickers_within_bounds() {
        let start = date(2015, 1, 1);
        let today = date(2024, 6, 28);
        let loader = HistoryLoader::new_with_today(crate::SyntheticSource, start, today);

        for ticker in Ticker::ALL {
            let history = loader.load(ticker).await.unwrap();
            assert!(history.first_date().unwrap() >= start);
            assert!(history.last_date().unwrap() <= today);
            assert!(history.points.windows(2).all(|w| w[0].date < w[1].date));
        }
    }
}
