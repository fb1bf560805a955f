use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One entry of the ticker catalog as exposed over the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct TickerInfo {
    /// Human-readable label used by the selectors (e.g. "ICICI Bank")
    pub label: String,
    /// Exchange-qualified symbol queried at the market-data provider
    pub symbol: String,
    /// Display title used by the event-window chart
    pub title: String,
}

/// A single daily OHLCV record.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PricePoint {
    /// Trading date in the exchange's local calendar
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    /// Close adjusted for splits and dividends, when the provider reports it
    pub adj_close: Option<f64>,
    pub volume: u64,
}

/// Daily price history of one ticker, ordered by ascending date.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct PriceHistory {
    /// Catalog label the history was loaded for
    pub label: String,
    /// Provider symbol the history was fetched from
    pub symbol: String,
    /// Daily records
    pub points: Vec<PricePoint>,
}

impl PriceHistory {
    pub fn new(
        label: impl Into<String>,
        symbol: impl Into<String>,
        points: Vec<PricePoint>,
    ) -> Self {
        Self {
            label: label.into(),
            symbol: symbol.into(),
            points,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Copy of this history keeping only the last `n` records.
    pub fn tail(&self, n: usize) -> Self {
        Self {
            label: self.label.clone(),
            symbol: self.symbol.clone(),
            points: crate::tail(&self.points, n),
        }
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn opens(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.open).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }
}
