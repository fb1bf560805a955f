use async_trait::async_trait;
use chrono::NaiveDate;
use common::PricePoint;
use std::fmt::Debug;

use crate::error::{MarketError, Result};

/// Daily history request for one provider symbol. Both bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HistoryRequest {
    pub fn new(symbol: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(MarketError::InvalidRange(format!(
                "start {} is after end {}",
                start, end
            )));
        }
        Ok(Self {
            symbol: symbol.into(),
            start,
            end,
        })
    }
}

/// A remote (or generated) source of daily OHLCV records.
///
/// Implementations return records as the provider delivers them; ordering,
/// deduplication and clipping happen in the loader.
#[async_trait]
pub trait PriceSource: Send + Sync + Debug {
    /// Short provider name used in logs and health output.
    fn name(&self) -> &'static str;

    async fn fetch_daily(&self, request: &HistoryRequest) -> Result<Vec<PricePoint>>;
}

#[async_trait]
impl<S: PriceSource + ?Sized> PriceSource for std::sync::Arc<S> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn fetch_daily(&self, request: &HistoryRequest) -> Result<Vec<PricePoint>> {
        (**self).fetch_daily(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_inverted_range() {
        let start = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(matches!(
            HistoryRequest::new("TCS.NS", start, end),
            Err(MarketError::InvalidRange(_))
        ));
        assert!(HistoryRequest::new("TCS.NS", end, end).is_ok());
    }
}
