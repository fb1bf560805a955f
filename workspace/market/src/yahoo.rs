use async_trait::async_trait;
use chrono::{DateTime, Days, NaiveDate};
use common::PricePoint;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

use crate::error::{MarketError, Result};
use crate::retry::RetryPolicy;
use crate::source::{HistoryRequest, PriceSource};

/// Default host of the chart API.
pub const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) stockcast/0.1";

/// Daily history from the Yahoo Finance v8 chart endpoint.
#[derive(Debug, Clone)]
pub struct YahooChartSource {
    client: reqwest::Client,
    base_url: String,
    retry: RetryPolicy,
}

impl YahooChartSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        })
    }

    /// Builds the chart URL for a request.
    ///
    /// `period1` starts one day early because bars are stamped in exchange time
    /// and the exchange offset is only known from the response. `period2` is
    /// exclusive, so it points at the midnight after the last wanted day.
    pub fn chart_url(&self, request: &HistoryRequest) -> String {
        let first = request.start.checked_sub_days(Days::new(1)).unwrap_or(request.start);
        let after_last = request.end.checked_add_days(Days::new(1)).unwrap_or(request.end);
        let period1 = midnight_timestamp(first);
        let period2 = midnight_timestamp(after_last);
        format!(
            "{}/v8/finance/chart/{}?period1={}&period2={}&interval=1d&events=history&includeAdjustedClose=true",
            self.base_url, request.symbol, period1, period2
        )
    }

    async fn fetch_once(&self, url: &str, symbol: &str) -> Result<String> {
        trace!(url, "Sending chart request");
        let response = self
            .client
            .get(url)
            .header("referer", "https://finance.yahoo.com/")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MarketError::Upstream {
                symbol: symbol.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl PriceSource for YahooChartSource {
    fn name(&self) -> &'static str {
        "yahoo"
    }

    #[instrument(skip(self), fields(symbol = %request.symbol))]
    async fn fetch_daily(&self, request: &HistoryRequest) -> Result<Vec<PricePoint>> {
        let url = self.chart_url(request);
        let mut attempt = 0;

        loop {
            match self.fetch_once(&url, &request.symbol).await {
                Ok(body) => {
                    let points = parse_chart_body(&body)?;
                    debug!(rows = points.len(), attempt, "Chart response parsed");
                    return Ok(points);
                }
                Err(err) if self.retry.should_retry(attempt, &err) => {
                    let delay = self.retry.backoff.delay(attempt);
                    warn!(?err, attempt, ?delay, "Chart request failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn midnight_timestamp(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .unwrap_or_default()
}

/// Decodes a chart payload into daily records.
///
/// Timestamps are shifted by the exchange's GMT offset before taking the
/// calendar date. Rows with any missing OHLC value are skipped.
pub fn parse_chart_body(body: &str) -> Result<Vec<PricePoint>> {
    let envelope: ChartEnvelope = serde_json::from_str(body)?;

    if let Some(error) = envelope.chart.error {
        return Err(MarketError::Provider(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let result = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| MarketError::Decode("no chart result in response".to_string()))?;

    let Some(quote) = result.indicators.quote.into_iter().next() else {
        return Ok(Vec::new());
    };
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut points = Vec::with_capacity(result.timestamp.len());
    for (i, ts) in result.timestamp.iter().enumerate() {
        let (Some(Some(open)), Some(Some(high)), Some(Some(low)), Some(Some(close))) = (
            quote.open.get(i),
            quote.high.get(i),
            quote.low.get(i),
            quote.close.get(i),
        ) else {
            continue;
        };

        let date = DateTime::from_timestamp(ts + offset, 0)
            .ok_or_else(|| MarketError::Decode(format!("invalid timestamp: {}", ts)))?
            .date_naive();

        points.push(PricePoint {
            date,
            open: *open,
            high: *high,
            low: *low,
            close: *close,
            adj_close: adjclose.get(i).copied().flatten(),
            volume: quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .map(|v| v.max(0) as u64)
                .unwrap_or(0),
        });
    }

    Ok(points)
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: ChartIndicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct ChartIndicators {
    #[serde(default)]
    quote: Vec<ChartQuote>,
    #[serde(default)]
    adjclose: Vec<ChartAdjClose>,
}

#[derive(Debug, Deserialize)]
struct ChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

#[derive(Debug, Deserialize)]
struct ChartAdjClose {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Two NSE sessions stamped at 09:15 IST plus one row with a missing close.
    const BODY: &str = r#"{
        "chart": {
            "result": [{
                "meta": {"currency": "INR", "symbol": "TCS.NS", "gmtoffset": 19800},
                "timestamp": [1420083900, 1420170300, 1420429500],
                "indicators": {
                    "quote": [{
                        "open":   [1272.0, 1275.0, 1280.0],
                        "high":   [1282.0, 1290.5, 1295.0],
                        "low":    [1270.1, 1271.0, 1279.0],
                        "close":  [1280.0, 1288.0, null],
                        "volume": [366830, 925740, 100]
                    }],
                    "adjclose": [{"adjclose": [1100.5, 1107.4, null]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn test_parse_chart_body() {
        let points = parse_chart_body(BODY).unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2015, 1, 2).unwrap());
        assert_eq!(points[0].open, 1272.0);
        assert_eq!(points[1].high, 1290.5);
        assert_eq!(points[1].close, 1288.0);
        assert_eq!(points[0].adj_close, Some(1100.5));
        assert_eq!(points[1].volume, 925740);
    }

    #[test]
    fn test_parse_provider_error() {
        let body = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        match parse_chart_body(body) {
            Err(MarketError::Provider(message)) => assert!(message.contains("Not Found")),
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_without_rows() {
        let body = r#"{"chart":{"result":[{"meta":{"gmtoffset":19800},"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(parse_chart_body(body).unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(matches!(parse_chart_body("<html>"), Err(MarketError::Decode(_))));
    }

    #[test]
    fn test_chart_url_bounds() {
        let timeout = Duration::from_secs(1);
        let source =
            YahooChartSource::new("http://localhost:9999/", timeout, RetryPolicy::none()).unwrap();
        let request = HistoryRequest::new(
            "TCS.NS",
            NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2015, 1, 2).unwrap(),
        )
        .unwrap();

        let url = source.chart_url(&request);
        assert!(url.starts_with("http://localhost:9999/v8/finance/chart/TCS.NS?"));
        // 2014-12-31T00:00Z and 2015-01-03T00:00Z
        assert!(url.contains("period1=1419984000"));
        assert!(url.contains("period2=1420243200"));
        assert!(url.contains("interval=1d"));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let source =
            YahooChartSource::new("http://127.0.0.1:1", Duration::from_secs(2), RetryPolicy::none())
                .unwrap();
        let request = HistoryRequest::new(
            "TCS.NS",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
        )
        .unwrap();

        let err = source.fetch_daily(&request).await.unwrap_err();
        assert!(matches!(err, MarketError::Transport(_)));
    }
}
