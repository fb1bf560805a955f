use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Weekday};
use common::PricePoint;
use std::f64::consts::PI;

use crate::error::Result;
use crate::source::{HistoryRequest, PriceSource};

/// Deterministic generated prices, used for offline runs and tests.
///
/// Produces one record per weekday with an exponential drift, a yearly cycle
/// and small pseudo-random noise. The same symbol and range always yield the
/// same series.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticSource;

impl SyntheticSource {
    pub fn generate(symbol: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
        let seed = symbol_seed(symbol);
        let mut rng = fastrand::Rng::with_seed(seed);
        let base = 200.0 + (seed % 1800) as f64;
        let drift = 0.06 + ((seed >> 16) % 10) as f64 / 100.0;

        start
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|date| {
                let years = (date - start).num_days() as f64 / 365.25;
                let season = 1.0 + 0.04 * (2.0 * PI * date.ordinal() as f64 / 365.25).sin();
                let noise = 1.0 + 0.01 * signed_unit(&mut rng);
                let close = base * (drift * years).exp() * season * noise;
                let open = close * (1.0 + 0.006 * signed_unit(&mut rng));
                let high = open.max(close) * (1.0 + 0.002 + 0.004 * rng.f64());
                let low = open.min(close) * (1.0 - 0.002 - 0.004 * rng.f64());

                PricePoint {
                    date,
                    open,
                    high,
                    low,
                    close,
                    adj_close: Some(close),
                    volume: rng.u64(500_000..2_000_000),
                }
            })
            .collect()
    }
}

#[async_trait]
impl PriceSource for SyntheticSource {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    async fn fetch_daily(&self, request: &HistoryRequest) -> Result<Vec<PricePoint>> {
        Ok(Self::generate(&request.symbol, request.start, request.end))
    }
}

/// Uniform in [-1, 1)
fn signed_unit(rng: &mut fastrand::Rng) -> f64 {
    rng.f64() * 2.0 - 1.0
}

// FNV-1a
fn symbol_seed(symbol: &str) -> u64 {
    symbol.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x0100_0000_01b3)
    })
}
