use anyhow::{Context, Result};
use compute::forecast::Horizon;
use market::Ticker;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::config::{build_loader, Settings};

/// Loads one ticker, fits a forecast and prints the last `tail` rows of the
/// forecast frame.
pub async fn forecast(config: Option<&Path>, ticker: &str, years: u8, tail: usize) -> Result<()> {
    let settings = Settings::load(config)?;
    let ticker = Ticker::from_str(ticker)?;
    let horizon = Horizon::new(years)?;
    debug!(%ticker, years, provider = ?settings.provider, "Running forecast command");

    let loader = build_loader(&settings)?;
    let history = loader
        .load(ticker)
        .await
        .with_context(|| format!("Failed to load prices for {}", ticker))?;
    info!("Loaded {} rows for {}", history.len(), ticker);

    let forecaster = compute::default_forecaster();
    let run = tokio::task::spawn_blocking(move || {
        compute::run_forecast(&history, horizon, &forecaster)
    })
    .await??;

    println!("Forecast data for {} ({} years)", ticker.title(), horizon.years());
    println!("{}", run.forecast.tail(Some(tail)));
    Ok(())
}
