use std::str::FromStr;

use common::PriceHistory;
use compute::forecast::Horizon;
use market::Ticker;
use tracing::{debug, info, instrument, trace};

use crate::error::ApiError;
use crate::helpers::converters::convert_dataframe_to_forecast;
use crate::schemas::{AppState, CachedData, ForecastBundle};

/// Resolves a catalog label, symbol or slug. Unknown names are an error.
pub fn parse_ticker(name: &str) -> Result<Ticker, ApiError> {
    Ticker::from_str(name).map_err(ApiError::from)
}

/// Resolves an optional dashboard selection, falling back to the first
/// catalog entry.
pub fn parse_selection(name: Option<&str>) -> Result<Ticker, ApiError> {
    match name {
        Some(name) if !name.trim().is_empty() => parse_ticker(name),
        _ => Ok(Ticker::default()),
    }
}

/// Loads the full daily history of `ticker` through the cached loader.
#[instrument(skip(state))]
pub async fn load_history(state: &AppState, ticker: Ticker) -> Result<PriceHistory, ApiError> {
    let history = state.loader.load(ticker).await?;
    debug!(rows = history.len(), "History loaded");
    Ok(history)
}

pub fn forecast_cache_key(ticker: Ticker, horizon: Horizon) -> String {
    format!("forecast_{}_{}", ticker.slug(), horizon.years())
}

/// Returns the forecast of `ticker` over `horizon`, fitting a new model
/// unless a cached result is still alive.
#[instrument(skip(state))]
pub async fn forecast_bundle(
    state: &AppState,
    ticker: Ticker,
    horizon: Horizon,
) -> Result<ForecastBundle, ApiError> {
    let cache_key = forecast_cache_key(ticker, horizon);

    // Check cache first
    if let Some(CachedData::Forecast(bundle)) = state.cache.get(&cache_key).await {
        debug!("Forecast retrieved from cache");
        return Ok(bundle);
    }

    let history = load_history(state, ticker).await?;
    forecast_from_history(state, history, horizon, cache_key).await
}

/// Fits and caches a forecast for an already loaded history.
pub async fn forecast_for_history(
    state: &AppState,
    ticker: Ticker,
    history: PriceHistory,
    horizon: Horizon,
) -> Result<ForecastBundle, ApiError> {
    let cache_key = forecast_cache_key(ticker, horizon);
    if let Some(CachedData::Forecast(bundle)) = state.cache.get(&cache_key).await {
        return Ok(bundle);
    }
    forecast_from_history(state, history, horizon, cache_key).await
}

async fn forecast_from_history(
    state: &AppState,
    history: PriceHistory,
    horizon: Horizon,
    cache_key: String,
) -> Result<ForecastBundle, ApiError> {
    trace!("Fitting forecast model");
    let forecaster = state.forecaster.clone();

    // Fitting is CPU bound
    let bundle = tokio::task::spawn_blocking(move || -> Result<ForecastBundle, ApiError> {
        let run = compute::run_forecast(&history, horizon, &forecaster)?;
        let table = convert_dataframe_to_forecast(
            &run.forecast,
            &history.label,
            horizon.years(),
            run.model.history_rows(),
        )
        .map_err(ApiError::Internal)?;
        Ok(ForecastBundle {
            table,
            profiles: run.model.seasonal_profiles(),
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Forecast task failed: {}", e)))??;

    info!(rows = bundle.table.len(), years = horizon.years(), "Forecast computed");

    // Cache the result
    state.cache.insert(cache_key, CachedData::Forecast(bundle.clone())).await;
    Ok(bundle)
}

/// Drops every cached entry of `ticker`: the price history and the forecasts
/// of all horizons. Returns the number of forecasts dropped.
pub async fn invalidate_ticker(state: &AppState, ticker: Ticker) -> usize {
    state.loader.invalidate(ticker);

    let mut dropped = 0;
    for years in Horizon::MIN_YEARS..=Horizon::MAX_YEARS {
        let Ok(horizon) = Horizon::new(years) else {
            continue;
        };
        if state.cache.remove(&forecast_cache_key(ticker, horizon)).await.is_some() {
            dropped += 1;
        }
    }
    dropped
}

