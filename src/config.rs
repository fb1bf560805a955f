use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use config::{builder::DefaultState, Config, ConfigBuilder, Environment, File};
use market::{
    cached_loader, Backoff, PriceLoader, RetryPolicy, SyntheticSource, YahooChartSource,
};
use moka::future::Cache;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use crate::schemas::AppState;

/// Which market data provider backs the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Yahoo,
    Synthetic,
}

/// Application settings.
///
/// Sources, lowest precedence first: built-in defaults, `stockcast.toml` (or
/// the file given on the command line), `.env`, `STOCKCAST_*` environment
/// variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub bind_address: String,
    pub provider: ProviderKind,
    pub yahoo_base_url: String,
    /// First day of every loaded history
    pub history_start: NaiveDate,
    pub request_timeout_secs: u64,
    pub max_retries: u32,
    /// Lifetime of a cached price history
    pub cache_ttl_secs: u64,
    /// Number of price histories kept
    pub cache_capacity: usize,
    /// Lifetime of a cached forecast
    pub result_cache_ttl_secs: u64,
    pub result_cache_capacity: u64,
    /// Rows shown in the raw and forecast tables
    pub tail_rows: usize,
}

impl Settings {
    /// Builder preloaded with the defaults.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>> {
        Ok(Config::builder()
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("provider", "yahoo")?
            .set_default("yahoo_base_url", market::yahoo::DEFAULT_BASE_URL)?
            .set_default("history_start", "2015-01-01")?
            .set_default("request_timeout_secs", 20_i64)?
            .set_default("max_retries", 2_i64)?
            .set_default("cache_ttl_secs", 3600_i64)?
            .set_default("cache_capacity", 16_i64)?
            .set_default("result_cache_ttl_secs", 300_i64)?
            .set_default("result_cache_capacity", 1000_i64)?
            .set_default("tail_rows", 5_i64)?)
    }

    /// Loads settings from every source. A missing default file is fine; a
    /// missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();

        let builder = Self::builder()?;
        let builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("stockcast").required(false)),
        };

        let settings: Self = builder
            .add_source(Environment::with_prefix("STOCKCAST").try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    /// Rejects values the caches and tables cannot work with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.cache_capacity > 0, "cache_capacity must be greater than zero");
        ensure!(
            self.result_cache_capacity > 0,
            "result_cache_capacity must be greater than zero"
        );
        ensure!(self.cache_ttl_secs > 0, "cache_ttl_secs must be greater than zero");
        ensure!(self.tail_rows > 0, "tail_rows must be greater than zero");
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            backoff: Backoff::default(),
        }
    }
}

/// Builds the cached price loader selected by `settings.provider`.
pub fn build_loader(settings: &Settings) -> Result<Arc<dyn PriceLoader>> {
    settings.validate()?;
    let ttl = Duration::from_secs(settings.cache_ttl_secs);
    let loader: Arc<dyn PriceLoader> = match settings.provider {
        ProviderKind::Yahoo => {
            let source = YahooChartSource::new(
                settings.yahoo_base_url.clone(),
                Duration::from_secs(settings.request_timeout_secs),
                settings.retry_policy(),
            )?;
            Arc::new(cached_loader(source, settings.history_start, settings.cache_capacity, ttl))
        }
        ProviderKind::Synthetic => Arc::new(cached_loader(
            SyntheticSource,
            settings.history_start,
            settings.cache_capacity,
            ttl,
        )),
    };
    Ok(loader)
}

/// Initialize application state
pub fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    tracing::info!(
        provider = ?settings.provider,
        start = %settings.history_start,
        "Initializing price loader"
    );
    let loader = build_loader(settings)?;

    // Rendered forecasts
    let cache = Cache::builder()
        .max_capacity(settings.result_cache_capacity)
        .time_to_live(Duration::from_secs(settings.result_cache_ttl_secs))
        .build();

    Ok(AppState {
        loader,
        forecaster: Arc::new(compute::default_forecaster()),
        cache,
        tail_rows: settings.tail_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_defaults() {
        let settings: Settings = Settings::builder()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.bind_address, "0.0.0.0:3000");
        assert_eq!(settings.provider, ProviderKind::Yahoo);
        assert_eq!(settings.history_start, NaiveDate::from_ymd_opt(2015, 1, 1).unwrap());
        assert_eq!(settings.tail_rows, 5);
        assert_eq!(settings.cache_ttl_secs, 3600);
        assert_eq!(settings.retry_policy().max_retries, 2);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let toml = "provider = \"synthetic\"\ntail_rows = 10\nhistory_start = \"2018-06-01\"\n";
        let settings: Settings = Settings::builder()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(settings.provider, ProviderKind::Synthetic);
        assert_eq!(settings.tail_rows, 10);
        assert_eq!(settings.history_start, NaiveDate::from_ymd_opt(2018, 6, 1).unwrap());
        assert_eq!(settings.bind_address, "0.0.0.0:3000");
    }

    #[tokio::test]
    async fn test_initialize_synthetic_state() {
        let toml = "provider = \"synthetic\"";
        let settings: Settings = Settings::builder()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        let state = initialize_app_state(&settings).unwrap();
        assert_eq!(state.loader.provider(), "synthetic");
        assert_eq!(state.tail_rows, 5);
    }

    fn synthetic_settings(extra: &str) -> Settings {
        let toml = format!("provider = \"synthetic\"\n{}", extra);
        Settings::builder()
            .unwrap()
            .add_source(File::from_str(&toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_validate_rejects_zero_cache_capacity() {
        let settings = synthetic_settings("cache_capacity = 0");

        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("cache_capacity"));
    }

    #[test]
    fn test_zero_capacity_fails_state_initialization() {
        let settings = synthetic_settings("cache_capacity = 0");

        assert!(build_loader(&settings).is_err());
        assert!(initialize_app_state(&settings).is_err());
    }

    #[test]
    fn test_validate_accepts_defaults() {
        assert!(synthetic_settings("").validate().is_ok());
    }
}
