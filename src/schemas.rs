use common::{
    DateRange, EventWindow, ForecastPoint, ForecastTable, HighPoint, HighlightWindow, PriceHistory,
    PricePoint, SeasonalProfile, TickerInfo,
};
use compute::forecast::Forecaster;
use market::PriceLoader;
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, OpenApi, ToSchema};
use validator::Validate;

pub use common::ApiResponse;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Cached price history loader
    pub loader: Arc<dyn PriceLoader>,
    /// Forecaster used for every fit
    pub forecaster: Arc<Forecaster>,
    /// Cache for expensive operations
    pub cache: Cache<String, CachedData>,
    /// Rows shown in the raw and forecast tables
    pub tail_rows: usize,
}

/// Cached data types
#[derive(Clone, Debug)]
pub enum CachedData {
    Forecast(ForecastBundle),
}

/// Forecast table together with the fitted seasonal profiles.
#[derive(Clone, Debug)]
pub struct ForecastBundle {
    pub table: ForecastTable,
    pub profiles: Vec<SeasonalProfile>,
}

/// Query parameters for price endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams)]
pub struct PricesQuery {
    /// Return only the last N rows
    pub tail: Option<usize>,
}

fn default_years() -> u8 {
    1
}

/// Query parameters for forecast endpoints
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct ForecastQuery {
    /// Years of prediction (1-4, default: 1)
    #[serde(default = "default_years")]
    #[validate(range(min = 1, max = 4))]
    pub years: u8,
    /// Return only the last N rows
    pub tail: Option<usize>,
}

/// Query parameters of the dashboard page
#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct DashboardQuery {
    /// Dataset selected for prediction (default: first catalog entry)
    pub ticker: Option<String>,
    /// Years of prediction (default: 1)
    pub years: Option<u8>,
    /// Dataset selected for the event window (default: first catalog entry)
    pub event_ticker: Option<String>,
}

/// Error response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
}

/// Health check response
#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Market data provider in use
    pub provider: String,
}

/// A plotly.js figure (`data` and `layout`)
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChartResponse {
    #[schema(value_type = Object)]
    pub figure: serde_json::Value,
}

/// Forecast and components figures of one forecast run
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ForecastCharts {
    #[schema(value_type = Object)]
    pub forecast: serde_json::Value,
    #[schema(value_type = Object)]
    pub components: serde_json::Value,
}

/// Event window data and its figure
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EventWindowResponse {
    pub window: EventWindow,
    #[schema(value_type = Object)]
    pub figure: serde_json::Value,
}

/// Result of a cache invalidation
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CacheInvalidation {
    /// Label whose cached entries were dropped
    pub label: String,
    /// Number of cached forecasts dropped
    pub forecasts_dropped: usize,
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::tickers::list_tickers,
        crate::handlers::prices::get_prices,
        crate::handlers::prices::get_price_chart,
        crate::handlers::forecast::get_forecast,
        crate::handlers::forecast::get_forecast_charts,
        crate::handlers::event_window::get_event_window,
        crate::handlers::cache::invalidate_ticker_cache,
        crate::handlers::dashboard::dashboard,
    ),
    components(
        schemas(
            ApiResponse<Vec<TickerInfo>>,
            ApiResponse<PriceHistory>,
            ApiResponse<ForecastTable>,
            ApiResponse<ChartResponse>,
            ApiResponse<ForecastCharts>,
            ApiResponse<EventWindowResponse>,
            ApiResponse<CacheInvalidation>,
            ErrorResponse,
            HealthResponse,
            PricesQuery,
            ForecastQuery,
            DashboardQuery,
            ChartResponse,
            ForecastCharts,
            EventWindowResponse,
            CacheInvalidation,
            TickerInfo,
            PriceHistory,
            PricePoint,
            ForecastTable,
            ForecastPoint,
            SeasonalProfile,
            EventWindow,
            HighlightWindow,
            HighPoint,
            DateRange,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "tickers", description = "Ticker catalog and price history endpoints"),
        (name = "forecast", description = "Forecast endpoints"),
        (name = "events", description = "Event window endpoints"),
        (name = "dashboard", description = "Interactive dashboard page"),
    ),
    info(
        title = "Stockcast API",
        description = "Stock price forecasting dashboard and API",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
