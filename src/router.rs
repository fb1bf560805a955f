use crate::handlers::{
    cache::invalidate_ticker_cache,
    dashboard::dashboard,
    event_window::get_event_window,
    forecast::{get_forecast, get_forecast_charts},
    health::health_check,
    prices::{get_price_chart, get_prices},
    tickers::list_tickers,
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{delete, get},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Dashboard page
        .route("/", get(dashboard))
        // Health check
        .route("/health", get(health_check))
        // Ticker catalog and prices
        .route("/api/v1/tickers", get(list_tickers))
        .route("/api/v1/tickers/:label/prices", get(get_prices))
        .route("/api/v1/tickers/:label/prices/chart", get(get_price_chart))
        // Forecasts
        .route("/api/v1/tickers/:label/forecast", get(get_forecast))
        .route("/api/v1/tickers/:label/forecast/chart", get(get_forecast_charts))
        // Event window
        .route("/api/v1/tickers/:label/event-window", get(get_event_window))
        // Cache control
        .route("/api/v1/tickers/:label/cache", delete(invalidate_ticker_cache))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
