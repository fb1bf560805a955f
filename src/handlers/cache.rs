use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::{info, instrument};

use crate::error::ApiError;
use crate::helpers::forecasting::{invalidate_ticker, parse_ticker};
use crate::schemas::{ApiResponse, AppState, CacheInvalidation, ErrorResponse};

/// Drop the cached history and forecasts of a ticker
#[utoipa::path(
    delete,
    path = "/api/v1/tickers/{label}/cache",
    tag = "tickers",
    params(
        ("label" = String, Path, description = "Ticker label, symbol or slug"),
    ),
    responses(
        (status = 200, description = "Cache invalidated", body = ApiResponse<CacheInvalidation>),
        (status = 404, description = "Unknown ticker", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn invalidate_ticker_cache(
    Path(label): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<CacheInvalidation>>, ApiError> {
    let ticker = parse_ticker(&label)?;
    let forecasts_dropped = invalidate_ticker(&state, ticker).await;
    info!(ticker = %ticker, forecasts_dropped, "Cache invalidated");

    Ok(Json(ApiResponse {
        data: CacheInvalidation {
            label: ticker.label().to_string(),
            forecasts_dropped,
        },
        message: "Cache invalidated".to_string(),
        success: true,
    }))
}
