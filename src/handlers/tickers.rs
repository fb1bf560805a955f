use axum::response::Json;
use common::TickerInfo;
use market::Ticker;
use tracing::instrument;

use crate::schemas::ApiResponse;

/// List the ticker catalog in display order
#[utoipa::path(
    get,
    path = "/api/v1/tickers",
    tag = "tickers",
    responses(
        (status = 200, description = "Tickers retrieved successfully", body = ApiResponse<Vec<TickerInfo>>)
    )
)]
#[instrument]
pub async fn list_tickers() -> Json<ApiResponse<Vec<TickerInfo>>> {
    Json(ApiResponse {
        data: Ticker::catalog(),
        message: "Tickers retrieved successfully".to_string(),
        success: true,
    })
}
