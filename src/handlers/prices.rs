use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use common::PriceHistory;
use tracing::{debug, instrument, trace};

use crate::error::ApiError;
use crate::helpers::forecasting::{load_history, parse_ticker};
use crate::schemas::{ApiResponse, AppState, ChartResponse, ErrorResponse, PricesQuery};

/// Get the daily price history of a ticker
#[utoipa::path(
    get,
    path = "/api/v1/tickers/{label}/prices",
    tag = "tickers",
    params(
        ("label" = String, Path, description = "Ticker label, symbol or slug"),
        PricesQuery,
    ),
    responses(
        (status = 200, description = "Price history retrieved successfully", body = ApiResponse<PriceHistory>),
        (status = 404, description = "Unknown ticker", body = ErrorResponse),
        (status = 502, description = "Market data provider failed", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_prices(
    Path(label): Path<String>,
    Query(query): Query<PricesQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PriceHistory>>, ApiError> {
    trace!("Entering get_prices function");
    let ticker = parse_ticker(&label)?;
    let history = load_history(&state, ticker).await?;

    let data = match query.tail {
        Some(n) => {
            debug!("Returning last {} of {} rows", n, history.len());
            history.tail(n)
        }
        None => history,
    };

    Ok(Json(ApiResponse {
        data,
        message: "Price history retrieved successfully".to_string(),
        success: true,
    }))
}

/// Get the open/close chart with range slider of a ticker
#[utoipa::path(
    get,
    path = "/api/v1/tickers/{label}/prices/chart",
    tag = "tickers",
    params(
        ("label" = String, Path, description = "Ticker label, symbol or slug"),
    ),
    responses(
        (status = 200, description = "Price chart rendered successfully", body = ApiResponse<ChartResponse>),
        (status = 404, description = "Unknown ticker", body = ErrorResponse),
        (status = 502, description = "Market data provider failed", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_price_chart(
    Path(label): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ChartResponse>>, ApiError> {
    let ticker = parse_ticker(&label)?;
    let history = load_history(&state, ticker).await?;
    let figure = charts::figure_json(&charts::raw_price_chart(&history));

    Ok(Json(ApiResponse {
        data: ChartResponse { figure },
        message: "Price chart rendered successfully".to_string(),
        success: true,
    }))
}
