use axum::{
    extract::{Path, State},
    response::Json,
};
use tracing::{debug, instrument};

use crate::error::ApiError;
use crate::helpers::forecasting::{load_history, parse_ticker};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, EventWindowResponse};

/// Daily highs of a ticker around the 2020 lockdown, with both phases shaded
#[utoipa::path(
    get,
    path = "/api/v1/tickers/{label}/event-window",
    tag = "events",
    params(
        ("label" = String, Path, description = "Ticker label, symbol or slug"),
    ),
    responses(
        (status = 200, description = "Event window rendered successfully", body = ApiResponse<EventWindowResponse>),
        (status = 404, description = "Unknown ticker", body = ErrorResponse),
        (status = 502, description = "Market data provider failed", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_event_window(
    Path(label): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<EventWindowResponse>>, ApiError> {
    let ticker = parse_ticker(&label)?;
    let history = load_history(&state, ticker).await?;

    let window = compute::event_window::event_window(&history, ticker.title());
    debug!(points = window.points.len(), "Event window extracted");
    let figure = charts::figure_json(&charts::event_window_chart(&window));

    Ok(Json(ApiResponse {
        data: EventWindowResponse { window, figure },
        message: "Event window rendered successfully".to_string(),
        success: true,
    }))
}
