use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use axum_valid::Valid;
use common::ForecastTable;
use compute::forecast::Horizon;
use tracing::{debug, instrument, trace};

use crate::error::ApiError;
use crate::helpers::forecasting::{
    forecast_bundle, forecast_for_history, load_history, parse_ticker,
};
use crate::schemas::{ApiResponse, AppState, ErrorResponse, ForecastCharts, ForecastQuery};

/// Forecast the closing price of a ticker
///
/// The table covers the whole history plus `years * 365` future days.
#[utoipa::path(
    get,
    path = "/api/v1/tickers/{label}/forecast",
    tag = "forecast",
    params(
        ("label" = String, Path, description = "Ticker label, symbol or slug"),
        ForecastQuery,
    ),
    responses(
        (status = 200, description = "Forecast computed successfully", body = ApiResponse<ForecastTable>),
        (status = 400, description = "Invalid horizon", body = ErrorResponse),
        (status = 404, description = "Unknown ticker", body = ErrorResponse),
        (status = 422, description = "Not enough history to fit", body = ErrorResponse),
        (status = 502, description = "Market data provider failed", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_forecast(
    Path(label): Path<String>,
    Valid(Query(query)): Valid<Query<ForecastQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ForecastTable>>, ApiError> {
    trace!("Entering get_forecast function");
    let ticker = parse_ticker(&label)?;
    let horizon = Horizon::new(query.years)?;

    let bundle = forecast_bundle(&state, ticker, horizon).await?;
    let data = match query.tail {
        Some(n) => {
            debug!("Returning last {} of {} forecast rows", n, bundle.table.len());
            bundle.table.tail(n)
        }
        None => bundle.table,
    };

    Ok(Json(ApiResponse {
        data,
        message: format!("Forecast for {} years computed successfully", horizon.years()),
        success: true,
    }))
}

/// Get the forecast and components charts of a ticker
#[utoipa::path(
    get,
    path = "/api/v1/tickers/{label}/forecast/chart",
    tag = "forecast",
    params(
        ("label" = String, Path, description = "Ticker label, symbol or slug"),
        ForecastQuery,
    ),
    responses(
        (status = 200, description = "Forecast charts rendered successfully", body = ApiResponse<ForecastCharts>),
        (status = 400, description = "Invalid horizon", body = ErrorResponse),
        (status = 404, description = "Unknown ticker", body = ErrorResponse),
        (status = 502, description = "Market data provider failed", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn get_forecast_charts(
    Path(label): Path<String>,
    Valid(Query(query)): Valid<Query<ForecastQuery>>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<ForecastCharts>>, ApiError> {
    let ticker = parse_ticker(&label)?;
    let horizon = Horizon::new(query.years)?;

    let history = load_history(&state, ticker).await?;
    let bundle = forecast_for_history(&state, ticker, history.clone(), horizon).await?;

    let forecast = charts::figure_json(&charts::forecast_chart(&history, &bundle.table));
    let components =
        charts::figure_json(&charts::components_chart(&bundle.table, &bundle.profiles));

    Ok(Json(ApiResponse {
        data: ForecastCharts { forecast, components },
        message: "Forecast charts rendered successfully".to_string(),
        success: true,
    }))
}
