use axum::{
    extract::{Query, State},
    response::Html,
};
use charts::{DashboardPage, DashboardProps};
use compute::forecast::Horizon;
use market::Ticker;
use tracing::{debug, info, instrument, trace};

use crate::error::ApiError;
use crate::helpers::forecasting::{forecast_for_history, load_history, parse_selection};
use crate::schemas::{AppState, DashboardQuery, ErrorResponse};

/// Interactive dashboard page
///
/// Renders the raw data, forecast and event window sections for the current
/// selection. Every control change reloads the page with new query parameters.
#[utoipa::path(
    get,
    path = "/",
    tag = "dashboard",
    params(DashboardQuery),
    responses(
        (status = 200, description = "Dashboard rendered", content_type = "text/html", body = String),
        (status = 400, description = "Invalid horizon", body = ErrorResponse),
        (status = 404, description = "Unknown ticker", body = ErrorResponse),
        (status = 502, description = "Market data provider failed", body = ErrorResponse)
    )
)]
#[instrument]
pub async fn dashboard(
    Query(query): Query<DashboardQuery>,
    State(state): State<AppState>,
) -> Result<Html<String>, ApiError> {
    trace!("Entering dashboard function");
    let ticker = parse_selection(query.ticker.as_deref())?;
    let event_ticker = parse_selection(query.event_ticker.as_deref())?;
    let horizon = Horizon::new(query.years.unwrap_or(Horizon::MIN_YEARS))?;
    debug!(%ticker, %event_ticker, years = horizon.years(), "Rendering dashboard");

    let history = load_history(&state, ticker).await?;
    let bundle = forecast_for_history(&state, ticker, history.clone(), horizon).await?;

    let event_history = if event_ticker == ticker {
        history.clone()
    } else {
        load_history(&state, event_ticker).await?
    };
    let window = compute::event_window::event_window(&event_history, event_ticker.title());

    // Plots stay inside this block so only owned props cross the await.
    let props = {
        let catalog = Ticker::catalog();
        let raw_tail = history.tail(state.tail_rows);
        let forecast_tail = bundle.table.tail(state.tail_rows);
        let raw_chart = charts::raw_price_chart(&history);
        let forecast_chart = charts::forecast_chart(&history, &bundle.table);
        let components_chart = charts::components_chart(&bundle.table, &bundle.profiles);
        let event_chart = charts::event_window_chart(&window);

        DashboardProps::from(&DashboardPage {
            tickers: &catalog,
            selected: ticker.label(),
            years: horizon.years(),
            max_years: Horizon::MAX_YEARS,
            event_selected: event_ticker.label(),
            raw_tail: &raw_tail,
            raw_chart: &raw_chart,
            forecast_tail: &forecast_tail,
            forecast_chart: &forecast_chart,
            components_chart: &components_chart,
            event_chart: &event_chart,
        })
    };

    let html = charts::render_dashboard(props).await;
    info!(bytes = html.len(), "Dashboard rendered");
    Ok(Html(html))
}
