use common::{ForecastTable, PriceHistory, TickerInfo};
use plotly::Plot;
use yew::prelude::*;
use yew::ServerRenderer;

use crate::PLOTLY_JS_URL;

pub const PAGE_TITLE: &str = "Stock Price Prediction App\u{1F680}";
const YEARS_LABEL: &str = "Years of prediction:\u{1F4C6}";

// Inline `on*` attributes are reserved for yew listeners, so the controls are
// wired to the form after load.
const AUTO_SUBMIT_JS: &str = "document.querySelectorAll('form select, form input')\
    .forEach(function (el) { el.addEventListener('change', function () { el.form.submit(); }); });";

const PAGE_STYLE: &str = "body { font-family: sans-serif; margin: 2rem auto; max-width: 1100px; }
table { border-collapse: collapse; margin-bottom: 1rem; }
td, th { border: 1px solid #ddd; padding: 4px 8px; text-align: right; }
label { display: block; margin-top: 1rem; font-weight: bold; }";

/// Everything the dashboard page shows for one selection.
pub struct DashboardPage<'a> {
    pub tickers: &'a [TickerInfo],
    /// Label selected for the forecast
    pub selected: &'a str,
    pub years: u8,
    pub max_years: u8,
    /// Label selected for the event window
    pub event_selected: &'a str,
    pub raw_tail: &'a PriceHistory,
    pub raw_chart: &'a Plot,
    pub forecast_tail: &'a ForecastTable,
    pub forecast_chart: &'a Plot,
    pub components_chart: &'a Plot,
    pub event_chart: &'a Plot,
}

/// Owned page state handed to the renderer thread.
#[derive(Properties, PartialEq, Clone)]
pub struct DashboardProps {
    pub tickers: Vec<TickerInfo>,
    pub selected: String,
    pub years: u8,
    pub max_years: u8,
    pub event_selected: String,
    pub raw_tail: PriceHistory,
    pub forecast_tail: ForecastTable,
    /// Pre-rendered plotly markup, one entry per chart
    pub raw_chart: String,
    pub forecast_chart: String,
    pub components_chart: String,
    pub event_chart: String,
}

impl From<&DashboardPage<'_>> for DashboardProps {
    fn from(page: &DashboardPage<'_>) -> Self {
        Self {
            tickers: page.tickers.to_vec(),
            selected: page.selected.to_string(),
            years: page.years,
            max_years: page.max_years,
            event_selected: page.event_selected.to_string(),
            raw_tail: page.raw_tail.clone(),
            forecast_tail: page.forecast_tail.clone(),
            raw_chart: page.raw_chart.to_inline_html(Some("raw-chart")),
            forecast_chart: page.forecast_chart.to_inline_html(Some("forecast-chart")),
            components_chart: page.components_chart.to_inline_html(Some("components-chart")),
            event_chart: page.event_chart.to_inline_html(Some("event-chart")),
        }
    }
}

/// Renders the full dashboard as a standalone HTML document. Every control
/// submits the form on change, so any selection re-renders the page.
pub async fn render_dashboard(props: DashboardProps) -> String {
    let body = ServerRenderer::<Dashboard>::with_props(move || props)
        .hydratable(false)
        .render()
        .await;

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{PAGE_TITLE}</title>\n<script src=\"{PLOTLY_JS_URL}\"></script>\n\
         <style>\n{PAGE_STYLE}\n</style>\n</head>\n<body>\n{body}\n\
         <script>{AUTO_SUBMIT_JS}</script>\n</body>\n</html>\n"
    )
}

#[function_component(Dashboard)]
pub fn dashboard(props: &DashboardProps) -> Html {
    html! {
        <>
            <h1>{PAGE_TITLE}</h1>
            <form method="get" action="/">
                <label for="ticker">{"Select dataset for prediction"}</label>
                <TickerSelect
                    name="ticker"
                    tickers={props.tickers.clone()}
                    selected={props.selected.clone()}
                />
                <label for="years">
                    {YEARS_LABEL}{" "}<output id="years-value">{props.years}</output>
                </label>
                <input
                    type="range"
                    id="years"
                    name="years"
                    min="1"
                    max={props.max_years.to_string()}
                    step="1"
                    value={props.years.to_string()}
                />

                <h2>{"Raw data"}</h2>
                <PriceTableView history={props.raw_tail.clone()} />
                <RawMarkup markup={props.raw_chart.clone()} />

                <h2>{"Forecast data"}</h2>
                <ForecastTableView table={props.forecast_tail.clone()} />
                <h2>{format!("Forecast plot for {} years", props.forecast_tail.horizon_years)}</h2>
                <RawMarkup markup={props.forecast_chart.clone()} />
                <h2>{"Forecast components"}</h2>
                <RawMarkup markup={props.components_chart.clone()} />

                <label for="event_ticker">{"Select dataset for Lockdown Analysis"}</label>
                <TickerSelect
                    name="event_ticker"
                    tickers={props.tickers.clone()}
                    selected={props.event_selected.clone()}
                />
            </form>
            <RawMarkup markup={props.event_chart.clone()} />
        </>
    }
}

#[derive(Properties, PartialEq)]
struct TickerSelectProps {
    name: AttrValue,
    tickers: Vec<TickerInfo>,
    selected: String,
}

#[function_component(TickerSelect)]
fn ticker_select(props: &TickerSelectProps) -> Html {
    html! {
        <select id={props.name.clone()} name={props.name.clone()}>
            {for props.tickers.iter().map(|ticker| {
                let chosen = ticker.label == props.selected;
                html! {
                    <option value={ticker.label.clone()} selected={chosen}>
                        {ticker.label.clone()}
                    </option>
                }
            })}
        </select>
    }
}

#[derive(Properties, PartialEq)]
struct PriceTableProps {
    history: PriceHistory,
}

#[function_component(PriceTableView)]
fn price_table(props: &PriceTableProps) -> Html {
    html! {
        <table>
            <thead>
                <tr>
                    <th>{"Date"}</th><th>{"Open"}</th><th>{"High"}</th><th>{"Low"}</th>
                    <th>{"Close"}</th><th>{"Adj Close"}</th><th>{"Volume"}</th>
                </tr>
            </thead>
            <tbody>
                {for props.history.points.iter().map(|p| html! {
                    <tr>
                        <td>{p.date.to_string()}</td>
                        <td>{format!("{:.2}", p.open)}</td>
                        <td>{format!("{:.2}", p.high)}</td>
                        <td>{format!("{:.2}", p.low)}</td>
                        <td>{format!("{:.2}", p.close)}</td>
                        <td>{p.adj_close.map(|v| format!("{:.2}", v)).unwrap_or_default()}</td>
                        <td>{p.volume}</td>
                    </tr>
                })}
            </tbody>
        </table>
    }
}

#[derive(Properties, PartialEq)]
struct ForecastTableProps {
    table: ForecastTable,
}

#[function_component(ForecastTableView)]
fn forecast_table(props: &ForecastTableProps) -> Html {
    html! {
        <table>
            <thead>
                <tr>
                    <th>{"ds"}</th><th>{"trend"}</th><th>{"yhat_lower"}</th>
                    <th>{"yhat_upper"}</th><th>{"yhat"}</th>
                </tr>
            </thead>
            <tbody>
                {for props.table.rows.iter().map(|r| html! {
                    <tr>
                        <td>{r.ds.to_string()}</td>
                        <td>{format!("{:.2}", r.trend)}</td>
                        <td>{format!("{:.2}", r.yhat_lower)}</td>
                        <td>{format!("{:.2}", r.yhat_upper)}</td>
                        <td>{format!("{:.2}", r.yhat)}</td>
                    </tr>
                })}
            </tbody>
        </table>
    }
}

#[derive(Properties, PartialEq)]
struct RawMarkupProps {
    markup: String,
}

/// Embeds markup produced by plotly as is.
#[function_component(RawMarkup)]
fn raw_markup(props: &RawMarkupProps) -> Html {
    Html::from_html_unchecked(AttrValue::from(props.markup.clone()))
}
