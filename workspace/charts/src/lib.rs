//! Declarative plotly figures for the dashboard and the HTML page that hosts
//! them.

pub mod event;
pub mod forecast;
pub mod page;
pub mod prices;

pub use event::event_window_chart;
pub use forecast::{components_chart, forecast_chart};
pub use page::{render_dashboard, DashboardPage, DashboardProps};
pub use prices::raw_price_chart;

use chrono::NaiveDate;
use plotly::Plot;

/// plotly.js bundle matching the figure schema of the `plotly` crate.
pub const PLOTLY_JS_URL: &str = "https://cdn.plot.ly/plotly-2.12.1.min.js";

/// Figure as plotly.js JSON (`data`, `layout`, `config`).
pub fn figure_json(plot: &Plot) -> serde_json::Value {
    serde_json::from_str(&plot.to_json()).unwrap_or(serde_json::Value::Null)
}

pub(crate) fn iso_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Vec<String> {
    dates
        .into_iter()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .collect()
}
