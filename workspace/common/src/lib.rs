//! Common transport-layer types shared between the market loader, the
//! forecasting stage, the chart builders and the HTTP handlers.
//! Every payload the API returns is defined here so that all crates agree on
//! one shape.

mod events;
mod forecast;
mod prices;

pub use events::{DateRange, EventWindow, HighPoint, HighlightWindow};
pub use forecast::{ForecastPoint, ForecastTable, SeasonalProfile};
pub use prices::{PriceHistory, PricePoint, TickerInfo};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Generic API response wrapper used by the backend and its clients.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success flag
    pub success: bool,
}

/// Returns the last `n` elements of a slice, or the whole slice when it is shorter.
pub fn tail<T: Clone>(items: &[T], n: usize) -> Vec<T> {
    let start = items.len().saturating_sub(n);
    items[start..].to_vec()
}
