use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One row of the forecast table.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ForecastPoint {
    /// Date of the estimate
    pub ds: NaiveDate,
    /// Trend component
    pub trend: f64,
    pub trend_lower: f64,
    pub trend_upper: f64,
    /// Central estimate
    pub yhat: f64,
    /// Lower bound of the uncertainty interval
    pub yhat_lower: f64,
    /// Upper bound of the uncertainty interval
    pub yhat_upper: f64,
    /// Sum of all seasonal components
    pub additive_terms: f64,
    /// Yearly seasonal component, when the model fitted one
    pub yearly: Option<f64>,
    /// Weekly seasonal component, when the model fitted one
    pub weekly: Option<f64>,
    /// Daily seasonal component, when the model fitted one
    pub daily: Option<f64>,
}

/// Forecast over the historical range plus the requested horizon.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct ForecastTable {
    /// Catalog label the forecast was computed for
    pub label: String,
    /// Horizon in years
    pub horizon_years: u8,
    /// Number of rows that belong to the historical range
    pub history_rows: usize,
    /// Names of the seasonal components present in the rows
    pub components: Vec<String>,
    /// Forecast rows ordered by date
    pub rows: Vec<ForecastPoint>,
}

impl ForecastTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows beyond the historical range.
    pub fn future_rows(&self) -> usize {
        self.rows.len().saturating_sub(self.history_rows)
    }

    pub fn last(&self) -> Option<&ForecastPoint> {
        self.rows.last()
    }

    /// Copy of this table keeping only the last `n` rows.
    pub fn tail(&self, n: usize) -> Self {
        Self {
            label: self.label.clone(),
            horizon_years: self.horizon_years,
            history_rows: self.history_rows.min(n.saturating_sub(self.future_rows())),
            components: self.components.clone(),
            rows: crate::tail(&self.rows, n),
        }
    }
}

/// One seasonal component evaluated over a single period, used by the
/// decomposition chart.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct SeasonalProfile {
    /// Component name (`yearly`, `weekly` or `daily`)
    pub name: String,
    /// Label of the x axis ("Day of week", ...)
    pub axis_title: String,
    /// Positions along one period ("Sunday", "Jan 01", "06:00", ...)
    pub x: Vec<String>,
    /// Component value at each position
    pub y: Vec<f64>,
}
