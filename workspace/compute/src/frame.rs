//! Conversions between price histories and polars frames.

use chrono::{NaiveDate, TimeDelta};
use common::PriceHistory;
use polars::prelude::*;

use crate::error::{ComputeError, Result};

/// Projects a price history onto the two-column training frame `ds`, `y`
/// (date and close).
pub fn training_frame(history: &PriceHistory) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new("ds".into(), history.dates()).into(),
        Series::new("y".into(), history.closes()).into(),
    ])?;
    Ok(df)
}

pub(crate) fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Reads a Date column. Nulls are rejected.
pub fn date_column(df: &DataFrame, name: &str) -> Result<Vec<NaiveDate>> {
    let physical = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Int32)?;
    let epoch = unix_epoch();

    physical
        .i32()?
        .into_iter()
        .map(|days| {
            let days = days
                .ok_or_else(|| ComputeError::Date(format!("null date in column {}", name)))?;
            epoch
                .checked_add_signed(TimeDelta::days(days as i64))
                .ok_or_else(|| ComputeError::Date(format!("date out of range: {} days", days)))
        })
        .collect()
}

/// Reads a numeric column as f64. Nulls are rejected.
pub fn f64_column(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let values = df
        .column(name)?
        .as_materialized_series()
        .cast(&DataType::Float64)?;

    values
        .f64()?
        .into_iter()
        .map(|v| v.ok_or_else(|| ComputeError::Series(format!("null value in column {}", name))))
        .collect()
}

/// Reads a numeric column if the frame has it.
pub fn optional_f64_column(df: &DataFrame, name: &str) -> Result<Option<Vec<f64>>> {
    if df.get_column_index(name).is_none() {
        return Ok(None);
    }
    f64_column(df, name).map(Some)
}
