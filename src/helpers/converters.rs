use common::{ForecastPoint, ForecastTable};
use compute::frame::{date_column, f64_column, optional_f64_column};
use polars::prelude::DataFrame;

/// Helper function to convert a forecast DataFrame to a ForecastTable
pub fn convert_dataframe_to_forecast(
    df: &DataFrame,
    label: &str,
    horizon_years: u8,
    history_rows: usize,
) -> Result<ForecastTable, String> {
    let ds = date_column(df, "ds").map_err(|e| format!("Missing ds column: {}", e))?;
    let required = |name: &str| {
        f64_column(df, name).map_err(|e| format!("Missing {} column: {}", name, e))
    };

    let trend = required("trend")?;
    let trend_lower = required("trend_lower")?;
    let trend_upper = required("trend_upper")?;
    let yhat = required("yhat")?;
    let yhat_lower = required("yhat_lower")?;
    let yhat_upper = required("yhat_upper")?;
    let additive_terms = required("additive_terms")?;

    let optional = |name: &str| {
        optional_f64_column(df, name).map_err(|e| format!("Error reading {} column: {}", name, e))
    };
    let yearly = optional("yearly")?;
    let weekly = optional("weekly")?;
    let daily = optional("daily")?;

    let components = [("yearly", &yearly), ("weekly", &weekly), ("daily", &daily)]
        .iter()
        .filter(|(_, column)| column.is_some())
        .map(|(name, _)| name.to_string())
        .collect();

    let at = |column: &Option<Vec<f64>>, i: usize| {
        column.as_ref().and_then(|values| values.get(i).copied())
    };

    let mut rows = Vec::with_capacity(df.height());
    for (i, date) in ds.into_iter().enumerate() {
        rows.push(ForecastPoint {
            ds: date,
            trend: trend[i],
            trend_lower: trend_lower[i],
            trend_upper: trend_upper[i],
            yhat: yhat[i],
            yhat_lower: yhat_lower[i],
            yhat_upper: yhat_upper[i],
            additive_terms: additive_terms[i],
            yearly: at(&yearly, i),
            weekly: at(&weekly, i),
            daily: at(&daily, i),
        });
    }

    Ok(ForecastTable {
        label: label.to_string(),
        horizon_years,
        history_rows: history_rows.min(rows.len()),
        components,
        rows,
    })
}
