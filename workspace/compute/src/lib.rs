pub mod error;
pub mod event_window;
pub mod forecast;
pub mod frame;

use common::PriceHistory;
use polars::prelude::DataFrame;
use tracing::{info, instrument};

use error::Result;
use forecast::{FittedModel, ForecastConfig, Forecaster, Horizon};

/// Returns the forecaster used by the dashboard: default priors with the
/// daily component forced on.
pub fn default_forecaster() -> Forecaster {
    Forecaster::new(ForecastConfig::default().with_daily_seasonality())
}

/// Output of one forecast stage run.
#[derive(Debug, Clone)]
pub struct ForecastRun {
    /// The fitted model, kept for component profiles
    pub model: FittedModel,
    /// Forecast over the history plus the horizon
    pub forecast: DataFrame,
}

/// Fits a fresh model to the closing prices of `history` and forecasts
/// `horizon.periods()` days past its end.
#[instrument(skip(history, forecaster), fields(label = %history.label, rows = history.len()))]
pub fn run_forecast(
    history: &PriceHistory,
    horizon: Horizon,
    forecaster: &Forecaster,
) -> Result<ForecastRun> {
    let training = frame::training_frame(history)?;
    let model = forecaster.fit(&training)?;
    let future = model.make_future_dataframe(horizon.periods(), true)?;
    let forecast = model.predict(&future)?;

    info!(
        history_rows = model.history_rows(),
        forecast_rows = forecast.height(),
        years = horizon.years(),
        "Forecast stage finished"
    );
    Ok(ForecastRun { model, forecast })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Days, NaiveDate, Weekday};
    use common::PricePoint;
    use frame::{date_column, f64_column};

    /// Roughly six years of weekday closes with drift and a yearly swing.
    fn history() -> PriceHistory {
        let start = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
        let points = (0..2200u64)
            .map(|d| start + Days::new(d))
            .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .enumerate()
            .map(|(i, date)| {
                let close = 1000.0 + 0.4 * i as f64 + 30.0 * (date.ordinal() as f64 / 58.1).sin();
                PricePoint {
                    date,
                    open: close - 2.0,
                    high: close + 5.0,
                    low: close - 5.0,
                    close,
                    adj_close: Some(close),
                    volume: 1_000,
                }
            })
            .collect();
        PriceHistory::new("TCS", "TCS.NS", points)
    }

    #[test]
    fn test_forecast_rows_for_every_horizon() {
        let history = history();
        let forecaster = default_forecaster();

        for years in 1..=4 {
            let run = run_forecast(&history, Horizon::new(years).unwrap(), &forecaster).unwrap();
            assert_eq!(run.forecast.height(), history.len() + years as usize * 365);

            let dates = date_column(&run.forecast, "ds").unwrap();
            assert!(dates.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_one_year_forecast_ends_a_year_after_history() {
        let history = history();
        let run = run_forecast(&history, Horizon::new(1).unwrap(), &default_forecaster()).unwrap();

        let dates = date_column(&run.forecast, "ds").unwrap();
        let last = *dates.last().unwrap();
        assert_eq!(last, history.last_date().unwrap() + Days::new(365));

        for column in ["yhat", "yhat_lower", "yhat_upper"] {
            let values = f64_column(&run.forecast, column).unwrap();
            assert!(values.last().unwrap().is_finite());
        }
        assert_eq!(run.model.components(), vec!["yearly", "weekly", "daily"]);
    }

    #[test]
    fn test_forecast_columns() {
        let run = run_forecast(&history(), Horizon::default(), &default_forecaster()).unwrap();
        let names: Vec<&str> = run.forecast.get_column_names().iter().map(|c| c.as_str()).collect();

        assert_eq!(
            names,
            vec![
                "ds",
                "trend",
                "yhat_lower",
                "yhat_upper",
                "trend_lower",
                "trend_upper",
                "additive_terms",
                "yearly",
                "weekly",
                "daily",
                "yhat",
            ]
        );
    }
}
