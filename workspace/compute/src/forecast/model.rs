use chrono::{Days, NaiveDate};
use common::SeasonalProfile;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::{debug, info, instrument};

use super::config::ForecastConfig;
use super::features::{active_seasonalities, changepoints, days_since_epoch, Design};
use super::linalg::{normal_quantile, ridge_solve};
use crate::error::{ComputeError, Result};
use crate::frame::{date_column, f64_column};

/// Additive trend + seasonality model.
///
/// `y(t) = trend(t) + sum(seasonal_i(t))` where the trend is piecewise linear
/// with fixed changepoints and each seasonal term is a Fourier series. The
/// coefficients are the MAP estimate under Gaussian priors, which reduces to
/// a ridge regression.
#[derive(Debug, Clone, Default)]
pub struct Forecaster {
    config: ForecastConfig,
}

impl Forecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Fits the model to a training frame with a Date column `ds` and a
    /// numeric column `y`. Dates must be strictly increasing.
    #[instrument(skip(self, training), fields(rows = training.height()))]
    pub fn fit(&self, training: &DataFrame) -> Result<FittedModel> {
        let dates = date_column(training, "ds")?;
        let y = f64_column(training, "y")?;

        if dates.len() < 2 {
            return Err(ComputeError::InsufficientData(format!(
                "at least 2 rows are required, got {}",
                dates.len()
            )));
        }
        if dates.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ComputeError::InsufficientData(
                "ds must be strictly increasing".to_string(),
            ));
        }
        if y.iter().any(|v| !v.is_finite()) {
            return Err(ComputeError::InsufficientData(
                "y contains non-finite values".to_string(),
            ));
        }

        let x: Vec<f64> = dates.iter().map(days_since_epoch).collect();
        let start = x[0];
        let span = x[x.len() - 1] - start;
        let t: Vec<f64> = x.iter().map(|v| (v - start) / span).collect();

        let y_scale = y.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        let y_scale = if y_scale > 0.0 { y_scale } else { 1.0 };
        let ys = Array1::from_iter(y.iter().map(|v| v / y_scale));

        let design = Design {
            changepoints: changepoints(
                &t,
                self.config.n_changepoints,
                self.config.changepoint_range,
            ),
            seasonalities: active_seasonalities(&self.config, &x),
        };
        let n = t.len();
        let p = design.width();
        debug!(
            changepoints = design.changepoints.len(),
            seasonalities = ?design.seasonalities.iter().map(|s| s.name).collect::<Vec<_>>(),
            columns = p,
            "Design matrix layout"
        );

        let flat: Vec<f64> = t
            .iter()
            .zip(x.iter())
            .flat_map(|(t, x)| design.row(*t, *x))
            .collect();
        let matrix = Array2::from_shape_vec((n, p), flat)
            .map_err(|e| ComputeError::Numerical(format!("design matrix: {}", e)))?;

        // Prior variances are relative to the noise level of a straight-line fit.
        let noise = linear_residual_variance(&t, &ys).max(1e-6);
        let mut penalty = Array1::<f64>::zeros(p);
        penalty[1] = noise / 25.0;
        let cp_penalty = noise / self.config.changepoint_prior_scale.powi(2);
        let season_penalty = noise / self.config.seasonality_prior_scale.powi(2);
        for i in 2..p {
            penalty[i] = if i < 2 + design.changepoints.len() {
                cp_penalty
            } else {
                season_penalty
            };
        }

        let beta = ridge_solve(&matrix, &ys, &penalty)?;

        let residuals = &ys - &matrix.dot(&beta);
        let ssr = residuals.mapv(|r| r * r).sum();
        let sigma = (ssr / (n as f64 - p as f64).max(1.0)).sqrt();

        let n_cp = design.changepoints.len();
        let delta_scale = if n_cp > 0 {
            beta.slice(ndarray::s![2..2 + n_cp]).mapv(f64::abs).mean().unwrap_or(0.0) + 1e-8
        } else {
            0.0
        };

        let z = normal_quantile(0.5 + self.config.interval_width / 2.0);

        info!(rows = n, sigma = sigma * y_scale, "Forecast model fitted");

        Ok(FittedModel {
            start,
            span,
            y_scale,
            design,
            beta,
            sigma,
            changepoint_rate: n_cp as f64,
            delta_scale,
            z,
            history_dates: dates,
        })
    }
}

/// Mean squared residual of an ordinary least squares line through `(t, y)`.
fn linear_residual_variance(t: &[f64], y: &Array1<f64>) -> f64 {
    let n = t.len() as f64;
    let t_mean = t.iter().sum::<f64>() / n;
    let y_mean = y.sum() / n;
    let (mut cov, mut var) = (0.0, 0.0);
    for (ti, yi) in t.iter().zip(y.iter()) {
        cov += (ti - t_mean) * (yi - y_mean);
        var += (ti - t_mean).powi(2);
    }
    let slope = if var > 0.0 { cov / var } else { 0.0 };
    let intercept = y_mean - slope * t_mean;
    t.iter()
        .zip(y.iter())
        .map(|(ti, yi)| (yi - intercept - slope * ti).powi(2))
        .sum::<f64>()
        / n
}

/// Component values for a set of dates, in the original `y` units.
struct Prediction {
    trend: Vec<f64>,
    trend_sd: Vec<f64>,
    seasonal: Vec<Vec<f64>>,
}

/// A fitted model, able to forecast any date.
#[derive(Debug, Clone)]
pub struct FittedModel {
    /// First history date, in days since epoch
    start: f64,
    /// History span in days
    span: f64,
    y_scale: f64,
    design: Design,
    beta: Array1<f64>,
    /// Observation noise in scaled units
    sigma: f64,
    /// Expected changepoints per unit of scaled time
    changepoint_rate: f64,
    /// Laplace scale of future rate changes
    delta_scale: f64,
    z: f64,
    history_dates: Vec<NaiveDate>,
}

impl FittedModel {
    pub fn history_rows(&self) -> usize {
        self.history_dates.len()
    }

    pub fn last_history_date(&self) -> Option<NaiveDate> {
        self.history_dates.last().copied()
    }

    /// Names of the fitted seasonal components.
    pub fn components(&self) -> Vec<&'static str> {
        self.design.seasonalities.iter().map(|s| s.name).collect()
    }

    /// Date frame with `periods` consecutive days after the last history
    /// date, preceded by the history dates when `include_history` is set.
    pub fn make_future_dataframe(
        &self,
        periods: usize,
        include_history: bool,
    ) -> Result<DataFrame> {
        let last = self
            .last_history_date()
            .ok_or_else(|| ComputeError::InsufficientData("model has no history".to_string()))?;

        let mut dates = if include_history {
            self.history_dates.clone()
        } else {
            Vec::with_capacity(periods)
        };
        for day in 1..=periods as u64 {
            let date = last
                .checked_add_days(Days::new(day))
                .ok_or_else(|| ComputeError::Date(format!("{} + {} days overflows", last, day)))?;
            dates.push(date);
        }

        let df = DataFrame::new(vec![Series::new("ds".into(), dates).into()])?;
        Ok(df)
    }

    /// Forecast for every date in the `ds` column of `future`.
    ///
    /// Output columns: `ds`, `trend`, `yhat_lower`, `yhat_upper`,
    /// `trend_lower`, `trend_upper`, `additive_terms`, one column per fitted
    /// seasonality, `yhat`.
    #[instrument(skip(self, future), fields(rows = future.height()))]
    pub fn predict(&self, future: &DataFrame) -> Result<DataFrame> {
        let dates = date_column(future, "ds")?;
        let x: Vec<f64> = dates.iter().map(days_since_epoch).collect();
        let prediction = self.evaluate(&x);

        let n = dates.len();
        let mut additive = vec![0.0; n];
        for component in &prediction.seasonal {
            for (total, value) in additive.iter_mut().zip(component) {
                *total += value;
            }
        }

        let obs_sd = self.sigma * self.y_scale;
        let mut yhat = Vec::with_capacity(n);
        let mut yhat_lower = Vec::with_capacity(n);
        let mut yhat_upper = Vec::with_capacity(n);
        let mut trend_lower = Vec::with_capacity(n);
        let mut trend_upper = Vec::with_capacity(n);
        for i in 0..n {
            let center = prediction.trend[i] + additive[i];
            let trend_sd = prediction.trend_sd[i];
            let total_sd = (obs_sd * obs_sd + trend_sd * trend_sd).sqrt();
            yhat.push(center);
            yhat_lower.push(center - self.z * total_sd);
            yhat_upper.push(center + self.z * total_sd);
            trend_lower.push(prediction.trend[i] - self.z * trend_sd);
            trend_upper.push(prediction.trend[i] + self.z * trend_sd);
        }

        let mut columns: Vec<Column> = vec![
            Series::new("ds".into(), dates).into(),
            Series::new("trend".into(), prediction.trend).into(),
            Series::new("yhat_lower".into(), yhat_lower).into(),
            Series::new("yhat_upper".into(), yhat_upper).into(),
            Series::new("trend_lower".into(), trend_lower).into(),
            Series::new("trend_upper".into(), trend_upper).into(),
            Series::new("additive_terms".into(), additive).into(),
        ];
        for (seasonality, values) in self.design.seasonalities.iter().zip(prediction.seasonal) {
            columns.push(Series::new(seasonality.name.into(), values).into());
        }
        columns.push(Series::new("yhat".into(), yhat).into());

        let df = DataFrame::new(columns)?;
        debug!(rows = df.height(), columns = df.width(), "Forecast computed");
        Ok(df)
    }

    fn evaluate(&self, x: &[f64]) -> Prediction {
        let mut trend = Vec::with_capacity(x.len());
        let mut trend_sd = Vec::with_capacity(x.len());

        for &xi in x {
            let t = (xi - self.start) / self.span;
            let mut value = self.beta[0] + self.beta[1] * t;
            for (j, cp) in self.design.changepoints.iter().enumerate() {
                value += self.beta[2 + j] * (t - cp).max(0.0);
            }
            trend.push(value * self.y_scale);
            trend_sd.push(self.future_trend_sd(t) * self.y_scale);
        }

        let seasonal = (0..self.design.seasonalities.len())
            .map(|index| x.iter().map(|&xi| self.seasonal_value(index, xi)).collect())
            .collect();

        Prediction {
            trend,
            trend_sd,
            seasonal,
        }
    }

    /// Standard deviation of the trend at scaled time `t` caused by future
    /// rate changes. Changepoints arrive at the historical rate with Laplace
    /// magnitudes, so the variance grows with the cube of the distance past
    /// the history.
    fn future_trend_sd(&self, t: f64) -> f64 {
        let h = t - 1.0;
        if h <= 0.0 {
            return 0.0;
        }
        let laplace_variance = 2.0 * self.delta_scale * self.delta_scale;
        (self.changepoint_rate * laplace_variance * h.powi(3) / 3.0).sqrt()
    }

    fn seasonal_value(&self, index: usize, x: f64) -> f64 {
        let seasonality = &self.design.seasonalities[index];
        let offset = self.design.seasonal_offset(index);
        let mut terms = Vec::with_capacity(seasonality.width());
        seasonality.push_terms(x, &mut terms);
        terms
            .iter()
            .enumerate()
            .map(|(k, term)| term * self.beta[offset + k])
            .sum::<f64>()
            * self.y_scale
    }

    /// Each fitted seasonal component over one full period: yearly over a
    /// calendar year, weekly from Sunday to Saturday, daily over 24 hours in
    /// 15 minute steps.
    pub fn seasonal_profiles(&self) -> Vec<SeasonalProfile> {
        // 2017-01-01 was a Sunday.
        let anchor = NaiveDate::from_ymd_opt(2017, 1, 1).unwrap_or_default();

        self.design
            .seasonalities
            .iter()
            .enumerate()
            .map(|(index, seasonality)| {
                let (axis_title, x_labels, positions) = profile_axis(seasonality.name, anchor);

                SeasonalProfile {
                    name: seasonality.name.to_string(),
                    axis_title: axis_title.to_string(),
                    x: x_labels,
                    y: positions.iter().map(|&x| self.seasonal_value(index, x)).collect(),
                }
            })
            .collect()
    }
}

/// Axis title, tick labels and model positions covering one period of a
/// seasonality, starting at `anchor`.
fn profile_axis(name: &str, anchor: NaiveDate) -> (&'static str, Vec<String>, Vec<f64>) {
    match name {
        "weekly" => {
            let days: Vec<NaiveDate> = anchor.iter_days().take(7).collect();
            (
                "Day of week",
                days.iter().map(|d| d.format("%A").to_string()).collect(),
                days.iter().map(days_since_epoch).collect(),
            )
        }
        "yearly" => {
            let days: Vec<NaiveDate> = anchor.iter_days().take(365).collect();
            (
                "Day of year",
                days.iter().map(|d| d.format("%b %d").to_string()).collect(),
                days.iter().map(days_since_epoch).collect(),
            )
        }
        _ => {
            let steps = 96;
            let anchor_x = days_since_epoch(&anchor);
            (
                "Hour of day",
                (0..steps)
                    .map(|i| format!("{:02}:{:02}", i / 4, (i % 4) * 15))
                    .collect(),
                (0..steps).map(|i| anchor_x + i as f64 / steps as f64).collect(),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::config::SeasonalityMode;
    use chrono::Datelike;

    fn frame(dates: Vec<NaiveDate>, y: Vec<f64>) -> DataFrame {
        DataFrame::new(vec![
            Series::new("ds".into(), dates).into(),
            Series::new("y".into(), y).into(),
        ])
        .unwrap()
    }

    fn linear_history(days: u64) -> DataFrame {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..days).map(|d| start + Days::new(d)).collect();
        let y: Vec<f64> = (0..days).map(|d| 100.0 + 0.5 * d as f64).collect();
        frame(dates, y)
    }

    #[test]
    fn test_fit_rejects_short_history() {
        let df = frame(vec![NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()], vec![1.0]);
        assert!(matches!(
            Forecaster::default().fit(&df),
            Err(ComputeError::InsufficientData(_))
        ));
    }

    #[test]
    fn test_fit_rejects_unsorted_dates() {
        let df = frame(
            vec![
                NaiveDate::from_ymd_opt(2020, 1, 2).unwrap(),
                NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            ],
            vec![1.0, 2.0],
        );
        assert!(Forecaster::default().fit(&df).is_err());
    }

    #[test]
    fn test_linear_trend_is_extrapolated() {
        let model = Forecaster::default().fit(&linear_history(200)).unwrap();
        let future = model.make_future_dataframe(30, false).unwrap();
        let forecast = model.predict(&future).unwrap();

        let yhat = f64_column(&forecast, "yhat").unwrap();
        // day 229 after start
        let expected = 100.0 + 0.5 * 229.0;
        assert!((yhat[29] - expected).abs() < 1.0, "yhat {} expected {}", yhat[29], expected);
    }

    #[test]
    fn test_future_dataframe_extends_history() {
        let model = Forecaster::default().fit(&linear_history(50)).unwrap();
        let df = model.make_future_dataframe(365, true).unwrap();
        let dates = date_column(&df, "ds").unwrap();

        assert_eq!(dates.len(), 50 + 365);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
        let last = model.last_history_date().unwrap();
        assert_eq!(dates[dates.len() - 1], last + Days::new(365));
        assert!(dates[50..].windows(2).all(|w| w[1] - w[0] == chrono::TimeDelta::days(1)));
    }

    #[test]
    fn test_interval_widens_with_horizon() {
        // noisy zig-zag with a break in slope so changepoints carry weight
        let start = NaiveDate::from_ymd_opt(2019, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..400).map(|d| start + Days::new(d)).collect();
        let y: Vec<f64> = (0..400)
            .map(|d| {
                let base = if d < 200 { d as f64 } else { 200.0 + 3.0 * (d - 200) as f64 };
                base + if d % 2 == 0 { 5.0 } else { -5.0 }
            })
            .collect();
        let model = Forecaster::default().fit(&frame(dates, y)).unwrap();
        let forecast = model.predict(&model.make_future_dataframe(365, true).unwrap()).unwrap();

        let lower = f64_column(&forecast, "yhat_lower").unwrap();
        let upper = f64_column(&forecast, "yhat_upper").unwrap();
        let yhat = f64_column(&forecast, "yhat").unwrap();
        let trend_lower = f64_column(&forecast, "trend_lower").unwrap();
        let trend = f64_column(&forecast, "trend").unwrap();

        for i in 0..yhat.len() {
            assert!(lower[i] <= yhat[i] && yhat[i] <= upper[i]);
        }
        let near = upper[400] - lower[400];
        let far = upper[yhat.len() - 1] - lower[yhat.len() - 1];
        assert!(far > near);
        // no trend uncertainty inside the history
        assert_eq!(trend_lower[10], trend[10]);
    }

    #[test]
    fn test_components_sum_to_yhat() {
        let config = ForecastConfig::default().with_daily_seasonality();
        let start = NaiveDate::from_ymd_opt(2018, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..900)
            .map(|d| start + Days::new(d))
            .filter(|d| d.weekday().number_from_monday() <= 5)
            .collect();
        let y: Vec<f64> = dates
            .iter()
            .map(|d| {
                let weekday = d.weekday().number_from_monday() as f64;
                50.0 + (d.ordinal() as f64 / 58.0).sin() * 3.0 + weekday * 0.2
            })
            .collect();

        let model = Forecaster::new(config).fit(&frame(dates, y)).unwrap();
        assert_eq!(model.components(), vec!["yearly", "weekly", "daily"]);

        let forecast = model.predict(&model.make_future_dataframe(10, true).unwrap()).unwrap();
        let yhat = f64_column(&forecast, "yhat").unwrap();
        let trend = f64_column(&forecast, "trend").unwrap();
        let additive = f64_column(&forecast, "additive_terms").unwrap();
        let yearly = f64_column(&forecast, "yearly").unwrap();
        let weekly = f64_column(&forecast, "weekly").unwrap();
        let daily = f64_column(&forecast, "daily").unwrap();

        for i in 0..yhat.len() {
            assert!((yhat[i] - trend[i] - additive[i]).abs() < 1e-9);
            assert!((additive[i] - yearly[i] - weekly[i] - daily[i]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_seasonal_profiles() {
        let mut config = ForecastConfig::default().with_daily_seasonality();
        config.yearly = SeasonalityMode::Enabled;
        let model = Forecaster::new(config).fit(&linear_history(60)).unwrap();

        let profiles = model.seasonal_profiles();
        let names: Vec<&str> = profiles.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["yearly", "weekly", "daily"]);

        assert_eq!(profiles[0].x.len(), 365);
        assert_eq!(profiles[0].x[0], "Jan 01");
        let week = ["Sunday", "Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday"];
        assert_eq!(profiles[1].x, week);
        assert_eq!(profiles[2].x.len(), 96);
        assert_eq!(profiles[2].x[95], "23:45");
        assert!(profiles.iter().all(|p| p.x.len() == p.y.len()));
    }

    #[test]
    fn test_changepoint_dates_inside_history() {
        let model = Forecaster::default().fit(&linear_history(200)).unwrap();
        let first = model.history_dates[0];
        let dates: Vec<NaiveDate> = model
            .design
            .changepoints
            .iter()
            .filter_map(|cp| first.checked_add_days(Days::new((cp * model.span).floor() as u64)))
            .collect();

        assert_eq!(dates.len(), 25);
        let first = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(dates.iter().all(|d| *d > first && *d < first + Days::new(160)));
    }
}
