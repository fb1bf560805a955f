use chrono::NaiveDate;
use std::f64::consts::PI;

use super::config::{ForecastConfig, SeasonalityMode};
use crate::frame::unix_epoch;

/// A Fourier-series seasonal component.
#[derive(Debug, Clone, PartialEq)]
pub struct Seasonality {
    pub name: &'static str,
    /// Period in days
    pub period: f64,
    /// Number of sine/cosine pairs
    pub order: usize,
}

impl Seasonality {
    pub fn yearly() -> Self {
        Self {
            name: "yearly",
            period: 365.25,
            order: 10,
        }
    }

    pub fn weekly() -> Self {
        Self {
            name: "weekly",
            period: 7.0,
            order: 3,
        }
    }

    pub fn daily() -> Self {
        Self {
            name: "daily",
            period: 1.0,
            order: 4,
        }
    }

    /// Number of design matrix columns.
    pub fn width(&self) -> usize {
        2 * self.order
    }

    /// Appends `sin, cos` for each harmonic at `x` days since the epoch.
    pub fn push_terms(&self, x: f64, out: &mut Vec<f64>) {
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * x / self.period;
            out.push(angle.sin());
            out.push(angle.cos());
        }
    }
}

pub fn days_since_epoch(date: &NaiveDate) -> f64 {
    (*date - unix_epoch()).num_days() as f64
}

/// Seasonalities to fit for a history at `x` (days since epoch, ascending).
pub fn active_seasonalities(config: &ForecastConfig, x: &[f64]) -> Vec<Seasonality> {
    let span = match (x.first(), x.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    };
    let min_spacing = x
        .windows(2)
        .map(|w| w[1] - w[0])
        .fold(f64::INFINITY, f64::min);

    let enabled = |mode: SeasonalityMode, auto: bool| match mode {
        SeasonalityMode::Enabled => true,
        SeasonalityMode::Disabled => false,
        SeasonalityMode::Auto => auto,
    };

    let mut active = Vec::new();
    if enabled(config.yearly, span >= 730.0) {
        active.push(Seasonality::yearly());
    }
    if enabled(config.weekly, span >= 14.0 && min_spacing < 7.0) {
        active.push(Seasonality::weekly());
    }
    if enabled(config.daily, span >= 2.0 && min_spacing < 1.0) {
        active.push(Seasonality::daily());
    }
    active
}

/// Changepoint locations in scaled time: evenly spaced row positions over the
/// first `range` share of the history, excluding the first row.
pub fn changepoints(t: &[f64], n_changepoints: usize, range: f64) -> Vec<f64> {
    let history = ((t.len() as f64) * range).floor() as usize;
    let count = n_changepoints.min(history.saturating_sub(1));
    if count == 0 {
        return Vec::new();
    }

    let last = (history - 1) as f64;
    (1..=count)
        .map(|i| {
            let index = (i as f64 * last / count as f64).round() as usize;
            t[index]
        })
        .collect()
}

/// Layout of the design matrix: intercept, slope, one column per changepoint,
/// then the Fourier terms of each seasonality in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Design {
    pub changepoints: Vec<f64>,
    pub seasonalities: Vec<Seasonality>,
}

impl Design {
    pub fn width(&self) -> usize {
        let seasonal: usize = self.seasonalities.iter().map(Seasonality::width).sum();
        2 + self.changepoints.len() + seasonal
    }

    /// First column of seasonality `index`.
    pub fn seasonal_offset(&self, index: usize) -> usize {
        2 + self.changepoints.len()
            + self.seasonalities[..index]
                .iter()
                .map(Seasonality::width)
                .sum::<usize>()
    }

    /// One design row at scaled time `t` and `x` days since epoch.
    pub fn row(&self, t: f64, x: f64) -> Vec<f64> {
        let mut row = Vec::with_capacity(self.width());
        row.push(1.0);
        row.push(t);
        row.extend(self.changepoints.iter().map(|s| (t - s).max(0.0)));
        for seasonality in &self.seasonalities {
            seasonality.push_terms(x, &mut row);
        }
        row
    }
}
