/// Whether a seasonal component is fitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeasonalityMode {
    /// Decided from the span and spacing of the history
    #[default]
    Auto,
    Enabled,
    Disabled,
}

/// Model hyperparameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastConfig {
    /// Upper bound on trend changepoints
    pub n_changepoints: usize,
    /// Share of the history (by rows) where changepoints may be placed
    pub changepoint_range: f64,
    /// Prior scale of the trend rate changes; lower values give a stiffer trend
    pub changepoint_prior_scale: f64,
    /// Prior scale of the Fourier coefficients
    pub seasonality_prior_scale: f64,
    /// Coverage of the uncertainty interval
    pub interval_width: f64,
    pub yearly: SeasonalityMode,
    pub weekly: SeasonalityMode,
    pub daily: SeasonalityMode,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            n_changepoints: 25,
            changepoint_range: 0.8,
            changepoint_prior_scale: 0.05,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
            yearly: SeasonalityMode::Auto,
            weekly: SeasonalityMode::Auto,
            daily: SeasonalityMode::Auto,
        }
    }
}

impl ForecastConfig {
    /// Forces the daily component on regardless of data spacing.
    pub fn with_daily_seasonality(mut self) -> Self {
        self.daily = SeasonalityMode::Enabled;
        self
    }
}
