pub mod config;
pub mod features;
pub mod linalg;
pub mod model;

pub use config::{ForecastConfig, SeasonalityMode};
pub use model::{FittedModel, Forecaster};

use crate::error::{ComputeError, Result};

/// Number of forecast years, bounded to 1..=4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Horizon(u8);

impl Horizon {
    pub const MIN_YEARS: u8 = 1;
    pub const MAX_YEARS: u8 = 4;
    pub const DAYS_PER_YEAR: usize = 365;

    pub fn new(years: u8) -> Result<Self> {
        if (Self::MIN_YEARS..=Self::MAX_YEARS).contains(&years) {
            Ok(Self(years))
        } else {
            Err(ComputeError::InvalidHorizon(years))
        }
    }

    pub fn years(self) -> u8 {
        self.0
    }

    /// Number of future daily periods: `years * 365`.
    pub fn periods(self) -> usize {
        self.0 as usize * Self::DAYS_PER_YEAR
    }
}

impl Default for Horizon {
    fn default() -> Self {
        Self(Self::MIN_YEARS)
    }
}

impl TryFrom<u8> for Horizon {
    type Error = ComputeError;

    fn try_from(years: u8) -> Result<Self> {
        Self::new(years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_horizon_bounds() {
        assert!(matches!(Horizon::new(0), Err(ComputeError::InvalidHorizon(0))));
        assert!(matches!(Horizon::new(5), Err(ComputeError::InvalidHorizon(5))));
        for years in 1..=4 {
            let horizon = Horizon::try_from(years).unwrap();
            assert_eq!(horizon.years(), years);
            assert_eq!(horizon.periods(), years as usize * 365);
        }
        assert_eq!(Horizon::default().periods(), 365);
    }
}
