pub mod converters;
pub mod forecasting;
