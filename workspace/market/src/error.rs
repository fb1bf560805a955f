use thiserror::Error;
use tracing::error;

/// Error types for the market data module
#[derive(Error, Debug)]
pub enum MarketError {
    /// The label does not name one of the catalog tickers
    #[error("Unknown ticker: {0}")]
    UnknownTicker(String),

    /// Network level failure (connect, timeout, broken body)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The provider answered with a non-success HTTP status
    #[error("Provider returned status {status} for {symbol}")]
    Upstream { symbol: String, status: u16 },

    /// The provider answered but reported an error in the payload
    #[error("Provider error: {0}")]
    Provider(String),

    /// The provider payload could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The provider returned no usable rows
    #[error("No price data for {symbol}")]
    EmptySeries { symbol: String },

    /// Start date after end date
    #[error("Invalid date range: {0}")]
    InvalidRange(String),
}

impl MarketError {
    /// Whether a retry of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            MarketError::Transport(_) => true,
            MarketError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for MarketError {
    fn from(error: reqwest::Error) -> Self {
        let market_error = if error.is_decode() {
            MarketError::Decode(error.to_string())
        } else if error.is_timeout() {
            MarketError::Transport(format!("request timed out: {}", error))
        } else if error.is_connect() {
            MarketError::Transport(format!("connection failed: {}", error))
        } else {
            MarketError::Transport(error.to_string())
        };
        error!(err = ?market_error, "HTTP request to market data provider failed");
        market_error
    }
}

impl From<serde_json::Error> for MarketError {
    fn from(error: serde_json::Error) -> Self {
        let market_error = MarketError::Decode(error.to_string());
        error!(err = ?market_error, "Failed to decode market data payload");
        market_error
    }
}

/// Type alias for Result with MarketError
pub type Result<T> = std::result::Result<T, MarketError>;
