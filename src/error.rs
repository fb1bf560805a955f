use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use compute::error::ComputeError;
use market::MarketError;
use thiserror::Error;
use tracing::{error, warn};

use crate::schemas::ErrorResponse;

/// Failure of a request, mapped to a status code and an `ErrorResponse` body.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Market(#[from] MarketError),

    #[error(transparent)]
    Compute(#[from] ComputeError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Market(MarketError::UnknownTicker(_)) => {
                (StatusCode::NOT_FOUND, "UNKNOWN_TICKER")
            }
            ApiError::Market(MarketError::EmptySeries { .. }) => {
                (StatusCode::BAD_GATEWAY, "EMPTY_SERIES")
            }
            ApiError::Market(MarketError::InvalidRange(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_RANGE")
            }
            ApiError::Market(_) => (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR"),
            ApiError::Compute(ComputeError::InvalidHorizon(_)) => {
                (StatusCode::BAD_REQUEST, "INVALID_HORIZON")
            }
            ApiError::Compute(ComputeError::InsufficientData(_)) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_DATA")
            }
            ApiError::Compute(_) => (StatusCode::INTERNAL_SERVER_ERROR, "COMPUTE_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!(err = ?self, code, "Request failed");
        } else {
            warn!(err = %self, code, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}
