//! Error types for ggcoded

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ggcode_core::BridgeError;
use serde::Serialize;
use thiserror::Error;

/// Gateway-level errors
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Server startup error
    #[error("Server error: {0}")]
    Server(String),

    /// Compiler library could not be brought up
    #[error("Compiler error: {0}")]
    Bridge(#[from] BridgeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// HTTP-level faults.
///
/// Compile and catalog failures are not faults: they travel in the
/// `{success: false, error}` body with status 200.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Request body could not be parsed
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Unsupported body type
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            ApiError::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "UNSUPPORTED_MEDIA_TYPE")
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(
            ApiError::BadRequest("test".to_string())
                .into_response()
                .status(),
            StatusCode::BAD_REQUEST
        );

        assert_eq!(
            ApiError::UnsupportedMediaType("text/xml".to_string())
                .into_response()
                .status(),
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
    }

    #[test]
    fn test_bridge_error_converts() {
        let err: GatewayError = BridgeError::unavailable("no library").into();
        assert!(err.to_string().starts_with("Compiler error:"));
    }
}
