//! Custom error types for the API service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Custom error type for the API service
#[derive(Error, Debug)]
pub enum ApiError {
    /// Missing or malformed bearer credential
    #[error("Authorization required")]
    Unauthorized,

    /// Bearer token failed signature or expiry verification
    #[error("Invalid token")]
    InvalidToken,

    /// Invalid request payload
    #[error("{0}")]
    Validation(String),

    /// A currency-specific required field was absent
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Currency code outside the supported set
    #[error("Unsupported currency: {0}")]
    UnsupportedCurrency(String),

    /// Requested debit exceeds the stored balance
    #[error("Insufficient balance")]
    InsufficientBalance,

    /// Referenced entity absent
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Operation conflicts with current entity state
    #[error("{0}")]
    Conflict(String),

    /// Non-success response from an external service, body attached
    #[error("Upstream error ({status}): {body}")]
    Upstream { status: u16, body: String },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] common::error::DatabaseError),

    /// Internal server error
    #[error("Internal server error")]
    InternalServerError,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            ApiError::Validation(_)
            | ApiError::MissingField(_)
            | ApiError::UnsupportedCurrency(_)
            | ApiError::InsufficientBalance => (StatusCode::BAD_REQUEST, self.to_string()),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            ApiError::Upstream { .. } => (StatusCode::BAD_GATEWAY, self.to_string()),
            // Internal detail stays out of the response body.
            ApiError::Database(_) | ApiError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Type alias for API results
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(ApiError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ApiError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ApiError::MissingField("account_bank")),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::UnsupportedCurrency("BTC".into())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(ApiError::InsufficientBalance),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ApiError::NotFound("User")), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(ApiError::Conflict("Transaction already completed".into())),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_of(ApiError::Upstream {
                status: 400,
                body: "declined".into()
            }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            status_of(ApiError::InternalServerError),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_detail_not_leaked() {
        let message = ApiError::InternalServerError.to_string();
        assert_eq!(message, "Internal server error");
    }
}
