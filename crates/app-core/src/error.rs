//! The central error type for the application.
//!
//! Every handler returns `Result<_, AppError>`; the `IntoResponse`
//! implementation maps each variant to its wire status and JSON body.
//! Upstream identity-provider failures and account-store violations are
//! logged with full detail server-side but reported to the client as a
//! generic "Authentication failed" so nothing internal leaks.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use validator::ValidationErrors;

use crate::config::ConfigError;
use crate::oauth::OAuthError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),

    #[error("Invalid request format: {0}")]
    RequestFormat(String),

    #[error("Unsupported OAuth provider")]
    UnsupportedProvider,

    #[error("Invalid state parameter")]
    InvalidState,

    #[error("OAuth error: {0}")]
    ProviderError(String),

    #[error("Authorization code not provided")]
    MissingCode,

    #[error("Failed to obtain access token")]
    TokenIncomplete,

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("OAuth flow failed")]
    OAuth(#[from] OAuthError),

    #[error("Account reconciliation failed: {0}")]
    Account(String),

    #[error("Configuration error")]
    Config(#[from] ConfigError),

    #[error("An internal server error occurred")]
    Internal,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            AppError::Validation(err) => {
                let details = json!(err.field_errors());
                (StatusCode::BAD_REQUEST, "Invalid request data".to_string(), Some(details))
            },

            AppError::RequestFormat(msg) => (StatusCode::BAD_REQUEST, msg, None),

            AppError::UnsupportedProvider
            | AppError::InvalidState
            | AppError::MissingCode
            | AppError::TokenIncomplete => (StatusCode::BAD_REQUEST, self.to_string(), None),

            AppError::ProviderError(_) => (StatusCode::BAD_REQUEST, self.to_string(), None),

            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg, None),

            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg, None),

            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None),

            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg, None),

            AppError::OAuth(err) => {
                tracing::error!("OAuth callback error: {err:?}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed".to_string(), None)
            },

            AppError::Account(msg) => {
                tracing::error!("Account reconciliation error: {msg}");
                (StatusCode::INTERNAL_SERVER_ERROR, "Authentication failed".to_string(), None)
            },

            AppError::Config(err) => {
                tracing::error!("Configuration error: {err:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred".to_string(),
                    None,
                )
            },

            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An internal server error occurred".to_string(),
                None,
            ),
        };

        (status, Json(ErrorResponse { error, details })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_messages_are_stable() {
        assert_eq!(AppError::UnsupportedProvider.to_string(), "Unsupported OAuth provider");
        assert_eq!(AppError::InvalidState.to_string(), "Invalid state parameter");
        assert_eq!(AppError::MissingCode.to_string(), "Authorization code not provided");
        assert_eq!(AppError::TokenIncomplete.to_string(), "Failed to obtain access token");
        assert_eq!(
            AppError::ProviderError("access_denied".to_string()).to_string(),
            "OAuth error: access_denied"
        );
    }

    #[test]
    fn status_mapping() {
        assert_eq!(
            AppError::UnsupportedProvider.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("nope".to_string()).into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Conflict("overlap".to_string()).into_response().status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Account("duplicate google_id".to_string()).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
