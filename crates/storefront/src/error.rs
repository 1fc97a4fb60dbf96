//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server errors to Sentry
//! before responding to the client. All route handlers return
//! `Result<T, AppError>`; bodies are JSON of the form `{"error": "..."}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use refit_core::quote::QuoteError;
use refit_core::wizard::WizardError;
use refit_shipping::ShippingError;

use crate::db::RepositoryError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Shipping provider operation failed.
    #[error("Shipping error: {0}")]
    Shipping(#[from] ShippingError),

    /// Quote request failed validation or lookup.
    #[error("Quote error: {0}")]
    Quote(#[from] QuoteError),

    /// Wizard action attempted from the wrong step.
    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(
            self,
            Self::Database(_) | Self::Internal(_) | Self::Session(_) | Self::Shipping(_)
        ) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Session(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Shipping(_) => StatusCode::BAD_GATEWAY,
            Self::Quote(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Wizard(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) | Self::Session(_) => {
                "Internal server error".to_string()
            }
            Self::Shipping(err) => match err {
                ShippingError::NoRates => err.to_string(),
                _ => "Shipping provider error".to_string(),
            },
            Self::Quote(err) => err.to_string(),
            Self::Wizard(err) => err.to_string(),
            Self::NotFound(msg) => format!("Not found: {msg}"),
            Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use refit_core::wizard::WizardStep;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("iphone-99".to_string());
        assert_eq!(err.to_string(), "Not found: iphone-99");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(AppError::Quote(QuoteError::UnknownModel(
                "pixel-99".to_string()
            ))),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Wizard(WizardError {
                step: WizardStep::DeviceInfo,
                action: "accept the quote",
            })),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::Shipping(ShippingError::NoRates)),
            StatusCode::BAD_GATEWAY
        );
    }
}
