//! Unified error handling with Sentry integration.
//!
//! All admin handlers return `Result<T, AppError>`; bodies are JSON of the
//! form `{"error": "..."}`. Lifecycle violations (bad status transitions,
//! item edits on locked invoices) are client errors, never 500s.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use refit_core::types::InvoiceStatus;
use refit_shipping::ShippingError;

use crate::db::RepositoryError;

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Shipping provider operation failed.
    #[error("Shipping error: {0}")]
    Shipping(#[from] ShippingError),

    /// Status transition not allowed by the lifecycle table.
    #[error("cannot transition invoice from {from} to {to}")]
    InvalidTransition {
        from: InvoiceStatus,
        to: InvoiceStatus,
    },

    /// Items can only change while the invoice is a draft.
    #[error("invoice is {status}; items can only be edited on drafts")]
    ItemsLocked { status: InvoiceStatus },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or wrong bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request was well-formed but semantically invalid.
    #[error("Unprocessable: {0}")]
    Unprocessable(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if matches!(self, Self::Database(_) | Self::Internal(_) | Self::Shipping(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Shipping(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidTransition { .. } | Self::ItemsLocked { .. } => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Database(_) | Self::Internal(_) => "Internal server error".to_string(),
            Self::Shipping(err) => match err {
                ShippingError::NoRates => err.to_string(),
                _ => "Shipping provider error".to_string(),
            },
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_lifecycle_violations_are_conflicts() {
        assert_eq!(
            get_status(AppError::InvalidTransition {
                from: InvoiceStatus::Paid,
                to: InvoiceStatus::Draft,
            }),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(AppError::ItemsLocked {
                status: InvoiceStatus::Sent,
            }),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("invoice 7".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(AppError::Unauthorized), StatusCode::UNAUTHORIZED);
        assert_eq!(
            get_status(AppError::Unprocessable("no items".to_string())),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            get_status(AppError::Shipping(ShippingError::NoRates)),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_transition_message_names_both_statuses() {
        let err = AppError::InvalidTransition {
            from: InvoiceStatus::Sent,
            to: InvoiceStatus::Draft,
        };
        assert_eq!(err.to_string(), "cannot transition invoice from sent to draft");
    }
}
