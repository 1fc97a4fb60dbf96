//! Shipping service errors.

use thiserror::Error;

/// Errors that can occur when talking to a shipping provider.
#[derive(Debug, Error)]
pub enum ShippingError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The label transaction was declined.
    #[error("label purchase rejected: {0}")]
    LabelRejected(String),

    /// No usable rates came back for the shipment.
    #[error("no shipping rates available")]
    NoRates,

    /// Failed to parse a provider response.
    #[error("parse error: {0}")]
    Parse(String),
}
