//! Database operations for admin `PostgreSQL`.
//!
//! ## Tables
//!
//! - `buyers` - Wholesale buyers with outbound shipping addresses
//! - `invoices` - Invoice headers with lifecycle status and totals
//! - `invoice_items` - Line items; totals roll up server-side
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p refit-cli -- migrate admin
//! ```

pub mod buyers;
pub mod invoices;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use buyers::BuyerRepository;
pub use invoices::InvoiceRepository;

/// Errors from repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Query failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be interpreted (bad status, bad JSON).
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A referenced row does not exist.
    #[error("foreign key violation: {0}")]
    ForeignKey(String),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
