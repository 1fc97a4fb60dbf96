//! HTTP route handlers for the admin API.
//!
//! # Route Structure
//!
//! All `/api/admin` routes require `Authorization: Bearer <token>`.
//!
//! ```text
//! GET  /health                                  - Liveness check
//! GET  /health/ready                            - Readiness check (database ping)
//!
//! # Buyers
//! GET  /api/admin/buyers                        - List buyers
//! POST /api/admin/buyers                        - Create a buyer
//! GET  /api/admin/buyers/{id}                   - Buyer detail
//!
//! # Invoices
//! GET  /api/admin/invoices                      - List invoices (?status= filters)
//! POST /api/admin/invoices                      - Create a draft with items
//! GET  /api/admin/invoices/{id}                 - Invoice with buyer and items
//! PATCH /api/admin/invoices/{id}                - Update notes / guarded status change
//! POST /api/admin/invoices/{id}/items           - Add an item (draft only)
//! DELETE /api/admin/invoices/{id}/items/{item_id} - Remove an item (draft only)
//! POST /api/admin/invoices/{id}/ship            - Purchase outbound label, finalized -> sent
//! ```

pub mod buyers;
pub mod invoices;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the buyer routes router.
pub fn buyer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(buyers::list).post(buyers::create))
        .route("/{id}", get(buyers::show))
}

/// Create the invoice routes router.
pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(invoices::list).post(invoices::create))
        .route("/{id}", get(invoices::show).patch(invoices::update))
        .route("/{id}/items", post(invoices::add_item))
        .route("/{id}/items/{item_id}", axum::routing::delete(invoices::delete_item))
        .route("/{id}/ship", post(invoices::ship))
}

/// Create the authenticated admin routes. Bearer auth is layered on by the
/// caller so tests can exercise handlers directly.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .nest("/buyers", buyer_routes())
        .nest("/invoices", invoice_routes())
}

/// Create the unauthenticated routes (health checks).
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
