//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database ping)
//!
//! # Catalog
//! GET  /api/catalog/models              - Models grouped by category (?category= filters)
//! GET  /api/catalog/models/{id}         - Model detail with variants
//! GET  /api/catalog/models/{id}/storage - Storage tiers for a model
//! GET  /api/catalog/search?q=           - Substring search, max 10 results
//!
//! # Quotes
//! POST /api/quote                       - Price a device configuration
//!
//! # Trade-in wizard (state in session)
//! GET  /api/trade-in                    - Current wizard step
//! POST /api/trade-in/device             - Step 1: device selection, computes the quote
//! POST /api/trade-in/quote/accept       - Step 2: accept the offer
//! POST /api/trade-in/shipping           - Step 3: address + chosen rate
//! POST /api/trade-in/payment            - Step 4: payout wallet; creates the order
//! POST /api/trade-in/back               - Go back one step
//!
//! # Shipping
//! POST /api/shipping/validate-address   - Validate/normalize an address
//! POST /api/shipping/rates              - Inbound rates (seller -> warehouse)
//! GET  /api/shipping/track/{carrier}/{tracking} - Tracking status
//!
//! # Orders
//! GET  /api/orders?wallet=              - Orders paying out to a wallet
//! GET  /api/orders/{id}                 - Order detail with status history
//! ```

pub mod catalog;
pub mod orders;
pub mod quote;
pub mod shipping;
pub mod trade_in;

use axum::extract::State;
use axum::http::StatusCode;
use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/models", get(catalog::list_models))
        .route("/models/{id}", get(catalog::get_model))
        .route("/models/{id}/storage", get(catalog::storage_options))
        .route("/search", get(catalog::search))
}

/// Create the trade-in wizard routes router.
pub fn trade_in_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(trade_in::current_step))
        .route("/device", post(trade_in::submit_device))
        .route("/quote/accept", post(trade_in::accept_quote))
        .route("/shipping", post(trade_in::submit_shipping))
        .route("/payment", post(trade_in::submit_payment))
        .route("/back", post(trade_in::back))
}

/// Create the shipping routes router.
pub fn shipping_routes() -> Router<AppState> {
    Router::new()
        .route("/validate-address", post(shipping::validate_address))
        .route("/rates", post(shipping::rates))
        .route("/track/{carrier}/{tracking}", get(shipping::track))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{id}", get(orders::show))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/catalog", catalog_routes())
        .route("/api/quote", post(quote::create))
        .nest("/api/trade-in", trade_in_routes())
        .nest("/api/shipping", shipping_routes())
        .nest("/api/orders", order_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies database connectivity before returning OK.
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
