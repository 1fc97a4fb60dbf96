//! ReFit admin library.
//!
//! The internal invoicing API as a library; the binary in `main.rs` is a
//! thin bootstrap.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Build the complete admin router with bearer auth on `/api/admin`.
#[must_use]
pub fn app(state: AppState) -> Router {
    let admin = routes::admin_routes().route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        middleware::require_bearer,
    ));

    Router::new()
        .merge(routes::public_routes())
        .nest("/api/admin", admin)
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
