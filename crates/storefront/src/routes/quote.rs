//! Standalone quote endpoint.
//!
//! Prices a device configuration without touching the wizard; the React
//! storefront uses this for the instant-quote widget on model pages.

use axum::Json;
use axum::extract::State;

use refit_core::quote::{Quote, QuoteRequest, calculate_quote};

use crate::error::Result;
use crate::state::AppState;

/// `POST /api/quote` - price a device configuration.
///
/// Responds 422 with the specific validation or lookup failure; an unknown
/// model is an error value here, never a panic.
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<Quote>> {
    let quote = calculate_quote(
        state.catalog(),
        &request,
        Some(state.config().sol_rate_usd),
    )?;
    Ok(Json(quote))
}
