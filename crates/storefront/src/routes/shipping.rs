//! Inbound shipping endpoints.
//!
//! Sellers ship TO the warehouse, so rates always run from the seller's
//! address to [`Address::refit_warehouse`] with the standard phone parcel.

use axum::Json;
use axum::extract::{Path, State};

use refit_shipping::{Address, AddressValidation, Parcel, RateQuote, TrackingStatus};

use crate::error::Result;
use crate::state::AppState;

/// `POST /api/shipping/validate-address` - validate and normalize an
/// address. An invalid address is a 200 with `is_valid: false`.
pub async fn validate_address(
    State(state): State<AppState>,
    Json(address): Json<Address>,
) -> Result<Json<AddressValidation>> {
    let validation = state.shipping().validate_address(&address).await?;
    Ok(Json(validation))
}

/// `POST /api/shipping/rates` - quoted rates for shipping one phone from
/// the seller to the warehouse, cheapest first.
pub async fn rates(
    State(state): State<AppState>,
    Json(from): Json<Address>,
) -> Result<Json<Vec<RateQuote>>> {
    let quotes = state
        .shipping()
        .get_rates(&from, &Address::refit_warehouse(), &Parcel::phone())
        .await?;
    Ok(Json(quotes))
}

/// `GET /api/shipping/track/{carrier}/{tracking}` - tracking status.
pub async fn track(
    State(state): State<AppState>,
    Path((carrier, tracking_number)): Path<(String, String)>,
) -> Result<Json<TrackingStatus>> {
    let status = state.shipping().track(&carrier, &tracking_number).await?;
    Ok(Json(status))
}
