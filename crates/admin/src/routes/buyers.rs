//! Buyer management endpoints.

use axum::Json;
use axum::extract::{Path, State};

use refit_core::types::BuyerId;

use crate::db::BuyerRepository;
use crate::error::{AppError, Result};
use crate::models::buyer::{Buyer, NewBuyer};
use crate::state::AppState;

/// `GET /api/admin/buyers` - all buyers, alphabetically.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Buyer>>> {
    let buyers = BuyerRepository::new(state.pool()).list().await?;
    Ok(Json(buyers))
}

/// `POST /api/admin/buyers` - create a buyer.
pub async fn create(
    State(state): State<AppState>,
    Json(new): Json<NewBuyer>,
) -> Result<Json<Buyer>> {
    if new.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    if new.email.trim().is_empty() {
        return Err(AppError::BadRequest("email is required".to_owned()));
    }

    let buyer = BuyerRepository::new(state.pool()).create(&new).await?;
    tracing::info!(buyer_id = %buyer.id, name = %buyer.name, "buyer created");
    Ok(Json(buyer))
}

/// `GET /api/admin/buyers/{id}` - buyer detail.
pub async fn show(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Buyer>> {
    let id = BuyerId::new(id);
    BuyerRepository::new(state.pool())
        .get(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("buyer {id}")))
}
