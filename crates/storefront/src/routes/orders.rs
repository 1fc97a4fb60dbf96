//! Trade-in order lookup endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use refit_core::types::TradeInOrderId;

use crate::db::TradeInOrderRepository;
use crate::error::{AppError, Result};
use crate::models::order::{OrderEvent, TradeInOrder};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub wallet: String,
}

/// `GET /api/orders?wallet=` - orders paying out to a wallet, newest
/// first. Wallet addresses are the storefront's only customer identifier;
/// there are no accounts.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<TradeInOrder>>> {
    let wallet = params.wallet.trim();
    if wallet.is_empty() {
        return Err(AppError::BadRequest("wallet is required".to_owned()));
    }

    let orders = TradeInOrderRepository::new(state.pool())
        .list_by_wallet(wallet)
        .await?;
    Ok(Json(orders))
}

/// Order detail payload: the order plus its status history.
#[derive(Debug, Serialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: TradeInOrder,
    pub events: Vec<OrderEvent>,
}

/// `GET /api/orders/{id}` - one order with its status history.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderDetail>> {
    let id = TradeInOrderId::new(id);
    let repo = TradeInOrderRepository::new(state.pool());

    let order = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    let events = repo.events(id).await?;

    Ok(Json(OrderDetail { order, events }))
}
