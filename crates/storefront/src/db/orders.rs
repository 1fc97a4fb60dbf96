//! Trade-in order repository.
//!
//! Uses the runtime sqlx API with explicit row structs; status text and the
//! address JSON are parsed on the way out and surfaced as
//! `RepositoryError::DataCorruption` when invalid.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use refit_core::types::{Money, TradeInOrderId, TradeInStatus};

use super::RepositoryError;
use crate::models::order::{NewTradeInOrder, OrderEvent, TradeInOrder, generate_order_number};

/// Attempts before giving up on an order-number collision.
const ORDER_NUMBER_ATTEMPTS: u32 = 3;

const ORDER_COLUMNS: &str = "id, order_number, model_id, model_display, storage, carrier, \
     condition, quote_total, sol_amount, payout_wallet, address, shipping_carrier, \
     shipping_service, shipping_amount, tracking_number, label_url, status, created_at, \
     updated_at";

/// Repository for trade-in order database operations.
pub struct TradeInOrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TradeInOrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new order with an initial `pending_shipment` history row.
    ///
    /// Retries with a fresh order number on the (astronomically rare)
    /// unique-constraint collision.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, mut new: NewTradeInOrder) -> Result<TradeInOrder, RepositoryError> {
        let address = serde_json::to_value(&new.address)
            .map_err(|e| RepositoryError::DataCorruption(format!("address encode: {e}")))?;

        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut tx = self.pool.begin().await?;

            let insert = sqlx::query_as::<_, TradeInOrderRow>(&format!(
                "INSERT INTO trade_in_orders (order_number, model_id, model_display, storage, \
                 carrier, condition, quote_total, sol_amount, payout_wallet, address, \
                 shipping_carrier, shipping_service, shipping_amount, tracking_number, label_url, \
                 status) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16) \
                 RETURNING {ORDER_COLUMNS}"
            ))
            .bind(&new.order_number)
            .bind(&new.model_id)
            .bind(&new.model_display)
            .bind(&new.storage)
            .bind(&new.carrier)
            .bind(&new.condition)
            .bind(new.quote_total.amount())
            .bind(new.sol_amount)
            .bind(&new.payout_wallet)
            .bind(&address)
            .bind(&new.shipping_carrier)
            .bind(&new.shipping_service)
            .bind(new.shipping_amount.amount())
            .bind(&new.tracking_number)
            .bind(&new.label_url)
            .bind(TradeInStatus::PendingShipment.as_str())
            .fetch_one(&mut *tx)
            .await;

            let row = match insert {
                Ok(row) => row,
                Err(e) => {
                    if is_unique_violation(&e) && attempt < ORDER_NUMBER_ATTEMPTS {
                        tx.rollback().await?;
                        new.order_number = generate_order_number();
                        continue;
                    }
                    return Err(e.into());
                }
            };

            sqlx::query(
                "INSERT INTO trade_in_order_events (order_id, status, note) VALUES ($1, $2, $3)",
            )
            .bind(row.id)
            .bind(TradeInStatus::PendingShipment.as_str())
            .bind("order created, inbound label issued")
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
            return row.try_into();
        }
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: TradeInOrderId) -> Result<Option<TradeInOrder>, RepositoryError> {
        let row = sqlx::query_as::<_, TradeInOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM trade_in_orders WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(TradeInOrder::try_from).transpose()
    }

    /// List orders paying out to a wallet, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_wallet(&self, wallet: &str) -> Result<Vec<TradeInOrder>, RepositoryError> {
        let rows = sqlx::query_as::<_, TradeInOrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM trade_in_orders \
             WHERE payout_wallet = $1 ORDER BY created_at DESC"
        ))
        .bind(wallet)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TradeInOrder::try_from).collect()
    }

    /// Status history for an order, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn events(&self, id: TradeInOrderId) -> Result<Vec<OrderEvent>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderEventRow>(
            "SELECT status, note, created_at FROM trade_in_order_events \
             WHERE order_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderEvent::try_from).collect()
    }
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct TradeInOrderRow {
    id: i64,
    order_number: String,
    model_id: String,
    model_display: String,
    storage: String,
    carrier: String,
    condition: String,
    quote_total: Decimal,
    sol_amount: Option<Decimal>,
    payout_wallet: String,
    address: serde_json::Value,
    shipping_carrier: String,
    shipping_service: String,
    shipping_amount: Decimal,
    tracking_number: Option<String>,
    label_url: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<TradeInOrderRow> for TradeInOrder {
    type Error = RepositoryError;

    fn try_from(row: TradeInOrderRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: {e}", row.order_number))
        })?;
        let address = serde_json::from_value(row.address).map_err(|e| {
            RepositoryError::DataCorruption(format!("order {}: bad address: {e}", row.order_number))
        })?;

        Ok(Self {
            id: TradeInOrderId::new(row.id),
            order_number: row.order_number,
            model_id: row.model_id,
            model_display: row.model_display,
            storage: row.storage,
            carrier: row.carrier,
            condition: row.condition,
            quote_total: Money::new(row.quote_total),
            sol_amount: row.sol_amount,
            payout_wallet: row.payout_wallet,
            address,
            shipping_carrier: row.shipping_carrier,
            shipping_service: row.shipping_service,
            shipping_amount: Money::new(row.shipping_amount),
            tracking_number: row.tracking_number,
            label_url: row.label_url,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderEventRow {
    status: String,
    note: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderEventRow> for OrderEvent {
    type Error = RepositoryError;

    fn try_from(row: OrderEventRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse()
            .map_err(|e| RepositoryError::DataCorruption(format!("order event: {e}")))?;
        Ok(Self {
            status,
            note: row.note,
            created_at: row.created_at,
        })
    }
}
