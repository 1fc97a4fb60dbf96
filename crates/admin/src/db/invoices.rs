//! Invoice repository.
//!
//! Totals are rolled up from the items inside the same transaction as any
//! item change, so the header can never drift from its lines; the total is
//! always `subtotal + shipping_cost`. Status changes are validated in the
//! route layer and persisted compare-and-set: each UPDATE matches the
//! expected current status, so a concurrent transition makes the statement
//! affect zero rows instead of overwriting.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use refit_core::types::{BuyerId, InvoiceId, InvoiceItemId, InvoiceStatus, Money};

use super::RepositoryError;
use crate::models::invoice::{Invoice, InvoiceItem, NewInvoiceItem, generate_invoice_number};

/// Attempts before giving up on an invoice-number collision.
const INVOICE_NUMBER_ATTEMPTS: u32 = 3;

const INVOICE_COLUMNS: &str = "id, invoice_number, buyer_id, status, subtotal, shipping_cost, \
     total, notes, tracking_number, label_url, finalized_at, paid_at, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, invoice_id, description, quantity, unit_price, line_total";

/// Repository for invoice database operations.
pub struct InvoiceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> InvoiceRepository<'a> {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a draft invoice with its initial items.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::ForeignKey` if the buyer does not exist.
    pub async fn create(
        &self,
        buyer_id: BuyerId,
        notes: Option<&str>,
        items: &[NewInvoiceItem],
    ) -> Result<Invoice, RepositoryError> {
        let mut attempt = 0;
        let mut invoice_number = generate_invoice_number();

        loop {
            attempt += 1;

            let mut tx = self.pool.begin().await?;

            let insert = sqlx::query_as::<_, InvoiceRow>(&format!(
                "INSERT INTO invoices (invoice_number, buyer_id, status, notes) \
                 VALUES ($1, $2, $3, $4) RETURNING {INVOICE_COLUMNS}"
            ))
            .bind(&invoice_number)
            .bind(buyer_id.as_i64())
            .bind(InvoiceStatus::Draft.as_str())
            .bind(notes)
            .fetch_one(&mut *tx)
            .await;

            let row = match insert {
                Ok(row) => row,
                Err(e) => {
                    if is_unique_violation(&e) && attempt < INVOICE_NUMBER_ATTEMPTS {
                        tx.rollback().await?;
                        invoice_number = generate_invoice_number();
                        continue;
                    }
                    if is_foreign_key_violation(&e) {
                        return Err(RepositoryError::ForeignKey(format!("buyer {buyer_id}")));
                    }
                    return Err(e.into());
                }
            };

            let id = InvoiceId::new(row.id);
            for item in items {
                insert_item(&mut tx, id, item).await?;
            }
            let row = recompute_totals(&mut tx, id).await?;

            tx.commit().await?;
            return row.try_into();
        }
    }

    /// Get an invoice by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: InvoiceId) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// List invoices, newest first. Optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(
        &self,
        status: Option<InvoiceStatus>,
    ) -> Result<Vec<Invoice>, RepositoryError> {
        let rows = match status {
            Some(status) => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {INVOICE_COLUMNS} FROM invoices WHERE status = $1 \
                     ORDER BY created_at DESC"
                ))
                .bind(status.as_str())
                .fetch_all(self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, InvoiceRow>(&format!(
                    "SELECT {INVOICE_COLUMNS} FROM invoices ORDER BY created_at DESC"
                ))
                .fetch_all(self.pool)
                .await?
            }
        };

        rows.into_iter().map(Invoice::try_from).collect()
    }

    /// Items on an invoice, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items(&self, id: InvoiceId) -> Result<Vec<InvoiceItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, InvoiceItemRow>(&format!(
            "SELECT {ITEM_COLUMNS} FROM invoice_items WHERE invoice_id = $1 ORDER BY id ASC"
        ))
        .bind(id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(InvoiceItem::from).collect())
    }

    /// Update notes on an invoice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_notes(
        &self,
        id: InvoiceId,
        notes: Option<&str>,
    ) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&format!(
            "UPDATE invoices SET notes = $2, updated_at = now() WHERE id = $1 \
             RETURNING {INVOICE_COLUMNS}"
        ))
        .bind(id.as_i64())
        .bind(notes)
        .fetch_optional(self.pool)
        .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Persist a status change, stamping `finalized_at`/`paid_at` on the
    /// way through. The transition must already be validated; the UPDATE
    /// only matches rows still in `from`, so `None` means the invoice is
    /// gone or another request moved it first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn set_status(
        &self,
        id: InvoiceId,
        from: InvoiceStatus,
        to: InvoiceStatus,
    ) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&set_status_sql())
            .bind(id.as_i64())
            .bind(to.as_str())
            .bind(from.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(Invoice::try_from).transpose()
    }

    /// Add an item and roll the totals up.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn add_item(
        &self,
        id: InvoiceId,
        item: &NewInvoiceItem,
    ) -> Result<(Invoice, InvoiceItem), RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let inserted = insert_item(&mut tx, id, item).await?;
        let invoice = recompute_totals(&mut tx, id).await?;
        tx.commit().await?;

        Ok((invoice.try_into()?, inserted.into()))
    }

    /// Remove an item and roll the totals up. Returns `None` if the item
    /// was not on this invoice.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails.
    pub async fn delete_item(
        &self,
        id: InvoiceId,
        item_id: InvoiceItemId,
    ) -> Result<Option<Invoice>, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM invoice_items WHERE id = $1 AND invoice_id = $2")
            .bind(item_id.as_i64())
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;
        if deleted.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let invoice = recompute_totals(&mut tx, id).await?;
        tx.commit().await?;
        Ok(Some(invoice.try_into()?))
    }

    /// Record a purchased outbound label, fold its cost into the total,
    /// and move the invoice to `sent`. The UPDATE only matches rows still
    /// in `finalized`; `None` means the invoice is gone or another request
    /// transitioned it first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn record_shipment(
        &self,
        id: InvoiceId,
        tracking_number: &str,
        label_url: &str,
        shipping_cost: Option<Money>,
    ) -> Result<Option<Invoice>, RepositoryError> {
        let row = sqlx::query_as::<_, InvoiceRow>(&record_shipment_sql())
            .bind(id.as_i64())
            .bind(InvoiceStatus::Sent.as_str())
            .bind(tracking_number)
            .bind(label_url)
            .bind(shipping_cost.map(|c| c.amount()))
            .bind(InvoiceStatus::Finalized.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(Invoice::try_from).transpose()
    }
}

async fn insert_item(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: InvoiceId,
    item: &NewInvoiceItem,
) -> Result<InvoiceItemRow, RepositoryError> {
    let line_total = item.unit_price.amount() * Decimal::from(item.quantity);

    let row = sqlx::query_as::<_, InvoiceItemRow>(&format!(
        "INSERT INTO invoice_items (invoice_id, description, quantity, unit_price, line_total) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {ITEM_COLUMNS}"
    ))
    .bind(invoice_id.as_i64())
    .bind(&item.description)
    .bind(item.quantity)
    .bind(item.unit_price.amount())
    .bind(line_total)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

async fn recompute_totals(
    tx: &mut Transaction<'_, Postgres>,
    invoice_id: InvoiceId,
) -> Result<InvoiceRow, RepositoryError> {
    let row = sqlx::query_as::<_, InvoiceRow>(&recompute_totals_sql())
        .bind(invoice_id.as_i64())
        .fetch_one(&mut **tx)
        .await?;

    Ok(row)
}

// SQL built as functions so the tests can hold the statements to the
// invariants they encode.

/// Roll subtotal up from the items; total is subtotal plus any shipping
/// cost already on the invoice.
fn recompute_totals_sql() -> String {
    format!(
        "UPDATE invoices SET \
         subtotal = COALESCE((SELECT SUM(line_total) FROM invoice_items WHERE invoice_id = $1), 0), \
         total = COALESCE((SELECT SUM(line_total) FROM invoice_items WHERE invoice_id = $1), 0) \
             + COALESCE(shipping_cost, 0), \
         updated_at = now() \
         WHERE id = $1 RETURNING {INVOICE_COLUMNS}"
    )
}

/// Compare-and-set status change: $3 is the expected current status.
fn set_status_sql() -> String {
    format!(
        "UPDATE invoices SET status = $2, \
         finalized_at = CASE WHEN $2 = 'finalized' THEN now() ELSE finalized_at END, \
         paid_at = CASE WHEN $2 = 'paid' THEN now() ELSE paid_at END, \
         updated_at = now() \
         WHERE id = $1 AND status = $3 RETURNING {INVOICE_COLUMNS}"
    )
}

/// Label purchase: stores the cost, folds it into the total, and moves the
/// invoice to `sent` only if it is still in the expected status ($6).
fn record_shipment_sql() -> String {
    format!(
        "UPDATE invoices SET status = $2, tracking_number = $3, label_url = $4, \
         shipping_cost = $5, total = subtotal + COALESCE($5, 0), updated_at = now() \
         WHERE id = $1 AND status = $6 RETURNING {INVOICE_COLUMNS}"
    )
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn is_foreign_key_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation())
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct InvoiceRow {
    id: i64,
    invoice_number: String,
    buyer_id: i64,
    status: String,
    subtotal: Decimal,
    shipping_cost: Option<Decimal>,
    total: Decimal,
    notes: Option<String>,
    tracking_number: Option<String>,
    label_url: Option<String>,
    finalized_at: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<InvoiceRow> for Invoice {
    type Error = RepositoryError;

    fn try_from(row: InvoiceRow) -> Result<Self, Self::Error> {
        let status = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invoice {}: {e}", row.invoice_number))
        })?;

        Ok(Self {
            id: InvoiceId::new(row.id),
            invoice_number: row.invoice_number,
            buyer_id: BuyerId::new(row.buyer_id),
            status,
            subtotal: Money::new(row.subtotal),
            shipping_cost: row.shipping_cost.map(Money::new),
            total: Money::new(row.total),
            notes: row.notes,
            tracking_number: row.tracking_number,
            label_url: row.label_url,
            finalized_at: row.finalized_at,
            paid_at: row.paid_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct InvoiceItemRow {
    id: i64,
    invoice_id: i64,
    description: String,
    quantity: i32,
    unit_price: Decimal,
    line_total: Decimal,
}

impl From<InvoiceItemRow> for InvoiceItem {
    fn from(row: InvoiceItemRow) -> Self {
        Self {
            id: InvoiceItemId::new(row.id),
            invoice_id: InvoiceId::new(row.invoice_id),
            description: row.description,
            quantity: row.quantity,
            unit_price: Money::new(row.unit_price),
            line_total: Money::new(row.line_total),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Every statement that touches the header must keep
    // total = subtotal + shipping_cost.
    #[test]
    fn test_totals_fold_in_shipping_cost() {
        assert!(recompute_totals_sql().contains("+ COALESCE(shipping_cost, 0)"));
        assert!(record_shipment_sql().contains("total = subtotal + COALESCE($5, 0)"));
    }

    // Status changes are compare-and-set so concurrent transitions cannot
    // overwrite each other; zero rows affected surfaces as a conflict.
    #[test]
    fn test_status_updates_match_expected_status() {
        assert!(set_status_sql().contains("AND status = $3"));
        assert!(record_shipment_sql().contains("AND status = $6"));
    }

    #[test]
    fn test_update_statements_return_full_rows() {
        for sql in [recompute_totals_sql(), set_status_sql(), record_shipment_sql()] {
            assert!(sql.contains(&format!("RETURNING {INVOICE_COLUMNS}")));
        }
    }
}
