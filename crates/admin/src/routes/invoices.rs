//! Invoice lifecycle endpoints.
//!
//! Status changes go through `InvoiceStatus::can_transition_to`; anything
//! the table rejects comes back as a 409 naming both statuses. Item edits
//! are allowed on drafts only.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};

use refit_core::types::{BuyerId, InvoiceId, InvoiceItemId, InvoiceStatus};
use refit_shipping::{Address, Parcel, RateQuote};

use crate::db::{BuyerRepository, InvoiceRepository, RepositoryError};
use crate::error::{AppError, Result};
use crate::models::buyer::Buyer;
use crate::models::invoice::{Invoice, InvoiceItem, NewInvoiceItem};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<InvoiceStatus>,
}

/// `GET /api/admin/invoices` - invoices, newest first.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<Invoice>>> {
    let invoices = InvoiceRepository::new(state.pool())
        .list(params.status)
        .await?;
    Ok(Json(invoices))
}

/// Invoice detail payload: header, buyer, and items.
#[derive(Debug, Serialize)]
pub struct InvoiceDetail {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub buyer: Buyer,
    pub items: Vec<InvoiceItem>,
}

/// `GET /api/admin/invoices/{id}` - one invoice with buyer and items.
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<InvoiceDetail>> {
    let id = InvoiceId::new(id);
    let (invoice, items) = load_invoice(&state, id).await?;
    let buyer = load_buyer(&state, invoice.buyer_id).await?;

    Ok(Json(InvoiceDetail {
        invoice,
        buyer,
        items,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateInvoiceRequest {
    pub buyer_id: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<NewInvoiceItem>,
}

/// `POST /api/admin/invoices` - create a draft with items. Totals are
/// computed here, never taken from the client.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateInvoiceRequest>,
) -> Result<Json<InvoiceDetail>> {
    for item in &body.items {
        validate_item(item)?;
    }

    let repo = InvoiceRepository::new(state.pool());
    let invoice = repo
        .create(
            BuyerId::new(body.buyer_id),
            body.notes.as_deref(),
            &body.items,
        )
        .await
        .map_err(|e| match e {
            RepositoryError::ForeignKey(what) => AppError::Unprocessable(format!("unknown {what}")),
            other => other.into(),
        })?;

    let items = repo.items(invoice.id).await?;
    let buyer = load_buyer(&state, invoice.buyer_id).await?;

    tracing::info!(
        invoice = %invoice.invoice_number,
        buyer = %buyer.name,
        total = %invoice.total,
        "invoice created"
    );

    Ok(Json(InvoiceDetail {
        invoice,
        buyer,
        items,
    }))
}

#[derive(Debug, Deserialize)]
pub struct UpdateInvoiceRequest {
    pub status: Option<InvoiceStatus>,
    /// Replaces the notes field when present.
    pub notes: Option<String>,
}

/// `PATCH /api/admin/invoices/{id}` - update notes and/or apply a guarded
/// status transition, stamping `finalized_at`/`paid_at`.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateInvoiceRequest>,
) -> Result<Json<Invoice>> {
    let id = InvoiceId::new(id);
    let repo = InvoiceRepository::new(state.pool());

    let mut invoice = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("invoice {id}")))?;

    if let Some(notes) = &body.notes {
        invoice = repo
            .update_notes(id, Some(notes))
            .await?
            .ok_or_else(|| AppError::NotFound(format!("invoice {id}")))?;
    }

    if let Some(next) = body.status {
        if !invoice.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: invoice.status,
                to: next,
            });
        }
        // The update matches the status we validated against; a concurrent
        // transition leaves zero rows and comes back as the same 409.
        invoice = repo
            .set_status(id, invoice.status, next)
            .await?
            .ok_or(AppError::InvalidTransition {
                from: invoice.status,
                to: next,
            })?;
        tracing::info!(invoice = %invoice.invoice_number, status = %next, "invoice status changed");
    }

    Ok(Json(invoice))
}

/// `POST /api/admin/invoices/{id}/items` - add an item to a draft.
pub async fn add_item(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(item): Json<NewInvoiceItem>,
) -> Result<Json<InvoiceDetail>> {
    validate_item(&item)?;

    let id = InvoiceId::new(id);
    let repo = InvoiceRepository::new(state.pool());

    let (invoice, _) = load_invoice(&state, id).await?;
    if !invoice.status.allows_item_edits() {
        return Err(AppError::ItemsLocked {
            status: invoice.status,
        });
    }

    let (invoice, _item) = repo.add_item(id, &item).await?;
    let items = repo.items(id).await?;
    let buyer = load_buyer(&state, invoice.buyer_id).await?;

    Ok(Json(InvoiceDetail {
        invoice,
        buyer,
        items,
    }))
}

/// `DELETE /api/admin/invoices/{id}/items/{item_id}` - remove an item from
/// a draft.
pub async fn delete_item(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(i64, i64)>,
) -> Result<Json<InvoiceDetail>> {
    let id = InvoiceId::new(id);
    let item_id = InvoiceItemId::new(item_id);
    let repo = InvoiceRepository::new(state.pool());

    let (invoice, _) = load_invoice(&state, id).await?;
    if !invoice.status.allows_item_edits() {
        return Err(AppError::ItemsLocked {
            status: invoice.status,
        });
    }

    let invoice = repo
        .delete_item(id, item_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("item {item_id} on invoice {id}")))?;
    let items = repo.items(id).await?;
    let buyer = load_buyer(&state, invoice.buyer_id).await?;

    Ok(Json(InvoiceDetail {
        invoice,
        buyer,
        items,
    }))
}

#[derive(Debug, Deserialize, Default)]
pub struct ShipRequest {
    /// Rate to purchase; omitted means cheapest.
    pub rate_id: Option<String>,
}

/// Ship response: the updated invoice and the rate that was purchased.
#[derive(Debug, Serialize)]
pub struct ShipResponse {
    #[serde(flatten)]
    pub invoice: Invoice,
    pub rate: RateQuote,
}

/// `POST /api/admin/invoices/{id}/ship` - quote rates from the warehouse
/// to the buyer, purchase a label, and move the invoice finalized -> sent.
pub async fn ship(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<ShipRequest>,
) -> Result<Json<ShipResponse>> {
    let id = InvoiceId::new(id);
    let repo = InvoiceRepository::new(state.pool());

    let (invoice, items) = load_invoice(&state, id).await?;
    if !invoice.status.can_transition_to(InvoiceStatus::Sent) {
        return Err(AppError::InvalidTransition {
            from: invoice.status,
            to: InvoiceStatus::Sent,
        });
    }
    if items.is_empty() {
        return Err(AppError::Unprocessable(
            "invoice has no items to ship".to_owned(),
        ));
    }

    let buyer = load_buyer(&state, invoice.buyer_id).await?;

    let unit_count: i64 = items.iter().map(|item| i64::from(item.quantity)).sum();
    let unit_count = u32::try_from(unit_count.max(1)).unwrap_or(u32::MAX);
    let parcel = Parcel::wholesale_box(unit_count);

    let rates = state
        .shipping()
        .get_rates(&Address::refit_warehouse(), &buyer.address, &parcel)
        .await?;

    // Cheapest unless the caller picked one (rates come back sorted).
    let rate = match &body.rate_id {
        Some(rate_id) => rates
            .into_iter()
            .find(|r| &r.rate_id == rate_id)
            .ok_or_else(|| AppError::Unprocessable(format!("unknown rate {rate_id}")))?,
        None => rates
            .into_iter()
            .next()
            .ok_or(AppError::Shipping(refit_shipping::ShippingError::NoRates))?,
    };

    let label = state.shipping().purchase_label(&rate.rate_id).await?;

    // record_shipment only matches invoices still in finalized; losing a
    // race to another transition surfaces as a conflict, not an overwrite.
    let invoice = repo
        .record_shipment(
            id,
            &label.tracking_number,
            &label.label_url,
            label.cost.map(refit_core::types::Money::new),
        )
        .await?
        .ok_or(AppError::InvalidTransition {
            from: invoice.status,
            to: InvoiceStatus::Sent,
        })?;

    tracing::info!(
        invoice = %invoice.invoice_number,
        tracking = %label.tracking_number,
        carrier = %rate.carrier,
        "outbound label purchased, invoice sent"
    );

    Ok(Json(ShipResponse { invoice, rate }))
}

// =============================================================================
// Helpers
// =============================================================================

async fn load_invoice(state: &AppState, id: InvoiceId) -> Result<(Invoice, Vec<InvoiceItem>)> {
    let repo = InvoiceRepository::new(state.pool());
    let invoice = repo
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("invoice {id}")))?;
    let items = repo.items(id).await?;
    Ok((invoice, items))
}

async fn load_buyer(state: &AppState, id: BuyerId) -> Result<Buyer> {
    BuyerRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("buyer {id}")))
}

fn validate_item(item: &NewInvoiceItem) -> Result<()> {
    if item.description.trim().is_empty() {
        return Err(AppError::BadRequest(
            "item description is required".to_owned(),
        ));
    }
    if item.quantity < 1 {
        return Err(AppError::BadRequest(
            "item quantity must be at least 1".to_owned(),
        ));
    }
    if item.unit_price.is_negative() {
        return Err(AppError::BadRequest(
            "item unit price cannot be negative".to_owned(),
        ));
    }
    Ok(())
}
