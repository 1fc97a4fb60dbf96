//! Session-backed trade-in wizard endpoints.
//!
//! The wizard state machine lives in `refit_core::wizard`; these handlers
//! load it from the session, apply one transition, and store it back.
//! Step-ordering violations come back as 409s with the offending step
//! named; field-level validation happens here before the transition.

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use refit_core::quote::{Quote, QuoteRequest, calculate_quote};
use refit_core::wizard::{
    ChosenRate, DeviceSelection, TradeInWizard, WizardAddress, WizardStep,
};
use refit_shipping::Address;

use crate::db::TradeInOrderRepository;
use crate::error::{AppError, Result};
use crate::models::order::{NewTradeInOrder, TradeInOrder, generate_order_number};
use crate::state::AppState;

/// Session key holding the serialized wizard.
const WIZARD_KEY: &str = "trade_in_wizard";

/// Client-facing view of the wizard between steps.
#[derive(Debug, Serialize)]
pub struct WizardView {
    pub step: WizardStep,
    pub step_number: u8,
    pub quote: Option<Quote>,
}

impl From<&TradeInWizard> for WizardView {
    fn from(wizard: &TradeInWizard) -> Self {
        Self {
            step: wizard.step(),
            step_number: wizard.step().number(),
            quote: wizard.quote().cloned(),
        }
    }
}

async fn load_wizard(session: &Session) -> Result<TradeInWizard> {
    Ok(session
        .get::<TradeInWizard>(WIZARD_KEY)
        .await?
        .unwrap_or_default())
}

async fn save_wizard(session: &Session, wizard: &TradeInWizard) -> Result<()> {
    session.insert(WIZARD_KEY, wizard).await?;
    Ok(())
}

/// `GET /api/trade-in` - current wizard state.
pub async fn current_step(session: Session) -> Result<Json<WizardView>> {
    let wizard = load_wizard(&session).await?;
    Ok(Json(WizardView::from(&wizard)))
}

/// `POST /api/trade-in/device` - step 1: record the device and compute its
/// quote.
pub async fn submit_device(
    State(state): State<AppState>,
    session: Session,
    Json(selection): Json<DeviceSelection>,
) -> Result<Json<WizardView>> {
    let request = QuoteRequest {
        model_id: selection.model_id.clone(),
        storage: selection.storage.clone(),
        carrier: selection.carrier,
        condition: selection.condition,
        issues: selection.issues.clone(),
        accessories: selection.accessories,
    };
    let quote = calculate_quote(state.catalog(), &request, Some(state.config().sol_rate_usd))?;

    let mut wizard = load_wizard(&session).await?;
    wizard.submit_device(selection, quote)?;
    save_wizard(&session, &wizard).await?;
    Ok(Json(WizardView::from(&wizard)))
}

/// `POST /api/trade-in/quote/accept` - step 2: the seller accepted the
/// offer.
pub async fn accept_quote(session: Session) -> Result<Json<WizardView>> {
    let mut wizard = load_wizard(&session).await?;
    wizard.accept_quote()?;
    save_wizard(&session, &wizard).await?;
    Ok(Json(WizardView::from(&wizard)))
}

#[derive(Debug, Deserialize)]
pub struct SubmitShippingRequest {
    pub address: WizardAddress,
    /// The rate chosen from a prior `/api/shipping/rates` call.
    pub rate: ChosenRate,
}

/// `POST /api/trade-in/shipping` - step 3: validate the address and record
/// it with the chosen rate.
pub async fn submit_shipping(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SubmitShippingRequest>,
) -> Result<Json<WizardView>> {
    let validation = state
        .shipping()
        .validate_address(&to_shipping_address(&body.address))
        .await?;
    if !validation.is_valid {
        let detail = if validation.messages.is_empty() {
            "address failed validation".to_owned()
        } else {
            validation.messages.join("; ")
        };
        return Err(AppError::BadRequest(detail));
    }

    let mut wizard = load_wizard(&session).await?;
    wizard.submit_shipping(to_wizard_address(&validation.normalized), body.rate)?;
    save_wizard(&session, &wizard).await?;
    Ok(Json(WizardView::from(&wizard)))
}

#[derive(Debug, Deserialize)]
pub struct SubmitPaymentRequest {
    pub payout_wallet: String,
}

/// `POST /api/trade-in/payment` - step 4: record the payout wallet,
/// purchase the inbound label, and open the trade-in order.
pub async fn submit_payment(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<SubmitPaymentRequest>,
) -> Result<Json<TradeInOrder>> {
    let wallet = body.payout_wallet.trim().to_owned();
    if wallet.is_empty() {
        return Err(AppError::BadRequest("payout_wallet is required".to_owned()));
    }

    let wizard = load_wizard(&session).await?;
    let submission = match wizard.complete(wallet) {
        Ok(submission) => submission,
        Err(boxed) => return Err(AppError::Wizard(boxed.1)),
    };

    // Prepaid inbound label, charged to the warehouse account.
    let label = state
        .shipping()
        .purchase_label(&submission.rate.rate_id)
        .await?;

    let order = TradeInOrderRepository::new(state.pool())
        .create(NewTradeInOrder {
            order_number: generate_order_number(),
            model_id: submission.selection.model_id,
            model_display: submission.quote.display,
            storage: submission.selection.storage,
            carrier: submission.selection.carrier.to_string(),
            condition: submission.selection.condition.to_string(),
            quote_total: submission.quote.total,
            sol_amount: submission.quote.sol_amount,
            payout_wallet: submission.payout_wallet,
            address: submission.address,
            shipping_carrier: submission.rate.carrier,
            shipping_service: submission.rate.service,
            shipping_amount: submission.rate.amount,
            tracking_number: Some(label.tracking_number),
            label_url: Some(label.label_url),
        })
        .await?;

    tracing::info!(
        order_number = %order.order_number,
        model = %order.model_id,
        total = %order.quote_total,
        "trade-in order created"
    );

    session.remove::<TradeInWizard>(WIZARD_KEY).await?;
    Ok(Json(order))
}

/// `POST /api/trade-in/back` - go back one step, dropping that step's data.
pub async fn back(session: Session) -> Result<Json<WizardView>> {
    let mut wizard = load_wizard(&session).await?;
    wizard.back()?;
    save_wizard(&session, &wizard).await?;
    Ok(Json(WizardView::from(&wizard)))
}

fn to_shipping_address(address: &WizardAddress) -> Address {
    Address {
        name: address.name.clone(),
        company: None,
        street1: address.street1.clone(),
        street2: address.street2.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip: address.zip.clone(),
        country: address.country.clone(),
        phone: address.phone.clone(),
        is_default: false,
    }
}

fn to_wizard_address(address: &Address) -> WizardAddress {
    WizardAddress {
        name: address.name.clone(),
        street1: address.street1.clone(),
        street2: address.street2.clone(),
        city: address.city.clone(),
        state: address.state.clone(),
        zip: address.zip.clone(),
        country: address.country.clone(),
        phone: address.phone.clone(),
    }
}
