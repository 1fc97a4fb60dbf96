//! Trade-in order records.
//!
//! A `TradeInOrder` is created when the wizard completes: device facts,
//! the accepted quote amounts, the seller's address, the purchased inbound
//! label, and the payout wallet. Orders are append-only from the
//! storefront's side; status advances as the parcel moves.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use refit_core::types::{Money, TradeInOrderId, TradeInStatus};
use refit_core::wizard::WizardAddress;

/// Alphabet for order numbers. No vowels or easily-confused glyphs, so a
/// number can be read over the phone.
const ORDER_NUMBER_ALPHABET: &[u8] = b"23456789BCDFGHJKLMNPQRSTVWXZ";
const ORDER_NUMBER_LENGTH: usize = 6;

/// Generate a fresh order number of the form `REF-XXXXXX`.
///
/// Uniqueness is enforced by the database; a collision surfaces as an
/// insert error and is retried by the caller.
#[must_use]
pub fn generate_order_number() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..ORDER_NUMBER_LENGTH)
        .map(|_| {
            ORDER_NUMBER_ALPHABET
                .choose(&mut rng)
                .copied()
                .unwrap_or(b'X') as char
        })
        .collect();
    format!("REF-{suffix}")
}

/// A persisted trade-in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeInOrder {
    pub id: TradeInOrderId,
    /// Customer-facing reference, `REF-XXXXXX`.
    pub order_number: String,
    pub model_id: String,
    pub model_display: String,
    pub storage: String,
    pub carrier: String,
    pub condition: String,
    /// Accepted quote total in USD.
    pub quote_total: Money,
    /// Payout in SOL at the rate quoted, if one was configured.
    pub sol_amount: Option<Decimal>,
    pub payout_wallet: String,
    /// Seller's inbound shipping address.
    pub address: WizardAddress,
    pub shipping_carrier: String,
    pub shipping_service: String,
    /// Label price in USD at purchase time.
    pub shipping_amount: Money,
    pub tracking_number: Option<String>,
    pub label_url: Option<String>,
    pub status: TradeInStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry in an order's status history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEvent {
    pub status: TradeInStatus,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields needed to insert a new order.
#[derive(Debug, Clone)]
pub struct NewTradeInOrder {
    pub order_number: String,
    pub model_id: String,
    pub model_display: String,
    pub storage: String,
    pub carrier: String,
    pub condition: String,
    pub quote_total: Money,
    pub sol_amount: Option<Decimal>,
    pub payout_wallet: String,
    pub address: WizardAddress,
    pub shipping_carrier: String,
    pub shipping_service: String,
    pub shipping_amount: Money,
    pub tracking_number: Option<String>,
    pub label_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_number_shape() {
        let number = generate_order_number();
        assert!(number.starts_with("REF-"));
        assert_eq!(number.len(), 4 + ORDER_NUMBER_LENGTH);
        assert!(
            number[4..]
                .bytes()
                .all(|b| ORDER_NUMBER_ALPHABET.contains(&b))
        );
    }

    #[test]
    fn test_order_numbers_vary() {
        let a = generate_order_number();
        let b = generate_order_number();
        let c = generate_order_number();
        // Three draws from a 28^6 space colliding would point at a broken RNG.
        assert!(!(a == b && b == c));
    }
}
