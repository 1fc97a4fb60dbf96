//! Wholesale invoices and their line items.
//!
//! Totals are always computed server-side from the items; clients never
//! send amounts for the invoice itself. The status lifecycle is the
//! guarded table in `refit_core::types::InvoiceStatus`.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use refit_core::types::{BuyerId, InvoiceId, InvoiceItemId, InvoiceStatus, Money};

const INVOICE_NUMBER_ALPHABET: &[u8] = b"23456789BCDFGHJKLMNPQRSTVWXZ";
const INVOICE_NUMBER_LENGTH: usize = 6;

/// Generate a fresh invoice number of the form `INV-XXXXXX`.
#[must_use]
pub fn generate_invoice_number() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..INVOICE_NUMBER_LENGTH)
        .map(|_| {
            INVOICE_NUMBER_ALPHABET
                .choose(&mut rng)
                .copied()
                .unwrap_or(b'X') as char
        })
        .collect();
    format!("INV-{suffix}")
}

/// A wholesale invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub id: InvoiceId,
    /// Buyer-facing reference, `INV-XXXXXX`.
    pub invoice_number: String,
    pub buyer_id: BuyerId,
    pub status: InvoiceStatus,
    /// Sum of item line totals.
    pub subtotal: Money,
    /// The outbound label price, once purchased.
    pub shipping_cost: Option<Money>,
    /// Amount due: `subtotal + shipping_cost`.
    pub total: Money,
    #[serde(default)]
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub label_url: Option<String>,
    pub finalized_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One line on an invoice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub id: InvoiceItemId,
    pub invoice_id: InvoiceId,
    /// Free-text description (e.g. "iPhone 15 Pro 256GB, grade B").
    pub description: String,
    pub quantity: i32,
    pub unit_price: Money,
    /// `quantity * unit_price`, computed on insert.
    pub line_total: Money,
}

/// Fields for adding an item to an invoice.
#[derive(Debug, Clone, Deserialize)]
pub struct NewInvoiceItem {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Money,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invoice_number_shape() {
        let number = generate_invoice_number();
        assert!(number.starts_with("INV-"));
        assert_eq!(number.len(), 4 + INVOICE_NUMBER_LENGTH);
    }
}
