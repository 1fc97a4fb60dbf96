//! Shipping domain types.
//!
//! The canonical address schema is snake_case throughout; wire payloads,
//! database columns, and session state all share these field names.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A shipping address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Address {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub street1: String,
    #[serde(default)]
    pub street2: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Whether this is the account's default address.
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// The ReFit intake warehouse. Inbound trade-in labels ship here.
    #[must_use]
    pub fn refit_warehouse() -> Self {
        Self {
            name: "Shop Refit, LLC".to_owned(),
            company: Some("Shop Refit".to_owned()),
            street1: "4931 Anclote Dr".to_owned(),
            street2: None,
            city: "Johns Creek".to_owned(),
            state: "GA".to_owned(),
            zip: "30022".to_owned(),
            country: "US".to_owned(),
            phone: None,
            is_default: false,
        }
    }
}

/// Parcel dimensions and weight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parcel {
    pub length: Decimal,
    pub width: Decimal,
    pub height: Decimal,
    pub distance_unit: String,
    pub weight: Decimal,
    pub mass_unit: String,
}

impl Parcel {
    /// Standard single-phone parcel: 7x4x2 in, 20 oz with packaging.
    #[must_use]
    pub fn phone() -> Self {
        Self {
            length: Decimal::from(7),
            width: Decimal::from(4),
            height: Decimal::from(2),
            distance_unit: "in".to_owned(),
            weight: Decimal::from(20),
            mass_unit: "oz".to_owned(),
        }
    }

    /// Wholesale box sized for `count` phones, half a pound each.
    #[must_use]
    pub fn wholesale_box(count: u32) -> Self {
        Self {
            length: Decimal::from(12),
            width: Decimal::from(8),
            height: Decimal::from(6),
            distance_unit: "in".to_owned(),
            weight: Decimal::new(i64::from(count.max(1)) * 5, 1),
            mass_unit: "lb".to_owned(),
        }
    }
}

/// Result of validating an address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressValidation {
    pub is_valid: bool,
    /// Provider-normalized address (street casing, ZIP+4, etc.).
    pub normalized: Address,
    /// Validation messages, e.g. "apartment number missing".
    pub messages: Vec<String>,
}

/// A quoted shipping rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateQuote {
    /// Provider rate identifier, used to purchase the label.
    pub rate_id: String,
    pub carrier: String,
    pub service: String,
    /// Price in USD.
    pub amount: Decimal,
    pub currency: String,
    pub estimated_days: Option<u32>,
}

/// A purchased shipping label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchasedLabel {
    pub tracking_number: String,
    pub label_url: String,
    pub tracking_url: Option<String>,
    pub carrier: String,
    /// What the label cost us.
    pub cost: Option<Decimal>,
}

/// One scan event in a shipment's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    pub status: String,
    pub location: Option<String>,
    pub occurred_at: Option<String>,
}

/// Current tracking state of a shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingStatus {
    pub carrier: String,
    pub tracking_number: String,
    pub status: String,
    pub eta: Option<String>,
    pub history: Vec<TrackingEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_parcel_constants() {
        let parcel = Parcel::phone();
        assert_eq!(parcel.length, Decimal::from(7));
        assert_eq!(parcel.weight, Decimal::from(20));
        assert_eq!(parcel.mass_unit, "oz");
    }

    #[test]
    fn test_wholesale_box_scales_with_count() {
        let parcel = Parcel::wholesale_box(4);
        assert_eq!(parcel.weight, Decimal::new(20, 1)); // 2.0 lb
        assert_eq!(parcel.mass_unit, "lb");

        // Zero-item boxes still weigh something.
        let empty = Parcel::wholesale_box(0);
        assert_eq!(empty.weight, Decimal::new(5, 1));
    }

    #[test]
    fn test_warehouse_address() {
        let warehouse = Address::refit_warehouse();
        assert_eq!(warehouse.state, "GA");
        assert_eq!(warehouse.zip, "30022");
    }

    #[test]
    fn test_address_serde_snake_case() {
        let json = serde_json::to_string(&Address::refit_warehouse()).expect("serialize");
        assert!(json.contains("\"is_default\":false"));
        assert!(json.contains("\"street1\""));
    }
}
