//! Deterministic local shipping provider.
//!
//! Used whenever `SHIPPING_PROVIDER=mock`: development without a Shippo
//! account, CI, and integration tests. Every address validates, the rate
//! table is fixed, and labels always purchase.

use rand::Rng;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::types::{
    Address, AddressValidation, PurchasedLabel, RateQuote, TrackingEvent, TrackingStatus,
};

/// Local stand-in for the Shippo client.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockShippingService;

impl MockShippingService {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Accept any address as-is.
    #[must_use]
    pub fn validate_address(&self, address: &Address) -> AddressValidation {
        AddressValidation {
            is_valid: true,
            normalized: address.clone(),
            messages: Vec::new(),
        }
    }

    /// Fixed rate table, cheapest first. Rate ids are fresh per call, the
    /// way Shippo rates are scoped to a shipment.
    #[must_use]
    pub fn get_rates(&self) -> Vec<RateQuote> {
        vec![
            mock_rate("USPS", "Priority Mail", Decimal::new(845, 2), 3),
            mock_rate("UPS", "Ground", Decimal::new(1250, 2), 5),
            mock_rate("FedEx", "2 Day", Decimal::new(1599, 2), 2),
            mock_rate("USPS", "Priority Mail Express", Decimal::new(2875, 2), 1),
        ]
    }

    /// Always succeeds with a synthetic tracking number and label URL.
    #[must_use]
    pub fn purchase_label(&self, rate_id: &str) -> PurchasedLabel {
        let mut rng = rand::rng();
        let tracking_number = format!("1Z{:016}", rng.random_range(0..10_000_000_000_000_000_u64));
        PurchasedLabel {
            label_url: format!("https://mock.shipping.local/labels/{rate_id}.pdf"),
            tracking_url: Some(format!(
                "https://mock.shipping.local/track/{tracking_number}"
            )),
            tracking_number,
            carrier: "USPS".to_owned(),
            cost: Some(Decimal::new(845, 2)),
        }
    }

    /// Canned in-transit status with one scan event.
    #[must_use]
    pub fn track(&self, carrier: &str, tracking_number: &str) -> TrackingStatus {
        TrackingStatus {
            carrier: carrier.to_owned(),
            tracking_number: tracking_number.to_owned(),
            status: "TRANSIT".to_owned(),
            eta: None,
            history: vec![TrackingEvent {
                status: "TRANSIT".to_owned(),
                location: Some("Atlanta, GA".to_owned()),
                occurred_at: None,
            }],
        }
    }
}

fn mock_rate(carrier: &str, service: &str, amount: Decimal, estimated_days: u32) -> RateQuote {
    RateQuote {
        rate_id: Uuid::new_v4().to_string(),
        carrier: carrier.to_owned(),
        service: service.to_owned(),
        amount,
        currency: "USD".to_owned(),
        estimated_days: Some(estimated_days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_sorted_cheapest_first() {
        let rates = MockShippingService::new().get_rates();
        assert_eq!(rates.len(), 4);
        for pair in rates.windows(2) {
            assert!(pair[0].amount <= pair[1].amount);
        }
        assert_eq!(rates[0].carrier, "USPS");
        assert_eq!(rates[0].amount, Decimal::new(845, 2));
    }

    #[test]
    fn test_rate_ids_are_unique_per_call() {
        let mock = MockShippingService::new();
        let first = mock.get_rates();
        let second = mock.get_rates();
        assert_ne!(first[0].rate_id, second[0].rate_id);
    }

    #[test]
    fn test_validation_accepts_anything() {
        let result = MockShippingService::new().validate_address(&Address::refit_warehouse());
        assert!(result.is_valid);
        assert!(result.messages.is_empty());
        assert_eq!(result.normalized.city, "Johns Creek");
    }

    #[test]
    fn test_label_has_tracking_number() {
        let label = MockShippingService::new().purchase_label("rate-123");
        assert!(label.tracking_number.starts_with("1Z"));
        assert!(label.label_url.contains("rate-123"));
    }

    #[test]
    fn test_tracking_echoes_identifiers() {
        let status = MockShippingService::new().track("usps", "1Z0001");
        assert_eq!(status.carrier, "usps");
        assert_eq!(status.tracking_number, "1Z0001");
        assert_eq!(status.status, "TRANSIT");
    }
}
