//! The mock shipping provider through the `ShippingService` dispatch.

use rust_decimal::Decimal;

use refit_shipping::{
    Address, MockShippingService, Parcel, ShippingProviderKind, ShippingService,
};
use refit_integration_tests::seller_shipping_address;

fn service() -> ShippingService {
    ShippingService::Mock(MockShippingService::new())
}

#[tokio::test]
async fn mock_validation_normalizes_without_rejecting() {
    let service = service();
    let validation = service
        .validate_address(&seller_shipping_address())
        .await
        .expect("validation");

    assert!(validation.is_valid);
    assert!(validation.messages.is_empty());
    assert_eq!(validation.normalized.city, "Atlanta");
}

#[tokio::test]
async fn rates_come_back_cheapest_first() {
    let service = service();
    let rates = service
        .get_rates(
            &seller_shipping_address(),
            &Address::refit_warehouse(),
            &Parcel::phone(),
        )
        .await
        .expect("rates");

    assert_eq!(rates.len(), 4);
    for pair in rates.windows(2) {
        assert!(pair[0].amount <= pair[1].amount);
    }

    let cheapest = &rates[0];
    assert_eq!(cheapest.carrier, "USPS");
    assert_eq!(cheapest.amount, Decimal::new(845, 2));
    assert!(rates.iter().all(|r| r.currency == "USD"));
}

#[tokio::test]
async fn rate_ids_are_unique_per_quote() {
    let service = service();
    let from = seller_shipping_address();
    let to = Address::refit_warehouse();
    let parcel = Parcel::phone();

    let first = service.get_rates(&from, &to, &parcel).await.expect("rates");
    let second = service.get_rates(&from, &to, &parcel).await.expect("rates");

    for (a, b) in first.iter().zip(&second) {
        assert_ne!(a.rate_id, b.rate_id);
    }
}

#[tokio::test]
async fn purchased_label_tracks() {
    let service = service();
    let label = service.purchase_label("rate_any").await.expect("label");

    assert!(label.tracking_number.starts_with("1Z"));
    assert_eq!(label.tracking_number.len(), 18);
    assert!(label.cost.is_some());

    let status = service
        .track(&label.carrier, &label.tracking_number)
        .await
        .expect("tracking");
    assert_eq!(status.tracking_number, label.tracking_number);
    assert!(!status.history.is_empty());
}

#[test]
fn wholesale_parcel_scales_with_unit_count() {
    let single = Parcel::wholesale_box(1);
    let bulk = Parcel::wholesale_box(20);
    assert!(bulk.weight > single.weight);

    // Zero units still produces a shippable parcel.
    let empty = Parcel::wholesale_box(0);
    assert_eq!(empty.weight, single.weight);
}

#[test]
fn provider_kind_round_trips_config_values() {
    assert_eq!(
        "mock".parse::<ShippingProviderKind>(),
        Ok(ShippingProviderKind::Mock)
    );
    assert_eq!(
        "shippo".parse::<ShippingProviderKind>(),
        Ok(ShippingProviderKind::Shippo)
    );
    assert!("usps".parse::<ShippingProviderKind>().is_err());
}
