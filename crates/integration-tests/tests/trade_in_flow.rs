//! End-to-end trade-in flow: quote a device, walk the wizard, shop rates
//! and buy a label through the mock shipping provider.

use refit_core::quote::{Condition, IssueCode, calculate_quote};
use refit_core::types::Money;
use refit_core::wizard::{ChosenRate, DeviceSelection, TradeInWizard, WizardStep};
use refit_shipping::{Address, MockShippingService, Parcel, ShippingService};
use refit_integration_tests::{catalog, graded_request, seller_shipping_address, seller_wizard_address};

fn mock_service() -> ShippingService {
    ShippingService::Mock(MockShippingService::new())
}

#[tokio::test]
async fn quote_to_label_happy_path() {
    let catalog = catalog();
    let service = mock_service();

    // Step 1: quote the device.
    let mut request = graded_request("iphone-15-pro", "256GB", Condition::Good);
    request.issues = vec![IssueCode::BackCrack];
    let quote = calculate_quote(&catalog, &request, None).expect("quote");
    assert_eq!(quote.total, Money::from_dollars(450));

    let selection = DeviceSelection {
        model_id: request.model_id.clone(),
        storage: request.storage.clone(),
        carrier: request.carrier,
        condition: request.condition,
        issues: request.issues.clone(),
        accessories: request.accessories,
    };

    let mut wizard = TradeInWizard::new();
    wizard
        .submit_device(selection, quote.clone())
        .expect("device step");
    wizard.accept_quote().expect("quote step");

    // Step 3: validate the address and pick the cheapest rate.
    let validation = service
        .validate_address(&seller_shipping_address())
        .await
        .expect("validation");
    assert!(validation.is_valid);

    let rates = service
        .get_rates(
            &validation.normalized,
            &Address::refit_warehouse(),
            &Parcel::phone(),
        )
        .await
        .expect("rates");
    let cheapest = rates.first().expect("at least one rate").clone();

    wizard
        .submit_shipping(
            seller_wizard_address(),
            ChosenRate {
                rate_id: cheapest.rate_id.clone(),
                carrier: cheapest.carrier.clone(),
                service: cheapest.service.clone(),
                amount: Money::new(cheapest.amount),
            },
        )
        .expect("shipping step");
    assert_eq!(wizard.step(), WizardStep::Payment);

    // Step 4: complete and buy the inbound label.
    let submission = wizard
        .complete("9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin".to_owned())
        .expect("completes");
    assert_eq!(submission.quote.total, Money::from_dollars(450));

    let label = service
        .purchase_label(&submission.rate.rate_id)
        .await
        .expect("label");
    assert!(label.tracking_number.starts_with("1Z"));
    assert!(!label.label_url.is_empty());
}

#[tokio::test]
async fn declined_quote_walks_back_to_device_step() {
    let catalog = catalog();
    let request = graded_request("iphone-14", "128GB", Condition::Fair);
    let quote = calculate_quote(&catalog, &request, None).expect("quote");

    let selection = DeviceSelection {
        model_id: request.model_id.clone(),
        storage: request.storage.clone(),
        carrier: request.carrier,
        condition: request.condition,
        issues: Vec::new(),
        accessories: request.accessories,
    };

    let mut wizard = TradeInWizard::new();
    wizard.submit_device(selection, quote).expect("device step");
    wizard.back().expect("decline");
    assert_eq!(wizard.step(), WizardStep::DeviceInfo);
    assert_eq!(wizard.quote(), None);

    // A fresh selection can go through after declining.
    let request = graded_request("iphone-16-pro", "256GB", Condition::Excellent);
    let quote = calculate_quote(&catalog, &request, None).expect("quote");
    let selection = DeviceSelection {
        model_id: request.model_id.clone(),
        storage: request.storage.clone(),
        carrier: request.carrier,
        condition: request.condition,
        issues: Vec::new(),
        accessories: request.accessories,
    };
    wizard.submit_device(selection, quote).expect("device step");
    assert_eq!(wizard.step(), WizardStep::Quote);
}

#[test]
fn wizard_survives_session_serialization_mid_flow() {
    let catalog = catalog();
    let request = graded_request("iphone-16", "128GB", Condition::Good);
    let quote = calculate_quote(&catalog, &request, None).expect("quote");

    let selection = DeviceSelection {
        model_id: request.model_id.clone(),
        storage: request.storage.clone(),
        carrier: request.carrier,
        condition: request.condition,
        issues: Vec::new(),
        accessories: request.accessories,
    };

    let mut wizard = TradeInWizard::new();
    wizard.submit_device(selection, quote).expect("device step");
    wizard.accept_quote().expect("quote step");

    // The storefront stores the wizard in the session as JSON between
    // requests; a round-trip must land on the same step with the same data.
    let json = serde_json::to_string(&wizard).expect("serialize");
    let mut restored: TradeInWizard = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(restored, wizard);

    restored
        .submit_shipping(
            seller_wizard_address(),
            ChosenRate {
                rate_id: "rate_x".to_owned(),
                carrier: "USPS".to_owned(),
                service: "Priority Mail".to_owned(),
                amount: Money::new(rust_decimal::Decimal::new(845, 2)),
            },
        )
        .expect("shipping step after restore");
    assert_eq!(restored.step(), WizardStep::Payment);
}
