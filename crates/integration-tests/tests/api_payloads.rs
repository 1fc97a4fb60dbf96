//! JSON wire contracts the storefront and admin APIs rely on.
//!
//! Money always crosses the wire as a decimal string, enums as snake_case
//! strings; clients depend on both.

use rust_decimal::Decimal;
use serde_json::{Value, json};

use refit_core::quote::{QuoteRequest, calculate_quote};
use refit_integration_tests::catalog;

#[test]
fn quote_request_accepts_storefront_payload() {
    let payload = json!({
        "model_id": "iphone-15-pro",
        "storage": "256GB",
        "carrier": "unlocked",
        "condition": "good",
        "issues": ["back_crack", "battery_message"],
        "accessories": {"charger": true}
    });

    let request: QuoteRequest = serde_json::from_value(payload).expect("deserialize");
    assert_eq!(request.issues.len(), 2);
    assert!(request.accessories.charger);
    assert!(!request.accessories.original_box);

    let quote = calculate_quote(&catalog(), &request, None).expect("quote");
    assert_eq!(quote.line_items.len(), 3);
}

#[test]
fn quote_response_serializes_money_as_strings() {
    let request: QuoteRequest = serde_json::from_value(json!({
        "model_id": "iphone-15-pro",
        "storage": "256GB",
        "carrier": "unlocked",
        "condition": "good"
    }))
    .expect("deserialize");

    let quote =
        calculate_quote(&catalog(), &request, Some(Decimal::from(180))).expect("quote");
    let body = serde_json::to_value(&quote).expect("serialize");

    assert_eq!(body["total"], Value::String("600".to_owned()));
    assert_eq!(body["base_value"], Value::String("600".to_owned()));
    assert_eq!(body["category"], Value::String("iphone".to_owned()));
    assert_eq!(body["confidence"], Value::String("high".to_owned()));
    // SOL payout keeps three decimal places.
    assert_eq!(body["sol_amount"], Value::String("3.333".to_owned()));
}

#[test]
fn quote_request_rejects_unknown_issue_codes() {
    let payload = json!({
        "model_id": "iphone-15-pro",
        "storage": "256GB",
        "carrier": "unlocked",
        "condition": "good",
        "issues": ["bent_frame"]
    });

    assert!(serde_json::from_value::<QuoteRequest>(payload).is_err());
}

#[test]
fn minimal_payload_defaults_issues_and_accessories() {
    let payload = json!({
        "model_id": "saga",
        "storage": "512GB",
        "carrier": "unlocked",
        "condition": "working"
    });

    let request: QuoteRequest = serde_json::from_value(payload).expect("deserialize");
    assert!(request.issues.is_empty());
    assert!(!request.accessories.charger);
}
