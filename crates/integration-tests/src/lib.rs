//! Shared fixtures for the cross-crate integration tests.
//!
//! These tests exercise the library crates together (catalog -> quote ->
//! wizard -> shipping) without a database or network; everything runs
//! against the builtin catalog and the mock shipping provider.

#![cfg_attr(not(test), forbid(unsafe_code))]

use refit_core::catalog::{Carrier, Catalog};
use refit_core::quote::{Accessories, Condition, QuoteRequest};
use refit_core::wizard::WizardAddress;
use refit_shipping::Address;

/// The builtin catalog. Panics are fine here; these are test fixtures.
#[must_use]
pub fn catalog() -> Catalog {
    Catalog::builtin().expect("builtin catalog parses")
}

/// A quote request for a graded device with no issues or accessories.
#[must_use]
pub fn graded_request(model_id: &str, storage: &str, condition: Condition) -> QuoteRequest {
    QuoteRequest {
        model_id: model_id.to_owned(),
        storage: storage.to_owned(),
        carrier: Carrier::Unlocked,
        condition,
        issues: Vec::new(),
        accessories: Accessories::default(),
    }
}

/// A seller address for wizard flows.
#[must_use]
pub fn seller_wizard_address() -> WizardAddress {
    WizardAddress {
        name: "Jordan Seller".to_owned(),
        street1: "100 Main St".to_owned(),
        street2: None,
        city: "Atlanta".to_owned(),
        state: "GA".to_owned(),
        zip: "30301".to_owned(),
        country: "US".to_owned(),
        phone: Some("404-555-0100".to_owned()),
    }
}

/// The same seller address in the shipping crate's schema.
#[must_use]
pub fn seller_shipping_address() -> Address {
    Address {
        name: "Jordan Seller".to_owned(),
        company: None,
        street1: "100 Main St".to_owned(),
        street2: None,
        city: "Atlanta".to_owned(),
        state: "GA".to_owned(),
        zip: "30301".to_owned(),
        country: "US".to_owned(),
        phone: Some("404-555-0100".to_owned()),
        is_default: false,
    }
}
