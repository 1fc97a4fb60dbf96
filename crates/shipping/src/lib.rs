//! ReFit shipping service.
//!
//! One canonical implementation of the shipping capability: address
//! validation, rate shopping, label purchase, and tracking. Two providers
//! sit behind [`ShippingService`]:
//!
//! - [`ShippoClient`] - the production Shippo REST integration
//! - [`MockShippingService`] - deterministic local stand-in for development
//!   and tests
//!
//! The provider is chosen once at startup from configuration
//! (`SHIPPING_PROVIDER=mock|shippo`); callers only ever see
//! `ShippingService`.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod error;
mod mock;
mod shippo;
mod types;

pub use error::ShippingError;
pub use mock::MockShippingService;
pub use shippo::ShippoClient;
pub use types::{
    Address, AddressValidation, Parcel, PurchasedLabel, RateQuote, TrackingEvent, TrackingStatus,
};

use serde::{Deserialize, Serialize};

/// Which provider backs the shipping service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShippingProviderKind {
    /// Deterministic local mock.
    Mock,
    /// Shippo REST API.
    Shippo,
}

impl std::str::FromStr for ShippingProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mock" => Ok(Self::Mock),
            "shippo" => Ok(Self::Shippo),
            other => Err(format!(
                "unknown shipping provider '{other}' (expected 'mock' or 'shippo')"
            )),
        }
    }
}

/// The shipping capability, dispatching to the configured provider.
///
/// Enum dispatch instead of a trait object keeps the async methods plain
/// and the service cheaply cloneable.
#[derive(Clone)]
pub enum ShippingService {
    Shippo(ShippoClient),
    Mock(MockShippingService),
}

impl ShippingService {
    /// The provider kind backing this service.
    #[must_use]
    pub const fn provider(&self) -> ShippingProviderKind {
        match self {
            Self::Shippo(_) => ShippingProviderKind::Shippo,
            Self::Mock(_) => ShippingProviderKind::Mock,
        }
    }

    /// Validate and normalize an address.
    ///
    /// # Errors
    ///
    /// Returns `ShippingError` if the provider request fails. An invalid
    /// address is NOT an error; it comes back as `is_valid: false` with
    /// messages.
    pub async fn validate_address(
        &self,
        address: &Address,
    ) -> Result<AddressValidation, ShippingError> {
        match self {
            Self::Shippo(client) => client.validate_address(address).await,
            Self::Mock(mock) => Ok(mock.validate_address(address)),
        }
    }

    /// Get available rates for a parcel between two addresses, cheapest
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `ShippingError` if the provider request fails or returns no
    /// usable rates.
    pub async fn get_rates(
        &self,
        from: &Address,
        to: &Address,
        parcel: &Parcel,
    ) -> Result<Vec<RateQuote>, ShippingError> {
        match self {
            Self::Shippo(client) => client.get_rates(from, to, parcel).await,
            Self::Mock(mock) => Ok(mock.get_rates()),
        }
    }

    /// Purchase a label for a previously quoted rate.
    ///
    /// # Errors
    ///
    /// Returns `ShippingError::LabelRejected` if the provider declines the
    /// transaction, or a transport error if the request fails.
    pub async fn purchase_label(&self, rate_id: &str) -> Result<PurchasedLabel, ShippingError> {
        match self {
            Self::Shippo(client) => client.purchase_label(rate_id).await,
            Self::Mock(mock) => Ok(mock.purchase_label(rate_id)),
        }
    }

    /// Look up tracking status for a shipment.
    ///
    /// # Errors
    ///
    /// Returns `ShippingError` if the provider request fails.
    pub async fn track(
        &self,
        carrier: &str,
        tracking_number: &str,
    ) -> Result<TrackingStatus, ShippingError> {
        match self {
            Self::Shippo(client) => client.track(carrier, tracking_number).await,
            Self::Mock(mock) => Ok(mock.track(carrier, tracking_number)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_kind_parses() {
        assert_eq!(
            "mock".parse::<ShippingProviderKind>(),
            Ok(ShippingProviderKind::Mock)
        );
        assert_eq!(
            "Shippo".parse::<ShippingProviderKind>(),
            Ok(ShippingProviderKind::Shippo)
        );
        assert!("fedex".parse::<ShippingProviderKind>().is_err());
    }

    #[tokio::test]
    async fn test_enum_dispatch_reports_provider() {
        let service = ShippingService::Mock(MockShippingService::new());
        assert_eq!(service.provider(), ShippingProviderKind::Mock);

        let rates = service
            .get_rates(
                &Address::refit_warehouse(),
                &Address::refit_warehouse(),
                &Parcel::phone(),
            )
            .await
            .expect("mock rates");
        assert!(!rates.is_empty());
    }
}
