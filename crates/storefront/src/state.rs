//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use refit_core::catalog::{Catalog, CatalogError};
use refit_shipping::{
    MockShippingService, ShippingError, ShippingProviderKind, ShippingService, ShippoClient,
};

use crate::config::StorefrontConfig;

/// Error assembling application state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("shipping error: {0}")]
    Shipping(#[from] ShippingError),
    #[error("SHIPPO_API_KEY is required when SHIPPING_PROVIDER=shippo")]
    MissingShippoKey,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    catalog: Catalog,
    shipping: ShippingService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// Parses the embedded device catalog and constructs the shipping
    /// service from the configured provider.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog fails to parse or the Shippo client
    /// cannot be constructed.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let catalog = Catalog::builtin()?;
        let shipping = create_shipping_service(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                catalog,
                shipping,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the device catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the shipping service.
    #[must_use]
    pub fn shipping(&self) -> &ShippingService {
        &self.inner.shipping
    }
}

/// Construct the shipping service from configuration.
fn create_shipping_service(config: &StorefrontConfig) -> Result<ShippingService, StateError> {
    match config.shipping.provider {
        ShippingProviderKind::Mock => Ok(ShippingService::Mock(MockShippingService::new())),
        ShippingProviderKind::Shippo => {
            let api_key = config
                .shipping
                .shippo_api_key
                .as_ref()
                .ok_or(StateError::MissingShippoKey)?;
            Ok(ShippingService::Shippo(ShippoClient::new(api_key)?))
        }
    }
}
