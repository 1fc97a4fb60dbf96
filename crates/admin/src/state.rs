//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use refit_shipping::{
    MockShippingService, ShippingError, ShippingProviderKind, ShippingService, ShippoClient,
};

use crate::config::AdminConfig;

/// Error assembling application state at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("shipping error: {0}")]
    Shipping(#[from] ShippingError),
    #[error("SHIPPO_API_KEY is required when SHIPPING_PROVIDER=shippo")]
    MissingShippoKey,
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    shipping: ShippingService,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Errors
    ///
    /// Returns an error if the Shippo client cannot be constructed.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, StateError> {
        let shipping = create_shipping_service(&config)?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shipping,
            }),
        })
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the shipping service.
    #[must_use]
    pub fn shipping(&self) -> &ShippingService {
        &self.inner.shipping
    }
}

/// Construct the shipping service from configuration.
fn create_shipping_service(config: &AdminConfig) -> Result<ShippingService, StateError> {
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
