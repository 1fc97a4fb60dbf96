//! Wholesale buyers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use refit_core::types::BuyerId;
use refit_shipping::Address;

/// A wholesale buyer we invoice and ship refurbished stock to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Buyer {
    pub id: BuyerId,
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    /// Outbound shipping destination.
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a buyer.
#[derive(Debug, Clone, Deserialize)]
pub struct NewBuyer {
    pub name: String,
    #[serde(default)]
    pub company: Option<String>,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub address: Address,
}
