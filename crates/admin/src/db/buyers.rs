//! Buyer repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use refit_core::types::BuyerId;

use super::RepositoryError;
use crate::models::buyer::{Buyer, NewBuyer};

const BUYER_COLUMNS: &str = "id, name, company, email, phone, address, created_at, updated_at";

/// Repository for buyer database operations.
pub struct BuyerRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> BuyerRepository<'a> {
    /// Create a new buyer repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Insert a buyer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewBuyer) -> Result<Buyer, RepositoryError> {
        let address = serde_json::to_value(&new.address)
            .map_err(|e| RepositoryError::DataCorruption(format!("address encode: {e}")))?;

        let row = sqlx::query_as::<_, BuyerRow>(&format!(
            "INSERT INTO buyers (name, company, email, phone, address) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {BUYER_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.company)
        .bind(&new.email)
        .bind(&new.phone)
        .bind(&address)
        .fetch_one(self.pool)
        .await?;

        row.try_into()
    }

    /// Get a buyer by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: BuyerId) -> Result<Option<Buyer>, RepositoryError> {
        let row = sqlx::query_as::<_, BuyerRow>(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers WHERE id = $1"
        ))
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(Buyer::try_from).transpose()
    }

    /// List all buyers, alphabetically.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Buyer>, RepositoryError> {
        let rows = sqlx::query_as::<_, BuyerRow>(&format!(
            "SELECT {BUYER_COLUMNS} FROM buyers ORDER BY name ASC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(Buyer::try_from).collect()
    }
}

#[derive(sqlx::FromRow)]
struct BuyerRow {
    id: i64,
    name: String,
    company: Option<String>,
    email: String,
    phone: Option<String>,
    address: serde_json::Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BuyerRow> for Buyer {
    type Error = RepositoryError;

    fn try_from(row: BuyerRow) -> Result<Self, Self::Error> {
        let address = serde_json::from_value(row.address).map_err(|e| {
            RepositoryError::DataCorruption(format!("buyer {}: bad address: {e}", row.id))
        })?;

        Ok(Self {
            id: BuyerId::new(row.id),
            name: row.name,
            company: row.company,
            email: row.email,
            phone: row.phone,
            address,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
