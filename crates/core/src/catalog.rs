//! The device pricing catalog.
//!
//! Supplier price sheets are merged into a single JSON document embedded at
//! compile time (`data/catalog.json`). A [`Catalog`] indexes phone models by
//! slug and answers the storefront's picker queries: search, storage
//! options, and per-category listings. All prices are wholesale figures;
//! the margin that turns them into customer quotes lives in [`crate::quote`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Money;

/// Maximum number of search results returned.
const MAX_SEARCH_RESULTS: usize = 10;

/// Errors raised while loading a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The JSON document could not be parsed.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two models share the same slug.
    #[error("duplicate model id: {0}")]
    DuplicateModel(String),

    /// The document contained no models.
    #[error("catalog contains no models")]
    Empty,
}

/// Device category. Drives which conditions apply during quoting:
/// graded (excellent/good/fair) for iPhone and Android, simple
/// (working/broken) for Solana phones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Iphone,
    Android,
    Solana,
}

impl Category {
    /// Lowercase wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Iphone => "iphone",
            Self::Android => "android",
            Self::Solana => "solana",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Carrier lock status as listed on the supplier sheet.
///
/// `Unknown` rows price identically either way and match any requested
/// carrier status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LockStatus {
    Unlocked,
    #[serde(rename = "Carrier Locked")]
    CarrierLocked,
    Unknown,
}

/// Carrier lock status as declared by the seller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Carrier {
    Unlocked,
    Locked,
}

impl Carrier {
    /// Lowercase wire representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unlocked => "unlocked",
            Self::Locked => "locked",
        }
    }
}

impl std::fmt::Display for Carrier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LockStatus {
    /// Whether a supplier row applies to the seller's declared carrier status.
    #[must_use]
    pub const fn matches(&self, carrier: Carrier) -> bool {
        matches!(
            (self, carrier),
            (Self::Unknown, _)
                | (Self::Unlocked, Carrier::Unlocked)
                | (Self::CarrierLocked, Carrier::Locked)
        )
    }
}

/// Supplier condition grades, best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SupplierGrade {
    A,
    #[serde(rename = "B+")]
    BPlus,
    B,
    C,
    D,
}

/// Per-variant price data.
///
/// Graded rows carry the supplier grade ladder; Solana phones are bought
/// on a simple working/broken split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceTable {
    /// Working/broken pricing (Solana phones).
    Simple { working: Money, broken: Money },
    /// Grade-ladder pricing (iPhone/Android).
    Graded(BTreeMap<SupplierGrade, Money>),
}

impl PriceTable {
    /// Price for a supplier grade, if this table carries grades.
    #[must_use]
    pub fn grade(&self, grade: SupplierGrade) -> Option<Money> {
        match self {
            Self::Graded(prices) => prices.get(&grade).copied(),
            Self::Simple { .. } => None,
        }
    }
}

/// One purchasable configuration of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    /// Storage tier as printed on the sheet (e.g. "256GB", "1TB").
    pub storage: String,
    /// Carrier lock status of this row.
    pub lock_status: LockStatus,
    /// Wholesale prices.
    pub prices: PriceTable,
}

/// A phone model with all of its priced configurations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhoneModel {
    /// Slug identifier (e.g. "iphone-16-pro-max").
    pub id: String,
    /// Customer-facing name.
    pub display: String,
    /// Manufacturer.
    pub brand: String,
    /// Device category.
    pub category: Category,
    /// Priced configurations.
    pub variants: Vec<Variant>,
}

impl PhoneModel {
    /// Find the variant matching a storage tier and declared carrier status.
    #[must_use]
    pub fn variant(&self, storage: &str, carrier: Carrier) -> Option<&Variant> {
        self.variants
            .iter()
            .find(|v| v.storage == storage && v.lock_status.matches(carrier))
    }
}

/// Compact model listing for pickers and search results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub id: String,
    pub display: String,
    pub brand: String,
    pub category: Category,
}

impl From<&PhoneModel> for ModelSummary {
    fn from(model: &PhoneModel) -> Self {
        Self {
            id: model.id.clone(),
            display: model.display.clone(),
            brand: model.brand.clone(),
            category: model.category,
        }
    }
}

/// On-disk catalog document.
#[derive(Debug, Deserialize)]
struct CatalogDocument {
    models: Vec<PhoneModel>,
}

/// The full pricing catalog, indexed by model slug.
#[derive(Debug, Clone)]
pub struct Catalog {
    models: BTreeMap<String, PhoneModel>,
}

impl Catalog {
    /// Parse a catalog from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the JSON is malformed, empty, or contains
    /// duplicate model slugs.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(json)?;
        if doc.models.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut models = BTreeMap::new();
        for model in doc.models {
            let id = model.id.clone();
            if models.insert(id.clone(), model).is_some() {
                return Err(CatalogError::DuplicateModel(id));
            }
        }
        Ok(Self { models })
    }

    /// Load the catalog embedded in this crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the embedded data is malformed; covered by
    /// tests, so this only fires on a bad data edit.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(include_str!("../data/catalog.json"))
    }

    /// Look up a model by slug.
    #[must_use]
    pub fn model(&self, id: &str) -> Option<&PhoneModel> {
        self.models.get(id)
    }

    /// Number of models in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// True if the catalog holds no models. Construction rejects this, so
    /// only reachable on a manually built empty map.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Iterate over all models.
    pub fn iter(&self) -> impl Iterator<Item = &PhoneModel> {
        self.models.values()
    }

    /// Search models by normalized substring match on slug or display name.
    ///
    /// Queries under two characters return nothing. Results are capped at
    /// ten, in slug order.
    #[must_use]
    pub fn search(&self, query: &str, category: Option<Category>) -> Vec<ModelSummary> {
        if query.trim().len() < 2 {
            return Vec::new();
        }
        let needle = normalize(query);

        self.models
            .values()
            .filter(|m| category.is_none_or(|c| m.category == c))
            .filter(|m| m.id.contains(&needle) || normalize(&m.display).contains(&needle))
            .map(ModelSummary::from)
            .take(MAX_SEARCH_RESULTS)
            .collect()
    }

    /// Deduplicated storage options for a model, sorted smallest first.
    #[must_use]
    pub fn storage_options(&self, model_id: &str) -> Vec<String> {
        let Some(model) = self.models.get(model_id) else {
            return Vec::new();
        };

        let mut options: Vec<String> = Vec::new();
        for variant in &model.variants {
            if !options.contains(&variant.storage) {
                options.push(variant.storage.clone());
            }
        }
        options.sort_by_key(|s| storage_sort_key(s));
        options
    }

    /// All models grouped by category, sorted by display name.
    #[must_use]
    pub fn models_by_category(&self) -> BTreeMap<Category, Vec<ModelSummary>> {
        let mut grouped: BTreeMap<Category, Vec<ModelSummary>> = BTreeMap::new();
        for model in self.models.values() {
            grouped
                .entry(model.category)
                .or_default()
                .push(ModelSummary::from(model));
        }
        for summaries in grouped.values_mut() {
            summaries.sort_by(|a, b| a.display.cmp(&b.display));
        }
        grouped
    }
}

/// Normalize a query or display name for matching: lowercase, spaces to
/// hyphens.
fn normalize(s: &str) -> String {
    s.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// Sort key for storage tiers: "1TB" sorts after "512GB".
fn storage_sort_key(storage: &str) -> u64 {
    let digits: String = storage.chars().take_while(char::is_ascii_digit).collect();
    let value = digits.parse::<u64>().unwrap_or(0);
    if storage.to_uppercase().contains("TB") {
        value * 1024
    } else {
        value
    }
}
