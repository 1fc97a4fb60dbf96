//! Catalog browsing and search endpoints.

use std::collections::BTreeMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use refit_core::catalog::{Category, ModelSummary, PhoneModel};

use crate::error::{AppError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub category: Option<Category>,
}

/// `GET /api/catalog/models` - all models grouped by category, or a flat
/// list when `?category=` is given.
pub async fn list_models(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Json<BTreeMap<Category, Vec<ModelSummary>>> {
    let mut grouped = state.catalog().models_by_category();
    if let Some(category) = params.category {
        grouped.retain(|c, _| *c == category);
    }
    Json(grouped)
}

/// `GET /api/catalog/models/{id}` - model detail with all variants.
pub async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PhoneModel>> {
    state
        .catalog()
        .model(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("model {id}")))
}

/// `GET /api/catalog/models/{id}/storage` - deduped storage tiers, sorted
/// numerically.
pub async fn storage_options(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<String>>> {
    if state.catalog().model(&id).is_none() {
        return Err(AppError::NotFound(format!("model {id}")));
    }
    Ok(Json(state.catalog().storage_options(&id)))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub category: Option<Category>,
}

/// `GET /api/catalog/search?q=` - normalized substring search, max 10.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<ModelSummary>> {
    Json(state.catalog().search(&params.q, params.category))
}
