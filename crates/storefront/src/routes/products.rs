//! Product route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use vitrine_core::{FilteredView, Product, ProductId, SortOption};

use crate::error::{AppError, Result};
use crate::shop::CatalogStatus;
use crate::state::AppState;

/// Search and sort query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    pub q: Option<String>,
    pub sort: Option<String>,
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub catalog: CatalogStatus,
    #[serde(flatten)]
    pub view: FilteredView,
    /// Lets front-ends show a "no results" message without counting.
    pub no_results: bool,
}

/// Reload response.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub catalog: CatalogStatus,
}

/// Parse a product id from a path segment or request body.
pub(crate) fn parse_product_id(raw: &str) -> Result<ProductId> {
    raw.parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid product id: {raw}")))
}

/// Filtered and sorted product listing.
///
/// Unknown sort values fall back to catalog order.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<ProductsResponse>> {
    let sort = query
        .sort
        .as_deref()
        .map_or(SortOption::Default, SortOption::from_param);
    let view = state
        .shop()
        .browse(query.q.unwrap_or_default(), sort)
        .await?;
    let catalog = state.shop().status().await?;

    Ok(Json(ProductsResponse {
        catalog,
        no_results: view.is_empty(),
        view,
    }))
}

/// Product details.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Product>> {
    let id = parse_product_id(&id)?;
    Ok(Json(state.shop().product(id).await?))
}

/// Retry loading the catalog.
#[instrument(skip(state))]
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>> {
    state.shop().reload().await?;
    Ok(Json(ReloadResponse {
        catalog: state.shop().status().await?,
    }))
}
