//! Cart route handlers.
//!
//! Every mutating route answers with the refreshed cart summary (lines, item
//! count, total) plus the notification to show, so front-ends can repaint
//! from a single response. No-op commands answer with `"notification": null`.

use axum::{Json, extract::State};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb};
use crate::routes::products::parse_product_id;
use crate::shop::{CartCommand, CartSummary, CartUpdate};
use crate::state::AppState;

/// Body of the per-line cart commands.
///
/// `product_id` may be sent as a number or a string, since front-ends often
/// read it from a `data-id` attribute.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub product_id: serde_json::Value,
}

impl ProductForm {
    fn raw_id(&self) -> String {
        match &self.product_id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

async fn run(state: &AppState, command: CartCommand) -> Result<Json<CartUpdate>> {
    let update = state.shop().apply(command).await?;
    if let Some(notification) = &update.notification {
        add_breadcrumb("cart", &notification.message);
    }
    Ok(Json(update))
}

async fn run_for_product(
    state: &AppState,
    form: &ProductForm,
    command: fn(vitrine_core::ProductId) -> CartCommand,
) -> Result<Json<CartUpdate>> {
    let id = parse_product_id(&form.raw_id())?;
    run(state, command(id)).await
}

/// Display cart summary.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> Result<Json<CartSummary>> {
    Ok(Json(state.shop().cart().await?))
}

/// Add one unit of a catalog product.
#[instrument(skip(state))]
pub async fn add(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<Json<CartUpdate>> {
    run_for_product(&state, &form, CartCommand::Add).await
}

/// Increase a line's quantity.
#[instrument(skip(state))]
pub async fn increase(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<Json<CartUpdate>> {
    run_for_product(&state, &form, CartCommand::Increase).await
}

/// Decrease a line's quantity, removing it at zero.
#[instrument(skip(state))]
pub async fn decrease(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<Json<CartUpdate>> {
    run_for_product(&state, &form, CartCommand::Decrease).await
}

/// Remove a line.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Json(form): Json<ProductForm>,
) -> Result<Json<CartUpdate>> {
    run_for_product(&state, &form, CartCommand::Remove).await
}

/// Empty the cart.
#[instrument(skip(state))]
pub async fn clear(State(state): State<AppState>) -> Result<Json<CartUpdate>> {
    run(&state, CartCommand::Clear).await
}
