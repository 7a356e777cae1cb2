//! Checkout route handler.

use axum::{Json, extract::State};
use tracing::instrument;
use vitrine_core::CustomerDetails;

use crate::error::{Result, add_breadcrumb};
use crate::services::Handoff;
use crate::state::AppState;

/// Build the order message and hand-off link, then empty the cart.
///
/// The front-end opens the returned `url`; the store never sends the
/// message itself.
#[instrument(skip(state, customer))]
pub async fn checkout(
    State(state): State<AppState>,
    Json(customer): Json<CustomerDetails>,
) -> Result<Json<Handoff>> {
    let handoff = state.shop().checkout(customer).await?;
    add_breadcrumb("checkout", "Order handed off");
    Ok(Json(handoff))
}
