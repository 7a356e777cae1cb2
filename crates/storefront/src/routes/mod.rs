//! HTTP route handlers for the storefront JSON API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products?q=&sort=      - Filtered/sorted product view
//! POST /products/reload        - Retry the catalog load
//! GET  /products/{id}          - Product details
//!
//! # Cart
//! GET  /cart                   - Cart summary
//! POST /cart/add               - Add one unit ({"product_id"})
//! POST /cart/increase          - Increase quantity ({"product_id"})
//! POST /cart/decrease          - Decrease quantity, removing at zero ({"product_id"})
//! POST /cart/remove            - Remove line ({"product_id"})
//! POST /cart/clear             - Empty the cart
//!
//! # Checkout
//! POST /checkout               - Build the chat hand-off and empty the cart
//! ```

pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/reload", post(products::reload))
        .route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/increase", post(cart::increase))
        .route("/decrease", post(cart::decrease))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", post(checkout::checkout))
}

/// Build the complete application router.
///
/// The widget is embedded in pages served from other origins, so CORS is
/// permissive.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
