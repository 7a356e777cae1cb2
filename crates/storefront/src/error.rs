//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures server-side errors to
//! Sentry before responding to the client. All route handlers return
//! `Result<T, AppError>`; the body is a JSON object `{"error": message}` that
//! front-ends show as an error notification.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use vitrine_core::OrderError;

use crate::shop::{CatalogStatus, ShopError};

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A shop command was rejected.
    #[error("Shop error: {0}")]
    Shop(#[from] ShopError),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Shop(err) => match err {
                ShopError::ProductNotFound(_) => StatusCode::NOT_FOUND,
                ShopError::CatalogUnavailable(_) | ShopError::CatalogLoad(_) => {
                    StatusCode::SERVICE_UNAVAILABLE
                }
                ShopError::Order(_) => StatusCode::BAD_REQUEST,
                ShopError::Stopped => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    /// Message safe to show to the shopper.
    fn public_message(&self) -> String {
        match self {
            Self::Shop(err) => match err {
                ShopError::CatalogUnavailable(CatalogStatus::Loading) => {
                    "Products are still loading".to_string()
                }
                ShopError::CatalogUnavailable(_) | ShopError::CatalogLoad(_) => {
                    "Could not load products, please try again".to_string()
                }
                ShopError::Order(OrderError::EmptyCart) => "Your cart is empty".to_string(),
                ShopError::Stopped => "Internal server error".to_string(),
                other => other.to_string(),
            },
            Self::BadRequest(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture server errors to Sentry
        if status.is_server_error() && status != StatusCode::SERVICE_UNAVAILABLE {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        let mut body = json!({ "error": self.public_message() });
        if let Self::Shop(ShopError::CatalogUnavailable(catalog)) = &self {
            body["catalog"] = json!(catalog);
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Add a breadcrumb for shopper actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of cart
/// commands leading up to an error.
pub fn add_breadcrumb(category: &str, message: &str) {
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    });
}
