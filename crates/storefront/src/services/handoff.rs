//! Checkout hand-off to an external chat application.
//!
//! The store takes orders over chat: checkout produces a deep-link of the form
//! `BASE?phone=NUMBER&text=MESSAGE` that opens a conversation with the order
//! message pre-filled. This service only builds the link; opening it is the
//! front-end's job.

use serde::Serialize;
use url::Url;
use vitrine_core::{Cart, CustomerDetails, OrderError, OrderMessage};

use crate::config::HandoffConfig;

/// The result of a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Handoff {
    /// Plain-text order summary.
    pub message: OrderMessage,
    /// Deep-link carrying the message.
    pub url: Url,
}

/// Builds hand-off links from a cart.
#[derive(Debug, Clone)]
pub struct HandoffService {
    config: HandoffConfig,
}

impl HandoffService {
    #[must_use]
    pub const fn new(config: HandoffConfig) -> Self {
        Self { config }
    }

    /// Build the order message and deep-link for `cart`.
    ///
    /// # Errors
    ///
    /// Returns `OrderError` if the cart is empty or a customer field is blank.
    pub fn prepare(&self, cart: &Cart, customer: CustomerDetails) -> Result<Handoff, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        let customer = customer.validated()?;
        let message = OrderMessage::build(cart, &customer, &self.config.currency_symbol)?;

        let mut url = self.config.base_url.clone();
        url.query_pairs_mut()
            .append_pair("phone", &self.config.phone)
            .append_pair("text", message.as_str());

        Ok(Handoff { message, url })
    }
}
