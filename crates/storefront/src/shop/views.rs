//! Display data handed to front-ends after each command.

use serde::Serialize;
use vitrine_core::{Cart, CartLine, ProductId};

/// Whether a notification reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Error,
}

/// A short user-facing message produced by a cart command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Cart line display data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    pub id: ProductId,
    pub name: String,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub subtotal: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id,
            name: line.name.clone(),
            image: line.image.clone(),
            quantity: line.quantity,
            price: line.price.to_string(),
            subtotal: line.subtotal().to_string(),
        }
    }
}

/// Cart display data: lines plus the derived count and total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartSummary {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub item_count_label: String,
    pub total: String,
}

impl CartSummary {
    #[must_use]
    pub fn empty() -> Self {
        Self::from(&Cart::new())
    }
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        let item_count = cart.item_count();
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            item_count,
            item_count_label: item_count_label(item_count),
            total: cart.total().to_string(),
        }
    }
}

/// The state of the cart after a command, and what to tell the shopper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartUpdate {
    /// `None` when the command was a no-op.
    pub notification: Option<Notification>,
    pub cart: CartSummary,
}

/// "1 item" / "3 items".
#[must_use]
pub fn item_count_label(count: u32) -> String {
    if count == 1 {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}
