//! Cart lines and the rules that keep them consistent.
//!
//! The cart holds at most one line per product id, in first-add order, and
//! never exposes a line with quantity zero. These rules live here so that
//! every front-end gets them for free; persisting the cart after a change is
//! the caller's job.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;
use crate::types::{Price, ProductId};

/// One product's entry in the cart.
///
/// The name, price and image are a snapshot of the product taken when it was
/// first added.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub image: String,
    pub quantity: u32,
}

impl CartLine {
    fn from_product(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
        }
    }

    /// `price × quantity`.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// What [`Cart::add`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// A new line was appended.
    Added,
    /// An existing line's quantity went up by one.
    Incremented,
}

/// What [`Cart::decrease`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecreaseOutcome {
    /// The line is still there with this quantity.
    Decremented(u32),
    /// The quantity reached zero and the line was dropped.
    Removed(CartLine),
}

/// Reasons a deserialized cart cannot be trusted.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartInvariantError {
    #[error("line for product {0} has quantity 0")]
    ZeroQuantity(ProductId),
    #[error("product {0} appears in more than one line")]
    DuplicateLine(ProductId),
}

/// Ordered cart lines, serialized as a plain JSON array.
///
/// Not `Deserialize`: outside data enters through [`Cart::from_lines`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Build a cart from lines that came from outside (storage, tests).
    ///
    /// # Errors
    ///
    /// Returns an error if a line has quantity zero or a product id repeats.
    pub fn from_lines(lines: Vec<CartLine>) -> Result<Self, CartInvariantError> {
        let mut seen = HashSet::with_capacity(lines.len());
        for line in &lines {
            if line.quantity == 0 {
                return Err(CartInvariantError::ZeroQuantity(line.id));
            }
            if !seen.insert(line.id) {
                return Err(CartInvariantError::DuplicateLine(line.id));
            }
        }
        Ok(Self { lines })
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.id == id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Sum of quantities across lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines
            .iter()
            .fold(0, |count: u32, line| count.saturating_add(line.quantity))
    }

    /// Sum of `price × quantity` across lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    /// Add one unit of `product`.
    pub fn add(&mut self, product: &Product) -> AddOutcome {
        if let Some(line) = self.line_mut(product.id) {
            line.quantity = line.quantity.saturating_add(1);
            AddOutcome::Incremented
        } else {
            self.lines.push(CartLine::from_product(product));
            AddOutcome::Added
        }
    }

    /// Add one unit to an existing line. Returns the new quantity, or `None`
    /// if the product is not in the cart.
    pub fn increase(&mut self, id: ProductId) -> Option<u32> {
        let line = self.line_mut(id)?;
        line.quantity = line.quantity.saturating_add(1);
        Some(line.quantity)
    }

    /// Take one unit off an existing line, dropping it at zero. Returns `None`
    /// if the product is not in the cart.
    pub fn decrease(&mut self, id: ProductId) -> Option<DecreaseOutcome> {
        let line = self.line_mut(id)?;
        if line.quantity > 1 {
            line.quantity -= 1;
            return Some(DecreaseOutcome::Decremented(line.quantity));
        }
        self.remove(id).map(DecreaseOutcome::Removed)
    }

    /// Drop the line for `id`, returning it if it existed.
    pub fn remove(&mut self, id: ProductId) -> Option<CartLine> {
        let index = self.lines.iter().position(|line| line.id == id)?;
        Some(self.lines.remove(index))
    }

    /// Empty the cart. Returns `false` if it was already empty.
    pub fn clear(&mut self) -> bool {
        if self.lines.is_empty() {
            return false;
        }
        self.lines.clear();
        true
    }

    fn line_mut(&mut self, id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| line.id == id)
    }
}
