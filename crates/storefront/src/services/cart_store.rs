//! Cart persistence under the `cart` key.
//!
//! The cart is written through after every change and read once at startup.
//! Restoring never fails: missing data yields an empty cart, and data that
//! does not parse or breaks a cart invariant is logged and discarded.

use tracing::warn;
use vitrine_core::{Cart, CartLine};

use crate::storage::{KeyValueStore, StorageError};

/// Durable key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Why a stored cart was discarded.
#[derive(Debug, thiserror::Error)]
enum StorageCorrupt {
    #[error("not a JSON array of cart lines: {0}")]
    Shape(#[from] serde_json::Error),
    #[error(transparent)]
    Invariant(#[from] vitrine_core::CartInvariantError),
}

/// Reads and writes the cart through a [`KeyValueStore`].
#[derive(Debug)]
pub struct CartStore<S> {
    store: S,
}

impl<S: KeyValueStore> CartStore<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Write the full cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be encoded or the backend write
    /// fails. Nothing is written in the first case.
    pub fn save(&mut self, cart: &Cart) -> Result<(), StorageError> {
        let json = serde_json::to_string(cart)?;
        self.store.set(CART_KEY, &json)
    }

    /// Read the cart back, falling back to an empty cart.
    ///
    /// String prices left by older writers are coerced to numbers here.
    pub fn restore(&self) -> Cart {
        let raw = match self.store.get(CART_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                warn!(error = %e, "Failed to read stored cart, starting empty");
                return Cart::new();
            }
        };

        match parse_cart(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                warn!(error = %e, "Stored cart is corrupt, starting empty");
                Cart::new()
            }
        }
    }
}

fn parse_cart(raw: &str) -> Result<Cart, StorageCorrupt> {
    let lines: Vec<CartLine> = serde_json::from_str(raw)?;
    Ok(Cart::from_lines(lines)?)
}
