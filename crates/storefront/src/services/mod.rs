//! I/O services the shop state manager depends on.
//!
//! # Services
//!
//! - `catalog_loader` - Fetch and parse the catalog document (file or HTTP)
//! - `cart_store` - Persist and restore the cart under the `cart` key
//! - `handoff` - Build the chat deep-link that carries the order message

pub mod cart_store;
pub mod catalog_loader;
pub mod handoff;

pub use cart_store::{CART_KEY, CartStore};
pub use catalog_loader::{CatalogLoader, LoadError};
pub use handoff::{Handoff, HandoffService};
