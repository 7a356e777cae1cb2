//! Vitrine Core - Shared catalog and cart library.
//!
//! This crate provides the state that every Vitrine front-end works with:
//! - `storefront` - JSON API and the actor that owns the shop state
//! - `cli` - Command-line front-end over the same state manager
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no storage
//! access, no HTTP clients. Loading, persistence and hand-off live in the
//! storefront crate.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for product IDs and prices
//! - [`catalog`] - Products, the catalog and its filtered/sorted view
//! - [`cart`] - Cart lines and the cart mutation rules
//! - [`order`] - Customer details and the checkout message

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod catalog;
pub mod order;
pub mod types;

pub use cart::{AddOutcome, Cart, CartInvariantError, CartLine, DecreaseOutcome};
pub use catalog::{Catalog, CatalogError, FilteredView, Product, SortOption, apply_view};
pub use order::{CustomerDetails, CustomerField, OrderError, OrderMessage};
pub use types::*;
