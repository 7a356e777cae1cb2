//! Vitrine storefront library.
//!
//! Owns the catalog, the current view and the cart behind a single-task
//! [`shop::ShopHandle`], persists the cart to a key-value store, and exposes
//! it all as a JSON API.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod routes;
pub mod services;
pub mod shop;
pub mod state;
pub mod storage;
