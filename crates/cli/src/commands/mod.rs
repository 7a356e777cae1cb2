//! CLI command implementations.
//!
//! Each invocation builds a [`Shop`] over the file-backed store in
//! `VITRINE_DATA_DIR`, runs one command against it and exits. Commands that
//! need product data load the catalog first.

pub mod cart;
pub mod catalog;
pub mod checkout;

use thiserror::Error;
use tracing::info;
use vitrine_storefront::config::{ConfigError, StorefrontConfig};
use vitrine_storefront::services::{CatalogLoader, HandoffService};
use vitrine_storefront::shop::{CartSummary, Notification, Shop, ShopError};
use vitrine_storefront::storage::{FileStore, KeyValueStore, StorageError};

/// Errors surfaced to the terminal.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Shop(#[from] ShopError),

    #[error("cart change was not saved: {0}")]
    Unsaved(#[source] StorageError),

    #[error("hand-off link withheld, the emptied cart could not be saved: {0}")]
    CheckoutUnsaved(#[source] StorageError),
}

/// A shop plus the currency symbol used when printing prices.
pub struct Session<S = FileStore> {
    pub shop: Shop<S>,
    pub currency: String,
}

impl<S: KeyValueStore> Session<S> {
    /// Fail if the latest cart change did not reach the store.
    pub fn ensure_saved(&mut self) -> Result<(), CommandError> {
        self.shop
            .take_write_error()
            .map_or(Ok(()), |e| Err(CommandError::Unsaved(e)))
    }
}

/// Open the shop without touching the catalog source.
pub fn open() -> Result<Session, CommandError> {
    let config = StorefrontConfig::from_env()?;
    let store = FileStore::open(&config.data_dir)?;
    let currency = config.handoff.currency_symbol.clone();
    let shop = Shop::new(store, HandoffService::new(config.handoff));
    Ok(Session { shop, currency })
}

/// Open the shop and load the catalog.
pub async fn open_with_catalog() -> Result<Session, CommandError> {
    let config = StorefrontConfig::from_env()?;
    let store = FileStore::open(&config.data_dir)?;
    let currency = config.handoff.currency_symbol.clone();
    let loader = CatalogLoader::new(config.catalog);
    let mut shop = Shop::new(store, HandoffService::new(config.handoff));

    shop.begin_load();
    shop.finish_load(loader.load().await)?;
    Ok(Session { shop, currency })
}

/// Log a notification, or a note that nothing changed.
pub fn report(notification: Option<Notification>) {
    match notification {
        Some(notification) => info!("{}", notification.message),
        None => info!("Nothing to do"),
    }
}

/// Log the cart lines and total.
pub fn print_cart(summary: &CartSummary, currency: &str) {
    if summary.lines.is_empty() {
        info!("Cart is empty");
        return;
    }
    for line in &summary.lines {
        info!(
            "{:>4}  {} (x{})  {currency} {}",
            line.id, line.name, line.quantity, line.subtotal
        );
    }
    info!(
        "{}, total {currency} {}",
        summary.item_count_label, summary.total
    );
}
