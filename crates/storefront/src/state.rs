//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::StorefrontConfig;
use crate::services::{CatalogLoader, HandoffService};
use crate::shop::{Shop, ShopHandle};
use crate::storage::{FileStore, KeyValueStore, StorageError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The shop itself lives in its
/// own task; handlers talk to it through the [`ShopHandle`].
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    shop: ShopHandle,
}

impl AppState {
    /// Create the application state with a file-backed store in the
    /// configured data directory, and start loading the catalog.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created.
    pub fn new(config: StorefrontConfig) -> Result<Self, StorageError> {
        let store = FileStore::open(&config.data_dir)?;
        Ok(Self::with_store(config, store))
    }

    /// Create the application state over any store.
    pub fn with_store<S: KeyValueStore>(config: StorefrontConfig, store: S) -> Self {
        let shop = Shop::new(store, HandoffService::new(config.handoff.clone()));
        let loader = CatalogLoader::new(config.catalog.clone());
        let shop = ShopHandle::spawn(shop, loader);

        Self {
            inner: Arc::new(AppStateInner { config, shop }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the shop handle.
    #[must_use]
    pub fn shop(&self) -> &ShopHandle {
        &self.inner.shop
    }
}
