//! The catalog/cart state manager.
//!
//! [`Shop`] owns the catalog, the cart and the current search/sort state. All
//! changes go through its methods, and every cart change is written through to
//! durable storage before the method returns. It is synchronous and meant to
//! have exactly one owner; the HTTP server wraps it in a [`ShopHandle`] actor,
//! the CLI drives it directly.

mod handle;
mod views;

pub use handle::ShopHandle;
pub use views::{
    CartLineView, CartSummary, CartUpdate, Notification, NotificationKind, item_count_label,
};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};
use vitrine_core::{
    AddOutcome, Cart, Catalog, CustomerDetails, DecreaseOutcome, FilteredView, OrderError,
    Product, ProductId, SortOption, apply_view,
};

use crate::services::{CartStore, Handoff, HandoffService, LoadError};
use crate::storage::{KeyValueStore, StorageError};

/// Where the catalog is in its one-time load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CatalogStatus {
    /// The loader has not answered yet.
    Loading,
    /// The catalog is available.
    Ready { products: usize },
    /// The load failed and no catalog is available; a reload may fix it.
    Failed { reason: String },
}

/// Errors returned by shop commands. None of them leave the shop unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShopError {
    /// No product with this id in the catalog.
    #[error("Product not found")]
    ProductNotFound(ProductId),

    /// The catalog is still loading or failed to load.
    #[error("Catalog unavailable")]
    CatalogUnavailable(CatalogStatus),

    /// The catalog loader failed.
    #[error("Failed to load catalog: {0}")]
    CatalogLoad(String),

    /// Checkout was rejected.
    #[error(transparent)]
    Order(#[from] OrderError),

    /// The task owning the shop has stopped.
    #[error("Shop is not running")]
    Stopped,
}

/// A cart change requested by a front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartCommand {
    Add(ProductId),
    Increase(ProductId),
    Decrease(ProductId),
    Remove(ProductId),
    Clear,
}

/// The catalog/cart state manager.
pub struct Shop<S> {
    catalog: Catalog,
    status: CatalogStatus,
    cart: Cart,
    query: String,
    sort: SortOption,
    view: FilteredView,
    store: CartStore<S>,
    handoff: HandoffService,
    write_error: Option<StorageError>,
}

impl<S: KeyValueStore> Shop<S> {
    /// Create a shop with an empty catalog, restoring the cart from `store`.
    pub fn new(store: S, handoff: HandoffService) -> Self {
        let store = CartStore::new(store);
        let cart = store.restore();
        info!(
            lines = cart.lines().len(),
            items = cart.item_count(),
            "Cart restored"
        );

        Self {
            catalog: Catalog::default(),
            status: CatalogStatus::Loading,
            cart,
            query: String::new(),
            sort: SortOption::Default,
            view: FilteredView::default(),
            store,
            handoff,
            write_error: None,
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Mark a (re)load as started. A catalog that is already loaded stays
    /// browsable while the reload runs.
    pub fn begin_load(&mut self) {
        if !matches!(self.status, CatalogStatus::Ready { .. }) {
            self.status = CatalogStatus::Loading;
        }
    }

    /// Apply the loader's result.
    ///
    /// On success the catalog is replaced and the view recomputed. On failure
    /// a previously loaded catalog is kept; otherwise the status becomes
    /// [`CatalogStatus::Failed`].
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::CatalogLoad`] if the loader failed.
    pub fn finish_load(&mut self, result: Result<Catalog, LoadError>) -> Result<usize, ShopError> {
        match result {
            Ok(catalog) => {
                let count = catalog.len();
                self.catalog = catalog;
                self.status = CatalogStatus::Ready { products: count };
                self.refresh_view();
                info!(products = count, "Catalog loaded");
                Ok(count)
            }
            Err(e) => {
                let reason = e.to_string();
                if matches!(self.status, CatalogStatus::Ready { .. }) {
                    warn!(error = %reason, "Catalog reload failed, keeping previous catalog");
                } else {
                    error!(error = %reason, "Catalog load failed");
                    self.status = CatalogStatus::Failed {
                        reason: reason.clone(),
                    };
                }
                Err(ShopError::CatalogLoad(reason))
            }
        }
    }

    #[must_use]
    pub const fn status(&self) -> &CatalogStatus {
        &self.status
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    fn ensure_ready(&self) -> Result<(), ShopError> {
        match self.status {
            CatalogStatus::Ready { .. } => Ok(()),
            _ => Err(ShopError::CatalogUnavailable(self.status.clone())),
        }
    }

    /// Look up a product for its details view.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::CatalogUnavailable`] before the catalog is loaded
    /// and [`ShopError::ProductNotFound`] for unknown ids.
    pub fn product(&self, id: ProductId) -> Result<&Product, ShopError> {
        self.ensure_ready()?;
        self.catalog.find(id).ok_or(ShopError::ProductNotFound(id))
    }

    // =========================================================================
    // Search and sort
    // =========================================================================

    /// Change the search query and recompute the view.
    pub fn set_search_query(&mut self, query: &str) {
        query.trim().clone_into(&mut self.query);
        self.refresh_view();
    }

    /// Change the sort option and recompute the view.
    pub fn set_sort_option(&mut self, sort: SortOption) {
        self.sort = sort;
        self.refresh_view();
    }

    /// The current filtered/sorted view.
    #[must_use]
    pub const fn view(&self) -> &FilteredView {
        &self.view
    }

    /// Set query and sort together and return the resulting view.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::CatalogUnavailable`] before the catalog is loaded.
    pub fn browse(&mut self, query: &str, sort: SortOption) -> Result<&FilteredView, ShopError> {
        self.ensure_ready()?;
        query.trim().clone_into(&mut self.query);
        self.sort = sort;
        self.refresh_view();
        Ok(&self.view)
    }

    fn refresh_view(&mut self) {
        self.view = apply_view(&self.catalog, &self.query, self.sort);
    }

    // =========================================================================
    // Cart
    // =========================================================================

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    #[must_use]
    pub fn summary(&self) -> CartSummary {
        CartSummary::from(&self.cart)
    }

    /// Run a cart command and report the resulting cart.
    ///
    /// # Errors
    ///
    /// Only [`CartCommand::Add`] can fail; see [`Shop::add_to_cart`].
    pub fn apply(&mut self, command: CartCommand) -> Result<CartUpdate, ShopError> {
        let notification = match command {
            CartCommand::Add(id) => Some(self.add_to_cart(id)?),
            CartCommand::Increase(id) => self.increase_quantity(id),
            CartCommand::Decrease(id) => self.decrease_quantity(id),
            CartCommand::Remove(id) => self.remove_from_cart(id),
            CartCommand::Clear => self.clear_cart(),
        };

        Ok(CartUpdate {
            notification,
            cart: self.summary(),
        })
    }

    /// Add one unit of a catalog product.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::CatalogUnavailable`] before the catalog is loaded
    /// and [`ShopError::ProductNotFound`] for unknown ids. The cart is left
    /// untouched in both cases.
    pub fn add_to_cart(&mut self, id: ProductId) -> Result<Notification, ShopError> {
        self.ensure_ready()?;
        let product = self
            .catalog
            .find(id)
            .ok_or(ShopError::ProductNotFound(id))?;

        let message = match self.cart.add(product) {
            AddOutcome::Added => format!("{} added to cart", product.name),
            AddOutcome::Incremented => format!("Quantity of {} increased", product.name),
        };
        self.persist();
        Ok(Notification::success(message))
    }

    /// Add one unit to a line already in the cart. No-op for unknown ids.
    pub fn increase_quantity(&mut self, id: ProductId) -> Option<Notification> {
        self.cart.increase(id)?;
        self.persist();
        let name = self.line_name(id);
        Some(Notification::success(format!("Quantity of {name} increased")))
    }

    /// Take one unit off a line, removing it at zero. No-op for unknown ids.
    pub fn decrease_quantity(&mut self, id: ProductId) -> Option<Notification> {
        let outcome = self.cart.decrease(id)?;
        self.persist();
        let message = match outcome {
            DecreaseOutcome::Decremented(_) => {
                format!("Quantity of {} decreased", self.line_name(id))
            }
            DecreaseOutcome::Removed(line) => format!("{} removed from cart", line.name),
        };
        Some(Notification::success(message))
    }

    /// Remove a line. No-op for unknown ids.
    pub fn remove_from_cart(&mut self, id: ProductId) -> Option<Notification> {
        let line = self.cart.remove(id)?;
        self.persist();
        Some(Notification::success(format!(
            "{} removed from cart",
            line.name
        )))
    }

    /// Empty the cart. An already-empty cart is not written again.
    pub fn clear_cart(&mut self) -> Option<Notification> {
        if !self.cart.clear() {
            return None;
        }
        self.persist();
        Some(Notification::success("Cart emptied"))
    }

    /// Build the hand-off for the current cart, then empty the cart.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Order`] if the cart is empty or a customer field is
    /// blank; the cart is left untouched.
    pub fn checkout(&mut self, customer: CustomerDetails) -> Result<Handoff, ShopError> {
        let handoff = self.handoff.prepare(&self.cart, customer)?;
        info!(
            items = self.cart.item_count(),
            total = %self.cart.total(),
            "Order handed off"
        );
        self.clear_cart();
        Ok(handoff)
    }

    /// The underlying durable store.
    pub const fn store(&self) -> &S {
        self.store.store()
    }

    fn line_name(&self, id: ProductId) -> String {
        self.cart
            .line(id)
            .map(|line| line.name.clone())
            .unwrap_or_default()
    }

    /// Take the failure from the latest cart write, if it failed.
    ///
    /// Commands still succeed when a write fails; callers that need the
    /// change to be durable check here afterwards.
    pub const fn take_write_error(&mut self) -> Option<StorageError> {
        self.write_error.take()
    }

    fn persist(&mut self) {
        match self.store.save(&self.cart) {
            Ok(()) => self.write_error = None,
            Err(e) => {
                error!(error = %e, "Failed to persist cart");
                self.write_error = Some(e);
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::HandoffConfig;
    use crate::services::CART_KEY;
    use crate::storage::MemoryStore;
    use vitrine_core::{CustomerField, Price};

    fn product(id: i32, name: &str, cents: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::from_cents(cents),
            image: format!("img/{id}.jpg"),
        }
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            product(1, "Arte 1", 1090),
            product(2, "Arte 2", 1590),
            product(3, "Quadro", 2190),
            product(4, "Moldura", 2990),
        ])
        .unwrap()
    }

    fn handoff() -> HandoffService {
        HandoffService::new(HandoffConfig {
            base_url: url::Url::parse("https://api.whatsapp.com/send").unwrap(),
            phone: "5583981374944".to_string(),
            currency_symbol: "R$".to_string(),
        })
    }

    fn shop_with(store: MemoryStore) -> Shop<MemoryStore> {
        let mut shop = Shop::new(store, handoff());
        shop.finish_load(Ok(catalog())).unwrap();
        shop
    }

    fn shop() -> Shop<MemoryStore> {
        shop_with(MemoryStore::new())
    }

    fn stored_cart(shop: &Shop<MemoryStore>) -> String {
        use crate::storage::KeyValueStore;
        shop.store().get(CART_KEY).unwrap().unwrap()
    }

    fn customer() -> CustomerDetails {
        CustomerDetails {
            name: "Ana".to_string(),
            phone: "83 99999-0000".to_string(),
            address: "Rua A, 1".to_string(),
        }
    }

    #[test]
    fn test_add_add_remove_scenario() {
        let mut shop = shop();
        let id = ProductId::new(1);

        let update = shop.apply(CartCommand::Add(id)).unwrap();
        assert_eq!(update.cart.item_count, 1);
        assert_eq!(update.cart.total, "10.90");
        assert_eq!(
            update.notification.unwrap().message,
            "Arte 1 added to cart"
        );

        let update = shop.apply(CartCommand::Add(id)).unwrap();
        assert_eq!(update.cart.item_count, 2);
        assert_eq!(update.cart.total, "21.80");
        assert_eq!(update.cart.lines.len(), 1);

        let update = shop.apply(CartCommand::Remove(id)).unwrap();
        assert_eq!(update.cart.item_count, 0);
        assert!(shop.cart().is_empty());
        assert_eq!(stored_cart(&shop), "[]");
    }

    #[test]
    fn test_add_unknown_product_is_noop() {
        let mut shop = shop();
        let err = shop.add_to_cart(ProductId::new(99)).unwrap_err();
        assert_eq!(err, ShopError::ProductNotFound(ProductId::new(99)));
        assert_eq!(err.to_string(), "Product not found");
        assert!(shop.cart().is_empty());
        assert_eq!(shop.store().writes(), 0);
    }

    #[test]
    fn test_add_before_catalog_loads() {
        let mut shop = Shop::new(MemoryStore::new(), handoff());
        assert_eq!(shop.status(), &CatalogStatus::Loading);
        assert!(matches!(
            shop.add_to_cart(ProductId::new(1)),
            Err(ShopError::CatalogUnavailable(CatalogStatus::Loading))
        ));
    }

    #[test]
    fn test_every_mutation_writes_once_and_noops_do_not() {
        let mut shop = shop();
        let id = ProductId::new(2);

        shop.add_to_cart(id).unwrap();
        shop.increase_quantity(id).unwrap();
        shop.decrease_quantity(id).unwrap();
        assert_eq!(shop.store().writes(), 3);

        assert!(shop.increase_quantity(ProductId::new(3)).is_none());
        assert!(shop.decrease_quantity(ProductId::new(3)).is_none());
        assert!(shop.remove_from_cart(ProductId::new(3)).is_none());
        assert_eq!(shop.store().writes(), 3);
    }

    #[test]
    fn test_clear_cart_write_counts() {
        let mut shop = shop();
        assert!(shop.clear_cart().is_none());
        assert_eq!(shop.store().writes(), 0);

        shop.add_to_cart(ProductId::new(1)).unwrap();
        shop.add_to_cart(ProductId::new(2)).unwrap();
        let before = shop.store().writes();

        let notification = shop.clear_cart().unwrap();
        assert_eq!(notification.message, "Cart emptied");
        assert!(shop.cart().is_empty());
        assert_eq!(shop.store().writes(), before + 1);
    }

    #[test]
    fn test_decrease_to_zero_removes_line() {
        let mut shop = shop();
        let id = ProductId::new(4);
        shop.add_to_cart(id).unwrap();
        shop.add_to_cart(id).unwrap();

        let first = shop.decrease_quantity(id).unwrap();
        assert_eq!(first.message, "Quantity of Moldura decreased");
        let second = shop.decrease_quantity(id).unwrap();
        assert_eq!(second.message, "Moldura removed from cart");
        assert!(shop.cart().line(id).is_none());
    }

    #[test]
    fn test_cart_restored_before_catalog() {
        let raw = r#"[{"id":3,"name":"Quadro","price":"21.90","image":"img/3.jpg","quantity":2}]"#;
        let shop = Shop::new(MemoryStore::new().with_value(CART_KEY, raw), handoff());
        assert_eq!(shop.status(), &CatalogStatus::Loading);
        assert_eq!(shop.summary().total, "43.80");
        assert_eq!(shop.summary().item_count_label, "2 items");
    }

    #[test]
    fn test_corrupt_cart_restored_empty() {
        let shop = shop_with(MemoryStore::new().with_value(CART_KEY, "{oops"));
        assert!(shop.cart().is_empty());
    }

    #[test]
    fn test_browse_filters_and_sorts() {
        let mut shop = shop();
        let view = shop.browse("ARTE", SortOption::PriceDesc).unwrap();
        assert_eq!(view.ids(), vec![ProductId::new(2), ProductId::new(1)]);

        shop.set_search_query("");
        shop.set_sort_option(SortOption::Default);
        assert_eq!(shop.view().products, shop.catalog().products());
    }

    #[test]
    fn test_initial_view_is_full_catalog() {
        let shop = shop();
        assert_eq!(shop.view().products.len(), 4);
        assert_eq!(shop.status(), &CatalogStatus::Ready { products: 4 });
    }

    #[test]
    fn test_failed_load_then_reload() {
        let mut shop = Shop::new(MemoryStore::new(), handoff());
        let missing = LoadError::Status { status: 503 };
        assert!(matches!(
            shop.finish_load(Err(missing)),
            Err(ShopError::CatalogLoad(_))
        ));
        assert!(matches!(shop.status(), CatalogStatus::Failed { .. }));
        assert!(shop.catalog().is_empty());
        assert!(matches!(
            shop.browse("", SortOption::Default),
            Err(ShopError::CatalogUnavailable(CatalogStatus::Failed { .. }))
        ));

        shop.begin_load();
        assert_eq!(shop.status(), &CatalogStatus::Loading);
        assert_eq!(shop.finish_load(Ok(catalog())).unwrap(), 4);
        assert!(shop.browse("", SortOption::Default).is_ok());
    }

    #[test]
    fn test_failed_reload_keeps_previous_catalog() {
        let mut shop = shop();
        shop.begin_load();
        assert_eq!(shop.status(), &CatalogStatus::Ready { products: 4 });

        let result = shop.finish_load(Err(LoadError::Status { status: 500 }));
        assert!(result.is_err());
        assert_eq!(shop.status(), &CatalogStatus::Ready { products: 4 });
        assert_eq!(shop.catalog().len(), 4);
    }

    #[test]
    fn test_product_details() {
        let shop = shop();
        assert_eq!(shop.product(ProductId::new(3)).unwrap().name, "Quadro");
        assert_eq!(
            shop.product(ProductId::new(42)).unwrap_err(),
            ShopError::ProductNotFound(ProductId::new(42))
        );
    }

    #[test]
    fn test_checkout_clears_cart() {
        let mut shop = shop();
        shop.add_to_cart(ProductId::new(1)).unwrap();
        shop.add_to_cart(ProductId::new(3)).unwrap();

        let handoff = shop.checkout(customer()).unwrap();
        assert!(handoff.message.as_str().contains("Total: R$ 32.80"));
        assert!(shop.cart().is_empty());
        assert_eq!(stored_cart(&shop), "[]");
    }

    #[test]
    fn test_checkout_rejections_leave_cart_alone() {
        let mut shop = shop();
        assert_eq!(
            shop.checkout(customer()).unwrap_err(),
            ShopError::Order(OrderError::EmptyCart)
        );
        assert_eq!(shop.store().writes(), 0);

        shop.add_to_cart(ProductId::new(1)).unwrap();
        let err = shop
            .checkout(CustomerDetails {
                name: String::new(),
                ..customer()
            })
            .unwrap_err();
        assert_eq!(
            err,
            ShopError::Order(OrderError::MissingCustomerField(CustomerField::Name))
        );
        assert_eq!(shop.cart().item_count(), 1);
    }

    #[test]
    fn test_failed_writes_are_reported_once() {
        use crate::storage::ReadOnlyStore;

        let mut shop = Shop::new(ReadOnlyStore::default(), handoff());
        shop.finish_load(Ok(catalog())).unwrap();
        assert!(shop.take_write_error().is_none());

        let notification = shop.add_to_cart(ProductId::new(1)).unwrap();
        assert_eq!(notification.message, "Arte 1 added to cart");
        assert_eq!(shop.cart().item_count(), 1);
        assert!(matches!(
            shop.take_write_error(),
            Some(StorageError::Io { .. })
        ));
        assert!(shop.take_write_error().is_none());
    }

    #[test]
    fn test_checkout_reports_unsaved_clear() {
        use crate::storage::ReadOnlyStore;

        let stored = r#"[{"id":1,"name":"Arte 1","price":10.9,"image":"","quantity":1}]"#;
        let store = ReadOnlyStore {
            value: Some(stored.to_string()),
        };
        let mut shop = Shop::new(store, handoff());

        assert!(shop.checkout(customer()).is_ok());
        assert!(shop.take_write_error().is_some());
    }

    #[test]
    fn test_successful_write_clears_earlier_failure() {
        let mut shop = shop();
        shop.write_error = Some(StorageError::InvalidKey("x".to_string()));
        shop.add_to_cart(ProductId::new(2)).unwrap();
        assert!(shop.take_write_error().is_none());
    }

    #[test]
    fn test_cart_snapshot_round_trips_through_store() {
        let mut shop = shop();
        shop.add_to_cart(ProductId::new(1)).unwrap();
        shop.add_to_cart(ProductId::new(4)).unwrap();
        shop.add_to_cart(ProductId::new(1)).unwrap();

        let raw = stored_cart(&shop);
        let reopened = Shop::new(MemoryStore::new().with_value(CART_KEY, &raw), handoff());
        assert_eq!(reopened.cart(), shop.cart());
    }
}
