//! Actor wrapper that gives a [`Shop`] a single owning task.
//!
//! Request handlers run concurrently, but the shop must see one command at a
//! time. [`ShopHandle::spawn`] moves the shop into a tokio task; the handle
//! sends typed commands over an `mpsc` channel and awaits a `oneshot` reply.
//! Catalog loads run on a separate task so cart commands are served while the
//! catalog is still loading.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, error};
use vitrine_core::{Catalog, CustomerDetails, FilteredView, Product, ProductId, SortOption};

use super::{CartCommand, CartSummary, CartUpdate, CatalogStatus, Shop, ShopError};
use crate::services::{CatalogLoader, Handoff, LoadError};
use crate::storage::KeyValueStore;

const CHANNEL_CAPACITY: usize = 64;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Status(Reply<CatalogStatus>),
    Reload(Reply<Result<usize, ShopError>>),
    Browse {
        query: String,
        sort: SortOption,
        reply: Reply<Result<FilteredView, ShopError>>,
    },
    Product {
        id: ProductId,
        reply: Reply<Result<Product, ShopError>>,
    },
    Cart(Reply<CartSummary>),
    Mutate {
        command: CartCommand,
        reply: Reply<Result<CartUpdate, ShopError>>,
    },
    Checkout {
        customer: CustomerDetails,
        reply: Reply<Result<Handoff, ShopError>>,
    },
}

/// Cheaply cloneable handle to the task that owns the shop.
#[derive(Clone)]
pub struct ShopHandle {
    tx: mpsc::Sender<Command>,
}

impl ShopHandle {
    /// Move `shop` into its own task and start the initial catalog load.
    ///
    /// Must be called from within a tokio runtime. The task stops once every
    /// handle has been dropped.
    pub fn spawn<S: KeyValueStore>(shop: Shop<S>, loader: CatalogLoader) -> Self {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(run(shop, loader, rx));
        Self { tx }
    }

    async fn request<T>(&self, make: impl FnOnce(Reply<T>) -> Command) -> Result<T, ShopError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ShopError::Stopped)?;
        rx.await.map_err(|_| ShopError::Stopped)
    }

    /// Current catalog load status.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Stopped`] if the shop task has exited.
    pub async fn status(&self) -> Result<CatalogStatus, ShopError> {
        self.request(Command::Status).await
    }

    /// Re-run the catalog loader and wait for the result.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::CatalogLoad`] if the loader fails.
    pub async fn reload(&self) -> Result<usize, ShopError> {
        self.request(Command::Reload).await?
    }

    /// Apply a search query and sort option and return the resulting view.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::CatalogUnavailable`] until the catalog is loaded.
    pub async fn browse(&self, query: String, sort: SortOption) -> Result<FilteredView, ShopError> {
        self.request(|reply| Command::Browse { query, sort, reply })
            .await?
    }

    /// Look up one product.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::ProductNotFound`] for unknown ids.
    pub async fn product(&self, id: ProductId) -> Result<Product, ShopError> {
        self.request(|reply| Command::Product { id, reply }).await?
    }

    /// Current cart summary.
    ///
    /// # Errors
    ///
    /// Returns [`ShopError::Stopped`] if the shop task has exited.
    pub async fn cart(&self) -> Result<CartSummary, ShopError> {
        self.request(Command::Cart).await
    }

    /// Run a cart command.
    ///
    /// # Errors
    ///
    /// See [`Shop::apply`].
    pub async fn apply(&self, command: CartCommand) -> Result<CartUpdate, ShopError> {
        self.request(|reply| Command::Mutate { command, reply })
            .await?
    }

    /// Check out the current cart.
    ///
    /// # Errors
    ///
    /// See [`Shop::checkout`].
    pub async fn checkout(&self, customer: CustomerDetails) -> Result<Handoff, ShopError> {
        self.request(|reply| Command::Checkout { customer, reply })
            .await?
    }
}

async fn run<S: KeyValueStore>(
    mut shop: Shop<S>,
    loader: CatalogLoader,
    mut rx: mpsc::Receiver<Command>,
) {
    let mut loads: JoinSet<Result<Catalog, LoadError>> = JoinSet::new();
    let mut waiting: Vec<Reply<Result<usize, ShopError>>> = Vec::new();

    shop.begin_load();
    spawn_load(&mut loads, &loader);

    loop {
        tokio::select! {
            command = rx.recv() => {
                let Some(command) = command else { break };
                match command {
                    Command::Reload(reply) => {
                        waiting.push(reply);
                        if loads.is_empty() {
                            shop.begin_load();
                            spawn_load(&mut loads, &loader);
                        }
                    }
                    other => handle(&mut shop, other),
                }
            }
            Some(joined) = loads.join_next(), if !loads.is_empty() => {
                let result = match joined {
                    Ok(result) => shop.finish_load(result),
                    Err(e) => {
                        error!(error = %e, "Catalog load task failed");
                        Err(ShopError::CatalogLoad(e.to_string()))
                    }
                };
                for reply in waiting.drain(..) {
                    let _ = reply.send(result.clone());
                }
            }
        }
    }

    debug!("Shop task stopped");
}

fn spawn_load(loads: &mut JoinSet<Result<Catalog, LoadError>>, loader: &CatalogLoader) {
    let loader = loader.clone();
    loads.spawn(async move { loader.load().await });
}

/// Dispatch one command. Replies are dropped silently if the requester has
/// gone away.
fn handle<S: KeyValueStore>(shop: &mut Shop<S>, command: Command) {
    match command {
        Command::Status(reply) => {
            let _ = reply.send(shop.status().clone());
        }
        Command::Browse { query, sort, reply } => {
            let _ = reply.send(shop.browse(&query, sort).cloned());
        }
        Command::Product { id, reply } => {
            let _ = reply.send(shop.product(id).cloned());
        }
        Command::Cart(reply) => {
            let _ = reply.send(shop.summary());
        }
        Command::Mutate { command, reply } => {
            let _ = reply.send(shop.apply(command));
        }
        Command::Checkout { customer, reply } => {
            let _ = reply.send(shop.checkout(customer));
        }
        Command::Reload(reply) => {
            // Routed in `run`, which owns the load tasks.
            let _ = reply.send(Err(ShopError::Stopped));
        }
    }
}
