//! Integration tests for Vitrine.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p vitrine-integration-tests
//! ```
//!
//! Each test starts the storefront router in-process on an ephemeral port,
//! with its own temporary catalog file and cart directory, and talks to it
//! over HTTP with `reqwest`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use reqwest::Client;
use serde_json::Value;
use tempfile::TempDir;
use url::Url;
use vitrine_storefront::config::{CatalogSource, HandoffConfig, StorefrontConfig};
use vitrine_storefront::routes;
use vitrine_storefront::state::AppState;
use vitrine_storefront::storage::FileStore;

/// Catalog used by most tests.
pub const CATALOG: &str = r#"[
    {"id": 1, "name": "Arte 1", "price": 10.9, "image": "img/arte-1.jpg"},
    {"id": 2, "name": "Arte 2", "price": "15.90", "image": "img/arte-2.jpg"},
    {"id": 3, "name": "Quadro Azul", "price": 21.9, "image": "img/quadro.jpg"},
    {"id": 4, "name": "Moldura", "price": 29.9, "image": "img/moldura.jpg"}
]"#;

/// Phone number orders are handed off to.
pub const HANDOFF_PHONE: &str = "5583981374944";

/// A storefront running on an ephemeral port.
pub struct TestServer {
    pub client: Client,
    pub base_url: String,
    pub catalog_path: PathBuf,
    pub data_dir: PathBuf,
    _dir: TempDir,
}

impl TestServer {
    /// Start a server over `catalog`, with an empty cart.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or listener cannot be set up.
    pub async fn start(catalog: &str) -> Self {
        Self::start_with_cart(catalog, None).await
    }

    /// Start a server over `catalog`, with `cart` pre-stored under the `cart` key.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory or listener cannot be set up.
    pub async fn start_with_cart(catalog: &str, cart: Option<&str>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let catalog_path = dir.path().join("products.json");
        let data_dir = dir.path().join("data");
        std::fs::write(&catalog_path, catalog).expect("Failed to write catalog");
        std::fs::create_dir_all(&data_dir).expect("Failed to create data dir");
        if let Some(cart) = cart {
            std::fs::write(data_dir.join("cart.json"), cart).expect("Failed to write cart");
        }

        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            catalog: CatalogSource::File(catalog_path.clone()),
            data_dir: data_dir.clone(),
            handoff: HandoffConfig {
                base_url: Url::parse("https://api.whatsapp.com/send").expect("valid url"),
                phone: HANDOFF_PHONE.to_string(),
                currency_symbol: "R$".to_string(),
            },
            sentry_dsn: None,
            sentry_environment: None,
        };
        let store = FileStore::open(&data_dir).expect("Failed to open store");
        let app = routes::app(AppState::with_store(config, store));

        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to read local addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            catalog_path,
            data_dir,
            _dir: dir,
        }
    }

    /// Absolute URL for `path`.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Poll `/products` until the initial catalog load has settled.
    ///
    /// # Panics
    ///
    /// Panics if the load has not settled after a second.
    pub async fn wait_for_catalog(&self) -> Value {
        for _ in 0..200 {
            let resp = self
                .client
                .get(self.url("/products"))
                .send()
                .await
                .expect("request failed");
            let body: Value = resp.json().await.expect("invalid json");
            let state = body["catalog"]["state"].as_str().unwrap_or_default();
            if state != "loading" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("catalog never finished loading");
    }

    /// POST a cart command for `product_id` and return the JSON body.
    ///
    /// # Panics
    ///
    /// Panics if the request fails or the body is not JSON.
    pub async fn cart_command(&self, command: &str, product_id: i32) -> (u16, Value) {
        let resp = self
            .client
            .post(self.url(&format!("/cart/{command}")))
            .json(&serde_json::json!({ "product_id": product_id }))
            .send()
            .await
            .expect("request failed");
        let status = resp.status().as_u16();
        (status, resp.json().await.expect("invalid json"))
    }

    /// Raw value stored under the `cart` key, if any.
    #[must_use]
    pub fn stored_cart(&self) -> Option<String> {
        std::fs::read_to_string(self.data_dir.join("cart.json")).ok()
    }
}
