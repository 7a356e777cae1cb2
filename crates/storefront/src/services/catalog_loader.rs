//! Catalog document loader.
//!
//! The catalog is a static JSON array of `{id, name, price, image}` objects,
//! read once at startup (and again on a manual reload). It can live on local
//! disk or behind an HTTP(S) URL.

use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, instrument};
use vitrine_core::{Catalog, CatalogError, Product};

use crate::config::CatalogSource;

/// Errors that can occur while loading the catalog.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading the catalog file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("catalog request returned {status}")]
    Status { status: u16 },

    /// Document is not a JSON array of products.
    #[error("invalid catalog document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Document parsed but breaks a catalog rule.
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),
}

/// Loads the catalog from its configured source.
#[derive(Debug, Clone)]
pub struct CatalogLoader {
    source: CatalogSource,
    client: reqwest::Client,
}

impl CatalogLoader {
    /// Create a loader for `source`.
    #[must_use]
    pub fn new(source: CatalogSource) -> Self {
        Self {
            source,
            client: reqwest::Client::new(),
        }
    }

    /// Fetch and parse the catalog.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` if the document cannot be fetched, is not a JSON
    /// array of products, or repeats a product id.
    #[instrument(skip(self), fields(source = %self.source))]
    pub async fn load(&self) -> Result<Catalog, LoadError> {
        let body = match &self.source {
            CatalogSource::File(path) => {
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| LoadError::Io {
                        path: path.clone(),
                        source,
                    })?
            }
            CatalogSource::Url(url) => {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(LoadError::Status {
                        status: status.as_u16(),
                    });
                }
                response.text().await?
            }
        };

        let catalog = parse_catalog(&body)?;
        debug!(products = catalog.len(), "Catalog parsed");
        Ok(catalog)
    }
}

/// Parse a catalog document.
///
/// # Errors
///
/// Returns `LoadError::Parse` for malformed JSON or products, and
/// `LoadError::Catalog` for duplicate ids.
pub fn parse_catalog(body: &str) -> Result<Catalog, LoadError> {
    let products: Vec<Product> = serde_json::from_str(body)?;
    Ok(Catalog::new(products)?)
}
