//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VITRINE_HANDOFF_PHONE` - Store phone number that receives orders (8-15 digits)
//!
//! ## Optional
//! - `VITRINE_HOST` - Bind address (default: 127.0.0.1)
//! - `VITRINE_PORT` - Listen port (default: 3000)
//! - `VITRINE_CATALOG` - Catalog JSON path or http(s) URL (default: data/products.json)
//! - `VITRINE_DATA_DIR` - Directory for the durable key-value store (default: .vitrine)
//! - `VITRINE_HANDOFF_URL` - Chat deep-link base (default: <https://api.whatsapp.com/send>)
//! - `VITRINE_CURRENCY_SYMBOL` - Symbol used in order messages (default: R$)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use thiserror::Error;
use url::Url;

const DEFAULT_HANDOFF_URL: &str = "https://api.whatsapp.com/send";
const MIN_PHONE_DIGITS: usize = 8;
const MAX_PHONE_DIGITS: usize = 15;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Where the catalog document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// A JSON file on local disk.
    File(PathBuf),
    /// A JSON document served over HTTP(S).
    Url(Url),
}

impl CatalogSource {
    /// Interpret a configured value: anything starting with `http://` or
    /// `https://` is a URL, everything else a path.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if the value looks like a URL but
    /// does not parse.
    pub fn parse(value: &str, var_name: &str) -> Result<Self, ConfigError> {
        if value.starts_with("http://") || value.starts_with("https://") {
            let url = Url::parse(value)
                .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), e.to_string()))?;
            return Ok(Self::Url(url));
        }
        Ok(Self::File(PathBuf::from(value)))
    }
}

impl std::fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Chat hand-off configuration.
#[derive(Debug, Clone)]
pub struct HandoffConfig {
    /// Deep-link base URL (query parameters are appended)
    pub base_url: Url,
    /// Store phone number, digits only
    pub phone: String,
    /// Currency symbol used in the order message
    pub currency_symbol: String,
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Catalog document location
    pub catalog: CatalogSource,
    /// Directory backing the durable key-value store
    pub data_dir: PathBuf,
    /// Checkout hand-off settings
    pub handoff: HandoffConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("VITRINE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("VITRINE_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("VITRINE_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("VITRINE_PORT".to_string(), e.to_string()))?;
        let catalog = CatalogSource::parse(
            &get_env_or_default("VITRINE_CATALOG", "data/products.json"),
            "VITRINE_CATALOG",
        )?;
        let data_dir = PathBuf::from(get_env_or_default("VITRINE_DATA_DIR", ".vitrine"));
        let handoff = HandoffConfig::from_env()?;

        Ok(Self {
            host,
            port,
            catalog,
            data_dir,
            handoff,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl HandoffConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = Url::parse(&get_env_or_default("VITRINE_HANDOFF_URL", DEFAULT_HANDOFF_URL))
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VITRINE_HANDOFF_URL".to_string(), e.to_string())
            })?;
        let phone = get_required_env("VITRINE_HANDOFF_PHONE")?;
        let phone = normalize_phone(&phone, "VITRINE_HANDOFF_PHONE")?;

        Ok(Self {
            base_url,
            phone,
            currency_symbol: get_env_or_default("VITRINE_CURRENCY_SYMBOL", "R$"),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Strip formatting (`+`, spaces, dashes, parentheses) from a phone number and
/// check what is left is a plausible international number.
fn normalize_phone(value: &str, var_name: &str) -> Result<String, ConfigError> {
    let mut digits = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '0'..='9' => digits.push(c),
            '+' | ' ' | '-' | '(' | ')' => {}
            other => {
                return Err(ConfigError::InvalidEnvVar(
                    var_name.to_string(),
                    format!("unexpected character {other:?} in phone number"),
                ));
            }
        }
    }

    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len()) {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            format!(
                "must have {MIN_PHONE_DIGITS}-{MAX_PHONE_DIGITS} digits (got {})",
                digits.len()
            ),
        ));
    }

    Ok(digits)
}
