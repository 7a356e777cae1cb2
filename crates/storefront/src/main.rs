//! Vitrine storefront server.
//!
//! Serves the catalog/cart JSON API that the storefront widget talks to.
//! Configuration comes from `VITRINE_*` environment variables (see
//! [`vitrine_storefront::config`]); the cart is kept in `VITRINE_DATA_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::borrow::Cow;
use std::io;

use sentry::integrations::tracing::{self as sentry_tracing, EventFilter};
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vitrine_storefront::config::{ConfigError, StorefrontConfig};
use vitrine_storefront::routes;
use vitrine_storefront::state::AppState;
use vitrine_storefront::storage::StorageError;

const DEFAULT_LOG_FILTER: &str = "vitrine_storefront=info,tower_http=debug";

/// Reasons the server can fail to come up or keep running.
#[derive(Debug, Error)]
enum ServeError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cart store: {0}")]
    Storage(#[from] StorageError),

    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server: {0}")]
    Serve(#[source] io::Error),
}

#[tokio::main]
async fn main() {
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => exit_before_logging(&ServeError::from(e)),
    };

    // Sentry must be up before the subscriber so its layer has a client.
    let _sentry = config.sentry_dsn.as_deref().map(|dsn| init_sentry(dsn, &config));
    init_tracing();

    if let Err(e) = serve(config).await {
        tracing::error!(error = %e, "Storefront stopped");
        std::process::exit(1);
    }
}

/// No subscriber exists yet, so configuration errors go straight to stderr.
#[allow(clippy::print_stderr)]
fn exit_before_logging(error: &ServeError) -> ! {
    eprintln!("vitrine-storefront: {error}");
    std::process::exit(2);
}

fn init_sentry(dsn: &str, config: &StorefrontConfig) -> sentry::ClientInitGuard {
    sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config.sentry_environment.clone().map(Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ))
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    // Warnings (failed writes, corrupt carts, load failures) become Sentry
    // events; routine cart activity rides along as breadcrumbs.
    let sentry_layer = sentry_tracing::layer().event_filter(|metadata| match *metadata.level() {
        Level::ERROR | Level::WARN => EventFilter::Event,
        Level::INFO | Level::DEBUG => EventFilter::Breadcrumb,
        _ => EventFilter::Ignore,
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_layer)
        .init();
}

async fn serve(config: StorefrontConfig) -> Result<(), ServeError> {
    let addr = config.socket_addr();
    tracing::info!(
        catalog = %config.catalog,
        data_dir = %config.data_dir.display(),
        "Starting storefront"
    );

    // Spawns the shop task, which restores the cart and starts the catalog load.
    let state = AppState::new(config)?;
    let app = routes::app(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction());

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    tracing::info!(%addr, "storefront listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Serve)
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM. If a handler cannot be
/// installed that signal is simply not awaited.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Ctrl+C handler unavailable");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down; in-flight requests will finish");
}
