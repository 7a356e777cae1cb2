//! Vitrine CLI - browse the catalog and manage the cart from a terminal.
//!
//! Uses the same configuration, catalog source and cart store as the
//! storefront server, so a cart built here shows up in the widget and the
//! other way round.
//!
//! # Usage
//!
//! ```bash
//! # List products matching "arte", most expensive first
//! vitrine products --query arte --sort price-desc
//!
//! # Show one product
//! vitrine product 3
//!
//! # Cart commands
//! vitrine cart add 3
//! vitrine cart decrease 3
//! vitrine cart show
//!
//! # Build the chat hand-off link and empty the cart
//! vitrine checkout --name "Ana" --phone "83 99999-0000" --address "Rua A, 10"
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use vitrine_core::{CustomerDetails, ProductId, SortOption};

mod commands;

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine catalog and cart tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products, optionally filtered and sorted
    Products {
        /// Case-insensitive name filter
        #[arg(short, long, default_value = "")]
        query: String,

        /// Sort order (`default`, `price-asc`, `price-desc`, `name-asc`, `name-desc`)
        #[arg(short, long, default_value = "default")]
        sort: String,
    },
    /// Show one product
    Product {
        /// Product id
        id: ProductId,
    },
    /// Inspect or change the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Build the order hand-off link and empty the cart
    Checkout {
        /// Customer name
        #[arg(short, long)]
        name: String,

        /// Customer phone
        #[arg(short, long)]
        phone: String,

        /// Delivery address
        #[arg(short, long)]
        address: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and total
    Show,
    /// Add one unit of a product
    Add { id: ProductId },
    /// Increase a line's quantity
    Increase { id: ProductId },
    /// Decrease a line's quantity, removing it at zero
    Decrease { id: ProductId },
    /// Remove a line
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

#[tokio::main]
async fn main() {
    // Load .env first so RUST_LOG set there applies
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "vitrine_cli=info,vitrine_storefront=warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Products { query, sort } => {
            commands::catalog::list(&query, SortOption::from_param(&sort)).await?;
        }
        Commands::Product { id } => commands::catalog::show(id).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show()?,
            CartAction::Add { id } => commands::cart::add(id).await?,
            CartAction::Increase { id } => commands::cart::increase(id)?,
            CartAction::Decrease { id } => commands::cart::decrease(id)?,
            CartAction::Remove { id } => commands::cart::remove(id)?,
            CartAction::Clear => commands::cart::clear()?,
        },
        Commands::Checkout {
            name,
            phone,
            address,
        } => {
            commands::checkout::run(CustomerDetails {
                name,
                phone,
                address,
            })?;
        }
    }
    Ok(())
}
