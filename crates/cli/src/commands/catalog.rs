//! Catalog browsing commands.

use tracing::info;
use vitrine_core::{ProductId, SortOption};

use super::{CommandError, open_with_catalog};

/// List products matching `query` in `sort` order.
pub async fn list(query: &str, sort: SortOption) -> Result<(), CommandError> {
    let mut session = open_with_catalog().await?;
    let currency = session.currency.clone();
    let view = session.shop.browse(query, sort)?;

    if view.is_empty() {
        info!("No products found");
        return Ok(());
    }
    for product in &view.products {
        info!(
            "{:>4}  {:<30}  {}",
            product.id,
            product.name,
            product.price.display_with(&currency)
        );
    }
    Ok(())
}

/// Show one product.
pub async fn show(id: ProductId) -> Result<(), CommandError> {
    let session = open_with_catalog().await?;
    let product = session.shop.product(id)?;

    info!("{}", product.name);
    info!("  id:    {}", product.id);
    info!("  price: {}", product.price.display_with(&session.currency));
    info!("  image: {}", product.image);
    Ok(())
}
