//! Cart commands.
//!
//! Only `add` needs the catalog; the others work on the stored lines. Every
//! command fails if its change could not be written back.

use vitrine_core::ProductId;
use vitrine_storefront::shop::CartCommand;
use vitrine_storefront::storage::KeyValueStore;

use super::{CommandError, Session, open, open_with_catalog, print_cart, report};

/// Print the stored cart.
pub fn show() -> Result<(), CommandError> {
    let session = open()?;
    print_cart(&session.shop.summary(), &session.currency);
    Ok(())
}

/// Add one unit of a catalog product.
pub async fn add(id: ProductId) -> Result<(), CommandError> {
    let mut session = open_with_catalog().await?;
    run(&mut session, CartCommand::Add(id))
}

pub fn increase(id: ProductId) -> Result<(), CommandError> {
    run(&mut open()?, CartCommand::Increase(id))
}

pub fn decrease(id: ProductId) -> Result<(), CommandError> {
    run(&mut open()?, CartCommand::Decrease(id))
}

pub fn remove(id: ProductId) -> Result<(), CommandError> {
    run(&mut open()?, CartCommand::Remove(id))
}

pub fn clear() -> Result<(), CommandError> {
    run(&mut open()?, CartCommand::Clear)
}

pub(super) fn run<S: KeyValueStore>(
    session: &mut Session<S>,
    command: CartCommand,
) -> Result<(), CommandError> {
    let update = session.shop.apply(command)?;
    session.ensure_saved()?;
    report(update.notification);
    if command != CartCommand::Clear {
        print_cart(&update.cart, &session.currency);
    }
    Ok(())
}
