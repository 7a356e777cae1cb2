//! Checkout command.

use tracing::info;
use vitrine_core::CustomerDetails;
use vitrine_storefront::services::Handoff;
use vitrine_storefront::storage::KeyValueStore;

use super::{CommandError, Session, open};

/// Build the hand-off for the stored cart and empty it.
pub fn run(customer: CustomerDetails) -> Result<(), CommandError> {
    let handoff = hand_off(&mut open()?, customer)?;

    info!("Order message:\n{}", handoff.message);
    info!("Open this link to send it: {}", handoff.url);
    Ok(())
}

/// The link is only returned once the emptied cart is on disk, so the same
/// order cannot be handed off again from a stale cart.
pub(super) fn hand_off<S: KeyValueStore>(
    session: &mut Session<S>,
    customer: CustomerDetails,
) -> Result<Handoff, CommandError> {
    let handoff = session.shop.checkout(customer)?;
    if let Some(e) = session.shop.take_write_error() {
        return Err(CommandError::CheckoutUnsaved(e));
    }
    Ok(handoff)
}
