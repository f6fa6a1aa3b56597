//! Payment fulfillment engine.
//!
//! Drives an order through the paid transition when the gateway reports a
//! checkout session as paid. The session state is always re-fetched from
//! the gateway; the webhook delivery itself is only trusted for the session
//! id. The store applies the transition atomically behind a PENDING guard,
//! so redeliveries and concurrent deliveries are no-ops.

use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::store::FulfillmentOutcome;

use clementine_core::PaymentStatus;

/// Fulfill the order attached to a checkout session, if it is paid.
///
/// Unpaid sessions are ignored without error: `checkout.session.completed`
/// also fires for asynchronous payment methods that have not settled yet,
/// and those sessions come back later as
/// `checkout.session.async_payment_succeeded`.
///
/// # Errors
///
/// Fails if the session cannot be retrieved, carries no usable order
/// reference, or the store transition fails. On failure the order remains
/// `PENDING`, so the gateway's webhook retry can attempt again.
pub async fn fulfill_checkout(state: &AppState, session_id: &str) -> Result<()> {
    let session = state.gateway().retrieve_session(session_id).await?;

    if session.payment_status != "paid" {
        tracing::info!(
            session_id,
            payment_status = %session.payment_status,
            "Ignoring unpaid checkout session"
        );
        return Ok(());
    }

    let order_id = session.order_id().ok_or_else(|| {
        AppError::NotFound(format!(
            "No order reference on checkout session {session_id}"
        ))
    })?;

    let order = state
        .store()
        .get_order(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No order found for id {order_id}")))?;

    // Cheap pre-check; the store re-checks under lock.
    if order.payment_status != PaymentStatus::Pending {
        tracing::info!(%order_id, "Order already processed, skipping fulfillment");
        return Ok(());
    }

    match state.store().apply_fulfillment(order_id).await? {
        FulfillmentOutcome::Applied { user_id } => {
            tracing::info!(%order_id, "Order fulfilled");

            // The order is already fulfilled; a stale cart is not worth
            // failing the delivery over.
            if let Err(e) = state.store().clear_cart(&user_id).await {
                tracing::warn!(%order_id, error = %e, "Failed to clear cart after fulfillment");
            }
        }
        FulfillmentOutcome::AlreadyProcessed => {
            tracing::info!(%order_id, "Order already processed, skipping fulfillment");
        }
    }

    Ok(())
}
