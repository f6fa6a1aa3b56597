//! Payment gateway integration.
//!
//! The [`PaymentGateway`] trait is the seam between the payments surface and
//! the hosted gateway's REST API. [`HttpPaymentGateway`] talks to a
//! Stripe-compatible API over `reqwest`; tests substitute their own stub.
//!
//! Webhook signature verification lives in [`webhook`] and is independent of
//! the outbound client.

pub mod http;
pub mod webhook;

use std::collections::HashMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use thiserror::Error;

use clementine_core::OrderId;

pub use http::HttpPaymentGateway;

/// Errors from payment gateway operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport-level failure reaching the gateway.
    #[error("gateway request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The gateway returned a non-success status.
    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The gateway's response could not be interpreted.
    #[error("unexpected gateway response: {0}")]
    UnexpectedResponse(String),
}

/// One line item of a checkout session, referencing a price registered with
/// the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLineItem {
    pub price_id: String,
    pub quantity: i32,
}

/// Request to open a hosted checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSessionRequest {
    pub line_items: Vec<SessionLineItem>,
    /// Where the gateway sends the shopper after payment; the gateway
    /// substitutes its own session id into the `{CHECKOUT_SESSION_ID}`
    /// placeholder.
    pub return_url: String,
    /// Stamped into session metadata so the webhook can find the order.
    pub order_id: OrderId,
}

/// A freshly created checkout session.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    pub id: String,
    /// Opaque secret the frontend uses to mount the embedded checkout.
    pub client_secret: String,
}

/// A checkout session as retrieved from the gateway.
#[derive(Debug, Clone, Default)]
pub struct GatewaySession {
    pub id: String,
    /// Session lifecycle status, e.g. `"open"` or `"complete"`.
    pub status: String,
    /// Payment outcome, e.g. `"paid"` or `"unpaid"`.
    pub payment_status: String,
    pub customer_email: Option<String>,
    pub metadata: HashMap<String, String>,
}

impl GatewaySession {
    /// The order this session was opened for, if the metadata carries one.
    #[must_use]
    pub fn order_id(&self) -> Option<OrderId> {
        self.metadata
            .get("order_id")
            .and_then(|raw| OrderId::parse(raw).ok())
    }
}

/// Outbound operations against the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open an embedded checkout session for the given line items.
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError>;

    /// Retrieve a session's current state by id.
    async fn retrieve_session(&self, session_id: &str) -> Result<GatewaySession, GatewayError>;

    /// Register a product with the gateway; returns the default price
    /// reference to store alongside the product.
    async fn register_product(
        &self,
        name: &str,
        price: Decimal,
    ) -> Result<String, GatewayError>;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_session_order_id_from_metadata() {
        let order_id = OrderId::new();
        let mut metadata = HashMap::new();
        metadata.insert("order_id".to_string(), order_id.to_string());

        let session = GatewaySession {
            id: "cs_test_1".to_string(),
            status: "complete".to_string(),
            payment_status: "paid".to_string(),
            customer_email: None,
            metadata,
        };

        assert_eq!(session.order_id(), Some(order_id));
    }

    #[test]
    fn test_session_order_id_absent_or_garbage() {
        let session = GatewaySession::default();
        assert_eq!(session.order_id(), None);

        let mut metadata = HashMap::new();
        metadata.insert("order_id".to_string(), "not-a-uuid".to_string());
        let session = GatewaySession {
            metadata,
            ..GatewaySession::default()
        };
        assert_eq!(session.order_id(), None);
    }
}
