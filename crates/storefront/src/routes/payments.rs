//! Payments route handlers: checkout sessions, session status, and the
//! gateway webhook.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{OrderId, OrderStatus, PaymentStatus};

use crate::error::{AppError, Result};
use crate::extract::{Validate, ValidatedJson};
use crate::fulfillment::fulfill_checkout;
use crate::gateway::webhook::{SIGNATURE_HEADER, WebhookError, WebhookEvent, verify_signature};
use crate::gateway::{CheckoutSessionRequest, SessionLineItem};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub order_id: OrderId,
}

impl Validate for CreateSessionRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub client_secret: String,
}

/// `POST /api/payments/create-checkout-session` - open an embedded checkout
/// session for an existing order.
pub async fn create_checkout_session(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>> {
    let order = state
        .store()
        .get_order_detail(request.order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let mut line_items = Vec::with_capacity(order.items.len());
    for item in &order.items {
        let product = item.product.as_ref().ok_or_else(|| {
            AppError::Internal(format!("order {} references a missing product", order.id))
        })?;
        let price_id = product.gateway_price_id.clone().ok_or_else(|| {
            AppError::Internal(format!(
                "product {} is not registered with the payment gateway",
                product.id
            ))
        })?;
        line_items.push(SessionLineItem {
            price_id,
            quantity: item.quantity,
        });
    }

    let session = state
        .gateway()
        .create_checkout_session(CheckoutSessionRequest {
            line_items,
            return_url: format!(
                "{}/shop/complete?session_id={{CHECKOUT_SESSION_ID}}",
                state.config().frontend_origin
            ),
            order_id: order.id,
        })
        .await?;

    Ok(Json(CreateSessionResponse {
        client_secret: session.client_secret,
    }))
}

#[derive(Debug, Deserialize)]
pub struct SessionStatusQuery {
    pub session_id: String,
}

/// One purchased line in the session-status response.
#[derive(Debug, Serialize)]
pub struct PurchasedProduct {
    pub name: String,
    pub price: Decimal,
    /// First product image, or an empty string if there is none.
    pub image: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize)]
pub struct SessionTotals {
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub order_id: OrderId,
    /// Session lifecycle status from the gateway.
    pub status: String,
    pub customer_email: Option<String>,
    pub order_status: OrderStatus,
    pub payment_status: PaymentStatus,
    pub purchased_products: Vec<PurchasedProduct>,
    pub totals: SessionTotals,
}

/// `GET /api/payments/session-status?session_id=` - the post-checkout
/// summary the frontend renders on the completion page.
pub async fn session_status(
    State(state): State<AppState>,
    Query(query): Query<SessionStatusQuery>,
) -> Result<Json<SessionStatusResponse>> {
    let session = state.gateway().retrieve_session(&query.session_id).await?;

    let order_id = session
        .order_id()
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    let order = state
        .store()
        .get_order_detail(order_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let purchased_products: Vec<PurchasedProduct> = order
        .items
        .iter()
        .map(|item| {
            item.product.as_ref().map_or_else(
                || PurchasedProduct {
                    name: String::new(),
                    price: Decimal::ZERO,
                    image: String::new(),
                    quantity: item.quantity,
                },
                |product| PurchasedProduct {
                    name: product.name.clone(),
                    price: product.price,
                    image: product.images.first().cloned().unwrap_or_default(),
                    quantity: item.quantity,
                },
            )
        })
        .collect();

    let subtotal: Decimal = purchased_products
        .iter()
        .map(|p| p.price * Decimal::from(p.quantity))
        .sum();
    let shipping = Decimal::ZERO;

    Ok(Json(SessionStatusResponse {
        order_id: order.id,
        status: session.status,
        customer_email: session.customer_email,
        order_status: order.order_status,
        payment_status: order.payment_status,
        purchased_products,
        totals: SessionTotals {
            subtotal,
            shipping,
            total: subtotal + shipping,
        },
    }))
}

/// `POST /api/payments/webhook` - signed gateway webhook.
///
/// Answers 200 with an empty body on success or intentional ignore, 400
/// with `Webhook Error: {message}` on any signature or processing failure.
/// Redelivery of failed deliveries belongs to the gateway.
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match handle_delivery(&state, &headers, &body).await {
        Ok(()) => StatusCode::OK.into_response(),
        Err(message) => {
            tracing::warn!(%message, "Webhook delivery rejected");
            (StatusCode::BAD_REQUEST, format!("Webhook Error: {message}")).into_response()
        }
    }
}

async fn handle_delivery(
    state: &AppState,
    headers: &HeaderMap,
    body: &[u8],
) -> std::result::Result<(), String> {
    let header = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| WebhookError::MissingSignature.to_string())?;

    verify_signature(&state.config().gateway.webhook_secret, header, body)
        .map_err(|e| e.to_string())?;

    let event = WebhookEvent::parse(body).map_err(|e| e.to_string())?;
    if event.is_payment_success() {
        fulfill_checkout(state, &event.data.object.id)
            .await
            .map_err(|e| e.to_string())?;
    } else {
        tracing::debug!(event_type = %event.event_type, "Ignoring webhook event");
    }

    Ok(())
}
