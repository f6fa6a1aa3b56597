//! Order route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use clementine_core::OrderId;

use crate::error::{AppError, Result};
use crate::extract::{Validate, ValidatedJson};
use crate::middleware::AuthUser;
use crate::models::{
    AdminOrder, NewAddress, NewOrder, NewOrderItem, Order, OrderDetail, OrderWithAddress,
};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub address: NewAddress,
    pub items: Vec<NewOrderItem>,
}

impl Validate for CreateOrderRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.items.is_empty() {
            return Err("order must contain at least one item".to_string());
        }
        if self.items.iter().any(|item| item.quantity < 1) {
            return Err("every item quantity must be a positive integer".to_string());
        }
        if self.address.line_1.trim().is_empty() {
            return Err("address line_1 must not be empty".to_string());
        }
        Ok(())
    }
}

/// `POST /api/orders` - create an order for the authenticated caller.
///
/// Stock availability is deliberately not validated here; it is only
/// consumed when the payment gateway confirms the session as paid.
pub async fn create_order(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let order = state
        .store()
        .create_order(NewOrder {
            user_id: user.user_id,
            address: request.address,
            items: request.items,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// `GET /api/orders/{id}` - order detail, owner only.
pub async fn get_order(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<OrderId>,
) -> Result<Json<OrderDetail>> {
    let order = state
        .store()
        .get_order_detail(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    if order.user_id != user.user_id {
        return Err(AppError::Unauthorized(
            "You are not authorized to view this order".to_string(),
        ));
    }

    Ok(Json(order))
}

/// `GET /api/orders` - the caller's orders with address expansion, newest
/// first. An empty result is a 404, matching the storefront client's
/// expectations.
pub async fn list_orders(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<OrderWithAddress>>> {
    let orders = state.store().list_orders_for_user(&user.user_id).await?;
    if orders.is_empty() {
        return Err(AppError::NotFound(
            "No orders found for this user".to_string(),
        ));
    }
    Ok(Json(orders))
}

/// `GET /api/orders/admin` - all orders with full enrichment.
///
/// Owner profiles come from the identity provider; a failed lookup degrades
/// to `"N/A"` placeholders instead of failing the listing.
pub async fn list_all_orders(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Result<Json<Vec<AdminOrder>>> {
    let mut orders = state.store().list_all_orders().await?;

    for order in &mut orders {
        match state.identity().get_profile(&order.user_id).await {
            Ok(profile) => {
                order.user.full_name = profile.full_name;
                order.user.email = profile.email;
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %order.user_id,
                    error = %e,
                    "Failed to enrich order owner profile"
                );
            }
        }
    }

    Ok(Json(orders))
}
