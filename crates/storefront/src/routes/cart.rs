//! Cart route handlers.
//!
//! Every operation is keyed by the authenticated caller; there is exactly
//! one cart per user and it is created on first touch.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;

use clementine_core::ProductId;

use crate::error::{AppError, Result};
use crate::extract::{Validate, ValidatedJson};
use crate::middleware::AuthUser;
use crate::models::Cart;
use crate::state::AppState;

/// `GET /api/cart` - fetch the caller's cart, creating it if absent.
pub async fn get_cart(State(state): State<AppState>, user: AuthUser) -> Result<Json<Cart>> {
    let cart = state.store().get_or_create_cart(&user.user_id).await?;
    Ok(Json(cart))
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
}

impl Validate for AddToCartRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// `POST /api/cart/add` - add one unit of a product.
pub async fn add_to_cart(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<AddToCartRequest>,
) -> Result<Json<Cart>> {
    state
        .store()
        .get_product(request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let cart = state
        .store()
        .add_to_cart(&user.user_id, request.product_id)
        .await?;
    Ok(Json(cart))
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub product_id: ProductId,
    pub quantity: i32,
}

impl Validate for SetQuantityRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.quantity < 1 {
            return Err("quantity must be a positive integer".to_string());
        }
        Ok(())
    }
}

/// `PUT /api/cart/quantity` - set the quantity of an existing line.
pub async fn set_quantity(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<SetQuantityRequest>,
) -> Result<Json<Cart>> {
    let cart = state
        .store()
        .set_cart_quantity(&user.user_id, request.product_id, request.quantity)
        .await?;
    Ok(Json(cart))
}

#[derive(Debug, Deserialize)]
pub struct RemoveItemRequest {
    pub product_id: ProductId,
}

impl Validate for RemoveItemRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }
}

/// `PUT /api/cart/remove` - remove a line; removing an absent line is a
/// silent no-op.
pub async fn remove_item(
    State(state): State<AppState>,
    user: AuthUser,
    ValidatedJson(request): ValidatedJson<RemoveItemRequest>,
) -> Result<Json<Cart>> {
    let cart = state
        .store()
        .remove_cart_item(&user.user_id, request.product_id)
        .await?;
    Ok(Json(cart))
}
