//! Shopping cart models.

use serde::Serialize;

use clementine_core::{CartId, UserId};

use super::catalog::Product;

/// A user's cart with product expansion on each line item.
///
/// There is at most one cart per user identity; it is created on first read
/// and emptied (not deleted) once the corresponding order is paid.
#[derive(Debug, Clone, Serialize)]
pub struct Cart {
    pub id: CartId,
    pub user_id: UserId,
    pub items: Vec<CartItem>,
}

/// One line item in a cart.
///
/// `product` is `None` when the referenced product has been deleted since
/// the line was added.
#[derive(Debug, Clone, Serialize)]
pub struct CartItem {
    pub product: Option<Product>,
    pub quantity: i32,
}
