//! Order ledger models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use clementine_core::{AddressId, OrderId, OrderStatus, PaymentMethod, PaymentStatus, ProductId, UserId};

use super::catalog::{Color, Product};

/// A purchase intent, created at checkout time and mutated only by the
/// fulfillment engine thereafter. Never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub address_id: AddressId,
    pub items: Vec<OrderItem>,
    pub order_status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// A (product reference, quantity) pair on an order, in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// An immutable shipping address snapshot, created per order and never
/// shared across orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub id: AddressId,
    pub line_1: String,
    pub line_2: Option<String>,
    pub city: String,
    pub phone: String,
}

/// Address content captured from a checkout request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAddress {
    pub line_1: String,
    pub line_2: Option<String>,
    pub city: String,
    pub phone: String,
}

/// Input for creating an order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub address: NewAddress,
    pub items: Vec<NewOrderItem>,
}

/// One requested line item at order creation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Order with its address snapshot expanded (user-facing listing).
#[derive(Debug, Clone, Serialize)]
pub struct OrderWithAddress {
    #[serde(flatten)]
    pub order: Order,
    pub address: Option<Address>,
}

/// Order with product expansion per line item (payments surface).
#[derive(Debug, Clone, Serialize)]
pub struct OrderDetail {
    pub id: OrderId,
    pub user_id: UserId,
    pub address_id: AddressId,
    pub items: Vec<OrderItemDetail>,
    pub order_status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// An order line item with its product expanded.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItemDetail {
    pub product: Option<Product>,
    pub quantity: i32,
}

/// Administrative order listing entry with full enrichment.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrder {
    pub id: OrderId,
    pub user_id: UserId,
    pub items: Vec<AdminOrderItem>,
    pub order_status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
    pub address: Option<Address>,
    pub user: AdminOrderUser,
}

/// Admin order line item with product and color expansion.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderItem {
    pub product: Option<Product>,
    pub color: Option<Color>,
    pub quantity: i32,
}

/// Owner profile attached to an admin order listing entry.
///
/// Enrichment failures degrade to `"N/A"` placeholders rather than failing
/// the whole listing.
#[derive(Debug, Clone, Serialize)]
pub struct AdminOrderUser {
    pub full_name: String,
    pub email: String,
}

impl AdminOrderUser {
    /// Placeholder profile used when the identity provider lookup fails.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            full_name: "N/A".to_string(),
            email: "N/A".to_string(),
        }
    }
}
