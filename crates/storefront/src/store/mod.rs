//! Persistence layer for the storefront.
//!
//! The [`Store`] trait is the single seam between the HTTP surface and
//! persistence. Two implementations exist:
//!
//! - [`PostgresStore`] - production, backed by `sqlx` over `PostgreSQL`
//! - [`MemoryStore`] - in-process, used by tests and local runs
//!
//! # Tables
//!
//! - `product`, `category`, `brand`, `color` - catalog collections
//! - `review` - product reviews (`product_id` back-reference)
//! - `cart`, `cart_item` - one cart per user, line items keyed by product
//! - `address` - immutable per-order address snapshots
//! - `orders`, `order_item` - the order ledger
//!
//! # Migrations
//!
//! Migrations are stored in `crates/storefront/migrations/` and run via:
//! ```bash
//! cargo run -p clementine-cli -- migrate
//! ```
//! They are never run automatically on startup.

pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use clementine_core::{BrandId, CategoryId, ColorId, OrderId, ProductId, UserId};

use crate::models::{
    AdminOrder, Brand, BrandUpdate, Cart, Category, CategoryUpdate, Color,
    ColorUpdate, NewBrand, NewCategory, NewColor, NewOrder, NewProduct, NewReview, Order,
    OrderDetail, OrderWithAddress, Product, ProductUpdate, ProductWithCategory, Review,
};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found: {0}")]
    NotFound(&'static str),

    /// Constraint violation (e.g., duplicate category slug).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Result of [`Store::apply_fulfillment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// The guard passed and the transition was applied; carries the order
    /// owner so the caller can clear their cart.
    Applied { user_id: UserId },
    /// The order's payment status was no longer `PENDING`; nothing was
    /// mutated (webhook redelivery).
    AlreadyProcessed,
}

/// Storage operations for the storefront.
///
/// All implementations must be thread-safe (`Send + Sync`). Reference
/// expansion returns `Option`s; a dangling reference is represented as
/// `None`, never as an error.
#[async_trait]
pub trait Store: Send + Sync {
    /// Cheap connectivity probe used by the readiness endpoint.
    async fn ping(&self) -> Result<(), StoreError>;

    // -- Products -----------------------------------------------------------

    /// List products, optionally filtered by category.
    async fn list_products(&self, category: Option<CategoryId>) -> Result<Vec<Product>, StoreError>;

    /// Get a product by id.
    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Create a product. The gateway mirror registration happens outside the
    /// store; use [`Store::set_gateway_price_id`] to record the result.
    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError>;

    /// Apply a partial update; returns the updated product, or `None` if absent.
    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StoreError>;

    /// Delete a product; returns whether a row was removed.
    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Record the payment gateway's price reference for a product.
    async fn set_gateway_price_id(
        &self,
        id: ProductId,
        price_id: &str,
    ) -> Result<(), StoreError>;

    /// List products that have not been registered with the gateway yet.
    async fn products_missing_gateway_price(&self) -> Result<Vec<Product>, StoreError>;

    /// List the products of a category with category name/slug expansion.
    async fn list_products_in_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ProductWithCategory>, StoreError>;

    /// Reviews attached to a product, oldest first.
    async fn reviews_for_product(&self, id: ProductId) -> Result<Vec<Review>, StoreError>;

    // -- Categories / brands / colors ---------------------------------------

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;
    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError>;
    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError>;
    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError>;
    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>, StoreError>;
    async fn delete_category(&self, id: CategoryId) -> Result<bool, StoreError>;

    async fn list_brands(&self) -> Result<Vec<Brand>, StoreError>;
    async fn get_brand(&self, id: BrandId) -> Result<Option<Brand>, StoreError>;
    async fn create_brand(&self, brand: NewBrand) -> Result<Brand, StoreError>;
    async fn update_brand(
        &self,
        id: BrandId,
        update: BrandUpdate,
    ) -> Result<Option<Brand>, StoreError>;
    async fn delete_brand(&self, id: BrandId) -> Result<bool, StoreError>;

    async fn list_colors(&self) -> Result<Vec<Color>, StoreError>;
    async fn get_color(&self, id: ColorId) -> Result<Option<Color>, StoreError>;
    async fn create_color(&self, color: NewColor) -> Result<Color, StoreError>;
    async fn update_color(
        &self,
        id: ColorId,
        update: ColorUpdate,
    ) -> Result<Option<Color>, StoreError>;
    async fn delete_color(&self, id: ColorId) -> Result<bool, StoreError>;

    // -- Reviews ------------------------------------------------------------

    /// Insert a review attached to a product. The caller is responsible for
    /// checking that the product exists.
    async fn create_review(&self, review: NewReview) -> Result<Review, StoreError>;

    // -- Cart ---------------------------------------------------------------

    /// Fetch the user's cart, creating an empty one if absent.
    async fn get_or_create_cart(&self, user_id: &UserId) -> Result<Cart, StoreError>;

    /// Add one unit of a product: increments an existing line or appends a
    /// new one. Creates the cart if absent.
    async fn add_to_cart(&self, user_id: &UserId, product_id: ProductId)
    -> Result<Cart, StoreError>;

    /// Set the quantity of an existing line.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the cart or the line is absent.
    async fn set_cart_quantity(
        &self,
        user_id: &UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart, StoreError>;

    /// Remove a line entirely. Removing an absent line is a silent no-op.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the cart itself is absent.
    async fn remove_cart_item(
        &self,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Cart, StoreError>;

    /// Delete all line items of the user's cart, keeping the cart row.
    /// A missing cart is not an error.
    async fn clear_cart(&self, user_id: &UserId) -> Result<(), StoreError>;

    // -- Orders -------------------------------------------------------------

    /// Create an order: snapshot the address, copy the line items, stamp the
    /// owner, default PENDING/PENDING/CREDIT_CARD. Stock availability is NOT
    /// validated here, only at fulfillment.
    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError>;

    /// Get an order by id (no ownership check; that belongs to the handler).
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    /// Get an order with product expansion per line item.
    async fn get_order_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, StoreError>;

    /// List a user's orders with address expansion, newest first.
    async fn list_orders_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<OrderWithAddress>, StoreError>;

    /// List all orders with address and product/color expansion, newest
    /// first. Owner profiles are stamped with placeholders; the caller
    /// enriches them from the identity provider.
    async fn list_all_orders(&self) -> Result<Vec<AdminOrder>, StoreError>;

    // -- Fulfillment --------------------------------------------------------

    /// Atomically apply the paid transition to an order:
    ///
    /// 1. re-check the `PENDING` payment-status guard,
    /// 2. decrement each line item's product stock by its quantity,
    /// 3. set payment status `PAID` and order status `FULFILLED`.
    ///
    /// All three steps happen inside one atomic unit (a transaction holding
    /// a lock on the order row in `PostgreSQL`, a single write-lock scope in
    /// memory), so concurrent duplicate deliveries serialize and a failure
    /// rolls back to a clean `PENDING` order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the order or any referenced
    /// product is absent; the order then remains `PENDING` so the gateway's
    /// redelivery can retry.
    async fn apply_fulfillment(&self, id: OrderId) -> Result<FulfillmentOutcome, StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
