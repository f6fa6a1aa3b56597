//! `PostgreSQL`-backed store implementation.
//!
//! All queries are runtime-checked (`sqlx::query`/`query_as` with `FromRow`
//! row structs and `TryFrom` row-to-model conversion). Status enums are
//! stored as TEXT and parsed on read; an unparseable value maps to
//! [`StoreError::DataCorruption`].

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use clementine_core::{
    AddressId, BrandId, CartId, CategoryId, ColorId, OrderId, PaymentStatus, ProductId, ReviewId,
    Specification, UserId,
};

use crate::models::{
    AdminOrder, AdminOrderItem, AdminOrderUser, Address, Brand, BrandUpdate, Cart, CartItem,
    Category, CategorySummary, CategoryUpdate, Color, ColorUpdate, NewBrand, NewCategory,
    NewColor, NewOrder, NewProduct, NewReview, Order, OrderDetail, OrderItem, OrderItemDetail,
    OrderWithAddress, Product, ProductUpdate, ProductWithCategory, Review,
};

use super::{FulfillmentOutcome, Store, StoreError};

const PRODUCT_COLUMNS: &str = "id, category_id, brand_id, color_id, name, price, stock, images, \
                               description, specifications, gateway_price_id, created_at, updated_at";

/// Store backed by a `PostgreSQL` connection pool.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a reference to the underlying pool (readiness checks).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn cart_id_for_user(&self, user_id: &UserId) -> Result<Option<CartId>, StoreError> {
        let row = sqlx::query("SELECT id FROM cart WHERE user_id = $1")
            .bind(user_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| CartId::from_uuid(r.get("id"))))
    }

    async fn cart_view(&self, id: CartId, user_id: &UserId) -> Result<Cart, StoreError> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT ci.quantity, \
                    p.id AS product_id, p.category_id, p.brand_id, p.color_id, p.name, p.price, \
                    p.stock, p.images, p.description, p.specifications, p.gateway_price_id, \
                    p.created_at, p.updated_at \
             FROM cart_item ci \
             LEFT JOIN product p ON p.id = ci.product_id \
             WHERE ci.cart_id = $1 \
             ORDER BY ci.added_at",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(CartItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Cart {
            id,
            user_id: user_id.clone(),
            items,
        })
    }

    async fn order_items(&self, id: OrderId) -> Result<Vec<OrderItem>, StoreError> {
        let rows = sqlx::query(
            "SELECT product_id, quantity FROM order_item WHERE order_id = $1 ORDER BY position",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| OrderItem {
                product_id: ProductId::from_uuid(r.get("product_id")),
                quantity: r.get("quantity"),
            })
            .collect())
    }
}

// =============================================================================
// Row types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    category_id: Uuid,
    brand_id: Uuid,
    color_id: Uuid,
    name: String,
    price: Decimal,
    stock: i32,
    images: Vec<String>,
    description: Option<String>,
    specifications: serde_json::Value,
    gateway_price_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, StoreError> {
        let specifications: Vec<Specification> = serde_json::from_value(row.specifications)
            .map_err(|e| {
                StoreError::DataCorruption(format!("invalid product specifications: {e}"))
            })?;

        Ok(Self {
            id: ProductId::from_uuid(row.id),
            category_id: CategoryId::from_uuid(row.category_id),
            brand_id: BrandId::from_uuid(row.brand_id),
            color_id: ColorId::from_uuid(row.color_id),
            name: row.name,
            price: row.price,
            stock: row.stock,
            images: row.images,
            description: row.description,
            specifications,
            gateway_price_id: row.gateway_price_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Product columns joined through a nullable reference (cart and order
/// items). All fields are `Option` because the product may be gone.
#[derive(sqlx::FromRow)]
struct JoinedProductRow {
    product_id: Option<Uuid>,
    category_id: Option<Uuid>,
    brand_id: Option<Uuid>,
    color_id: Option<Uuid>,
    name: Option<String>,
    price: Option<Decimal>,
    stock: Option<i32>,
    images: Option<Vec<String>>,
    description: Option<String>,
    specifications: Option<serde_json::Value>,
    gateway_price_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl JoinedProductRow {
    fn into_product(self) -> Result<Option<Product>, StoreError> {
        let (Some(id), Some(category_id), Some(brand_id), Some(color_id)) =
            (self.product_id, self.category_id, self.brand_id, self.color_id)
        else {
            return Ok(None);
        };

        let missing =
            || StoreError::DataCorruption("joined product row missing column".to_string());

        let specifications: Vec<Specification> =
            serde_json::from_value(self.specifications.ok_or_else(missing)?).map_err(|e| {
                StoreError::DataCorruption(format!("invalid product specifications: {e}"))
            })?;

        Ok(Some(Product {
            id: ProductId::from_uuid(id),
            category_id: CategoryId::from_uuid(category_id),
            brand_id: BrandId::from_uuid(brand_id),
            color_id: ColorId::from_uuid(color_id),
            name: self.name.ok_or_else(missing)?,
            price: self.price.ok_or_else(missing)?,
            stock: self.stock.ok_or_else(missing)?,
            images: self.images.ok_or_else(missing)?,
            description: self.description,
            specifications,
            gateway_price_id: self.gateway_price_id,
            created_at: self.created_at.ok_or_else(missing)?,
            updated_at: self.updated_at.ok_or_else(missing)?,
        }))
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    quantity: i32,
    #[sqlx(flatten)]
    product: JoinedProductRow,
}

impl TryFrom<CartItemRow> for CartItem {
    type Error = StoreError;

    fn try_from(row: CartItemRow) -> Result<Self, StoreError> {
        Ok(Self {
            product: row.product.into_product()?,
            quantity: row.quantity,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: String,
    address_id: Uuid,
    order_status: String,
    payment_method: String,
    payment_status: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, StoreError> {
        Ok(Order {
            id: OrderId::from_uuid(self.id),
            user_id: UserId::new(self.user_id),
            address_id: AddressId::from_uuid(self.address_id),
            items,
            order_status: parse_status(&self.order_status)?,
            payment_method: parse_status(&self.payment_method)?,
            payment_status: parse_status(&self.payment_status)?,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: Uuid,
    line_1: String,
    line_2: Option<String>,
    city: String,
    phone: String,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Self {
            id: AddressId::from_uuid(row.id),
            line_1: row.line_1,
            line_2: row.line_2,
            city: row.city,
            phone: row.phone,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ReviewRow {
    id: Uuid,
    product_id: Uuid,
    review: String,
    rating: i32,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<ReviewRow> for Review {
    fn from(row: ReviewRow) -> Self {
        Self {
            id: ReviewId::from_uuid(row.id),
            product_id: ProductId::from_uuid(row.product_id),
            review: row.review,
            rating: row.rating,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

fn parse_status<T>(s: &str) -> Result<T, StoreError>
where
    T: FromStr<Err = String>,
{
    T::from_str(s).map_err(StoreError::DataCorruption)
}

fn conflict_on_unique(e: sqlx::Error, what: &str) -> StoreError {
    if let Some(db) = e.as_database_error()
        && db.is_unique_violation()
    {
        return StoreError::Conflict(format!("duplicate {what}"));
    }
    StoreError::Database(e)
}

// =============================================================================
// Store implementation
// =============================================================================

#[async_trait]
impl Store for PostgresStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }

    async fn list_products(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Vec<Product>, StoreError> {
        let rows = match category {
            Some(category) => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM product WHERE category_id = $1 ORDER BY created_at"
                ))
                .bind(category.as_uuid())
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, ProductRow>(&format!(
                    "SELECT {PRODUCT_COLUMNS} FROM product ORDER BY created_at"
                ))
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let specifications = serde_json::to_value(&product.specifications)
            .map_err(|e| StoreError::DataCorruption(e.to_string()))?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO product \
                 (id, category_id, brand_id, color_id, name, price, stock, images, description, specifications) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(ProductId::new().as_uuid())
        .bind(product.category_id.as_uuid())
        .bind(product.brand_id.as_uuid())
        .bind(product.color_id.as_uuid())
        .bind(&product.name)
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.images)
        .bind(&product.description)
        .bind(specifications)
        .fetch_one(&self.pool)
        .await?;

        Product::try_from(row)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StoreError> {
        let specifications = update
            .specifications
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .map_err(|e| StoreError::DataCorruption(e.to_string()))?;

        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "UPDATE product SET \
                 category_id = COALESCE($2, category_id), \
                 brand_id = COALESCE($3, brand_id), \
                 color_id = COALESCE($4, color_id), \
                 name = COALESCE($5, name), \
                 price = COALESCE($6, price), \
                 stock = COALESCE($7, stock), \
                 images = COALESCE($8, images), \
                 description = COALESCE($9, description), \
                 specifications = COALESCE($10, specifications), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(id.as_uuid())
        .bind(update.category_id.map(|id| id.as_uuid()))
        .bind(update.brand_id.map(|id| id.as_uuid()))
        .bind(update.color_id.map(|id| id.as_uuid()))
        .bind(update.name)
        .bind(update.price)
        .bind(update.stock)
        .bind(update.images)
        .bind(update.description)
        .bind(specifications)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM product WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_gateway_price_id(
        &self,
        id: ProductId,
        price_id: &str,
    ) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE product SET gateway_price_id = $2, updated_at = now() WHERE id = $1")
                .bind(id.as_uuid())
                .bind(price_id)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("product"));
        }
        Ok(())
    }

    async fn products_missing_gateway_price(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM product WHERE gateway_price_id IS NULL ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn list_products_in_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ProductWithCategory>, StoreError> {
        let summary = sqlx::query("SELECT name, slug FROM category WHERE id = $1")
            .bind(category.as_uuid())
            .fetch_optional(&self.pool)
            .await?
            .map(|r| CategorySummary {
                name: r.get("name"),
                slug: r.get("slug"),
            });

        let products = self.list_products(Some(category)).await?;

        Ok(products
            .into_iter()
            .map(|product| ProductWithCategory {
                product,
                category: summary.clone(),
            })
            .collect())
    }

    async fn reviews_for_product(&self, id: ProductId) -> Result<Vec<Review>, StoreError> {
        let rows = sqlx::query_as::<_, ReviewRow>(
            "SELECT id, product_id, review, rating, name, created_at \
             FROM review WHERE product_id = $1 ORDER BY created_at",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Review::from).collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let rows = sqlx::query("SELECT id, name, slug FROM category ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| Category {
                id: CategoryId::from_uuid(r.get("id")),
                name: r.get("name"),
                slug: r.get("slug"),
            })
            .collect())
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query("SELECT id, name, slug FROM category WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Category {
            id: CategoryId::from_uuid(r.get("id")),
            name: r.get("name"),
            slug: r.get("slug"),
        }))
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query("SELECT id, name, slug FROM category WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Category {
            id: CategoryId::from_uuid(r.get("id")),
            name: r.get("name"),
            slug: r.get("slug"),
        }))
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let row = sqlx::query(
            "INSERT INTO category (id, name, slug) VALUES ($1, $2, $3) RETURNING id, name, slug",
        )
        .bind(CategoryId::new().as_uuid())
        .bind(&category.name)
        .bind(&category.slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category slug"))?;

        Ok(Category {
            id: CategoryId::from_uuid(row.get("id")),
            name: row.get("name"),
            slug: row.get("slug"),
        })
    }

    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>, StoreError> {
        let row = sqlx::query(
            "UPDATE category SET name = COALESCE($2, name), slug = COALESCE($3, slug) \
             WHERE id = $1 RETURNING id, name, slug",
        )
        .bind(id.as_uuid())
        .bind(update.name)
        .bind(update.slug)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| conflict_on_unique(e, "category slug"))?;

        Ok(row.map(|r| Category {
            id: CategoryId::from_uuid(r.get("id")),
            name: r.get("name"),
            slug: r.get("slug"),
        }))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM category WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_brands(&self) -> Result<Vec<Brand>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM brand ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| Brand {
                id: BrandId::from_uuid(r.get("id")),
                name: r.get("name"),
            })
            .collect())
    }

    async fn get_brand(&self, id: BrandId) -> Result<Option<Brand>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM brand WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Brand {
            id: BrandId::from_uuid(r.get("id")),
            name: r.get("name"),
        }))
    }

    async fn create_brand(&self, brand: NewBrand) -> Result<Brand, StoreError> {
        let row = sqlx::query("INSERT INTO brand (id, name) VALUES ($1, $2) RETURNING id, name")
            .bind(BrandId::new().as_uuid())
            .bind(&brand.name)
            .fetch_one(&self.pool)
            .await?;

        Ok(Brand {
            id: BrandId::from_uuid(row.get("id")),
            name: row.get("name"),
        })
    }

    async fn update_brand(
        &self,
        id: BrandId,
        update: BrandUpdate,
    ) -> Result<Option<Brand>, StoreError> {
        let row = sqlx::query(
            "UPDATE brand SET name = COALESCE($2, name) WHERE id = $1 RETURNING id, name",
        )
        .bind(id.as_uuid())
        .bind(update.name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Brand {
            id: BrandId::from_uuid(r.get("id")),
            name: r.get("name"),
        }))
    }

    async fn delete_brand(&self, id: BrandId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM brand WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_colors(&self) -> Result<Vec<Color>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM color ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|r| Color {
                id: ColorId::from_uuid(r.get("id")),
                name: r.get("name"),
            })
            .collect())
    }

    async fn get_color(&self, id: ColorId) -> Result<Option<Color>, StoreError> {
        let row = sqlx::query("SELECT id, name FROM color WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| Color {
            id: ColorId::from_uuid(r.get("id")),
            name: r.get("name"),
        }))
    }

    async fn create_color(&self, color: NewColor) -> Result<Color, StoreError> {
        let row = sqlx::query("INSERT INTO color (id, name) VALUES ($1, $2) RETURNING id, name")
            .bind(ColorId::new().as_uuid())
            .bind(&color.name)
            .fetch_one(&self.pool)
            .await?;

        Ok(Color {
            id: ColorId::from_uuid(row.get("id")),
            name: row.get("name"),
        })
    }

    async fn update_color(
        &self,
        id: ColorId,
        update: ColorUpdate,
    ) -> Result<Option<Color>, StoreError> {
        let row = sqlx::query(
            "UPDATE color SET name = COALESCE($2, name) WHERE id = $1 RETURNING id, name",
        )
        .bind(id.as_uuid())
        .bind(update.name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Color {
            id: ColorId::from_uuid(r.get("id")),
            name: r.get("name"),
        }))
    }

    async fn delete_color(&self, id: ColorId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM color WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, StoreError> {
        let row = sqlx::query_as::<_, ReviewRow>(
            "INSERT INTO review (id, product_id, review, rating, name) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, product_id, review, rating, name, created_at",
        )
        .bind(ReviewId::new().as_uuid())
        .bind(review.product_id.as_uuid())
        .bind(&review.review)
        .bind(review.rating)
        .bind(&review.name)
        .fetch_one(&self.pool)
        .await?;

        Ok(Review::from(row))
    }

    async fn get_or_create_cart(&self, user_id: &UserId) -> Result<Cart, StoreError> {
        let id = match self.cart_id_for_user(user_id).await? {
            Some(id) => id,
            None => {
                let row = sqlx::query(
                    "INSERT INTO cart (id, user_id) VALUES ($1, $2) \
                     ON CONFLICT (user_id) DO UPDATE SET updated_at = now() \
                     RETURNING id",
                )
                .bind(CartId::new().as_uuid())
                .bind(user_id.as_str())
                .fetch_one(&self.pool)
                .await?;
                CartId::from_uuid(row.get("id"))
            }
        };

        self.cart_view(id, user_id).await
    }

    async fn add_to_cart(
        &self,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Cart, StoreError> {
        let cart = self.get_or_create_cart(user_id).await?;

        sqlx::query(
            "INSERT INTO cart_item (cart_id, product_id, quantity) VALUES ($1, $2, 1) \
             ON CONFLICT (cart_id, product_id) \
             DO UPDATE SET quantity = cart_item.quantity + 1",
        )
        .bind(cart.id.as_uuid())
        .bind(product_id.as_uuid())
        .execute(&self.pool)
        .await?;

        self.cart_view(cart.id, user_id).await
    }

    async fn set_cart_quantity(
        &self,
        user_id: &UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart, StoreError> {
        let id = self
            .cart_id_for_user(user_id)
            .await?
            .ok_or(StoreError::NotFound("cart"))?;

        let result =
            sqlx::query("UPDATE cart_item SET quantity = $3 WHERE cart_id = $1 AND product_id = $2")
                .bind(id.as_uuid())
                .bind(product_id.as_uuid())
                .bind(quantity)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("cart item"));
        }

        self.cart_view(id, user_id).await
    }

    async fn remove_cart_item(
        &self,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Cart, StoreError> {
        let id = self
            .cart_id_for_user(user_id)
            .await?
            .ok_or(StoreError::NotFound("cart"))?;

        // Removing an absent line is a silent no-op.
        sqlx::query("DELETE FROM cart_item WHERE cart_id = $1 AND product_id = $2")
            .bind(id.as_uuid())
            .bind(product_id.as_uuid())
            .execute(&self.pool)
            .await?;

        self.cart_view(id, user_id).await
    }

    async fn clear_cart(&self, user_id: &UserId) -> Result<(), StoreError> {
        sqlx::query(
            "DELETE FROM cart_item WHERE cart_id = (SELECT id FROM cart WHERE user_id = $1)",
        )
        .bind(user_id.as_str())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let address_id = AddressId::new();
        sqlx::query("INSERT INTO address (id, line_1, line_2, city, phone) VALUES ($1, $2, $3, $4, $5)")
            .bind(address_id.as_uuid())
            .bind(&order.address.line_1)
            .bind(&order.address.line_2)
            .bind(&order.address.city)
            .bind(&order.address.phone)
            .execute(&mut *tx)
            .await?;

        let order_id = OrderId::new();
        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (id, user_id, address_id) VALUES ($1, $2, $3) \
             RETURNING id, user_id, address_id, order_status, payment_method, payment_status, created_at",
        )
        .bind(order_id.as_uuid())
        .bind(order.user_id.as_str())
        .bind(address_id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;

        let mut items = Vec::with_capacity(order.items.len());
        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position)
                .map_err(|_| StoreError::DataCorruption("order item position overflow".into()))?;
            sqlx::query(
                "INSERT INTO order_item (order_id, position, product_id, quantity) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id.as_uuid())
            .bind(position)
            .bind(item.product_id.as_uuid())
            .bind(item.quantity)
            .execute(&mut *tx)
            .await?;
            items.push(OrderItem {
                product_id: item.product_id,
                quantity: item.quantity,
            });
        }

        tx.commit().await?;

        row.into_order(items)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, address_id, order_status, payment_method, payment_status, created_at \
             FROM orders WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let items = self.order_items(id).await?;
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    async fn get_order_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, StoreError> {
        let Some(order) = self.get_order(id).await? else {
            return Ok(None);
        };

        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT oi.quantity, \
                    p.id AS product_id, p.category_id, p.brand_id, p.color_id, p.name, p.price, \
                    p.stock, p.images, p.description, p.specifications, p.gateway_price_id, \
                    p.created_at, p.updated_at \
             FROM order_item oi \
             LEFT JOIN product p ON p.id = oi.product_id \
             WHERE oi.order_id = $1 \
             ORDER BY oi.position",
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(|row| {
                Ok::<_, StoreError>(OrderItemDetail {
                    product: row.product.into_product()?,
                    quantity: row.quantity,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(OrderDetail {
            id: order.id,
            user_id: order.user_id,
            address_id: order.address_id,
            items,
            order_status: order.order_status,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            created_at: order.created_at,
        }))
    }

    async fn list_orders_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<OrderWithAddress>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, address_id, order_status, payment_method, payment_status, created_at \
             FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let id = OrderId::from_uuid(row.id);
            let address = sqlx::query_as::<_, AddressRow>(
                "SELECT id, line_1, line_2, city, phone FROM address WHERE id = $1",
            )
            .bind(row.address_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Address::from);

            let items = self.order_items(id).await?;
            orders.push(OrderWithAddress {
                order: row.into_order(items)?,
                address,
            });
        }

        Ok(orders)
    }

    async fn list_all_orders(&self) -> Result<Vec<AdminOrder>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, address_id, order_status, payment_method, payment_status, created_at \
             FROM orders ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let id = OrderId::from_uuid(row.id);

            let address = sqlx::query_as::<_, AddressRow>(
                "SELECT id, line_1, line_2, city, phone FROM address WHERE id = $1",
            )
            .bind(row.address_id)
            .fetch_optional(&self.pool)
            .await?
            .map(Address::from);

            let item_rows = sqlx::query_as::<_, CartItemRow>(
                "SELECT oi.quantity, \
                        p.id AS product_id, p.category_id, p.brand_id, p.color_id, p.name, p.price, \
                        p.stock, p.images, p.description, p.specifications, p.gateway_price_id, \
                        p.created_at, p.updated_at \
                 FROM order_item oi \
                 LEFT JOIN product p ON p.id = oi.product_id \
                 WHERE oi.order_id = $1 \
                 ORDER BY oi.position",
            )
            .bind(id.as_uuid())
            .fetch_all(&self.pool)
            .await?;

            let mut items = Vec::with_capacity(item_rows.len());
            for item_row in item_rows {
                let quantity = item_row.quantity;
                let product = item_row.product.into_product()?;
                let color = match &product {
                    Some(product) => self.get_color(product.color_id).await?,
                    None => None,
                };
                items.push(AdminOrderItem {
                    product,
                    color,
                    quantity,
                });
            }

            orders.push(AdminOrder {
                id,
                user_id: UserId::new(row.user_id.clone()),
                items,
                order_status: parse_status(&row.order_status)?,
                payment_method: parse_status(&row.payment_method)?,
                payment_status: parse_status(&row.payment_status)?,
                created_at: row.created_at,
                address,
                user: AdminOrderUser::placeholder(),
            });
        }

        Ok(orders)
    }

    async fn apply_fulfillment(&self, id: OrderId) -> Result<FulfillmentOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Lock the order row so concurrent duplicate deliveries serialize
        // on the guard check.
        let row = sqlx::query("SELECT user_id, payment_status FROM orders WHERE id = $1 FOR UPDATE")
            .bind(id.as_uuid())
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("order"))?;

        let payment_status: PaymentStatus = parse_status(&row.get::<String, _>("payment_status"))?;
        if payment_status != PaymentStatus::Pending {
            return Ok(FulfillmentOutcome::AlreadyProcessed);
        }
        let user_id = UserId::new(row.get::<String, _>("user_id"));

        let items = sqlx::query(
            "SELECT product_id, quantity FROM order_item WHERE order_id = $1 ORDER BY position",
        )
        .bind(id.as_uuid())
        .fetch_all(&mut *tx)
        .await?;

        for item in items {
            let product_id: Uuid = item.get("product_id");
            let quantity: i32 = item.get("quantity");

            let updated = sqlx::query(
                "UPDATE product SET stock = stock - $2, updated_at = now() \
                 WHERE id = $1 RETURNING stock",
            )
            .bind(product_id)
            .bind(quantity)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::NotFound("product"))?;

            let stock: i32 = updated.get("stock");
            if stock < 0 {
                tracing::warn!(
                    product_id = %product_id,
                    stock,
                    "fulfillment drove product stock negative"
                );
            }
        }

        sqlx::query(
            "UPDATE orders SET payment_status = 'PAID', order_status = 'FULFILLED' WHERE id = $1",
        )
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(FulfillmentOutcome::Applied { user_id })
    }
}
