//! In-memory store implementation.
//!
//! Used by the in-process API tests and available for local runs without a
//! database. Semantics mirror [`super::PostgresStore`]: one cart per user,
//! insertion-ordered listings, and an atomic fulfillment transition applied
//! under a single write lock.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use clementine_core::{
    AddressId, BrandId, CartId, CategoryId, ColorId, OrderId, OrderStatus, PaymentMethod,
    PaymentStatus, ProductId, ReviewId, UserId,
};

use crate::models::{
    AdminOrder, AdminOrderItem, AdminOrderUser, Address, Brand, BrandUpdate, Cart, CartItem,
    Category, CategorySummary, CategoryUpdate, Color, ColorUpdate, NewBrand, NewCategory,
    NewColor, NewOrder, NewProduct, NewReview, Order, OrderDetail, OrderItem, OrderItemDetail,
    OrderWithAddress, Product, ProductUpdate, ProductWithCategory, Review,
};

use super::{FulfillmentOutcome, Store, StoreError};

#[derive(Debug, Clone)]
struct StoredCart {
    id: CartId,
    // (product, quantity) in insertion order
    lines: Vec<(ProductId, i32)>,
}

#[derive(Debug, Default)]
struct Inner {
    products: Vec<Product>,
    categories: Vec<Category>,
    brands: Vec<Brand>,
    colors: Vec<Color>,
    reviews: Vec<Review>,
    addresses: HashMap<AddressId, Address>,
    carts: HashMap<UserId, StoredCart>,
    orders: Vec<Order>,
}

impl Inner {
    fn cart_view(&self, cart: &StoredCart, user_id: &UserId) -> Cart {
        Cart {
            id: cart.id,
            user_id: user_id.clone(),
            items: cart
                .lines
                .iter()
                .map(|&(product_id, quantity)| CartItem {
                    product: self.products.iter().find(|p| p.id == product_id).cloned(),
                    quantity,
                })
                .collect(),
        }
    }

    fn product(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// Store backed by process memory behind a `tokio` read/write lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_products(
        &self,
        category: Option<CategoryId>,
    ) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .iter()
            .filter(|p| category.is_none_or(|c| p.category_id == c))
            .cloned()
            .collect())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.product(id).cloned())
    }

    async fn create_product(&self, product: NewProduct) -> Result<Product, StoreError> {
        let now = Utc::now();
        let product = Product {
            id: ProductId::new(),
            category_id: product.category_id,
            brand_id: product.brand_id,
            color_id: product.color_id,
            name: product.name,
            price: product.price,
            stock: product.stock,
            images: product.images,
            description: product.description,
            specifications: product.specifications,
            gateway_price_id: None,
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: ProductUpdate,
    ) -> Result<Option<Product>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(product) = inner.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };

        if let Some(v) = update.category_id {
            product.category_id = v;
        }
        if let Some(v) = update.brand_id {
            product.brand_id = v;
        }
        if let Some(v) = update.color_id {
            product.color_id = v;
        }
        if let Some(v) = update.name {
            product.name = v;
        }
        if let Some(v) = update.price {
            product.price = v;
        }
        if let Some(v) = update.stock {
            product.stock = v;
        }
        if let Some(v) = update.images {
            product.images = v;
        }
        if let Some(v) = update.description {
            product.description = Some(v);
        }
        if let Some(v) = update.specifications {
            product.specifications = v;
        }
        product.updated_at = Utc::now();

        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        Ok(inner.products.len() < before)
    }

    async fn set_gateway_price_id(
        &self,
        id: ProductId,
        price_id: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let product = inner
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::NotFound("product"))?;
        product.gateway_price_id = Some(price_id.to_string());
        product.updated_at = Utc::now();
        Ok(())
    }

    async fn products_missing_gateway_price(&self) -> Result<Vec<Product>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .products
            .iter()
            .filter(|p| p.gateway_price_id.is_none())
            .cloned()
            .collect())
    }

    async fn list_products_in_category(
        &self,
        category: CategoryId,
    ) -> Result<Vec<ProductWithCategory>, StoreError> {
        let inner = self.inner.read().await;
        let summary = inner
            .categories
            .iter()
            .find(|c| c.id == category)
            .map(|c| CategorySummary {
                name: c.name.clone(),
                slug: c.slug.clone(),
            });

        Ok(inner
            .products
            .iter()
            .filter(|p| p.category_id == category)
            .map(|product| ProductWithCategory {
                product: product.clone(),
                category: summary.clone(),
            })
            .collect())
    }

    async fn reviews_for_product(&self, id: ProductId) -> Result<Vec<Review>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .reviews
            .iter()
            .filter(|r| r.product_id == id)
            .cloned()
            .collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        let mut categories = self.inner.read().await.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn get_category_by_slug(&self, slug: &str) -> Result<Option<Category>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.categories.iter().find(|c| c.slug == slug).cloned())
    }

    async fn create_category(&self, category: NewCategory) -> Result<Category, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.categories.iter().any(|c| c.slug == category.slug) {
            return Err(StoreError::Conflict("duplicate category slug".to_string()));
        }
        let category = Category {
            id: CategoryId::new(),
            name: category.name,
            slug: category.slug,
        };
        inner.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> Result<Option<Category>, StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(slug) = &update.slug
            && inner.categories.iter().any(|c| c.id != id && c.slug == *slug)
        {
            return Err(StoreError::Conflict("duplicate category slug".to_string()));
        }
        let Some(category) = inner.categories.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(v) = update.name {
            category.name = v;
        }
        if let Some(v) = update.slug {
            category.slug = v;
        }
        Ok(Some(category.clone()))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.categories.len();
        inner.categories.retain(|c| c.id != id);
        Ok(inner.categories.len() < before)
    }

    async fn list_brands(&self) -> Result<Vec<Brand>, StoreError> {
        let mut brands = self.inner.read().await.brands.clone();
        brands.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(brands)
    }

    async fn get_brand(&self, id: BrandId) -> Result<Option<Brand>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.brands.iter().find(|b| b.id == id).cloned())
    }

    async fn create_brand(&self, brand: NewBrand) -> Result<Brand, StoreError> {
        let brand = Brand {
            id: BrandId::new(),
            name: brand.name,
        };
        self.inner.write().await.brands.push(brand.clone());
        Ok(brand)
    }

    async fn update_brand(
        &self,
        id: BrandId,
        update: BrandUpdate,
    ) -> Result<Option<Brand>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(brand) = inner.brands.iter_mut().find(|b| b.id == id) else {
            return Ok(None);
        };
        if let Some(v) = update.name {
            brand.name = v;
        }
        Ok(Some(brand.clone()))
    }

    async fn delete_brand(&self, id: BrandId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.brands.len();
        inner.brands.retain(|b| b.id != id);
        Ok(inner.brands.len() < before)
    }

    async fn list_colors(&self) -> Result<Vec<Color>, StoreError> {
        let mut colors = self.inner.read().await.colors.clone();
        colors.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(colors)
    }

    async fn get_color(&self, id: ColorId) -> Result<Option<Color>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.colors.iter().find(|c| c.id == id).cloned())
    }

    async fn create_color(&self, color: NewColor) -> Result<Color, StoreError> {
        let color = Color {
            id: ColorId::new(),
            name: color.name,
        };
        self.inner.write().await.colors.push(color.clone());
        Ok(color)
    }

    async fn update_color(
        &self,
        id: ColorId,
        update: ColorUpdate,
    ) -> Result<Option<Color>, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(color) = inner.colors.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        if let Some(v) = update.name {
            color.name = v;
        }
        Ok(Some(color.clone()))
    }

    async fn delete_color(&self, id: ColorId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.colors.len();
        inner.colors.retain(|c| c.id != id);
        Ok(inner.colors.len() < before)
    }

    async fn create_review(&self, review: NewReview) -> Result<Review, StoreError> {
        let review = Review {
            id: ReviewId::new(),
            product_id: review.product_id,
            review: review.review,
            rating: review.rating,
            name: review.name,
            created_at: Utc::now(),
        };
        self.inner.write().await.reviews.push(review.clone());
        Ok(review)
    }

    async fn get_or_create_cart(&self, user_id: &UserId) -> Result<Cart, StoreError> {
        let mut inner = self.inner.write().await;
        if !inner.carts.contains_key(user_id) {
            inner.carts.insert(
                user_id.clone(),
                StoredCart {
                    id: CartId::new(),
                    lines: Vec::new(),
                },
            );
        }
        let cart = inner
            .carts
            .get(user_id)
            .cloned()
            .ok_or(StoreError::NotFound("cart"))?;
        Ok(inner.cart_view(&cart, user_id))
    }

    async fn add_to_cart(
        &self,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Cart, StoreError> {
        let mut inner = self.inner.write().await;
        let cart = inner.carts.entry(user_id.clone()).or_insert_with(|| StoredCart {
            id: CartId::new(),
            lines: Vec::new(),
        });

        match cart.lines.iter_mut().find(|(id, _)| *id == product_id) {
            Some((_, quantity)) => *quantity += 1,
            None => cart.lines.push((product_id, 1)),
        }

        let cart = cart.clone();
        Ok(inner.cart_view(&cart, user_id))
    }

    async fn set_cart_quantity(
        &self,
        user_id: &UserId,
        product_id: ProductId,
        quantity: i32,
    ) -> Result<Cart, StoreError> {
        let mut inner = self.inner.write().await;
        let cart = inner
            .carts
            .get_mut(user_id)
            .ok_or(StoreError::NotFound("cart"))?;
        let line = cart
            .lines
            .iter_mut()
            .find(|(id, _)| *id == product_id)
            .ok_or(StoreError::NotFound("cart item"))?;
        line.1 = quantity;

        let cart = cart.clone();
        Ok(inner.cart_view(&cart, user_id))
    }

    async fn remove_cart_item(
        &self,
        user_id: &UserId,
        product_id: ProductId,
    ) -> Result<Cart, StoreError> {
        let mut inner = self.inner.write().await;
        let cart = inner
            .carts
            .get_mut(user_id)
            .ok_or(StoreError::NotFound("cart"))?;
        cart.lines.retain(|(id, _)| *id != product_id);

        let cart = cart.clone();
        Ok(inner.cart_view(&cart, user_id))
    }

    async fn clear_cart(&self, user_id: &UserId) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(cart) = inner.carts.get_mut(user_id) {
            cart.lines.clear();
        }
        Ok(())
    }

    async fn create_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut inner = self.inner.write().await;

        let address = Address {
            id: AddressId::new(),
            line_1: order.address.line_1,
            line_2: order.address.line_2,
            city: order.address.city,
            phone: order.address.phone,
        };
        let address_id = address.id;
        inner.addresses.insert(address_id, address);

        let order = Order {
            id: OrderId::new(),
            user_id: order.user_id,
            address_id,
            items: order
                .items
                .into_iter()
                .map(|item| OrderItem {
                    product_id: item.product_id,
                    quantity: item.quantity,
                })
                .collect(),
            order_status: OrderStatus::default(),
            payment_method: PaymentMethod::default(),
            payment_status: PaymentStatus::default(),
            created_at: Utc::now(),
        };
        inner.orders.push(order.clone());
        Ok(order)
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.orders.iter().find(|o| o.id == id).cloned())
    }

    async fn get_order_detail(&self, id: OrderId) -> Result<Option<OrderDetail>, StoreError> {
        let inner = self.inner.read().await;
        let Some(order) = inner.orders.iter().find(|o| o.id == id) else {
            return Ok(None);
        };

        Ok(Some(OrderDetail {
            id: order.id,
            user_id: order.user_id.clone(),
            address_id: order.address_id,
            items: order
                .items
                .iter()
                .map(|item| OrderItemDetail {
                    product: inner.product(item.product_id).cloned(),
                    quantity: item.quantity,
                })
                .collect(),
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
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .filter(|o| o.user_id == *user_id)
            .rev()
            .map(|order| OrderWithAddress {
                order: order.clone(),
                address: inner.addresses.get(&order.address_id).cloned(),
            })
            .collect())
    }

    async fn list_all_orders(&self) -> Result<Vec<AdminOrder>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .orders
            .iter()
            .rev()
            .map(|order| AdminOrder {
                id: order.id,
                user_id: order.user_id.clone(),
                items: order
                    .items
                    .iter()
                    .map(|item| {
                        let product = inner.product(item.product_id).cloned();
                        let color = product.as_ref().and_then(|p| {
                            inner.colors.iter().find(|c| c.id == p.color_id).cloned()
                        });
                        AdminOrderItem {
                            product,
                            color,
                            quantity: item.quantity,
                        }
                    })
                    .collect(),
                order_status: order.order_status,
                payment_method: order.payment_method,
                payment_status: order.payment_status,
                created_at: order.created_at,
                address: inner.addresses.get(&order.address_id).cloned(),
                user: AdminOrderUser::placeholder(),
            })
            .collect())
    }

    async fn apply_fulfillment(&self, id: OrderId) -> Result<FulfillmentOutcome, StoreError> {
        // One write-lock scope makes the guard check and all mutations
        // atomic with respect to concurrent deliveries.
        let mut inner = self.inner.write().await;

        let order_index = inner
            .orders
            .iter()
            .position(|o| o.id == id)
            .ok_or(StoreError::NotFound("order"))?;

        let (user_id, items) = {
            let order = inner
                .orders
                .get(order_index)
                .ok_or(StoreError::NotFound("order"))?;
            if order.payment_status != PaymentStatus::Pending {
                return Ok(FulfillmentOutcome::AlreadyProcessed);
            }
            (order.user_id.clone(), order.items.clone())
        };

        // Validate every product reference before mutating anything, so a
        // missing product leaves the order cleanly PENDING.
        for item in &items {
            if inner.product(item.product_id).is_none() {
                return Err(StoreError::NotFound("product"));
            }
        }

        for item in &items {
            if let Some(product) = inner
                .products
                .iter_mut()
                .find(|p| p.id == item.product_id)
            {
                product.stock -= item.quantity;
                product.updated_at = Utc::now();
                if product.stock < 0 {
                    tracing::warn!(
                        product_id = %product.id,
                        stock = product.stock,
                        "fulfillment drove product stock negative"
                    );
                }
            }
        }

        if let Some(order) = inner.orders.get_mut(order_index) {
            order.payment_status = PaymentStatus::Paid;
            order.order_status = OrderStatus::Fulfilled;
        }

        Ok(FulfillmentOutcome::Applied { user_id })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use clementine_core::Specification;

    use crate::models::NewOrderItem;

    use super::*;

    fn new_product(name: &str, stock: i32) -> NewProduct {
        NewProduct {
            category_id: CategoryId::new(),
            brand_id: BrandId::new(),
            color_id: ColorId::new(),
            name: name.to_string(),
            price: Decimal::new(4999, 2),
            stock,
            images: vec![],
            description: None,
            specifications: vec![Specification::new("Material", "Aluminium")],
        }
    }

    fn new_order(user: &str, items: Vec<NewOrderItem>) -> NewOrder {
        NewOrder {
            user_id: UserId::new(user),
            address: crate::models::NewAddress {
                line_1: "12 Harbor Rd".to_string(),
                line_2: None,
                city: "Galle".to_string(),
                phone: "+94 77 000 0000".to_string(),
            },
            items,
        }
    }

    #[tokio::test]
    async fn add_to_cart_twice_increments_quantity() {
        let store = MemoryStore::new();
        let user = UserId::new("user_1");
        let product = store.create_product(new_product("Desk mat", 10)).await.unwrap();

        store.add_to_cart(&user, product.id).await.unwrap();
        let cart = store.add_to_cart(&user, product.id).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        let item = cart.items.first().unwrap();
        assert_eq!(item.quantity, 2);
        assert_eq!(item.product.as_ref().unwrap().id, product.id);
    }

    #[tokio::test]
    async fn set_quantity_requires_existing_line() {
        let store = MemoryStore::new();
        let user = UserId::new("user_1");
        let product = store.create_product(new_product("Desk mat", 10)).await.unwrap();

        // No cart yet
        let err = store
            .set_cart_quantity(&user, product.id, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("cart")));

        // Cart exists but line does not
        store.get_or_create_cart(&user).await.unwrap();
        let err = store
            .set_cart_quantity(&user, product.id, 3)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("cart item")));
    }

    #[tokio::test]
    async fn remove_absent_line_is_noop() {
        let store = MemoryStore::new();
        let user = UserId::new("user_1");
        store.get_or_create_cart(&user).await.unwrap();

        let cart = store
            .remove_cart_item(&user, ProductId::new())
            .await
            .unwrap();
        assert!(cart.items.is_empty());
    }

    #[tokio::test]
    async fn one_cart_per_user() {
        let store = MemoryStore::new();
        let user = UserId::new("user_1");
        let first = store.get_or_create_cart(&user).await.unwrap();
        let second = store.get_or_create_cart(&user).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn fulfillment_decrements_stock_and_flips_status() {
        let store = MemoryStore::new();
        let a = store.create_product(new_product("Keyboard", 10)).await.unwrap();
        let b = store.create_product(new_product("Mouse", 5)).await.unwrap();

        let order = store
            .create_order(new_order(
                "user_1",
                vec![
                    NewOrderItem {
                        product_id: a.id,
                        quantity: 3,
                    },
                    NewOrderItem {
                        product_id: b.id,
                        quantity: 1,
                    },
                ],
            ))
            .await
            .unwrap();

        let outcome = store.apply_fulfillment(order.id).await.unwrap();
        assert!(matches!(outcome, FulfillmentOutcome::Applied { .. }));

        assert_eq!(store.get_product(a.id).await.unwrap().unwrap().stock, 7);
        assert_eq!(store.get_product(b.id).await.unwrap().unwrap().stock, 4);

        let order = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Paid);
        assert_eq!(order.order_status, OrderStatus::Fulfilled);
    }

    #[tokio::test]
    async fn fulfillment_guard_blocks_redelivery() {
        let store = MemoryStore::new();
        let product = store.create_product(new_product("Keyboard", 10)).await.unwrap();

        let order = store
            .create_order(new_order(
                "user_1",
                vec![NewOrderItem {
                    product_id: product.id,
                    quantity: 2,
                }],
            ))
            .await
            .unwrap();

        store.apply_fulfillment(order.id).await.unwrap();
        let outcome = store.apply_fulfillment(order.id).await.unwrap();

        assert_eq!(outcome, FulfillmentOutcome::AlreadyProcessed);
        assert_eq!(
            store.get_product(product.id).await.unwrap().unwrap().stock,
            8
        );
    }

    #[tokio::test]
    async fn fulfillment_with_missing_product_leaves_order_pending() {
        let store = MemoryStore::new();
        let product = store.create_product(new_product("Keyboard", 10)).await.unwrap();

        let order = store
            .create_order(new_order(
                "user_1",
                vec![NewOrderItem {
                    product_id: product.id,
                    quantity: 2,
                }],
            ))
            .await
            .unwrap();

        store.delete_product(product.id).await.unwrap();

        let err = store.apply_fulfillment(order.id).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound("product")));

        let order = store.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.order_status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn clear_cart_keeps_cart_row() {
        let store = MemoryStore::new();
        let user = UserId::new("user_1");
        let product = store.create_product(new_product("Desk mat", 10)).await.unwrap();
        let cart = store.add_to_cart(&user, product.id).await.unwrap();

        store.clear_cart(&user).await.unwrap();

        let after = store.get_or_create_cart(&user).await.unwrap();
        assert_eq!(after.id, cart.id);
        assert!(after.items.is_empty());

        // Clearing a cart that does not exist is fine too.
        store.clear_cart(&UserId::new("user_2")).await.unwrap();
    }

    #[tokio::test]
    async fn empty_order_list_is_empty_not_error() {
        let store = MemoryStore::new();
        let orders = store
            .list_orders_for_user(&UserId::new("user_1"))
            .await
            .unwrap();
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn duplicate_category_slug_conflicts() {
        let store = MemoryStore::new();
        store
            .create_category(NewCategory {
                name: "Keyboards".to_string(),
                slug: "keyboards".to_string(),
            })
            .await
            .unwrap();

        let err = store
            .create_category(NewCategory {
                name: "Keyboards 2".to_string(),
                slug: "keyboards".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }
}
