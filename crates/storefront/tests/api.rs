//! In-process API tests.
//!
//! The full router runs against the in-memory store and stub gateway /
//! identity clients; requests go through `tower::ServiceExt::oneshot`, so
//! everything from routing and extractors to the fulfillment engine is
//! exercised without a database or network.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::Utc;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use clementine_core::{OrderId, UserId};
use clementine_storefront::config::{
    GatewayConfig, IdentityConfig, StorageConfig, StorefrontConfig,
};
use clementine_storefront::gateway::webhook::{SIGNATURE_HEADER, sign_payload};
use clementine_storefront::gateway::{
    CheckoutSession, CheckoutSessionRequest, GatewayError, GatewaySession, PaymentGateway,
};
use clementine_storefront::identity::{
    AuthenticatedUser, IdentityError, IdentityProvider, UserProfile,
};
use clementine_storefront::routes;
use clementine_storefront::state::AppState;
use clementine_storefront::store::MemoryStore;

const WEBHOOK_SECRET: &str = "whsec_test_secret";

// ============================================================================
// Test doubles
// ============================================================================

/// Gateway stub: sessions live in a map and are flipped to paid by tests.
#[derive(Default)]
struct StubGateway {
    sessions: Mutex<HashMap<String, GatewaySession>>,
    counter: AtomicUsize,
}

impl StubGateway {
    fn mark_paid(&self, session_id: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions.get_mut(session_id).unwrap();
        session.status = "complete".to_string();
        session.payment_status = "paid".to_string();
    }

    /// Insert a session that is not attached to any order.
    fn insert_detached_session(&self, session_id: &str, payment_status: &str) {
        self.sessions.lock().unwrap().insert(
            session_id.to_string(),
            GatewaySession {
                id: session_id.to_string(),
                status: "complete".to_string(),
                payment_status: payment_status.to_string(),
                customer_email: None,
                metadata: HashMap::new(),
            },
        );
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let id = format!("cs_test_{}", self.counter.fetch_add(1, Ordering::SeqCst));
        let mut metadata = HashMap::new();
        metadata.insert("order_id".to_string(), request.order_id.to_string());
        self.sessions.lock().unwrap().insert(
            id.clone(),
            GatewaySession {
                id: id.clone(),
                status: "open".to_string(),
                payment_status: "unpaid".to_string(),
                customer_email: Some("shopper@example.com".to_string()),
                metadata,
            },
        );
        Ok(CheckoutSession {
            id: id.clone(),
            client_secret: format!("{id}_secret"),
        })
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<GatewaySession, GatewayError> {
        self.sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| GatewayError::Api {
                status: 404,
                message: format!("no such checkout session: {session_id}"),
            })
    }

    async fn register_product(
        &self,
        _name: &str,
        _price: Decimal,
    ) -> Result<String, GatewayError> {
        Ok(format!("price_{}", Uuid::new_v4().simple()))
    }
}

/// Identity stub: tokens look like `token_<user_id>`.
struct StubIdentity;

#[async_trait]
impl IdentityProvider for StubIdentity {
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, IdentityError> {
        token.strip_prefix("token_").map_or(
            Err(IdentityError::InvalidToken),
            |user_id| {
                Ok(AuthenticatedUser {
                    user_id: UserId::new(user_id),
                })
            },
        )
    }

    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, IdentityError> {
        Ok(UserProfile {
            full_name: format!("User {user_id}"),
            email: format!("{user_id}@example.com"),
        })
    }
}

// ============================================================================
// Harness
// ============================================================================

fn test_config() -> StorefrontConfig {
    StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/unused"),
        host: "127.0.0.1".parse().unwrap(),
        port: 8000,
        frontend_origin: "http://localhost:5173".to_string(),
        gateway: GatewayConfig {
            base_url: "http://gateway.test".to_string(),
            secret_key: SecretString::from("sk_test_key"),
            webhook_secret: SecretString::from(WEBHOOK_SECRET),
        },
        identity: IdentityConfig {
            base_url: "http://identity.test".to_string(),
            secret_key: SecretString::from("idp_test_key"),
        },
        storage: StorageConfig {
            endpoint: "https://account.r2.example.com".to_string(),
            bucket: "product-images".to_string(),
            access_key_id: "AKIDEXAMPLE".to_string(),
            secret_access_key: SecretString::from("storage-secret-key"),
            public_domain: "https://cdn.example.com".to_string(),
        },
        sentry_dsn: None,
        sentry_environment: None,
    }
}

struct TestApp {
    router: Router,
    gateway: Arc<StubGateway>,
}

impl TestApp {
    fn new() -> Self {
        let gateway = Arc::new(StubGateway::default());
        let state = AppState::new(
            test_config(),
            Arc::new(MemoryStore::new()),
            gateway.clone(),
            Arc::new(StubIdentity),
        );
        Self {
            router: routes::router(state),
            gateway,
        }
    }

    async fn request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        };
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Request::get(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn send_json(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: &Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.request(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send_json("POST", uri, None, body).await
    }

    async fn webhook(&self, payload: &Value, secret: &str) -> (StatusCode, Value) {
        let body = payload.to_string();
        let signature = sign_payload(
            &SecretString::from(secret),
            Utc::now().timestamp(),
            body.as_bytes(),
        );
        self.request(
            Request::post("/api/payments/webhook")
                .header(header::CONTENT_TYPE, "application/json")
                .header(SIGNATURE_HEADER, signature)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
    }

    // -- Catalog fixtures -----------------------------------------------------

    async fn seed_refs(&self) -> (String, String, String) {
        let (_, category) = self
            .post(
                "/api/categories",
                &json!({"name": "Keyboards", "slug": "keyboards"}),
            )
            .await;
        let (_, brand) = self.post("/api/brands", &json!({"name": "Alto"})).await;
        let (_, color) = self.post("/api/colors", &json!({"name": "Graphite"})).await;
        (
            category["id"].as_str().unwrap().to_string(),
            brand["id"].as_str().unwrap().to_string(),
            color["id"].as_str().unwrap().to_string(),
        )
    }

    async fn seed_product(&self, refs: &(String, String, String), name: &str, stock: i32) -> Value {
        let (status, product) = self
            .post(
                "/api/products",
                &json!({
                    "category_id": refs.0,
                    "brand_id": refs.1,
                    "color_id": refs.2,
                    "name": name,
                    "price": "49.99",
                    "stock": stock,
                    "images": ["https://cdn.example.com/a.png"],
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        product
    }

    /// Create an order through the API; items are (product id, quantity).
    async fn seed_order(&self, token: &str, items: &[(&str, i32)]) -> Value {
        let items: Vec<Value> = items
            .iter()
            .map(|(id, qty)| json!({"product_id": id, "quantity": qty}))
            .collect();
        let (status, order) = self
            .send_json(
                "POST",
                "/api/orders",
                Some(token),
                &json!({
                    "address": {
                        "line_1": "12 Harbor Rd",
                        "line_2": null,
                        "city": "Galle",
                        "phone": "+94 77 000 0000"
                    },
                    "items": items,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        order
    }

    /// Open a checkout session for an order and return its gateway id.
    async fn open_session(&self, order_id: &str) -> String {
        let (status, body) = self
            .post(
                "/api/payments/create-checkout-session",
                &json!({"order_id": order_id}),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let client_secret = body["client_secret"].as_str().unwrap();
        client_secret.trim_end_matches("_secret").to_string()
    }
}

fn paid_event(session_id: &str) -> Value {
    json!({
        "type": "checkout.session.completed",
        "data": {"object": {"id": session_id}}
    })
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();
    let (status, _) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_product_create_missing_field_is_400_and_persists_nothing() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;

    // name is missing
    let (status, body) = app
        .post(
            "/api/products",
            &json!({
                "category_id": refs.0,
                "brand_id": refs.1,
                "color_id": refs.2,
                "price": "10.00",
                "stock": 1,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let (_, products) = app.get("/api/products").await;
    assert_eq!(products.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_product_crud_and_gateway_mirror() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 12).await;
    let id = product["id"].as_str().unwrap();

    // Creation registered a gateway price reference
    assert!(product["gateway_price_id"].as_str().unwrap().starts_with("price_"));

    // Detail expands color and (empty) reviews
    let (status, detail) = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["name"], "Alto keyboard");
    assert_eq!(detail["color"]["name"], "Graphite");
    assert_eq!(detail["reviews"].as_array().unwrap().len(), 0);

    // Partial update
    let (status, updated) = app
        .send_json(
            "PUT",
            &format!("/api/products/{id}"),
            None,
            &json!({"stock": 20}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["stock"], 20);
    assert_eq!(updated["name"], "Alto keyboard");

    // Delete
    let (status, body) = app
        .request(
            Request::delete(format!("/api/products/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product deleted successfully");

    let (status, _) = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_products_by_category_slug() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    app.seed_product(&refs, "Alto keyboard", 5).await;

    let (status, products) = app.get("/api/products/category/keyboards").await;
    assert_eq!(status, StatusCode::OK);
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["category"]["slug"], "keyboards");

    let (status, _) = app.get("/api/products/category/no-such-slug").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_filter_on_product_listing() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    app.seed_product(&refs, "Alto keyboard", 5).await;

    let (_, all) = app.get("/api/products").await;
    assert_eq!(all.as_array().unwrap().len(), 1);

    let (_, filtered) = app
        .get(&format!("/api/products?category_id={}", refs.0))
        .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    let (_, other) = app
        .get(&format!("/api/products?category_id={}", Uuid::new_v4()))
        .await;
    assert_eq!(other.as_array().unwrap().len(), 0);
}

// ============================================================================
// Reviews
// ============================================================================

#[tokio::test]
async fn test_review_validation_and_creation() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 5).await;
    let id = product["id"].as_str().unwrap();

    // Rating out of bounds
    let (status, body) = app
        .post(
            "/api/review",
            &json!({"product_id": id, "review": "Great", "rating": 6, "name": "Nadia"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "rating must be between 1 and 5");

    // Unknown product
    let (status, _) = app
        .post(
            "/api/review",
            &json!({"product_id": Uuid::new_v4(), "review": "Great", "rating": 5, "name": "Nadia"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Valid review lands on the product detail
    let (status, _) = app
        .post(
            "/api/review",
            &json!({"product_id": id, "review": "Great keys", "rating": 5, "name": "Nadia"}),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, detail) = app.get(&format!("/api/products/{id}")).await;
    let reviews = detail["reviews"].as_array().unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0]["rating"], 5);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_cart_requires_authentication() {
    let app = TestApp::new();
    let (status, _) = app.get("/api/cart").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send_json(
            "POST",
            "/api/cart/add",
            Some("garbage"),
            &json!({"product_id": Uuid::new_v4()}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_add_twice_increments_quantity() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 5).await;
    let id = product["id"].as_str().unwrap();

    app.send_json(
        "POST",
        "/api/cart/add",
        Some("token_user_1"),
        &json!({"product_id": id}),
    )
    .await;
    let (status, cart) = app
        .send_json(
            "POST",
            "/api/cart/add",
            Some("token_user_1"),
            &json!({"product_id": id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = cart["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(items[0]["product"]["name"], "Alto keyboard");
}

#[tokio::test]
async fn test_cart_add_unknown_product_is_404() {
    let app = TestApp::new();
    let (status, _) = app
        .send_json(
            "POST",
            "/api/cart/add",
            Some("token_user_1"),
            &json!({"product_id": Uuid::new_v4()}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cart_quantity_and_remove() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 5).await;
    let id = product["id"].as_str().unwrap();
    let token = Some("token_user_1");

    app.send_json("POST", "/api/cart/add", token, &json!({"product_id": id}))
        .await;

    // Zero quantity is rejected at the boundary
    let (status, _) = app
        .send_json(
            "PUT",
            "/api/cart/quantity",
            token,
            &json!({"product_id": id, "quantity": 0}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, cart) = app
        .send_json(
            "PUT",
            "/api/cart/quantity",
            token,
            &json!({"product_id": id, "quantity": 4}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["quantity"], 4);

    let (status, cart) = app
        .send_json(
            "PUT",
            "/api/cart/remove",
            token,
            &json!({"product_id": id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

// ============================================================================
// Orders
// ============================================================================

#[tokio::test]
async fn test_order_ownership_check() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 5).await;
    let order = app
        .seed_order("token_user_1", &[(product["id"].as_str().unwrap(), 1)])
        .await;
    let order_id = order["id"].as_str().unwrap();

    // Owner sees the order
    let (status, detail) = app
        .send_json(
            "GET",
            &format!("/api/orders/{order_id}"),
            Some("token_user_1"),
            &Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["payment_status"], "PENDING");

    // Anyone else gets 401
    let (status, _) = app
        .send_json(
            "GET",
            &format!("/api/orders/{order_id}"),
            Some("token_user_2"),
            &Value::Null,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_list_empty_is_404() {
    let app = TestApp::new();
    let (status, body) = app
        .send_json("GET", "/api/orders", Some("token_user_1"), &Value::Null)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "No orders found for this user");
}

#[tokio::test]
async fn test_order_list_with_address_expansion() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 5).await;
    app.seed_order("token_user_1", &[(product["id"].as_str().unwrap(), 2)])
        .await;

    let (status, orders) = app
        .send_json("GET", "/api/orders", Some("token_user_1"), &Value::Null)
        .await;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["address"]["city"], "Galle");
}

#[tokio::test]
async fn test_admin_order_listing_enriches_owner_profile() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 5).await;
    app.seed_order("token_user_1", &[(product["id"].as_str().unwrap(), 1)])
        .await;

    let (status, orders) = app
        .send_json("GET", "/api/orders/admin", Some("token_admin"), &Value::Null)
        .await;
    assert_eq!(status, StatusCode::OK);
    let orders = orders.as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user"]["email"], "user_1@example.com");
    assert_eq!(orders[0]["items"][0]["product"]["name"], "Alto keyboard");
    assert_eq!(orders[0]["items"][0]["color"]["name"], "Graphite");
}

// ============================================================================
// Payments & fulfillment
// ============================================================================

#[tokio::test]
async fn test_end_to_end_fulfillment() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let keyboard = app.seed_product(&refs, "Alto keyboard", 10).await;
    let mouse = app.seed_product(&refs, "Alto mouse", 5).await;
    let keyboard_id = keyboard["id"].as_str().unwrap();
    let mouse_id = mouse["id"].as_str().unwrap();
    let token = "token_user_1";

    // The shopper's cart has something in it
    app.send_json(
        "POST",
        "/api/cart/add",
        Some(token),
        &json!({"product_id": keyboard_id}),
    )
    .await;

    let order = app
        .seed_order(token, &[(keyboard_id, 3), (mouse_id, 1)])
        .await;
    let order_id = order["id"].as_str().unwrap();

    let session_id = app.open_session(order_id).await;
    app.gateway.mark_paid(&session_id);

    let (status, _) = app.webhook(&paid_event(&session_id), WEBHOOK_SECRET).await;
    assert_eq!(status, StatusCode::OK);

    // Stocks reduced by the ordered quantities
    let (_, keyboard) = app.get(&format!("/api/products/{keyboard_id}")).await;
    let (_, mouse) = app.get(&format!("/api/products/{mouse_id}")).await;
    assert_eq!(keyboard["stock"], 7);
    assert_eq!(mouse["stock"], 4);

    // Order flipped to PAID / FULFILLED
    let (_, detail) = app
        .send_json(
            "GET",
            &format!("/api/orders/{order_id}"),
            Some(token),
            &Value::Null,
        )
        .await;
    assert_eq!(detail["payment_status"], "PAID");
    assert_eq!(detail["order_status"], "FULFILLED");

    // Owner's cart emptied
    let (_, cart) = app
        .send_json("GET", "/api/cart", Some(token), &Value::Null)
        .await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_webhook_replay_changes_nothing() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 10).await;
    let product_id = product["id"].as_str().unwrap();

    let order = app.seed_order("token_user_1", &[(product_id, 3)]).await;
    let session_id = app.open_session(order["id"].as_str().unwrap()).await;
    app.gateway.mark_paid(&session_id);

    let (status, _) = app.webhook(&paid_event(&session_id), WEBHOOK_SECRET).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.webhook(&paid_event(&session_id), WEBHOOK_SECRET).await;
    assert_eq!(status, StatusCode::OK);

    let (_, product) = app.get(&format!("/api/products/{product_id}")).await;
    assert_eq!(product["stock"], 7);
}

#[tokio::test]
async fn test_webhook_rejects_bad_signature() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 10).await;
    let product_id = product["id"].as_str().unwrap();

    let order = app.seed_order("token_user_1", &[(product_id, 3)]).await;
    let session_id = app.open_session(order["id"].as_str().unwrap()).await;
    app.gateway.mark_paid(&session_id);

    let (status, body) = app.webhook(&paid_event(&session_id), "whsec_wrong").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().starts_with("Webhook Error:"));

    // No fulfillment happened
    let (_, product) = app.get(&format!("/api/products/{product_id}")).await;
    assert_eq!(product["stock"], 10);
}

#[tokio::test]
async fn test_webhook_requires_signature_header() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            Request::post("/api/payments/webhook")
                .body(Body::from(paid_event("cs_x").to_string()))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().starts_with("Webhook Error:"));
}

#[tokio::test]
async fn test_webhook_ignores_unknown_event_kinds() {
    let app = TestApp::new();
    let event = json!({
        "type": "checkout.session.expired",
        "data": {"object": {"id": "cs_whatever"}}
    });
    let (status, _) = app.webhook(&event, WEBHOOK_SECRET).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_webhook_ignores_unpaid_session() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 10).await;
    let product_id = product["id"].as_str().unwrap();

    let order = app.seed_order("token_user_1", &[(product_id, 3)]).await;
    // Session exists but is still unpaid (async payment method)
    let session_id = app.open_session(order["id"].as_str().unwrap()).await;

    let (status, _) = app.webhook(&paid_event(&session_id), WEBHOOK_SECRET).await;
    assert_eq!(status, StatusCode::OK);

    let (_, product) = app.get(&format!("/api/products/{product_id}")).await;
    assert_eq!(product["stock"], 10);
}

#[tokio::test]
async fn test_webhook_session_without_order_reference_is_400() {
    let app = TestApp::new();
    app.gateway.insert_detached_session("cs_detached", "paid");

    let (status, body) = app.webhook(&paid_event("cs_detached"), WEBHOOK_SECRET).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().starts_with("Webhook Error:"));
}

#[tokio::test]
async fn test_session_status_summary() {
    let app = TestApp::new();
    let refs = app.seed_refs().await;
    let product = app.seed_product(&refs, "Alto keyboard", 10).await;
    let product_id = product["id"].as_str().unwrap();

    let order = app.seed_order("token_user_1", &[(product_id, 3)]).await;
    let session_id = app.open_session(order["id"].as_str().unwrap()).await;
    app.gateway.mark_paid(&session_id);
    app.webhook(&paid_event(&session_id), WEBHOOK_SECRET).await;

    let (status, summary) = app
        .get(&format!("/api/payments/session-status?session_id={session_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["status"], "complete");
    assert_eq!(summary["customer_email"], "shopper@example.com");
    assert_eq!(summary["payment_status"], "PAID");
    assert_eq!(summary["order_status"], "FULFILLED");

    let purchased = summary["purchased_products"].as_array().unwrap();
    assert_eq!(purchased.len(), 1);
    assert_eq!(purchased[0]["name"], "Alto keyboard");
    assert_eq!(purchased[0]["quantity"], 3);
    assert_eq!(purchased[0]["image"], "https://cdn.example.com/a.png");

    // 3 x 49.99
    assert_eq!(summary["totals"]["subtotal"], "149.97");
    assert_eq!(summary["totals"]["shipping"], "0");
    assert_eq!(summary["totals"]["total"], "149.97");
}

#[tokio::test]
async fn test_create_session_for_missing_order_is_404() {
    let app = TestApp::new();
    let (status, _) = app
        .post(
            "/api/payments/create-checkout-session",
            &json!({"order_id": OrderId::new()}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ============================================================================
// Uploads
// ============================================================================

#[tokio::test]
async fn test_upload_url_issuance() {
    let app = TestApp::new();

    let (status, body) = app
        .post(
            "/api/products/images",
            &json!({"file_types": ["image/png", "image/webp"]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let uploads = body["uploads"].as_array().unwrap();
    assert_eq!(uploads.len(), 2);
    for upload in uploads {
        assert!(upload["url"].as_str().unwrap().contains("X-Amz-Signature="));
        assert!(
            upload["public_url"]
                .as_str()
                .unwrap()
                .starts_with("https://cdn.example.com/")
        );
    }

    let (status, _) = app
        .post("/api/products/images", &json!({"file_types": []}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
