//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (store connectivity)
//!
//! # Catalog
//! GET  /api/products                 - Product listing (?category_id= filter)
//! POST /api/products                 - Create product (+ gateway mirror)
//! GET  /api/products/{id}            - Product detail (color + reviews)
//! PUT  /api/products/{id}            - Partial update
//! DELETE /api/products/{id}          - Delete
//! POST /api/products/images          - Presigned upload URLs
//! GET  /api/products/category/{slug} - Products of a category by slug
//! GET|POST /api/categories, GET|PUT|DELETE /api/categories/{id}
//! GET|POST /api/brands,     GET|PUT|DELETE /api/brands/{id}
//! GET|POST /api/colors,     GET|PUT|DELETE /api/colors/{id}
//!
//! # Reviews
//! POST /api/review                   - Create review
//!
//! # Orders (requires auth)
//! POST /api/orders                   - Create order
//! GET  /api/orders                   - List caller's orders
//! GET  /api/orders/{id}              - Order detail (owner only)
//! GET  /api/orders/admin             - All orders, enriched
//!
//! # Cart (requires auth)
//! GET  /api/cart                     - Fetch-or-create cart
//! POST /api/cart/add                 - Add one unit of a product
//! PUT  /api/cart/quantity            - Set line quantity
//! PUT  /api/cart/remove              - Remove a line
//!
//! # Payments
//! POST /api/payments/create-checkout-session
//! GET  /api/payments/session-status  - ?session_id=
//! POST /api/payments/webhook         - Signed gateway webhook
//! ```

pub mod brands;
pub mod cart;
pub mod categories;
pub mod colors;
pub mod orders;
pub mod payments;
pub mod products;
pub mod reviews;

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::state::AppState;

/// Build the full application router.
///
/// The CORS allow-origin is pinned to the configured frontend origin; an
/// unparseable origin falls back to same-origin only.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state);

    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .fallback(not_found)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route(
            "/products/{id}",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/images", post(products::create_upload_urls))
        .route(
            "/products/category/{slug}",
            get(products::list_products_by_category_slug),
        )
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/categories/{id}",
            get(categories::get_category)
                .put(categories::update_category)
                .delete(categories::delete_category),
        )
        .route("/brands", get(brands::list_brands).post(brands::create_brand))
        .route(
            "/brands/{id}",
            get(brands::get_brand)
                .put(brands::update_brand)
                .delete(brands::delete_brand),
        )
        .route("/colors", get(colors::list_colors).post(colors::create_color))
        .route(
            "/colors/{id}",
            get(colors::get_color)
                .put(colors::update_color)
                .delete(colors::delete_color),
        )
        .route("/review", post(reviews::create_review))
        .route(
            "/orders",
            get(orders::list_orders).post(orders::create_order),
        )
        .route("/orders/admin", get(orders::list_all_orders))
        .route("/orders/{id}", get(orders::get_order))
        .route("/cart", get(cart::get_cart))
        .route("/cart/add", post(cart::add_to_cart))
        .route("/cart/quantity", put(cart::set_quantity))
        .route("/cart/remove", put(cart::remove_item))
        .route(
            "/payments/create-checkout-session",
            post(payments::create_checkout_session),
        )
        .route("/payments/session-status", get(payments::session_status))
        .route("/payments/webhook", post(payments::webhook))
}

fn cors_layer(state: &AppState) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match state.config().frontend_origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!("Frontend origin is not a valid header value, CORS disabled");
            layer
        }
    }
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Verifies store connectivity before returning OK.
/// Returns 503 Service Unavailable if the store is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.store().ping().await {
        Ok(()) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

async fn not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Standard `{"message": ...}` acknowledgement body.
pub(crate) fn message(text: &str) -> Json<serde_json::Value> {
    Json(json!({ "message": text }))
}
