//! Product route handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{BrandId, CategoryId, ColorId, ProductId, Specification};

use crate::error::{AppError, Result};
use crate::extract::{Validate, ValidatedJson};
use crate::models::{NewProduct, Product, ProductDetail, ProductUpdate, ProductWithCategory};
use crate::routes::message;
use crate::state::AppState;
use crate::storage::SignedUpload;

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category_id: Option<CategoryId>,
}

/// `GET /api/products` - list products, optionally filtered by category.
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ListProductsQuery>,
) -> Result<Json<Vec<Product>>> {
    let products = state.store().list_products(query.category_id).await?;
    Ok(Json(products))
}

#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    pub color_id: ColorId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    #[serde(default)]
    pub images: Vec<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub specifications: Vec<Specification>,
}

impl Validate for CreateProductRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.price < Decimal::ZERO {
            return Err("price must not be negative".to_string());
        }
        if self.stock < 0 {
            return Err("stock must not be negative".to_string());
        }
        Ok(())
    }
}

/// `POST /api/products` - create a product and register its mirror with the
/// payment gateway.
///
/// The two writes are not compensated: if the gateway registration fails
/// the product row persists without a price reference (recoverable via the
/// `backfill-gateway` CLI command) and the request surfaces the failure.
pub async fn create_product(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    let mut product = state
        .store()
        .create_product(NewProduct {
            category_id: request.category_id,
            brand_id: request.brand_id,
            color_id: request.color_id,
            name: request.name,
            price: request.price,
            stock: request.stock,
            images: request.images,
            description: request.description,
            specifications: request.specifications,
        })
        .await?;

    let price_id = state
        .gateway()
        .register_product(&product.name, product.price)
        .await?;
    state
        .store()
        .set_gateway_price_id(product.id, &price_id)
        .await?;
    product.gateway_price_id = Some(price_id);

    Ok((StatusCode::CREATED, Json(product)))
}

/// `GET /api/products/{id}` - product detail with color and review expansion.
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = state
        .store()
        .get_product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    let color = state.store().get_color(product.color_id).await?;
    let reviews = state.store().reviews_for_product(id).await?;

    Ok(Json(ProductDetail {
        product,
        color,
        reviews,
    }))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub category_id: Option<CategoryId>,
    pub brand_id: Option<BrandId>,
    pub color_id: Option<ColorId>,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub images: Option<Vec<String>>,
    pub description: Option<String>,
    pub specifications: Option<Vec<Specification>>,
}

impl Validate for UpdateProductRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be empty".to_string());
        }
        if self.price.is_some_and(|p| p < Decimal::ZERO) {
            return Err("price must not be negative".to_string());
        }
        if self.stock.is_some_and(|s| s < 0) {
            return Err("stock must not be negative".to_string());
        }
        Ok(())
    }
}

/// `PUT /api/products/{id}` - partial update, returns the updated record.
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    ValidatedJson(request): ValidatedJson<UpdateProductRequest>,
) -> Result<Json<Product>> {
    let update = ProductUpdate {
        category_id: request.category_id,
        brand_id: request.brand_id,
        color_id: request.color_id,
        name: request.name,
        price: request.price,
        stock: request.stock,
        images: request.images,
        description: request.description,
        specifications: request.specifications,
    };

    let product = state
        .store()
        .update_product(id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

/// `DELETE /api/products/{id}`.
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<serde_json::Value>> {
    if state.store().delete_product(id).await? {
        Ok(message("Product deleted successfully"))
    } else {
        Err(AppError::NotFound("Product not found".to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub file_types: Vec<String>,
}

impl Validate for UploadRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.file_types.is_empty() {
            return Err("file_types must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub uploads: Vec<SignedUpload>,
}

/// `POST /api/products/images` - issue one presigned upload slot per
/// declared content type.
pub async fn create_upload_urls(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UploadRequest>,
) -> Result<Json<UploadResponse>> {
    let uploads = request
        .file_types
        .iter()
        .map(|content_type| state.uploads().presign_upload(content_type))
        .collect();
    Ok(Json(UploadResponse { uploads }))
}

/// `GET /api/products/category/{slug}` - products of a category, resolved
/// by slug, with category expansion.
pub async fn list_products_by_category_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ProductWithCategory>>> {
    let category = state
        .store()
        .get_category_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;

    let products = state.store().list_products_in_category(category.id).await?;
    Ok(Json(products))
}
