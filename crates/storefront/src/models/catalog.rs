//! Catalog models: products, categories, brands, colors.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use clementine_core::{BrandId, CategoryId, ColorId, ProductId, Specification};

use super::review::Review;

/// A catalog product.
///
/// `category_id`/`brand_id`/`color_id` reference rows owned by the
/// respective catalog collections; they are stored without foreign-key
/// constraints so a dangling reference degrades to an absent expansion.
/// `stock` is mutated only by the fulfillment engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    pub color_id: ColorId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub specifications: Vec<Specification>,
    /// Price reference registered with the payment gateway; absent until the
    /// mirror record is created (see the `backfill-gateway` CLI command).
    pub gateway_price_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub category_id: CategoryId,
    pub brand_id: BrandId,
    pub color_id: ColorId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub images: Vec<String>,
    pub description: Option<String>,
    pub specifications: Vec<Specification>,
}

/// Partial update for a product; `None` fields are left unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
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

/// Product detail view with color and review expansion.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: Product,
    pub color: Option<Color>,
    pub reviews: Vec<Review>,
}

/// Product listing entry with category name/slug expansion
/// (used by the category-slug listing).
#[derive(Debug, Clone, Serialize)]
pub struct ProductWithCategory {
    #[serde(flatten)]
    pub product: Product,
    pub category: Option<CategorySummary>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// Category name/slug pair used in product expansions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub slug: String,
}

/// Input for creating a category.
#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub slug: String,
}

/// Partial update for a category.
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub slug: Option<String>,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    pub id: BrandId,
    pub name: String,
}

/// Input for creating a brand.
#[derive(Debug, Clone)]
pub struct NewBrand {
    pub name: String,
}

/// Partial update for a brand.
#[derive(Debug, Clone, Default)]
pub struct BrandUpdate {
    pub name: Option<String>,
}

/// A product color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub id: ColorId,
    pub name: String,
}

/// Input for creating a color.
#[derive(Debug, Clone)]
pub struct NewColor {
    pub name: String,
}

/// Partial update for a color.
#[derive(Debug, Clone, Default)]
pub struct ColorUpdate {
    pub name: Option<String>,
}
