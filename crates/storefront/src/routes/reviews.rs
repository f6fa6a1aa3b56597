//! Review route handlers.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;

use clementine_core::ProductId;

use crate::error::{AppError, Result};
use crate::extract::{Validate, ValidatedJson};
use crate::models::NewReview;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateReviewRequest {
    pub product_id: ProductId,
    pub review: String,
    pub rating: i32,
    pub name: String,
}

impl Validate for CreateReviewRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if !(1..=5).contains(&self.rating) {
            return Err("rating must be between 1 and 5".to_string());
        }
        if self.review.trim().is_empty() {
            return Err("review must not be empty".to_string());
        }
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

/// `POST /api/review` - attach a review to an existing product.
pub async fn create_review(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateReviewRequest>,
) -> Result<StatusCode> {
    state
        .store()
        .get_product(request.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;

    state
        .store()
        .create_review(NewReview {
            product_id: request.product_id,
            review: request.review,
            rating: request.rating,
            name: request.name,
        })
        .await?;

    Ok(StatusCode::CREATED)
}
