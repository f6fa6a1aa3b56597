//! Category route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use clementine_core::CategoryId;

use crate::error::{AppError, Result};
use crate::extract::{Validate, ValidatedJson};
use crate::models::{Category, CategoryUpdate, NewCategory};
use crate::routes::message;
use crate::state::AppState;

/// `GET /api/categories`.
pub async fn list_categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    Ok(Json(state.store().list_categories().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub slug: String,
}

impl Validate for CreateCategoryRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if self.slug.trim().is_empty() {
            return Err("slug must not be empty".to_string());
        }
        Ok(())
    }
}

/// `POST /api/categories`.
pub async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<Category>)> {
    let category = state
        .store()
        .create_category(NewCategory {
            name: request.name,
            slug: request.slug,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// `GET /api/categories/{id}`.
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<Category>> {
    let category = state
        .store()
        .get_category(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    Ok(Json(category))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
}

impl Validate for UpdateCategoryRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be empty".to_string());
        }
        if self.slug.as_ref().is_some_and(|s| s.trim().is_empty()) {
            return Err("slug must not be empty".to_string());
        }
        Ok(())
    }
}

/// `PUT /api/categories/{id}`.
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
    ValidatedJson(request): ValidatedJson<UpdateCategoryRequest>,
) -> Result<Json<Category>> {
    let category = state
        .store()
        .update_category(
            id,
            CategoryUpdate {
                name: request.name,
                slug: request.slug,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound("Category not found".to_string()))?;
    Ok(Json(category))
}

/// `DELETE /api/categories/{id}`.
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<CategoryId>,
) -> Result<Json<serde_json::Value>> {
    if state.store().delete_category(id).await? {
        Ok(message("Category deleted successfully"))
    } else {
        Err(AppError::NotFound("Category not found".to_string()))
    }
}
