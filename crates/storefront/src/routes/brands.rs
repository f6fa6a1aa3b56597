//! Brand route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use clementine_core::BrandId;

use crate::error::{AppError, Result};
use crate::extract::{Validate, ValidatedJson};
use crate::models::{Brand, BrandUpdate, NewBrand};
use crate::routes::message;
use crate::state::AppState;

/// `GET /api/brands`.
pub async fn list_brands(State(state): State<AppState>) -> Result<Json<Vec<Brand>>> {
    Ok(Json(state.store().list_brands().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBrandRequest {
    pub name: String,
}

impl Validate for CreateBrandRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

/// `POST /api/brands`.
pub async fn create_brand(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateBrandRequest>,
) -> Result<(StatusCode, Json<Brand>)> {
    let brand = state
        .store()
        .create_brand(NewBrand { name: request.name })
        .await?;
    Ok((StatusCode::CREATED, Json(brand)))
}

/// `GET /api/brands/{id}`.
pub async fn get_brand(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<Json<Brand>> {
    let brand = state
        .store()
        .get_brand(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Brand not found".to_string()))?;
    Ok(Json(brand))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateBrandRequest {
    pub name: Option<String>,
}

impl Validate for UpdateBrandRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

/// `PUT /api/brands/{id}`.
pub async fn update_brand(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
    ValidatedJson(request): ValidatedJson<UpdateBrandRequest>,
) -> Result<Json<Brand>> {
    let brand = state
        .store()
        .update_brand(id, BrandUpdate { name: request.name })
        .await?
        .ok_or_else(|| AppError::NotFound("Brand not found".to_string()))?;
    Ok(Json(brand))
}

/// `DELETE /api/brands/{id}`.
pub async fn delete_brand(
    State(state): State<AppState>,
    Path(id): Path<BrandId>,
) -> Result<Json<serde_json::Value>> {
    if state.store().delete_brand(id).await? {
        Ok(message("Brand deleted successfully"))
    } else {
        Err(AppError::NotFound("Brand not found".to_string()))
    }
}
