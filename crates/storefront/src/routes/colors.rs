//! Color route handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;

use clementine_core::ColorId;

use crate::error::{AppError, Result};
use crate::extract::{Validate, ValidatedJson};
use crate::models::{Color, ColorUpdate, NewColor};
use crate::routes::message;
use crate::state::AppState;

/// `GET /api/colors`.
pub async fn list_colors(State(state): State<AppState>) -> Result<Json<Vec<Color>>> {
    Ok(Json(state.store().list_colors().await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateColorRequest {
    pub name: String,
}

impl Validate for CreateColorRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

/// `POST /api/colors`.
pub async fn create_color(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateColorRequest>,
) -> Result<(StatusCode, Json<Color>)> {
    let color = state
        .store()
        .create_color(NewColor { name: request.name })
        .await?;
    Ok((StatusCode::CREATED, Json(color)))
}

/// `GET /api/colors/{id}`.
pub async fn get_color(
    State(state): State<AppState>,
    Path(id): Path<ColorId>,
) -> Result<Json<Color>> {
    let color = state
        .store()
        .get_color(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Color not found".to_string()))?;
    Ok(Json(color))
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateColorRequest {
    pub name: Option<String>,
}

impl Validate for UpdateColorRequest {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.name.as_ref().is_some_and(|n| n.trim().is_empty()) {
            return Err("name must not be empty".to_string());
        }
        Ok(())
    }
}

/// `PUT /api/colors/{id}`.
pub async fn update_color(
    State(state): State<AppState>,
    Path(id): Path<ColorId>,
    ValidatedJson(request): ValidatedJson<UpdateColorRequest>,
) -> Result<Json<Color>> {
    let color = state
        .store()
        .update_color(id, ColorUpdate { name: request.name })
        .await?
        .ok_or_else(|| AppError::NotFound("Color not found".to_string()))?;
    Ok(Json(color))
}

/// `DELETE /api/colors/{id}`.
pub async fn delete_color(
    State(state): State<AppState>,
    Path(id): Path<ColorId>,
) -> Result<Json<serde_json::Value>> {
    if state.store().delete_color(id).await? {
        Ok(message("Color deleted successfully"))
    } else {
        Err(AppError::NotFound("Color not found".to_string()))
    }
}
