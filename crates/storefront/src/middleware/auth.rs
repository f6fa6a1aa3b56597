//! Bearer-token authentication extractor.
//!
//! Protected handlers take an [`AuthUser`] parameter; extraction verifies
//! the `Authorization: Bearer <token>` header against the identity provider
//! and fails closed with 401 on any miss.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use clementine_core::UserId;

use crate::error::AppError;
use crate::identity::IdentityError;
use crate::state::AppState;

/// The authenticated caller of a protected route.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: UserId,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| AppError::Unauthorized("Missing authentication token".to_string()))?;

        let user = state.identity().verify_token(token).await.map_err(|e| {
            match e {
                IdentityError::InvalidToken => {
                    AppError::Unauthorized("Invalid or expired token".to_string())
                }
                // Provider outages must not let requests through.
                other => AppError::Identity(other),
            }
        })?;

        Ok(Self {
            user_id: user.user_id,
        })
    }
}
