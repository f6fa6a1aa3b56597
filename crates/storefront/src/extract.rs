//! Request extractors.
//!
//! [`ValidatedJson`] wraps `axum::Json` so that both deserialization
//! failures and domain validation failures come back as HTTP 400 with a
//! `{"message": "..."}` body, instead of axum's default 422 plain text.

use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::state::AppState;

/// Domain validation for request payloads.
pub trait Validate {
    /// Check payload invariants; the message becomes the 400 response body.
    ///
    /// # Errors
    ///
    /// Returns a human-readable description of the first violated rule.
    fn validate(&self) -> Result<(), String>;
}

/// JSON extractor that runs [`Validate`] after deserialization.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T> FromRequest<AppState> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        let axum::Json(payload) = axum::Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::Validation(rejection.body_text()))?;
        payload.validate().map_err(AppError::Validation)?;
        Ok(Self(payload))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Rating {
        rating: i32,
    }

    impl Validate for Rating {
        fn validate(&self) -> Result<(), String> {
            if (1..=5).contains(&self.rating) {
                Ok(())
            } else {
                Err("rating must be between 1 and 5".to_string())
            }
        }
    }

    #[test]
    fn test_validate_bounds() {
        assert!(Rating { rating: 1 }.validate().is_ok());
        assert!(Rating { rating: 5 }.validate().is_ok());
        assert!(Rating { rating: 0 }.validate().is_err());
        assert!(Rating { rating: 6 }.validate().is_err());
    }
}
