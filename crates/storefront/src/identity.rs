//! Identity provider integration.
//!
//! Authentication is delegated to a hosted identity service: request bearer
//! tokens are introspected remotely and user profiles are fetched by id.
//! The [`IdentityProvider`] trait keeps handlers testable without the
//! hosted service.

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use clementine_core::UserId;

/// Errors from identity provider operations.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// The token was rejected by the provider.
    #[error("invalid or expired token")]
    InvalidToken,

    /// Transport-level failure reaching the provider.
    #[error("identity request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-success status.
    #[error("identity provider returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// The authenticated principal extracted from a verified token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
}

/// A user profile as known to the identity provider.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub full_name: String,
    pub email: String,
}

/// Token verification and profile lookup against the identity service.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a bearer token and resolve the user it belongs to.
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, IdentityError>;

    /// Fetch a user's profile by id.
    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, IdentityError>;
}

/// Client for a Clerk-compatible identity API.
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    base_url: String,
    secret_key: SecretString,
}

impl HttpIdentityProvider {
    /// Create a client for the identity service at `base_url` (no trailing
    /// slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>, secret_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            secret_key,
        }
    }
}

impl std::fmt::Debug for HttpIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityProvider")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct TokenVerified {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct ProviderUser {
    first_name: Option<String>,
    last_name: Option<String>,
    primary_email_address_id: Option<String>,
    #[serde(default)]
    email_addresses: Vec<ProviderEmail>,
}

#[derive(Debug, Deserialize)]
struct ProviderEmail {
    id: String,
    email_address: String,
}

impl ProviderUser {
    fn full_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect();
        parts.join(" ")
    }

    fn primary_email(&self) -> Option<&str> {
        let by_id = self.primary_email_address_id.as_ref().and_then(|primary| {
            self.email_addresses
                .iter()
                .find(|e| e.id == *primary)
        });
        by_id
            .or_else(|| self.email_addresses.first())
            .map(|e| e.email_address.as_str())
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip(self, token))]
    async fn verify_token(&self, token: &str) -> Result<AuthenticatedUser, IdentityError> {
        let response = self
            .client
            .post(format!("{}/v1/tokens/verify", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
            .json(&json!({ "token": token }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::NOT_FOUND {
            return Err(IdentityError::InvalidToken);
        }
        if !status.is_success() {
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let verified: TokenVerified = response.json().await?;
        Ok(AuthenticatedUser {
            user_id: UserId::new(verified.user_id),
        })
    }

    #[instrument(skip(self), fields(user_id = %user_id))]
    async fn get_profile(&self, user_id: &UserId) -> Result<UserProfile, IdentityError> {
        let response = self
            .client
            .get(format!("{}/v1/users/{user_id}", self.base_url))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IdentityError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            });
        }

        let user: ProviderUser = response.json().await?;
        Ok(UserProfile {
            full_name: user.full_name(),
            email: user.primary_email().unwrap_or_default().to_string(),
        })
    }
}
