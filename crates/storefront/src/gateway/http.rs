//! Stripe-compatible HTTP payment gateway client.
//!
//! The gateway API is form-encoded on the way in and JSON on the way out.
//! Nested request fields use the bracket convention
//! (`line_items[0][price]`, `metadata[order_id]`).

use async_trait::async_trait;
use reqwest::StatusCode;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{
    CheckoutSession, CheckoutSessionRequest, GatewayError, GatewaySession, PaymentGateway,
};

/// Client for a hosted payment gateway exposing the Stripe checkout API.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    base_url: String,
    secret_key: SecretString,
}

impl HttpPaymentGateway {
    /// Create a client for the gateway at `base_url` (no trailing slash).
    #[must_use]
    pub fn new(base_url: impl Into<String>, secret_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            secret_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Convert a decimal major-unit price to the gateway's integer minor
    /// units (cents).
    ///
    /// Sub-cent precision is truncated toward zero (`9.999` becomes 999
    /// cents); catalog prices are entered with two decimal places, so this
    /// only applies to imported data.
    fn to_cents(price: Decimal) -> Result<i64, GatewayError> {
        (price * Decimal::from(100)).trunc().to_i64().ok_or_else(|| {
            GatewayError::UnexpectedResponse(format!("price {price} not representable in cents"))
        })
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .map_or(body, |parsed| parsed.error.message);
        Err(GatewayError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

impl std::fmt::Debug for HttpPaymentGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpPaymentGateway")
            .field("base_url", &self.base_url)
            .field("secret_key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Debug, Deserialize)]
struct SessionCreated {
    id: String,
    client_secret: String,
}

#[derive(Debug, Deserialize)]
struct SessionRetrieved {
    id: String,
    status: String,
    payment_status: String,
    customer_email: Option<String>,
    customer_details: Option<CustomerDetails>,
    #[serde(default)]
    metadata: std::collections::HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct CustomerDetails {
    email: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProductCreated {
    default_price: Option<String>,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    #[instrument(skip(self, request), fields(order_id = %request.order_id))]
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, GatewayError> {
        let mut form: Vec<(String, String)> = vec![
            ("ui_mode".to_string(), "embedded".to_string()),
            ("mode".to_string(), "payment".to_string()),
            ("return_url".to_string(), request.return_url),
            (
                "metadata[order_id]".to_string(),
                request.order_id.to_string(),
            ),
        ];
        for (index, item) in request.line_items.iter().enumerate() {
            form.push((format!("line_items[{index}][price]"), item.price_id.clone()));
            form.push((
                format!("line_items[{index}][quantity]"),
                item.quantity.to_string(),
            ));
        }

        let response = self
            .client
            .post(self.url("/v1/checkout/sessions"))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;
        let session: SessionCreated = Self::check(response).await?.json().await?;

        Ok(CheckoutSession {
            id: session.id,
            client_secret: session.client_secret,
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> Result<GatewaySession, GatewayError> {
        let response = self
            .client
            .get(self.url(&format!("/v1/checkout/sessions/{session_id}")))
            .bearer_auth(self.secret_key.expose_secret())
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GatewayError::Api {
                status: 404,
                message: format!("no such checkout session: {session_id}"),
            });
        }

        let session: SessionRetrieved = Self::check(response).await?.json().await?;
        let customer_email = session
            .customer_email
            .or_else(|| session.customer_details.and_then(|d| d.email));

        Ok(GatewaySession {
            id: session.id,
            status: session.status,
            payment_status: session.payment_status,
            customer_email,
            metadata: session.metadata,
        })
    }

    #[instrument(skip(self, price), fields(name = %name))]
    async fn register_product(
        &self,
        name: &str,
        price: Decimal,
    ) -> Result<String, GatewayError> {
        let cents = Self::to_cents(price)?;
        let form: Vec<(String, String)> = vec![
            ("name".to_string(), name.to_string()),
            (
                "default_price_data[currency]".to_string(),
                "usd".to_string(),
            ),
            (
                "default_price_data[unit_amount]".to_string(),
                cents.to_string(),
            ),
        ];

        let response = self
            .client
            .post(self.url("/v1/products"))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&form)
            .send()
            .await?;
        let product: ProductCreated = Self::check(response).await?.json().await?;

        product.default_price.ok_or_else(|| {
            GatewayError::UnexpectedResponse("product created without a default price".to_string())
        })
    }
}
