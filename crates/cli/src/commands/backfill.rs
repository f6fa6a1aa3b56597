//! Gateway backfill command.
//!
//! # Usage
//!
//! ```bash
//! clementine-cli backfill-gateway
//! ```
//!
//! Registers every product that has no `gateway_price_id` with the payment
//! gateway and stores the returned price reference. Products created
//! through the API get their mirror record at creation time; this command
//! repairs rows left behind by a failed dual-write (or by data imported
//! directly into the database).

use std::sync::Arc;

use thiserror::Error;

use clementine_storefront::config::{ConfigError, StorefrontConfig};
use clementine_storefront::gateway::{GatewayError, HttpPaymentGateway, PaymentGateway};
use clementine_storefront::store::{PostgresStore, Store, StoreError, create_pool};

/// Errors that can occur while backfilling.
#[derive(Debug, Error)]
pub enum BackfillError {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Store error.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Gateway error.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),
}

/// Register all unmirrored products with the payment gateway.
pub async fn run() -> Result<(), BackfillError> {
    let config = StorefrontConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let store = PostgresStore::new(pool);
    let gateway = Arc::new(HttpPaymentGateway::new(
        config.gateway.base_url.clone(),
        config.gateway.secret_key.clone(),
    ));

    let products = store.products_missing_gateway_price().await?;
    if products.is_empty() {
        tracing::info!("All products already have a gateway price reference");
        return Ok(());
    }

    tracing::info!(count = products.len(), "Backfilling gateway price references");
    for product in products {
        let price_id = gateway.register_product(&product.name, product.price).await?;
        store.set_gateway_price_id(product.id, &price_id).await?;
        tracing::info!(product_id = %product.id, %price_id, "Registered product");
    }

    tracing::info!("Gateway backfill complete!");
    Ok(())
}
