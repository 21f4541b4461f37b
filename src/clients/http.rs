//! HTTP client for the cart service.
//!
//! The order service does not own cart data; it fetches and completes
//! carts through the cart service's REST endpoints, with retry on
//! transient failures.

use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use uuid::Uuid;

use crate::config::CartServiceConfig;
use crate::domain::Cart;
use crate::interfaces::cart_provider::{CartError, CartOutcome, CartProvider, Result};

use async_trait::async_trait;

/// Network-backed implementation of `CartProvider`.
pub struct HttpCartProvider {
    client: Client,
    config: CartServiceConfig,
}

impl HttpCartProvider {
    /// Create a new cart client from configuration.
    pub fn new(config: CartServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(CartError::Http)?;

        Ok(Self { client, config })
    }

    /// Backoff configuration for retries.
    fn backoff() -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(100))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(3)
            .with_jitter()
    }

    /// Determine if an HTTP error is retryable.
    fn is_retryable(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    /// Determine if an error is worth retrying.
    fn is_transient(err: &CartError) -> bool {
        match err {
            CartError::Http(e) => Self::is_retryable(e),
            CartError::Status(code) => {
                *code == StatusCode::TOO_MANY_REQUESTS.as_u16() || *code >= 500
            }
            _ => false,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.service_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn fetch_cart(&self, user_id: Uuid) -> Result<Cart> {
        let url = self.url(&format!("/carts/{user_id}/active"));
        let response = self.authorize(self.client.get(&url)).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(CartError::NotFound),
            status if status.is_success() => {
                let cart: Cart = response
                    .json()
                    .await
                    .map_err(|e| CartError::Decode(e.to_string()))?;
                debug!(user_id = %user_id, cart_id = %cart.id, items = cart.items.len(), "fetched active cart");
                Ok(cart)
            }
            status => Err(CartError::Status(status.as_u16())),
        }
    }

    async fn complete_cart(&self, cart_id: Uuid) -> Result<CartOutcome> {
        let url = self.url(&format!("/carts/{cart_id}/complete"));
        let response = self.authorize(self.client.post(&url)).send().await?;

        match response.status() {
            // The cart service reports a repeat completion as a conflict;
            // completion is idempotent, so that is a success for us.
            StatusCode::CONFLICT => Ok(CartOutcome::AlreadyCompleted),
            StatusCode::NOT_FOUND => Err(CartError::NotFound),
            status if status.is_success() => Ok(CartOutcome::Completed),
            status => Err(CartError::Status(status.as_u16())),
        }
    }
}

#[async_trait]
impl CartProvider for HttpCartProvider {
    async fn active_cart(&self, user_id: Uuid) -> Result<Cart> {
        (|| async { self.fetch_cart(user_id).await })
            .retry(Self::backoff())
            .when(Self::is_transient)
            .await
    }

    async fn complete(&self, cart_id: Uuid) -> Result<CartOutcome> {
        (|| async { self.complete_cart(cart_id).await })
            .retry(Self::backoff())
            .when(Self::is_transient)
            .await
    }
}
