//! Mock cart provider for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Cart, CartStatus};
use crate::interfaces::cart_provider::{CartError, CartOutcome, CartProvider, Result};

/// In-memory cart provider.
///
/// `complete` only transitions an `active` cart, mirroring the cart
/// service's conditional write: a second completion reports
/// `AlreadyCompleted` instead of clearing anything twice.
#[derive(Default)]
pub struct MockCartProvider {
    carts: RwLock<HashMap<Uuid, Cart>>,
    fail_on_fetch: RwLock<bool>,
    fail_on_complete: RwLock<bool>,
}

impl MockCartProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_cart(&self, cart: Cart) {
        self.carts.write().await.insert(cart.id, cart);
    }

    pub async fn cart(&self, cart_id: Uuid) -> Option<Cart> {
        self.carts.read().await.get(&cart_id).cloned()
    }

    pub async fn set_fail_on_fetch(&self, fail: bool) {
        *self.fail_on_fetch.write().await = fail;
    }

    pub async fn set_fail_on_complete(&self, fail: bool) {
        *self.fail_on_complete.write().await = fail;
    }
}

#[async_trait]
impl CartProvider for MockCartProvider {
    async fn active_cart(&self, user_id: Uuid) -> Result<Cart> {
        if *self.fail_on_fetch.read().await {
            return Err(CartError::Status(500));
        }

        self.carts
            .read()
            .await
            .values()
            .find(|c| c.user_id == user_id && c.status == CartStatus::Active)
            .cloned()
            .ok_or(CartError::NotFound)
    }

    async fn complete(&self, cart_id: Uuid) -> Result<CartOutcome> {
        if *self.fail_on_complete.read().await {
            return Err(CartError::Status(500));
        }

        let mut carts = self.carts.write().await;
        let cart = carts.get_mut(&cart_id).ok_or(CartError::NotFound)?;

        if cart.status == CartStatus::Active {
            cart.status = CartStatus::Completed;
            cart.items.clear();
            Ok(CartOutcome::Completed)
        } else {
            Ok(CartOutcome::AlreadyCompleted)
        }
    }
}
