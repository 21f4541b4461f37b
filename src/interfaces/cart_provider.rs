//! Cart access interface.
//!
//! Cart data is owned by the cart service; the order service reaches it
//! over HTTP. The network hop can fail independently of local storage,
//! which is why this is a separate port with its own error type.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Cart;

/// Result type for cart operations.
pub type Result<T> = std::result::Result<T, CartError>;

/// Errors from the cart service.
#[derive(Debug, thiserror::Error)]
pub enum CartError {
    #[error("no active cart for user")]
    NotFound,

    #[error("cart service returned status {0}")]
    Status(u16),

    #[error("cart service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cart service response could not be decoded: {0}")]
    Decode(String),
}

/// Outcome of completing a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartOutcome {
    /// The cart transitioned from active to completed.
    Completed,
    /// The cart was already completed. Completion is idempotent, so this
    /// is not an error; the orchestrator may retry the step independently
    /// of order creation.
    AlreadyCompleted,
}

/// Interface to the cart service.
///
/// Implementations:
/// - `HttpCartProvider`: network-backed, talks to the real cart service
/// - `MockCartProvider`: in-memory, for tests
#[async_trait]
pub trait CartProvider: Send + Sync {
    /// Fetch the user's active cart with its priced line items.
    async fn active_cart(&self, user_id: Uuid) -> Result<Cart>;

    /// Mark a cart completed and remove its line items.
    ///
    /// Only an `active` cart is transitioned; a second caller observing an
    /// already-completed cart gets `CartOutcome::AlreadyCompleted`.
    async fn complete(&self, cart_id: Uuid) -> Result<CartOutcome>;
}
