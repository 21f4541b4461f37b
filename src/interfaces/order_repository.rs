//! Order persistence interface.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{NewOrder, Order, OrderStatus};

/// Result type for order storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during order storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}

/// Interface for order persistence.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Create the order header and its line items in one local transaction.
    ///
    /// Assigns the order id and creation timestamp; the order is written
    /// with status `pending`.
    async fn create(&self, order: NewOrder) -> Result<Order>;

    /// Remove an order, its items, and any tracking rows.
    ///
    /// Used to roll back an order whose stock decrement lost the race.
    async fn delete(&self, order_id: Uuid) -> Result<()>;

    /// Append a tracking entry for an order.
    async fn add_tracking(&self, order_id: Uuid, status: OrderStatus) -> Result<()>;

    /// Fetch an order with its items.
    async fn find(&self, order_id: Uuid) -> Result<Option<Order>>;
}
