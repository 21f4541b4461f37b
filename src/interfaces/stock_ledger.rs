//! Stock ledger interface.

use async_trait::async_trait;

/// Result type for stock operations.
pub type Result<T> = std::result::Result<T, StockError>;

/// Errors from stock operations.
#[derive(Debug, thiserror::Error)]
pub enum StockError {
    #[error("product {product_id} not found")]
    NotFound { product_id: i64 },

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    Insufficient {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Interface for reading and adjusting product stock.
#[async_trait]
pub trait StockLedger: Send + Sync {
    /// Current stock quantity for a product.
    async fn available(&self, product_id: i64) -> Result<i64>;

    /// Decrement stock by `quantity`, conditionally.
    ///
    /// The write must only apply while `stock_quantity >= quantity`, as a
    /// single atomic statement. The validation read and this write are
    /// separated by several steps, so two concurrent checkouts can both
    /// pass validation; the conditional write makes the last writer
    /// authoritative. A write that matches no row fails with
    /// `Insufficient` (or `NotFound` if the product vanished) and must
    /// trigger rollback of the order, never negative stock.
    async fn decrement(&self, product_id: i64, quantity: i64) -> Result<()>;

    /// Credit stock back after a failed checkout rolled back its order.
    async fn restock(&self, product_id: i64, quantity: i64) -> Result<()>;
}
