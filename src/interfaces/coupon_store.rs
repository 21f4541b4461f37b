//! Coupon lookup and usage recording interface.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::Coupon;

use super::order_repository::StorageError;

/// Result type for coupon operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Interface to coupon definitions and the usage ledger.
///
/// Evaluation itself is pure (`Coupon::evaluate`); this port only covers
/// the reads and writes around it.
#[async_trait]
pub trait CouponStore: Send + Sync {
    /// Look up a coupon by its unique code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>>;

    /// Record one application of a coupon to an order.
    ///
    /// Appends a usage row and increments the coupon's used count in one
    /// transaction.
    async fn record_usage(&self, coupon_id: i64, user_id: Uuid, order_id: Uuid) -> Result<()>;
}
