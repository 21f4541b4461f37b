//! Loyalty point ledger interface.

use async_trait::async_trait;
use uuid::Uuid;

/// Result type for loyalty operations.
pub type Result<T> = std::result::Result<T, LoyaltyError>;

/// Errors from loyalty operations.
#[derive(Debug, thiserror::Error)]
pub enum LoyaltyError {
    #[error("insufficient loyalty points: requested {requested}, balance {balance}")]
    InsufficientPoints { requested: i64, balance: i64 },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Interface to per-user point balances and the transaction ledger.
///
/// Every balance mutation produces exactly one ledger row.
#[async_trait]
pub trait LoyaltyLedger: Send + Sync {
    /// Current point balance; zero for a user with no account row.
    async fn balance(&self, user_id: Uuid) -> Result<i64>;

    /// Debit `points` from the user's balance for an order.
    ///
    /// The balance check and debit are one atomic conditional write; a
    /// balance below `points` fails with `InsufficientPoints` and leaves
    /// the balance untouched.
    async fn redeem(&self, user_id: Uuid, points: i64, order_id: Uuid) -> Result<()>;

    /// Credit points earned for `amount_spent` on an order.
    ///
    /// Returns the number of points credited. A spend too small to earn a
    /// point is a no-op returning zero. This operation is never allowed to
    /// fail the surrounding checkout.
    async fn earn(&self, user_id: Uuid, order_id: Uuid, amount_spent: i64) -> Result<i64>;
}
