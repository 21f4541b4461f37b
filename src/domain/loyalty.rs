//! Loyalty point account and ledger types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-user loyalty point balance.
///
/// `balance = total_earned - total_redeemed` and never goes negative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoyaltyAccount {
    pub user_id: Uuid,
    pub balance: i64,
    pub total_earned: i64,
    pub total_redeemed: i64,
}

/// Direction of a loyalty ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoyaltyTransactionKind {
    Earn,
    Redeem,
}

impl LoyaltyTransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoyaltyTransactionKind::Earn => "earn",
            LoyaltyTransactionKind::Redeem => "redeem",
        }
    }
}
