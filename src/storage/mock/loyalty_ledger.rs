//! Mock loyalty ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::RewardsConfig;
use crate::domain::LoyaltyTransactionKind;
use crate::interfaces::loyalty_ledger::{LoyaltyError, LoyaltyLedger, Result};

/// One recorded ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedTransaction {
    pub user_id: Uuid,
    pub kind: LoyaltyTransactionKind,
    pub points: i64,
    pub order_id: Uuid,
}

/// Mock loyalty ledger with in-memory balances.
pub struct MockLoyaltyLedger {
    rewards: RewardsConfig,
    balances: RwLock<HashMap<Uuid, i64>>,
    transactions: RwLock<Vec<RecordedTransaction>>,
    fail_on_redeem: RwLock<bool>,
    fail_on_earn: RwLock<bool>,
}

impl Default for MockLoyaltyLedger {
    fn default() -> Self {
        Self {
            rewards: RewardsConfig::default(),
            balances: RwLock::default(),
            transactions: RwLock::default(),
            fail_on_redeem: RwLock::new(false),
            fail_on_earn: RwLock::new(false),
        }
    }
}

impl MockLoyaltyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_balance(&self, user_id: Uuid, points: i64) {
        self.balances.write().await.insert(user_id, points);
    }

    pub async fn transactions(&self) -> Vec<RecordedTransaction> {
        self.transactions.read().await.clone()
    }

    pub async fn set_fail_on_redeem(&self, fail: bool) {
        *self.fail_on_redeem.write().await = fail;
    }

    pub async fn set_fail_on_earn(&self, fail: bool) {
        *self.fail_on_earn.write().await = fail;
    }
}

#[async_trait]
impl LoyaltyLedger for MockLoyaltyLedger {
    async fn balance(&self, user_id: Uuid) -> Result<i64> {
        Ok(self.balances.read().await.get(&user_id).copied().unwrap_or(0))
    }

    async fn redeem(&self, user_id: Uuid, points: i64, order_id: Uuid) -> Result<()> {
        if *self.fail_on_redeem.read().await {
            return Err(LoyaltyError::Database(sqlx::Error::PoolClosed));
        }

        let mut balances = self.balances.write().await;
        let balance = balances.get(&user_id).copied().unwrap_or(0);

        if balance < points {
            return Err(LoyaltyError::InsufficientPoints {
                requested: points,
                balance,
            });
        }

        balances.insert(user_id, balance - points);
        self.transactions.write().await.push(RecordedTransaction {
            user_id,
            kind: LoyaltyTransactionKind::Redeem,
            points,
            order_id,
        });

        Ok(())
    }

    async fn earn(&self, user_id: Uuid, order_id: Uuid, amount_spent: i64) -> Result<i64> {
        if *self.fail_on_earn.read().await {
            return Err(LoyaltyError::Database(sqlx::Error::PoolClosed));
        }

        let points = self.rewards.points_for_amount(amount_spent);
        if points == 0 {
            return Ok(0);
        }

        let mut balances = self.balances.write().await;
        let balance = balances.get(&user_id).copied().unwrap_or(0);
        balances.insert(user_id, balance + points);

        self.transactions.write().await.push(RecordedTransaction {
            user_id,
            kind: LoyaltyTransactionKind::Earn,
            points,
            order_id,
        });

        Ok(points)
    }
}
