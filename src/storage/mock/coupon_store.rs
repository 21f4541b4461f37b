//! Mock coupon store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::Coupon;
use crate::interfaces::coupon_store::{CouponStore, Result};
use crate::interfaces::order_repository::StorageError;

/// One recorded coupon application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedUsage {
    pub coupon_id: i64,
    pub user_id: Uuid,
    pub order_id: Uuid,
}

/// Mock coupon store keyed by coupon code.
#[derive(Default)]
pub struct MockCouponStore {
    coupons: RwLock<HashMap<String, Coupon>>,
    usages: RwLock<Vec<RecordedUsage>>,
    fail_on_record_usage: RwLock<bool>,
}

impl MockCouponStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, coupon: Coupon) {
        self.coupons
            .write()
            .await
            .insert(coupon.code.clone(), coupon);
    }

    pub async fn usages(&self) -> Vec<RecordedUsage> {
        self.usages.read().await.clone()
    }

    pub async fn used_count(&self, code: &str) -> Option<i64> {
        self.coupons.read().await.get(code).map(|c| c.used_count)
    }

    pub async fn set_fail_on_record_usage(&self, fail: bool) {
        *self.fail_on_record_usage.write().await = fail;
    }
}

#[async_trait]
impl CouponStore for MockCouponStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        Ok(self.coupons.read().await.get(code).cloned())
    }

    async fn record_usage(&self, coupon_id: i64, user_id: Uuid, order_id: Uuid) -> Result<()> {
        if *self.fail_on_record_usage.read().await {
            return Err(StorageError::InvalidValue("injected failure".to_string()));
        }

        let mut coupons = self.coupons.write().await;
        if let Some(coupon) = coupons.values_mut().find(|c| c.id == coupon_id) {
            coupon.used_count += 1;
        }

        self.usages.write().await.push(RecordedUsage {
            coupon_id,
            user_id,
            order_id,
        });

        Ok(())
    }
}
