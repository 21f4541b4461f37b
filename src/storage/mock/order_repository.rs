//! Mock order repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{NewOrder, Order, OrderStatus};
use crate::interfaces::order_repository::{OrderRepository, Result, StorageError};

/// Mock order repository that stores orders in memory.
#[derive(Default)]
pub struct MockOrderRepository {
    orders: RwLock<HashMap<Uuid, Order>>,
    tracking: RwLock<Vec<(Uuid, OrderStatus)>>,
    fail_on_create: RwLock<bool>,
    fail_on_tracking: RwLock<bool>,
}

impl MockOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.orders.read().await.values().cloned().collect()
    }

    pub async fn tracking(&self) -> Vec<(Uuid, OrderStatus)> {
        self.tracking.read().await.clone()
    }

    pub async fn set_fail_on_create(&self, fail: bool) {
        *self.fail_on_create.write().await = fail;
    }

    pub async fn set_fail_on_tracking(&self, fail: bool) {
        *self.fail_on_tracking.write().await = fail;
    }
}

#[async_trait]
impl OrderRepository for MockOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order> {
        if *self.fail_on_create.read().await {
            return Err(StorageError::InvalidValue("injected failure".to_string()));
        }

        let order = Order {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            total: order.total,
            shipping_address: order.shipping_address,
            shipping_phone: order.shipping_phone,
            payment_method: order.payment_method,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            items: order.items,
        };

        self.orders.write().await.insert(order.id, order.clone());

        Ok(order)
    }

    async fn delete(&self, order_id: Uuid) -> Result<()> {
        self.orders.write().await.remove(&order_id);
        self.tracking.write().await.retain(|(id, _)| *id != order_id);
        Ok(())
    }

    async fn add_tracking(&self, order_id: Uuid, status: OrderStatus) -> Result<()> {
        if *self.fail_on_tracking.read().await {
            return Err(StorageError::InvalidValue("injected failure".to_string()));
        }

        self.tracking.write().await.push((order_id, status));
        Ok(())
    }

    async fn find(&self, order_id: Uuid) -> Result<Option<Order>> {
        Ok(self.orders.read().await.get(&order_id).cloned())
    }
}
