//! Mock stock ledger.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::interfaces::stock_ledger::{Result, StockError, StockLedger};

/// Mock stock ledger that tracks quantities in memory.
///
/// `set_available_override` makes `available` report a stale value while
/// `decrement` still enforces the real quantity, reproducing the
/// check-then-decrement race deterministically.
#[derive(Default)]
pub struct MockStockLedger {
    stock: RwLock<HashMap<i64, i64>>,
    available_override: RwLock<HashMap<i64, i64>>,
}

impl MockStockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_stock(&self, product_id: i64, quantity: i64) {
        self.stock.write().await.insert(product_id, quantity);
    }

    pub async fn stock(&self, product_id: i64) -> Option<i64> {
        self.stock.read().await.get(&product_id).copied()
    }

    pub async fn set_available_override(&self, product_id: i64, quantity: i64) {
        self.available_override
            .write()
            .await
            .insert(product_id, quantity);
    }
}

#[async_trait]
impl StockLedger for MockStockLedger {
    async fn available(&self, product_id: i64) -> Result<i64> {
        if let Some(q) = self.available_override.read().await.get(&product_id) {
            return Ok(*q);
        }
        self.stock
            .read()
            .await
            .get(&product_id)
            .copied()
            .ok_or(StockError::NotFound { product_id })
    }

    async fn decrement(&self, product_id: i64, quantity: i64) -> Result<()> {
        let mut stock = self.stock.write().await;
        let available = *stock
            .get(&product_id)
            .ok_or(StockError::NotFound { product_id })?;

        if available < quantity {
            return Err(StockError::Insufficient {
                product_id,
                requested: quantity,
                available,
            });
        }

        stock.insert(product_id, available - quantity);
        Ok(())
    }

    async fn restock(&self, product_id: i64, quantity: i64) -> Result<()> {
        let mut stock = self.stock.write().await;
        let available = *stock
            .get(&product_id)
            .ok_or(StockError::NotFound { product_id })?;

        stock.insert(product_id, available + quantity);
        Ok(())
    }
}
