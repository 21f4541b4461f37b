//! Storage implementations.

use std::sync::Arc;

use tracing::{error, info};

use crate::config::Config;
use crate::interfaces::{CouponStore, LoyaltyLedger, OrderRepository, StockLedger};

pub mod helpers;
pub mod mock;
pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteCouponStore, SqliteLoyaltyLedger, SqliteOrderRepository, SqliteStockLedger};

/// The stores checkout coordinates, as trait objects.
pub type Stores = (
    Arc<dyn StockLedger>,
    Arc<dyn CouponStore>,
    Arc<dyn LoyaltyLedger>,
    Arc<dyn OrderRepository>,
);

/// Initialize storage based on configuration.
///
/// Returns the stock ledger, coupon store, loyalty ledger, and order
/// repository backed by the configured database.
pub async fn init_storage(config: &Config) -> Result<Stores, Box<dyn std::error::Error>> {
    info!(
        "Storage: {} at {}",
        config.storage.storage_type, config.storage.path
    );

    match config.storage.storage_type.as_str() {
        "sqlite" => {
            if let Some(parent) = std::path::Path::new(&config.storage.path).parent() {
                std::fs::create_dir_all(parent)?;
            }

            let pool =
                sqlx::SqlitePool::connect(&format!("sqlite:{}?mode=rwc", config.storage.path))
                    .await?;

            let stock = Arc::new(SqliteStockLedger::new(pool.clone()));
            stock.init().await?;

            let coupons = Arc::new(SqliteCouponStore::new(pool.clone()));
            coupons.init().await?;

            let loyalty = Arc::new(SqliteLoyaltyLedger::new(pool.clone(), config.rewards.clone()));
            loyalty.init().await?;

            let orders = Arc::new(SqliteOrderRepository::new(pool));
            orders.init().await?;

            Ok((stock, coupons, loyalty, orders))
        }
        other => {
            error!("Unknown storage type: {}", other);
            Err(format!("Unknown storage type: {}", other).into())
        }
    }
}
