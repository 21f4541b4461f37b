//! SQLite StockLedger implementation.

use async_trait::async_trait;
use sea_query::{Expr, Query, SqliteQueryBuilder};
use sqlx::{Row, SqlitePool};

use crate::interfaces::stock_ledger::{Result, StockError, StockLedger};
use crate::storage::schema::Products;

/// SQLite implementation of the stock ledger.
pub struct SqliteStockLedger {
    pool: SqlitePool,
}

impl SqliteStockLedger {
    /// Create a new SQLite stock ledger.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the products table if it does not exist.
    pub async fn init(&self) -> Result<()> {
        sqlx::raw_sql(crate::storage::schema::CREATE_PRODUCTS_TABLE)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn read_stock(&self, product_id: i64) -> Result<Option<i64>> {
        let query = Query::select()
            .column(Products::StockQuantity)
            .from(Products::Table)
            .and_where(Expr::col(Products::Id).eq(product_id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;

        Ok(row.map(|r| r.get("stock_quantity")))
    }
}

#[async_trait]
impl StockLedger for SqliteStockLedger {
    async fn available(&self, product_id: i64) -> Result<i64> {
        self.read_stock(product_id)
            .await?
            .ok_or(StockError::NotFound { product_id })
    }

    async fn decrement(&self, product_id: i64, quantity: i64) -> Result<()> {
        // Single conditional UPDATE: the guard and the write are one atomic
        // statement, so concurrent checkouts cannot drive stock negative no
        // matter what their earlier validation reads saw.
        let query = Query::update()
            .table(Products::Table)
            .value(
                Products::StockQuantity,
                Expr::col(Products::StockQuantity).sub(quantity),
            )
            .and_where(Expr::col(Products::Id).eq(product_id))
            .and_where(Expr::col(Products::StockQuantity).gte(quantity))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return match self.read_stock(product_id).await? {
                Some(available) => Err(StockError::Insufficient {
                    product_id,
                    requested: quantity,
                    available,
                }),
                None => Err(StockError::NotFound { product_id }),
            };
        }

        Ok(())
    }

    async fn restock(&self, product_id: i64, quantity: i64) -> Result<()> {
        let query = Query::update()
            .table(Products::Table)
            .value(
                Products::StockQuantity,
                Expr::col(Products::StockQuantity).add(quantity),
            )
            .and_where(Expr::col(Products::Id).eq(product_id))
            .to_string(SqliteQueryBuilder);

        let result = sqlx::query(&query).execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(StockError::NotFound { product_id });
        }

        Ok(())
    }
}
