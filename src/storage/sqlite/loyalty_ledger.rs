//! SQLite LoyaltyLedger implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_query::{Expr, Query, SqliteQueryBuilder};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::config::RewardsConfig;
use crate::domain::{LoyaltyAccount, LoyaltyTransactionKind};
use crate::interfaces::loyalty_ledger::{LoyaltyError, LoyaltyLedger, Result};
use crate::storage::schema::{LoyaltyPoints, LoyaltyTransactions};

/// SQLite implementation of the loyalty point ledger.
pub struct SqliteLoyaltyLedger {
    pool: SqlitePool,
    rewards: RewardsConfig,
}

impl SqliteLoyaltyLedger {
    /// Create a new SQLite loyalty ledger.
    pub fn new(pool: SqlitePool, rewards: RewardsConfig) -> Self {
        Self { pool, rewards }
    }

    /// Create the loyalty point tables.
    pub async fn init(&self) -> Result<()> {
        sqlx::raw_sql(crate::storage::schema::CREATE_LOYALTY_TABLES)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Fetch the full account row, if the user has one.
    pub async fn account(&self, user_id: Uuid) -> Result<Option<LoyaltyAccount>> {
        let query = Query::select()
            .columns([
                LoyaltyPoints::Balance,
                LoyaltyPoints::TotalEarned,
                LoyaltyPoints::TotalRedeemed,
            ])
            .from(LoyaltyPoints::Table)
            .and_where(Expr::col(LoyaltyPoints::UserId).eq(user_id.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&self.pool).await?;

        Ok(row.map(|r| LoyaltyAccount {
            user_id,
            balance: r.get("balance"),
            total_earned: r.get("total_earned"),
            total_redeemed: r.get("total_redeemed"),
        }))
    }

    async fn read_balance(
        conn: &mut SqliteConnection,
        user_id: Uuid,
    ) -> Result<i64> {
        let query = Query::select()
            .column(LoyaltyPoints::Balance)
            .from(LoyaltyPoints::Table)
            .and_where(Expr::col(LoyaltyPoints::UserId).eq(user_id.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *conn).await?;

        Ok(row.map(|r| r.get("balance")).unwrap_or(0))
    }

    /// Append one ledger row within an already-started transaction.
    async fn insert_transaction(
        conn: &mut SqliteConnection,
        user_id: Uuid,
        kind: LoyaltyTransactionKind,
        points: i64,
        order_id: Uuid,
        description: String,
    ) -> Result<()> {
        let query = Query::insert()
            .into_table(LoyaltyTransactions::Table)
            .columns([
                LoyaltyTransactions::UserId,
                LoyaltyTransactions::Kind,
                LoyaltyTransactions::Points,
                LoyaltyTransactions::OrderId,
                LoyaltyTransactions::Description,
                LoyaltyTransactions::CreatedAt,
            ])
            .values_panic([
                user_id.to_string().into(),
                kind.as_str().into(),
                points.into(),
                order_id.to_string().into(),
                description.into(),
                Utc::now().to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;

        Ok(())
    }
}

#[async_trait]
impl LoyaltyLedger for SqliteLoyaltyLedger {
    async fn balance(&self, user_id: Uuid) -> Result<i64> {
        let mut conn = self.pool.acquire().await?;
        Self::read_balance(&mut conn, user_id).await
    }

    async fn redeem(&self, user_id: Uuid, points: i64, order_id: Uuid) -> Result<()> {
        // Conditional debit: the balance guard and the subtraction are one
        // atomic statement, mirroring the stock decrement.
        let debit = Query::update()
            .table(LoyaltyPoints::Table)
            .value(
                LoyaltyPoints::Balance,
                Expr::col(LoyaltyPoints::Balance).sub(points),
            )
            .value(
                LoyaltyPoints::TotalRedeemed,
                Expr::col(LoyaltyPoints::TotalRedeemed).add(points),
            )
            .and_where(Expr::col(LoyaltyPoints::UserId).eq(user_id.to_string()))
            .and_where(Expr::col(LoyaltyPoints::Balance).gte(points))
            .to_string(SqliteQueryBuilder);

        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result: Result<()> = async {
            let updated = sqlx::query(&debit).execute(&mut *conn).await?;

            if updated.rows_affected() == 0 {
                let balance = Self::read_balance(&mut conn, user_id).await?;
                return Err(LoyaltyError::InsufficientPoints {
                    requested: points,
                    balance,
                });
            }

            Self::insert_transaction(
                &mut conn,
                user_id,
                LoyaltyTransactionKind::Redeem,
                points,
                order_id,
                format!("Redeemed {points} points on order {order_id}"),
            )
            .await
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(())
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }

    async fn earn(&self, user_id: Uuid, order_id: Uuid, amount_spent: i64) -> Result<i64> {
        let points = self.rewards.points_for_amount(amount_spent);
        if points == 0 {
            return Ok(0);
        }

        let credit = Query::update()
            .table(LoyaltyPoints::Table)
            .value(
                LoyaltyPoints::Balance,
                Expr::col(LoyaltyPoints::Balance).add(points),
            )
            .value(
                LoyaltyPoints::TotalEarned,
                Expr::col(LoyaltyPoints::TotalEarned).add(points),
            )
            .and_where(Expr::col(LoyaltyPoints::UserId).eq(user_id.to_string()))
            .to_string(SqliteQueryBuilder);

        let insert_account = Query::insert()
            .into_table(LoyaltyPoints::Table)
            .columns([
                LoyaltyPoints::UserId,
                LoyaltyPoints::Balance,
                LoyaltyPoints::TotalEarned,
                LoyaltyPoints::TotalRedeemed,
            ])
            .values_panic([
                user_id.to_string().into(),
                points.into(),
                points.into(),
                0i64.into(),
            ])
            .to_string(SqliteQueryBuilder);

        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result: Result<()> = async {
            let updated = sqlx::query(&credit).execute(&mut *conn).await?;

            // First earn for this user creates the account row.
            if updated.rows_affected() == 0 {
                sqlx::query(&insert_account).execute(&mut *conn).await?;
            }

            Self::insert_transaction(
                &mut conn,
                user_id,
                LoyaltyTransactionKind::Earn,
                points,
                order_id,
                format!("Earned {points} points on order {order_id}"),
            )
            .await
        }
        .await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(points)
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }
}
