//! SQLite CouponStore implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_query::{Expr, Query, SqliteQueryBuilder};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::{Coupon, DiscountType};
use crate::interfaces::coupon_store::{CouponStore, Result};
use crate::interfaces::order_repository::StorageError;
use crate::storage::helpers::parse_datetime;
use crate::storage::schema::{CouponUsage, Coupons};

/// SQLite implementation of the coupon store.
pub struct SqliteCouponStore {
    pool: SqlitePool,
}

impl SqliteCouponStore {
    /// Create a new SQLite coupon store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the coupons and coupon_usage tables.
    pub async fn init(&self) -> Result<()> {
        sqlx::raw_sql(crate::storage::schema::CREATE_COUPONS_TABLES)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Record a usage row and bump the used count within a transaction.
    async fn insert_usage(
        conn: &mut SqliteConnection,
        coupon_id: i64,
        user_id: Uuid,
        order_id: Uuid,
    ) -> Result<()> {
        let insert = Query::insert()
            .into_table(CouponUsage::Table)
            .columns([
                CouponUsage::CouponId,
                CouponUsage::UserId,
                CouponUsage::OrderId,
                CouponUsage::UsedAt,
            ])
            .values_panic([
                coupon_id.into(),
                user_id.to_string().into(),
                order_id.to_string().into(),
                Utc::now().to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&insert).execute(&mut *conn).await?;

        let bump = Query::update()
            .table(Coupons::Table)
            .value(Coupons::UsedCount, Expr::col(Coupons::UsedCount).add(1))
            .and_where(Expr::col(Coupons::Id).eq(coupon_id))
            .to_string(SqliteQueryBuilder);

        sqlx::query(&bump).execute(&mut *conn).await?;

        Ok(())
    }
}

#[async_trait]
impl CouponStore for SqliteCouponStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>> {
        let query = Query::select()
            .columns([
                Coupons::Id,
                Coupons::Code,
                Coupons::DiscountType,
                Coupons::DiscountValue,
                Coupons::MinPurchaseAmount,
                Coupons::MaxDiscountAmount,
                Coupons::UsageLimit,
                Coupons::UsedCount,
                Coupons::ValidFrom,
                Coupons::ValidUntil,
                Coupons::IsActive,
            ])
            .from(Coupons::Table)
            .and_where(Expr::col(Coupons::Code).eq(code))
            .to_string(SqliteQueryBuilder);

        let row = match sqlx::query(&query).fetch_optional(&self.pool).await? {
            Some(row) => row,
            None => return Ok(None),
        };

        let discount_type: String = row.get("discount_type");
        let valid_from: String = row.get("valid_from");
        let valid_until: String = row.get("valid_until");
        let is_active: i64 = row.get("is_active");

        let coupon = Coupon {
            id: row.get("id"),
            code: row.get("code"),
            discount_type: DiscountType::parse(&discount_type).ok_or_else(|| {
                StorageError::InvalidValue(format!("unknown discount type '{discount_type}'"))
            })?,
            discount_value: row.get("discount_value"),
            min_purchase_amount: row.get("min_purchase_amount"),
            max_discount_amount: row.get("max_discount_amount"),
            usage_limit: row.get("usage_limit"),
            used_count: row.get("used_count"),
            valid_from: parse_datetime(&valid_from)?,
            valid_until: parse_datetime(&valid_until)?,
            is_active: is_active != 0,
        };

        Ok(Some(coupon))
    }

    async fn record_usage(&self, coupon_id: i64, user_id: Uuid, order_id: Uuid) -> Result<()> {
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = Self::insert_usage(&mut conn, coupon_id, user_id, order_id).await;

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
}
