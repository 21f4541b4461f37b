//! SQLite OrderRepository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sea_query::{Expr, Query, SqliteQueryBuilder};
use sqlx::{Row, SqliteConnection, SqlitePool};
use uuid::Uuid;

use crate::domain::{NewOrder, Order, OrderItem, OrderStatus};
use crate::interfaces::order_repository::{OrderRepository, Result, StorageError};
use crate::storage::helpers::parse_datetime;
use crate::storage::schema::{OrderItems, OrderTracking, Orders};

/// SQLite implementation of the order repository.
pub struct SqliteOrderRepository {
    pool: SqlitePool,
}

impl SqliteOrderRepository {
    /// Create a new SQLite order repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the orders, order_items, and order_tracking tables.
    pub async fn init(&self) -> Result<()> {
        sqlx::raw_sql(crate::storage::schema::CREATE_ORDERS_TABLES)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Insert the order header and items within an already-started transaction.
    async fn insert_order(conn: &mut SqliteConnection, order: &Order) -> Result<()> {
        let query = Query::insert()
            .into_table(Orders::Table)
            .columns([
                Orders::Id,
                Orders::UserId,
                Orders::Total,
                Orders::ShippingAddress,
                Orders::ShippingPhone,
                Orders::PaymentMethod,
                Orders::Status,
                Orders::CreatedAt,
            ])
            .values_panic([
                order.id.to_string().into(),
                order.user_id.to_string().into(),
                order.total.into(),
                order.shipping_address.clone().into(),
                order.shipping_phone.clone().into(),
                order.payment_method.clone().into(),
                order.status.as_str().into(),
                order.created_at.to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *conn).await?;

        for item in &order.items {
            let query = Query::insert()
                .into_table(OrderItems::Table)
                .columns([
                    OrderItems::OrderId,
                    OrderItems::ProductId,
                    OrderItems::Quantity,
                    OrderItems::Price,
                ])
                .values_panic([
                    order.id.to_string().into(),
                    item.product_id.into(),
                    item.quantity.into(),
                    item.price.into(),
                ])
                .to_string(SqliteQueryBuilder);

            sqlx::query(&query).execute(&mut *conn).await?;
        }

        Ok(())
    }

    async fn fetch_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>> {
        let query = Query::select()
            .columns([OrderItems::ProductId, OrderItems::Quantity, OrderItems::Price])
            .from(OrderItems::Table)
            .and_where(Expr::col(OrderItems::OrderId).eq(order_id.to_string()))
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(|row| OrderItem {
                product_id: row.get("product_id"),
                quantity: row.get("quantity"),
                price: row.get("price"),
            })
            .collect())
    }
}

#[async_trait]
impl OrderRepository for SqliteOrderRepository {
    async fn create(&self, order: NewOrder) -> Result<Order> {
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

        // BEGIN IMMEDIATE acquires the write lock upfront, preventing deadlocks
        // when concurrent DEFERRED transactions race to upgrade from shared to
        // exclusive.
        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result = Self::insert_order(&mut conn, &order).await;

        match result {
            Ok(()) => {
                sqlx::query("COMMIT").execute(&mut *conn).await?;
                Ok(order)
            }
            Err(e) => {
                let _ = sqlx::query("ROLLBACK").execute(&mut *conn).await;
                Err(e)
            }
        }
    }

    async fn delete(&self, order_id: Uuid) -> Result<()> {
        let order_id_str = order_id.to_string();

        let delete_items = Query::delete()
            .from_table(OrderItems::Table)
            .and_where(Expr::col(OrderItems::OrderId).eq(&order_id_str))
            .to_string(SqliteQueryBuilder);
        let delete_tracking = Query::delete()
            .from_table(OrderTracking::Table)
            .and_where(Expr::col(OrderTracking::OrderId).eq(&order_id_str))
            .to_string(SqliteQueryBuilder);
        let delete_header = Query::delete()
            .from_table(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(&order_id_str))
            .to_string(SqliteQueryBuilder);

        let mut conn = self.pool.acquire().await?;
        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;

        let result: Result<()> = async {
            sqlx::query(&delete_items).execute(&mut *conn).await?;
            sqlx::query(&delete_tracking).execute(&mut *conn).await?;
            sqlx::query(&delete_header).execute(&mut *conn).await?;
            Ok(())
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

    async fn add_tracking(&self, order_id: Uuid, status: OrderStatus) -> Result<()> {
        let query = Query::insert()
            .into_table(OrderTracking::Table)
            .columns([
                OrderTracking::OrderId,
                OrderTracking::Status,
                OrderTracking::CreatedAt,
            ])
            .values_panic([
                order_id.to_string().into(),
                status.as_str().into(),
                Utc::now().to_rfc3339().into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&self.pool).await?;

        Ok(())
    }

    async fn find(&self, order_id: Uuid) -> Result<Option<Order>> {
        let query = Query::select()
            .columns([
                Orders::Id,
                Orders::UserId,
                Orders::Total,
                Orders::ShippingAddress,
                Orders::ShippingPhone,
                Orders::PaymentMethod,
                Orders::Status,
                Orders::CreatedAt,
            ])
            .from(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(order_id.to_string()))
            .to_string(SqliteQueryBuilder);

        let row = match sqlx::query(&query).fetch_optional(&self.pool).await? {
            Some(row) => row,
            None => return Ok(None),
        };

        let user_id: String = row.get("user_id");
        let status: String = row.get("status");
        let created_at: String = row.get("created_at");

        let order = Order {
            id: order_id,
            user_id: Uuid::parse_str(&user_id)?,
            total: row.get("total"),
            shipping_address: row.get("shipping_address"),
            shipping_phone: row.get("shipping_phone"),
            payment_method: row.get("payment_method"),
            status: OrderStatus::parse(&status)
                .ok_or_else(|| StorageError::InvalidValue(format!("unknown order status '{status}'")))?,
            created_at: parse_datetime(&created_at)?,
            items: self.fetch_items(order_id).await?,
        };

        Ok(Some(order))
    }
}
