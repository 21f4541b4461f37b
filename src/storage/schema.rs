//! Database schema definitions using sea-query.
//!
//! These define the table and column identifiers for type-safe query
//! building, plus the DDL each store runs at startup.

use sea_query::Iden;

/// Products table schema (catalog-owned; checkout touches stock only).
#[derive(Iden)]
pub enum Products {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "name"]
    Name,
    #[iden = "price"]
    Price,
    #[iden = "stock_quantity"]
    StockQuantity,
}

/// Orders table schema.
#[derive(Iden)]
pub enum Orders {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "user_id"]
    UserId,
    #[iden = "total"]
    Total,
    #[iden = "shipping_address"]
    ShippingAddress,
    #[iden = "shipping_phone"]
    ShippingPhone,
    #[iden = "payment_method"]
    PaymentMethod,
    #[iden = "status"]
    Status,
    #[iden = "created_at"]
    CreatedAt,
}

/// Order items table schema.
#[derive(Iden)]
pub enum OrderItems {
    Table,
    #[iden = "order_id"]
    OrderId,
    #[iden = "product_id"]
    ProductId,
    #[iden = "quantity"]
    Quantity,
    #[iden = "price"]
    Price,
}

/// Order tracking table schema.
#[derive(Iden)]
pub enum OrderTracking {
    Table,
    #[iden = "order_id"]
    OrderId,
    #[iden = "status"]
    Status,
    #[iden = "created_at"]
    CreatedAt,
}

/// Coupons table schema.
#[derive(Iden)]
pub enum Coupons {
    Table,
    #[iden = "id"]
    Id,
    #[iden = "code"]
    Code,
    #[iden = "discount_type"]
    DiscountType,
    #[iden = "discount_value"]
    DiscountValue,
    #[iden = "min_purchase_amount"]
    MinPurchaseAmount,
    #[iden = "max_discount_amount"]
    MaxDiscountAmount,
    #[iden = "usage_limit"]
    UsageLimit,
    #[iden = "used_count"]
    UsedCount,
    #[iden = "valid_from"]
    ValidFrom,
    #[iden = "valid_until"]
    ValidUntil,
    #[iden = "is_active"]
    IsActive,
}

/// Coupon usage ledger schema.
#[derive(Iden)]
pub enum CouponUsage {
    Table,
    #[iden = "coupon_id"]
    CouponId,
    #[iden = "user_id"]
    UserId,
    #[iden = "order_id"]
    OrderId,
    #[iden = "used_at"]
    UsedAt,
}

/// Loyalty point balances schema.
#[derive(Iden)]
pub enum LoyaltyPoints {
    Table,
    #[iden = "user_id"]
    UserId,
    #[iden = "balance"]
    Balance,
    #[iden = "total_earned"]
    TotalEarned,
    #[iden = "total_redeemed"]
    TotalRedeemed,
}

/// Loyalty transaction ledger schema.
///
/// The table name differs from the enum name, so it is spelled out.
#[derive(Iden)]
pub enum LoyaltyTransactions {
    #[iden = "loyalty_points_transactions"]
    Table,
    #[iden = "user_id"]
    UserId,
    #[iden = "kind"]
    Kind,
    #[iden = "points"]
    Points,
    #[iden = "order_id"]
    OrderId,
    #[iden = "description"]
    Description,
    #[iden = "created_at"]
    CreatedAt,
}

/// SQL for creating the products table.
pub const CREATE_PRODUCTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    price INTEGER NOT NULL,
    stock_quantity INTEGER NOT NULL DEFAULT 0 CHECK (stock_quantity >= 0)
);
"#;

/// SQL for creating the orders, order_items, and order_tracking tables.
pub const CREATE_ORDERS_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    total INTEGER NOT NULL,
    shipping_address TEXT NOT NULL,
    shipping_phone TEXT NOT NULL,
    payment_method TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_orders_user ON orders(user_id);

CREATE TABLE IF NOT EXISTS order_items (
    order_id TEXT NOT NULL,
    product_id INTEGER NOT NULL,
    quantity INTEGER NOT NULL,
    price INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_order_items_order ON order_items(order_id);

CREATE TABLE IF NOT EXISTS order_tracking (
    order_id TEXT NOT NULL,
    status TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_order_tracking_order ON order_tracking(order_id);
"#;

/// SQL for creating the coupons and coupon_usage tables.
pub const CREATE_COUPONS_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS coupons (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    code TEXT NOT NULL UNIQUE,
    discount_type TEXT NOT NULL,
    discount_value INTEGER NOT NULL,
    min_purchase_amount INTEGER NOT NULL DEFAULT 0,
    max_discount_amount INTEGER,
    usage_limit INTEGER,
    used_count INTEGER NOT NULL DEFAULT 0,
    valid_from TEXT NOT NULL,
    valid_until TEXT NOT NULL,
    is_active INTEGER NOT NULL DEFAULT 1
);

CREATE TABLE IF NOT EXISTS coupon_usage (
    coupon_id INTEGER NOT NULL,
    user_id TEXT NOT NULL,
    order_id TEXT NOT NULL,
    used_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_coupon_usage_coupon ON coupon_usage(coupon_id);
"#;

/// SQL for creating the loyalty point tables.
pub const CREATE_LOYALTY_TABLES: &str = r#"
CREATE TABLE IF NOT EXISTS loyalty_points (
    user_id TEXT PRIMARY KEY,
    balance INTEGER NOT NULL DEFAULT 0 CHECK (balance >= 0),
    total_earned INTEGER NOT NULL DEFAULT 0,
    total_redeemed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS loyalty_points_transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    kind TEXT NOT NULL,
    points INTEGER NOT NULL,
    order_id TEXT,
    description TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_loyalty_tx_user ON loyalty_points_transactions(user_id);
"#;
