//! End-to-end checkout workflow tests.
//!
//! SQLite-backed tests cover the happy paths and the invariants worth
//! failing a request over; mock-backed tests inject failures into the
//! best-effort steps and the stock race.

use std::sync::Arc;

use sqlx::SqlitePool;
use uuid::Uuid;

use agora::checkout::{CheckoutError, CheckoutService, CheckoutWarning, CreateOrderRequest};
use agora::clients::MockCartProvider;
use agora::config::RewardsConfig;
use agora::domain::{Cart, CartItem, CartStatus, Coupon, CouponRejection, DiscountType, OrderStatus};
use agora::interfaces::{CartOutcome, CartProvider, LoyaltyLedger, StockLedger};
use agora::storage::mock::{
    MockCouponStore, MockLoyaltyLedger, MockOrderRepository, MockStockLedger,
};
use agora::storage::{
    SqliteCouponStore, SqliteLoyaltyLedger, SqliteOrderRepository, SqliteStockLedger,
};

fn active_cart(user_id: Uuid, items: Vec<CartItem>) -> Cart {
    Cart {
        id: Uuid::new_v4(),
        user_id,
        status: CartStatus::Active,
        items,
    }
}

fn item(product_id: i64, quantity: i64, price: i64) -> CartItem {
    CartItem {
        product_id,
        quantity,
        price,
    }
}

fn request() -> CreateOrderRequest {
    CreateOrderRequest {
        shipping_address: "1 Market Street".to_string(),
        shipping_phone: "+15550100".to_string(),
        payment_method: "card".to_string(),
        coupon_code: None,
        use_loyalty_points: None,
    }
}

// ---------------------------------------------------------------------------
// SQLite-backed harness
// ---------------------------------------------------------------------------

struct SqliteHarness {
    pool: SqlitePool,
    _dir: tempfile::TempDir,
    cart: Arc<MockCartProvider>,
    stock: Arc<SqliteStockLedger>,
    loyalty: Arc<SqliteLoyaltyLedger>,
    service: Arc<CheckoutService>,
}

async fn sqlite_harness() -> SqliteHarness {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("checkout.db");
    let pool = SqlitePool::connect(&format!("sqlite:{}?mode=rwc", path.display()))
        .await
        .expect("connect to SQLite");

    let stock = Arc::new(SqliteStockLedger::new(pool.clone()));
    stock.init().await.expect("init stock");
    let coupons = Arc::new(SqliteCouponStore::new(pool.clone()));
    coupons.init().await.expect("init coupons");
    let loyalty = Arc::new(SqliteLoyaltyLedger::new(
        pool.clone(),
        RewardsConfig::default(),
    ));
    loyalty.init().await.expect("init loyalty");
    let orders = Arc::new(SqliteOrderRepository::new(pool.clone()));
    orders.init().await.expect("init orders");

    let cart = Arc::new(MockCartProvider::new());
    let service = Arc::new(CheckoutService::new(
        cart.clone(),
        stock.clone(),
        coupons,
        loyalty.clone(),
        orders,
        RewardsConfig::default(),
    ));

    SqliteHarness {
        pool,
        _dir: dir,
        cart,
        stock,
        loyalty,
        service,
    }
}

impl SqliteHarness {
    async fn seed_product(&self, id: i64, price: i64, stock: i64) {
        sqlx::query("INSERT INTO products (id, name, price, stock_quantity) VALUES (?, ?, ?, ?)")
            .bind(id)
            .bind(format!("product-{id}"))
            .bind(price)
            .bind(stock)
            .execute(&self.pool)
            .await
            .expect("seed product");
    }

    async fn seed_coupon(
        &self,
        code: &str,
        discount_type: &str,
        value: i64,
        min_purchase: i64,
        max_discount: Option<i64>,
    ) {
        let now = chrono::Utc::now();
        sqlx::query(
            "INSERT INTO coupons (code, discount_type, discount_value, min_purchase_amount, \
             max_discount_amount, usage_limit, used_count, valid_from, valid_until, is_active) \
             VALUES (?, ?, ?, ?, ?, NULL, 0, ?, ?, 1)",
        )
        .bind(code)
        .bind(discount_type)
        .bind(value)
        .bind(min_purchase)
        .bind(max_discount)
        .bind((now - chrono::Duration::days(1)).to_rfc3339())
        .bind((now + chrono::Duration::days(1)).to_rfc3339())
        .execute(&self.pool)
        .await
        .expect("seed coupon");
    }

    async fn seed_balance(&self, user_id: Uuid, points: i64) {
        sqlx::query(
            "INSERT INTO loyalty_points (user_id, balance, total_earned, total_redeemed) \
             VALUES (?, ?, ?, 0)",
        )
        .bind(user_id.to_string())
        .bind(points)
        .bind(points)
        .execute(&self.pool)
        .await
        .expect("seed balance");
    }

    async fn count(&self, sql: &str) -> i64 {
        let row: (i64,) = sqlx::query_as(sql)
            .fetch_one(&self.pool)
            .await
            .expect("count query");
        row.0
    }
}

// ---------------------------------------------------------------------------
// Happy paths and fatal validation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_round_trip_two_items() {
    let h = sqlite_harness().await;
    h.seed_product(1, 100, 10).await;
    h.seed_product(2, 50, 5).await;

    let user_id = Uuid::new_v4();
    let cart = active_cart(user_id, vec![item(1, 2, 100), item(2, 1, 50)]);
    let cart_id = cart.id;
    h.cart.insert_cart(cart).await;

    let receipt = h
        .service
        .create_order(user_id, request())
        .await
        .expect("checkout succeeds");

    assert_eq!(receipt.order.total, 250);
    assert_eq!(receipt.order.status, OrderStatus::Pending);
    assert_eq!(receipt.order.items.len(), 2);
    assert_eq!(receipt.order.items[0], agora::domain::OrderItem {
        product_id: 1,
        quantity: 2,
        price: 100,
    });
    assert_eq!(receipt.order.items[1], agora::domain::OrderItem {
        product_id: 2,
        quantity: 1,
        price: 50,
    });
    assert!(receipt.warnings.is_empty());

    // Stock decremented by exactly the ordered quantities.
    assert_eq!(h.stock.available(1).await.expect("available"), 8);
    assert_eq!(h.stock.available(2).await.expect("available"), 4);

    // Tracking entry written, cart completed and emptied.
    assert_eq!(h.count("SELECT COUNT(*) FROM order_tracking").await, 1);
    let cart = h.cart.cart(cart_id).await.expect("cart exists");
    assert_eq!(cart.status, CartStatus::Completed);
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn test_missing_or_empty_cart_rejected() {
    let h = sqlite_harness().await;
    let user_id = Uuid::new_v4();

    match h.service.create_order(user_id, request()).await {
        Err(CheckoutError::EmptyCart) => {}
        other => panic!("expected EmptyCart, got {other:?}"),
    }

    h.cart.insert_cart(active_cart(user_id, vec![])).await;
    match h.service.create_order(user_id, request()).await {
        Err(CheckoutError::EmptyCart) => {}
        other => panic!("expected EmptyCart, got {other:?}"),
    }

    assert_eq!(h.count("SELECT COUNT(*) FROM orders").await, 0);
}

#[tokio::test]
async fn test_blank_shipping_address_rejected() {
    let h = sqlite_harness().await;
    let user_id = Uuid::new_v4();

    let mut req = request();
    req.shipping_address = "   ".to_string();

    match h.service.create_order(user_id, req).await {
        Err(CheckoutError::Validation(_)) => {}
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_zero_price_is_integrity_fault() {
    let h = sqlite_harness().await;
    h.seed_product(1, 100, 10).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 1, 0)]))
        .await;

    match h.service.create_order(user_id, request()).await {
        Err(CheckoutError::Pricing { product_id }) => assert_eq!(product_id, 1),
        other => panic!("expected Pricing, got {other:?}"),
    }

    assert_eq!(h.count("SELECT COUNT(*) FROM orders").await, 0);
    assert_eq!(h.stock.available(1).await.expect("available"), 10);
}

#[tokio::test]
async fn test_vanished_product_rejected() {
    let h = sqlite_harness().await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(99, 1, 100)]))
        .await;

    match h.service.create_order(user_id, request()).await {
        Err(CheckoutError::ProductNotFound { product_id }) => assert_eq!(product_id, 99),
        other => panic!("expected ProductNotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_insufficient_stock_rejected_before_any_write() {
    let h = sqlite_harness().await;
    h.seed_product(1, 100, 2).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 3, 100)]))
        .await;

    match h.service.create_order(user_id, request()).await {
        Err(CheckoutError::InsufficientStock {
            product_id,
            requested,
            available,
        }) => {
            assert_eq!(product_id, 1);
            assert_eq!(requested, 3);
            assert_eq!(available, 2);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    assert_eq!(h.count("SELECT COUNT(*) FROM orders").await, 0);
    assert_eq!(h.stock.available(1).await.expect("available"), 2);
}

// ---------------------------------------------------------------------------
// Coupons
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_coupon_below_minimum_rejected_but_order_created() {
    let h = sqlite_harness().await;
    h.seed_product(42, 10_000, 5).await;
    // Fixed 1,000 off, but only for orders of 50,000 or more.
    h.seed_coupon("SAVE10", "fixed", 1_000, 50_000, None).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(42, 3, 10_000)]))
        .await;

    let mut req = request();
    req.coupon_code = Some("SAVE10".to_string());

    let receipt = h
        .service
        .create_order(user_id, req)
        .await
        .expect("checkout succeeds without the discount");

    assert_eq!(receipt.order.total, 30_000);
    assert_eq!(
        receipt.warnings,
        vec![CheckoutWarning::CouponRejected {
            code: "SAVE10".to_string(),
            reason: CouponRejection::BelowMinimum { minimum: 50_000 },
        }]
    );

    assert_eq!(h.stock.available(42).await.expect("available"), 2);
    assert_eq!(h.count("SELECT COUNT(*) FROM coupon_usage").await, 0);
    assert_eq!(
        h.count("SELECT used_count FROM coupons WHERE code = 'SAVE10'")
            .await,
        0
    );
}

#[tokio::test]
async fn test_unknown_coupon_code_is_a_warning() {
    let h = sqlite_harness().await;
    h.seed_product(1, 10_000, 5).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 1, 10_000)]))
        .await;

    let mut req = request();
    req.coupon_code = Some("NOSUCH".to_string());

    let receipt = h.service.create_order(user_id, req).await.expect("checkout");
    assert_eq!(receipt.order.total, 10_000);
    assert_eq!(
        receipt.warnings,
        vec![CheckoutWarning::CouponRejected {
            code: "NOSUCH".to_string(),
            reason: CouponRejection::Invalid,
        }]
    );
}

#[tokio::test]
async fn test_percentage_coupon_applied_and_recorded() {
    let h = sqlite_harness().await;
    h.seed_product(1, 10_000, 5).await;
    h.seed_coupon("TEN", "percentage", 10, 0, None).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 3, 10_000)]))
        .await;

    let mut req = request();
    req.coupon_code = Some("TEN".to_string());

    let receipt = h.service.create_order(user_id, req).await.expect("checkout");
    assert_eq!(receipt.order.total, 27_000);
    assert!(receipt.warnings.is_empty());

    assert_eq!(h.count("SELECT COUNT(*) FROM coupon_usage").await, 1);
    assert_eq!(
        h.count("SELECT used_count FROM coupons WHERE code = 'TEN'")
            .await,
        1
    );
}

#[tokio::test]
async fn test_fixed_coupon_larger_than_subtotal_clamps_total_at_zero() {
    let h = sqlite_harness().await;
    h.seed_product(1, 3_000, 5).await;
    h.seed_coupon("MEGA", "fixed", 5_000, 0, None).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 1, 3_000)]))
        .await;

    let mut req = request();
    req.coupon_code = Some("MEGA".to_string());

    let receipt = h.service.create_order(user_id, req).await.expect("checkout");
    assert_eq!(receipt.order.total, 0);
}

// ---------------------------------------------------------------------------
// Loyalty points
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_over_redemption_aborts_whole_checkout() {
    let h = sqlite_harness().await;
    h.seed_product(42, 10_000, 5).await;

    let user_id = Uuid::new_v4();
    h.seed_balance(user_id, 3).await;
    h.cart
        .insert_cart(active_cart(user_id, vec![item(42, 3, 10_000)]))
        .await;

    let mut req = request();
    req.use_loyalty_points = Some(5);

    match h.service.create_order(user_id, req).await {
        Err(CheckoutError::InsufficientPoints { requested, balance }) => {
            assert_eq!(requested, 5);
            assert_eq!(balance, 3);
        }
        other => panic!("expected InsufficientPoints, got {other:?}"),
    }

    // No order, no stock movement, no balance change.
    assert_eq!(h.count("SELECT COUNT(*) FROM orders").await, 0);
    assert_eq!(h.stock.available(42).await.expect("available"), 5);
    assert_eq!(h.loyalty.balance(user_id).await.expect("balance"), 3);
}

#[tokio::test]
async fn test_redeem_and_earn_in_one_checkout() {
    let h = sqlite_harness().await;
    h.seed_product(1, 10_000, 5).await;

    let user_id = Uuid::new_v4();
    h.seed_balance(user_id, 5).await;
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 3, 10_000)]))
        .await;

    let mut req = request();
    req.use_loyalty_points = Some(5);

    let receipt = h.service.create_order(user_id, req).await.expect("checkout");

    // 30,000 - 5 points * 1,000 = 25,000; earn floor(25,000 / 10,000) = 2.
    assert_eq!(receipt.order.total, 25_000);
    assert_eq!(receipt.earned_points, 2);
    assert_eq!(h.loyalty.balance(user_id).await.expect("balance"), 2);

    assert_eq!(
        h.count("SELECT COUNT(*) FROM loyalty_points_transactions WHERE kind = 'redeem'")
            .await,
        1
    );
    assert_eq!(
        h.count("SELECT COUNT(*) FROM loyalty_points_transactions WHERE kind = 'earn'")
            .await,
        1
    );
}

// ---------------------------------------------------------------------------
// Cart completion and double checkout
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_cart_completion_is_idempotent() {
    let h = sqlite_harness().await;
    h.seed_product(1, 100, 10).await;

    let user_id = Uuid::new_v4();
    let cart = active_cart(user_id, vec![item(1, 1, 100)]);
    let cart_id = cart.id;
    h.cart.insert_cart(cart).await;

    h.service
        .create_order(user_id, request())
        .await
        .expect("checkout");

    // Retrying the completion step is a no-op, not an error.
    let outcome = h.cart.complete(cart_id).await.expect("second complete");
    assert_eq!(outcome, CartOutcome::AlreadyCompleted);

    let cart = h.cart.cart(cart_id).await.expect("cart exists");
    assert_eq!(cart.status, CartStatus::Completed);
    assert!(cart.items.is_empty());
}

#[tokio::test]
async fn test_second_checkout_sees_nothing_to_check_out() {
    let h = sqlite_harness().await;
    h.seed_product(1, 100, 10).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 1, 100)]))
        .await;

    h.service
        .create_order(user_id, request())
        .await
        .expect("first checkout");

    match h.service.create_order(user_id, request()).await {
        Err(CheckoutError::EmptyCart) => {}
        other => panic!("expected EmptyCart, got {other:?}"),
    }

    assert_eq!(h.count("SELECT COUNT(*) FROM orders").await, 1);
    assert_eq!(h.stock.available(1).await.expect("available"), 9);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_concurrent_checkouts_oversell_nothing() {
    let h = sqlite_harness().await;
    h.seed_product(1, 100, 3).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let user_id = Uuid::new_v4();
        h.cart
            .insert_cart(active_cart(user_id, vec![item(1, 1, 100)]))
            .await;

        let service = h.service.clone();
        handles.push(tokio::spawn(async move {
            service.create_order(user_id, request()).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.expect("task") {
            Ok(_) => successes += 1,
            Err(CheckoutError::InsufficientStock { .. }) => {}
            Err(other) => panic!("unexpected checkout error: {other:?}"),
        }
    }

    // Stock 3, eight single-unit checkouts: exactly three orders, stock
    // exactly zero, never negative.
    assert_eq!(successes, 3);
    assert_eq!(h.stock.available(1).await.expect("available"), 0);
    assert_eq!(h.count("SELECT COUNT(*) FROM orders").await, 3);
}

// ---------------------------------------------------------------------------
// Mock-backed harness for failure injection
// ---------------------------------------------------------------------------

struct MockHarness {
    cart: Arc<MockCartProvider>,
    stock: Arc<MockStockLedger>,
    coupons: Arc<MockCouponStore>,
    loyalty: Arc<MockLoyaltyLedger>,
    orders: Arc<MockOrderRepository>,
    service: CheckoutService,
}

fn mock_harness() -> MockHarness {
    let cart = Arc::new(MockCartProvider::new());
    let stock = Arc::new(MockStockLedger::new());
    let coupons = Arc::new(MockCouponStore::new());
    let loyalty = Arc::new(MockLoyaltyLedger::new());
    let orders = Arc::new(MockOrderRepository::new());

    let service = CheckoutService::new(
        cart.clone(),
        stock.clone(),
        coupons.clone(),
        loyalty.clone(),
        orders.clone(),
        RewardsConfig::default(),
    );

    MockHarness {
        cart,
        stock,
        coupons,
        loyalty,
        orders,
        service,
    }
}

fn percent_coupon(id: i64, code: &str, value: i64) -> Coupon {
    let now = chrono::Utc::now();
    Coupon {
        id,
        code: code.to_string(),
        discount_type: DiscountType::Percentage,
        discount_value: value,
        min_purchase_amount: 0,
        max_discount_amount: None,
        usage_limit: None,
        used_count: 0,
        valid_from: now - chrono::Duration::days(1),
        valid_until: now + chrono::Duration::days(1),
        is_active: true,
    }
}

#[tokio::test]
async fn test_coupon_usage_write_failure_is_not_fatal() {
    let h = mock_harness();
    h.stock.set_stock(1, 10).await;
    h.coupons.insert(percent_coupon(1, "TEN", 10)).await;
    h.coupons.set_fail_on_record_usage(true).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 1, 10_000)]))
        .await;

    let mut req = request();
    req.coupon_code = Some("TEN".to_string());

    let receipt = h
        .service
        .create_order(user_id, req)
        .await
        .expect("order survives bookkeeping failure");

    // Discount still applied; only the ledger write was lost.
    assert_eq!(receipt.order.total, 9_000);
    assert!(h.coupons.usages().await.is_empty());
    assert_eq!(h.orders.orders().await.len(), 1);
}

#[tokio::test]
async fn test_tracking_write_failure_is_not_fatal() {
    let h = mock_harness();
    h.stock.set_stock(1, 10).await;
    h.orders.set_fail_on_tracking(true).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 1, 10_000)]))
        .await;

    let receipt = h
        .service
        .create_order(user_id, request())
        .await
        .expect("order survives tracking failure");

    assert_eq!(receipt.order.total, 10_000);
    assert!(h.orders.tracking().await.is_empty());
    assert_eq!(h.orders.orders().await.len(), 1);
}

#[tokio::test]
async fn test_earn_failure_is_not_fatal() {
    let h = mock_harness();
    h.stock.set_stock(1, 10).await;
    h.loyalty.set_fail_on_earn(true).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 2, 10_000)]))
        .await;

    let receipt = h
        .service
        .create_order(user_id, request())
        .await
        .expect("order survives earn failure");

    assert_eq!(receipt.order.total, 20_000);
    assert_eq!(receipt.earned_points, 0);
    assert!(h.loyalty.transactions().await.is_empty());
}

#[tokio::test]
async fn test_redeem_failure_after_commit_is_not_fatal() {
    let h = mock_harness();
    h.stock.set_stock(1, 10).await;

    let user_id = Uuid::new_v4();
    // Balance passes the pre-write check; the post-commit debit fails.
    h.loyalty.set_balance(user_id, 10).await;
    h.loyalty.set_fail_on_redeem(true).await;

    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 3, 10_000)]))
        .await;

    let mut req = request();
    req.use_loyalty_points = Some(5);

    let receipt = h
        .service
        .create_order(user_id, req)
        .await
        .expect("order survives redeem failure");

    // The discount was already priced in; reconciliation owns the gap.
    assert_eq!(receipt.order.total, 25_000);
    assert_eq!(h.orders.orders().await.len(), 1);
}

#[tokio::test]
async fn test_cart_completion_failure_is_not_fatal() {
    let h = mock_harness();
    h.stock.set_stock(1, 10).await;
    h.cart.set_fail_on_complete(true).await;

    let user_id = Uuid::new_v4();
    let cart = active_cart(user_id, vec![item(1, 1, 10_000)]);
    let cart_id = cart.id;
    h.cart.insert_cart(cart).await;

    h.service
        .create_order(user_id, request())
        .await
        .expect("order survives cart-clear failure");

    // The cart is left stale-active; it is superseded on the next checkout.
    let cart = h.cart.cart(cart_id).await.expect("cart exists");
    assert_eq!(cart.status, CartStatus::Active);
    assert_eq!(h.orders.orders().await.len(), 1);
}

#[tokio::test]
async fn test_stale_stock_read_rolls_back_order() {
    let h = mock_harness();
    // Validation sees a stale 5; the authoritative quantity is 1.
    h.stock.set_stock(1, 1).await;
    h.stock.set_available_override(1, 5).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(user_id, vec![item(1, 3, 10_000)]))
        .await;

    match h.service.create_order(user_id, request()).await {
        Err(CheckoutError::InsufficientStock {
            product_id,
            requested,
            available,
        }) => {
            assert_eq!(product_id, 1);
            assert_eq!(requested, 3);
            assert_eq!(available, 1);
        }
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // The order written at step 7 was rolled back; stock untouched.
    assert!(h.orders.orders().await.is_empty());
    assert_eq!(h.stock.stock(1).await, Some(1));
}

#[tokio::test]
async fn test_lost_race_restores_earlier_decrements() {
    let h = mock_harness();
    h.stock.set_stock(1, 5).await;
    h.stock.set_stock(2, 1).await;
    // Product 2 looks plentiful during validation but is not.
    h.stock.set_available_override(2, 10).await;

    let user_id = Uuid::new_v4();
    h.cart
        .insert_cart(active_cart(
            user_id,
            vec![item(1, 2, 10_000), item(2, 2, 5_000)],
        ))
        .await;

    match h.service.create_order(user_id, request()).await {
        Err(CheckoutError::InsufficientStock { product_id, .. }) => assert_eq!(product_id, 2),
        other => panic!("expected InsufficientStock, got {other:?}"),
    }

    // Product 1's decrement was compensated, product 2 never moved.
    assert_eq!(h.stock.stock(1).await, Some(5));
    assert_eq!(h.stock.stock(2).await, Some(1));
    assert!(h.orders.orders().await.is_empty());
}
