//! Order-creation orchestration.
//!
//! Turns a user's active cart into a persisted order: validates every
//! line item against stock, applies an optional coupon and loyalty
//! redemption, writes the order, decrements stock, records bookkeeping,
//! and clears the cart.
//!
//! There is no transaction coordinator spanning these writes: cart data
//! lives behind a network hop and the remaining tables are written in
//! separate statements. The order row is the source of truth. Everything
//! before it is strict and leaves no state on failure; everything after
//! it is best-effort convergence toward the order, logged when it fails
//! but never surfaced as a checkout failure. The two exceptions are the
//! stock decrement and the order/items write themselves: stock must
//! never go negative and the order must match its recorded total, so a
//! lost decrement race rolls the order back.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::RewardsConfig;
use crate::domain::{
    Cart, CartStatus, CouponRejection, NewOrder, Order, OrderItem, OrderStatus,
};
use crate::interfaces::{
    CartError, CartProvider, CouponStore, LoyaltyError, LoyaltyLedger, OrderRepository,
    StockError, StockLedger, StorageError,
};

/// Result type for checkout operations.
pub type Result<T> = std::result::Result<T, CheckoutError>;

/// Errors that abort a checkout.
///
/// Every variant except `Stock`/`Storage`/`Cart`/`Loyalty` infrastructure
/// failures is produced before any write, so rejecting the request leaves
/// all state untouched. `InsufficientStock` is the one error that can also
/// surface after the order was written; in that case the order has already
/// been rolled back by the time the error is returned.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("no active cart with items to check out")]
    EmptyCart,

    #[error("cart item for product {product_id} has a missing or non-positive price")]
    Pricing { product_id: i64 },

    #[error("product {product_id} no longer exists")]
    ProductNotFound { product_id: i64 },

    #[error("insufficient stock for product {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("order subtotal must be positive, got {subtotal}")]
    InvalidTotal { subtotal: i64 },

    #[error("insufficient loyalty points: requested {requested}, balance {balance}")]
    InsufficientPoints { requested: i64, balance: i64 },

    #[error("cart service error: {0}")]
    Cart(CartError),

    #[error("stock ledger error: {0}")]
    Stock(StockError),

    #[error("loyalty ledger error: {0}")]
    Loyalty(LoyaltyError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// A checkout request, as posted by the storefront client.
///
/// Coupon code and loyalty points are explicit optionals; absent means
/// "not requested".
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderRequest {
    pub shipping_address: String,
    pub shipping_phone: String,
    pub payment_method: String,
    #[serde(default)]
    pub coupon_code: Option<String>,
    #[serde(default)]
    pub use_loyalty_points: Option<i64>,
}

/// Non-fatal conditions surfaced alongside a successful checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutWarning {
    /// The requested coupon could not be applied; the order was created
    /// without the discount.
    CouponRejected {
        code: String,
        reason: CouponRejection,
    },
}

/// A successful checkout: the created order plus side-channel results.
#[derive(Debug, Clone, Serialize)]
pub struct CheckoutReceipt {
    pub order: Order,
    /// Points credited for this purchase (zero if the earn step failed or
    /// the total was too small).
    pub earned_points: i64,
    pub warnings: Vec<CheckoutWarning>,
}

/// A coupon that passed evaluation, held until its usage is recorded.
struct AppliedCoupon {
    id: i64,
    code: String,
    discount: i64,
}

/// The order-creation orchestrator.
///
/// One instance serves all checkouts; each call runs as a single
/// sequential workflow with no internal parallelism. Collaborators are
/// injected as trait objects so tests can swap in mocks and the cart
/// service can be reached over HTTP in production.
pub struct CheckoutService {
    cart: Arc<dyn CartProvider>,
    stock: Arc<dyn StockLedger>,
    coupons: Arc<dyn CouponStore>,
    loyalty: Arc<dyn LoyaltyLedger>,
    orders: Arc<dyn OrderRepository>,
    rewards: RewardsConfig,
}

impl CheckoutService {
    /// Create a new checkout service.
    pub fn new(
        cart: Arc<dyn CartProvider>,
        stock: Arc<dyn StockLedger>,
        coupons: Arc<dyn CouponStore>,
        loyalty: Arc<dyn LoyaltyLedger>,
        orders: Arc<dyn OrderRepository>,
        rewards: RewardsConfig,
    ) -> Self {
        Self {
            cart,
            stock,
            coupons,
            loyalty,
            orders,
            rewards,
        }
    }

    /// Create an order from the user's active cart.
    pub async fn create_order(
        &self,
        user_id: Uuid,
        request: CreateOrderRequest,
    ) -> Result<CheckoutReceipt> {
        if request.shipping_address.trim().is_empty() {
            return Err(CheckoutError::Validation(
                "shipping address is required".to_string(),
            ));
        }

        // 1. Fetch the active cart. An already-completed or missing cart is
        // "nothing to check out", which also covers the second of two
        // racing checkouts from the same user.
        let cart = match self.cart.active_cart(user_id).await {
            Ok(cart) => cart,
            Err(CartError::NotFound) => return Err(CheckoutError::EmptyCart),
            Err(e) => return Err(CheckoutError::Cart(e)),
        };

        if cart.status != CartStatus::Active || cart.items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }

        // 2. Per-item integrity checks, all before any write.
        self.validate_items(&cart).await?;

        // 3. Subtotal over the validated items.
        let subtotal = cart.subtotal();
        if subtotal <= 0 {
            return Err(CheckoutError::InvalidTotal { subtotal });
        }

        // 4. Optional coupon. Rejection is non-fatal: the order proceeds
        // undiscounted and the reason travels back as a warning.
        let mut warnings = Vec::new();
        let applied_coupon = match &request.coupon_code {
            Some(code) => self.evaluate_coupon(code, subtotal, &mut warnings).await?,
            None => None,
        };
        let coupon_discount = applied_coupon.as_ref().map(|c| c.discount).unwrap_or(0);

        // 5. Optional loyalty redemption. Unlike a coupon, the user asked
        // to pay less with points they may not have; proceeding silently
        // would charge them more than they agreed to, so this is fatal.
        let redeem_points = request.use_loyalty_points.unwrap_or(0);
        let loyalty_discount = if redeem_points > 0 {
            let balance = self
                .loyalty
                .balance(user_id)
                .await
                .map_err(CheckoutError::Loyalty)?;
            if balance < redeem_points {
                return Err(CheckoutError::InsufficientPoints {
                    requested: redeem_points,
                    balance,
                });
            }
            self.rewards.discount_for_points(redeem_points)
        } else {
            0
        };

        // 6. Final payable amount, clamped at zero (a fixed coupon may
        // exceed the subtotal).
        let total = (subtotal - coupon_discount - loyalty_discount).max(0);

        // 7-8. Persist the order header and items. From here on the order
        // exists and is what every later step reconciles against.
        let items: Vec<OrderItem> = cart
            .items
            .iter()
            .map(|i| OrderItem {
                product_id: i.product_id,
                quantity: i.quantity,
                price: i.price,
            })
            .collect();

        let order = self
            .orders
            .create(NewOrder {
                user_id,
                total,
                shipping_address: request.shipping_address.clone(),
                shipping_phone: request.shipping_phone.clone(),
                payment_method: request.payment_method.clone(),
                items,
            })
            .await?;

        info!(
            order_id = %order.id,
            user_id = %user_id,
            total,
            subtotal,
            coupon_discount,
            loyalty_discount,
            "order created"
        );

        // 9. Decrement stock. The conditional write is authoritative: a
        // checkout that passed validation can still lose the race here,
        // in which case the order is rolled back.
        self.decrement_stock(&cart, &order).await?;

        // 10-14. Best-effort bookkeeping against the committed order.
        if let Some(coupon) = applied_coupon {
            self.record_coupon_usage(&coupon, user_id, order.id).await;
        }

        if let Err(e) = self.orders.add_tracking(order.id, OrderStatus::Pending).await {
            warn!(order_id = %order.id, error = %e, "failed to write tracking entry");
        }

        if redeem_points > 0 {
            if let Err(e) = self.loyalty.redeem(user_id, redeem_points, order.id).await {
                error!(
                    order_id = %order.id,
                    user_id = %user_id,
                    points = redeem_points,
                    error = %e,
                    "failed to redeem loyalty points after order commit"
                );
            }
        }

        let earned_points = match self.loyalty.earn(user_id, order.id, total).await {
            Ok(points) => points,
            Err(e) => {
                warn!(order_id = %order.id, user_id = %user_id, error = %e, "failed to earn loyalty points");
                0
            }
        };

        if let Err(e) = self.cart.complete(cart.id).await {
            // A stale active cart is acceptable; it is reused or superseded
            // on the next checkout.
            warn!(order_id = %order.id, cart_id = %cart.id, error = %e, "failed to complete cart");
        }

        Ok(CheckoutReceipt {
            order,
            earned_points,
            warnings,
        })
    }

    /// Step 2: price, existence, and stock checks for every line item.
    async fn validate_items(&self, cart: &Cart) -> Result<()> {
        for item in &cart.items {
            // A missing or non-positive snapshot price is a data-integrity
            // fault in the cart, not a user error.
            if item.price <= 0 {
                return Err(CheckoutError::Pricing {
                    product_id: item.product_id,
                });
            }

            let available = match self.stock.available(item.product_id).await {
                Ok(available) => available,
                Err(StockError::NotFound { product_id }) => {
                    return Err(CheckoutError::ProductNotFound { product_id })
                }
                Err(e) => return Err(CheckoutError::Stock(e)),
            };

            if item.quantity > available {
                return Err(CheckoutError::InsufficientStock {
                    product_id: item.product_id,
                    requested: item.quantity,
                    available,
                });
            }
        }

        Ok(())
    }

    /// Step 4: look up and evaluate the coupon code.
    async fn evaluate_coupon(
        &self,
        code: &str,
        subtotal: i64,
        warnings: &mut Vec<CheckoutWarning>,
    ) -> Result<Option<AppliedCoupon>> {
        let rejection = match self.coupons.find_by_code(code).await? {
            None => CouponRejection::Invalid,
            Some(coupon) => match coupon.evaluate(subtotal, chrono::Utc::now()) {
                Ok(discount) => {
                    return Ok(Some(AppliedCoupon {
                        id: coupon.id,
                        code: coupon.code,
                        discount,
                    }))
                }
                Err(rejection) => rejection,
            },
        };

        warn!(code = %code, reason = %rejection, "coupon rejected, proceeding without discount");
        warnings.push(CheckoutWarning::CouponRejected {
            code: code.to_string(),
            reason: rejection,
        });

        Ok(None)
    }

    /// Step 9: conditional decrements, with rollback on a lost race.
    async fn decrement_stock(&self, cart: &Cart, order: &Order) -> Result<()> {
        let mut decremented: Vec<(i64, i64)> = Vec::with_capacity(cart.items.len());

        for item in &cart.items {
            match self.stock.decrement(item.product_id, item.quantity).await {
                Ok(()) => decremented.push((item.product_id, item.quantity)),
                Err(e) => {
                    warn!(
                        order_id = %order.id,
                        product_id = item.product_id,
                        error = %e,
                        "stock decrement failed after order commit, rolling back order"
                    );
                    self.unwind_order(order, &decremented).await;

                    return Err(match e {
                        StockError::Insufficient {
                            product_id,
                            requested,
                            available,
                        } => CheckoutError::InsufficientStock {
                            product_id,
                            requested,
                            available,
                        },
                        StockError::NotFound { product_id } => {
                            CheckoutError::ProductNotFound { product_id }
                        }
                        other => CheckoutError::Stock(other),
                    });
                }
            }
        }

        Ok(())
    }

    /// Undo a partially-applied checkout: credit back any stock already
    /// taken, then remove the order and its items.
    async fn unwind_order(&self, order: &Order, decremented: &[(i64, i64)]) {
        for (product_id, quantity) in decremented {
            if let Err(e) = self.stock.restock(*product_id, *quantity).await {
                error!(
                    order_id = %order.id,
                    product_id,
                    quantity,
                    error = %e,
                    "failed to restore stock while rolling back order"
                );
            }
        }

        if let Err(e) = self.orders.delete(order.id).await {
            error!(order_id = %order.id, error = %e, "failed to delete order during rollback");
        }
    }

    /// Step 10: record the applied coupon against the order.
    async fn record_coupon_usage(&self, coupon: &AppliedCoupon, user_id: Uuid, order_id: Uuid) {
        if let Err(e) = self
            .coupons
            .record_usage(coupon.id, user_id, order_id)
            .await
        {
            warn!(
                order_id = %order_id,
                code = %coupon.code,
                error = %e,
                "failed to record coupon usage"
            );
        }
    }
}
