//! Domain model for the storefront.
//!
//! Plain data types shared across the checkout workflow, plus the pure
//! business rules that don't need I/O (coupon evaluation, loyalty
//! point conversion).

mod cart;
mod coupon;
mod loyalty;
mod order;

pub use cart::{Cart, CartItem, CartStatus};
pub use coupon::{Coupon, CouponRejection, DiscountType};
pub use loyalty::{LoyaltyAccount, LoyaltyTransactionKind};
pub use order::{NewOrder, Order, OrderItem, OrderStatus};
