//! Abstract interfaces for storefront components.
//!
//! These traits define the contracts the checkout orchestrator consumes:
//! - Cart access (fetch/complete, reached over the network)
//! - Stock ledger (read and conditionally decrement product stock)
//! - Coupon lookup and usage recording
//! - Loyalty point balance, redemption, and earning
//! - Order persistence

pub mod cart_provider;
pub mod coupon_store;
pub mod loyalty_ledger;
pub mod order_repository;
pub mod stock_ledger;

pub use cart_provider::{CartError, CartOutcome, CartProvider};
pub use coupon_store::CouponStore;
pub use loyalty_ledger::{LoyaltyError, LoyaltyLedger};
pub use order_repository::{OrderRepository, StorageError};
pub use stock_ledger::{StockError, StockLedger};
