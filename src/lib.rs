//! Agora - retail storefront backend.
//!
//! The storefront is split into loosely-coupled services that share one
//! relational database. This crate implements the order service's
//! checkout workflow: turning a user's active cart (owned by the cart
//! service, reached over HTTP) into a persisted order, with stock
//! validation, coupon and loyalty-point discounts, and best-effort
//! bookkeeping around the committed order.

pub mod checkout;
pub mod clients;
pub mod config;
pub mod domain;
pub mod interfaces;
pub mod storage;
pub mod utils;
