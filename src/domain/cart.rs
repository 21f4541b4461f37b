//! Cart types as served by the cart service.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a shopping cart.
///
/// At most one `Active` cart exists per user. A cart becomes `Completed`
/// when an order is created from it, or `Abandoned` when cleared without
/// an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    Active,
    Completed,
    Abandoned,
}

/// One product/quantity/price triple within a cart.
///
/// `price` is the unit price captured when the item was added. It does not
/// track later catalog price changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product_id: i64,
    pub quantity: i64,
    pub price: i64,
}

/// A user's shopping cart with its priced line items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: CartStatus,
    pub items: Vec<CartItem>,
}

impl Cart {
    /// Sum of `quantity * price` over all line items.
    pub fn subtotal(&self) -> i64 {
        self.items.iter().map(|i| i.quantity * i.price).sum()
    }
}
