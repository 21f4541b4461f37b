//! Coupon definitions and evaluation rules.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a coupon's `discount_value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// `discount_value` is a percentage of the subtotal.
    Percentage,
    /// `discount_value` is a flat amount in currency units.
    Fixed,
}

impl DiscountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountType::Percentage => "percentage",
            DiscountType::Fixed => "fixed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "percentage" => Some(DiscountType::Percentage),
            "fixed" => Some(DiscountType::Fixed),
            _ => None,
        }
    }
}

/// Why a coupon could not be applied to a checkout.
///
/// Rejections are surfaced to the caller as warnings; they never abort the
/// order itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case", tag = "reason")]
pub enum CouponRejection {
    #[error("coupon code is invalid")]
    Invalid,

    #[error("coupon is not yet active")]
    NotYetActive,

    #[error("coupon has expired")]
    Expired,

    #[error("coupon usage limit has been reached")]
    Exhausted,

    #[error("order subtotal is below the coupon minimum of {minimum}")]
    BelowMinimum { minimum: i64 },
}

/// A coupon row as stored by the coupon component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: i64,
    pub code: String,
    pub discount_type: DiscountType,
    pub discount_value: i64,
    pub min_purchase_amount: i64,
    pub max_discount_amount: Option<i64>,
    pub usage_limit: Option<i64>,
    pub used_count: i64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    pub is_active: bool,
}

impl Coupon {
    /// Evaluate this coupon against a pre-discount subtotal.
    ///
    /// Checks run in a fixed order: active flag, validity window, usage
    /// limit, minimum purchase. Percentage discounts are capped at
    /// `max_discount_amount` when set; fixed discounts are returned as-is
    /// and may exceed the subtotal (the orchestrator clamps the final
    /// total at zero).
    pub fn evaluate(&self, subtotal: i64, now: DateTime<Utc>) -> Result<i64, CouponRejection> {
        if !self.is_active {
            return Err(CouponRejection::Invalid);
        }
        if now < self.valid_from {
            return Err(CouponRejection::NotYetActive);
        }
        if now > self.valid_until {
            return Err(CouponRejection::Expired);
        }
        if let Some(limit) = self.usage_limit {
            if self.used_count >= limit {
                return Err(CouponRejection::Exhausted);
            }
        }
        if subtotal < self.min_purchase_amount {
            return Err(CouponRejection::BelowMinimum {
                minimum: self.min_purchase_amount,
            });
        }

        let discount = match self.discount_type {
            DiscountType::Percentage => {
                let raw = subtotal * self.discount_value / 100;
                match self.max_discount_amount {
                    Some(cap) => raw.min(cap),
                    None => raw,
                }
            }
            DiscountType::Fixed => self.discount_value,
        };

        Ok(discount)
    }
}
