use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the checkout core.
///
/// Every fallible operation returns one of these as a value; callers (the HTTP
/// layer, the admin surface) map them to user-facing messages. The core never
/// panics on malformed input.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CheckoutError {
    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    #[error("Coupon is inactive")]
    CouponInactive,

    #[error("Coupon has expired")]
    CouponExpired,

    #[error("Coupon is not active yet")]
    CouponNotYetStarted,

    #[error("Coupon has reached its usage limit")]
    CouponUsageExhausted,

    #[error("Eligible subtotal {eligible} is below the coupon minimum of {required}")]
    CouponBelowMinimum { required: i64, eligible: i64 },

    #[error("Cart is empty")]
    CartEmpty,

    #[error("Invalid quantity for item {variant_key}")]
    InvalidQuantity { variant_key: String },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Cannot transition order from '{from}' to '{to}'")]
    InvalidStatusTransition { from: String, to: String },

    #[error("Event error: {0}")]
    EventError(String),
}
