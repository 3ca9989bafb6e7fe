use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Enum representing the kind of discount a coupon grants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum DiscountType {
    /// Percentage off the eligible subtotal, constrained to [0, 100].
    Percent,
    /// Fixed amount off, in minor currency units.
    Fixed,
}

/// Enum representing the possible statuses of a coupon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum CouponStatus {
    Active,
    Inactive,
}

/// Which line items a coupon's discount applies to.
///
/// `Cart` is the default and applies the discount against the whole cart
/// subtotal. Scoped variants restrict eligibility per line item.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CouponScope {
    #[default]
    Cart,
    Products(HashSet<String>),
    Categories(HashSet<String>),
}

/// Classification of a coupon against a clock instant.
///
/// When several rejection reasons hold simultaneously, `validity` reports the
/// highest-precedence one: inactive > usage-exhausted > not-yet-started >
/// expired. This keeps error messaging deterministic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum CouponValidity {
    Valid,
    Inactive,
    UsageExhausted,
    NotYetStarted,
    Expired,
}

/// A discount code with an eligibility window, usage cap, and discount rule.
///
/// Coupons are created by an admin action, mutated only by redemption (which
/// increments `used_count` and may flip `status`) and by deactivation. They
/// are never deleted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    /// Unique identifier for the coupon.
    pub id: Uuid,

    /// Unique, case-sensitive redemption code.
    pub code: String,

    /// Optional admin-facing description.
    pub description: Option<String>,

    /// Kind of discount this coupon grants.
    pub discount_type: DiscountType,

    /// Percentage in [0, 100] for `Percent`, minor currency units for `Fixed`.
    pub discount_value: Decimal,

    /// Minimum eligible subtotal (pre-coupon) required to apply, default 0.
    pub min_order_amount: i64,

    /// Absolute cap on the discount when `discount_type` is `Percent`.
    pub max_discount_amount: Option<i64>,

    /// Start of the validity window.
    pub start_date: DateTime<Utc>,

    /// End of the validity window; always after `start_date`.
    pub end_date: DateTime<Utc>,

    /// Maximum number of redemptions; `None` means unbounded.
    pub usage_limit: Option<u32>,

    /// Number of successful redemptions so far.
    pub used_count: u32,

    /// Line items the discount applies to.
    pub scope: CouponScope,

    /// Current status. Flips to `Inactive` automatically once the usage
    /// limit is reached; otherwise settable by an administrator.
    pub status: CouponStatus,

    /// Timestamp when the coupon was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp when the coupon was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Classifies this coupon against `now`.
    ///
    /// Purely a classification; no side effects. `Valid` requires the status
    /// to be `Active`, `now` to fall within the validity window, and the
    /// usage limit not to be exhausted.
    pub fn validity(&self, now: DateTime<Utc>) -> CouponValidity {
        if self.status != CouponStatus::Active {
            return CouponValidity::Inactive;
        }
        if self.is_exhausted() {
            return CouponValidity::UsageExhausted;
        }
        if now < self.start_date {
            return CouponValidity::NotYetStarted;
        }
        if now > self.end_date {
            return CouponValidity::Expired;
        }
        CouponValidity::Valid
    }

    /// Returns true once `used_count` has reached the usage limit.
    pub fn is_exhausted(&self) -> bool {
        self.usage_limit
            .is_some_and(|limit| self.used_count >= limit)
    }

    /// Redemptions left before exhaustion; `None` when unbounded.
    pub fn remaining_uses(&self) -> Option<u32> {
        self.usage_limit
            .map(|limit| limit.saturating_sub(self.used_count))
    }

    /// Records one successful redemption.
    ///
    /// Increments `used_count` and flips the status to `Inactive` when the
    /// usage limit is reached. Callers must guard the exhaustion check and
    /// this mutation as a single atomic step against the backing store.
    pub fn record_redemption(&mut self) {
        self.used_count += 1;
        if self.is_exhausted() {
            self.status = CouponStatus::Inactive;
        }
        self.updated_at = Utc::now();
    }

    /// Marks the coupon inactive.
    pub fn deactivate(&mut self) {
        self.status = CouponStatus::Inactive;
        self.updated_at = Utc::now();
    }
}

impl CouponValidity {
    /// Maps a non-valid classification to its rejection error.
    pub fn into_error(self) -> Option<crate::errors::CheckoutError> {
        use crate::errors::CheckoutError;
        match self {
            CouponValidity::Valid => None,
            CouponValidity::Inactive => Some(CheckoutError::CouponInactive),
            CouponValidity::UsageExhausted => Some(CheckoutError::CouponUsageExhausted),
            CouponValidity::NotYetStarted => Some(CheckoutError::CouponNotYetStarted),
            CouponValidity::Expired => Some(CheckoutError::CouponExpired),
        }
    }
}
