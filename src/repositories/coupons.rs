//! Coupon persistence boundary.
//!
//! The production deployment backs this trait with the document store; the
//! in-memory implementation here serves tests and single-process use. Either
//! way, `try_redeem` is the one place where redemption accounting is
//! arbitrated: the exhaustion check and the counter increment must be a
//! single atomic read-modify-write so two concurrent checkouts cannot both
//! succeed past the usage limit.

use async_trait::async_trait;
use dashmap::DashMap;

use crate::errors::CheckoutError;
use crate::models::coupon::Coupon;

#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Stores a new coupon; rejects duplicate codes.
    async fn insert(&self, coupon: Coupon) -> Result<(), CheckoutError>;

    /// Looks a coupon up by its case-sensitive code.
    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CheckoutError>;

    /// Atomically records one redemption, guarded by `used_count < usage_limit`.
    ///
    /// Returns the updated coupon, or `CouponUsageExhausted` when the guard
    /// fails. Never increments past the limit.
    async fn try_redeem(&self, code: &str) -> Result<Coupon, CheckoutError>;

    /// Marks a coupon inactive and returns the updated record.
    async fn deactivate(&self, code: &str) -> Result<Coupon, CheckoutError>;
}

/// In-memory repository keyed by coupon code.
///
/// `DashMap` entry access holds the shard lock for the duration of the
/// mutation, which gives `try_redeem` its required atomicity.
#[derive(Debug, Default)]
pub struct InMemoryCouponRepository {
    coupons: DashMap<String, Coupon>,
}

impl InMemoryCouponRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CouponRepository for InMemoryCouponRepository {
    async fn insert(&self, coupon: Coupon) -> Result<(), CheckoutError> {
        use dashmap::mapref::entry::Entry;
        match self.coupons.entry(coupon.code.clone()) {
            Entry::Occupied(_) => Err(CheckoutError::ValidationError(format!(
                "coupon code '{}' already exists",
                coupon.code
            ))),
            Entry::Vacant(slot) => {
                slot.insert(coupon);
                Ok(())
            }
        }
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, CheckoutError> {
        Ok(self.coupons.get(code).map(|entry| entry.value().clone()))
    }

    async fn try_redeem(&self, code: &str) -> Result<Coupon, CheckoutError> {
        let mut entry = self
            .coupons
            .get_mut(code)
            .ok_or_else(|| CheckoutError::CouponNotFound(code.to_string()))?;
        if entry.is_exhausted() {
            return Err(CheckoutError::CouponUsageExhausted);
        }
        entry.record_redemption();
        Ok(entry.value().clone())
    }

    async fn deactivate(&self, code: &str) -> Result<Coupon, CheckoutError> {
        let mut entry = self
            .coupons
            .get_mut(code)
            .ok_or_else(|| CheckoutError::CouponNotFound(code.to_string()))?;
        entry.deactivate();
        Ok(entry.value().clone())
    }
}
