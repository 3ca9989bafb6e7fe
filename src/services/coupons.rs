use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use uuid::Uuid;
use validator::Validate;

use crate::errors::CheckoutError;
use crate::events::{Event, EventSender};
use crate::models::coupon::{Coupon, CouponScope, CouponStatus, CouponValidity, DiscountType};
use crate::repositories::coupons::CouponRepository;

/// Admin payload for creating a coupon.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCoupon {
    #[validate(length(min = 1, max = 64))]
    pub code: String,

    pub description: Option<String>,

    pub discount_type: DiscountType,

    pub discount_value: Decimal,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub min_order_amount: i64,

    pub max_discount_amount: Option<i64>,

    pub usage_limit: Option<u32>,

    pub start_date: DateTime<Utc>,

    pub end_date: DateTime<Utc>,

    #[serde(default)]
    pub scope: CouponScope,
}

impl CreateCoupon {
    fn validate_rules(&self) -> Result<(), CheckoutError> {
        if self.start_date >= self.end_date {
            error!("Coupon start date must be before end date");
            return Err(CheckoutError::ValidationError(
                "Coupon start date must be before end date".to_string(),
            ));
        }
        if self.discount_value < Decimal::ZERO {
            return Err(CheckoutError::ValidationError(
                "Discount value must be non-negative".to_string(),
            ));
        }
        if self.discount_type == DiscountType::Percent
            && self.discount_value > Decimal::ONE_HUNDRED
        {
            return Err(CheckoutError::ValidationError(
                "Percent discount must not exceed 100".to_string(),
            ));
        }
        if self.max_discount_amount.is_some_and(|cap| cap < 0) {
            return Err(CheckoutError::ValidationError(
                "Maximum discount amount must be non-negative".to_string(),
            ));
        }
        if self.usage_limit.is_some_and(|limit| limit == 0) {
            return Err(CheckoutError::ValidationError(
                "Usage limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    fn into_coupon(self) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4(),
            code: self.code,
            description: self.description,
            discount_type: self.discount_type,
            discount_value: self.discount_value,
            min_order_amount: self.min_order_amount,
            max_discount_amount: self.max_discount_amount,
            start_date: self.start_date,
            end_date: self.end_date,
            usage_limit: self.usage_limit,
            used_count: 0,
            scope: self.scope,
            status: CouponStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Coupon lifecycle: admin creation and deactivation, lookup with validity
/// classification, and redemption accounting.
#[derive(Clone)]
pub struct CouponService {
    repo: Arc<dyn CouponRepository>,
    events: EventSender,
}

impl CouponService {
    pub fn new(repo: Arc<dyn CouponRepository>, events: EventSender) -> Self {
        Self { repo, events }
    }

    /// Creates a coupon from a validated admin payload.
    #[instrument(skip(self, payload), fields(code = %payload.code))]
    pub async fn create_coupon(&self, payload: CreateCoupon) -> Result<Coupon, CheckoutError> {
        payload
            .validate()
            .map_err(|e| CheckoutError::ValidationError(e.to_string()))?;
        payload.validate_rules()?;

        let coupon = payload.into_coupon();
        self.repo.insert(coupon.clone()).await?;
        info!(coupon_id = %coupon.id, "coupon created");

        self.events
            .send(Event::CouponCreated(coupon.id))
            .await
            .map_err(CheckoutError::EventError)?;

        Ok(coupon)
    }

    /// Classifies the coupon behind `code` against `now`.
    ///
    /// An unknown code is `CouponNotFound`; any known coupon classifies
    /// without error, including non-redeemable ones.
    #[instrument(skip(self))]
    pub async fn evaluate_coupon(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<CouponValidity, CheckoutError> {
        let coupon = self.require_coupon(code).await?;
        Ok(coupon.validity(now))
    }

    /// Fetches the coupon behind `code`, rejecting any that is not `Valid`.
    pub async fn validated_coupon(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Coupon, CheckoutError> {
        let coupon = self.require_coupon(code).await?;
        match coupon.validity(now).into_error() {
            Some(err) => {
                warn!(code, %err, "coupon rejected");
                Err(err)
            }
            None => Ok(coupon),
        }
    }

    /// Records one redemption against the backing store (call after a
    /// successful order; at most once per order).
    #[instrument(skip(self))]
    pub async fn redeem(&self, code: &str) -> Result<Coupon, CheckoutError> {
        let coupon = self.repo.try_redeem(code).await?;
        info!(coupon_id = %coupon.id, used_count = coupon.used_count, "coupon redeemed");

        self.events
            .send(Event::CouponRedeemed {
                coupon_id: coupon.id,
                code: coupon.code.clone(),
                remaining_uses: coupon.remaining_uses(),
            })
            .await
            .map_err(CheckoutError::EventError)?;

        Ok(coupon)
    }

    /// Admin deactivation; the coupon stays on record but stops validating.
    #[instrument(skip(self))]
    pub async fn deactivate_coupon(&self, code: &str) -> Result<Coupon, CheckoutError> {
        let coupon = self.repo.deactivate(code).await?;
        info!(coupon_id = %coupon.id, "coupon deactivated");

        self.events
            .send(Event::CouponDeactivated(coupon.id))
            .await
            .map_err(CheckoutError::EventError)?;

        Ok(coupon)
    }

    async fn require_coupon(&self, code: &str) -> Result<Coupon, CheckoutError> {
        self.repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| CheckoutError::CouponNotFound(code.to_string()))
    }
}
