//! Applicability resolver: decides which cart line items a validated coupon
//! discounts, and how the discount splits across them.
//!
//! All amounts are minor currency units. Per-item shares are floored and the
//! leftover units are assigned by largest fractional remainder, so the
//! breakdown always sums exactly to the applied discount.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::errors::CheckoutError;
use crate::models::cart::CartLineItem;
use crate::models::coupon::{Coupon, CouponScope, DiscountType};

/// Result of resolving a coupon against a cart.
#[derive(Clone, Debug, PartialEq)]
pub struct CouponApplication {
    pub coupon_id: Uuid,
    /// Per-item coupon discount, aligned index-for-index with the input
    /// items; zero for ineligible items.
    pub per_item: Vec<i64>,
    /// Sum of eligible items' floored post-product-discount contributions.
    pub eligible_subtotal: i64,
    /// Total discount; always equals the sum of `per_item`.
    pub discount_total: i64,
}

/// Resolves which items `coupon` applies to and each item's discount share.
///
/// Eligibility is computed per line item from the coupon scope. The minimum
/// order amount is enforced against the eligible subtotal, not the whole
/// cart.
pub fn resolve(coupon: &Coupon, items: &[CartLineItem]) -> Result<CouponApplication, CheckoutError> {
    let contributions: Vec<i64> = items.iter().map(CartLineItem::line_subtotal).collect();

    let eligible: Vec<bool> = items.iter().map(|item| is_eligible(coupon, item)).collect();
    let weights: Vec<i64> = contributions
        .iter()
        .zip(&eligible)
        .map(|(&c, &e)| if e { c } else { 0 })
        .collect();
    let eligible_subtotal: i64 = weights.iter().sum();

    if eligible_subtotal < coupon.min_order_amount {
        return Err(CheckoutError::CouponBelowMinimum {
            required: coupon.min_order_amount,
            eligible: eligible_subtotal,
        });
    }

    let per_item = match coupon.discount_type {
        DiscountType::Fixed => {
            let value = coupon.discount_value.floor().to_i64().unwrap_or(0).max(0);
            // A fixed coupon never discounts more than the items it covers.
            let target = value.min(eligible_subtotal);
            distribute_proportional(target, &weights)
        }
        DiscountType::Percent => {
            let raw: Vec<i64> = weights
                .iter()
                .map(|&w| percent_of(w, coupon.discount_value))
                .collect();
            let raw_total: i64 = raw.iter().sum();
            match coupon.max_discount_amount {
                Some(cap) if raw_total > cap => distribute_proportional(cap, &weights),
                _ => raw,
            }
        }
    };

    let discount_total = per_item.iter().sum();
    Ok(CouponApplication {
        coupon_id: coupon.id,
        per_item,
        eligible_subtotal,
        discount_total,
    })
}

fn is_eligible(coupon: &Coupon, item: &CartLineItem) -> bool {
    match &coupon.scope {
        CouponScope::Cart => true,
        CouponScope::Products(ids) => ids.contains(&item.product_id),
        CouponScope::Categories(ids) => item
            .category_id
            .as_ref()
            .is_some_and(|category| ids.contains(category)),
    }
}

/// `floor(amount * percent / 100)` in minor units.
fn percent_of(amount: i64, percent: Decimal) -> i64 {
    (Decimal::from(amount) * percent / Decimal::ONE_HUNDRED)
        .floor()
        .to_i64()
        .unwrap_or(0)
}

/// Splits `total` across `weights` proportionally.
///
/// Shares are floored; leftover units go to the largest fractional
/// remainders (ties broken by index), so the shares sum exactly to `total`.
/// Zero-weight entries never receive a share.
fn distribute_proportional(total: i64, weights: &[i64]) -> Vec<i64> {
    let weight_sum: i128 = weights.iter().map(|&w| w as i128).sum();
    if weight_sum == 0 || total <= 0 {
        return vec![0; weights.len()];
    }

    let mut shares = Vec::with_capacity(weights.len());
    let mut remainders: Vec<(usize, i128)> = Vec::with_capacity(weights.len());
    let mut allocated: i64 = 0;
    for (index, &weight) in weights.iter().enumerate() {
        let numerator = total as i128 * weight as i128;
        let share = (numerator / weight_sum) as i64;
        shares.push(share);
        allocated += share;
        if weight > 0 {
            remainders.push((index, numerator % weight_sum));
        }
    }

    let mut leftover = total - allocated;
    remainders.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    for (index, _) in remainders {
        if leftover == 0 {
            break;
        }
        shares[index] += 1;
        leftover -= 1;
    }
    shares
}
