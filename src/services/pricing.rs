//! Order total calculator.
//!
//! Combines per-item prices, product-level discount percentages, a shipping
//! fee, and an optional coupon into a final total with an itemized breakdown.
//! A pure, deterministic function of its inputs; redemption side effects
//! belong to the order service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::CheckoutError;
use crate::models::cart::CartLineItem;
use crate::models::coupon::Coupon;
use crate::models::order::ShippingMethod;
use crate::services::discounts;
use crate::services::shipping::ShippingRates;

/// Per-item slice of the computed totals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemBreakdown {
    pub variant_key: String,
    /// Floored post-product-discount contribution to the subtotal.
    pub line_subtotal: i64,
    /// This item's share of the coupon discount.
    pub coupon_discount: i64,
}

/// The validated totals for a checkout.
///
/// Invariant: `total_price = subtotal - discount_amount + shipping_fee`,
/// clamped at zero, and `discount_amount` equals the sum of the per-item
/// coupon discounts.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: i64,
    pub discount_amount: i64,
    pub shipping_fee: i64,
    pub total_price: i64,
    pub items: Vec<ItemBreakdown>,
}

/// Computes order totals from a cart snapshot, an optional coupon, and a
/// shipping method.
#[derive(Clone, Debug, Default)]
pub struct PricingService {
    rates: ShippingRates,
}

impl PricingService {
    pub fn new(rates: ShippingRates) -> Self {
        Self { rates }
    }

    /// Produces the itemized totals, or the first applicable rejection.
    ///
    /// Rejections surface in input order: an empty cart, an invalid
    /// quantity, then coupon validity and applicability. Identical inputs
    /// always produce identical output; nothing is mutated.
    pub fn compute_order_total(
        &self,
        items: &[CartLineItem],
        coupon: Option<&Coupon>,
        shipping_method: ShippingMethod,
        now: DateTime<Utc>,
    ) -> Result<OrderTotals, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::CartEmpty);
        }
        if let Some(item) = items.iter().find(|item| item.quantity < 1) {
            return Err(CheckoutError::InvalidQuantity {
                variant_key: item.variant_key.clone(),
            });
        }

        let per_item_discounts = match coupon {
            Some(coupon) => {
                if let Some(err) = coupon.validity(now).into_error() {
                    return Err(err);
                }
                discounts::resolve(coupon, items)?.per_item
            }
            None => vec![0; items.len()],
        };

        let breakdown: Vec<ItemBreakdown> = items
            .iter()
            .zip(&per_item_discounts)
            .map(|(item, &coupon_discount)| ItemBreakdown {
                variant_key: item.variant_key.clone(),
                line_subtotal: item.line_subtotal(),
                coupon_discount,
            })
            .collect();

        let subtotal: i64 = breakdown.iter().map(|b| b.line_subtotal).sum();
        let discount_amount: i64 = breakdown.iter().map(|b| b.coupon_discount).sum();
        let shipping_fee = self.rates.quote(shipping_method);

        let raw_total = subtotal - discount_amount + shipping_fee;
        if raw_total < 0 {
            // Discount capping in the resolver keeps this unreachable; a
            // negative total here means an upstream invariant broke.
            warn!(
                subtotal,
                discount_amount, shipping_fee, "order total underflow, clamping to zero"
            );
        }
        let total_price = raw_total.max(0);

        Ok(OrderTotals {
            subtotal,
            discount_amount,
            shipping_fee,
            total_price,
            items: breakdown,
        })
    }
}
