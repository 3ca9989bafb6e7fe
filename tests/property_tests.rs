//! Property-based tests for the checkout core.
//!
//! These verify the calculator and resolver invariants across a wide range
//! of inputs, catching edge cases unit tests might miss.

use chrono::{Duration, Utc};
use proptest::prelude::*;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use uuid::Uuid;

use checkout_core::{
    CartLineItem, Coupon, CouponScope, CouponStatus, CouponValidity, DiscountType, PricingService,
    ShippingMethod, ShippingRates,
};

// Strategies for generating test data

fn item_strategy() -> impl Strategy<Value = CartLineItem> {
    ("[A-Z]{3}-[0-9]{2}", 0i64..10_000_000, 0u32..=100, 1u32..5).prop_map(
        |(sku, price, discount, qty)| {
            CartLineItem::new(sku, "M", "black", None, price, Decimal::from(discount), qty)
                .unwrap()
        },
    )
}

fn cart_strategy() -> impl Strategy<Value = Vec<CartLineItem>> {
    prop::collection::vec(item_strategy(), 1..8)
}

fn base_coupon(discount_type: DiscountType, value: Decimal) -> Coupon {
    let now = Utc::now();
    Coupon {
        id: Uuid::new_v4(),
        code: "PROP".to_string(),
        description: None,
        discount_type,
        discount_value: value,
        min_order_amount: 0,
        max_discount_amount: None,
        start_date: now - Duration::days(1),
        end_date: now + Duration::days(1),
        usage_limit: None,
        used_count: 0,
        scope: CouponScope::Cart,
        status: CouponStatus::Active,
        created_at: now,
        updated_at: now,
    }
}

fn service() -> PricingService {
    PricingService::new(ShippingRates::default())
}

// Property: totals are never negative and always satisfy the invariant
proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn total_is_never_negative_and_invariant_holds(
        items in cart_strategy(),
        percent in 0u32..=100,
        express in any::<bool>(),
    ) {
        let coupon = base_coupon(DiscountType::Percent, Decimal::from(percent));
        let method = if express { ShippingMethod::Express } else { ShippingMethod::Standard };
        let totals = service()
            .compute_order_total(&items, Some(&coupon), method, Utc::now())
            .unwrap();

        prop_assert!(totals.total_price >= 0);
        prop_assert_eq!(
            totals.total_price,
            totals.subtotal - totals.discount_amount + totals.shipping_fee
        );
        prop_assert_eq!(totals.items.len(), items.len());
    }

    #[test]
    fn capped_percent_breakdown_sums_to_the_capped_total(
        items in cart_strategy(),
        percent in 1u32..=100,
        cap in 1i64..500_000,
    ) {
        let mut coupon = base_coupon(DiscountType::Percent, Decimal::from(percent));
        coupon.max_discount_amount = Some(cap);
        let totals = service()
            .compute_order_total(&items, Some(&coupon), ShippingMethod::Standard, Utc::now())
            .unwrap();

        // Raw per-item discount, recomputed independently.
        let raw: i64 = items
            .iter()
            .map(|item| {
                (Decimal::from(item.line_subtotal()) * Decimal::from(percent)
                    / Decimal::ONE_HUNDRED)
                    .floor()
                    .to_i64()
                    .unwrap()
            })
            .sum();

        prop_assert_eq!(totals.discount_amount, raw.min(cap));
        prop_assert_eq!(
            totals.items.iter().map(|b| b.coupon_discount).sum::<i64>(),
            totals.discount_amount
        );
    }

    #[test]
    fn fixed_breakdown_sums_to_value_or_eligible_subtotal(
        items in cart_strategy(),
        value in 0i64..2_000_000,
    ) {
        let coupon = base_coupon(DiscountType::Fixed, Decimal::from(value));
        let totals = service()
            .compute_order_total(&items, Some(&coupon), ShippingMethod::Standard, Utc::now())
            .unwrap();

        prop_assert_eq!(totals.discount_amount, value.min(totals.subtotal));
        prop_assert_eq!(
            totals.items.iter().map(|b| b.coupon_discount).sum::<i64>(),
            totals.discount_amount
        );
        // No item is discounted past its own contribution.
        for breakdown in &totals.items {
            prop_assert!(breakdown.coupon_discount <= breakdown.line_subtotal);
        }
    }

    #[test]
    fn computation_is_deterministic(items in cart_strategy(), percent in 0u32..=100) {
        let coupon = base_coupon(DiscountType::Percent, Decimal::from(percent));
        let now = Utc::now();
        let first = service()
            .compute_order_total(&items, Some(&coupon), ShippingMethod::Express, now)
            .unwrap();
        let second = service()
            .compute_order_total(&items, Some(&coupon), ShippingMethod::Express, now)
            .unwrap();
        prop_assert_eq!(first, second);
    }
}

// Property: validity is Valid exactly when all four conditions hold
proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    #[test]
    fn validity_iff_all_conditions_hold(
        active in any::<bool>(),
        start_offset in -30i64..30,
        window_len in 1i64..30,
        used in 0u32..10,
        limit in proptest::option::of(1u32..10),
    ) {
        let now = Utc::now();
        let mut coupon = base_coupon(DiscountType::Percent, Decimal::from(10u32));
        coupon.status = if active { CouponStatus::Active } else { CouponStatus::Inactive };
        coupon.start_date = now + Duration::days(start_offset);
        coupon.end_date = coupon.start_date + Duration::days(window_len);
        coupon.used_count = used;
        coupon.usage_limit = limit;

        let in_window = coupon.start_date <= now && now <= coupon.end_date;
        let has_uses_left = limit.map_or(true, |l| used < l);
        let expected_valid = active && in_window && has_uses_left;

        prop_assert_eq!(
            coupon.validity(now) == CouponValidity::Valid,
            expected_valid
        );
    }
}
