use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::CheckoutError;

/// One product-variant-quantity entry in a cart.
///
/// Owned by the cart/session collaborator; once an order is placed the item
/// is captured into an immutable [`crate::models::order::OrderLineItem`]
/// snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLineItem {
    pub product_id: String,
    /// Identifies the priced unit, derived from product id + size + color.
    pub variant_key: String,
    pub category_id: Option<String>,
    /// Pre-discount price per unit, in minor currency units.
    pub unit_price: i64,
    /// Product-level promotional discount in [0, 100], independent of coupons.
    pub discount_percent: Decimal,
    pub quantity: u32,
}

impl CartLineItem {
    pub fn new(
        product_id: impl Into<String>,
        size: &str,
        color: &str,
        category_id: Option<String>,
        unit_price: i64,
        discount_percent: Decimal,
        quantity: u32,
    ) -> Result<Self, CheckoutError> {
        let product_id = product_id.into();
        if unit_price < 0 {
            return Err(CheckoutError::ValidationError(format!(
                "unit price must be non-negative, got {unit_price}"
            )));
        }
        if discount_percent < Decimal::ZERO || discount_percent > Decimal::ONE_HUNDRED {
            return Err(CheckoutError::ValidationError(format!(
                "discount percent must be between 0 and 100, got {discount_percent}"
            )));
        }
        let variant_key = derive_variant_key(&product_id, size, color);
        if quantity < 1 {
            return Err(CheckoutError::InvalidQuantity { variant_key });
        }
        Ok(Self {
            product_id,
            variant_key,
            category_id,
            unit_price,
            discount_percent,
            quantity,
        })
    }

    /// Line contribution to the order subtotal:
    /// `floor(unit_price * (1 - discount_percent/100) * quantity)`.
    ///
    /// Flooring per item before summation is an explicit policy; it prevents
    /// cross-item rounding drift and matches what the storefront displays.
    pub fn line_subtotal(&self) -> i64 {
        let gross = Decimal::from(self.unit_price) * Decimal::from(self.quantity);
        let rate = (Decimal::ONE_HUNDRED - self.discount_percent) / Decimal::ONE_HUNDRED;
        (gross * rate).floor().to_i64().unwrap_or(0)
    }
}

/// Derives the variant key for a priced unit.
pub fn derive_variant_key(product_id: &str, size: &str, color: &str) -> String {
    format!("{product_id}:{size}:{color}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use rust_decimal_macros::dec;

    #[test]
    fn line_subtotal_floors_the_discounted_contribution() {
        // 5,589,000 at 68% off: floor(5,589,000 * 0.32) = 1,788,480.
        let item = CartLineItem::new("SKU-1", "M", "black", None, 5_589_000, dec!(68), 1).unwrap();
        assert_eq!(item.line_subtotal(), 1_788_480);
    }

    #[test]
    fn line_subtotal_scales_with_quantity_before_flooring() {
        let item = CartLineItem::new("SKU-2", "S", "red", None, 99_999, dec!(33), 3).unwrap();
        // floor(99,999 * 3 * 0.67) = floor(200,997.99) = 200,997
        assert_eq!(item.line_subtotal(), 200_997);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let err = CartLineItem::new("SKU-3", "L", "blue", None, 1_000, dec!(0), 0).unwrap_err();
        assert_matches!(err, CheckoutError::InvalidQuantity { variant_key } if variant_key == "SKU-3:L:blue");
    }

    #[test]
    fn negative_price_and_out_of_range_discount_are_rejected() {
        assert_matches!(
            CartLineItem::new("SKU-4", "L", "blue", None, -1, dec!(0), 1),
            Err(CheckoutError::ValidationError(_))
        );
        assert_matches!(
            CartLineItem::new("SKU-4", "L", "blue", None, 1_000, dec!(100.5), 1),
            Err(CheckoutError::ValidationError(_))
        );
    }

    #[test]
    fn variant_key_is_derived_from_product_size_color() {
        let item = CartLineItem::new("TEE-9", "XL", "white", None, 150_000, dec!(0), 2).unwrap();
        assert_eq!(item.variant_key, "TEE-9:XL:white");
    }
}
