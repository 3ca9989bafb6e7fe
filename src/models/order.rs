use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::CheckoutError;
use crate::models::cart::CartLineItem;
use crate::services::pricing::OrderTotals;

/// Enum representing the possible statuses of an order.
///
/// Transitions are monotonic and forward-only:
/// `Pending -> Confirmed -> Shipping -> Delivered`, with
/// `Pending | Confirmed -> Cancelled` the only branch out of the happy path.
/// `Delivered` and `Cancelled` are terminal; nothing transitions back into
/// `Pending`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipping,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Validates whether a status transition is allowed.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (OrderStatus::Pending, OrderStatus::Confirmed)
                | (OrderStatus::Confirmed, OrderStatus::Shipping)
                | (OrderStatus::Shipping, OrderStatus::Delivered)
                | (OrderStatus::Pending, OrderStatus::Cancelled)
                | (OrderStatus::Confirmed, OrderStatus::Cancelled)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }
}

/// Enum representing the shipping method chosen at checkout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
pub enum ShippingMethod {
    Standard,
    Express,
}

/// Line-item snapshot captured at order time.
///
/// Price, quantity, and discount percent are frozen copies of the cart line
/// item; `coupon_discount` is this line's share of the applied coupon.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLineItem {
    pub product_id: String,
    pub variant_key: String,
    pub unit_price: i64,
    pub discount_percent: Decimal,
    pub quantity: u32,
    pub line_subtotal: i64,
    pub coupon_discount: i64,
}

/// An order aggregate, immutable once created apart from status transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Primary key: unique identifier for the order.
    pub id: Uuid,

    /// Unique order number.
    pub order_number: String,

    /// Ordered sequence of line-item snapshots.
    pub items: Vec<OrderLineItem>,

    /// Applied coupon, fixed once set.
    pub coupon_id: Option<Uuid>,

    /// Sum of floored line contributions, in minor currency units.
    pub subtotal: i64,

    /// Total coupon discount across all items.
    pub discount_amount: i64,

    /// Shipping fee quoted for the chosen method.
    pub shipping_fee: i64,

    pub shipping_method: ShippingMethod,

    /// `subtotal - discount_amount + shipping_fee`, never negative.
    pub total_price: i64,

    /// Current status of the order.
    pub status: OrderStatus,

    /// Timestamp when the order was created.
    pub created_at: DateTime<Utc>,

    /// Timestamp when the order was last updated.
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Builds the immutable snapshot for a successfully priced checkout.
    ///
    /// `totals` must come from
    /// [`crate::services::pricing::PricingService::compute_order_total`] over
    /// the same `items`, which guarantees the breakdown aligns index-for-index
    /// and the total invariant holds.
    pub fn place(
        order_number: String,
        items: &[CartLineItem],
        totals: &OrderTotals,
        coupon_id: Option<Uuid>,
        shipping_method: ShippingMethod,
    ) -> Self {
        let snapshots = items
            .iter()
            .zip(totals.items.iter())
            .map(|(item, breakdown)| OrderLineItem {
                product_id: item.product_id.clone(),
                variant_key: item.variant_key.clone(),
                unit_price: item.unit_price,
                discount_percent: item.discount_percent,
                quantity: item.quantity,
                line_subtotal: breakdown.line_subtotal,
                coupon_discount: breakdown.coupon_discount,
            })
            .collect();

        Self {
            id: Uuid::new_v4(),
            order_number,
            items: snapshots,
            coupon_id,
            subtotal: totals.subtotal,
            discount_amount: totals.discount_amount,
            shipping_fee: totals.shipping_fee,
            shipping_method,
            total_price: totals.total_price,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    /// Moves the order to `next`, rejecting transitions the state machine
    /// does not allow.
    pub fn transition(&mut self, next: OrderStatus) -> Result<(), CheckoutError> {
        if !self.status.can_transition_to(next) {
            return Err(CheckoutError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Some(Utc::now());
        Ok(())
    }
}
