use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::CheckoutError;
use crate::events::{Event, EventSender};
use crate::models::cart::CartLineItem;
use crate::models::order::{Order, OrderStatus, ShippingMethod};
use crate::services::coupons::CouponService;
use crate::services::pricing::PricingService;

/// Checkout request: a cart snapshot, an optional coupon code, and the
/// chosen shipping method.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceOrder {
    pub items: Vec<CartLineItem>,
    pub coupon_code: Option<String>,
    pub shipping_method: ShippingMethod,
}

/// Orchestrates checkout: coupon evaluation, total computation, redemption
/// accounting, and the order status state machine.
#[derive(Clone)]
pub struct OrderService {
    coupons: CouponService,
    pricing: PricingService,
    events: EventSender,
}

impl OrderService {
    pub fn new(coupons: CouponService, pricing: PricingService, events: EventSender) -> Self {
        Self {
            coupons,
            pricing,
            events,
        }
    }

    /// Places an order from a cart snapshot.
    ///
    /// The coupon is evaluated and the totals are computed before anything
    /// is mutated; redemption is recorded exactly once, only after the
    /// computation succeeded. A rejected computation leaves the coupon's
    /// `used_count` untouched.
    #[instrument(skip(self, input), fields(item_count = input.items.len()))]
    pub async fn place_order(&self, input: PlaceOrder) -> Result<Order, CheckoutError> {
        let now = Utc::now();

        let coupon = match input.coupon_code.as_deref() {
            Some(code) => Some(self.coupons.validated_coupon(code, now).await?),
            None => None,
        };

        let totals = self.pricing.compute_order_total(
            &input.items,
            coupon.as_ref(),
            input.shipping_method,
            now,
        )?;

        // The usage-guarded increment arbitrates concurrent checkouts; a
        // coupon exhausted between evaluation and here fails the order.
        let coupon_id = match &coupon {
            Some(coupon) => Some(self.coupons.redeem(&coupon.code).await?.id),
            None => None,
        };

        let order = Order::place(
            next_order_number(),
            &input.items,
            &totals,
            coupon_id,
            input.shipping_method,
        );
        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            total_price = order.total_price,
            "order placed"
        );

        self.events
            .send(Event::OrderPlaced {
                order_id: order.id,
                total_price: order.total_price,
            })
            .await
            .map_err(CheckoutError::EventError)?;

        Ok(order)
    }

    /// Moves an order forward through its state machine.
    #[instrument(skip(self, order), fields(order_id = %order.id, new_status = %next))]
    pub async fn advance_status(
        &self,
        order: &mut Order,
        next: OrderStatus,
    ) -> Result<(), CheckoutError> {
        let old_status = order.status;
        order.transition(next)?;
        info!(%old_status, "order status updated");

        self.events
            .send(Event::OrderStatusChanged {
                order_id: order.id,
                old_status: old_status.to_string(),
                new_status: next.to_string(),
            })
            .await
            .map_err(CheckoutError::EventError)?;

        Ok(())
    }

    /// Cancels an order that has not shipped yet.
    ///
    /// Cancellation does not restore the coupon's `used_count`; redemption
    /// accounting is settled at placement.
    pub async fn cancel_order(&self, order: &mut Order) -> Result<(), CheckoutError> {
        self.advance_status(order, OrderStatus::Cancelled).await?;
        self.events
            .send(Event::OrderCancelled(order.id))
            .await
            .map_err(CheckoutError::EventError)?;
        Ok(())
    }
}

fn next_order_number() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("ORD-{}", id[..12].to_uppercase())
}
