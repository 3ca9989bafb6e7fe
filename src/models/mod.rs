pub mod cart;
pub mod coupon;
pub mod order;

pub use cart::CartLineItem;
pub use coupon::{Coupon, CouponScope, CouponStatus, CouponValidity, DiscountType};
pub use order::{Order, OrderLineItem, OrderStatus, ShippingMethod};
