//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use chaldal_core::pricing::{Bill, Coupon};
use chaldal_core::{
    AddressId, OrderId, OrderStatus, PaymentId, PaymentMethod, PaymentStatus, PersonId, ProductId,
};

/// Header values for a new order, taken from the computed bill.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: PersonId,
    pub address_id: AddressId,
    pub coupon: Option<Coupon>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_fee: Decimal,
    pub tax: Decimal,
}

impl NewOrder {
    #[must_use]
    pub fn from_bill(user_id: PersonId, address_id: AddressId, bill: &Bill) -> Self {
        Self {
            user_id,
            address_id,
            coupon: bill.coupon,
            subtotal: bill.subtotal,
            discount: bill.discount,
            delivery_fee: bill.delivery_fee,
            tax: bill.vat,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Payment {
    pub payment_id: PaymentId,
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub status: PaymentStatus,
    pub payment_time: DateTime<Utc>,
}

/// A placed order with its lines and payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Order {
    pub order_id: OrderId,
    pub user_id: PersonId,
    pub address_id: Option<AddressId>,
    pub address: Option<String>,
    pub status: OrderStatus,
    pub coupon_code: Option<String>,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub delivery_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub order_time: DateTime<Utc>,
    pub items: Vec<OrderLine>,
    pub payment: Option<Payment>,
}

/// One row in a customer's order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub order_time: DateTime<Utc>,
    pub item_count: i64,
    pub total: Decimal,
}
