//! Cart pricing: coupons, delivery fee and VAT.
//!
//! All amounts are whole or two-place taka held in [`Decimal`]. Discounts and
//! VAT are rounded half away from zero to whole taka.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// Delivery fee charged when an address matches no known area.
pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// VAT applied to the discounted subtotal (3%).
pub const VAT_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 2);

/// `SAVE10` discount rate (10%).
pub const SAVE10_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// Largest discount `SAVE10` grants.
pub const SAVE10_CAP: Decimal = Decimal::from_parts(150, 0, 0, false, 0);

/// Errors raised while pricing a cart.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PricingError {
    #[error("Invalid code. Try SAVE10 or FREESHIP.")]
    InvalidCoupon(String),
    #[error("quantity for product {product_id} must be at least 1")]
    InvalidQuantity { product_id: ProductId },
    #[error("cart is empty")]
    EmptyCart,
}

/// A recognised coupon code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Coupon {
    /// 10% off the subtotal, capped at [`SAVE10_CAP`].
    Save10,
    /// Waives the delivery fee.
    FreeShip,
}

impl Coupon {
    /// Parse a user-entered code.
    ///
    /// Blank input means "no coupon" and yields `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::InvalidCoupon` for any other unknown code.
    pub fn parse(code: &str) -> Result<Option<Self>, PricingError> {
        let code = code.trim().to_uppercase();
        match code.as_str() {
            "" => Ok(None),
            "SAVE10" => Ok(Some(Self::Save10)),
            "FREESHIP" => Ok(Some(Self::FreeShip)),
            _ => Err(PricingError::InvalidCoupon(code)),
        }
    }

    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Save10 => "SAVE10",
            Self::FreeShip => "FREESHIP",
        }
    }
}

/// One priced cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillLine {
    pub product_id: ProductId,
    pub unit_price: Decimal,
    pub quantity: i32,
}

impl BillLine {
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Collapse lines for the same product into one, summing quantities.
///
/// The first occurrence keeps its position and unit price.
#[must_use]
pub fn merge_lines(lines: Vec<BillLine>) -> Vec<BillLine> {
    let mut merged: Vec<BillLine> = Vec::with_capacity(lines.len());
    for line in lines {
        match merged.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => existing.quantity = existing.quantity.saturating_add(line.quantity),
            None => merged.push(line),
        }
    }
    merged
}

/// A computed cart bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    pub lines: Vec<BillLine>,
    pub coupon: Option<Coupon>,
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub discount: Decimal,
    pub vat: Decimal,
    pub total: Decimal,
}

impl Bill {
    /// Price `lines` with an optional coupon and the area's delivery fee.
    ///
    /// # Errors
    ///
    /// Returns `PricingError::EmptyCart` when `lines` is empty and
    /// `PricingError::InvalidQuantity` for any quantity below 1.
    pub fn compute(
        lines: Vec<BillLine>,
        coupon: Option<Coupon>,
        delivery_fee: Decimal,
    ) -> Result<Self, PricingError> {
        if lines.is_empty() {
            return Err(PricingError::EmptyCart);
        }
        if let Some(bad) = lines.iter().find(|l| l.quantity < 1) {
            return Err(PricingError::InvalidQuantity {
                product_id: bad.product_id,
            });
        }

        let lines = merge_lines(lines);
        let subtotal: Decimal = lines.iter().map(BillLine::line_total).sum();
        let delivery_fee = if subtotal > Decimal::ZERO {
            delivery_fee
        } else {
            Decimal::ZERO
        };

        let discount = match coupon {
            Some(Coupon::Save10) => round_taka(subtotal * SAVE10_RATE).min(SAVE10_CAP),
            Some(Coupon::FreeShip) => delivery_fee,
            None => Decimal::ZERO,
        };

        let taxable = (subtotal - discount).max(Decimal::ZERO);
        let vat = round_taka(taxable * VAT_RATE);
        let total = taxable + delivery_fee + vat;

        Ok(Self {
            lines,
            coupon,
            subtotal,
            delivery_fee,
            discount,
            vat,
            total,
        })
    }

    /// Number of items across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| i64::from(l.quantity)).sum()
    }
}

fn round_taka(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn line(id: i32, price: i64, qty: i32) -> BillLine {
        BillLine {
            product_id: ProductId::new(id),
            unit_price: Decimal::new(price, 0),
            quantity: qty,
        }
    }

    #[test]
    fn test_coupon_parse() {
        assert_eq!(Coupon::parse(" save10 ").unwrap(), Some(Coupon::Save10));
        assert_eq!(Coupon::parse("FreeShip").unwrap(), Some(Coupon::FreeShip));
        assert_eq!(Coupon::parse("   ").unwrap(), None);

        let err = Coupon::parse("half").unwrap_err();
        assert_eq!(err, PricingError::InvalidCoupon("HALF".to_owned()));
        assert_eq!(err.to_string(), "Invalid code. Try SAVE10 or FREESHIP.");
    }

    #[test]
    fn test_bill_without_coupon() {
        // 2 x 120 + 1 x 55 = 295; vat = round(8.85) = 9
        let bill = Bill::compute(
            vec![line(1, 120, 2), line(2, 55, 1)],
            None,
            DEFAULT_DELIVERY_FEE,
        )
        .unwrap();

        assert_eq!(bill.subtotal, Decimal::new(295, 0));
        assert_eq!(bill.delivery_fee, Decimal::new(60, 0));
        assert_eq!(bill.discount, Decimal::ZERO);
        assert_eq!(bill.vat, Decimal::new(9, 0));
        assert_eq!(bill.total, Decimal::new(364, 0));
    }

    #[test]
    fn test_save10_rounds_and_caps() {
        // 10% of 1005 = 100.5 -> 101
        let bill = Bill::compute(vec![line(1, 1005, 1)], Some(Coupon::Save10), Decimal::ZERO)
            .unwrap();
        assert_eq!(bill.discount, Decimal::new(101, 0));

        let bill = Bill::compute(vec![line(1, 5000, 1)], Some(Coupon::Save10), Decimal::ZERO)
            .unwrap();
        assert_eq!(bill.discount, SAVE10_CAP);
        // (5000 - 150) * 0.03 = 145.5 -> 146
        assert_eq!(bill.vat, Decimal::new(146, 0));
        assert_eq!(bill.total, Decimal::new(4996, 0));
    }

    #[test]
    fn test_freeship_discounts_delivery() {
        let bill = Bill::compute(
            vec![line(1, 100, 1)],
            Some(Coupon::FreeShip),
            Decimal::new(80, 0),
        )
        .unwrap();
        assert_eq!(bill.delivery_fee, Decimal::new(80, 0));
        assert_eq!(bill.discount, Decimal::new(80, 0));
        // taxable = 20, vat = round(0.6) = 1
        assert_eq!(bill.vat, Decimal::ONE);
        assert_eq!(bill.total, Decimal::new(101, 0));
    }

    #[test]
    fn test_free_products_skip_delivery() {
        let bill = Bill::compute(vec![line(1, 0, 3)], None, DEFAULT_DELIVERY_FEE).unwrap();
        assert_eq!(bill.delivery_fee, Decimal::ZERO);
        assert_eq!(bill.total, Decimal::ZERO);
    }

    #[test]
    fn test_rejects_empty_and_bad_quantity() {
        assert_eq!(
            Bill::compute(vec![], None, DEFAULT_DELIVERY_FEE),
            Err(PricingError::EmptyCart)
        );
        assert_eq!(
            Bill::compute(vec![line(7, 10, 0)], None, DEFAULT_DELIVERY_FEE),
            Err(PricingError::InvalidQuantity {
                product_id: ProductId::new(7)
            })
        );
    }

    #[test]
    fn test_duplicate_lines_are_merged() {
        let bill = Bill::compute(
            vec![line(1, 10, 1), line(2, 20, 1), line(1, 10, 2)],
            None,
            Decimal::ZERO,
        )
        .unwrap();
        assert_eq!(bill.lines.len(), 2);
        assert_eq!(bill.lines[0].quantity, 3);
        assert_eq!(bill.item_count(), 4);
        assert_eq!(bill.subtotal, Decimal::new(50, 0));
    }
}
