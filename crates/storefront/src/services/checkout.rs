//! Cart quotes and order placement.
//!
//! Prices always come from the database. The cart only contributes product
//! ids and quantities, and any total the client computed is advisory.

use rust_decimal::Decimal;
use sqlx::PgPool;
use thiserror::Error;

use chaldal_core::address::AddressText;
use chaldal_core::pricing::{Bill, BillLine, Coupon, DEFAULT_DELIVERY_FEE, PricingError};
use chaldal_core::{
    AddressId, AddressLabel, OrderId, PaymentId, PaymentMethod, PersonId, Phone, PhoneError,
    ProductId,
};

use crate::db::{RepositoryError, addresses, areas, orders};
use crate::models::{AttachedAddress, NewOrder, OrderableProduct};
use crate::services::cache::CatalogCache;

/// Shortest recipient name accepted.
pub const MIN_RECIPIENT_NAME_LEN: usize = 2;

/// Errors raised while quoting or placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Please enter the recipient's full name")]
    InvalidName,

    #[error("{0}")]
    InvalidPhone(#[from] PhoneError),

    #[error("Invalid payment method: {0}")]
    InvalidPaymentMethod(String),

    #[error("Invalid address label: {0}")]
    InvalidLabel(String),

    #[error("{0}")]
    Pricing(#[from] PricingError),

    #[error("Please enter a delivery address")]
    MissingAddress,

    #[error("Please enter a complete delivery address")]
    AddressTooShort,

    #[error("Address not found")]
    AddressNotFound,

    #[error("Product {0} is not available")]
    ProductUnavailable(ProductId),

    #[error("Customer account not found")]
    UnknownCustomer,

    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// One cart line as submitted by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartItem {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// Unvalidated order submission.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: PersonId,
    pub recipient_name: String,
    pub phone: String,
    pub payment_method: Option<String>,
    pub coupon_code: Option<String>,
    pub address_id: Option<AddressId>,
    pub address: Option<String>,
    pub label: Option<String>,
    pub items: Vec<CartItem>,
    pub client_total: Option<Decimal>,
}

/// Where an order is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
enum DeliveryTarget {
    Saved(AddressId),
    New { text: AddressText, label: AddressLabel },
}

/// A submission that passed every check that needs no database.
#[derive(Debug, Clone)]
struct ValidatedOrder {
    phone: Phone,
    method: PaymentMethod,
    coupon: Option<Coupon>,
    target: DeliveryTarget,
}

/// A committed order.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order_id: OrderId,
    pub payment_id: PaymentId,
    pub bill: Bill,
    pub address: AttachedAddress,
}

/// Checkout service.
pub struct CheckoutService<'a> {
    pool: &'a PgPool,
    cache: &'a CatalogCache,
}

impl<'a> CheckoutService<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool, cache: &'a CatalogCache) -> Self {
        Self { pool, cache }
    }

    /// Price a cart without placing it.
    ///
    /// The delivery fee comes from the area named in `address`, or the
    /// default fee when no area matches or no address is given.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Pricing` for an empty cart, a bad quantity or
    /// an unknown coupon, and `CheckoutError::ProductUnavailable` for a
    /// missing or inactive product.
    pub async fn quote(
        &self,
        items: &[CartItem],
        coupon_code: Option<&str>,
        address: Option<&str>,
    ) -> Result<Bill, CheckoutError> {
        let coupon = coupon_code.map(Coupon::parse).transpose()?.flatten();
        check_items(items)?;

        let delivery_fee = match address.map(str::trim).filter(|a| !a.is_empty()) {
            Some(text) => areas::fee_for(&self.cache.areas(self.pool).await?, text).1,
            None => DEFAULT_DELIVERY_FEE,
        };

        let mut conn = self.pool.acquire().await.map_err(RepositoryError::from)?;
        let products = orders::products_for_order(&mut conn, &product_ids(items)).await?;
        let lines = price_lines(&products, items)?;

        Ok(Bill::compute(lines, coupon, delivery_fee)?)
    }

    /// Place an order in one transaction.
    ///
    /// Inserts the order, one detail row per distinct product and one
    /// pending payment for the bill total. Nothing is written unless every
    /// step succeeds.
    ///
    /// # Errors
    ///
    /// Returns a validation variant of `CheckoutError` for bad input,
    /// `CheckoutError::AddressNotFound` for an address the user does not own
    /// and `CheckoutError::ProductUnavailable` for a missing or inactive
    /// product.
    pub async fn place_order(&self, order: PlaceOrder) -> Result<PlacedOrder, CheckoutError> {
        let valid = validate_order(&order)?;

        let mut tx = self.pool.begin().await.map_err(RepositoryError::from)?;

        let address = match &valid.target {
            DeliveryTarget::Saved(id) => addresses::owned_address(&mut tx, order.user_id, *id)
                .await?
                .ok_or(CheckoutError::AddressNotFound)?,
            DeliveryTarget::New { text, label } => {
                addresses::attach_address(&mut tx, order.user_id, text, *label, false)
                    .await
                    .map_err(customer_reference)?
            }
        };

        let products = orders::products_for_order(&mut tx, &product_ids(&order.items)).await?;
        let lines = price_lines(&products, &order.items)?;
        let bill = Bill::compute(lines, valid.coupon, address.area.delivery_fee)?;

        let order_id = orders::insert_order(
            &mut tx,
            &NewOrder::from_bill(order.user_id, address.address_id, &bill),
        )
        .await
        .map_err(customer_reference)?;
        orders::insert_order_details(&mut tx, order_id, &bill.lines).await?;
        let payment_id = orders::insert_payment(&mut tx, order_id, bill.total, valid.method).await?;

        tx.commit().await.map_err(RepositoryError::from)?;

        if address.area_created {
            self.cache.invalidate_areas().await;
        }

        if let Some(client_total) = order.client_total
            && client_total != bill.total
        {
            tracing::debug!(
                order_id = %order_id,
                %client_total,
                server_total = %bill.total,
                "Client total differs from server bill"
            );
        }

        tracing::info!(
            order_id = %order_id,
            person_id = %order.user_id,
            lines = bill.lines.len(),
            total = %bill.total,
            method = %valid.method,
            "Order placed"
        );
        tracing::debug!(order_id = %order_id, phone = %valid.phone.masked(), "Order contact");

        Ok(PlacedOrder {
            order_id,
            payment_id,
            bill,
            address,
        })
    }
}

/// A foreign key failure on the order or address means the user id has no
/// customer row.
fn customer_reference(err: RepositoryError) -> CheckoutError {
    match err {
        RepositoryError::InvalidReference(_) => CheckoutError::UnknownCustomer,
        other => CheckoutError::Repository(other),
    }
}

fn product_ids(items: &[CartItem]) -> Vec<ProductId> {
    items.iter().map(|i| i.product_id).collect()
}

fn check_items(items: &[CartItem]) -> Result<(), PricingError> {
    if items.is_empty() {
        return Err(PricingError::EmptyCart);
    }
    if let Some(bad) = items.iter().find(|i| i.quantity < 1) {
        return Err(PricingError::InvalidQuantity {
            product_id: bad.product_id,
        });
    }
    Ok(())
}

/// Run every check that does not need the database.
fn validate_order(order: &PlaceOrder) -> Result<ValidatedOrder, CheckoutError> {
    if order.recipient_name.trim().chars().count() < MIN_RECIPIENT_NAME_LEN {
        return Err(CheckoutError::InvalidName);
    }

    let phone = Phone::parse(&order.phone)?;

    let method = match order.payment_method.as_deref().map(str::trim) {
        None | Some("") => PaymentMethod::default(),
        Some(m) => m
            .to_ascii_lowercase()
            .parse::<PaymentMethod>()
            .map_err(|_| CheckoutError::InvalidPaymentMethod(m.to_owned()))?,
    };

    let coupon = order
        .coupon_code
        .as_deref()
        .map(Coupon::parse)
        .transpose()?
        .flatten();

    check_items(&order.items)?;

    let target = if let Some(id) = order.address_id {
        DeliveryTarget::Saved(id)
    } else {
        let text = order
            .address
            .as_deref()
            .and_then(AddressText::parse)
            .ok_or(CheckoutError::MissingAddress)?;
        if !text.is_deliverable() {
            return Err(CheckoutError::AddressTooShort);
        }
        let label = match order.label.as_deref().map(str::trim) {
            None | Some("") => AddressLabel::default(),
            Some(l) => l
                .parse::<AddressLabel>()
                .map_err(|_| CheckoutError::InvalidLabel(l.to_owned()))?,
        };
        DeliveryTarget::New { text, label }
    };

    Ok(ValidatedOrder {
        phone,
        method,
        coupon,
        target,
    })
}

/// Attach database prices to cart lines.
///
/// Every product must exist and be active.
fn price_lines(
    products: &[OrderableProduct],
    items: &[CartItem],
) -> Result<Vec<BillLine>, CheckoutError> {
    items
        .iter()
        .map(|item| {
            let product = products
                .iter()
                .find(|p| p.id == item.product_id && p.is_active)
                .ok_or(CheckoutError::ProductUnavailable(item.product_id))?;
            Ok(BillLine {
                product_id: product.id,
                unit_price: product.unit_price,
                quantity: item.quantity,
            })
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: i32, qty: i32) -> CartItem {
        CartItem {
            product_id: ProductId::new(id),
            quantity: qty,
        }
    }

    fn order() -> PlaceOrder {
        PlaceOrder {
            user_id: PersonId::new(1),
            recipient_name: "Karim".to_owned(),
            phone: "01711223344".to_owned(),
            payment_method: Some("bkash".to_owned()),
            coupon_code: None,
            address_id: None,
            address: Some("House 9, Road 2, Dhanmondi".to_owned()),
            label: None,
            items: vec![item(1, 2)],
            client_total: None,
        }
    }

    fn product(id: i32, price: i64, active: bool) -> OrderableProduct {
        OrderableProduct {
            id: ProductId::new(id),
            name: format!("Product {id}"),
            unit_price: Decimal::new(price, 0),
            is_active: active,
        }
    }

    #[test]
    fn test_validate_order_accepts_new_address() {
        let valid = validate_order(&order()).unwrap();
        assert_eq!(valid.method, PaymentMethod::Bkash);
        assert_eq!(valid.coupon, None);
        match valid.target {
            DeliveryTarget::New { text, label } => {
                assert_eq!(label, AddressLabel::Home);
                assert_eq!(text.area_hint, "Dhanmondi");
            }
            DeliveryTarget::Saved(_) => panic!("expected a new address"),
        }
    }

    #[test]
    fn test_long_address_keeps_area_hint_storable() {
        let input = PlaceOrder {
            address: Some(format!("{} near the big mosque", "4".repeat(130))),
            ..order()
        };
        let valid = validate_order(&input).unwrap();
        let DeliveryTarget::New { text, .. } = valid.target else {
            panic!("expected a new address");
        };
        assert_eq!(text.area_hint, "near the big mosque");
        assert!(text.city.chars().count() <= 100);
    }

    #[test]
    fn test_saved_address_skips_address_text() {
        let input = PlaceOrder {
            address_id: Some(AddressId::new(5)),
            address: None,
            ..order()
        };
        let valid = validate_order(&input).unwrap();
        assert_eq!(valid.target, DeliveryTarget::Saved(AddressId::new(5)));
    }

    #[test]
    fn test_validate_order_rejections() {
        let short_name = PlaceOrder {
            recipient_name: " K ".to_owned(),
            ..order()
        };
        assert!(matches!(
            validate_order(&short_name),
            Err(CheckoutError::InvalidName)
        ));

        let bad_phone = PlaceOrder {
            phone: "12345".to_owned(),
            ..order()
        };
        assert!(matches!(
            validate_order(&bad_phone),
            Err(CheckoutError::InvalidPhone(_))
        ));

        let no_address = PlaceOrder {
            address: Some("   ".to_owned()),
            ..order()
        };
        assert!(matches!(
            validate_order(&no_address),
            Err(CheckoutError::MissingAddress)
        ));

        let short_address = PlaceOrder {
            address: Some("Banani".to_owned()),
            ..order()
        };
        assert!(matches!(
            validate_order(&short_address),
            Err(CheckoutError::AddressTooShort)
        ));

        let empty = PlaceOrder {
            items: vec![],
            ..order()
        };
        assert!(matches!(
            validate_order(&empty),
            Err(CheckoutError::Pricing(PricingError::EmptyCart))
        ));

        let bad_coupon = PlaceOrder {
            coupon_code: Some("HALFOFF".to_owned()),
            ..order()
        };
        assert!(matches!(
            validate_order(&bad_coupon),
            Err(CheckoutError::Pricing(PricingError::InvalidCoupon(_)))
        ));

        let bad_method = PlaceOrder {
            payment_method: Some("cheque".to_owned()),
            ..order()
        };
        assert!(matches!(
            validate_order(&bad_method),
            Err(CheckoutError::InvalidPaymentMethod(_))
        ));
    }

    #[test]
    fn test_payment_method_is_case_insensitive_and_defaults_to_cod() {
        let upper = PlaceOrder {
            payment_method: Some("CARD".to_owned()),
            ..order()
        };
        assert_eq!(validate_order(&upper).unwrap().method, PaymentMethod::Card);

        let missing = PlaceOrder {
            payment_method: None,
            ..order()
        };
        assert_eq!(validate_order(&missing).unwrap().method, PaymentMethod::Cod);
    }

    #[test]
    fn test_price_lines_uses_database_prices() {
        let products = vec![product(1, 85, true), product(2, 30, true)];
        let lines = price_lines(&products, &[item(2, 3), item(1, 1)]).unwrap();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].product_id, ProductId::new(2));
        assert_eq!(lines[0].unit_price, Decimal::new(30, 0));
        assert_eq!(lines[1].unit_price, Decimal::new(85, 0));
    }

    #[test]
    fn test_price_lines_rejects_missing_and_inactive() {
        let products = vec![product(1, 85, true), product(2, 30, false)];
        assert!(matches!(
            price_lines(&products, &[item(2, 1)]),
            Err(CheckoutError::ProductUnavailable(id)) if id == ProductId::new(2)
        ));
        assert!(matches!(
            price_lines(&products, &[item(9, 1)]),
            Err(CheckoutError::ProductUnavailable(id)) if id == ProductId::new(9)
        ));
    }
}
