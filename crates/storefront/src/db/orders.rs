//! Order persistence.
//!
//! The insert helpers take `&mut PgConnection` so checkout can run them in
//! one transaction; nothing here commits.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use chaldal_core::pricing::BillLine;
use chaldal_core::{
    AddressId, OrderId, OrderStatus, PaymentId, PaymentMethod, PaymentStatus, PersonId, ProductId,
};

use super::{RepositoryError, parse_column};
use crate::models::{NewOrder, Order, OrderLine, OrderSummary, OrderableProduct, Payment};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderableProductRow {
    product_id: i32,
    name: String,
    unit_price: Decimal,
    is_active: bool,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    order_id: i32,
    user_id: i32,
    address_id: Option<i32>,
    street: Option<String>,
    status: String,
    coupon_code: Option<String>,
    subtotal: Decimal,
    discount: Decimal,
    delivery_fee: Decimal,
    tax: Decimal,
    total: Decimal,
    order_time: DateTime<Utc>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderLineRow {
    product_id: i32,
    name: String,
    quantity: i32,
    price: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    payment_id: i32,
    amount: Decimal,
    method: String,
    status: String,
    payment_time: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for Payment {
    type Error = RepositoryError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            payment_id: PaymentId::new(row.payment_id),
            amount: row.amount,
            method: parse_column::<PaymentMethod>("payment method", &row.method)?,
            status: parse_column::<PaymentStatus>("payment status", &row.status)?,
            payment_time: row.payment_time,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderSummaryRow {
    order_id: i32,
    status: String,
    order_time: DateTime<Utc>,
    item_count: i64,
    total: Decimal,
}

/// Order total as stored: discounted subtotal plus delivery and VAT.
const ORDER_TOTAL_SQL: &str = "GREATEST(o.subtotal - o.discount, 0) + o.delivery_fee + o.tax";

// =============================================================================
// Transactional helpers
// =============================================================================

/// Load the products referenced by a cart, locking them against concurrent
/// price edits until the transaction ends.
///
/// # Errors
///
/// Returns `RepositoryError::Database` if the query fails.
pub async fn products_for_order(
    conn: &mut PgConnection,
    ids: &[ProductId],
) -> Result<Vec<OrderableProduct>, RepositoryError> {
    let ids: Vec<i32> = ids.iter().map(ProductId::as_i32).collect();
    let rows = sqlx::query_as::<_, OrderableProductRow>(
        r"
        SELECT product_id, name, unit_price, is_active
        FROM products
        WHERE product_id = ANY($1)
        FOR SHARE
        ",
    )
    .bind(ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| OrderableProduct {
            id: ProductId::new(r.product_id),
            name: r.name,
            unit_price: r.unit_price,
            is_active: r.is_active,
        })
        .collect())
}

/// Insert a `pending` order stamped with the current time.
///
/// # Errors
///
/// Returns `RepositoryError::InvalidReference` if the user has no `users`
/// row or the address does not exist.
pub async fn insert_order(
    conn: &mut PgConnection,
    order: &NewOrder,
) -> Result<OrderId, RepositoryError> {
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO orders
            (user_id, address_id, status, coupon_code, subtotal, discount, delivery_fee, tax, order_time)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
        RETURNING order_id
        ",
    )
    .bind(order.user_id)
    .bind(order.address_id)
    .bind(OrderStatus::Pending.as_str())
    .bind(order.coupon.map(|c| c.code()))
    .bind(order.subtotal)
    .bind(order.discount)
    .bind(order.delivery_fee)
    .bind(order.tax)
    .fetch_one(&mut *conn)
    .await
    .map_err(RepositoryError::from_constraint)?;

    Ok(OrderId::new(id))
}

/// Insert one `order_details` row per line. Returns the number inserted.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` for a repeated product id and
/// `RepositoryError::InvalidReference` for an unknown product.
pub async fn insert_order_details(
    conn: &mut PgConnection,
    order_id: OrderId,
    lines: &[BillLine],
) -> Result<u64, RepositoryError> {
    let mut inserted = 0;
    for line in lines {
        inserted += sqlx::query(
            "INSERT INTO order_details (order_id, product_id, quantity, price) VALUES ($1, $2, $3, $4)",
        )
        .bind(order_id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price)
        .execute(&mut *conn)
        .await
        .map_err(RepositoryError::from_constraint)?
        .rows_affected();
    }
    Ok(inserted)
}

/// Record the order's single `pending` payment.
///
/// # Errors
///
/// Returns `RepositoryError::Conflict` if the order already has a payment.
pub async fn insert_payment(
    conn: &mut PgConnection,
    order_id: OrderId,
    amount: Decimal,
    method: PaymentMethod,
) -> Result<PaymentId, RepositoryError> {
    let id: i32 = sqlx::query_scalar(
        r"
        INSERT INTO payment (order_id, amount, method, status, payment_time)
        VALUES ($1, $2, $3, $4, NOW())
        RETURNING payment_id
        ",
    )
    .bind(order_id)
    .bind(amount)
    .bind(method.as_str())
    .bind(PaymentStatus::Pending.as_str())
    .fetch_one(&mut *conn)
    .await
    .map_err(RepositoryError::from_constraint)?;

    Ok(PaymentId::new(id))
}

// =============================================================================
// Read side
// =============================================================================

/// Repository for reading placed orders.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Load an order with its lines and payment.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is unknown.
    pub async fn get_with_details(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let sql = format!(
            r"
            SELECT o.order_id, o.user_id, o.address_id, a.street, o.status, o.coupon_code,
                   o.subtotal, o.discount, o.delivery_fee, o.tax,
                   ({ORDER_TOTAL_SQL}) AS total, o.order_time
            FROM orders o
            LEFT JOIN address a ON a.address_id = o.address_id
            WHERE o.order_id = $1
            "
        );
        let Some(row) = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?
        else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, OrderLineRow>(
            r"
            SELECT od.product_id, p.name, od.quantity, od.price
            FROM order_details od
            JOIN products p ON p.product_id = od.product_id
            WHERE od.order_id = $1
            ORDER BY p.name
            ",
        )
        .bind(id)
        .fetch_all(self.pool)
        .await?;

        let payment = sqlx::query_as::<_, PaymentRow>(
            "SELECT payment_id, amount, method, status, payment_time FROM payment WHERE order_id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .map(Payment::try_from)
        .transpose()?;

        Ok(Some(Order {
            order_id: OrderId::new(row.order_id),
            user_id: PersonId::new(row.user_id),
            address_id: row.address_id.map(AddressId::new),
            address: row.street,
            status: parse_column::<OrderStatus>("order status", &row.status)?,
            coupon_code: row.coupon_code,
            subtotal: row.subtotal,
            discount: row.discount,
            delivery_fee: row.delivery_fee,
            tax: row.tax,
            total: row.total,
            order_time: row.order_time,
            items: lines
                .into_iter()
                .map(|l| OrderLine {
                    product_id: ProductId::new(l.product_id),
                    name: l.name,
                    quantity: l.quantity,
                    price: l.price,
                })
                .collect(),
            payment,
        }))
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored status is unknown.
    pub async fn list_for_user(
        &self,
        user_id: PersonId,
    ) -> Result<Vec<OrderSummary>, RepositoryError> {
        let sql = format!(
            r"
            SELECT o.order_id, o.status, o.order_time,
                   COALESCE(SUM(od.quantity), 0)::BIGINT AS item_count,
                   ({ORDER_TOTAL_SQL}) AS total
            FROM orders o
            LEFT JOIN order_details od ON od.order_id = o.order_id
            WHERE o.user_id = $1
            GROUP BY o.order_id
            ORDER BY o.order_time DESC, o.order_id DESC
            "
        );
        let rows = sqlx::query_as::<_, OrderSummaryRow>(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await?;

        rows.into_iter()
            .map(|r| {
                Ok(OrderSummary {
                    order_id: OrderId::new(r.order_id),
                    status: parse_column::<OrderStatus>("order status", &r.status)?,
                    order_time: r.order_time,
                    item_count: r.item_count,
                    total: r.total,
                })
            })
            .collect()
    }
}
