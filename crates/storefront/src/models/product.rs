//! Catalog domain types.

use rust_decimal::Decimal;
use serde::Serialize;

use chaldal_core::{CategoryId, PersonId, ProductId};

/// A product as listed in the storefront.
///
/// Field names follow the storefront product card (`price`, `stock`,
/// `image`, `category`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub unit: String,
    pub image: Option<String>,
    pub rating: Decimal,
    pub category: String,
    pub category_id: CategoryId,
    pub seller_id: Option<PersonId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
}

/// Validated input for a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub unit: String,
    pub price: Decimal,
    pub stock: i32,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    pub seller_id: PersonId,
}

/// Partial product update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub is_active: Option<bool>,
}

impl ProductUpdate {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.unit.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.image_url.is_none()
            && self.category_id.is_none()
            && self.is_active.is_none()
    }
}

/// A row in the seller dashboard product table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerProduct {
    pub product_id: ProductId,
    pub name: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub unit: String,
    pub category_id: CategoryId,
    pub is_active: bool,
}

/// Seller dashboard totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SellerStats {
    /// Active products listed by the seller.
    pub total_products: i64,
    /// Revenue from order lines for the seller's products, excluding cancelled orders.
    pub total_sales: Decimal,
    pub units_sold: i64,
    /// Distinct orders containing at least one of the seller's products.
    pub total_orders: i64,
    /// Mean rating of the seller's active products (5.0 with none).
    pub rating: Decimal,
}

/// The columns checkout needs to price a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderableProduct {
    pub id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub is_active: bool,
}
