//! Catalog repository: product listing, seller product management and stats.

use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};

use chaldal_core::catalog::{ProductFilter, ProductSort, SUGGESTION_LIMIT};
use chaldal_core::{CategoryId, PersonId, ProductId};

use super::RepositoryError;
use crate::models::{Category, NewProduct, Product, ProductUpdate, SellerProduct, SellerStats};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: i32,
    name: String,
    unit_price: Decimal,
    stock: i32,
    unit: String,
    image_url: Option<String>,
    rating: Decimal,
    category: String,
    category_id: i32,
    seller_id: Option<i32>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.product_id),
            name: row.name,
            price: row.unit_price,
            stock: row.stock,
            unit: row.unit,
            image: row.image_url,
            rating: row.rating,
            category: row.category,
            category_id: CategoryId::new(row.category_id),
            seller_id: row.seller_id.map(PersonId::new),
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    category_id: i32,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct SellerProductRow {
    product_id: i32,
    name: String,
    unit_price: Decimal,
    stock: i32,
    image_url: Option<String>,
    unit: String,
    category_id: i32,
    is_active: bool,
}

impl From<SellerProductRow> for SellerProduct {
    fn from(row: SellerProductRow) -> Self {
        Self {
            product_id: ProductId::new(row.product_id),
            name: row.name,
            price: row.unit_price,
            stock_quantity: row.stock,
            image_url: row.image_url,
            unit: row.unit,
            category_id: CategoryId::new(row.category_id),
            is_active: row.is_active,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SellerStatsRow {
    total_products: i64,
    total_sales: Decimal,
    units_sold: i64,
    total_orders: i64,
    rating: Decimal,
}

const PRODUCT_COLUMNS: &str = r"
    SELECT p.product_id, p.name, p.unit_price, p.stock, p.unit, p.image_url,
           p.rating, c.name AS category, p.category_id, p.seller_id
    FROM products p
    JOIN category c ON c.category_id = p.category_id
    WHERE p.is_active";

/// Repository for products and categories.
pub struct CatalogRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CatalogRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List active products matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self, filter: &ProductFilter) -> Result<Vec<Product>, RepositoryError> {
        let mut query: QueryBuilder<Postgres> = QueryBuilder::new(PRODUCT_COLUMNS);

        if let Some(q) = filter.query() {
            query.push(" AND POSITION(LOWER(");
            query.push_bind(q);
            query.push(") IN LOWER(p.name)) > 0");
        }

        if let Some(category) = filter.category() {
            query.push(" AND LOWER(c.name) = LOWER(");
            query.push_bind(category);
            query.push(")");
        }

        if filter.in_stock_only() {
            query.push(" AND p.stock > 0");
        }

        if let Some(max_price) = filter.max_price() {
            query.push(" AND p.unit_price <= ");
            query.push_bind(max_price);
        }

        query.push(match filter.sort() {
            ProductSort::Featured => " ORDER BY p.product_id ASC",
            ProductSort::PriceAsc => " ORDER BY p.unit_price ASC, p.product_id ASC",
            ProductSort::PriceDesc => " ORDER BY p.unit_price DESC, p.product_id ASC",
            ProductSort::NameAsc => " ORDER BY LOWER(p.name) ASC, p.product_id ASC",
        });

        let rows = query
            .build_query_as::<ProductRow>()
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Up to [`SUGGESTION_LIMIT`] active products whose name contains `q`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn suggestions(&self, q: &str) -> Result<Vec<Product>, RepositoryError> {
        let q = q.trim();
        if q.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "{PRODUCT_COLUMNS} AND POSITION(LOWER($1) IN LOWER(p.name)) > 0 \
             ORDER BY p.product_id ASC LIMIT $2"
        );
        let rows = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(q)
            .bind(SUGGESTION_LIMIT)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get an active product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let sql = format!("{PRODUCT_COLUMNS} AND p.product_id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(
            "SELECT category_id, name FROM category ORDER BY category_id ASC",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|r| Category {
                category_id: CategoryId::new(r.category_id),
                name: r.name,
            })
            .collect())
    }

    /// Insert a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the category or seller
    /// does not exist, `RepositoryError::Database` for other failures.
    pub async fn create_product(&self, new: &NewProduct) -> Result<ProductId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO products (name, unit, unit_price, stock, image_url, category_id, seller_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING product_id
            ",
        )
        .bind(&new.name)
        .bind(&new.unit)
        .bind(new.price)
        .bind(new.stock)
        .bind(new.image_url.as_deref())
        .bind(new.category_id)
        .bind(new.seller_id)
        .fetch_one(self.pool)
        .await
        .map_err(RepositoryError::from_constraint)?;

        tracing::info!(product_id = id, seller_id = %new.seller_id, "Product created");
        Ok(ProductId::new(id))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    /// Returns `RepositoryError::InvalidReference` for an unknown category.
    pub async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE products SET
                name        = COALESCE($2, name),
                unit        = COALESCE($3, unit),
                unit_price  = COALESCE($4, unit_price),
                stock       = COALESCE($5, stock),
                image_url   = COALESCE($6, image_url),
                category_id = COALESCE($7, category_id),
                is_active   = COALESCE($8, is_active)
            WHERE product_id = $1
            ",
        )
        .bind(id)
        .bind(update.name.as_deref())
        .bind(update.unit.as_deref())
        .bind(update.price)
        .bind(update.stock)
        .bind(update.image_url.as_deref())
        .bind(update.category_id)
        .bind(update.is_active)
        .execute(self.pool)
        .await
        .map_err(RepositoryError::from_constraint)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(product_id = %id, "Product updated");
        Ok(())
    }

    /// Hide a product from the storefront. Order history keeps referencing it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product does not exist.
    pub async fn deactivate_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE products SET is_active = FALSE WHERE product_id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        tracing::info!(product_id = %id, "Product deactivated");
        Ok(())
    }

    /// All of a seller's products, newest first, including inactive ones.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn seller_products(
        &self,
        seller_id: PersonId,
    ) -> Result<Vec<SellerProduct>, RepositoryError> {
        let rows = sqlx::query_as::<_, SellerProductRow>(
            r"
            SELECT product_id, name, unit_price, stock, image_url, unit, category_id, is_active
            FROM products
            WHERE seller_id = $1
            ORDER BY product_id DESC
            ",
        )
        .bind(seller_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(SellerProduct::from).collect())
    }

    /// Dashboard totals for a seller.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn seller_stats(&self, seller_id: PersonId) -> Result<SellerStats, RepositoryError> {
        let row = sqlx::query_as::<_, SellerStatsRow>(
            r"
            SELECT
                (SELECT COUNT(*) FROM products WHERE seller_id = $1 AND is_active) AS total_products,
                COALESCE(SUM(od.quantity * od.price), 0)::NUMERIC(12, 2) AS total_sales,
                COALESCE(SUM(od.quantity), 0)::BIGINT AS units_sold,
                COUNT(DISTINCT od.order_id) AS total_orders,
                (
                    SELECT ROUND(COALESCE(AVG(rating), 5.0), 1)
                    FROM products WHERE seller_id = $1 AND is_active
                ) AS rating
            FROM order_details od
            JOIN products p ON p.product_id = od.product_id
            JOIN orders o ON o.order_id = od.order_id
            WHERE p.seller_id = $1 AND o.status <> 'cancelled'
            ",
        )
        .bind(seller_id)
        .fetch_one(self.pool)
        .await?;

        Ok(SellerStats {
            total_products: row.total_products,
            total_sales: row.total_sales,
            units_sold: row.units_sold,
            total_orders: row.total_orders,
            rating: row.rating,
        })
    }

    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn seller_exists(&self, seller_id: PersonId) -> Result<bool, RepositoryError> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM seller WHERE seller_id = $1)")
                .bind(seller_id)
                .fetch_one(self.pool)
                .await?;
        Ok(exists)
    }
}
