//! Product route handlers.
//!
//! Listing and detail are public. Create, update and deactivate are the
//! seller dashboard's product management calls.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use chaldal_core::catalog::{ProductFilter, ProductSort};
use chaldal_core::{CategoryId, PersonId, ProductId};

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::state::AppState;

/// Unit used when a product form leaves it blank.
pub const DEFAULT_UNIT: &str = "1 pcs";

/// Column widths of `products.name` and `products.unit`.
pub const MAX_PRODUCT_NAME_LEN: usize = 200;
pub const MAX_UNIT_LEN: usize = 50;

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub in_stock: Option<bool>,
    pub max_price: Option<String>,
    pub sort: Option<String>,
}

impl ProductQuery {
    /// Normalize the raw query into a filter.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unparseable price or sort key.
    pub fn into_filter(self) -> Result<ProductFilter> {
        let max_price = self
            .max_price
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| {
                p.parse::<Decimal>()
                    .map_err(|_| AppError::BadRequest(format!("Invalid max_price: {p}")))
            })
            .transpose()?;

        let sort = match self.sort.as_deref().map(str::trim) {
            None | Some("") => ProductSort::default(),
            Some(s) => s
                .parse::<ProductSort>()
                .map_err(|e| AppError::BadRequest(e.to_string()))?,
        };

        Ok(ProductFilter::new()
            .with_query(self.q.as_deref())
            .with_category(self.category.as_deref())
            .with_in_stock_only(self.in_stock.unwrap_or(false))
            .with_max_price(max_price)
            .with_sort(sort))
    }
}

/// List active products.
///
/// GET /api/products
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> Result<Json<Vec<Product>>> {
    let filter = query.into_filter()?;
    let products = CatalogRepository::new(state.pool())
        .list_products(&filter)
        .await?;
    Ok(Json(products))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub q: Option<String>,
}

/// Search-box suggestions.
///
/// GET /api/products/suggestions
#[instrument(skip(state))]
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<Product>>> {
    let q = query.q.as_deref().map(str::trim).unwrap_or_default();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }
    let products = CatalogRepository::new(state.pool()).suggestions(q).await?;
    Ok(Json(products))
}

/// Product detail.
///
/// GET /api/products/{id}
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    CatalogRepository::new(state.pool())
        .get_product(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
}

/// Seller dashboard product form.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub unit: Option<String>,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image_url: Option<String>,
    pub category_id: CategoryId,
    pub seller_id: PersonId,
}

impl CreateProductRequest {
    fn validate(self) -> Result<NewProduct> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(AppError::BadRequest("Product name is required".to_string()));
        }
        if self.price < Decimal::ZERO {
            return Err(AppError::BadRequest("Price cannot be negative".to_string()));
        }
        if self.stock_quantity < 0 {
            return Err(AppError::BadRequest("Stock cannot be negative".to_string()));
        }
        check_len("Product name", name, MAX_PRODUCT_NAME_LEN)?;
        let unit = non_blank(self.unit).unwrap_or_else(|| DEFAULT_UNIT.to_owned());
        check_len("Unit", &unit, MAX_UNIT_LEN)?;

        Ok(NewProduct {
            name: name.to_owned(),
            unit,
            price: self.price,
            stock: self.stock_quantity,
            image_url: non_blank(self.image_url),
            category_id: self.category_id,
            seller_id: self.seller_id,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductResponse {
    pub message: &'static str,
    pub product_id: ProductId,
}

/// Add a product.
///
/// POST /api/products
#[instrument(skip(state, request), fields(seller_id = %request.seller_id))]
pub async fn create(
    State(state): State<AppState>,
    Json(request): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<CreateProductResponse>)> {
    let new = request.validate()?;
    let catalog = CatalogRepository::new(state.pool());

    if !catalog.seller_exists(new.seller_id).await? {
        return Err(AppError::NotFound("Seller not found".to_string()));
    }

    let product_id = catalog.create_product(&new).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateProductResponse {
            message: "Product added",
            product_id,
        }),
    ))
}

/// Partial product edit. Omitted fields keep their value.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub unit: Option<String>,
    pub price: Option<Decimal>,
    #[serde(alias = "stock")]
    pub stock_quantity: Option<i32>,
    pub image_url: Option<String>,
    pub category_id: Option<CategoryId>,
    pub is_active: Option<bool>,
}

impl UpdateProductRequest {
    fn validate(self) -> Result<ProductUpdate> {
        let name = match self.name {
            Some(name) if name.trim().is_empty() => {
                return Err(AppError::BadRequest("Product name is required".to_string()));
            }
            other => other.map(|n| n.trim().to_owned()),
        };
        if self.price.is_some_and(|p| p < Decimal::ZERO) {
            return Err(AppError::BadRequest("Price cannot be negative".to_string()));
        }
        if self.stock_quantity.is_some_and(|s| s < 0) {
            return Err(AppError::BadRequest("Stock cannot be negative".to_string()));
        }
        if let Some(name) = &name {
            check_len("Product name", name, MAX_PRODUCT_NAME_LEN)?;
        }
        let unit = non_blank(self.unit);
        if let Some(unit) = &unit {
            check_len("Unit", unit, MAX_UNIT_LEN)?;
        }

        let update = ProductUpdate {
            name,
            unit,
            price: self.price,
            stock: self.stock_quantity,
            image_url: non_blank(self.image_url),
            category_id: self.category_id,
            is_active: self.is_active,
        };
        if update.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }
        Ok(update)
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// Edit a product.
///
/// PUT /api/products/{id}
#[instrument(skip(state, request))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Json(request): Json<UpdateProductRequest>,
) -> Result<Json<MessageResponse>> {
    let update = request.validate()?;
    CatalogRepository::new(state.pool())
        .update_product(id, &update)
        .await
        .map_err(|e| not_found_as("Product not found", e))?;
    Ok(Json(MessageResponse {
        message: "Product updated",
    }))
}

/// Hide a product from the storefront.
///
/// DELETE /api/products/{id}
#[instrument(skip(state))]
pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<MessageResponse>> {
    CatalogRepository::new(state.pool())
        .deactivate_product(id)
        .await
        .map_err(|e| not_found_as("Product not found", e))?;
    Ok(Json(MessageResponse {
        message: "Product deactivated",
    }))
}

fn not_found_as(message: &str, err: crate::db::RepositoryError) -> AppError {
    match err {
        crate::db::RepositoryError::NotFound => AppError::NotFound(message.to_string()),
        other => AppError::Database(other),
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(AppError::BadRequest(format!(
            "{field} must be at most {max} characters"
        )));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn create_request() -> CreateProductRequest {
        CreateProductRequest {
            name: "  Miniket Rice ".to_string(),
            unit: Some(" ".to_string()),
            price: Decimal::new(85, 0),
            stock_quantity: 40,
            image_url: None,
            category_id: CategoryId::new(1),
            seller_id: PersonId::new(7),
        }
    }

    #[test]
    fn test_create_defaults_unit_and_trims_name() {
        let new = create_request().validate().unwrap();
        assert_eq!(new.name, "Miniket Rice");
        assert_eq!(new.unit, DEFAULT_UNIT);
    }

    #[test]
    fn test_create_rejects_negative_values() {
        let negative_price = CreateProductRequest {
            price: Decimal::new(-1, 0),
            ..create_request()
        };
        assert!(matches!(
            negative_price.validate(),
            Err(AppError::BadRequest(_))
        ));

        let negative_stock = CreateProductRequest {
            stock_quantity: -3,
            ..create_request()
        };
        assert!(matches!(
            negative_stock.validate(),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_overlong_text_fields_are_rejected() {
        let long_name = CreateProductRequest {
            name: "a".repeat(MAX_PRODUCT_NAME_LEN + 1),
            ..create_request()
        };
        assert!(matches!(
            long_name.validate(),
            Err(AppError::BadRequest(m)) if m == "Product name must be at most 200 characters"
        ));

        let long_unit = CreateProductRequest {
            unit: Some("k".repeat(MAX_UNIT_LEN + 1)),
            ..create_request()
        };
        assert!(matches!(long_unit.validate(), Err(AppError::BadRequest(_))));

        let long_update = UpdateProductRequest {
            unit: Some("g".repeat(MAX_UNIT_LEN + 1)),
            ..UpdateProductRequest::default()
        };
        assert!(matches!(
            long_update.validate(),
            Err(AppError::BadRequest(_))
        ));

        let at_limit = CreateProductRequest {
            name: "a".repeat(MAX_PRODUCT_NAME_LEN),
            ..create_request()
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_update_requires_a_field() {
        assert!(matches!(
            UpdateProductRequest::default().validate(),
            Err(AppError::BadRequest(_))
        ));

        let update = UpdateProductRequest {
            stock_quantity: Some(0),
            ..UpdateProductRequest::default()
        }
        .validate()
        .unwrap();
        assert_eq!(update.stock, Some(0));
    }

    #[test]
    fn test_query_into_filter() {
        let filter = ProductQuery {
            q: Some("  ".to_string()),
            category: Some("Dairy".to_string()),
            in_stock: Some(true),
            max_price: Some("120.50".to_string()),
            sort: Some("price-desc".to_string()),
        }
        .into_filter()
        .unwrap();
        assert_eq!(filter.category(), Some("Dairy"));
        assert!(filter.in_stock_only());
        assert_eq!(filter.max_price(), Some(Decimal::new(12050, 2)));
        assert_eq!(filter.sort(), ProductSort::PriceDesc);

        let bad_sort = ProductQuery {
            sort: Some("random".to_string()),
            ..ProductQuery::default()
        };
        assert!(bad_sort.into_filter().is_err());
    }
}
