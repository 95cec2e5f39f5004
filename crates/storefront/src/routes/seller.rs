//! Seller dashboard reads.

use axum::{
    Json,
    extract::{Path, State},
};
use tracing::instrument;

use chaldal_core::PersonId;

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::models::{SellerProduct, SellerStats};
use crate::state::AppState;

/// All of a seller's products, including deactivated ones.
///
/// GET /api/seller/products/{seller_id}
#[instrument(skip(state))]
pub async fn products(
    State(state): State<AppState>,
    Path(seller_id): Path<PersonId>,
) -> Result<Json<Vec<SellerProduct>>> {
    let catalog = CatalogRepository::new(state.pool());
    ensure_seller(&catalog, seller_id).await?;
    Ok(Json(catalog.seller_products(seller_id).await?))
}

/// Dashboard totals.
///
/// GET /api/seller/stats/{seller_id}
#[instrument(skip(state))]
pub async fn stats(
    State(state): State<AppState>,
    Path(seller_id): Path<PersonId>,
) -> Result<Json<SellerStats>> {
    let catalog = CatalogRepository::new(state.pool());
    ensure_seller(&catalog, seller_id).await?;
    Ok(Json(catalog.seller_stats(seller_id).await?))
}

async fn ensure_seller(catalog: &CatalogRepository<'_>, seller_id: PersonId) -> Result<()> {
    if catalog.seller_exists(seller_id).await? {
        Ok(())
    } else {
        Err(AppError::NotFound("Seller not found".to_string()))
    }
}
