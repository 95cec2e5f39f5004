//! Categories, delivery areas and delivery-fee lookup.
//!
//! All three read from the in-memory cache.

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use chaldal_core::pricing::DEFAULT_DELIVERY_FEE;

use crate::db::areas::fee_for;
use crate::error::Result;
use crate::models::{Area, Category};
use crate::state::AppState;

/// GET /api/categories
pub async fn categories(State(state): State<AppState>) -> Result<Json<Vec<Category>>> {
    let categories = state.cache().categories(state.pool()).await?;
    Ok(Json(categories.as_ref().clone()))
}

/// GET /api/areas
pub async fn areas(State(state): State<AppState>) -> Result<Json<Vec<Area>>> {
    let areas = state.cache().areas(state.pool()).await?;
    Ok(Json(areas.as_ref().clone()))
}

#[derive(Debug, Deserialize)]
pub struct DeliveryFeeQuery {
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeliveryFeeResponse {
    /// Matched area name, `null` when the default fee applies.
    pub area: Option<String>,
    pub delivery_fee: Decimal,
}

/// Fee for a typed address.
///
/// GET /api/delivery-fee?address=...
pub async fn delivery_fee(
    State(state): State<AppState>,
    Query(query): Query<DeliveryFeeQuery>,
) -> Result<Json<DeliveryFeeResponse>> {
    let Some(address) = query
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
    else {
        return Ok(Json(DeliveryFeeResponse {
            area: None,
            delivery_fee: DEFAULT_DELIVERY_FEE,
        }));
    };

    let areas = state.cache().areas(state.pool()).await?;
    let (area, delivery_fee) = fee_for(&areas, address);

    Ok(Json(DeliveryFeeResponse {
        area: area.map(|a| a.name),
        delivery_fee,
    }))
}
