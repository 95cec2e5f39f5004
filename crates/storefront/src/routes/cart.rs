//! Cart pricing.
//!
//! The cart itself lives in the browser. The server only prices it so the
//! totals shown before checkout match what the order will charge.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use chaldal_core::ProductId;
use chaldal_core::pricing::Bill;

use crate::error::Result;
use crate::services::CheckoutService;
use crate::services::checkout::CartItem;
use crate::state::AppState;

/// One cart line as the frontend stores it.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CartLine {
    #[serde(alias = "product_id")]
    pub id: ProductId,
    #[serde(alias = "quantity")]
    pub qty: i32,
}

impl From<CartLine> for CartItem {
    fn from(line: CartLine) -> Self {
        Self {
            product_id: line.id,
            quantity: line.qty,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    pub items: Vec<CartLine>,
    pub coupon_code: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    #[serde(flatten)]
    pub bill: Bill,
    pub item_count: i64,
}

/// Price a cart.
///
/// POST /api/cart/quote
#[instrument(skip(state, request), fields(lines = request.items.len()))]
pub async fn quote(
    State(state): State<AppState>,
    Json(request): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>> {
    let items: Vec<CartItem> = request.items.into_iter().map(CartItem::from).collect();

    let bill = CheckoutService::new(state.pool(), state.cache())
        .quote(
            &items,
            request.coupon_code.as_deref(),
            request.address.as_deref(),
        )
        .await?;

    Ok(Json(QuoteResponse {
        item_count: bill.item_count(),
        bill,
    }))
}
