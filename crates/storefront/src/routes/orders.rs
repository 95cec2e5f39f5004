//! Order placement and lookup.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use chaldal_core::pricing::Bill;
use chaldal_core::{AddressId, OrderId, PersonId};

use crate::db::OrderRepository;
use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::Order;
use crate::routes::cart::CartLine;
use crate::routes::users::ensure_may_read;
use crate::services::CheckoutService;
use crate::services::checkout::{CartItem, PlaceOrder};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Billing {
    pub coupon_code: Option<String>,
}

/// The checkout form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub address: Option<String>,
    pub label: Option<String>,
    pub payment_method: Option<String>,
    #[serde(default)]
    pub billing: Billing,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub customer: Customer,
    pub items: Vec<CartLine>,
    /// Total the browser computed. Only logged when it disagrees.
    pub total: Option<Decimal>,
    pub user_id: Option<PersonId>,
    #[serde(alias = "address_id")]
    pub address_id: Option<AddressId>,
}

impl PlaceOrderRequest {
    /// Build the service input. A logged-in session overrides the body's
    /// `userId`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Unauthorized` when neither names a user.
    pub fn into_place_order(self, session_user: Option<PersonId>) -> Result<PlaceOrder> {
        let user_id = session_user
            .or(self.user_id)
            .ok_or_else(|| AppError::Unauthorized("Please log in to place an order".to_string()))?;

        Ok(PlaceOrder {
            user_id,
            recipient_name: self.customer.name,
            phone: self.customer.phone,
            payment_method: self.customer.payment_method,
            coupon_code: self.customer.billing.coupon_code,
            address_id: self.address_id,
            address: self.customer.address,
            label: self.customer.label,
            items: self.items.into_iter().map(CartItem::from).collect(),
            client_total: self.total,
        })
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub message: &'static str,
    pub order_id: OrderId,
    pub payment_id: chaldal_core::PaymentId,
    pub address_id: AddressId,
    pub bill: Bill,
}

/// Place an order.
///
/// POST /api/orders
#[instrument(skip(state, user, request), fields(lines = request.items.len()))]
pub async fn create(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Json(request): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlaceOrderResponse>)> {
    let order = request.into_place_order(user.map(|u| u.id))?;
    add_breadcrumb("checkout", "Placing order", None);

    let placed = CheckoutService::new(state.pool(), state.cache())
        .place_order(order)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PlaceOrderResponse {
            message: "Order placed successfully!",
            order_id: placed.order_id,
            payment_id: placed.payment_id,
            address_id: placed.address.address_id,
            bill: placed.bill,
        }),
    ))
}

/// Order with its lines and payment. Only the customer who placed it, or an
/// admin, may read it.
///
/// GET /api/orders/{id}
#[instrument(skip(state, user))]
pub async fn show(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>> {
    let order = OrderRepository::new(state.pool())
        .get_with_details(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;
    ensure_may_read(Some(&user), order.user_id)?;
    Ok(Json(order))
}
