//! HTTP route handlers for the storefront API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                - Welcome text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Readiness (database reachable)
//!
//! # Catalog
//! GET  /api/products                    - Listing (q, category, in_stock, max_price, sort)
//! GET  /api/products/suggestions        - Search-box suggestions
//! GET  /api/products/{id}               - Product detail
//! GET  /api/categories                  - Categories
//! GET  /api/areas                       - Delivery areas
//! GET  /api/delivery-fee                - Fee for a typed address
//!
//! # Auth (strict rate limit on signup/login)
//! POST /api/signup                      - Register any role
//! POST /api/login                       - Email + password
//! POST /api/logout                      - End session
//! GET  /api/me                          - Current user
//!
//! # Checkout
//! POST /api/cart/quote                  - Price a cart
//! POST /api/orders                      - Place an order
//! GET  /api/orders/{id}                 - Order with lines and payment (owner or admin)
//! GET  /api/users/{id}/orders           - Order history
//! GET  /api/users/{id}/addresses        - Saved addresses
//!
//! # Seller dashboard
//! POST   /api/products                  - Add product
//! PUT    /api/products/{id}             - Edit product
//! DELETE /api/products/{id}             - Deactivate product
//! GET    /api/seller/products/{id}      - Seller's products
//! GET    /api/seller/stats/{id}         - Seller totals
//! ```

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod orders;
pub mod products;
pub mod seller;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};

use crate::middleware::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Signup and login, behind the strict limiter.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .layer(auth_rate_limiter())
}

/// Product routes, nested under `/api/products`.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route("/suggestions", get(products::suggestions))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::deactivate),
        )
}

/// Seller dashboard routes, nested under `/api/seller`.
pub fn seller_routes() -> Router<AppState> {
    Router::new()
        .route("/products/{seller_id}", get(seller::products))
        .route("/stats/{seller_id}", get(seller::stats))
}

/// Everything else under `/api`, behind the relaxed limiter.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/products", product_routes())
        .nest("/seller", seller_routes())
        .route("/categories", get(catalog::categories))
        .route("/areas", get(catalog::areas))
        .route("/delivery-fee", get(catalog::delivery_fee))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
        .route("/cart/quote", post(cart::quote))
        .route("/orders", post(orders::create))
        .route("/orders/{id}", get(orders::show))
        .route("/users/{id}/orders", get(users::orders))
        .route("/users/{id}/addresses", get(users::addresses))
        .layer(api_rate_limiter())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", auth_routes().merge(api_routes()))
}

async fn welcome() -> &'static str {
    "Welcome to the Chaldal API"
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
