//! Router tests for request validation.
//!
//! Every request here is rejected before a query runs, so the pool is
//! connected lazily and no database is needed.

#![allow(clippy::unwrap_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use secrecy::SecretString;
use serde_json::{Value, json};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use chaldal_storefront::config::{LogFormat, StorefrontConfig};
use chaldal_storefront::state::AppState;

const CLIENT_IP: &str = "203.0.113.10";

fn test_app() -> Router {
    let config = StorefrontConfig {
        database_url: SecretString::from("postgres://localhost/chaldal_router_test"),
        db_max_connections: 1,
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        allowed_origins: vec!["http://localhost:5173".to_string()],
        log_format: LogFormat::Pretty,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 1.0,
        sentry_traces_sample_rate: 0.0,
    };
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_lazy("postgres://localhost/chaldal_router_test")
        .unwrap();
    chaldal_storefront::app(AppState::new(config, pool))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", CLIENT_IP)
        .body(Body::empty())
        .unwrap()
}

fn send_json(method: &str, uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", CLIENT_IP)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn expect_error(request: Request<Body>, status: StatusCode) -> String {
    let response = test_app().oneshot(request).await.unwrap();
    assert_eq!(response.status(), status);
    let body = json_body(response).await;
    body["error"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let response = test_app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn responses_carry_security_headers_and_request_id() {
    let request = Request::builder()
        .uri("/")
        .header("x-forwarded-for", CLIENT_IP)
        .header("x-request-id", "req-123")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers[header::CONTENT_SECURITY_POLICY],
        "default-src 'none'; frame-ancestors 'none'"
    );
    assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
    assert_eq!(headers["cross-origin-resource-policy"], "cross-origin");
    assert_eq!(headers["x-request-id"], "req-123");
}

#[tokio::test]
async fn cors_preflight_allows_frontend_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/api/orders")
        .header("x-forwarded-for", CLIENT_IP)
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = test_app().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn me_requires_login() {
    let message = expect_error(get("/api/me"), StatusCode::UNAUTHORIZED).await;
    assert_eq!(message, "Not logged in");
}

#[tokio::test]
async fn order_detail_requires_login() {
    let message = expect_error(get("/api/orders/1"), StatusCode::UNAUTHORIZED).await;
    assert_eq!(message, "Not logged in");
}

#[tokio::test]
async fn signup_rejects_unknown_role() {
    let body = json!({
        "fullName": "Tanvir Hasan",
        "email": "tanvir@example.com",
        "password": "secret123",
        "role": "superuser"
    });
    let message = expect_error(
        send_json("POST", "/api/signup", &body),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "Invalid role specified.");
}

#[tokio::test]
async fn signup_rejects_short_password() {
    let body = json!({
        "fullName": "Tanvir Hasan",
        "email": "tanvir@example.com",
        "password": "abc"
    });
    let message = expect_error(
        send_json("POST", "/api/signup", &body),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert!(message.contains("at least 6"));
}

#[tokio::test]
async fn quote_rejects_empty_cart_and_bad_coupon() {
    let empty = json!({ "items": [] });
    expect_error(
        send_json("POST", "/api/cart/quote", &empty),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let coupon = json!({ "items": [{ "id": 1, "qty": 1 }], "couponCode": "HALFOFF" });
    let message = expect_error(
        send_json("POST", "/api/cart/quote", &coupon),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "Invalid code. Try SAVE10 or FREESHIP.");
}

#[tokio::test]
async fn order_requires_a_user() {
    let body = json!({
        "customer": { "name": "Mitu", "phone": "01711223344", "address": "House 3, Road 8, Gulshan" },
        "items": [{ "id": 1, "qty": 1 }]
    });
    expect_error(
        send_json("POST", "/api/orders", &body),
        StatusCode::UNAUTHORIZED,
    )
    .await;
}

#[tokio::test]
async fn order_validation_runs_before_the_transaction() {
    let bad_phone = json!({
        "customer": { "name": "Mitu", "phone": "12345", "address": "House 3, Road 8, Gulshan" },
        "items": [{ "id": 1, "qty": 1 }],
        "userId": 1
    });
    expect_error(
        send_json("POST", "/api/orders", &bad_phone),
        StatusCode::BAD_REQUEST,
    )
    .await;

    let short_address = json!({
        "customer": { "name": "Mitu", "phone": "01711223344", "address": "Gulshan" },
        "items": [{ "id": 1, "qty": 1 }],
        "userId": 1
    });
    let message = expect_error(
        send_json("POST", "/api/orders", &short_address),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "Please enter a complete delivery address");

    let zero_quantity = json!({
        "customer": { "name": "Mitu", "phone": "01711223344", "address": "House 3, Road 8, Gulshan" },
        "items": [{ "id": 1, "qty": 0 }],
        "userId": 1
    });
    expect_error(
        send_json("POST", "/api/orders", &zero_quantity),
        StatusCode::BAD_REQUEST,
    )
    .await;
}

#[tokio::test]
async fn product_form_validation() {
    let negative_price = json!({
        "name": "Egg (Farm)",
        "price": -5,
        "stock_quantity": 10,
        "category_id": 1,
        "seller_id": 2
    });
    let message = expect_error(
        send_json("POST", "/api/products", &negative_price),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "Price cannot be negative");

    let message = expect_error(
        send_json("PUT", "/api/products/4", &json!({})),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "No fields to update");
}

#[tokio::test]
async fn listing_rejects_unknown_sort() {
    let message = expect_error(
        get("/api/products?sort=random"),
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(message, "unknown sort order: random");
}
