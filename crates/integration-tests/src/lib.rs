//! End-to-end tests for the Chaldal storefront API.
//!
//! The tests talk HTTP to a running storefront whose database has been
//! migrated and seeded.
//!
//! # Running Tests
//!
//! ```bash
//! chaldal-cli migrate && chaldal-cli seed
//! cargo run -p chaldal-storefront &
//! cargo test -p chaldal-integration-tests -- --ignored
//! ```
//!
//! `STOREFRONT_BASE_URL` overrides the default `http://localhost:3000`.

use std::str::FromStr;

use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use uuid::Uuid;

/// Base URL of the storefront under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// A cookie-carrying client with its own rate-limit bucket.
///
/// Each client claims a distinct forwarded address so that tests running in
/// parallel do not share the signup/login limiter.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
pub fn client() -> Client {
    let [a, b, c, ..] = Uuid::new_v4().into_bytes();
    let ip = format!("10.{a}.{b}.{c}");

    let mut headers = HeaderMap::new();
    headers.insert(
        "x-forwarded-for",
        HeaderValue::from_str(&ip).expect("valid header value"),
    );

    Client::builder()
        .cookie_store(true)
        .default_headers(headers)
        .build()
        .expect("Failed to create HTTP client")
}

/// An email no other test run has used.
#[must_use]
pub fn unique_email(prefix: &str) -> String {
    format!("{prefix}-{}@integration.test", Uuid::new_v4().simple())
}

/// GET `{base}{path}`.
///
/// # Panics
///
/// Panics if the request cannot be sent.
pub async fn get(client: &Client, path: &str) -> Response {
    client
        .get(format!("{}{path}", base_url()))
        .send()
        .await
        .expect("request failed")
}

/// POST JSON to `{base}{path}`.
///
/// # Panics
///
/// Panics if the request cannot be sent.
pub async fn post(client: &Client, path: &str, body: &Value) -> Response {
    client
        .post(format!("{}{path}", base_url()))
        .json(body)
        .send()
        .await
        .expect("request failed")
}

/// Read a JSON body, asserting the status first.
///
/// # Panics
///
/// Panics on an unexpected status or a non-JSON body.
pub async fn expect_json(response: Response, status: StatusCode) -> Value {
    let actual = response.status();
    let body: Value = response.json().await.expect("response is not JSON");
    assert_eq!(actual, status, "unexpected status, body: {body}");
    body
}

/// Sign up through the API and return the `user` object.
///
/// The client keeps the session cookie.
///
/// # Panics
///
/// Panics unless the signup succeeds.
pub async fn sign_up(client: &Client, role: &str, address: Option<&str>) -> Value {
    let body = json!({
        "fullName": format!("Integration {role}"),
        "email": unique_email(role),
        "password": "secret123",
        "role": role,
        "address": address,
    });
    let response = post(client, "/api/signup", &body).await;
    expect_json(response, StatusCode::CREATED).await["user"].clone()
}

/// Read an integer id field.
///
/// # Panics
///
/// Panics if the field is missing or not an integer.
#[must_use]
pub fn id(value: &Value, field: &str) -> i64 {
    value[field]
        .as_i64()
        .unwrap_or_else(|| panic!("missing integer field {field} in {value}"))
}

/// Read a decimal field serialized either as a string or a number.
///
/// # Panics
///
/// Panics if the field is missing or not a decimal.
#[must_use]
pub fn decimal(value: &Value, field: &str) -> Decimal {
    match &value[field] {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("field {field} is not a decimal: {other}"),
    }
}

/// The first category id in the catalog.
///
/// # Panics
///
/// Panics if the catalog has no categories.
pub async fn any_category(client: &Client) -> i64 {
    let categories = expect_json(get(client, "/api/categories").await, StatusCode::OK).await;
    id(
        categories
            .as_array()
            .and_then(|c| c.first())
            .expect("seeded categories"),
        "category_id",
    )
}

/// Add a product for a seller and return its id.
///
/// # Panics
///
/// Panics unless the product is created.
pub async fn add_product(client: &Client, seller_id: i64, name: &str, price: &str, stock: i32) -> i64 {
    let category_id = any_category(client).await;
    let body = json!({
        "name": name,
        "price": price,
        "stock_quantity": stock,
        "category_id": category_id,
        "seller_id": seller_id,
    });
    let created = expect_json(post(client, "/api/products", &body).await, StatusCode::CREATED).await;
    id(&created, "productId")
}
