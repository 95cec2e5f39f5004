//! Signup, login and session flows.
//!
//! Requires a running storefront on a migrated database.

use chaldal_integration_tests::{client, expect_json, get, post, sign_up, unique_email};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_signup_then_me() {
    let client = client();
    let user = sign_up(&client, "user", Some("House 12, Road 5, Dhanmondi, Dhaka")).await;

    assert_eq!(user["role"], "user");
    assert!(user["address_id"].is_i64(), "signup address was saved: {user}");

    let me = expect_json(get(&client, "/api/me").await, StatusCode::OK).await;
    assert_eq!(me["user_id"], user["user_id"]);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_duplicate_email_rejected() {
    let client = client();
    let email = unique_email("dup");
    let body = json!({
        "fullName": "First Person",
        "email": email,
        "password": "secret123",
    });

    let first = expect_json(
        post(&client, "/api/signup", &body).await,
        StatusCode::CREATED,
    )
    .await;
    assert_eq!(first["message"], "user registered successfully!");

    let second = expect_json(
        post(&client, "/api/signup", &body).await,
        StatusCode::BAD_REQUEST,
    )
    .await;
    assert_eq!(second["error"], "Email or Phone already exists");
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_login_and_logout() {
    let client = client();
    let email = unique_email("login");
    let signup = json!({
        "fullName": "Login Person",
        "email": email,
        "password": "secret123",
    });
    assert_eq!(
        post(&client, "/api/signup", &signup).await.status(),
        StatusCode::CREATED
    );

    let logout = post(&client, "/api/logout", &json!({})).await;
    assert_eq!(logout.status(), StatusCode::NO_CONTENT);
    assert_eq!(get(&client, "/api/me").await.status(), StatusCode::UNAUTHORIZED);

    let wrong = expect_json(
        post(&client, "/api/login", &json!({ "email": email, "password": "nope123" })).await,
        StatusCode::UNAUTHORIZED,
    )
    .await;
    assert_eq!(wrong["error"], "Invalid Password");

    let ok = expect_json(
        post(&client, "/api/login", &json!({ "email": email, "password": "secret123" })).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(ok["message"], "Login successful");
    assert_eq!(get(&client, "/api/me").await.status(), StatusCode::OK);
}
