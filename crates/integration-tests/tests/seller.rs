//! Seller dashboard flows.
//!
//! Requires a running storefront on a migrated database.

use chaldal_integration_tests::{add_product, base_url, client, decimal, expect_json, get, id, sign_up};
use reqwest::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_product_lifecycle() {
    let seller = client();
    let seller_id = id(&sign_up(&seller, "seller", None).await, "user_id");
    let product_id = add_product(&seller, seller_id, "Integration Tea", "210.00", 12).await;

    let detail = expect_json(
        get(&seller, &format!("/api/products/{product_id}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(detail["unit"], "1 pcs");

    let updated = seller
        .put(format!("{}/api/products/{product_id}", base_url()))
        .json(&json!({ "price": "199.00", "stock_quantity": 0 }))
        .send()
        .await
        .expect("request failed");
    assert_eq!(updated.status(), StatusCode::OK);

    let detail = expect_json(
        get(&seller, &format!("/api/products/{product_id}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(decimal(&detail, "price"), Decimal::new(199, 0));
    assert_eq!(detail["stock"], 0);

    let removed = seller
        .delete(format!("{}/api/products/{product_id}", base_url()))
        .send()
        .await
        .expect("request failed");
    assert_eq!(removed.status(), StatusCode::OK);

    assert_eq!(
        get(&seller, &format!("/api/products/{product_id}")).await.status(),
        StatusCode::NOT_FOUND
    );

    let listed = expect_json(
        get(&seller, &format!("/api/seller/products/{seller_id}")).await,
        StatusCode::OK,
    )
    .await;
    let row = listed
        .as_array()
        .and_then(|rows| rows.iter().find(|r| r["product_id"] == product_id))
        .expect("deactivated product still listed for its seller");
    assert_eq!(row["is_active"], false);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_stats_for_new_seller() {
    let seller = client();
    let seller_id = id(&sign_up(&seller, "seller", None).await, "user_id");
    add_product(&seller, seller_id, "Integration Soap", "45.00", 100).await;

    let stats = expect_json(
        get(&seller, &format!("/api/seller/stats/{seller_id}")).await,
        StatusCode::OK,
    )
    .await;
    assert_eq!(stats["total_products"], 1);
    assert_eq!(stats["total_orders"], 0);
    assert_eq!(decimal(&stats, "total_sales"), Decimal::ZERO);
}

#[tokio::test]
#[ignore = "Requires running storefront and database"]
async fn test_customer_is_not_a_seller() {
    let customer = client();
    let user_id = id(&sign_up(&customer, "user", None).await, "user_id");

    let body = expect_json(
        get(&customer, &format!("/api/seller/stats/{user_id}")).await,
        StatusCode::NOT_FOUND,
    )
    .await;
    assert_eq!(body["error"], "Seller not found");
}
