//! Storefront cart routes over a mocked hosted backend.
//!
//! Guests are tracked by the session cookie; signing in is simulated by
//! writing the user into the session store, as the auth callback does.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use axum::http::StatusCode;
use httpmock::prelude::*;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use dokan_integration_tests::{
    ANON_KEY, TestApp, json_body, product_json, session_cookie, text_body,
};
use dokan_storefront::models::CurrentUser;

const RICE: &str = "5a1f4b1e-93c2-4c57-a7a0-7d2e8c3b9f10";
const DAL: &str = "7b2e5c2f-a4d3-4d68-b8b1-8e3f9d4c0a21";
const USER: &str = "0f9e8d7c-6b5a-4f3e-9d2c-1b0a9f8e7d6c";
const ROW: &str = "c1d2e3f4-0000-4000-8000-000000000001";

fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => s.parse().unwrap(),
        other => other.to_string().parse().unwrap(),
    }
}

fn user() -> CurrentUser {
    CurrentUser {
        id: USER.parse().unwrap(),
        email: Some("rahim@example.com.bd".to_string()),
        access_token: "user-jwt".to_string(),
    }
}

async fn mock_catalog(app: &TestApp) {
    app.backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/products")
                .header("apikey", ANON_KEY);
            then.status(200)
                .json_body(json!([product_json(RICE, "Miniket Rice", 78)]));
        })
        .await;
}

/// Start a guest cart holding two bags of rice and return its cookie.
async fn guest_with_rice(app: &TestApp) -> String {
    let response = app
        .post("/cart/add", &format!("product_id={RICE}&quantity=2"), None)
        .await;
    let cookie = session_cookie(&response);
    json_body(response, StatusCode::OK).await;
    cookie
}

#[tokio::test]
async fn guest_cart_lives_in_the_session() {
    let app = TestApp::start().await;
    mock_catalog(&app).await;

    let response = app
        .post("/cart/add", &format!("product_id={RICE}&quantity=2"), None)
        .await;
    assert_eq!(response.headers()["hx-trigger"], "cart-updated");
    let cookie = session_cookie(&response);
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["mode"], "anonymous");
    assert_eq!(body["item_count"], 2);

    let response = app
        .post("/cart/add", &format!("product_id={RICE}"), Some(&cookie))
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["lines"].as_array().unwrap().len(), 1);
    assert_eq!(body["lines"][0]["quantity"], 3);
    assert_eq!(body["lines"][0]["line_total"], "৳234.00");
    assert_eq!(decimal(&body["subtotal"]), Decimal::new(234, 0));

    let response = app.get("/cart/count", Some(&cookie)).await;
    assert_eq!(json_body(response, StatusCode::OK).await, json!({"count": 3}));

    // A visitor without the cookie has their own cart
    let response = app.get("/cart/count", None).await;
    assert_eq!(json_body(response, StatusCode::OK).await, json!({"count": 0}));
}

#[tokio::test]
async fn guest_update_to_zero_removes_the_line() {
    let app = TestApp::start().await;
    mock_catalog(&app).await;
    let cookie = guest_with_rice(&app).await;

    let response = app
        .post(
            "/cart/update",
            &format!("line_id={RICE}&quantity=0"),
            Some(&cookie),
        )
        .await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["item_count"], 0);
    assert!(body["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn signing_in_switches_to_the_remote_cart() {
    let app = TestApp::start().await;
    mock_catalog(&app).await;
    let cookie = guest_with_rice(&app).await;

    let rows = app
        .backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/cart_items")
                .query_param("user_id", format!("eq.{USER}"))
                .header("authorization", "Bearer user-jwt");
            then.status(200).json_body(json!([{
                "id": ROW,
                "product_id": DAL,
                "quantity": 4,
                "products": product_json(DAL, "Masoor Dal", 140)
            }]));
        })
        .await;

    app.sign_in(&cookie, &user()).await;

    let response = app.get("/cart", Some(&cookie)).await;
    let body = json_body(response, StatusCode::OK).await;
    rows.assert_async().await;
    assert_eq!(body["mode"], "authenticated");
    assert_eq!(body["item_count"], 4, "guest rice is not merged in");
    assert_eq!(body["lines"][0]["line_id"], ROW);
    assert_eq!(decimal(&body["total"]), Decimal::new(560, 0));
}

#[tokio::test]
async fn signed_in_update_patches_the_users_row() {
    let app = TestApp::start().await;
    mock_catalog(&app).await;
    let cookie = guest_with_rice(&app).await;
    app.sign_in(&cookie, &user()).await;

    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/cart_items");
            then.status(200).json_body(json!([{
                "id": ROW,
                "product_id": DAL,
                "quantity": 1,
                "products": [product_json(DAL, "Masoor Dal", 140)]
            }]));
        })
        .await;
    let patch = app
        .backend
        .mock_async(|when, then| {
            when.method(httpmock::Method::PATCH)
                .path("/rest/v1/cart_items")
                .query_param("id", format!("eq.{ROW}"))
                .query_param("user_id", format!("eq.{USER}"))
                .json_body(json!({"quantity": 3}));
            then.status(204);
        })
        .await;

    let response = app
        .post(
            "/cart/update",
            &format!("line_id={ROW}&quantity=3"),
            Some(&cookie),
        )
        .await;
    json_body(response, StatusCode::OK).await;
    patch.assert_async().await;
}

#[tokio::test]
async fn failed_remote_write_is_reported() {
    let app = TestApp::start().await;
    mock_catalog(&app).await;
    let cookie = guest_with_rice(&app).await;
    app.sign_in(&cookie, &user()).await;

    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/cart_items");
            then.status(200).json_body(json!([]));
        })
        .await;
    app.backend
        .mock_async(|when, then| {
            when.method(POST).path("/rest/v1/cart_items");
            then.status(503).body("upstream unavailable");
        })
        .await;

    let response = app
        .post("/cart/add", &format!("product_id={RICE}"), Some(&cookie))
        .await;
    let body = text_body(response, StatusCode::BAD_GATEWAY).await;
    assert_eq!(body, "Cart service unavailable, please try again");
}

#[tokio::test]
async fn failed_refresh_shows_an_empty_cart() {
    let app = TestApp::start().await;
    mock_catalog(&app).await;
    let cookie = guest_with_rice(&app).await;
    app.sign_in(&cookie, &user()).await;

    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/cart_items");
            then.status(500).json_body(json!({"message": "boom"}));
        })
        .await;

    let response = app.get("/cart", Some(&cookie)).await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["mode"], "authenticated");
    assert_eq!(body["item_count"], 0);
}

#[tokio::test]
async fn coupon_is_validated_and_remembered() {
    let app = TestApp::start().await;
    mock_catalog(&app).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/coupons")
                .query_param("code", "eq.SAVE10");
            then.status(200).json_body(json!([{
                "id": "9e3b8a54-1c2d-4e5f-8a9b-0c1d2e3f4a5b",
                "code": "SAVE10",
                "discount_type": "percentage",
                "discount_value": 10,
                "min_order_amount": 100,
                "max_discount_amount": null,
                "is_active": true,
                "starts_at": null,
                "expires_at": null,
                "usage_limit": null,
                "used_count": 0
            }]));
        })
        .await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET)
                .path("/rest/v1/coupons")
                .query_param("code", "eq.BOGUS");
            then.status(200).json_body(json!([]));
        })
        .await;
    let cookie = guest_with_rice(&app).await;

    let response = app.post("/cart/coupon", "code=bogus", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.post("/cart/coupon", "code=save10", Some(&cookie)).await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["coupon_code"], "SAVE10");
    assert_eq!(decimal(&body["discount"]), Decimal::new(156, 1));

    // Remembered on later reads
    let response = app.get("/cart", Some(&cookie)).await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(decimal(&body["total"]), Decimal::new(1404, 1));

    let response = app.post("/cart/coupon/remove", "", Some(&cookie)).await;
    let body = json_body(response, StatusCode::OK).await;
    assert_eq!(body["coupon_code"], Value::Null);
    assert_eq!(decimal(&body["total"]), Decimal::new(156, 0));
}

#[tokio::test]
async fn coupon_below_minimum_is_rejected() {
    let app = TestApp::start().await;
    mock_catalog(&app).await;
    app.backend
        .mock_async(|when, then| {
            when.method(GET).path("/rest/v1/coupons");
            then.status(200).json_body(json!([{
                "id": "9e3b8a54-1c2d-4e5f-8a9b-0c1d2e3f4a5b",
                "code": "BIGSHOP",
                "discount_type": "fixed",
                "discount_value": 200,
                "min_order_amount": 2000,
                "is_active": true
            }]));
        })
        .await;
    let cookie = guest_with_rice(&app).await;

    let response = app.post("/cart/coupon", "code=BIGSHOP", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
