//! Integration tests for the order lifecycle.
//!
//! These tests require:
//! - A running `PostgreSQL` database with migrations applied
//! - The API server running (cargo run -p tamarind-api)
//! - A manager account, via `MANAGER_EMAIL` / `MANAGER_PASSWORD`
//!   (create one with `tam-cli manager create`)
//!
//! Run with: cargo test -p tamarind-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde_json::{Value, json};

use tamarind_cart::Cart;
use tamarind_core::{Price, ProductId};
use tamarind_integration_tests::{base_url, client, manager_credentials, unique_email};

const PASSWORD: &str = "integration-test-pw";

/// Login an existing account, keeping the auth cookie on the client.
async fn login(client: &Client, email: &str, password: &str) {
    let resp = client
        .post(format!("{}/api/v1/auth/login", base_url()))
        .json(&json!({"email": email, "password": password}))
        .send()
        .await
        .expect("login request failed");
    assert_eq!(resp.status(), StatusCode::OK, "login failed for {email}");
}

/// Register and login a fresh customer, returning its email.
async fn fresh_customer(client: &Client, prefix: &str) -> String {
    let email = unique_email(prefix);
    let resp = client
        .post(format!("{}/api/v1/user/register", base_url()))
        .json(&json!({"name": "Order Tester", "email": email, "password": PASSWORD}))
        .send()
        .await
        .expect("register request failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    login(client, &email, PASSWORD).await;
    email
}

/// Create a product as the configured manager, returning its id and price.
async fn create_product(manager: &Client, price: &str) -> (i64, Decimal) {
    let resp = manager
        .post(format!("{}/api/v1/product/add", base_url()))
        .json(&json!({
            "name": "Lifecycle Test Product",
            "price": price,
            "category": "test",
            "description": "Created by the order lifecycle test",
            "image": "https://cdn.example.com/lifecycle.jpg"
        }))
        .send()
        .await
        .expect("product create failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("product body not JSON");
    let id = body["data"]["id"].as_i64().expect("product id missing");
    let price: Decimal = body["data"]["price"]
        .as_str()
        .expect("price not a string")
        .parse()
        .expect("price not decimal");
    (id, price)
}

fn shipping() -> Value {
    json!({
        "phone": "9800000001",
        "streetAddress": "12 Lakeside Rd",
        "city": "Pokhara",
        "zipCode": "33700"
    })
}

#[tokio::test]
#[ignore = "requires running API server, database, and manager account"]
async fn test_checkout_confirm_and_double_confirm() {
    let base = base_url();

    let manager = client();
    let (manager_email, manager_password) = manager_credentials();
    login(&manager, &manager_email, &manager_password).await;
    let (product_id, price) = create_product(&manager, "10.00").await;

    let customer = client();
    fresh_customer(&customer, "lifecycle").await;

    // Create: 2 × 10.00 → 20.00, pending
    let resp = customer
        .post(format!("{base}/api/v1/orders"))
        .json(&json!({
            "items": [{"productId": product_id, "quantity": 2}],
            "shipping": shipping()
        }))
        .send()
        .await
        .expect("order create failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("order body not JSON");
    let order = &body["data"];
    let order_id = order["id"].as_i64().expect("order id missing");
    assert_eq!(order["status"], "pending");

    let total: Decimal = order["totalAmount"]
        .as_str()
        .expect("totalAmount not a string")
        .parse()
        .expect("totalAmount not decimal");
    assert_eq!(total, price * Decimal::from(2));
    assert_eq!(order["items"][0]["unitPrice"], "10.00");

    // Confirm payment: pending → confirmed
    let resp = customer
        .patch(format!("{base}/api/v1/orders/{order_id}/confirm-payment"))
        .send()
        .await
        .expect("confirm failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("confirm body not JSON");
    assert_eq!(body["data"]["status"], "confirmed");

    // A second confirm is a 400
    let resp = customer
        .patch(format!("{base}/api/v1/orders/{order_id}/confirm-payment"))
        .send()
        .await
        .expect("second confirm failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body not JSON");
    assert_eq!(body["message"], "Order is already confirmed or processed");
}

#[tokio::test]
#[ignore = "requires running API server, database, and manager account"]
async fn test_price_snapshot_survives_catalog_edit() {
    let base = base_url();

    let manager = client();
    let (manager_email, manager_password) = manager_credentials();
    login(&manager, &manager_email, &manager_password).await;
    let (product_id, _) = create_product(&manager, "15.00").await;

    let customer = client();
    fresh_customer(&customer, "snapshot").await;

    let resp = customer
        .post(format!("{base}/api/v1/orders"))
        .json(&json!({
            "items": [{"productId": product_id, "quantity": 1}],
            "shipping": shipping()
        }))
        .send()
        .await
        .expect("order create failed");
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.expect("order body not JSON");
    let order_id = body["data"]["id"].as_i64().expect("order id missing");

    // A new catalog entry at a different price must not touch the order
    // (the catalog has no price-edit endpoint, so the snapshot guarantee
    // is exercised against the persisted order re-read).
    let resp = customer
        .get(format!("{base}/api/v1/orders/{order_id}"))
        .send()
        .await
        .expect("order fetch failed");
    let body: Value = resp.json().await.expect("order body not JSON");
    assert_eq!(body["data"]["items"][0]["unitPrice"], "15.00");
    assert_eq!(body["data"]["totalAmount"], "15.00");
}

#[tokio::test]
#[ignore = "requires running API server and database"]
async fn test_unknown_product_rejected_and_nothing_persisted() {
    let base = base_url();
    let customer = client();
    fresh_customer(&customer, "ghost-product").await;

    let resp = customer
        .post(format!("{base}/api/v1/orders"))
        .json(&json!({
            "items": [{"productId": 99_999_999, "quantity": 1}],
            "shipping": shipping()
        }))
        .send()
        .await
        .expect("order create failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.expect("error body not JSON");
    assert_eq!(body["message"], "Product not found: 99999999");

    // No partial order was written
    let resp = customer
        .get(format!("{base}/api/v1/orders"))
        .send()
        .await
        .expect("orders list failed");
    let body: Value = resp.json().await.expect("orders body not JSON");
    assert_eq!(body["data"].as_array().expect("not an array").len(), 0);
}

#[tokio::test]
#[ignore = "requires running API server and database"]
async fn test_customer_cannot_use_manager_endpoints() {
    let base = base_url();
    let customer = client();
    fresh_customer(&customer, "not-a-manager").await;

    let resp = customer
        .get(format!("{base}/api/v1/orders/all"))
        .send()
        .await
        .expect("orders/all failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = customer
        .patch(format!("{base}/api/v1/orders/1/status"))
        .json(&json!({"status": "shipped"}))
        .send()
        .await
        .expect("status update failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = customer
        .post(format!("{base}/api/v1/product/add"))
        .json(&json!({
            "name": "Nope",
            "price": "1.00",
            "category": "test",
            "description": "should fail",
            "image": "https://cdn.example.com/nope.jpg"
        }))
        .send()
        .await
        .expect("product add failed");
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "requires running API server, database, and manager account"]
async fn test_manager_status_updates_are_unguarded() {
    let base = base_url();

    let manager = client();
    let (manager_email, manager_password) = manager_credentials();
    login(&manager, &manager_email, &manager_password).await;
    let (product_id, _) = create_product(&manager, "5.00").await;

    let customer = client();
    fresh_customer(&customer, "status").await;
    let resp = customer
        .post(format!("{base}/api/v1/orders"))
        .json(&json!({
            "items": [{"productId": product_id, "quantity": 1}],
            "shipping": shipping()
        }))
        .send()
        .await
        .expect("order create failed");
    let body: Value = resp.json().await.expect("order body not JSON");
    let order_id = body["data"]["id"].as_i64().expect("order id missing");

    // Any valid status is accepted, including jumps and reversals
    for status in ["delivered", "pending", "cancelled"] {
        let resp = manager
            .patch(format!("{base}/api/v1/orders/{order_id}/status"))
            .json(&json!({"status": status}))
            .send()
            .await
            .expect("status update failed");
        assert_eq!(resp.status(), StatusCode::OK, "setting {status}");
        let body: Value = resp.json().await.expect("status body not JSON");
        assert_eq!(body["data"]["status"], status);
    }

    // Outside the valid set is a 400 that lists the options
    let resp = manager
        .patch(format!("{base}/api/v1/orders/{order_id}/status"))
        .json(&json!({"status": "paid"}))
        .send()
        .await
        .expect("bad status failed");
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.expect("error body not JSON");
    assert!(
        body["message"]
            .as_str()
            .expect("message missing")
            .contains("pending, confirmed, shipped, delivered, cancelled")
    );
}

#[tokio::test]
#[ignore = "requires running API server and database"]
async fn test_customers_see_only_their_own_orders() {
    let base = base_url();

    let alice = client();
    fresh_customer(&alice, "alice").await;
    let bob = client();
    fresh_customer(&bob, "bob").await;

    // Bob's list is empty regardless of Alice's history
    let resp = bob
        .get(format!("{base}/api/v1/orders"))
        .send()
        .await
        .expect("orders list failed");
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.expect("orders body not JSON");
    assert_eq!(body["data"].as_array().expect("not an array").len(), 0);

    // A foreign order id reads as not found, same as a missing one
    let resp = bob
        .get(format!("{base}/api/v1/orders/99999999"))
        .send()
        .await
        .expect("order fetch failed");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "requires running API server, database, and manager account"]
async fn test_cart_checkout_lines_drive_order_creation() {
    let base = base_url();

    let (manager_email, manager_password) = manager_credentials();
    let manager = client();
    login(&manager, &manager_email, &manager_password).await;
    let (first_id, first_price) = create_product(&manager, "12.00").await;
    let (second_id, second_price) = create_product(&manager, "3.25").await;

    // Build the order payload the way a storefront client would: a local
    // cart persisted through JSON, then flattened to checkout lines.
    let mut cart = Cart::new();
    let first = ProductId::new(i32::try_from(first_id).expect("id out of range"));
    let second = ProductId::new(i32::try_from(second_id).expect("id out of range"));
    cart.add(first, Price::new(first_price).expect("invalid price"));
    cart.add(first, Price::new(first_price).expect("invalid price"));
    cart.add(second, Price::new(second_price).expect("invalid price"));
    let cart = Cart::from_json(&cart.to_json().expect("cart serialize failed"))
        .expect("cart deserialize failed");

    let customer = client();
    fresh_customer(&customer, "cart-checkout").await;
    let resp = customer
        .post(format!("{base}/api/v1/orders"))
        .json(&json!({"items": cart.checkout_lines(), "shipping": shipping()}))
        .send()
        .await
        .expect("order create failed");
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.expect("order body not JSON");
    let total: Decimal = body["data"]["totalAmount"]
        .as_str()
        .expect("totalAmount not a string")
        .parse()
        .expect("totalAmount not decimal");
    assert_eq!(total, cart.total_price());
    assert_eq!(
        body["data"]["items"].as_array().expect("not an array").len(),
        2
    );
}
