//! End-to-end checkout flows through the storefront router.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::http::StatusCode;
use presto_core::{Catalog, ItemId, Price};
use presto_integration_tests::{ScriptedSubmitter, TestClient, config, redirect_to};
use presto_storefront::services::submission::{SubmissionError, TelegramSubmitter};
use presto_storefront::state::AppState;
use serde_json::json;

const MENU: &str = r#"{
  "categories": [
    { "name": "PITSA", "items": [
      { "id": "p1", "name": "Pizza Pepperoni", "price": 70000, "image_url": "https://img.test/p1.jpg" }
    ]},
    { "name": "HOT-DOG", "items": [
      { "id": "h1", "name": "Hot-Dog Oddiy", "price": 10000, "image_url": "https://img.test/h1.jpg",
        "description": "Klassik" }
    ]}
  ]
}"#;

fn client(vars: &[(&str, &str)], submitter: Arc<ScriptedSubmitter>) -> TestClient {
    let config = config(vars).unwrap();
    let catalog = Catalog::from_json(MENU).unwrap();
    TestClient::new(AppState::new(config, catalog, submitter))
}

// =============================================================================
// Menu
// =============================================================================

#[tokio::test]
async fn test_health() {
    let mut client = client(&[], ScriptedSubmitter::new(vec![]));
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!("ok"));
}

#[tokio::test]
async fn test_categories_start_with_all_label() {
    let mut client = client(&[], ScriptedSubmitter::new(vec![]));
    let response = client.get("/api/categories").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["categories"],
        json!(["Barchasi", "PITSA", "HOT-DOG"])
    );
}

#[tokio::test]
async fn test_catalog_filtering() {
    let mut client = client(&[], ScriptedSubmitter::new(vec![]));

    let all = client.get("/api/catalog").await;
    assert_eq!(all.body["category"], "Barchasi");
    assert_eq!(all.body["items"].as_array().unwrap().len(), 2);

    let hot_dogs = client.get("/api/catalog?category=HOT-DOG").await;
    let items = hot_dogs.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], "h1");
    assert_eq!(items[0]["description"], "Klassik");
    assert_eq!(items[0]["price_display"], "10 000 so'm");

    let unknown = client.get("/api/catalog?category=SUSHI").await;
    assert_eq!(unknown.status, StatusCode::OK);
    assert!(unknown.body["items"].as_array().unwrap().is_empty());
}

// =============================================================================
// Cart
// =============================================================================

#[tokio::test]
async fn test_cart_totals_scenario() {
    let mut client = client(&[], ScriptedSubmitter::new(vec![]));

    client.post("/api/cart/add", Some(json!({ "item_id": "p1" }))).await;
    client.post("/api/cart/add", Some(json!({ "item_id": "p1" }))).await;
    let view = client
        .post("/api/cart/add", Some(json!({ "item_id": "h1" })))
        .await;

    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["item_count"], 3);
    assert_eq!(view.body["total_price"], 150_000);
    assert_eq!(view.body["total_display"], "150 000 so'm");
    assert_eq!(view.body["cart_open"], true);

    let view = client
        .post(
            "/api/cart/update",
            Some(json!({ "item_id": "p1", "quantity": 0 })),
        )
        .await;
    assert_eq!(view.body["item_count"], 1);
    assert_eq!(view.body["items"][0]["item_id"], "h1");

    let view = client
        .post(
            "/api/cart/update",
            Some(json!({ "item_id": "p1", "quantity": 5 })),
        )
        .await;
    assert_eq!(view.body["item_count"], 1, "update never creates a line");
}

#[tokio::test]
async fn test_add_unknown_item_is_not_found() {
    let mut client = client(&[], ScriptedSubmitter::new(vec![]));
    let response = client
        .post("/api/cart/add", Some(json!({ "item_id": "zz" })))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sessions_are_isolated() {
    let mut alice = client(&[], ScriptedSubmitter::new(vec![]));
    let mut bob = alice.fresh();

    alice
        .post("/api/cart/add", Some(json!({ "item_id": "p1" })))
        .await;
    let view = bob.get("/api/session").await;
    assert_eq!(view.body["item_count"], 0);
    let view = alice.get("/api/session").await;
    assert_eq!(view.body["item_count"], 1);
}

#[tokio::test]
async fn test_toggle_and_clear() {
    let mut client = client(&[], ScriptedSubmitter::new(vec![]));
    let view = client.post("/api/cart/toggle", None).await;
    assert_eq!(view.body["cart_open"], true);

    client
        .post("/api/cart/add", Some(json!({ "item_id": "p1" })))
        .await;
    let view = client.post("/api/cart/clear", None).await;
    assert_eq!(view.body["item_count"], 0);
    assert_eq!(view.body["total_price"], 0);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_empty_cart_checkout_is_refused() {
    let mut client = client(&[], ScriptedSubmitter::new(vec![]));
    let response = client.post("/api/checkout/open", None).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["notice"]["kind"], "empty_cart");

    let view = client.get("/api/session").await;
    assert_eq!(view.body["checkout"]["status"], "idle");
}

#[tokio::test]
async fn test_confirm_without_open_dialog_conflicts() {
    let submitter = ScriptedSubmitter::new(vec![]);
    let mut client = client(&[], submitter.clone());
    client
        .post("/api/cart/add", Some(json!({ "item_id": "p1" })))
        .await;

    let response = client.post("/api/checkout/confirm", None).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert!(submitter.received().await.is_empty());
}

#[tokio::test]
async fn test_successful_order_clears_cart() {
    let submitter = ScriptedSubmitter::new(vec![Ok(redirect_to(
        "https://t.me/presto_pizza_bot?startapp=x",
    ))]);
    let mut client = client(&[], submitter.clone());

    client
        .post("/api/cart/add", Some(json!({ "item_id": "p1" })))
        .await;
    client
        .post("/api/cart/add", Some(json!({ "item_id": "h1" })))
        .await;

    let view = client.post("/api/checkout/open", None).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["checkout"]["status"], "confirmation_open");
    assert_eq!(view.body["checkout"]["confirm_enabled"], true);

    let view = client.post("/api/checkout/confirm", None).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["notice"]["kind"], "order_submitted");
    assert_eq!(
        view.body["notice"]["redirect_url"],
        "https://t.me/presto_pizza_bot?startapp=x"
    );
    assert_eq!(view.body["item_count"], 0);
    assert_eq!(view.body["cart_open"], false);
    assert_eq!(view.body["checkout"]["status"], "idle");

    let orders = submitter.received().await;
    assert_eq!(orders.len(), 1);
    let order = &orders[0];
    assert_eq!(order.total_price(), Price::new(80_000));
    assert_eq!(order.lines()[0].id, ItemId::new("p1"));
    assert!(order.phone().is_none());
}

#[tokio::test]
async fn test_failed_order_keeps_cart_and_allows_retry() {
    let submitter = ScriptedSubmitter::new(vec![Err(SubmissionError::Timeout)]);
    let mut client = client(&[], submitter.clone());

    client
        .post("/api/cart/add", Some(json!({ "item_id": "p1" })))
        .await;
    client.post("/api/checkout/open", None).await;

    let view = client.post("/api/checkout/confirm", None).await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["notice"]["kind"], "submission_failed");
    assert_eq!(view.body["notice"]["retryable"], true);
    assert_eq!(view.body["item_count"], 1);
    assert_eq!(view.body["checkout"]["status"], "confirmation_open");

    let view = client.post("/api/checkout/confirm", None).await;
    assert_eq!(view.body["notice"]["kind"], "order_submitted");
    assert_eq!(view.body["item_count"], 0);
    assert_eq!(submitter.received().await.len(), 2);
}

#[tokio::test]
async fn test_cancel_closes_dialog_and_keeps_cart() {
    let mut client = client(&[], ScriptedSubmitter::new(vec![]));
    client
        .post("/api/cart/add", Some(json!({ "item_id": "p1" })))
        .await;
    client.post("/api/checkout/open", None).await;

    let view = client.post("/api/checkout/cancel", None).await;
    assert_eq!(view.body["checkout"]["status"], "idle");
    assert_eq!(view.body["item_count"], 1);
}

#[tokio::test]
async fn test_phone_required_flow() {
    let submitter = ScriptedSubmitter::new(vec![]);
    let mut client = client(&[("PRESTO_REQUIRE_PHONE", "true")], submitter.clone());

    client
        .post("/api/cart/add", Some(json!({ "item_id": "p1" })))
        .await;
    let view = client.post("/api/checkout/open", None).await;
    assert_eq!(view.body["checkout"]["requires_phone"], true);
    assert_eq!(view.body["checkout"]["confirm_enabled"], false);
    assert!(view.body["checkout"].get("phone_error").is_none());

    let response = client.post("/api/checkout/confirm", None).await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["notice"]["kind"], "invalid_phone");

    let view = client
        .post("/api/checkout/phone", Some(json!({ "value": "+998 90 12" })))
        .await;
    assert_eq!(view.body["checkout"]["confirm_enabled"], false);
    assert_eq!(view.body["checkout"]["phone_error"]["kind"], "wrong_length");

    let view = client
        .post(
            "/api/checkout/phone",
            Some(json!({ "value": "+998 90 123 45 67" })),
        )
        .await;
    assert_eq!(view.body["checkout"]["confirm_enabled"], true);

    let view = client.post("/api/checkout/confirm", None).await;
    assert_eq!(view.body["notice"]["kind"], "order_submitted");

    let orders = submitter.received().await;
    assert_eq!(orders[0].phone().unwrap().international(), "+998901234567");
}

#[tokio::test]
async fn test_phone_input_requires_open_dialog() {
    let mut client = client(&[("PRESTO_REQUIRE_PHONE", "true")], ScriptedSubmitter::new(vec![]));
    let response = client
        .post("/api/checkout/phone", Some(json!({ "value": "998901234567" })))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_phone_input_reads_value_field() {
    let mut client = client(&[("PRESTO_REQUIRE_PHONE", "true")], ScriptedSubmitter::new(vec![]));
    client
        .post("/api/cart/add", Some(json!({ "item_id": "p1" })))
        .await;
    client.post("/api/checkout/open", None).await;

    let response = client
        .post("/api/checkout/phone", Some(json!({ "phone": "998901234567" })))
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);

    let view = client
        .post("/api/checkout/phone", Some(json!({ "value": "998901234567" })))
        .await;
    assert_eq!(view.status, StatusCode::OK);
    assert_eq!(view.body["checkout"]["confirm_enabled"], true);
}

#[tokio::test]
async fn test_telegram_submitter_end_to_end() {
    let config = config(&[]).unwrap();
    let catalog = Catalog::from_json(MENU).unwrap();
    let state = AppState::new(
        config,
        catalog,
        Arc::new(TelegramSubmitter::new("presto_pizza_bot".to_string())),
    );
    let mut client = TestClient::new(state);

    client
        .post("/api/cart/add", Some(json!({ "item_id": "p1" })))
        .await;
    client.post("/api/checkout/open", None).await;
    let view = client.post("/api/checkout/confirm", None).await;

    assert_eq!(
        view.body["notice"]["redirect_url"],
        "https://t.me/presto_pizza_bot?startapp=Pizza%2520Pepperoni%3D1"
    );
}
