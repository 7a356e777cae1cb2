//! Integration tests for the storefront JSON API.
//!
//! Each test runs its own in-process server; see [`TestServer`].

#![allow(clippy::unwrap_used)]

use reqwest::StatusCode;
use serde_json::{Value, json};
use vitrine_integration_tests::{CATALOG, HANDOFF_PHONE, TestServer};

fn ids(body: &Value) -> Vec<i64> {
    body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect()
}

async fn get_json(server: &TestServer, path: &str) -> (StatusCode, Value) {
    let resp = server.client.get(server.url(path)).send().await.unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

async fn checkout(server: &TestServer, body: Value) -> (StatusCode, Value) {
    let resp = server
        .client
        .post(server.url("/checkout"))
        .json(&body)
        .send()
        .await
        .unwrap();
    let status = resp.status();
    (status, resp.json().await.unwrap())
}

// ============================================================================
// Health & catalog
// ============================================================================

#[tokio::test]
async fn test_health() {
    let server = TestServer::start(CATALOG).await;
    let resp = server.client.get(server.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_catalog_loads_in_file_order() {
    let server = TestServer::start(CATALOG).await;
    let body = server.wait_for_catalog().await;

    assert_eq!(body["catalog"], json!({"state": "ready", "products": 4}));
    assert_eq!(ids(&body), vec![1, 2, 3, 4]);
    assert_eq!(body["sort"], "default");
    assert_eq!(body["no_results"], false);
    // String prices in the catalog are coerced to numbers
    assert_eq!(body["products"][1]["price"], json!(15.9));
}

#[tokio::test]
async fn test_search_and_sort() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    let (status, body) = get_json(&server, "/products?q=art&sort=price-desc").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![2, 1]);
    assert_eq!(body["query"], "art");

    let (_, body) = get_json(&server, "/products?sort=price-desc").await;
    assert_eq!(ids(&body), vec![4, 3, 2, 1]);

    let (_, body) = get_json(&server, "/products?sort=name-asc").await;
    assert_eq!(ids(&body), vec![1, 2, 4, 3]);

    let (_, body) = get_json(&server, "/products?sort=default").await;
    assert_eq!(ids(&body), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_unknown_sort_falls_back_to_default() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    let (status, body) = get_json(&server, "/products?sort=cheapest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["sort"], "default");
    assert_eq!(ids(&body), vec![1, 2, 3, 4]);
}

#[tokio::test]
async fn test_no_results() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    let (_, body) = get_json(&server, "/products?q=zzz").await;
    assert_eq!(body["no_results"], true);
    assert!(ids(&body).is_empty());
}

#[tokio::test]
async fn test_product_details() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    let (status, body) = get_json(&server, "/products/3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Quadro Azul");

    let (status, body) = get_json(&server, "/products/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");

    let (status, _) = get_json(&server, "/products/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_failed_load_then_reload() {
    let server = TestServer::start("not json").await;
    let body = server.wait_for_catalog().await;
    assert_eq!(body["catalog"]["state"], "failed");

    let (status, body) = get_json(&server, "/products").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "Could not load products, please try again");

    let (status, _) = server.cart_command("add", 1).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    std::fs::write(&server.catalog_path, CATALOG).unwrap();
    let resp = server
        .client
        .post(server.url("/products/reload"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["catalog"], json!({"state": "ready", "products": 4}));

    let (status, body) = get_json(&server, "/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&body), vec![1, 2, 3, 4]);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_add_add_remove_scenario() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    let (status, body) = server.cart_command("add", 1).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notification"]["kind"], "success");
    assert_eq!(body["notification"]["message"], "Arte 1 added to cart");
    assert_eq!(body["cart"]["item_count"], 1);
    assert_eq!(body["cart"]["item_count_label"], "1 item");
    assert_eq!(body["cart"]["total"], "10.90");

    let (_, body) = server.cart_command("add", 1).await;
    assert_eq!(body["cart"]["item_count"], 2);
    assert_eq!(body["cart"]["total"], "21.80");
    assert_eq!(body["cart"]["lines"].as_array().unwrap().len(), 1);
    assert_eq!(body["cart"]["lines"][0]["quantity"], 2);

    let (_, body) = server.cart_command("remove", 1).await;
    assert_eq!(body["notification"]["message"], "Arte 1 removed from cart");
    assert_eq!(body["cart"]["item_count"], 0);
    assert_eq!(body["cart"]["total"], "0.00");

    assert_eq!(server.stored_cart().as_deref(), Some("[]"));
}

#[tokio::test]
async fn test_cart_is_persisted_with_numeric_prices() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    server.cart_command("add", 2).await;
    server.cart_command("increase", 2).await;

    let stored: Value = serde_json::from_str(&server.stored_cart().unwrap()).unwrap();
    assert_eq!(
        stored,
        json!([{
            "id": 2,
            "name": "Arte 2",
            "price": 15.9,
            "image": "img/arte-2.jpg",
            "quantity": 2
        }])
    );
}

#[tokio::test]
async fn test_decrease_to_zero_removes_line() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    server.cart_command("add", 3).await;
    server.cart_command("add", 3).await;

    let (_, body) = server.cart_command("decrease", 3).await;
    assert_eq!(body["notification"]["message"], "Quantity of Quadro Azul decreased");
    assert_eq!(body["cart"]["lines"][0]["quantity"], 1);

    let (_, body) = server.cart_command("decrease", 3).await;
    assert_eq!(body["notification"]["message"], "Quadro Azul removed from cart");
    assert!(body["cart"]["lines"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_product_leaves_cart_unchanged() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    server.cart_command("add", 1).await;
    let (status, body) = server.cart_command("add", 99).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Product not found");

    let (_, cart) = get_json(&server, "/cart").await;
    assert_eq!(cart["item_count"], 1);
}

#[tokio::test]
async fn test_commands_on_absent_lines_are_noops() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    for command in ["increase", "decrease", "remove"] {
        let (status, body) = server.cart_command(command, 4).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["notification"].is_null());
        assert_eq!(body["cart"]["item_count"], 0);
    }

    let resp = server
        .client
        .post(server.url("/cart/clear"))
        .send()
        .await
        .unwrap();
    let body: Value = resp.json().await.unwrap();
    assert!(body["notification"].is_null());
    assert_eq!(server.stored_cart(), None);
}

#[tokio::test]
async fn test_product_id_accepted_as_string() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    let resp = server
        .client
        .post(server.url("/cart/add"))
        .json(&json!({"product_id": "4"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["cart"]["total"], "29.90");
}

#[tokio::test]
async fn test_stored_cart_restored_with_string_prices() {
    let stored = r#"[{"id": 1, "name": "Arte 1", "price": "10.90", "image": "img/arte-1.jpg", "quantity": 2}]"#;
    let server = TestServer::start_with_cart(CATALOG, Some(stored)).await;

    let (status, cart) = get_json(&server, "/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 2);
    assert_eq!(cart["total"], "21.80");
    assert_eq!(cart["lines"][0]["subtotal"], "21.80");
}

#[tokio::test]
async fn test_corrupt_stored_cart_starts_empty() {
    let server = TestServer::start_with_cart(CATALOG, Some("{not a cart")).await;

    let (status, cart) = get_json(&server, "/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["item_count"], 0);
    assert_eq!(cart["total"], "0.00");
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_checkout_empty_cart_rejected() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;

    let (status, body) = checkout(
        &server,
        json!({"name": "Ana", "phone": "83 99999-0000", "address": "Rua A, 10"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Your cart is empty");
}

#[tokio::test]
async fn test_checkout_missing_field_keeps_cart() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;
    server.cart_command("add", 1).await;

    let (status, body) = checkout(
        &server,
        json!({"name": "  ", "phone": "83 99999-0000", "address": "Rua A, 10"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "name is required to complete the order");

    let (_, cart) = get_json(&server, "/cart").await;
    assert_eq!(cart["item_count"], 1);
}

#[tokio::test]
async fn test_checkout_builds_handoff_and_empties_cart() {
    let server = TestServer::start(CATALOG).await;
    server.wait_for_catalog().await;
    server.cart_command("add", 1).await;
    server.cart_command("add", 1).await;
    server.cart_command("add", 4).await;

    let (status, body) = checkout(
        &server,
        json!({"name": "Ana", "phone": "83 99999-0000", "address": "Rua A, 10"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let message = body["message"].as_str().unwrap();
    assert!(message.contains("*Name:* Ana"));
    assert!(message.contains("Arte 1 (x2) - R$ 21.80"));
    assert!(message.contains("Moldura (x1) - R$ 29.90"));
    assert!(message.contains("Total: R$ 51.70"));

    let url = url::Url::parse(body["url"].as_str().unwrap()).unwrap();
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("phone".to_string(), HANDOFF_PHONE.to_string())));
    assert!(pairs.contains(&("text".to_string(), message.to_string())));

    let (_, cart) = get_json(&server, "/cart").await;
    assert_eq!(cart["item_count"], 0);
    assert_eq!(server.stored_cart().as_deref(), Some("[]"));
}
