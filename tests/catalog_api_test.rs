mod common;

use axum::http::StatusCode;
use common::{as_decimal, TestApp};
use rust_decimal_macros::dec;
use serde_json::json;
use uuid::Uuid;

#[tokio::test]
async fn create_and_get_product() {
    let app = TestApp::new().await;
    let category_id = app.seed_category("Furniture").await;

    let (status, created) = app
        .post(
            "/api/products",
            json!({
                "name": "Oak Desk",
                "description": "Solid oak",
                "price": "120.00",
                "stock": 4,
                "featured": true,
                "category_id": category_id
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Oak Desk");
    assert_eq!(created["category"]["name"], "Furniture");

    let id = created["id"].as_str().unwrap();
    let (status, fetched) = app.get(&format!("/api/products/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&fetched["price"]), dec!(120.00));
    assert_eq!(fetched["featured"], true);
}

#[tokio::test]
async fn create_product_validates_category_reference() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post(
            "/api/products",
            json!({
                "name": "Orphan",
                "price": "1.00",
                "category_id": Uuid::new_v4()
            }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Category not found");
}

#[tokio::test]
async fn create_product_rejects_negative_price() {
    let app = TestApp::new().await;
    let category_id = app.seed_category("Furniture").await;

    let (status, _) = app
        .post(
            "/api/products",
            json!({
                "name": "Freebie",
                "price": "-1.00",
                "category_id": category_id
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn listing_filters_compose() {
    let app = TestApp::new().await;
    let furniture = app.seed_category("Furniture").await;
    let lighting = app.seed_category("Lighting").await;
    app.seed_product("Oak Desk", dec!(120.00), furniture).await;
    app.seed_product("Desk Lamp", dec!(30.00), lighting).await;
    app.seed_product("Chair", dec!(45.00), furniture).await;

    // Search is case-insensitive over name and description
    let (_, found) = app.get("/api/products?search=dEsK").await;
    assert_eq!(found.as_array().unwrap().len(), 2);

    // Category narrows further
    let (_, found) = app
        .get(&format!("/api/products?search=desk&category_id={furniture}"))
        .await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["name"], "Oak Desk");

    // featured=true only matches flagged products
    let (_, found) = app.get("/api/products?featured=true").await;
    assert_eq!(found.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn partial_update_keeps_absent_fields() {
    let app = TestApp::new().await;
    let category_id = app.seed_category("Furniture").await;
    let product_id = app.seed_product("Oak Desk", dec!(120.00), category_id).await;

    let (status, updated) = app
        .put(
            &format!("/api/products/{product_id}"),
            json!({ "price": "99.00" }),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(as_decimal(&updated["price"]), dec!(99.00));
    // Untouched fields survive
    assert_eq!(updated["name"], "Oak Desk");
    assert_eq!(updated["stock"], 10);
}

#[tokio::test]
async fn update_missing_product_is_404() {
    let app = TestApp::new().await;
    let (status, _) = app
        .put(
            &format!("/api/products/{}", Uuid::new_v4()),
            json!({ "price": "1.00" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_product_then_404s() {
    let app = TestApp::new().await;
    let category_id = app.seed_category("Furniture").await;
    let product_id = app.seed_product("Oak Desk", dec!(120.00), category_id).await;

    let (status, body) = app.delete(&format!("/api/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().is_some());

    let (status, _) = app.get(&format!("/api/products/{product_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.delete(&format!("/api/products/{product_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn categories_list_is_sorted_with_counts() {
    let app = TestApp::new().await;
    let lighting = app.seed_category("Lighting").await;
    let furniture = app.seed_category("Furniture").await;
    app.seed_product("Lamp", dec!(30.00), lighting).await;
    app.seed_product("Desk", dec!(120.00), furniture).await;
    app.seed_product("Chair", dec!(45.00), furniture).await;

    let (status, categories) = app.get("/api/categories").await;
    assert_eq!(status, StatusCode::OK);

    let list = categories.as_array().unwrap();
    assert_eq!(list.len(), 2);
    // Name ascending
    assert_eq!(list[0]["name"], "Furniture");
    assert_eq!(list[1]["name"], "Lighting");
    assert_eq!(list[0]["product_count"], 2);
    assert_eq!(list[1]["product_count"], 1);
}

#[tokio::test]
async fn create_category_requires_name() {
    let app = TestApp::new().await;
    let (status, _) = app.post("/api/categories", json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, created) = app
        .post("/api/categories", json!({ "name": "Rugs" }))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Rugs");
}

#[tokio::test]
async fn health_probes_answer() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let (status, body) = app.get("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}
