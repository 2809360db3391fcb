mod common;

use axum::http::StatusCode;
use common::{as_decimal, TestApp};
use rust_decimal_macros::dec;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;
use storefront_api::entities::{CartItem, Order, OrderItem};
use uuid::Uuid;

#[tokio::test]
async fn order_snapshots_prices_and_clears_cart() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("shopper@example.com").await;
    let category_id = app.seed_category("Misc").await;
    let first = app.seed_product("First", dec!(10.00), category_id).await;
    let second = app.seed_product("Second", dec!(5.00), category_id).await;

    // Cart mirrors what will be ordered
    for (product_id, quantity) in [(first, 2), (second, 3)] {
        app.post(
            "/api/cart",
            json!({ "user_id": user_id, "product_id": product_id, "quantity": quantity }),
        )
        .await;
    }

    let (status, order) = app
        .post(
            "/api/orders",
            json!({
                "user_id": user_id,
                "items": [
                    { "product_id": first, "quantity": 2 },
                    { "product_id": second, "quantity": 3 }
                ]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(as_decimal(&order["total"]), dec!(35.00));
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["user"]["email"], "shopper@example.com");
    assert_eq!(order["items"].as_array().unwrap().len(), 2);

    // The cart is empty afterwards
    let (_, cart) = app.get(&format!("/api/cart?user_id={user_id}")).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
    assert_eq!(as_decimal(&cart["total"]), dec!(0));

    // Line prices are snapshots: a later price change must not show up
    let order_id = order["id"].as_str().unwrap().to_string();
    let (status, _) = app
        .put(&format!("/api/products/{first}"), json!({ "price": "99.00" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, reread) = app.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(as_decimal(&reread["total"]), dec!(35.00));
    let line = reread["items"]
        .as_array()
        .unwrap()
        .iter()
        .find(|item| item["product_id"] == json!(first))
        .expect("line for first product");
    assert_eq!(as_decimal(&line["price"]), dec!(10.00));
}

#[tokio::test]
async fn order_with_missing_product_fails_without_partial_writes() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("shopper@example.com").await;
    let category_id = app.seed_category("Misc").await;
    let product_id = app.seed_product("Real", dec!(10.00), category_id).await;

    app.post(
        "/api/cart",
        json!({ "user_id": user_id, "product_id": product_id, "quantity": 1 }),
    )
    .await;

    let missing = Uuid::new_v4();
    let (status, body) = app
        .post(
            "/api/orders",
            json!({
                "user_id": user_id,
                "items": [
                    { "product_id": product_id, "quantity": 1 },
                    { "product_id": missing, "quantity": 2 }
                ]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains(&missing.to_string()));

    // Nothing was written and the cart is intact
    assert_eq!(Order::find().count(&*app.state.db).await.unwrap(), 0);
    assert_eq!(OrderItem::find().count(&*app.state.db).await.unwrap(), 0);
    assert_eq!(CartItem::find().count(&*app.state.db).await.unwrap(), 1);
}

#[tokio::test]
async fn order_requires_existing_user() {
    let app = TestApp::new().await;
    let category_id = app.seed_category("Misc").await;
    let product_id = app.seed_product("Real", dec!(10.00), category_id).await;

    let (status, _) = app
        .post(
            "/api/orders",
            json!({
                "user_id": Uuid::new_v4(),
                "items": [{ "product_id": product_id, "quantity": 1 }]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn order_requires_items() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("shopper@example.com").await;

    let (status, _) = app
        .post("/api/orders", json!({ "user_id": user_id, "items": [] }))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn order_rejects_non_positive_line_quantity() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("shopper@example.com").await;
    let category_id = app.seed_category("Misc").await;
    let product_id = app.seed_product("Real", dec!(10.00), category_id).await;

    let (status, _) = app
        .post(
            "/api/orders",
            json!({
                "user_id": user_id,
                "items": [{ "product_id": product_id, "quantity": 0 }]
            }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn orders_list_filters_by_user() {
    let app = TestApp::new().await;
    let first_user = app.seed_user("first@example.com").await;
    let second_user = app.seed_user("second@example.com").await;
    let category_id = app.seed_category("Misc").await;
    let product_id = app.seed_product("Thing", dec!(3.00), category_id).await;

    for user_id in [first_user, second_user] {
        let (status, _) = app
            .post(
                "/api/orders",
                json!({
                    "user_id": user_id,
                    "items": [{ "product_id": product_id, "quantity": 1 }]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = app.get("/api/orders").await;
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, mine) = app.get(&format!("/api/orders?user_id={first_user}")).await;
    assert_eq!(mine.as_array().unwrap().len(), 1);
    assert_eq!(mine[0]["user_id"], json!(first_user));
}

#[tokio::test]
async fn status_transitions_through_the_five_values() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("shopper@example.com").await;
    let category_id = app.seed_category("Misc").await;
    let product_id = app.seed_product("Thing", dec!(3.00), category_id).await;

    let (_, order) = app
        .post(
            "/api/orders",
            json!({
                "user_id": user_id,
                "items": [{ "product_id": product_id, "quantity": 1 }]
            }),
        )
        .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    for status_name in ["PROCESSING", "SHIPPED", "DELIVERED", "CANCELLED", "PENDING"] {
        let (status, updated) = app
            .put(
                &format!("/api/orders/{order_id}"),
                json!({ "status": status_name }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["status"], status_name);
    }
}

#[tokio::test]
async fn invalid_status_is_rejected() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("shopper@example.com").await;
    let category_id = app.seed_category("Misc").await;
    let product_id = app.seed_product("Thing", dec!(3.00), category_id).await;

    let (_, order) = app
        .post(
            "/api/orders",
            json!({
                "user_id": user_id,
                "items": [{ "product_id": product_id, "quantity": 1 }]
            }),
        )
        .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .put(&format!("/api/orders/{order_id}"), json!({ "status": "SHIPPING" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("SHIPPING"));
}

#[tokio::test]
async fn status_update_on_unknown_order_is_404() {
    let app = TestApp::new().await;
    let (status, _) = app
        .put(
            &format!("/api/orders/{}", Uuid::new_v4()),
            json!({ "status": "SHIPPED" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleted_product_leaves_order_line_with_null_product() {
    let app = TestApp::new().await;
    let user_id = app.seed_user("shopper@example.com").await;
    let category_id = app.seed_category("Misc").await;
    let product_id = app.seed_product("Ephemeral", dec!(8.00), category_id).await;

    let (_, order) = app
        .post(
            "/api/orders",
            json!({
                "user_id": user_id,
                "items": [{ "product_id": product_id, "quantity": 2 }]
            }),
        )
        .await;
    let order_id = order["id"].as_str().unwrap().to_string();

    let (status, _) = app.delete(&format!("/api/products/{product_id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, reread) = app.get(&format!("/api/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(reread["items"][0]["product"].is_null());
    assert_eq!(as_decimal(&reread["items"][0]["price"]), dec!(8.00));
    assert_eq!(as_decimal(&reread["total"]), dec!(16.00));
}
