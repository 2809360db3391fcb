use crate::handlers::common::{created_response, success_response, validate_input};
use crate::{
    entities::OrderStatus,
    errors::ServiceError,
    services::orders::{CreateOrderInput, OrderLineInput},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for order endpoints
pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_orders).post(create_order))
        .route("/:id", get(get_order).put(update_order_status))
}

#[derive(Debug, Deserialize)]
pub struct OrdersQuery {
    pub user_id: Option<Uuid>,
}

/// List orders, optionally for one user
async fn list_orders(
    State(state): State<Arc<AppState>>,
    Query(query): Query<OrdersQuery>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let orders = state.services.orders.list(query.user_id).await?;
    Ok(success_response(orders))
}

/// Create an order from the submitted lines
async fn create_order(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    if payload.items.is_empty() {
        return Err(ServiceError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }
    for line in &payload.items {
        validate_input(line)?;
    }

    let input = CreateOrderInput {
        user_id: payload.user_id,
        items: payload
            .items
            .into_iter()
            .map(|line| OrderLineInput {
                product_id: line.product_id,
                quantity: line.quantity,
            })
            .collect(),
    };
    let order = state.services.orders.create(input).await?;
    Ok(created_response(order))
}

/// Get an order by id
async fn get_order(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let order = state.services.orders.get(id).await?;
    Ok(success_response(order))
}

/// Update an order's status
async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let status = OrderStatus::from_str(&payload.status)
        .map_err(|_| ServiceError::Validation(format!("Invalid status: {}", payload.status)))?;

    let order = state.services.orders.update_status(id, status).await?;
    Ok(success_response(order))
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    pub user_id: Uuid,
    pub items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct OrderLineRequest {
    pub product_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}
