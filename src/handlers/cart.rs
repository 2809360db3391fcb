use crate::handlers::common::{
    created_response, message_response, success_response, validate_input,
};
use crate::{errors::ServiceError, services::cart::AddToCartInput, AppState};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{get, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn cart_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(get_cart).post(add_to_cart))
        .route("/:id", put(update_cart_item).delete(remove_cart_item))
}

#[derive(Debug, Deserialize)]
pub struct CartQuery {
    pub user_id: Option<Uuid>,
}

/// Get a user's cart with derived totals
async fn get_cart(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CartQuery>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let user_id = query.user_id.ok_or_else(|| {
        ServiceError::Validation("user_id query parameter is required".to_string())
    })?;

    let cart = state.services.cart.get_cart(user_id).await?;
    Ok(success_response(cart))
}

/// Add an item to a user's cart
async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<AddToCartRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let input = AddToCartInput {
        user_id: payload.user_id,
        product_id: payload.product_id,
        quantity: payload.quantity,
    };
    let item = state.services.cart.add_item(input).await?;
    Ok(created_response(item))
}

/// Update a cart item's quantity
async fn update_cart_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateCartItemRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let item = state
        .services
        .cart
        .update_quantity(id, payload.quantity)
        .await?;
    Ok(success_response(item))
}

/// Remove an item from the cart. Deliberately not idempotent: removing an
/// already-removed item answers 404.
async fn remove_cart_item(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    state.services.cart.remove_item(id).await?;
    Ok(message_response("Item removed from cart"))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    pub user_id: Uuid,
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: i32,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCartItemRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}
