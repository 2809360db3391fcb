use crate::handlers::common::{
    created_response, message_response, success_response, validate_input,
};
use crate::{
    errors::ServiceError,
    services::products::{CreateProductInput, ProductListFilter, UpdateProductInput},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::get,
    Router,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Creates the router for product endpoints
pub fn products_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
}

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category_id: Option<Uuid>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

/// List products with optional filters
async fn list_products(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListProductsQuery>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let filter = ProductListFilter {
        category_id: query.category_id,
        featured: query.featured,
        search: query.search,
    };
    let products = state.services.products.list(filter).await?;
    Ok(success_response(products))
}

/// Create a product
async fn create_product(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let input = CreateProductInput {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
        featured: payload.featured,
        image_url: payload.image_url,
        category_id: payload.category_id,
    };
    let product = state.services.products.create(input).await?;
    Ok(created_response(product))
}

/// Get a product by id
async fn get_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let product = state.services.products.get(id).await?;
    Ok(success_response(product))
}

/// Partially update a product
async fn update_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let input = UpdateProductInput {
        name: payload.name,
        description: payload.description,
        price: payload.price,
        stock: payload.stock,
        featured: payload.featured,
        image_url: payload.image_url,
        category_id: payload.category_id,
    };
    let product = state.services.products.update(id, input).await?;
    Ok(success_response(product))
}

/// Delete a product
async fn delete_product(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    state.services.products.delete(id).await?;
    Ok(message_response("Product deleted successfully"))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct CreateProductRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default)]
    pub featured: bool,
    pub image_url: Option<String>,
    pub category_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
}
