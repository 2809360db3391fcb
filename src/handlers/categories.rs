use crate::handlers::common::{created_response, success_response, validate_input};
use crate::{errors::ServiceError, services::categories::CreateCategoryInput, AppState};
use axum::{
    extract::{Json, State},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Creates the router for category endpoints
pub fn categories_routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(list_categories).post(create_category))
}

/// List categories with product counts
async fn list_categories(
    State(state): State<Arc<AppState>>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    let categories = state.services.categories.list().await?;
    Ok(success_response(categories))
}

/// Create a category
async fn create_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let input = CreateCategoryInput {
        name: payload.name,
        description: payload.description,
    };
    let category = state.services.categories.create(input).await?;
    Ok(created_response(category))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub description: Option<String>,
}
