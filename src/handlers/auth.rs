use crate::handlers::common::{created_response, validate_input};
use crate::{
    dto::RegisterResponse, errors::ServiceError, services::users::RegisterInput, AppState,
};
use axum::{
    extract::{Json, State},
    routing::post,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Creates the router for auth endpoints
pub fn auth_routes() -> Router<Arc<AppState>> {
    Router::new().route("/register", post(register))
}

/// Register a new user account
async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl axum::response::IntoResponse, ServiceError> {
    validate_input(&payload)?;

    let input = RegisterInput {
        email: payload.email,
        password: payload.password,
        name: payload.name,
    };
    let user = state.services.users.register(input).await?;

    Ok(created_response(RegisterResponse {
        user,
        message: "User registered successfully".to_string(),
    }))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6))]
    pub password: String,
    pub name: Option<String>,
}
