//! HTTP handlers: thin axum routers that validate input and delegate to
//! the services layer.

pub mod auth;
pub mod cart;
pub mod categories;
pub mod common;
pub mod health;
pub mod orders;
pub mod products;

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{CartService, CategoryService, OrderService, ProductService, UserService};
use axum::Router;
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services container used by the HTTP handlers.
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<ProductService>,
    pub categories: Arc<CategoryService>,
    pub cart: Arc<CartService>,
    pub orders: Arc<OrderService>,
    pub users: Arc<UserService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        Self {
            products: Arc::new(ProductService::new(db.clone(), event_sender.clone())),
            categories: Arc::new(CategoryService::new(db.clone(), event_sender.clone())),
            cart: Arc::new(CartService::new(
                db.clone(),
                event_sender.clone(),
                config.cart.on_duplicate,
            )),
            orders: Arc::new(OrderService::new(db.clone(), event_sender.clone())),
            users: Arc::new(UserService::new(db, event_sender)),
        }
    }
}

/// Assembles the `/api` router.
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/products", products::products_routes())
        .nest("/categories", categories::categories_routes())
        .nest("/cart", cart::cart_routes())
        .nest("/orders", orders::orders_routes())
        .nest("/auth", auth::auth_routes())
}
