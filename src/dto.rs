//! Response shapes shared by the HTTP handlers and the client-side store.
//!
//! These mirror the JSON the storefront front-end consumes: products carry
//! their category, cart and order payloads embed the referenced records.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{category, product, user, OrderStatus};

/// Product with its category embedded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub featured: bool,
    pub image_url: Option<String>,
    pub category_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category: category::Model,
}

impl ProductResponse {
    pub fn from_parts(product: product::Model, category: category::Model) -> Self {
        Self {
            id: product.id,
            name: product.name,
            description: product.description,
            price: product.price,
            stock: product.stock,
            featured: product.featured,
            image_url: product.image_url,
            category_id: product.category_id,
            created_at: product.created_at,
            updated_at: product.updated_at,
            category,
        }
    }
}

/// Category with its product count, as the category listing returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryResponse {
    #[serde(flatten)]
    pub category: category::Model,
    pub product_count: u64,
}

/// A cart row with the product (and its category) embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub product: ProductResponse,
}

/// Full cart payload. `total` and `count` are derived from the items on
/// every load, never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub total: Decimal,
    pub count: i64,
}

impl CartResponse {
    pub fn new(items: Vec<CartItemResponse>) -> Self {
        let total = items
            .iter()
            .map(|item| item.product.price * Decimal::from(item.quantity))
            .sum();
        let count = items.iter().map(|item| i64::from(item.quantity)).sum();
        Self {
            items,
            total,
            count,
        }
    }
}

/// The user fields order payloads expose.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
}

impl From<user::Model> for UserSummary {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

/// An order line. `price` is the unit price captured at order time;
/// `product` is the live catalog record and is `null` once it is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Decimal,
    pub product: Option<ProductResponse>,
}

/// Order with user and lines embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub user: UserSummary,
    pub items: Vec<OrderItemResponse>,
}

/// Registration payload: the created account plus a confirmation message.
/// The user model's password hash is skipped on serialization.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterResponse {
    pub user: user::Model,
    pub message: String,
}
