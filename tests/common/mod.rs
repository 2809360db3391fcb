// Not every test binary uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use http_body_util::BodyExt;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use storefront_api::{
    config::{AppConfig, CartConfig, DuplicatePolicy},
    db,
    entities::{category, product, user},
    events::{self, EventSender},
    handlers::AppServices,
    AppState,
};
use tokio::sync::mpsc;
use tower::util::ServiceExt;
use uuid::Uuid;

/// Test harness: application state over an in-memory SQLite database with
/// migrations applied, plus the full router.
pub struct TestApp {
    pub state: Arc<AppState>,
    router: Router,
}

impl TestApp {
    /// App with the default (merge) duplicate policy.
    pub async fn new() -> Self {
        Self::with_policy(DuplicatePolicy::Merge).await
    }

    pub async fn with_policy(policy: DuplicatePolicy) -> Self {
        let cfg = AppConfig {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            log_level: "info".to_string(),
            log_json: false,
            auto_migrate: true,
            // In-memory SQLite: one connection, or each would see its own db
            db_max_connections: 1,
            db_min_connections: 1,
            cart: CartConfig {
                on_duplicate: policy,
            },
        };

        let pool = db::establish_connection(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");
        let db = Arc::new(pool);

        let (event_tx, event_rx) = mpsc::channel(64);
        let event_sender = EventSender::new(event_tx);
        tokio::spawn(events::process_events(event_rx));

        let services = AppServices::new(db.clone(), Arc::new(event_sender.clone()), &cfg);
        let state = Arc::new(AppState {
            db,
            config: cfg,
            event_sender,
            services,
        });
        let router = storefront_api::app(state.clone());

        Self { state, router }
    }

    /// Sends one request and returns status plus parsed JSON body
    /// (`Value::Null` for empty bodies).
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                builder.body(Body::from(json.to_string())).unwrap()
            }
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request should not fail at the transport level");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to read response body")
            .to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    // Seed helpers writing through the entities directly.

    pub async fn seed_category(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        category::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            description: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed category");
        id
    }

    pub async fn seed_product(&self, name: &str, price: Decimal, category_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        product::ActiveModel {
            id: Set(id),
            name: Set(name.to_string()),
            description: Set(Some(format!("{} description", name))),
            price: Set(price),
            stock: Set(10),
            featured: Set(false),
            image_url: Set(None),
            category_id: Set(category_id),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed product");
        id
    }

    pub async fn seed_user(&self, email: &str) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        user::ActiveModel {
            id: Set(id),
            email: Set(email.to_string()),
            password_hash: Set("$argon2id$test-hash".to_string()),
            name: Set(Some("Test Shopper".to_string())),
            is_admin: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.state.db)
        .await
        .expect("failed to seed user");
        id
    }
}

/// Parses a JSON value (string-encoded decimal) into a `Decimal`.
#[allow(dead_code)]
pub fn as_decimal(value: &Value) -> Decimal {
    serde_json::from_value(value.clone()).expect("value should be a decimal")
}
