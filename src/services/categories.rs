use crate::{
    dto::CategoryResponse,
    entities::{category, product, Category, Product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for creating a category
#[derive(Debug, Deserialize)]
pub struct CreateCategoryInput {
    pub name: String,
    pub description: Option<String>,
}

/// Category service: listing with product counts, creation.
#[derive(Clone)]
pub struct CategoryService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl CategoryService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lists categories name-ascending, each with its product count.
    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<CategoryResponse>, ServiceError> {
        let categories = Category::find()
            .order_by_asc(category::Column::Name)
            .all(&*self.db)
            .await?;

        let mut out = Vec::with_capacity(categories.len());
        for category in categories {
            let product_count = Product::find()
                .filter(product::Column::CategoryId.eq(category.id))
                .count(&*self.db)
                .await?;
            out.push(CategoryResponse {
                category,
                product_count,
            });
        }
        Ok(out)
    }

    /// Creates a category.
    #[instrument(skip(self))]
    pub async fn create(
        &self,
        input: CreateCategoryInput,
    ) -> Result<category::Model, ServiceError> {
        let category_id = Uuid::new_v4();
        let now = Utc::now();
        let model = category::ActiveModel {
            id: Set(category_id),
            name: Set(input.name),
            description: Set(input.description),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let category = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CategoryCreated(category_id))
            .await;

        info!("Created category: {}", category_id);
        Ok(category)
    }
}
