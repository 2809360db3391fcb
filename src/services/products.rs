use crate::{
    dto::ProductResponse,
    entities::{category, product, Category, Product},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Catalog filters for the product listing. All filters compose; `search`
/// is a case-insensitive substring match over name and description.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListFilter {
    pub category_id: Option<Uuid>,
    pub featured: Option<bool>,
    pub search: Option<String>,
}

/// Input for creating a product
#[derive(Debug, Deserialize)]
pub struct CreateProductInput {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub featured: bool,
    pub image_url: Option<String>,
    pub category_id: Uuid,
}

/// Input for updating a product. Absent fields keep their current values.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
    pub featured: Option<bool>,
    pub image_url: Option<String>,
    pub category_id: Option<Uuid>,
}

/// Product catalog service: CRUD plus composed listing filters.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Lists products newest-first with their categories embedded.
    ///
    /// The `featured` filter only narrows when explicitly `true`, matching
    /// the storefront's "featured only" toggle.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        filter: ProductListFilter,
    ) -> Result<Vec<ProductResponse>, ServiceError> {
        let mut query = Product::find();

        if let Some(category_id) = filter.category_id {
            query = query.filter(product::Column::CategoryId.eq(category_id));
        }

        if filter.featured == Some(true) {
            query = query.filter(product::Column::Featured.eq(true));
        }

        if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            product::Entity,
                            product::Column::Name,
                        ))))
                        .like(pattern.clone()),
                    )
                    .add(
                        Expr::expr(Func::lower(Expr::col((
                            product::Entity,
                            product::Column::Description,
                        ))))
                        .like(pattern),
                    ),
            );
        }

        let rows = query
            .find_also_related(Category)
            .order_by_desc(product::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        rows.into_iter()
            .map(|(product, category)| {
                let category = category.ok_or_else(|| {
                    ServiceError::Internal(format!("Product {} has no category", product.id))
                })?;
                Ok(ProductResponse::from_parts(product, category))
            })
            .collect()
    }

    /// Creates a product after validating its category reference.
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateProductInput) -> Result<ProductResponse, ServiceError> {
        validate_price_and_stock(input.price, input.stock)?;

        let category = Category::find_by_id(input.category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))?;

        let product_id = Uuid::new_v4();
        let now = Utc::now();
        let model = product::ActiveModel {
            id: Set(product_id),
            name: Set(input.name),
            description: Set(input.description),
            price: Set(input.price),
            stock: Set(input.stock),
            featured: Set(input.featured),
            image_url: Set(input.image_url),
            category_id: Set(input.category_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let product = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductCreated(product_id))
            .await;

        info!("Created product: {}", product_id);
        Ok(ProductResponse::from_parts(product, category))
    }

    /// Fetches one product with its category.
    pub async fn get(&self, id: Uuid) -> Result<ProductResponse, ServiceError> {
        let (product, category) = Product::find_by_id(id)
            .find_also_related(Category)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let category = category.ok_or_else(|| {
            ServiceError::Internal(format!("Product {} has no category", product.id))
        })?;
        Ok(ProductResponse::from_parts(product, category))
    }

    /// Partial update: provided fields replace, absent fields keep the
    /// stored values.
    #[instrument(skip(self))]
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateProductInput,
    ) -> Result<ProductResponse, ServiceError> {
        let existing = Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let price = input.price.unwrap_or(existing.price);
        let stock = input.stock.unwrap_or(existing.stock);
        validate_price_and_stock(price, stock)?;

        if let Some(category_id) = input.category_id {
            Category::find_by_id(category_id)
                .one(&*self.db)
                .await?
                .ok_or_else(|| ServiceError::NotFound("Category not found".to_string()))?;
        }

        let mut model: product::ActiveModel = existing.clone().into();
        if let Some(name) = input.name {
            model.name = Set(name);
        }
        if let Some(description) = input.description {
            model.description = Set(Some(description));
        }
        if let Some(image_url) = input.image_url {
            model.image_url = Set(Some(image_url));
        }
        if let Some(category_id) = input.category_id {
            model.category_id = Set(category_id);
        }
        if let Some(featured) = input.featured {
            model.featured = Set(featured);
        }
        model.price = Set(price);
        model.stock = Set(stock);
        model.updated_at = Set(Utc::now());

        let product = model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductUpdated(id))
            .await;

        let category = Category::find_by_id(product.category_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal(format!("Product {} has no category", product.id))
            })?;
        Ok(ProductResponse::from_parts(product, category))
    }

    /// Deletes a product. Cart rows referencing it go with it (cascade);
    /// order lines keep their snapshot.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        Product::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        Product::delete_by_id(id).exec(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::ProductDeleted(id))
            .await;

        info!("Deleted product: {}", id);
        Ok(())
    }
}

fn validate_price_and_stock(price: Decimal, stock: i32) -> Result<(), ServiceError> {
    if price < Decimal::ZERO {
        return Err(ServiceError::Validation(
            "Price must not be negative".to_string(),
        ));
    }
    if stock < 0 {
        return Err(ServiceError::Validation(
            "Stock must not be negative".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_price_is_rejected() {
        let err = validate_price_and_stock(dec!(-0.01), 0).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn negative_stock_is_rejected() {
        let err = validate_price_and_stock(dec!(1.00), -1).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn zero_price_and_stock_are_allowed() {
        assert!(validate_price_and_stock(Decimal::ZERO, 0).is_ok());
    }

    #[test]
    fn filter_deserializes_from_query_shape() {
        let filter: ProductListFilter =
            serde_json::from_str(r#"{"featured": true, "search": "lamp"}"#).unwrap();
        assert_eq!(filter.featured, Some(true));
        assert_eq!(filter.search.as_deref(), Some("lamp"));
        assert!(filter.category_id.is_none());
    }
}
