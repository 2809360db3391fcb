use crate::{
    dto::{OrderItemResponse, OrderResponse, ProductResponse, UserSummary},
    entities::{
        cart_item, order, order_item, Category, Order, OrderItem, OrderStatus, Product, User,
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// One requested order line
#[derive(Debug, Deserialize)]
pub struct OrderLineInput {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Input for creating an order
#[derive(Debug, Deserialize)]
pub struct CreateOrderInput {
    pub user_id: Uuid,
    pub items: Vec<OrderLineInput>,
}

/// Order service.
///
/// Order creation is all-or-nothing: the user and every referenced product
/// are validated, the total is computed from live prices, each line
/// snapshots its unit price, and the user's cart rows are deleted — all in
/// a single transaction. A missing reference rolls the whole thing back.
#[derive(Clone)]
pub struct OrderService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl OrderService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Creates an order from the given lines and clears the user's cart.
    #[instrument(skip(self))]
    pub async fn create(&self, input: CreateOrderInput) -> Result<OrderResponse, ServiceError> {
        if input.items.is_empty() {
            return Err(ServiceError::Validation(
                "Order must contain at least one item".to_string(),
            ));
        }

        let txn = self.db.begin().await?;

        let user = User::find_by_id(input.user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        // Resolve every product up front; any miss fails the whole order.
        let mut lines = Vec::with_capacity(input.items.len());
        let mut total = Decimal::ZERO;
        for line in &input.items {
            if line.quantity < 1 {
                return Err(ServiceError::Validation(
                    "Quantity must be at least 1".to_string(),
                ));
            }
            let product = Product::find_by_id(line.product_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Product {} not found", line.product_id))
                })?;
            total += product.price * Decimal::from(line.quantity);
            lines.push((product, line.quantity));
        }

        let order_id = Uuid::new_v4();
        let now = Utc::now();
        let order = order::ActiveModel {
            id: Set(order_id),
            user_id: Set(input.user_id),
            total: Set(total),
            status: Set(OrderStatus::Pending),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let order = order.insert(&txn).await?;

        // Snapshot each line's unit price at order time.
        for (product, quantity) in &lines {
            let item = order_item::ActiveModel {
                id: Set(Uuid::new_v4()),
                order_id: Set(order_id),
                product_id: Set(product.id),
                quantity: Set(*quantity),
                price: Set(product.price),
                created_at: Set(now),
            };
            item.insert(&txn).await?;
        }

        // Clearing the cart commits or rolls back with the order.
        cart_item::Entity::delete_many()
            .filter(cart_item::Column::UserId.eq(input.user_id))
            .exec(&txn)
            .await?;

        txn.commit().await?;

        self.event_sender
            .send_or_log(Event::OrderCreated(order_id))
            .await;

        info!(
            "Created order {} for user {}: total {}",
            order_id, input.user_id, total
        );
        self.build_view(&*self.db, order, Some(user)).await
    }

    /// Lists orders newest-first, optionally for one user.
    #[instrument(skip(self))]
    pub async fn list(&self, user_id: Option<Uuid>) -> Result<Vec<OrderResponse>, ServiceError> {
        let mut query = Order::find();
        if let Some(user_id) = user_id {
            query = query.filter(order::Column::UserId.eq(user_id));
        }
        let orders = query
            .order_by_desc(order::Column::CreatedAt)
            .all(&*self.db)
            .await?;

        let mut out = Vec::with_capacity(orders.len());
        for order in orders {
            out.push(self.build_view(&*self.db, order, None).await?);
        }
        Ok(out)
    }

    /// Fetches one order with user and lines embedded.
    pub async fn get(&self, id: Uuid) -> Result<OrderResponse, ServiceError> {
        let order = Order::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;
        self.build_view(&*self.db, order, None).await
    }

    /// Moves an order to a new status.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        id: Uuid,
        new_status: OrderStatus,
    ) -> Result<OrderResponse, ServiceError> {
        let order = Order::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Order not found".to_string()))?;

        let old_status = order.status;
        let mut model: order::ActiveModel = order.into();
        model.status = Set(new_status);
        model.updated_at = Set(Utc::now());
        let order = model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::OrderStatusChanged {
                order_id: id,
                old_status,
                new_status,
            })
            .await;

        info!("Order {} status: {} -> {}", id, old_status, new_status);
        self.build_view(&*self.db, order, None).await
    }

    async fn build_view<C: ConnectionTrait>(
        &self,
        conn: &C,
        order: order::Model,
        user: Option<crate::entities::UserModel>,
    ) -> Result<OrderResponse, ServiceError> {
        let user = match user {
            Some(user) => user,
            None => User::find_by_id(order.user_id)
                .one(conn)
                .await?
                .ok_or_else(|| {
                    ServiceError::Internal(format!("Order {} has no user", order.id))
                })?,
        };

        let rows = order.find_related(OrderItem).all(conn).await?;
        let mut items = Vec::with_capacity(rows.len());
        for item in rows {
            // The product may be gone; the line's snapshot stays valid.
            let product = match Product::find_by_id(item.product_id).one(conn).await? {
                Some(product) => {
                    let category = Category::find_by_id(product.category_id)
                        .one(conn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::Internal(format!(
                                "Product {} has no category",
                                product.id
                            ))
                        })?;
                    Some(ProductResponse::from_parts(product, category))
                }
                None => None,
            };
            items.push(OrderItemResponse {
                id: item.id,
                product_id: item.product_id,
                quantity: item.quantity,
                price: item.price,
                product,
            });
        }

        Ok(OrderResponse {
            id: order.id,
            user_id: order.user_id,
            total: order.total,
            status: order.status,
            created_at: order.created_at,
            updated_at: order.updated_at,
            user: UserSummary::from(user),
            items,
        })
    }
}
