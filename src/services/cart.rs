use crate::{
    config::DuplicatePolicy,
    dto::{CartItemResponse, CartResponse, ProductResponse},
    entities::{cart_item, CartItem, Category, Product, User},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for adding an item to a user's cart
#[derive(Debug, Deserialize)]
pub struct AddToCartInput {
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Shopping cart service.
///
/// Carts are keyed by user: one `cart_items` row per (user, product) pair,
/// enforced by a unique index. Totals are derived on every read, never
/// stored. What happens when an add hits an existing pair is decided by
/// the configured [`DuplicatePolicy`].
#[derive(Clone)]
pub struct CartService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
    on_duplicate: DuplicatePolicy,
}

impl CartService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: Arc<EventSender>,
        on_duplicate: DuplicatePolicy,
    ) -> Self {
        Self {
            db,
            event_sender,
            on_duplicate,
        }
    }

    /// Loads a user's cart with derived total and count.
    #[instrument(skip(self))]
    pub async fn get_cart(&self, user_id: Uuid) -> Result<CartResponse, ServiceError> {
        let rows = CartItem::find()
            .filter(cart_item::Column::UserId.eq(user_id))
            .find_also_related(Product)
            .all(&*self.db)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for (item, product) in rows {
            items.push(self.build_item(&*self.db, item, product).await?);
        }
        Ok(CartResponse::new(items))
    }

    /// Adds a product to the cart.
    ///
    /// Validates that both the user and the product exist (404 otherwise).
    /// For an existing (user, product) row the configured policy applies:
    /// merge increments the stored quantity, reject answers 409 and leaves
    /// the row untouched.
    #[instrument(skip(self))]
    pub async fn add_item(&self, input: AddToCartInput) -> Result<CartItemResponse, ServiceError> {
        User::find_by_id(input.user_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("User not found".to_string()))?;

        let product = Product::find_by_id(input.product_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Product not found".to_string()))?;

        let existing = CartItem::find()
            .filter(cart_item::Column::UserId.eq(input.user_id))
            .filter(cart_item::Column::ProductId.eq(input.product_id))
            .one(&*self.db)
            .await?;

        let item = match existing {
            Some(item) => match self.on_duplicate {
                DuplicatePolicy::Merge => {
                    let quantity = item.quantity + input.quantity;
                    let mut model: cart_item::ActiveModel = item.into();
                    model.quantity = Set(quantity);
                    model.updated_at = Set(Utc::now());
                    model.update(&*self.db).await?
                }
                DuplicatePolicy::Reject => {
                    return Err(ServiceError::Conflict(
                        "Item is already in the cart".to_string(),
                    ));
                }
            },
            None => {
                let now = Utc::now();
                let model = cart_item::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    user_id: Set(input.user_id),
                    product_id: Set(input.product_id),
                    quantity: Set(input.quantity),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                model.insert(&*self.db).await?
            }
        };

        self.event_sender
            .send_or_log(Event::CartItemAdded {
                user_id: input.user_id,
                product_id: input.product_id,
            })
            .await;

        info!(
            "Added product {} x{} to cart of user {}",
            input.product_id, input.quantity, input.user_id
        );
        self.build_item(&*self.db, item, Some(product)).await
    }

    /// Replaces the quantity of a cart row. Quantities below one are
    /// rejected; removal is its own operation.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartItemResponse, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::Validation(
                "Quantity must be at least 1".to_string(),
            ));
        }

        let item = CartItem::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart item not found".to_string()))?;

        let mut model: cart_item::ActiveModel = item.into();
        model.quantity = Set(quantity);
        model.updated_at = Set(Utc::now());
        let item = model.update(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CartItemUpdated { item_id, quantity })
            .await;

        self.build_item(&*self.db, item, None).await
    }

    /// Removes a cart row. Answers 404 when the row is already gone.
    #[instrument(skip(self))]
    pub async fn remove_item(&self, item_id: Uuid) -> Result<(), ServiceError> {
        let item = CartItem::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Cart item not found".to_string()))?;

        CartItem::delete_by_id(item.id).exec(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::CartItemRemoved(item_id))
            .await;

        info!("Removed cart item: {}", item_id);
        Ok(())
    }

    /// Empties a user's cart.
    #[instrument(skip(self))]
    pub async fn clear_cart(&self, user_id: Uuid) -> Result<(), ServiceError> {
        CartItem::delete_many()
            .filter(cart_item::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await?;

        self.event_sender
            .send_or_log(Event::CartCleared { user_id })
            .await;

        info!("Cleared cart for user: {}", user_id);
        Ok(())
    }

    async fn build_item<C: ConnectionTrait>(
        &self,
        conn: &C,
        item: cart_item::Model,
        product: Option<crate::entities::ProductModel>,
    ) -> Result<CartItemResponse, ServiceError> {
        let product = match product {
            Some(product) => product,
            None => Product::find_by_id(item.product_id)
                .one(conn)
                .await?
                .ok_or_else(|| {
                    ServiceError::Internal(format!("Cart item {} has no product", item.id))
                })?,
        };
        let category = Category::find_by_id(product.category_id)
            .one(conn)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal(format!("Product {} has no category", product.id))
            })?;

        Ok(CartItemResponse {
            id: item.id,
            user_id: item.user_id,
            product_id: item.product_id,
            quantity: item.quantity,
            product: ProductResponse::from_parts(product, category),
        })
    }
}
