use crate::{
    entities::{user, User, UserModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Argon2,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;

/// Input for registering a user
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: Option<String>,
}

/// User account service. Registration only; session handling is out of
/// scope for this API.
#[derive(Clone)]
pub struct UserService {
    db: Arc<DatabaseConnection>,
    event_sender: Arc<EventSender>,
}

impl UserService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Arc<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Registers a new account. The email must be unused; the password is
    /// stored as an argon2 hash and never serialized back out.
    #[instrument(skip(self, input))]
    pub async fn register(&self, input: RegisterInput) -> Result<UserModel, ServiceError> {
        let existing = User::find()
            .filter(user::Column::Email.eq(&input.email))
            .one(&*self.db)
            .await?;

        if existing.is_some() {
            return Err(ServiceError::Conflict(
                "A user with this email already exists".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;

        let user_id = Uuid::new_v4();
        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(user_id),
            email: Set(input.email),
            password_hash: Set(password_hash),
            name: Set(input.name),
            is_admin: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let user = model.insert(&*self.db).await?;

        self.event_sender
            .send_or_log(Event::UserRegistered(user_id))
            .await;

        info!("Registered user: {}", user_id);
        Ok(user)
    }
}

fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::Internal(format!("Password hashing failed: {}", e)))
}
