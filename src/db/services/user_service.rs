use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set};
use uuid::Uuid;

use crate::db::entities::user;

// --- User Service Functions ---

/// Creates a new user. `confirmed` marks the email as verified at creation time.
pub async fn create_user(
    db: &DatabaseConnection,
    email: &str,
    password_hash: &str,
    confirmed: bool,
) -> Result<user::Model, DbErr> {
    let now = Utc::now();
    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        email_confirmed_at: Set(confirmed.then_some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    };
    new_user.insert(db).await
}

/// Retrieves a user by their email address.
pub async fn get_user_by_email(db: &DatabaseConnection, email: &str) -> Result<Option<user::Model>, DbErr> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await
}

/// Deletes a user. Token mappings, channels and giveaways cascade.
pub async fn delete_user(db: &DatabaseConnection, user_id: Uuid) -> Result<u64, DbErr> {
    let result = user::Entity::delete_by_id(user_id).exec(db).await?;
    Ok(result.rows_affected)
}
