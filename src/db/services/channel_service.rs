use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::db::entities::channel;

// --- Channel Service Functions ---

/// Retrieves all channels owned by a user, oldest first.
pub async fn get_channels_by_user_id(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<channel::Model>, DbErr> {
    channel::Entity::find()
        .filter(channel::Column::UserId.eq(user_id))
        .order_by_asc(channel::Column::CreatedAt)
        .all(db)
        .await
}

/// Retrieves a channel only if it belongs to the given user.
pub async fn get_channel_for_user(
    db: &DatabaseConnection,
    channel_id: Uuid,
    user_id: Uuid,
) -> Result<Option<channel::Model>, DbErr> {
    channel::Entity::find_by_id(channel_id)
        .filter(channel::Column::UserId.eq(user_id))
        .one(db)
        .await
}

/// Creates a new channel for a user.
pub async fn create_channel(
    db: &DatabaseConnection,
    user_id: Uuid,
    channel_name: &str,
    telegram_channel_id: &str,
) -> Result<channel::Model, DbErr> {
    let new_channel = channel::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        channel_name: Set(channel_name.to_string()),
        telegram_channel_id: Set(telegram_channel_id.to_string()),
        created_at: Set(Utc::now()),
    };
    new_channel.insert(db).await
}

/// Deletes a channel. Giveaways attached to it cascade.
pub async fn delete_channel(db: &DatabaseConnection, channel_id: Uuid, user_id: Uuid) -> Result<u64, DbErr> {
    let result = channel::Entity::delete_many()
        .filter(channel::Column::Id.eq(channel_id))
        .filter(channel::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
