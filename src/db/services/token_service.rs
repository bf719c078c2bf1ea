use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, NotSet, QueryFilter, Set};
use uuid::Uuid;

use crate::db::entities::user_token;

/// Looks up the account linked to a bot token. Exact match only.
pub async fn get_user_id_by_bot_token(db: &DatabaseConnection, bot_token: &str) -> Result<Option<Uuid>, DbErr> {
    let record = user_token::Entity::find()
        .filter(user_token::Column::BotToken.eq(bot_token))
        .one(db)
        .await?;
    Ok(record.map(|r| r.user_id))
}

/// Inserts a token mapping. Fails with a unique violation if either the token
/// or the account is already mapped.
pub async fn insert_user_token(
    db: &DatabaseConnection,
    user_id: Uuid,
    bot_token: &str,
) -> Result<user_token::Model, DbErr> {
    let record = user_token::ActiveModel {
        id: NotSet,
        user_id: Set(user_id),
        bot_token: Set(bot_token.to_string()),
        created_at: Set(Utc::now()),
    };
    record.insert(db).await
}
