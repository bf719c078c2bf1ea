use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use crate::db::{entities::giveaway, enums::GiveawayStatus};

/// Column values for a giveaway that has passed validation.
#[derive(Debug, Clone)]
pub struct NewGiveaway {
    pub user_id: Uuid,
    pub channel_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub prize: String,
    pub num_winners: i32,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

/// Inserts a giveaway in the `pending` state.
pub async fn create_giveaway(db: &DatabaseConnection, new: NewGiveaway) -> Result<giveaway::Model, DbErr> {
    let record = giveaway::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(new.user_id),
        channel_id: Set(new.channel_id),
        title: Set(new.title),
        description: Set(new.description),
        prize: Set(new.prize),
        num_winners: Set(new.num_winners),
        start_date: Set(new.start_date),
        end_date: Set(new.end_date),
        status: Set(GiveawayStatus::Pending),
        created_at: Set(Utc::now()),
    };
    record.insert(db).await
}

/// Retrieves all giveaways owned by a user, newest first.
pub async fn get_giveaways_by_user_id(db: &DatabaseConnection, user_id: Uuid) -> Result<Vec<giveaway::Model>, DbErr> {
    giveaway::Entity::find()
        .filter(giveaway::Column::UserId.eq(user_id))
        .order_by_desc(giveaway::Column::CreatedAt)
        .all(db)
        .await
}

pub async fn get_giveaway_for_user(
    db: &DatabaseConnection,
    giveaway_id: Uuid,
    user_id: Uuid,
) -> Result<Option<giveaway::Model>, DbErr> {
    giveaway::Entity::find_by_id(giveaway_id)
        .filter(giveaway::Column::UserId.eq(user_id))
        .one(db)
        .await
}

pub async fn delete_giveaway(db: &DatabaseConnection, giveaway_id: Uuid, user_id: Uuid) -> Result<u64, DbErr> {
    let result = giveaway::Entity::delete_many()
        .filter(giveaway::Column::Id.eq(giveaway_id))
        .filter(giveaway::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}
