use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::db::services::{self, is_unique_violation};
use crate::services::bot_token::BotToken;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The token (or the account) already has a mapping.
    #[error("Bot token is already registered")]
    Duplicate,
    #[error("Store error: {0}")]
    Backend(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        if is_unique_violation(&err) {
            StoreError::Duplicate
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

/// Persistence for bot token to account mappings.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Returns the account linked to `token`, or `None` when no mapping exists.
    async fn find_account(&self, token: &BotToken) -> Result<Option<Uuid>, StoreError>;

    /// Records a new mapping. Must fail with [`StoreError::Duplicate`] when the
    /// token is already mapped.
    async fn insert(&self, account_id: Uuid, token: &BotToken) -> Result<(), StoreError>;
}

/// `TokenStore` backed by the `user_tokens` table.
pub struct DbTokenStore {
    db: Arc<DatabaseConnection>,
}

impl DbTokenStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TokenStore for DbTokenStore {
    async fn find_account(&self, token: &BotToken) -> Result<Option<Uuid>, StoreError> {
        Ok(services::get_user_id_by_bot_token(&self.db, token.as_str()).await?)
    }

    async fn insert(&self, account_id: Uuid, token: &BotToken) -> Result<(), StoreError> {
        services::insert_user_token(&self.db, account_id, token.as_str()).await?;
        Ok(())
    }
}
