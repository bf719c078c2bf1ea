use async_trait::async_trait;
use sea_orm::{DatabaseConnection, DbErr};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::db::services::{self, is_unique_violation};

/// Credentials for an account about to be created.
#[derive(Clone, Copy)]
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password: &'a str,
    /// Skip the email verification step.
    pub confirmed: bool,
}

#[derive(Error, Debug)]
pub enum AccountError {
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Password hashing failed: {0}")]
    Hashing(String),
    #[error("Account store error: {0}")]
    Backend(String),
}

impl From<DbErr> for AccountError {
    fn from(err: DbErr) -> Self {
        if is_unique_violation(&err) {
            AccountError::EmailTaken
        } else {
            AccountError::Backend(err.to_string())
        }
    }
}

/// Creates and removes login identities.
#[async_trait]
pub trait AccountProvider: Send + Sync {
    /// Creates an account and returns its id. Fails with
    /// [`AccountError::EmailTaken`] when the email is already in use.
    async fn create_account(&self, account: NewAccount<'_>) -> Result<Uuid, AccountError>;

    async fn delete_account(&self, account_id: Uuid) -> Result<(), AccountError>;
}

/// Hashes a password with bcrypt off the async worker threads.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AccountError> {
    let password = password.to_string();
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))?
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

/// `AccountProvider` backed by the `users` table with bcrypt password hashes.
pub struct DbAccountProvider {
    db: Arc<DatabaseConnection>,
    bcrypt_cost: u32,
}

impl DbAccountProvider {
    pub fn new(db: Arc<DatabaseConnection>, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }
}

#[async_trait]
impl AccountProvider for DbAccountProvider {
    async fn create_account(&self, account: NewAccount<'_>) -> Result<Uuid, AccountError> {
        let password_hash = hash_password(account.password, self.bcrypt_cost).await?;
        let user = services::create_user(&self.db, account.email, &password_hash, account.confirmed).await?;
        debug!(user_id = %user.id, confirmed = account.confirmed, "Created account.");
        Ok(user.id)
    }

    async fn delete_account(&self, account_id: Uuid) -> Result<(), AccountError> {
        let deleted = services::delete_user(&self.db, account_id).await?;
        debug!(user_id = %account_id, deleted, "Deleted account.");
        Ok(())
    }
}
