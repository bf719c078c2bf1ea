//! Idempotent account provisioning keyed by a Telegram bot token.
//!
//! A bot token maps to at most one account. Registering a token that is
//! already mapped returns the existing account; otherwise a pre-confirmed
//! account is created with the synthetic email `<bot-id>@telegram.bot` and the
//! raw token as its password, and the mapping is stored.
//!
//! The lookup and the two writes are not one transaction. Races between two
//! registrations of the same token are settled by the unique constraints on
//! the account email and on the token column: the loser re-reads the mapping
//! and returns the winner's account. An account whose mapping could not be
//! stored is deleted again.

use thiserror::Error;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::services::account_provider::{AccountError, AccountProvider, NewAccount};
use crate::services::bot_token::{BotToken, InvalidBotToken};
use crate::services::token_store::{StoreError, TokenStore};

/// Outcome of a successful registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The token was already mapped; nothing was written.
    Existing(Uuid),
    /// A new account and mapping were created.
    Created(Uuid),
}

impl Registration {
    pub fn account_id(&self) -> Uuid {
        match self {
            Registration::Existing(id) | Registration::Created(id) => *id,
        }
    }
}

#[derive(Error, Debug)]
pub enum RegistrationError {
    #[error(transparent)]
    InvalidToken(#[from] InvalidBotToken),
    #[error("Error checking for existing token")]
    Lookup(#[source] StoreError),
    #[error("Error creating user")]
    Provision(#[source] AccountError),
    #[error("Error storing bot token")]
    Persist(#[source] StoreError),
    #[error("Bot {bot_id} is already registered with a different token or its registration is still in progress")]
    Conflict { bot_id: String },
}

/// Returns the account linked to `raw_token`, creating it on first use.
pub async fn register_bot(
    tokens: &dyn TokenStore,
    accounts: &dyn AccountProvider,
    raw_token: &str,
) -> Result<Registration, RegistrationError> {
    let token = BotToken::parse(raw_token)?;
    let bot_id = token.bot_id();

    let existing = tokens.find_account(&token).await.map_err(|e| {
        error!(bot_id, error = %e, "Error checking for existing token.");
        RegistrationError::Lookup(e)
    })?;
    if let Some(account_id) = existing {
        debug!(bot_id, %account_id, "Bot token already registered.");
        return Ok(Registration::Existing(account_id));
    }

    let email = token.account_email();
    let created = accounts
        .create_account(NewAccount {
            email: &email,
            password: token.as_str(),
            confirmed: true,
        })
        .await;
    let account_id = match created {
        Ok(id) => id,
        Err(AccountError::EmailTaken) => {
            warn!(bot_id, "Account for bot already exists, re-reading token mapping.");
            return resolve_existing(tokens, &token).await;
        }
        Err(e) => {
            error!(bot_id, error = %e, "Error creating user.");
            return Err(RegistrationError::Provision(e));
        }
    };

    match tokens.insert(account_id, &token).await {
        Ok(()) => {
            info!(bot_id, %account_id, "Bot registered.");
            Ok(Registration::Created(account_id))
        }
        Err(StoreError::Duplicate) => {
            warn!(bot_id, %account_id, "Token was mapped concurrently, discarding the new account.");
            rollback_account(accounts, account_id, bot_id).await;
            resolve_existing(tokens, &token).await
        }
        Err(e) => {
            error!(bot_id, %account_id, error = %e, "Error storing bot token.");
            rollback_account(accounts, account_id, bot_id).await;
            Err(RegistrationError::Persist(e))
        }
    }
}

/// Second lookup after losing a race. A mapping that is still missing means
/// the bot id belongs to another token or the winner has not finished yet.
async fn resolve_existing(tokens: &dyn TokenStore, token: &BotToken) -> Result<Registration, RegistrationError> {
    match tokens.find_account(token).await {
        Ok(Some(account_id)) => Ok(Registration::Existing(account_id)),
        Ok(None) => Err(RegistrationError::Conflict {
            bot_id: token.bot_id().to_string(),
        }),
        Err(e) => {
            error!(bot_id = token.bot_id(), error = %e, "Error re-reading token mapping.");
            Err(RegistrationError::Lookup(e))
        }
    }
}

async fn rollback_account(accounts: &dyn AccountProvider, account_id: Uuid, bot_id: &str) {
    if let Err(e) = accounts.delete_account(account_id).await {
        error!(
            bot_id,
            %account_id,
            error = %e,
            "Failed to delete account after token mapping failed; account is left without a token."
        );
    }
}
