#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use giveaway_backend::server::config::ServerConfig;
use giveaway_backend::services::account_provider::{AccountError, AccountProvider, NewAccount};
use giveaway_backend::services::bot_token::BotToken;
use giveaway_backend::services::token_store::{StoreError, TokenStore};
use giveaway_backend::web::{AppState, create_axum_router};
use sea_orm::DatabaseConnection;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Barrier, Semaphore};
use uuid::Uuid;

pub const JWT_SECRET: &str = "test-secret-0123456789";

/// In-memory token mappings with a unique token column.
#[derive(Default)]
pub struct MemoryTokenStore {
    records: Mutex<HashMap<String, Uuid>>,
    pub fail_lookup: AtomicBool,
    pub fail_insert: AtomicBool,
    pub lookups: AtomicUsize,
    pub inserts: AtomicUsize,
    /// The first `parties` lookups read the table, then wait for each other.
    lookup_barrier: Option<(usize, Arc<Barrier>)>,
    /// When set, inserts wait for `release_inserts`.
    insert_gate: Option<Arc<Semaphore>>,
}

impl MemoryTokenStore {
    /// Forces `parties` concurrent registrations to all miss the lookup.
    pub fn with_lookup_barrier(parties: usize) -> Self {
        Self {
            lookup_barrier: Some((parties, Arc::new(Barrier::new(parties)))),
            ..Default::default()
        }
    }

    /// Holds every insert until `release_inserts` is called.
    pub fn hold_inserts(mut self) -> Self {
        self.insert_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    pub fn release_inserts(&self) {
        if let Some(gate) = &self.insert_gate {
            gate.add_permits(64);
        }
    }

    pub fn seed(&self, token: &str, account_id: Uuid) {
        self.records.lock().unwrap().insert(token.to_string(), account_id);
    }

    pub fn get(&self, token: &str) -> Option<Uuid> {
        self.records.lock().unwrap().get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn find_account(&self, token: &BotToken) -> Result<Option<Uuid>, StoreError> {
        let call = self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookup.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("connection refused".to_string()));
        }
        let found = self.get(token.as_str());
        if let Some((parties, barrier)) = &self.lookup_barrier {
            if call < *parties {
                barrier.wait().await;
            }
        }
        Ok(found)
    }

    async fn insert(&self, account_id: Uuid, token: &BotToken) -> Result<(), StoreError> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.insert_gate {
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Backend("disk full".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        if records.contains_key(token.as_str()) {
            return Err(StoreError::Duplicate);
        }
        records.insert(token.as_str().to_string(), account_id);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredAccount {
    pub email: String,
    pub password: String,
    pub confirmed: bool,
}

/// In-memory accounts, unique by email unless `enforce_unique_email` is off.
pub struct MemoryAccounts {
    accounts: Mutex<HashMap<Uuid, StoredAccount>>,
    pub enforce_unique_email: bool,
    pub fail_create: AtomicBool,
    pub fail_delete: AtomicBool,
    pub creates: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl Default for MemoryAccounts {
    fn default() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            enforce_unique_email: true,
            fail_create: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            creates: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }
}

impl MemoryAccounts {
    pub fn without_email_constraint() -> Self {
        Self {
            enforce_unique_email: false,
            ..Default::default()
        }
    }

    pub fn seed(&self, email: &str, password: &str) -> Uuid {
        let id = Uuid::new_v4();
        self.accounts.lock().unwrap().insert(
            id,
            StoredAccount {
                email: email.to_string(),
                password: password.to_string(),
                confirmed: true,
            },
        );
        id
    }

    pub fn get(&self, id: Uuid) -> Option<StoredAccount> {
        self.accounts.lock().unwrap().get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap().len()
    }
}

#[async_trait]
impl AccountProvider for MemoryAccounts {
    async fn create_account(&self, account: NewAccount<'_>) -> Result<Uuid, AccountError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(AccountError::Backend("auth service unavailable".to_string()));
        }
        let mut accounts = self.accounts.lock().unwrap();
        if self.enforce_unique_email && accounts.values().any(|a| a.email == account.email) {
            return Err(AccountError::EmailTaken);
        }
        let id = Uuid::new_v4();
        accounts.insert(
            id,
            StoredAccount {
                email: account.email.to_string(),
                password: account.password.to_string(),
                confirmed: account.confirmed,
            },
        );
        Ok(id)
    }

    async fn delete_account(&self, account_id: Uuid) -> Result<(), AccountError> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(AccountError::Backend("auth service unavailable".to_string()));
        }
        self.accounts.lock().unwrap().remove(&account_id);
        Ok(())
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: "postgres://localhost/test".to_string(),
        jwt_secret: JWT_SECRET.to_string(),
        listen_addr: "127.0.0.1:0".to_string(),
        log_dir: "logs".to_string(),
        bcrypt_cost: 4,
        db_max_connections: 1,
    }
}

/// Router whose registration path runs on the in-memory fakes.
pub fn app_with(db_pool: DatabaseConnection, tokens: Arc<MemoryTokenStore>, accounts: Arc<MemoryAccounts>) -> Router {
    let state = AppState {
        db_pool: Arc::new(db_pool),
        config: Arc::new(test_config()),
        token_store: tokens,
        accounts,
    };
    create_axum_router(Arc::new(state))
}

pub async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
