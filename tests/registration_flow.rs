mod common;

use common::{MemoryAccounts, MemoryTokenStore, StoredAccount};
use giveaway_backend::services::registration_service::{Registration, RegistrationError, register_bot};
use std::sync::atomic::Ordering;

#[tokio::test]
async fn first_registration_creates_account_then_returns_it() {
    let tokens = MemoryTokenStore::default();
    let accounts = MemoryAccounts::default();

    let first = register_bot(&tokens, &accounts, "123456:ABCdef").await.unwrap();
    let account_id = match first {
        Registration::Created(id) => id,
        other => panic!("expected a new account, got {other:?}"),
    };
    assert_eq!(
        accounts.get(account_id),
        Some(StoredAccount {
            email: "123456@telegram.bot".to_string(),
            password: "123456:ABCdef".to_string(),
            confirmed: true,
        })
    );
    assert_eq!(tokens.get("123456:ABCdef"), Some(account_id));

    let second = register_bot(&tokens, &accounts, "123456:ABCdef").await.unwrap();
    assert_eq!(second, Registration::Existing(account_id));
    assert_eq!(accounts.creates.load(Ordering::SeqCst), 1);
    assert_eq!(tokens.inserts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn repeated_registration_is_idempotent() {
    let tokens = MemoryTokenStore::default();
    let accounts = MemoryAccounts::default();

    for raw in ["1:a", "42:AAH-x_y9Z", "987654321:Zz"] {
        let first = register_bot(&tokens, &accounts, raw).await.unwrap();
        let second = register_bot(&tokens, &accounts, raw).await.unwrap();
        assert_eq!(first.account_id(), second.account_id());
        assert!(matches!(second, Registration::Existing(_)));
    }
    assert_eq!(accounts.len(), 3);
    assert_eq!(tokens.len(), 3);
}

#[tokio::test]
async fn malformed_token_has_no_side_effects() {
    let tokens = MemoryTokenStore::default();
    let accounts = MemoryAccounts::default();

    for raw in ["", "abc", "123456", "123456:", ":secret", "12 34:abc", "123456:abc def"] {
        let err = register_bot(&tokens, &accounts, raw).await.unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidToken(_)), "{raw:?}");
    }
    assert_eq!(tokens.lookups.load(Ordering::SeqCst), 0);
    assert_eq!(accounts.creates.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn lookup_failure_stops_before_account_creation() {
    let tokens = MemoryTokenStore::default();
    tokens.fail_lookup.store(true, Ordering::SeqCst);
    let accounts = MemoryAccounts::default();

    let err = register_bot(&tokens, &accounts, "123456:ABCdef").await.unwrap_err();
    assert!(matches!(err, RegistrationError::Lookup(_)));
    assert_eq!(err.to_string(), "Error checking for existing token");
    assert_eq!(accounts.creates.load(Ordering::SeqCst), 0);
    assert_eq!(tokens.inserts.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn account_creation_failure_writes_no_mapping() {
    let tokens = MemoryTokenStore::default();
    let accounts = MemoryAccounts::default();
    accounts.fail_create.store(true, Ordering::SeqCst);

    let err = register_bot(&tokens, &accounts, "123456:ABCdef").await.unwrap_err();
    assert!(matches!(err, RegistrationError::Provision(_)));
    assert_eq!(err.to_string(), "Error creating user");
    assert_eq!(tokens.inserts.load(Ordering::SeqCst), 0);
    assert_eq!(tokens.len(), 0);
}

#[tokio::test]
async fn mapping_failure_removes_new_account() {
    let tokens = MemoryTokenStore::default();
    tokens.fail_insert.store(true, Ordering::SeqCst);
    let accounts = MemoryAccounts::default();

    let err = register_bot(&tokens, &accounts, "123456:ABCdef").await.unwrap_err();
    assert!(matches!(err, RegistrationError::Persist(_)));
    assert_eq!(err.to_string(), "Error storing bot token");
    assert_eq!(accounts.deletes.load(Ordering::SeqCst), 1);
    assert_eq!(accounts.len(), 0);
}

#[tokio::test]
async fn failed_rollback_still_reports_mapping_error() {
    let tokens = MemoryTokenStore::default();
    tokens.fail_insert.store(true, Ordering::SeqCst);
    let accounts = MemoryAccounts::default();
    accounts.fail_delete.store(true, Ordering::SeqCst);

    let err = register_bot(&tokens, &accounts, "123456:ABCdef").await.unwrap_err();
    assert!(matches!(err, RegistrationError::Persist(_)));
    // The orphan stays behind; it is only logged.
    assert_eq!(accounts.len(), 1);
}

#[tokio::test]
async fn regenerated_token_for_known_bot_is_a_conflict() {
    let tokens = MemoryTokenStore::default();
    let accounts = MemoryAccounts::default();
    let original = register_bot(&tokens, &accounts, "123456:OldSecret").await.unwrap();

    let err = register_bot(&tokens, &accounts, "123456:NewSecret").await.unwrap_err();
    match err {
        RegistrationError::Conflict { bot_id } => assert_eq!(bot_id, "123456"),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(accounts.len(), 1);
    assert_eq!(tokens.get("123456:OldSecret"), Some(original.account_id()));
    assert_eq!(tokens.get("123456:NewSecret"), None);
}

#[tokio::test]
async fn concurrent_registration_creates_one_account() {
    let tokens = MemoryTokenStore::with_lookup_barrier(2);
    let accounts = MemoryAccounts::default();

    let (a, b) = tokio::join!(
        register_bot(&tokens, &accounts, "123456:ABCdef"),
        register_bot(&tokens, &accounts, "123456:ABCdef"),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.account_id(), b.account_id());
    let created = [a, b].iter().filter(|r| matches!(r, Registration::Created(_))).count();
    assert_eq!(created, 1);
    assert_eq!(accounts.len(), 1);
    assert_eq!(tokens.len(), 1);
}

#[tokio::test]
async fn lost_insert_race_discards_duplicate_account() {
    // Without an email constraint both requests get an account; the token
    // column decides the winner.
    let tokens = MemoryTokenStore::with_lookup_barrier(2);
    let accounts = MemoryAccounts::without_email_constraint();

    let (a, b) = tokio::join!(
        register_bot(&tokens, &accounts, "123456:ABCdef"),
        register_bot(&tokens, &accounts, "123456:ABCdef"),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.account_id(), b.account_id());
    assert_eq!(accounts.creates.load(Ordering::SeqCst), 2);
    assert_eq!(accounts.deletes.load(Ordering::SeqCst), 1);
    assert_eq!(accounts.len(), 1);
    assert_eq!(tokens.get("123456:ABCdef"), Some(a.account_id()));
}

#[tokio::test]
async fn race_lost_before_mapping_is_written_is_a_conflict() {
    // The winner's mapping insert is held back, so the loser hits the taken
    // email while the token is still unmapped.
    let tokens = MemoryTokenStore::with_lookup_barrier(2).hold_inserts();
    let accounts = MemoryAccounts::default();

    let release = async {
        // Two first lookups plus the loser's second lookup.
        while tokens.lookups.load(Ordering::SeqCst) < 3 {
            tokio::task::yield_now().await;
        }
        tokens.release_inserts();
    };
    let (a, b, ()) = tokio::join!(
        register_bot(&tokens, &accounts, "123456:ABCdef"),
        register_bot(&tokens, &accounts, "123456:ABCdef"),
        release,
    );

    let (created, lost) = match (a, b) {
        (Ok(Registration::Created(id)), Err(e)) | (Err(e), Ok(Registration::Created(id))) => (id, e),
        other => panic!("expected one created and one conflict, got {other:?}"),
    };
    match lost {
        RegistrationError::Conflict { bot_id } => assert_eq!(bot_id, "123456"),
        other => panic!("expected conflict, got {other:?}"),
    }
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts.creates.load(Ordering::SeqCst), 2);
    assert_eq!(accounts.deletes.load(Ordering::SeqCst), 0);
    assert_eq!(tokens.get("123456:ABCdef"), Some(created));

    // Once the winner is done, the same token resolves to its account.
    let again = register_bot(&tokens, &accounts, "123456:ABCdef").await.unwrap();
    assert_eq!(again, Registration::Existing(created));
}
