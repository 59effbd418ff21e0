//! Integration tests for the account registry.
//!
//! These exercise the public API only, the way a login front end would.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::thread;

use custodian_core::{AccountError, AccountRegistry, LockoutPolicy};

#[test]
fn create_authenticate_lock_scenario() {
    let registry = AccountRegistry::new();

    registry.create("a@b.com", "p1", "p1").unwrap();
    assert_eq!(
        registry.create("a@b.com", "p2", "p2"),
        Err(AccountError::DuplicateAccount("a@b.com".to_string()))
    );

    for attempt in 1..=5 {
        assert_eq!(
            registry.authenticate("a@b.com", "wrong"),
            Err(AccountError::InvalidCredentials),
            "attempt {attempt}"
        );
    }
    assert_eq!(
        registry.authenticate("a@b.com", "wrong"),
        Err(AccountError::AccountLocked)
    );
}

#[test]
fn locked_account_still_accepts_correct_password() {
    let registry = AccountRegistry::new();
    registry.create("a@b.com", "p1", "p1").unwrap();
    for _ in 0..6 {
        let _ = registry.authenticate("a@b.com", "wrong");
    }

    let handle = registry.authenticate("a@b.com", "p1").unwrap();
    let status = registry.status(&handle).unwrap();
    assert!(status.locked);
    assert_eq!(status.failed_attempts, 5);

    // A successful login does not unlock.
    assert_eq!(
        registry.authenticate("a@b.com", "wrong"),
        Err(AccountError::AccountLocked)
    );
}

#[test]
fn counter_survives_successful_login() {
    let registry = AccountRegistry::new();
    registry.create("a@b.com", "p1", "p1").unwrap();

    let _ = registry.authenticate("a@b.com", "wrong");
    let _ = registry.authenticate("a@b.com", "wrong");
    let handle = registry.authenticate("a@b.com", "p1").unwrap();

    assert_eq!(registry.status(&handle).unwrap().failed_attempts, 2);
}

#[test]
fn delete_requires_handle_and_tolerates_missing_account() {
    let registry = AccountRegistry::new();
    let created = registry.create("a@b.com", "p1", "p1").unwrap();
    let logged_in = registry.authenticate("a@b.com", "p1").unwrap();
    assert_eq!(created.identifier(), logged_in.identifier());

    registry.delete(logged_in).unwrap();
    registry.delete(created).unwrap();

    assert!(registry.is_empty());
}

#[test]
fn old_handle_grants_nothing_on_recreated_account() {
    let registry = AccountRegistry::new();
    let old = registry.create("a@b.com", "p1", "p1").unwrap();
    let remover = registry.authenticate("a@b.com", "p1").unwrap();
    registry.delete(remover).unwrap();

    let new = registry.create("a@b.com", "p2", "p2").unwrap();
    assert_ne!(old.id(), new.id());

    assert_eq!(
        registry.status(&old),
        Err(AccountError::AccountNotFound("a@b.com".to_string()))
    );
    registry.delete(old).unwrap();

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.status(&new).unwrap().failed_attempts, 0);
    assert!(registry.authenticate("a@b.com", "p2").is_ok());
}

#[test]
fn delete_all_forgets_every_account() {
    let registry = AccountRegistry::new();
    let identifiers = ["a@b.com", "c@d.org", "e.f@g.net"];
    for identifier in identifiers {
        registry.create(identifier, "secret", "secret").unwrap();
    }
    assert_eq!(registry.len(), identifiers.len());

    registry.delete_all();

    for identifier in identifiers {
        assert_eq!(
            registry.authenticate(identifier, "secret"),
            Err(AccountError::AccountNotFound(identifier.to_string()))
        );
    }
}

#[test]
fn reset_is_distinct_from_not_found() {
    let registry = AccountRegistry::new();
    let err = registry.reset("nobody@b.com").unwrap_err();
    assert_eq!(err, AccountError::NotImplemented("reset"));
    assert!(!err.is_recoverable());
}

#[test]
fn concurrent_create_of_same_identifier_has_one_winner() {
    let registry = Arc::new(AccountRegistry::new());

    let results: Vec<_> = (0..16)
        .map(|i| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let password = format!("p{i}");
                registry.create("race@b.com", &password, &password)
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    let winners = results.iter().filter(|r| r.is_ok()).count();
    let duplicates = results
        .iter()
        .filter(|r| matches!(r, Err(AccountError::DuplicateAccount(_))))
        .count();
    assert_eq!(winners, 1);
    assert_eq!(duplicates, 15);
    assert_eq!(registry.len(), 1);
}

#[test]
fn concurrent_failures_lock_exactly_once_limit_is_reached() {
    let registry = AccountRegistry::with_policy(LockoutPolicy::default());
    registry.create("a@b.com", "p1", "p1").unwrap();

    let results: Vec<_> = thread::scope(|scope| {
        let workers: Vec<_> = (0..20)
            .map(|_| scope.spawn(|| registry.authenticate("a@b.com", "wrong")))
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    let invalid = results
        .iter()
        .filter(|r| **r == Err(AccountError::InvalidCredentials))
        .count();
    let locked = results
        .iter()
        .filter(|r| **r == Err(AccountError::AccountLocked))
        .count();
    assert_eq!(invalid, 5);
    assert_eq!(locked, 15);

    let handle = registry.authenticate("a@b.com", "p1").unwrap();
    let status = registry.status(&handle).unwrap();
    assert_eq!(status.failed_attempts, 5);
    assert!(status.locked);
}
