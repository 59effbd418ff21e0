//! Property tests for account creation policy.

#![allow(clippy::unwrap_used)]

use custodian_core::{AccountError, AccountRegistry, is_valid_identifier};
use proptest::prelude::*;

/// Identifiers the email-shaped pattern accepts.
fn valid_identifier() -> impl Strategy<Value = String> {
    "[A-Za-z0-9._%+-]{1,12}@[A-Za-z0-9-]{1,10}(\\.[A-Za-z0-9-]{1,6}){0,2}\\.[A-Za-z]{2,4}"
}

proptest! {
    #[test]
    fn identifiers_without_at_sign_are_rejected(identifier in "[^@]*") {
        let registry = AccountRegistry::new();
        prop_assert_eq!(
            registry.create(&identifier, "p1", "p1"),
            Err(AccountError::InvalidIdentifier(identifier.clone()))
        );
        prop_assert!(registry.is_empty());
    }

    #[test]
    fn identifiers_with_short_top_level_segment_are_rejected(
        local in "[a-z]{1,8}",
        domain in "[a-z]{1,8}",
        tld in "[a-z]",
    ) {
        let identifier = format!("{local}@{domain}.{tld}");
        let registry = AccountRegistry::new();
        prop_assert_eq!(
            registry.create(&identifier, "p1", "p1"),
            Err(AccountError::InvalidIdentifier(identifier.clone()))
        );
    }

    #[test]
    fn any_non_matching_identifier_is_rejected(identifier in ".*") {
        prop_assume!(!is_valid_identifier(&identifier));
        let registry = AccountRegistry::new();
        prop_assert_eq!(
            registry.create(&identifier, "p1", "p1"),
            Err(AccountError::InvalidIdentifier(identifier.clone()))
        );
    }

    #[test]
    fn valid_identifiers_are_accepted(identifier in valid_identifier(), password in ".*") {
        let registry = AccountRegistry::new();
        let handle = registry.create(&identifier, &password, &password).unwrap();
        prop_assert_eq!(handle.identifier(), identifier.as_str());
        prop_assert!(registry.authenticate(&identifier, &password).is_ok());
    }

    #[test]
    fn mismatched_confirmation_is_rejected(
        identifier in valid_identifier(),
        password in ".*",
        confirmation in ".*",
    ) {
        prop_assume!(password != confirmation);
        let registry = AccountRegistry::new();
        prop_assert_eq!(
            registry.create(&identifier, &password, &confirmation),
            Err(AccountError::PasswordMismatch)
        );
        prop_assert!(registry.is_empty());
    }

    #[test]
    fn second_create_is_duplicate(identifier in valid_identifier()) {
        let registry = AccountRegistry::new();
        registry.create(&identifier, "p1", "p1").unwrap();
        prop_assert_eq!(
            registry.create(&identifier, "p2", "p2"),
            Err(AccountError::DuplicateAccount(identifier.clone()))
        );
    }

    #[test]
    fn wrong_passwords_lock_after_limit(limit in 0u32..8, wrong in "[a-z]{1,8}") {
        let registry = AccountRegistry::with_policy(custodian_core::LockoutPolicy::new(limit));
        registry.create("a@b.com", "correct-horse", "correct-horse").unwrap();

        for _ in 0..limit {
            prop_assert_eq!(
                registry.authenticate("a@b.com", &wrong),
                Err(AccountError::InvalidCredentials)
            );
        }
        prop_assert_eq!(
            registry.authenticate("a@b.com", &wrong),
            Err(AccountError::AccountLocked)
        );
    }
}
