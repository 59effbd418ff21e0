//! Account model types.

use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

/// Per-record account identifier.
///
/// Issued by the registry when an account is created and never reused, so a
/// record that later takes over a deleted account's email identifier gets a
/// different id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountId(pub u64);

impl AccountId {
    /// Create a new account ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A customer account record.
///
/// Records are only ever built by the registry's factory, so the fields are
/// private and the secret can never be read back out. Stores receive and
/// hand back records but cannot change their failure state.
#[derive(Debug)]
pub struct Account {
    /// Registry-issued record id.
    id: AccountId,
    /// Email-shaped lookup key, immutable after creation.
    identifier: String,
    /// The customer's password, stored as entered.
    secret: SecretString,
    /// Failed authentications since creation.
    failed_attempts: u32,
    /// Whether the account has been locked out.
    locked: bool,
    /// When the account was created.
    created_at: DateTime<Utc>,
}

impl Account {
    /// Create a fresh, unlocked account with no failed attempts.
    ///
    /// The caller is responsible for having validated both arguments.
    pub(crate) fn new(id: AccountId, identifier: &str, secret: &str) -> Self {
        Self {
            id,
            identifier: identifier.to_string(),
            secret: SecretString::from(secret.to_string()),
            failed_attempts: 0,
            locked: false,
            created_at: Utc::now(),
        }
    }

    /// The record id issued at creation.
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// The account's identifier.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Number of failed authentication attempts recorded so far.
    #[must_use]
    pub const fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    /// Whether the account is locked.
    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    /// When the account was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Compare a candidate password against the stored one in constant time.
    pub(crate) fn secret_matches(&self, candidate: &str) -> bool {
        self.secret
            .expose_secret()
            .as_bytes()
            .ct_eq(candidate.as_bytes())
            .into()
    }

    pub(crate) const fn record_failure(&mut self) {
        self.failed_attempts = self.failed_attempts.saturating_add(1);
    }

    pub(crate) const fn lock(&mut self) {
        self.locked = true;
    }

    /// Take a secret-free snapshot of this account.
    #[must_use]
    pub fn status(&self) -> AccountStatus {
        AccountStatus {
            identifier: self.identifier.clone(),
            failed_attempts: self.failed_attempts,
            locked: self.locked,
            created_at: self.created_at,
        }
    }
}

/// Point-in-time view of an account's state, without its secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStatus {
    /// The account's identifier.
    pub identifier: String,
    /// Failed authentication attempts recorded so far.
    pub failed_attempts: u32,
    /// Whether the account is locked.
    pub locked: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn account_id_display_and_equality() {
        assert_eq!(format!("{}", AccountId::new(7)), "7");
        assert_eq!(AccountId::new(1), AccountId::new(1));
        assert_ne!(AccountId::new(1), AccountId::new(2));
    }

    #[test]
    fn new_account_is_unlocked_with_no_failures() {
        let account = Account::new(AccountId::new(1), "user@example.com", "hunter2");
        assert_eq!(account.id(), AccountId::new(1));
        assert_eq!(account.identifier(), "user@example.com");
        assert_eq!(account.failed_attempts(), 0);
        assert!(!account.is_locked());
    }

    #[test]
    fn secret_matches_exactly() {
        let account = Account::new(AccountId::new(1), "user@example.com", "hunter2");
        assert!(account.secret_matches("hunter2"));
        assert!(!account.secret_matches("Hunter2"));
        assert!(!account.secret_matches("hunter"));
        assert!(!account.secret_matches("hunter22"));
        assert!(!account.secret_matches(""));
    }

    #[test]
    fn empty_secret_only_matches_empty() {
        let account = Account::new(AccountId::new(1), "user@example.com", "");
        assert!(account.secret_matches(""));
        assert!(!account.secret_matches(" "));
    }

    #[test]
    fn debug_redacts_secret() {
        let account = Account::new(AccountId::new(1), "user@example.com", "hunter2");
        let debug = format!("{account:?}");
        assert!(debug.contains("user@example.com"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn failure_and_lock_are_reflected_in_status() {
        let mut account = Account::new(AccountId::new(1), "user@example.com", "hunter2");
        account.record_failure();
        account.record_failure();
        account.lock();

        let status = account.status();
        assert_eq!(status.identifier, "user@example.com");
        assert_eq!(status.failed_attempts, 2);
        assert!(status.locked);
        assert_eq!(status.created_at, account.created_at());
    }

    #[test]
    fn status_serializes_without_secret() {
        let account = Account::new(AccountId::new(1), "user@example.com", "hunter2");
        let json = serde_json::to_string(&account.status()).unwrap();
        assert!(json.contains("\"failed_attempts\":0"));
        assert!(!json.contains("hunter2"));
    }
}
