//! Account storage.
//!
//! The registry only talks to storage through [`AccountStore`], so the
//! in-memory map can later be swapped for a durable backend without touching
//! any business policy.

use std::collections::HashMap;

use super::model::Account;

/// Storage capability for account records, keyed by identifier.
///
/// Implementations do not enforce any policy beyond identifier uniqueness;
/// the registry serializes all calls, so implementations need not be
/// internally synchronized.
pub trait AccountStore: Send {
    /// Whether an account with this identifier is stored.
    fn contains(&self, identifier: &str) -> bool;

    /// Look up an account by identifier.
    fn get(&self, identifier: &str) -> Option<&Account>;

    /// Look up an account by identifier for modification.
    fn get_mut(&mut self, identifier: &str) -> Option<&mut Account>;

    /// Store a new account.
    ///
    /// Returns `false`, leaving the existing record untouched, if the
    /// identifier is already taken.
    fn insert(&mut self, account: Account) -> bool;

    /// Remove and return the account with this identifier, if any.
    fn remove(&mut self, identifier: &str) -> Option<Account>;

    /// Remove every account.
    fn clear(&mut self);

    /// Number of stored accounts.
    fn len(&self) -> usize;

    /// Whether no accounts are stored.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-lifetime, in-memory account storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: HashMap<String, Account>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn contains(&self, identifier: &str) -> bool {
        self.accounts.contains_key(identifier)
    }

    fn get(&self, identifier: &str) -> Option<&Account> {
        self.accounts.get(identifier)
    }

    fn get_mut(&mut self, identifier: &str) -> Option<&mut Account> {
        self.accounts.get_mut(identifier)
    }

    fn insert(&mut self, account: Account) -> bool {
        if self.accounts.contains_key(account.identifier()) {
            return false;
        }
        self.accounts.insert(account.identifier().to_string(), account);
        true
    }

    fn remove(&mut self, identifier: &str) -> Option<Account> {
        self.accounts.remove(identifier)
    }

    fn clear(&mut self) {
        self.accounts.clear();
    }

    fn len(&self) -> usize {
        self.accounts.len()
    }
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
    use crate::account::model::AccountId;

    #[test]
    fn test_new_store_is_empty() {
        let store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.len(), 0);
        assert!(store.get("a@b.com").is_none());
    }

    #[test]
    fn test_insert_and_get() {
        let mut store = MemoryStore::new();
        assert!(store.insert(Account::new(AccountId::new(1), "a@b.com", "p1")));

        assert!(store.contains("a@b.com"));
        assert_eq!(store.len(), 1);
        let account = store.get("a@b.com").unwrap();
        assert!(account.secret_matches("p1"));
    }

    #[test]
    fn test_insert_duplicate_keeps_original() {
        let mut store = MemoryStore::new();
        assert!(store.insert(Account::new(AccountId::new(1), "a@b.com", "p1")));
        assert!(!store.insert(Account::new(AccountId::new(2), "a@b.com", "p2")));

        assert_eq!(store.len(), 1);
        let account = store.get("a@b.com").unwrap();
        assert!(account.secret_matches("p1"));
        assert!(!account.secret_matches("p2"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let mut store = MemoryStore::new();
        store.insert(Account::new(AccountId::new(1), "a@b.com", "p1"));
        assert!(!store.contains("A@B.COM"));
    }

    #[test]
    fn test_get_mut_modifies_in_place() {
        let mut store = MemoryStore::new();
        store.insert(Account::new(AccountId::new(1), "a@b.com", "p1"));

        store.get_mut("a@b.com").unwrap().record_failure();

        assert_eq!(store.get("a@b.com").unwrap().failed_attempts(), 1);
    }

    #[test]
    fn test_remove() {
        let mut store = MemoryStore::new();
        store.insert(Account::new(AccountId::new(1), "a@b.com", "p1"));

        let removed = store.remove("a@b.com").unwrap();
        assert_eq!(removed.identifier(), "a@b.com");
        assert!(store.remove("a@b.com").is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut store = MemoryStore::new();
        store.insert(Account::new(AccountId::new(1), "a@b.com", "p1"));
        store.insert(Account::new(AccountId::new(2), "c@d.org", "p2"));

        store.clear();

        assert!(store.is_empty());
        assert!(!store.contains("a@b.com"));
        assert!(!store.contains("c@d.org"));
    }
}
