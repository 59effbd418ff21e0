//! The account registry: creation, authentication and deletion policy.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use super::handle::AccountHandle;
use super::model::{Account, AccountId, AccountStatus};
use super::store::{AccountStore, MemoryStore};
use super::validation::{is_valid_identifier, passwords_match};
use crate::error::{AccountError, Result};
use crate::policy::LockoutPolicy;

/// Registry of customer accounts.
///
/// The registry owns every account record and enforces all account policy.
/// Callers get at an account only through [`create`](Self::create) or
/// [`authenticate`](Self::authenticate), both of which return an
/// [`AccountHandle`].
///
/// All operations are serialized by a single lock around the store, so the
/// duplicate check and insert in `create`, and the counter update and lock in
/// `authenticate`, are each atomic. Share one registry between threads by
/// reference or `Arc`.
#[derive(Debug)]
pub struct AccountRegistry<S = MemoryStore> {
    store: Mutex<S>,
    policy: LockoutPolicy,
    /// Next record id to issue; ids are never reused.
    next_id: AtomicU64,
}

impl AccountRegistry<MemoryStore> {
    /// Create an empty in-memory registry with the default lockout policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(LockoutPolicy::default())
    }

    /// Create an empty in-memory registry with the given lockout policy.
    #[must_use]
    pub fn with_policy(policy: LockoutPolicy) -> Self {
        Self::with_store(MemoryStore::new(), policy)
    }
}

impl Default for AccountRegistry<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AccountStore> AccountRegistry<S> {
    /// Create a registry over an existing store.
    #[must_use]
    pub const fn with_store(store: S, policy: LockoutPolicy) -> Self {
        Self {
            store: Mutex::new(store),
            policy,
            next_id: AtomicU64::new(1),
        }
    }

    /// The lockout policy this registry enforces.
    #[must_use]
    pub const fn policy(&self) -> LockoutPolicy {
        self.policy
    }

    /// Lock the store. A panic in another holder leaves at worst one
    /// half-applied counter update, so poisoning is ignored.
    fn store(&self) -> MutexGuard<'_, S> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn issue_id(&self) -> AccountId {
        AccountId::new(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// Create a new account and return a handle to it.
    ///
    /// Inputs arrive straight from the user and may be empty or malformed.
    /// Checks run in a fixed order and the first failure wins.
    ///
    /// # Errors
    ///
    /// - [`AccountError::DuplicateAccount`] if the identifier is taken.
    /// - [`AccountError::InvalidIdentifier`] if it is not email-shaped.
    /// - [`AccountError::PasswordMismatch`] if the confirmation differs.
    pub fn create(
        &self,
        identifier: &str,
        password: &str,
        confirmation: &str,
    ) -> Result<AccountHandle> {
        let mut store = self.store();

        if store.contains(identifier) {
            return Err(AccountError::DuplicateAccount(identifier.to_string()));
        }
        if !is_valid_identifier(identifier) {
            return Err(AccountError::InvalidIdentifier(identifier.to_string()));
        }
        if !passwords_match(password, confirmation) {
            return Err(AccountError::PasswordMismatch);
        }

        let id = self.issue_id();
        if !store.insert(Account::new(id, identifier, password)) {
            return Err(AccountError::DuplicateAccount(identifier.to_string()));
        }

        info!("Created account {id} for {identifier}");
        Ok(AccountHandle::new(id, identifier))
    }

    /// Verify an account's credentials and return a handle to it.
    ///
    /// A correct password always succeeds and leaves the failure state
    /// untouched, even for a locked account. A wrong password is counted
    /// until the counter reaches the policy limit; the next wrong password
    /// after that locks the account.
    ///
    /// # Errors
    ///
    /// - [`AccountError::AccountNotFound`] if no such account exists.
    /// - [`AccountError::InvalidCredentials`] for a wrong password below the
    ///   limit.
    /// - [`AccountError::AccountLocked`] for a wrong password once the limit
    ///   has been reached.
    pub fn authenticate(&self, identifier: &str, password: &str) -> Result<AccountHandle> {
        let mut store = self.store();
        let account = store
            .get_mut(identifier)
            .ok_or_else(|| AccountError::AccountNotFound(identifier.to_string()))?;

        if account.secret_matches(password) {
            debug!("Authenticated {identifier}");
            return Ok(AccountHandle::new(account.id(), identifier));
        }

        if self.policy.locks_after(account.failed_attempts()) {
            account.lock();
            warn!(
                "Locked account {identifier} after {} failed attempts",
                account.failed_attempts()
            );
            return Err(AccountError::AccountLocked);
        }

        account.record_failure();
        debug!(
            "Failed authentication for {identifier} ({} of {})",
            account.failed_attempts(),
            self.policy.failed_attempt_limit
        );
        Err(AccountError::InvalidCredentials)
    }

    /// Administrative unlock of a locked account.
    ///
    /// Reserved for a support agent who has verified the customer out of
    /// band. Not available yet.
    ///
    /// # Errors
    ///
    /// Always returns [`AccountError::NotImplemented`], for known and unknown
    /// identifiers alike.
    #[allow(clippy::unused_self)]
    pub fn reset(&self, identifier: &str) -> Result<()> {
        warn!("Reset requested for {identifier}, but reset is not implemented");
        Err(AccountError::NotImplemented("reset"))
    }

    /// Delete the account behind an authenticated handle.
    ///
    /// Deleting requires a handle, never just an identifier. If the account
    /// is already gone (for example deleted through another handle, or
    /// replaced by a new account under the same identifier) this is a
    /// successful no-op.
    ///
    /// # Errors
    ///
    /// The in-memory store never fails; the `Result` is for stores that can.
    #[allow(clippy::unnecessary_wraps)]
    pub fn delete(&self, handle: AccountHandle) -> Result<()> {
        let mut store = self.store();
        let owned = store
            .get(handle.identifier())
            .is_some_and(|account| account.id() == handle.id());
        if owned {
            store.remove(handle.identifier());
            info!("Deleted account {handle}");
        } else {
            debug!("Account {handle} already deleted");
        }
        Ok(())
    }

    /// Snapshot of the account behind a handle.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::AccountNotFound`] if the account has been
    /// deleted since the handle was issued, including when a newer account
    /// now holds the same identifier.
    pub fn status(&self, handle: &AccountHandle) -> Result<AccountStatus> {
        self.store()
            .get(handle.identifier())
            .filter(|account| account.id() == handle.id())
            .map(Account::status)
            .ok_or_else(|| AccountError::AccountNotFound(handle.identifier().to_string()))
    }

    /// Remove every account.
    ///
    /// Privileged: no authentication is required. Intended for test
    /// harnesses and administrative tooling only; never route customer
    /// input here.
    pub fn delete_all(&self) {
        let mut store = self.store();
        let count = store.len();
        store.clear();
        info!("Deleted all {count} accounts");
    }

    /// Number of registered accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store().len()
    }

    /// Whether no accounts are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store().is_empty()
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

    fn registry_with(identifier: &str, password: &str) -> AccountRegistry {
        let registry = AccountRegistry::new();
        registry.create(identifier, password, password).unwrap();
        registry
    }

    mod create_tests {
        use super::*;

        #[test]
        fn returns_handle_for_new_account() {
            let registry = AccountRegistry::new();
            let handle = registry.create("a@b.com", "p1", "p1").unwrap();

            assert_eq!(handle.identifier(), "a@b.com");
            assert_eq!(registry.len(), 1);
            let status = registry.status(&handle).unwrap();
            assert_eq!(status.failed_attempts, 0);
            assert!(!status.locked);
        }

        #[test]
        fn duplicate_identifier() {
            let registry = registry_with("a@b.com", "p1");
            assert_eq!(
                registry.create("a@b.com", "p2", "p2"),
                Err(AccountError::DuplicateAccount("a@b.com".to_string()))
            );
            assert_eq!(registry.len(), 1);
            assert!(registry.authenticate("a@b.com", "p1").is_ok());
        }

        #[test]
        fn duplicate_checked_before_password_confirmation() {
            let registry = registry_with("a@b.com", "p1");
            assert_eq!(
                registry.create("a@b.com", "x", "y"),
                Err(AccountError::DuplicateAccount("a@b.com".to_string()))
            );
        }

        #[test]
        fn invalid_identifier() {
            let registry = AccountRegistry::new();
            assert_eq!(
                registry.create("not-an-email", "p1", "p1"),
                Err(AccountError::InvalidIdentifier("not-an-email".to_string()))
            );
            assert_eq!(
                registry.create("", "p1", "p1"),
                Err(AccountError::InvalidIdentifier(String::new()))
            );
            assert!(registry.is_empty());
        }

        #[test]
        fn identifier_checked_before_password_confirmation() {
            let registry = AccountRegistry::new();
            assert_eq!(
                registry.create("nope", "p1", "p2"),
                Err(AccountError::InvalidIdentifier("nope".to_string()))
            );
        }

        #[test]
        fn password_mismatch() {
            let registry = AccountRegistry::new();
            assert_eq!(
                registry.create("a@b.com", "p1", "p2"),
                Err(AccountError::PasswordMismatch)
            );
            assert!(registry.is_empty());
        }

        #[test]
        fn empty_password_is_accepted() {
            let registry = AccountRegistry::new();
            let handle = registry.create("a@b.com", "", "").unwrap();
            assert_eq!(handle.identifier(), "a@b.com");
            assert!(registry.authenticate("a@b.com", "").is_ok());
        }
    }

    mod authenticate_tests {
        use super::*;

        #[test]
        fn correct_password() {
            let registry = registry_with("a@b.com", "p1");
            let handle = registry.authenticate("a@b.com", "p1").unwrap();
            assert_eq!(handle.identifier(), "a@b.com");
        }

        #[test]
        fn unknown_account() {
            let registry = AccountRegistry::new();
            assert_eq!(
                registry.authenticate("a@b.com", "p1"),
                Err(AccountError::AccountNotFound("a@b.com".to_string()))
            );
        }

        #[test]
        fn wrong_password_counts_failure() {
            let registry = registry_with("a@b.com", "p1");
            assert_eq!(
                registry.authenticate("a@b.com", "wrong"),
                Err(AccountError::InvalidCredentials)
            );

            let handle = registry.authenticate("a@b.com", "p1").unwrap();
            assert_eq!(registry.status(&handle).unwrap().failed_attempts, 1);
        }

        #[test]
        fn locks_on_failure_after_limit() {
            let registry = registry_with("a@b.com", "p1");
            for _ in 0..5 {
                assert_eq!(
                    registry.authenticate("a@b.com", "wrong"),
                    Err(AccountError::InvalidCredentials)
                );
            }
            assert_eq!(
                registry.authenticate("a@b.com", "wrong"),
                Err(AccountError::AccountLocked)
            );

            let handle = registry.authenticate("a@b.com", "p1").unwrap();
            let status = registry.status(&handle).unwrap();
            assert!(status.locked);
            assert_eq!(status.failed_attempts, 5);
        }

        #[test]
        fn stays_locked_without_further_increment() {
            let registry = registry_with("a@b.com", "p1");
            for _ in 0..5 {
                let _ = registry.authenticate("a@b.com", "wrong");
            }
            for _ in 0..3 {
                assert_eq!(
                    registry.authenticate("a@b.com", "wrong"),
                    Err(AccountError::AccountLocked)
                );
            }

            let handle = registry.authenticate("a@b.com", "p1").unwrap();
            assert_eq!(registry.status(&handle).unwrap().failed_attempts, 5);
        }

        #[test]
        fn success_does_not_reset_counter() {
            let registry = registry_with("a@b.com", "p1");
            for _ in 0..3 {
                let _ = registry.authenticate("a@b.com", "wrong");
            }
            registry.authenticate("a@b.com", "p1").unwrap();
            for _ in 0..2 {
                assert_eq!(
                    registry.authenticate("a@b.com", "wrong"),
                    Err(AccountError::InvalidCredentials)
                );
            }
            assert_eq!(
                registry.authenticate("a@b.com", "wrong"),
                Err(AccountError::AccountLocked)
            );
        }

        #[test]
        fn custom_limit() {
            let registry = AccountRegistry::with_policy(LockoutPolicy::new(2));
            registry.create("a@b.com", "p1", "p1").unwrap();

            assert_eq!(
                registry.authenticate("a@b.com", "x"),
                Err(AccountError::InvalidCredentials)
            );
            assert_eq!(
                registry.authenticate("a@b.com", "x"),
                Err(AccountError::InvalidCredentials)
            );
            assert_eq!(
                registry.authenticate("a@b.com", "x"),
                Err(AccountError::AccountLocked)
            );
        }

        #[test]
        fn failures_are_per_account() {
            let registry = registry_with("a@b.com", "p1");
            registry.create("c@d.com", "p2", "p2").unwrap();
            for _ in 0..6 {
                let _ = registry.authenticate("a@b.com", "wrong");
            }

            assert_eq!(
                registry.authenticate("c@d.com", "wrong"),
                Err(AccountError::InvalidCredentials)
            );
            let handle = registry.authenticate("c@d.com", "p2").unwrap();
            let status = registry.status(&handle).unwrap();
            assert_eq!(status.failed_attempts, 1);
            assert!(!status.locked);
        }
    }

    mod reset_tests {
        use super::*;

        #[test]
        fn known_account_not_implemented() {
            let registry = registry_with("a@b.com", "p1");
            assert_eq!(
                registry.reset("a@b.com"),
                Err(AccountError::NotImplemented("reset"))
            );
        }

        #[test]
        fn unknown_account_not_implemented() {
            let registry = AccountRegistry::new();
            assert_eq!(
                registry.reset("ghost@b.com"),
                Err(AccountError::NotImplemented("reset"))
            );
        }
    }

    mod delete_tests {
        use super::*;

        #[test]
        fn removes_account() {
            let registry = AccountRegistry::new();
            let handle = registry.create("a@b.com", "p1", "p1").unwrap();

            registry.delete(handle).unwrap();

            assert!(registry.is_empty());
            assert_eq!(
                registry.authenticate("a@b.com", "p1"),
                Err(AccountError::AccountNotFound("a@b.com".to_string()))
            );
        }

        #[test]
        fn already_deleted_is_ok() {
            let registry = registry_with("a@b.com", "p1");
            let first = registry.authenticate("a@b.com", "p1").unwrap();
            let second = registry.authenticate("a@b.com", "p1").unwrap();

            registry.delete(first).unwrap();
            assert!(registry.delete(second).is_ok());
        }

        #[test]
        fn leaves_other_accounts() {
            let registry = registry_with("a@b.com", "p1");
            let handle = registry.create("c@d.com", "p2", "p2").unwrap();

            registry.delete(handle).unwrap();

            assert_eq!(registry.len(), 1);
            assert!(registry.authenticate("a@b.com", "p1").is_ok());
        }

        #[test]
        fn identifier_can_be_reused_after_delete() {
            let registry = AccountRegistry::new();
            let handle = registry.create("a@b.com", "p1", "p1").unwrap();
            registry.delete(handle).unwrap();

            registry.create("a@b.com", "p2", "p2").unwrap();
            assert!(registry.authenticate("a@b.com", "p2").is_ok());
        }

        #[test]
        fn stale_handle_leaves_recreated_account() {
            let registry = registry_with("a@b.com", "p1");
            let stale = registry.authenticate("a@b.com", "p1").unwrap();
            let live = registry.authenticate("a@b.com", "p1").unwrap();
            registry.delete(live).unwrap();
            registry.create("a@b.com", "p2", "p2").unwrap();

            assert!(registry.delete(stale).is_ok());

            assert_eq!(registry.len(), 1);
            let handle = registry.authenticate("a@b.com", "p2").unwrap();
            assert!(registry.status(&handle).is_ok());
        }
    }

    mod status_tests {
        use super::*;

        #[test]
        fn deleted_account_not_found() {
            let registry = registry_with("a@b.com", "p1");
            let stale = registry.authenticate("a@b.com", "p1").unwrap();
            let live = registry.authenticate("a@b.com", "p1").unwrap();
            registry.delete(live).unwrap();

            assert_eq!(
                registry.status(&stale),
                Err(AccountError::AccountNotFound("a@b.com".to_string()))
            );
        }

        #[test]
        fn stale_handle_cannot_see_recreated_account() {
            let registry = registry_with("a@b.com", "p1");
            let stale = registry.authenticate("a@b.com", "p1").unwrap();
            let live = registry.authenticate("a@b.com", "p1").unwrap();
            registry.delete(live).unwrap();
            registry.create("a@b.com", "p2", "p2").unwrap();

            assert_eq!(
                registry.status(&stale),
                Err(AccountError::AccountNotFound("a@b.com".to_string()))
            );
        }

        #[test]
        fn create_and_authenticate_handles_agree() {
            let registry = AccountRegistry::new();
            let created = registry.create("a@b.com", "p1", "p1").unwrap();
            let authenticated = registry.authenticate("a@b.com", "p1").unwrap();

            assert_eq!(created, authenticated);
            registry.delete(created).unwrap();
            registry.create("a@b.com", "p1", "p1").unwrap();
            let recreated = registry.authenticate("a@b.com", "p1").unwrap();
            assert_ne!(authenticated, recreated);
        }
    }

    mod delete_all_tests {
        use super::*;

        #[test]
        fn empties_registry() {
            let registry = registry_with("a@b.com", "p1");
            registry.create("c@d.com", "p2", "p2").unwrap();

            registry.delete_all();

            assert!(registry.is_empty());
            assert_eq!(
                registry.authenticate("a@b.com", "p1"),
                Err(AccountError::AccountNotFound("a@b.com".to_string()))
            );
            assert_eq!(
                registry.authenticate("c@d.com", "p2"),
                Err(AccountError::AccountNotFound("c@d.com".to_string()))
            );
        }

        #[test]
        fn on_empty_registry() {
            let registry = AccountRegistry::new();
            registry.delete_all();
            assert!(registry.is_empty());
        }
    }

    mod custom_store_tests {
        use super::*;

        /// Linear-scan store, to run the registry over something other than
        /// the map.
        #[derive(Debug, Default)]
        struct ListStore {
            accounts: Vec<Account>,
        }

        impl AccountStore for ListStore {
            fn contains(&self, identifier: &str) -> bool {
                self.get(identifier).is_some()
            }

            fn get(&self, identifier: &str) -> Option<&Account> {
                self.accounts.iter().find(|a| a.identifier() == identifier)
            }

            fn get_mut(&mut self, identifier: &str) -> Option<&mut Account> {
                self.accounts
                    .iter_mut()
                    .find(|a| a.identifier() == identifier)
            }

            fn insert(&mut self, account: Account) -> bool {
                if self.contains(account.identifier()) {
                    return false;
                }
                self.accounts.push(account);
                true
            }

            fn remove(&mut self, identifier: &str) -> Option<Account> {
                let index = self
                    .accounts
                    .iter()
                    .position(|a| a.identifier() == identifier)?;
                Some(self.accounts.swap_remove(index))
            }

            fn clear(&mut self) {
                self.accounts.clear();
            }

            fn len(&self) -> usize {
                self.accounts.len()
            }
        }

        #[test]
        fn lifecycle_over_list_store() {
            let registry =
                AccountRegistry::with_store(ListStore::default(), LockoutPolicy::new(1));
            registry.create("a@b.com", "p1", "p1").unwrap();
            let handle = registry.create("c@d.com", "p2", "p2").unwrap();

            assert_eq!(
                registry.create("a@b.com", "p1", "p1"),
                Err(AccountError::DuplicateAccount("a@b.com".to_string()))
            );
            assert_eq!(
                registry.authenticate("a@b.com", "x"),
                Err(AccountError::InvalidCredentials)
            );
            assert_eq!(
                registry.authenticate("a@b.com", "x"),
                Err(AccountError::AccountLocked)
            );

            registry.delete(handle).unwrap();
            assert_eq!(registry.len(), 1);
            assert_eq!(
                registry.authenticate("c@d.com", "p2"),
                Err(AccountError::AccountNotFound("c@d.com".to_string()))
            );

            let locked = registry.authenticate("a@b.com", "p1").unwrap();
            assert!(registry.status(&locked).unwrap().locked);

            registry.delete_all();
            assert!(registry.is_empty());
        }
    }

    #[test]
    fn default_policy() {
        let registry = AccountRegistry::default();
        assert_eq!(registry.policy(), LockoutPolicy::default());
    }
}
