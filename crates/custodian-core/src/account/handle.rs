//! Proof-of-authentication handles.

use std::fmt;
use std::sync::Arc;

use super::model::AccountId;

/// Capability to act on one account.
///
/// A handle can only be obtained from [`AccountRegistry::create`] or a
/// successful [`AccountRegistry::authenticate`]. Operations that change or
/// reveal an account take a handle rather than a bare identifier, so code
/// without the credentials has no way to reach the account.
///
/// A handle is bound to the account record it was issued for, not just to
/// the identifier: once that record is deleted the handle grants nothing,
/// even if a new account later registers the same identifier.
///
/// Handles are deliberately not `Clone`: deleting an account consumes the
/// handle used to do it.
///
/// [`AccountRegistry::create`]: super::AccountRegistry::create
/// [`AccountRegistry::authenticate`]: super::AccountRegistry::authenticate
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct AccountHandle {
    id: AccountId,
    identifier: Arc<str>,
}

impl AccountHandle {
    pub(crate) fn new(id: AccountId, identifier: &str) -> Self {
        Self {
            id,
            identifier: identifier.into(),
        }
    }

    /// The record id of the account this handle was issued for.
    #[must_use]
    pub const fn id(&self) -> AccountId {
        self.id
    }

    /// The identifier of the account this handle grants access to.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }
}

impl fmt::Display for AccountHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.identifier)
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

    #[test]
    fn identifier_and_display() {
        let handle = AccountHandle::new(AccountId::new(1), "a@b.com");
        assert_eq!(handle.id(), AccountId::new(1));
        assert_eq!(handle.identifier(), "a@b.com");
        assert_eq!(format!("{handle}"), "a@b.com");
    }

    #[test]
    fn equality_is_by_record_and_identifier() {
        assert_eq!(
            AccountHandle::new(AccountId::new(1), "a@b.com"),
            AccountHandle::new(AccountId::new(1), "a@b.com")
        );
        assert_ne!(
            AccountHandle::new(AccountId::new(1), "a@b.com"),
            AccountHandle::new(AccountId::new(1), "c@d.com")
        );
    }

    #[test]
    fn handles_for_reused_identifier_differ() {
        assert_ne!(
            AccountHandle::new(AccountId::new(1), "a@b.com"),
            AccountHandle::new(AccountId::new(2), "a@b.com")
        );
    }
}
