//! Error types for the account registry.

use thiserror::Error;

/// Errors that can occur in registry operations.
///
/// Every registry failure is reported through this one type. The variant is
/// the failure kind; callers decide whether to re-prompt the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// An account with this identifier is already registered.
    #[error("{0} already exists")]
    DuplicateAccount(String),

    /// The identifier is not shaped like an email address.
    #[error("{0} is not an email address")]
    InvalidIdentifier(String),

    /// The password and its confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// No account is registered under this identifier.
    #[error("account {0} does not exist")]
    AccountNotFound(String),

    /// The supplied password is wrong.
    #[error("password did not match")]
    InvalidCredentials,

    /// Too many failed attempts; the account is locked.
    #[error("too many failed attempts, account is locked")]
    AccountLocked,

    /// The requested operation exists in the API but has no implementation.
    #[error("{0} not implemented")]
    NotImplemented(&'static str),
}

impl AccountError {
    /// Whether the end user can fix this by trying again with other input.
    ///
    /// `AccountLocked` and `NotImplemented` need an administrator (or a
    /// future release); everything else is fixed by re-entering data.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::AccountLocked | Self::NotImplemented(_))
    }
}

/// Result type alias using [`AccountError`].
pub type Result<T> = std::result::Result<T, AccountError>;

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
    fn messages_name_the_identifier() {
        assert_eq!(
            AccountError::DuplicateAccount("a@b.com".to_string()).to_string(),
            "a@b.com already exists"
        );
        assert_eq!(
            AccountError::InvalidIdentifier("nope".to_string()).to_string(),
            "nope is not an email address"
        );
        assert_eq!(
            AccountError::AccountNotFound("a@b.com".to_string()).to_string(),
            "account a@b.com does not exist"
        );
        assert_eq!(
            AccountError::NotImplemented("reset").to_string(),
            "reset not implemented"
        );
    }

    #[test]
    fn recoverability() {
        assert!(AccountError::PasswordMismatch.is_recoverable());
        assert!(AccountError::InvalidCredentials.is_recoverable());
        assert!(AccountError::AccountNotFound(String::new()).is_recoverable());
        assert!(!AccountError::AccountLocked.is_recoverable());
        assert!(!AccountError::NotImplemented("reset").is_recoverable());
    }
}
