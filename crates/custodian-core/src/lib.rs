//! # custodian-core
//!
//! Customer account registry for a web-facing service.
//!
//! This crate provides:
//! - Account creation with email-shaped, unique identifiers and confirmed
//!   password entry
//! - Credential authentication with a failed-attempt lockout
//! - Handle-gated deletion: only an authenticated caller can delete
//! - A pluggable storage capability with an in-memory implementation
//!
//! ## Example
//!
//! ```
//! use custodian_core::{AccountError, AccountRegistry};
//!
//! let registry = AccountRegistry::new();
//! let handle = registry.create("a@b.com", "p1", "p1")?;
//! assert_eq!(handle.identifier(), "a@b.com");
//!
//! assert_eq!(
//!     registry.authenticate("a@b.com", "wrong"),
//!     Err(AccountError::InvalidCredentials)
//! );
//!
//! let handle = registry.authenticate("a@b.com", "p1")?;
//! registry.delete(handle)?;
//! assert!(registry.is_empty());
//! # Ok::<(), AccountError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod account;
mod error;
pub mod policy;

pub use account::{
    Account, AccountHandle, AccountId, AccountRegistry, AccountStatus, AccountStore,
    MemoryStore, is_valid_identifier, passwords_match,
};
pub use error::{AccountError, Result};
pub use policy::{DEFAULT_FAILED_ATTEMPT_LIMIT, LockoutPolicy};
