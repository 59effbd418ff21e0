//! Account management module.
//!
//! Provides the account model, validation, storage and the registry that
//! enforces account policy.

mod handle;
mod model;
mod registry;
mod store;
mod validation;

pub use handle::AccountHandle;
pub use model::{Account, AccountId, AccountStatus};
pub use registry::AccountRegistry;
pub use store::{AccountStore, MemoryStore};
pub use validation::{is_valid_identifier, passwords_match};
