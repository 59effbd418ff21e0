//! Lockout policy.

use serde::{Deserialize, Serialize};

/// Failed authentications an account may accumulate before the next failure
/// locks it.
pub const DEFAULT_FAILED_ATTEMPT_LIMIT: u32 = 5;

/// Business policy for repeated failed authentication.
///
/// An account records failures up to `failed_attempt_limit`. The failure that
/// arrives once the counter already sits at the limit locks the account, so
/// with the default of 5 the sixth consecutive wrong password locks it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockoutPolicy {
    /// Failures recorded before the next one locks the account.
    pub failed_attempt_limit: u32,
}

impl LockoutPolicy {
    /// Create a policy with the given limit.
    #[must_use]
    pub const fn new(failed_attempt_limit: u32) -> Self {
        Self {
            failed_attempt_limit,
        }
    }

    /// Whether a further failure should lock an account with this many
    /// recorded failures.
    #[must_use]
    pub const fn locks_after(self, failed_attempts: u32) -> bool {
        failed_attempts >= self.failed_attempt_limit
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_FAILED_ATTEMPT_LIMIT)
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
    fn default_limit_is_five() {
        assert_eq!(LockoutPolicy::default().failed_attempt_limit, 5);
    }

    #[test]
    fn locks_only_once_limit_reached() {
        let policy = LockoutPolicy::default();
        assert!(!policy.locks_after(0));
        assert!(!policy.locks_after(4));
        assert!(policy.locks_after(5));
    }

    #[test]
    fn zero_limit_locks_on_first_failure() {
        assert!(LockoutPolicy::new(0).locks_after(0));
    }

    #[test]
    fn deserialize_fills_missing_fields() {
        let policy: LockoutPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, LockoutPolicy::default());

        let policy: LockoutPolicy =
            serde_json::from_str(r#"{"failed_attempt_limit": 3}"#).unwrap();
        assert_eq!(policy.failed_attempt_limit, 3);
    }
}
