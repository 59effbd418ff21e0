//! Identifier and password-entry validation.

use std::sync::LazyLock;

use regex::Regex;
use subtle::ConstantTimeEq;

/// Local part, `@`, domain labels, then a 2-4 letter top-level segment.
/// The whole identifier must match.
const IDENTIFIER_PATTERN: &str = r"\A[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,4}\z";

#[allow(clippy::expect_used)] // Constant pattern; covered by tests
static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(IDENTIFIER_PATTERN).expect("identifier pattern compiles"));

/// Check whether an identifier is shaped like an email address.
///
/// No trimming is done: surrounding whitespace makes an identifier invalid.
#[must_use]
pub fn is_valid_identifier(identifier: &str) -> bool {
    IDENTIFIER_RE.is_match(identifier)
}

/// Check that a password and its confirmation were typed identically.
#[must_use]
pub fn passwords_match(password: &str, confirmation: &str) -> bool {
    password.as_bytes().ct_eq(confirmation.as_bytes()).into()
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
    fn test_valid_identifiers() {
        assert!(is_valid_identifier("a@b.com"));
        assert!(is_valid_identifier("user.name@example.com"));
        assert!(is_valid_identifier("user+tag@sub.example.org"));
        assert!(is_valid_identifier("first_last%x-y@my-host.io"));
        assert!(is_valid_identifier("USER@EXAMPLE.INFO"));
    }

    #[test]
    fn test_invalid_identifiers() {
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("user"));
        assert!(!is_valid_identifier("@example.com"));
        assert!(!is_valid_identifier("user@"));
        assert!(!is_valid_identifier("user@example"));
        assert!(!is_valid_identifier("user@@example.com"));
        assert!(!is_valid_identifier("user name@example.com"));
    }

    #[test]
    fn test_top_level_segment_length() {
        assert!(!is_valid_identifier("user@example.c"));
        assert!(is_valid_identifier("user@example.co"));
        assert!(is_valid_identifier("user@example.info"));
        assert!(!is_valid_identifier("user@example.museum"));
        assert!(!is_valid_identifier("user@example.c0m"));
    }

    #[test]
    fn test_whole_string_must_match() {
        assert!(!is_valid_identifier(" user@example.com"));
        assert!(!is_valid_identifier("user@example.com "));
        assert!(!is_valid_identifier("user@example.com\n"));
        assert!(!is_valid_identifier("x user@example.com"));
    }

    #[test]
    fn test_non_ascii_rejected() {
        assert!(!is_valid_identifier("jos\u{e9}@example.com"));
        assert!(!is_valid_identifier("user@b\u{fc}cher.de"));
    }

    #[test]
    fn test_passwords_match() {
        assert!(passwords_match("p1", "p1"));
        assert!(passwords_match("", ""));
        assert!(!passwords_match("p1", "p2"));
        assert!(!passwords_match("p1", "p1 "));
        assert!(!passwords_match("P1", "p1"));
    }
}
