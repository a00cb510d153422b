//! Email address type.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Shape check used by the user payload validator: something, an @, a
/// domain containing at least one dot, and no whitespace anywhere.
#[allow(clippy::unwrap_used)] // literal pattern, covered by tests
static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input does not look like `local@domain.tld`.
    #[error("email must be a valid email address")]
    Malformed,
}

/// An email address.
///
/// Stored exactly as given, casing included. Uniqueness across users is
/// decided on [`Email::normalized`], which ignores case.
///
/// ## Examples
///
/// ```
/// use ordercast_core::Email;
///
/// assert!(Email::parse("user@example.com").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse(" user@example.com ").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("user@localhost").is_err());
/// assert!(Email::parse("two words@example.com").is_err());
///
/// let a = Email::parse("A@B.com").unwrap();
/// let b = Email::parse("a@b.COM").unwrap();
/// assert_eq!(a.normalized(), b.normalized());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse an `Email` from a string as-is.
    ///
    /// Surrounding whitespace is not stripped; a padded address is malformed.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError::Empty`] for an empty string and
    /// [`EmailError::Malformed`] when the address does not match
    /// `local@domain.tld` without whitespace.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if !EMAIL_PATTERN.is_match(s) {
            return Err(EmailError::Malformed);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Case-folded form used as the uniqueness key.
    #[must_use]
    pub fn normalized(&self) -> String {
        self.0.to_lowercase()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
