//! Identifier types for coinshop.
//!
//! Accounts are keyed by a human-chosen username. The username is the primary key in
//! storage and the `sub` claim of issued tokens, so it is validated once, at the edge,
//! and carried as a [`Username`] everywhere else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum username length in bytes (matches the `VARCHAR(255)` column).
pub const MAX_USERNAME_LEN: usize = 255;

/// A validated account username.
///
/// Usernames are non-empty and at most [`MAX_USERNAME_LEN`] bytes. They are compared
/// byte-for-byte; no case folding or trimming is applied.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Parse and validate a username.
    ///
    /// # Errors
    ///
    /// Returns `IdError::Empty` for an empty string and `IdError::TooLong` when the
    /// input exceeds [`MAX_USERNAME_LEN`] bytes.
    pub fn new(value: impl Into<String>) -> Result<Self, IdError> {
        let value = value.into();
        if value.is_empty() {
            return Err(IdError::Empty);
        }
        if value.len() > MAX_USERNAME_LEN {
            return Err(IdError::TooLong {
                len: value.len(),
                max: MAX_USERNAME_LEN,
            });
        }
        Ok(Self(value))
    }

    /// Return the username as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Username {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Debug for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username({})", self.0)
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Username> for String {
    fn from(name: Username) -> Self {
        name.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Errors that can occur when parsing identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdError {
    /// The username is empty.
    #[error("username must not be empty")]
    Empty,

    /// The username is longer than the storage column allows.
    #[error("username is {len} bytes, maximum is {max}")]
    TooLong {
        /// Actual length in bytes.
        len: usize,
        /// Maximum accepted length in bytes.
        max: usize,
    },
}
