//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Oid`] - Git object identifier (20-byte hash)
//! - [`Signature`] - Commit author name, email and time
//! - [`Commit`] - The commit data the history engine consumes
//!
//! # Validation
//!
//! These types enforce validity at construction time. An [`Oid`] can only be
//! built from exactly 20 bytes or 40 hexadecimal characters.
//!
//! # Examples
//!
//! ```
//! use lanegraph::core::types::Oid;
//!
//! let oid = Oid::from_hex("abc123def4567890abc123def4567890abc12345").unwrap();
//! assert_eq!(oid.short(), "abc123");
//!
//! assert!(Oid::from_hex("not-a-sha").is_err());
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid object id: {0}")]
    InvalidOid(String),
}

/// A Git object identifier.
///
/// Equality and hashing are by byte value. The all-zero id is the sentinel
/// for uncommitted or local state.
///
/// # Example
///
/// ```
/// use lanegraph::core::types::Oid;
///
/// let oid = Oid::from_hex("ABC123DEF4567890ABC123DEF4567890ABC12345").unwrap();
/// assert_eq!(oid.to_hex(), "abc123def4567890abc123def4567890abc12345");
/// assert_eq!(oid.short_n(7), "abc123d");
///
/// assert!(Oid::zero().is_zero());
/// assert!(!oid.is_zero());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid([u8; Oid::LEN]);

impl Oid {
    /// Raw length in bytes.
    pub const LEN: usize = 20;

    /// Length of the hex form.
    pub const HEX_LEN: usize = Self::LEN * 2;

    /// Create an id from raw bytes.
    pub const fn from_bytes(bytes: [u8; Self::LEN]) -> Self {
        Self(bytes)
    }

    /// Create an id from a byte slice.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the slice is not exactly 20 bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let bytes: [u8; Self::LEN] = bytes.try_into().map_err(|_| {
            TypeError::InvalidOid(format!("expected {} bytes, got {}", Self::LEN, bytes.len()))
        })?;
        Ok(Self(bytes))
    }

    /// Parse a 40-character hex id (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` if the string has the wrong length or
    /// is not hexadecimal.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        if s.len() != Self::HEX_LEN {
            return Err(TypeError::InvalidOid(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                s.len()
            )));
        }
        let mut bytes = [0u8; Self::LEN];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|_| TypeError::InvalidOid("object id must be hexadecimal".into()))?;
        Ok(Self(bytes))
    }

    /// The zero id.
    pub const fn zero() -> Self {
        Self([0; Self::LEN])
    }

    /// Check if this is the zero id.
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8; Self::LEN] {
        &self.0
    }

    /// Full lowercase hex form.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The first six hex characters, as shown in history rows.
    pub fn short(&self) -> String {
        self.short_n(6)
    }

    /// The first `len` hex characters (clamped to the full length).
    pub fn short_n(&self, len: usize) -> String {
        let mut hex = self.to_hex();
        hex.truncate(len.min(Self::HEX_LEN));
        hex
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.to_hex()
    }
}

impl std::str::FromStr for Oid {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self.short_n(10))
    }
}

/// Author identity attached to a commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Author name
    pub name: String,
    /// Author email
    pub email: String,
    /// Author timestamp
    pub when: DateTime<Utc>,
}

impl Default for Signature {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            when: DateTime::UNIX_EPOCH,
        }
    }
}

/// A commit as seen by the history engine.
///
/// Only `oid` and `parents` drive the graph; the rest is carried through for
/// the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// The commit id
    pub oid: Oid,
    /// Parent ids in order; empty for a root commit, 2+ for a merge
    pub parents: Vec<Oid>,
    /// Author signature
    pub signature: Signature,
    /// First line of the commit message
    pub summary: String,
}

impl Commit {
    /// Create a commit with an empty signature and summary.
    pub fn new(oid: Oid, parents: Vec<Oid>) -> Self {
        Self {
            oid,
            parents,
            signature: Signature::default(),
            summary: String::new(),
        }
    }

    /// The first parent, if any.
    pub fn first_parent(&self) -> Option<&Oid> {
        self.parents.first()
    }

    /// True when the commit has more than one parent.
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }

    /// True when the commit has no parents.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.summary.is_empty() {
            write!(f, "{}", self.oid.short())
        } else {
            write!(f, "{} {}", self.oid.short(), self.summary)
        }
    }
}
