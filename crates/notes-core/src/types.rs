//! Core data types for the shared notes service.
//!
//! - Users are identified by a caller-chosen, immutable string
//! - Notes are identified by a caller-chosen string, unique within the store
//! - Every note has exactly one author, fixed at creation
//! - Visibility is the only per-note access switch
//!
//! All types derive `Debug`, `Clone`, `Serialize`, and `Deserialize` for
//! inspection, copying, and JSON serialization.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::input::{self, InputError};

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for a registered user.
///
/// Construct through [`FromStr`] (or [`UserId::parse`]) so the value has been
/// validated; the inner string is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Validates and wraps a user identifier.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        input::validate_identifier("user_id", raw).map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UserId {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Unique identifier for a note, assigned by the creating caller.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    /// Validates and wraps a note identifier.
    pub fn parse(raw: &str) -> Result<Self, InputError> {
        input::validate_identifier("id", raw).map(Self)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for NoteId {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// ============================================================================
// Note
// ============================================================================

/// Whether non-authors may read a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Readable by every authenticated user.
    Public,
    /// Readable by the author only.
    #[default]
    Private,
}

impl Visibility {
    /// Maps the wire-level `isPublic` flag to a visibility.
    #[must_use]
    pub const fn from_public_flag(is_public: bool) -> Self {
        if is_public { Self::Public } else { Self::Private }
    }

    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(self, Self::Public)
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Public => f.write_str("public"),
            Self::Private => f.write_str("private"),
        }
    }
}

/// A stored note.
///
/// `id` and `author` are fixed for the lifetime of the record; only `text`
/// and `visibility` change, and only through an update by the author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub text: String,
    pub author: UserId,
    pub visibility: Visibility,
}

impl Note {
    #[must_use]
    pub fn new(id: NoteId, author: UserId, text: String, visibility: Visibility) -> Self {
        Self {
            id,
            text,
            author,
            visibility,
        }
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.visibility.is_public()
    }
}
