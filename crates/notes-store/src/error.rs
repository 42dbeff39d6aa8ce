//! Error types for the storage layer.

use notes_core::{NoteId, UserId};
use thiserror::Error;

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during storage operations.
///
/// Apart from `Hashing`, these are ordinary per-operation outcomes.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Duplicate user - a user with this ID is already registered.
    #[error("user already exists: {0}")]
    DuplicateUser(UserId),

    /// Duplicate note - a note with this ID already exists.
    #[error("note already exists: {0}")]
    DuplicateNote(NoteId),

    /// Note not found.
    #[error("note not found: {0}")]
    NoteNotFound(NoteId),

    /// The secret could not be hashed.
    #[error("failed to hash secret: {0}")]
    Hashing(String),
}
