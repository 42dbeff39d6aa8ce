//! notes-store: in-memory storage for the shared notes service
//!
//! This crate provides:
//! - `CredentialStore`: registered users, hashed secrets, issued API keys
//! - `NoteStore`: atomic create/read/update/delete/list over notes
//!
//! Each store owns its map behind a single `tokio::sync::RwLock`. Reads run
//! concurrently; every structural or in-place mutation takes the write guard,
//! so operations on the same identifier are linearizable.
//!
//! Neither store makes authorization decisions.
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_store::{CredentialStore, NoteStore};
//!
//! let users = CredentialStore::new();
//! let api_key = users.register(user_id.clone(), "secret").await?;
//!
//! let notes = NoteStore::new();
//! notes.create(note_id, user_id, text, Visibility::Private).await?;
//! ```

pub mod credentials;
pub mod error;
pub mod notes;

pub use credentials::{API_KEY_BYTES, ApiKey, CredentialStore};
pub use error::{StoreError, StoreResult};
pub use notes::{Listing, ListingIter, NoteStore};

// Re-export notes-core for downstream crates
pub use notes_core;
