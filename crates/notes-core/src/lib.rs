//! notes-core: shared types and pure decisions for the shared notes service
//!
//! This crate provides:
//! - Identifier newtypes (`UserId`, `NoteId`) and the `Note` record
//! - The access policy (`can_read`, `can_modify`)
//! - Input normalization (identifier/text validation, HTML sanitizing,
//!   form-style flag parsing)
//!
//! Nothing in here performs I/O or holds state.

pub mod input;
pub mod policy;
pub mod types;

pub use input::InputError;
pub use policy::{can_modify, can_read};
pub use types::{Note, NoteId, UserId, Visibility};
