//! Access policy: who may read or modify a note.
//!
//! Both decisions are total over a resolved note snapshot. Callers resolve the
//! note first; a missing note is reported as not found before either function
//! runs.

use crate::types::{Note, UserId};

/// A user may read a note if it is public or they wrote it.
#[must_use]
pub fn can_read(user: &UserId, note: &Note) -> bool {
    note.is_public() || *user == note.author
}

/// Only the author may change or delete a note, regardless of visibility.
#[must_use]
pub fn can_modify(user: &UserId, note: &Note) -> bool {
    *user == note.author
}
