//! Note store: the identifier → note mapping.
//!
//! Every operation takes the map lock exactly once, so each call is atomic
//! with respect to every other. The store performs no authorization.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;
use std::slice;
use std::sync::Arc;

use notes_core::{Note, NoteId, UserId, Visibility};
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};

/// Notes keyed by identifier.
///
/// Records are shared as `Arc<Note>` and replaced wholesale on update, so a
/// listing snapshot never observes a half-written note.
#[derive(Default)]
pub struct NoteStore {
    notes: RwLock<BTreeMap<NoteId, Arc<Note>>>,
}

impl NoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new note. Fails if the identifier is taken.
    pub async fn create(
        &self,
        id: NoteId,
        author: UserId,
        text: String,
        visibility: Visibility,
    ) -> StoreResult<Note> {
        let mut notes = self.notes.write().await;
        match notes.entry(id) {
            Entry::Occupied(entry) => Err(StoreError::DuplicateNote(entry.key().clone())),
            Entry::Vacant(entry) => {
                let note = Note::new(entry.key().clone(), author, text, visibility);
                entry.insert(Arc::new(note.clone()));
                Ok(note)
            }
        }
    }

    pub async fn read(&self, id: &NoteId) -> StoreResult<Note> {
        self.notes
            .read()
            .await
            .get(id)
            .map(|note| Note::clone(note))
            .ok_or_else(|| StoreError::NoteNotFound(id.clone()))
    }

    /// Replace a note's text, and its visibility when one is given. The author
    /// is never touched.
    pub async fn update(
        &self,
        id: &NoteId,
        text: String,
        visibility: Option<Visibility>,
    ) -> StoreResult<Note> {
        self.update_where(id, |_| true, text, visibility).await
    }

    /// Like [`update`](Self::update), but a note by a different author counts
    /// as missing.
    ///
    /// Used after an authorization check performed on an earlier snapshot: if
    /// the note was deleted and recreated by someone else in between, the note
    /// that was authorized is gone.
    pub async fn update_owned(
        &self,
        id: &NoteId,
        author: &UserId,
        text: String,
        visibility: Option<Visibility>,
    ) -> StoreResult<Note> {
        self.update_where(id, |note| note.author == *author, text, visibility)
            .await
    }

    async fn update_where(
        &self,
        id: &NoteId,
        matches: impl Fn(&Note) -> bool,
        text: String,
        visibility: Option<Visibility>,
    ) -> StoreResult<Note> {
        let mut notes = self.notes.write().await;
        let slot = notes
            .get_mut(id)
            .filter(|note| matches(note))
            .ok_or_else(|| StoreError::NoteNotFound(id.clone()))?;

        let updated = Note {
            text,
            visibility: visibility.unwrap_or(slot.visibility),
            ..Note::clone(slot)
        };
        *slot = Arc::new(updated.clone());
        Ok(updated)
    }

    pub async fn delete(&self, id: &NoteId) -> StoreResult<()> {
        self.delete_where(id, |_| true).await
    }

    /// Like [`delete`](Self::delete), but a note by a different author counts
    /// as missing.
    pub async fn delete_owned(&self, id: &NoteId, author: &UserId) -> StoreResult<()> {
        self.delete_where(id, |note| note.author == *author).await
    }

    async fn delete_where(
        &self,
        id: &NoteId,
        matches: impl Fn(&Note) -> bool,
    ) -> StoreResult<()> {
        let mut notes = self.notes.write().await;
        match notes.entry(id.clone()) {
            Entry::Occupied(entry) if matches(entry.get()) => {
                entry.remove();
                Ok(())
            }
            _ => Err(StoreError::NoteNotFound(id.clone())),
        }
    }

    /// Snapshot the store and filter it lazily with `predicate`.
    ///
    /// The snapshot is taken under the read lock; the predicate runs during
    /// iteration, after the lock is released. Iterating the returned listing
    /// more than once yields the same notes, ordered by identifier.
    pub async fn list<P>(&self, predicate: P) -> Listing<P>
    where
        P: Fn(&Note) -> bool,
    {
        let snapshot = self.notes.read().await.values().cloned().collect();
        Listing {
            snapshot,
            predicate,
        }
    }

    /// Number of stored notes.
    pub async fn len(&self) -> usize {
        self.notes.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl fmt::Debug for NoteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NoteStore").finish_non_exhaustive()
    }
}

/// A filtered, restartable view over a point-in-time snapshot of notes.
pub struct Listing<P> {
    snapshot: Vec<Arc<Note>>,
    predicate: P,
}

impl<P> Listing<P>
where
    P: Fn(&Note) -> bool,
{
    /// Start a fresh pass over the snapshot.
    pub fn iter(&self) -> ListingIter<'_, P> {
        ListingIter {
            inner: self.snapshot.iter(),
            predicate: &self.predicate,
        }
    }
}

impl<'a, P> IntoIterator for &'a Listing<P>
where
    P: Fn(&Note) -> bool,
{
    type Item = &'a Note;
    type IntoIter = ListingIter<'a, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator returned by [`Listing::iter`].
pub struct ListingIter<'a, P> {
    inner: slice::Iter<'a, Arc<Note>>,
    predicate: &'a P,
}

impl<'a, P> Iterator for ListingIter<'a, P>
where
    P: Fn(&Note) -> bool,
{
    type Item = &'a Note;

    fn next(&mut self) -> Option<Self::Item> {
        let predicate = self.predicate;
        self.inner
            .by_ref()
            .map(|note| note.as_ref())
            .find(|note| predicate(note))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}
