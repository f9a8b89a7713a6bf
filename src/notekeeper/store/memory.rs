use chrono::Utc;
use log::debug;
use std::collections::HashMap;

use super::{example_notes, fresh_id, matches_search, sort_recent, NoteStore};
use crate::error::{NoteError, Result};
use crate::model::{Note, NoteData, NoteId, NoteMeta};

/// In-memory storage for testing and embedding.
/// Does NOT persist data.
#[derive(Debug, Clone)]
pub struct InMemoryStore {
    notes: HashMap<NoteId, Note>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// A store holding the example notes.
    pub fn new() -> Self {
        let mut store = Self::empty();
        for note in example_notes() {
            store.notes.insert(note.id.clone(), note);
        }
        store
    }

    /// A store with no notes at all.
    pub fn empty() -> Self {
        Self {
            notes: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

impl NoteStore for InMemoryStore {
    fn fetch_all(&self, search: Option<&str>) -> Result<Vec<Note>> {
        let mut notes: Vec<Note> = self
            .notes
            .values()
            .filter(|note| matches_search(note, search))
            .cloned()
            .collect();
        sort_recent(&mut notes);
        Ok(notes)
    }

    fn fetch_by_id(&self, id: &NoteId) -> Result<Option<Note>> {
        Ok(self.notes.get(id).cloned())
    }

    fn fetch_meta(&self, id: &NoteId) -> Result<Option<NoteMeta>> {
        Ok(self.notes.get(id).map(Note::meta))
    }

    fn create(&mut self, data: NoteData) -> Result<Note> {
        let id = fresh_id(|id| self.notes.contains_key(id));
        let note = Note::from_data(id.clone(), data);
        self.notes.insert(id, note.clone());
        Ok(note)
    }

    fn update(&mut self, id: &NoteId, data: NoteData) -> Result<Note> {
        let existing = self
            .notes
            .get_mut(id)
            .ok_or_else(|| NoteError::NotFound(id.to_string()))?;
        let created_at = existing.created_at;
        *existing = Note::from_data(id.clone(), data);
        existing.created_at = created_at;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    fn delete(&mut self, id: &NoteId) -> Result<bool> {
        if id.is_reserved() {
            debug!("refusing to delete example note {}", id);
            return Ok(false);
        }
        Ok(self.notes.remove(id).is_some())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::password::PasswordDigest;
    use std::cell::Cell;

    pub struct StoreFixture {
        pub store: InMemoryStore,
        pub ids: Vec<NoteId>,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::empty(),
                ids: Vec::new(),
            }
        }

        pub fn with_examples(mut self) -> Self {
            for note in example_notes() {
                self.store.notes.insert(note.id.clone(), note);
            }
            self
        }

        pub fn with_notes(mut self, count: usize) -> Self {
            for i in 0..count {
                let data = NoteData::new(
                    format!("Test Note {}", i + 1),
                    format!("Content for note {}", i + 1),
                );
                let note = self.store.create(data).unwrap();
                self.ids.push(note.id);
            }
            self
        }

        pub fn with_note(mut self, title: &str, content: &str) -> Self {
            let note = self.store.create(NoteData::new(title, content)).unwrap();
            self.ids.push(note.id);
            self
        }

        pub fn with_private_note(mut self, title: &str, content: &str, password: &str) -> Self {
            let data = NoteData::new(title, content)
                .with_tags(vec!["secret".into()])
                .with_privacy(Some(PasswordDigest::create(password)));
            let note = self.store.create(data).unwrap();
            self.ids.push(note.id);
            self
        }

        /// Id of the n-th note added through the fixture.
        pub fn id(&self, n: usize) -> NoteId {
            self.ids[n].clone()
        }
    }

    /// Wraps a store and counts writes and content reads.
    #[derive(Debug, Default)]
    pub struct RecordingStore<S = InMemoryStore> {
        pub inner: S,
        pub creates: usize,
        pub updates: usize,
        pub deletes: usize,
        pub content_reads: Cell<usize>,
    }

    impl<S: NoteStore> RecordingStore<S> {
        pub fn new(inner: S) -> Self {
            Self {
                inner,
                creates: 0,
                updates: 0,
                deletes: 0,
                content_reads: Cell::new(0),
            }
        }

        pub fn writes(&self) -> usize {
            self.creates + self.updates + self.deletes
        }
    }

    impl<S: NoteStore> NoteStore for RecordingStore<S> {
        fn fetch_all(&self, search: Option<&str>) -> Result<Vec<Note>> {
            self.inner.fetch_all(search)
        }

        fn fetch_by_id(&self, id: &NoteId) -> Result<Option<Note>> {
            self.content_reads.set(self.content_reads.get() + 1);
            self.inner.fetch_by_id(id)
        }

        fn fetch_meta(&self, id: &NoteId) -> Result<Option<NoteMeta>> {
            self.inner.fetch_meta(id)
        }

        fn create(&mut self, data: NoteData) -> Result<Note> {
            self.creates += 1;
            self.inner.create(data)
        }

        fn update(&mut self, id: &NoteId, data: NoteData) -> Result<Note> {
            self.updates += 1;
            self.inner.update(id, data)
        }

        fn delete(&mut self, id: &NoteId) -> Result<bool> {
            self.deletes += 1;
            self.inner.delete(id)
        }
    }

    /// Reads succeed, every write fails while `failing` is set.
    #[derive(Debug, Default)]
    pub struct FailingStore {
        pub inner: InMemoryStore,
        pub failing: bool,
    }

    impl FailingStore {
        pub fn new(inner: InMemoryStore) -> Self {
            Self {
                inner,
                failing: true,
            }
        }

        fn check(&self) -> Result<()> {
            if self.failing {
                return Err(NoteError::Store("backend unavailable".to_string()));
            }
            Ok(())
        }
    }

    impl NoteStore for FailingStore {
        fn fetch_all(&self, search: Option<&str>) -> Result<Vec<Note>> {
            self.inner.fetch_all(search)
        }

        fn fetch_by_id(&self, id: &NoteId) -> Result<Option<Note>> {
            self.inner.fetch_by_id(id)
        }

        fn fetch_meta(&self, id: &NoteId) -> Result<Option<NoteMeta>> {
            self.inner.fetch_meta(id)
        }

        fn create(&mut self, data: NoteData) -> Result<Note> {
            self.check()?;
            self.inner.create(data)
        }

        fn update(&mut self, id: &NoteId, data: NoteData) -> Result<Note> {
            self.check()?;
            self.inner.update(id, data)
        }

        fn delete(&mut self, id: &NoteId) -> Result<bool> {
            self.check()?;
            self.inner.delete(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::StoreFixture;
    use super::*;
    use crate::model::{FEATURE_SHOWCASE_ID, WELCOME_NOTE_ID};

    #[test]
    fn new_store_holds_the_examples() {
        let store = InMemoryStore::new();
        assert_eq!(store.len(), 2);
        assert!(store
            .fetch_by_id(&NoteId::from(WELCOME_NOTE_ID))
            .unwrap()
            .is_some());
        assert!(InMemoryStore::empty().is_empty());
    }

    #[test]
    fn example_notes_cannot_be_deleted() {
        let mut store = InMemoryStore::new();
        let before = store.fetch_all(None).unwrap();
        assert!(!store.delete(&NoteId::from(FEATURE_SHOWCASE_ID)).unwrap());
        assert!(!store.delete(&NoteId::from(WELCOME_NOTE_ID)).unwrap());
        assert_eq!(store.fetch_all(None).unwrap(), before);
    }

    #[test]
    fn create_then_update_keeps_created_at() {
        let mut store = InMemoryStore::empty();
        let note = store.create(NoteData::new("A", "one")).unwrap();
        let updated = store.update(&note.id, NoteData::new("A", "two")).unwrap();
        assert_eq!(updated.created_at, note.created_at);
        assert!(updated.updated_at >= note.updated_at);
        assert_eq!(updated.content, "two");
    }

    #[test]
    fn update_of_unknown_id_is_not_found() {
        let mut store = InMemoryStore::empty();
        let err = store
            .update(&NoteId::new("missing"), NoteData::new("A", ""))
            .unwrap_err();
        assert!(matches!(err, NoteError::NotFound(_)));
    }

    #[test]
    fn fetch_all_filters_and_orders_by_update() {
        let fixture = StoreFixture::new()
            .with_note("Groceries", "milk")
            .with_note("Work", "call bob");
        let mut store = fixture.store;
        let groceries = fixture.ids[0].clone();
        std::thread::sleep(std::time::Duration::from_millis(5));
        store
            .update(&groceries, NoteData::new("Groceries", "milk and eggs"))
            .unwrap();

        let all = store.fetch_all(None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, groceries);

        let found = store.fetch_all(Some("BOB")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Work");
    }

    #[test]
    fn delete_removes_only_existing_notes() {
        let mut fixture = StoreFixture::new().with_notes(2);
        let id = fixture.id(0);
        assert!(fixture.store.delete(&id).unwrap());
        assert!(!fixture.store.delete(&id).unwrap());
        assert_eq!(fixture.store.len(), 1);
    }

    #[test]
    fn meta_never_carries_content() {
        let fixture = StoreFixture::new().with_private_note("Diary", "secret", "abcd");
        let meta = fixture.store.fetch_meta(&fixture.id(0)).unwrap().unwrap();
        assert!(meta.is_private);
        assert!(meta.password.is_some());
        assert_eq!(meta.title, "Diary");
    }
}
