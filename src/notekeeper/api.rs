//! # API Facade
//!
//! The API layer is the single entry point for every notekeeper operation,
//! whatever UI drives it.
//!
//! ## Role and Responsibilities
//!
//! The API facade:
//! - **Resolves** user-facing note references (list positions or ids) to [`NoteId`]s
//! - **Hides** private content from listings and searches
//! - **Starts** editing sessions and routes their store calls
//! - **Returns** structured outcomes, including where the UI should navigate next
//!
//! ## What the API Does NOT Do
//!
//! - **Editing logic**: that lives in [`crate::session`] and the engine modules
//! - **I/O**: no stdout, stderr or terminal assumptions
//! - **Presentation**: returns data, never formatted strings
//!
//! ## Generic Over NoteStore
//!
//! `NotesApi<S: NoteStore>` works with any backend:
//! - Production: `NotesApi<FileStore>`
//! - Testing: `NotesApi<InMemoryStore>`

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::error::{NoteError, Result};
use crate::model::{Note, NoteId};
use crate::session::{EditingSession, SaveOutcome};
use crate::store::NoteStore;

const PREVIEW_CHARS: usize = 80;

/// One row of a note listing. Private notes never carry a preview or tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteSummary {
    /// 1-based position in the listing
    pub index: usize,
    pub id: NoteId,
    pub title: String,
    pub preview: Option<String>,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub updated_at: DateTime<Utc>,
}

impl NoteSummary {
    fn from_note(index: usize, note: Note) -> Self {
        let (preview, tags) = if note.is_private {
            (None, Vec::new())
        } else {
            (Some(preview_of(&note.content)), note.tags)
        };
        Self {
            index,
            id: note.id,
            title: note.title,
            preview,
            tags,
            is_private: note.is_private,
            updated_at: note.updated_at,
        }
    }
}

fn preview_of(content: &str) -> String {
    content
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(PREVIEW_CHARS)
        .collect()
}

/// Where the UI should go after an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// A note was just created; show it under its new id.
    Note(NoteId),
    /// The note is gone; show the landing view.
    Landing,
    Stay,
}

pub struct NotesApi<S: NoteStore> {
    store: S,
}

impl<S: NoteStore> NotesApi<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Notes, most recently updated first.
    ///
    /// A search never matches a private note through its content, only
    /// through its title.
    pub fn list_notes(&self, search: Option<&str>) -> Result<Vec<NoteSummary>> {
        let term = search
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let notes = self.store.fetch_all(term.as_deref())?;
        let summaries = notes
            .into_iter()
            .filter(|note| match (&term, note.is_private) {
                (Some(term), true) => note.title.to_lowercase().contains(term),
                _ => true,
            })
            .enumerate()
            .map(|(i, note)| NoteSummary::from_note(i + 1, note))
            .collect();
        Ok(summaries)
    }

    /// Resolves a list position (`"2"`) or a note id.
    pub fn resolve(&self, reference: &str) -> Result<NoteId> {
        let reference = reference.trim();
        if let Ok(index) = reference.parse::<usize>() {
            let notes = self.list_notes(None)?;
            return index
                .checked_sub(1)
                .and_then(|i| notes.into_iter().nth(i))
                .map(|summary| summary.id)
                .ok_or_else(|| NoteError::NotFound(format!("no note at position {}", index)));
        }

        let id = NoteId::new(reference);
        match self.store.fetch_meta(&id)? {
            Some(meta) => Ok(meta.id),
            None => Err(NoteError::NotFound(reference.to_string())),
        }
    }

    /// Opens a session on the referenced note.
    pub fn open(&self, reference: &str) -> Result<EditingSession> {
        let id = self.resolve(reference)?;
        debug!("opening note {}", id);
        EditingSession::open(&self.store, &id)?.ok_or_else(|| NoteError::NotFound(id.to_string()))
    }

    pub fn new_session(&self) -> EditingSession {
        EditingSession::new_note()
    }

    /// Saves the session. A first save navigates to the new note.
    pub fn save(&mut self, session: &mut EditingSession) -> Result<Navigation> {
        match session.save(&mut self.store)? {
            SaveOutcome::Created(id) => Ok(Navigation::Note(id)),
            SaveOutcome::Updated(_) | SaveOutcome::Discarded => Ok(Navigation::Stay),
        }
    }

    pub fn delete_note(&mut self, reference: &str) -> Result<Navigation> {
        let id = self.resolve(reference)?;
        if id.is_reserved() {
            return Err(NoteError::ReservedNote(
                "Example notes cannot be deleted".to_string(),
            ));
        }
        if !self.store.delete(&id)? {
            return Err(NoteError::NotFound(id.to_string()));
        }
        info!("deleted note {}", id);
        Ok(Navigation::Landing)
    }

    pub fn set_private(
        &mut self,
        session: &mut EditingSession,
        password: &str,
        confirm: &str,
    ) -> Result<()> {
        session.set_private(&mut self.store, password, confirm)
    }

    pub fn lock(&mut self, session: &mut EditingSession) -> Result<()> {
        session.lock(&mut self.store)
    }

    pub fn unlock(&self, session: &mut EditingSession, password: &str) -> Result<()> {
        session.unlock(&self.store, password)
    }

    pub fn request_make_public(&mut self, session: &mut EditingSession) -> Result<()> {
        session.request_make_public(&mut self.store)
    }

    pub fn make_public(&mut self, session: &mut EditingSession, password: &str) -> Result<()> {
        session.make_public(&mut self.store, password)
    }

    pub fn submit_prompt(&mut self, session: &mut EditingSession) -> Result<()> {
        session.submit_prompt(&mut self.store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::LockState;
    use crate::model::{FEATURE_SHOWCASE_ID, WELCOME_NOTE_ID};
    use crate::store::memory::fixtures::StoreFixture;
    use crate::store::memory::InMemoryStore;

    fn api_with(fixture: StoreFixture) -> NotesApi<InMemoryStore> {
        NotesApi::new(fixture.store)
    }

    #[test]
    fn listing_hides_private_content_and_tags() {
        let api = api_with(
            StoreFixture::new()
                .with_note("Groceries", "eggs\n\nmilk")
                .with_private_note("Diary", "secret thoughts", "abcd"),
        );
        let notes = api.list_notes(None).unwrap();
        assert_eq!(notes.len(), 2);

        let diary = notes.iter().find(|n| n.title == "Diary").unwrap();
        assert!(diary.is_private);
        assert!(diary.preview.is_none());
        assert!(diary.tags.is_empty());

        let groceries = notes.iter().find(|n| n.title == "Groceries").unwrap();
        assert_eq!(groceries.preview.as_deref(), Some("eggs milk"));
        assert_eq!(notes[0].index, 1);
        assert_eq!(notes[1].index, 2);
    }

    #[test]
    fn search_never_matches_private_content() {
        let api = api_with(
            StoreFixture::new()
                .with_note("Public", "shared secret")
                .with_private_note("Diary", "secret thoughts", "abcd"),
        );
        let found = api.list_notes(Some("secret")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Public");

        let by_title = api.list_notes(Some("DIARY")).unwrap();
        assert_eq!(by_title.len(), 1);
        assert!(by_title[0].is_private);
    }

    #[test]
    fn resolve_accepts_positions_and_ids() {
        let fixture = StoreFixture::new().with_note("Only", "one");
        let id = fixture.id(0);
        let api = api_with(fixture);

        assert_eq!(api.resolve("1").unwrap(), id);
        assert_eq!(api.resolve(id.as_str()).unwrap(), id);
        assert!(matches!(api.resolve("2"), Err(NoteError::NotFound(_))));
        assert!(matches!(api.resolve("0"), Err(NoteError::NotFound(_))));
        assert!(matches!(api.resolve("nope"), Err(NoteError::NotFound(_))));
    }

    #[test]
    fn first_save_navigates_to_the_new_note() {
        let mut api = NotesApi::new(InMemoryStore::empty());
        let mut session = api.new_session();
        session.set_title("Fresh").unwrap();
        session.type_text("text").unwrap();

        let nav = api.save(&mut session).unwrap();
        let id = session.id().cloned().unwrap();
        assert_eq!(nav, Navigation::Note(id));

        session.type_text(" more").unwrap();
        assert_eq!(api.save(&mut session).unwrap(), Navigation::Stay);
    }

    #[test]
    fn delete_navigates_to_landing() {
        let fixture = StoreFixture::new().with_notes(2);
        let id = fixture.id(1);
        let mut api = api_with(fixture);

        assert_eq!(api.delete_note(id.as_str()).unwrap(), Navigation::Landing);
        assert!(api.store().fetch_by_id(&id).unwrap().is_none());
        assert_eq!(api.list_notes(None).unwrap().len(), 1);
    }

    #[test]
    fn example_notes_are_never_deleted() {
        let mut api = NotesApi::new(InMemoryStore::new());
        let before = api.list_notes(None).unwrap();
        for id in [FEATURE_SHOWCASE_ID, WELCOME_NOTE_ID] {
            assert!(matches!(
                api.delete_note(id),
                Err(NoteError::ReservedNote(_))
            ));
        }
        assert_eq!(api.list_notes(None).unwrap(), before);
    }

    #[test]
    fn open_routes_privacy_through_the_store() {
        let fixture = StoreFixture::new().with_private_note("Diary", "dear diary", "abcd");
        let mut api = api_with(fixture);

        let mut session = api.open("1").unwrap();
        assert_eq!(session.lock_state(), LockState::PrivateLocked);
        api.unlock(&mut session, "abcd").unwrap();
        assert_eq!(session.tags(), ["secret".to_string()]);

        api.make_public(&mut session, "abcd").unwrap();
        let notes = api.list_notes(None).unwrap();
        assert!(!notes[0].is_private);
        assert_eq!(notes[0].preview.as_deref(), Some("dear diary"));
    }

    #[test]
    fn opening_a_missing_note_fails() {
        let api = NotesApi::new(InMemoryStore::empty());
        assert!(matches!(api.open("missing"), Err(NoteError::NotFound(_))));
    }
}
