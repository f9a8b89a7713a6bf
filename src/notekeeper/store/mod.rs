//! # Storage Layer
//!
//! The [`NoteStore`] trait is the only way the session and the API touch
//! persisted notes.
//!
//! ## Implementations
//!
//! - [`fs::FileStore`]: production storage
//!   - Metadata for every note in `data.json`
//!   - Content in one file per note: `note-{id}{ext}`
//! - [`memory::InMemoryStore`]: no persistence, for tests and embedding
//!
//! ## Storage Format
//!
//! ```text
//! $NOTEKEEPER_HOME/
//! ├── data.json            # id -> metadata, tags and password digest
//! ├── note-{id}.md         # content of one note
//! └── config.json          # user configuration
//! ```
//!
//! Metadata and content are kept apart so that listing notes and opening a
//! locked private note never read a content file.
//!
//! ## Example Notes
//!
//! Every store starts with two example notes ([`WELCOME_NOTE_ID`] and
//! [`FEATURE_SHOWCASE_ID`]). [`NoteStore::delete`] refuses them.

use chrono::{Duration, Utc};

use crate::error::Result;
use crate::model::{Note, NoteData, NoteId, NoteMeta, FEATURE_SHOWCASE_ID, WELCOME_NOTE_ID};

pub mod fs;
pub mod memory;

/// Persistence for notes.
///
/// Calls are synchronous: the single editing session issues one at a time.
pub trait NoteStore {
    /// All notes, most recently updated first, optionally filtered by a
    /// case-insensitive substring of title or content.
    fn fetch_all(&self, search: Option<&str>) -> Result<Vec<Note>>;

    /// A note with its content, or `None` if no such note exists.
    fn fetch_by_id(&self, id: &NoteId) -> Result<Option<Note>>;

    /// A note without content and tags.
    fn fetch_meta(&self, id: &NoteId) -> Result<Option<NoteMeta>>;

    /// Stores a new note under a freshly minted id.
    fn create(&mut self, data: NoteData) -> Result<Note>;

    /// Replaces a note's data and refreshes `updated_at`.
    fn update(&mut self, id: &NoteId, data: NoteData) -> Result<Note>;

    /// Removes a note. Returns false for unknown ids and example notes.
    fn delete(&mut self, id: &NoteId) -> Result<bool>;
}

pub(crate) fn matches_search(note: &Note, search: Option<&str>) -> bool {
    let term = match search.map(str::trim) {
        Some(term) if !term.is_empty() => term.to_lowercase(),
        _ => return true,
    };
    note.title.to_lowercase().contains(&term) || note.content.to_lowercase().contains(&term)
}

pub(crate) fn sort_recent(notes: &mut [Note]) {
    notes.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Mints an id that is not taken yet.
pub(crate) fn fresh_id(taken: impl Fn(&NoteId) -> bool) -> NoteId {
    loop {
        let id = NoteId::generate();
        if !id.is_reserved() && !taken(&id) {
            return id;
        }
    }
}

const WELCOME_CONTENT: &str = "# **Welcome to NoteKeeper**\n\n\
Write notes with **bold**, *italic* and <u>underlined</u> text.\n\n\
## **Getting around**\n\n\
- Toggle headings and quotes from the toolbar\n\
- Start a list and press Enter to continue it\n\
- Make a note private to lock it behind a password\n\n\
> *Example notes cannot be deleted.*";

const SHOWCASE_CONTENT: &str = "# **Feature Showcase & Demo**\n\n\
This note demonstrates **every feature** available in NoteKeeper. Feel free to edit and experiment!\n\n\
## **Text formatting**\n\n\
- **Bold text** for emphasis\n\
- *Italic text* for subtle emphasis\n\
- <u>Underlined text</u> for highlights\n\
- ***Bold and italic*** for maximum impact\n\n\
## **Lists**\n\n\
1. Planning phase\n\
2. Development phase\n\
3. Testing phase\n\n\
> *\"The secret to getting ahead is getting started.\" - Mark Twain*";

/// The example notes every store is seeded with.
pub fn example_notes() -> Vec<Note> {
    let now = Utc::now();
    let mut welcome = Note::from_data(
        NoteId::new(WELCOME_NOTE_ID),
        NoteData::new("Welcome to NoteKeeper", WELCOME_CONTENT)
            .with_tags(vec!["welcome".into(), "getting-started".into()]),
    );
    welcome.created_at = now - Duration::days(3);
    welcome.updated_at = now - Duration::days(2);

    let mut showcase = Note::from_data(
        NoteId::new(FEATURE_SHOWCASE_ID),
        NoteData::new("Feature Showcase & Demo", SHOWCASE_CONTENT).with_tags(
            ["demo", "features", "markdown", "examples", "tutorial"]
                .into_iter()
                .map(String::from)
                .collect(),
        ),
    );
    showcase.created_at = now - Duration::days(2);
    showcase.updated_at = now - Duration::days(1);

    vec![welcome, showcase]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::markdown::from_markdown;
    use crate::document::BlockKind;

    #[test]
    fn search_is_case_insensitive_on_title_and_content() {
        let note = Note::from_data(NoteId::new("n"), NoteData::new("Groceries", "Buy MILK"));
        assert!(matches_search(&note, Some("grocer")));
        assert!(matches_search(&note, Some("milk")));
        assert!(matches_search(&note, Some("  ")));
        assert!(matches_search(&note, None));
        assert!(!matches_search(&note, Some("bread")));
    }

    #[test]
    fn example_notes_parse_as_documents() {
        for note in example_notes() {
            assert!(note.id.is_reserved());
            let doc = from_markdown(&note.content);
            assert_eq!(doc.blocks()[0].kind, BlockKind::Heading1);
        }
    }

    #[test]
    fn fresh_ids_skip_taken_ones() {
        let id = fresh_id(|_| false);
        assert!(!id.is_reserved());
    }
}
