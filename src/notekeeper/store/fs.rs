use chrono::Utc;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{example_notes, fresh_id, matches_search, sort_recent, NoteStore};
use crate::error::{NoteError, Result};
use crate::model::{Note, NoteData, NoteId, NoteMeta};

const DATA_FILENAME: &str = "data.json";
const DEFAULT_FILE_EXT: &str = ".md";

/// One entry of `data.json`: everything about a note but its content.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    #[serde(flatten)]
    meta: NoteMeta,
    #[serde(default)]
    tags: Vec<String>,
}

type Index = HashMap<NoteId, IndexEntry>;

pub struct FileStore {
    root: PathBuf,
    file_ext: String,
}

impl FileStore {
    /// Opens the store at `root`, creating and seeding it on first use.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self {
            root: root.into(),
            file_ext: DEFAULT_FILE_EXT.to_string(),
        };
        store.ensure_dir()?;
        if !store.data_file().exists() {
            store.seed()?;
        }
        Ok(store)
    }

    pub fn with_file_ext(mut self, ext: &str) -> Self {
        if ext.starts_with('.') {
            self.file_ext = ext.to_string();
        } else {
            self.file_ext = format!(".{}", ext);
        }
        self
    }

    pub fn file_ext(&self) -> &str {
        &self.file_ext
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn data_file(&self) -> PathBuf {
        self.root.join(DATA_FILENAME)
    }

    fn note_filename(&self, id: &NoteId, ext: &str) -> String {
        format!("note-{}{}", id, ext)
    }

    /// Candidate content files, the configured extension first.
    fn note_paths(&self, id: &NoteId) -> Vec<PathBuf> {
        let mut paths = vec![self.root.join(self.note_filename(id, &self.file_ext))];
        if self.file_ext != DEFAULT_FILE_EXT {
            paths.push(self.root.join(self.note_filename(id, DEFAULT_FILE_EXT)));
        }
        paths
    }

    /// Content file for a note, falling back to the default extension for
    /// notes written before the extension was changed.
    fn find_note_file(&self, id: &NoteId) -> Option<PathBuf> {
        self.note_paths(id).into_iter().find(|path| path.exists())
    }

    fn remove_note_files(&self, paths: &[PathBuf]) -> Result<()> {
        for path in paths.iter().filter(|path| path.exists()) {
            fs::remove_file(path).map_err(NoteError::Io)?;
            debug!("removed {}", path.display());
        }
        Ok(())
    }

    fn ensure_dir(&self) -> Result<()> {
        if !self.root.exists() {
            fs::create_dir_all(&self.root).map_err(NoteError::Io)?;
        }
        Ok(())
    }

    fn seed(&self) -> Result<()> {
        let mut index = Index::new();
        for note in example_notes() {
            self.write_content(&note.id, &note.content)?;
            let (meta, _, tags) = note.into_parts();
            index.insert(meta.id.clone(), IndexEntry { meta, tags });
        }
        self.save_index(&index)?;
        info!("seeded note store at {}", self.root.display());
        Ok(())
    }

    fn load_index(&self) -> Result<Index> {
        let data_file = self.data_file();
        if !data_file.exists() {
            return Ok(Index::new());
        }
        let content = fs::read_to_string(data_file).map_err(NoteError::Io)?;
        let index: Index = serde_json::from_str(&content).map_err(NoteError::Serialization)?;
        Ok(index)
    }

    fn save_index(&self, index: &Index) -> Result<()> {
        let content = serde_json::to_string_pretty(index).map_err(NoteError::Serialization)?;
        fs::write(self.data_file(), content).map_err(NoteError::Io)?;
        Ok(())
    }

    fn read_content(&self, id: &NoteId) -> Result<String> {
        match self.find_note_file(id) {
            Some(path) => fs::read_to_string(path).map_err(NoteError::Io),
            None => Ok(String::new()),
        }
    }

    /// Writes under the configured extension and drops a stale copy left
    /// under the default one.
    fn write_content(&self, id: &NoteId, content: &str) -> Result<()> {
        let paths = self.note_paths(id);
        fs::write(&paths[0], content).map_err(NoteError::Io)?;
        self.remove_note_files(&paths[1..])
    }

    fn load_note(&self, entry: IndexEntry) -> Result<Note> {
        let content = self.read_content(&entry.meta.id)?;
        Ok(Note::from_parts(entry.meta, content, entry.tags))
    }

    fn store_note(&self, index: &mut Index, note: &Note) -> Result<()> {
        // Index first so a note never exists as a bare content file.
        let (meta, _, tags) = note.clone().into_parts();
        index.insert(meta.id.clone(), IndexEntry { meta, tags });
        self.save_index(index)?;
        self.write_content(&note.id, &note.content)
    }
}

impl NoteStore for FileStore {
    fn fetch_all(&self, search: Option<&str>) -> Result<Vec<Note>> {
        let index = self.load_index()?;
        let mut notes = Vec::with_capacity(index.len());
        for entry in index.into_values() {
            let note = self.load_note(entry)?;
            if matches_search(&note, search) {
                notes.push(note);
            }
        }
        sort_recent(&mut notes);
        Ok(notes)
    }

    fn fetch_by_id(&self, id: &NoteId) -> Result<Option<Note>> {
        let mut index = self.load_index()?;
        match index.remove(id) {
            Some(entry) => self.load_note(entry).map(Some),
            None => Ok(None),
        }
    }

    fn fetch_meta(&self, id: &NoteId) -> Result<Option<NoteMeta>> {
        let mut index = self.load_index()?;
        Ok(index.remove(id).map(|entry| entry.meta))
    }

    fn create(&mut self, data: NoteData) -> Result<Note> {
        self.ensure_dir()?;
        let mut index = self.load_index()?;
        let id = fresh_id(|id| index.contains_key(id));
        let note = Note::from_data(id, data);
        self.store_note(&mut index, &note)?;
        info!("created note {}", note.id);
        Ok(note)
    }

    fn update(&mut self, id: &NoteId, data: NoteData) -> Result<Note> {
        let mut index = self.load_index()?;
        let created_at = index
            .get(id)
            .map(|entry| entry.meta.created_at)
            .ok_or_else(|| NoteError::NotFound(id.to_string()))?;

        let mut note = Note::from_data(id.clone(), data);
        note.created_at = created_at;
        note.updated_at = Utc::now();
        self.store_note(&mut index, &note)?;
        info!("updated note {}", id);
        Ok(note)
    }

    fn delete(&mut self, id: &NoteId) -> Result<bool> {
        if id.is_reserved() {
            debug!("refusing to delete example note {}", id);
            return Ok(false);
        }
        let mut index = self.load_index()?;
        if index.remove(id).is_none() {
            return Ok(false);
        }
        self.save_index(&index)?;
        self.remove_note_files(&self.note_paths(id))?;
        info!("deleted note {}", id);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FEATURE_SHOWCASE_ID, WELCOME_NOTE_ID};
    use crate::password::PasswordDigest;
    use tempfile::TempDir;

    fn open() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("notes")).unwrap();
        (dir, store)
    }

    #[test]
    fn open_seeds_example_notes_once() {
        let (dir, mut store) = open();
        assert_eq!(store.fetch_all(None).unwrap().len(), 2);
        assert!(store
            .root()
            .join(format!("note-{}.md", WELCOME_NOTE_ID))
            .exists());

        let note = store.create(NoteData::new("Mine", "x")).unwrap();
        let reopened = FileStore::open(dir.path().join("notes")).unwrap();
        assert_eq!(reopened.fetch_all(None).unwrap().len(), 3);
        assert!(reopened.fetch_by_id(&note.id).unwrap().is_some());
    }

    #[test]
    fn notes_round_trip_through_disk() {
        let (_dir, mut store) = open();
        let data = NoteData::new("Groceries", "- eggs\n- milk").with_tags(vec!["home".into()]);
        let created = store.create(data).unwrap();

        let loaded = store.fetch_by_id(&created.id).unwrap().unwrap();
        assert_eq!(loaded, created);
        assert!(store
            .root()
            .join(format!("note-{}.md", created.id))
            .exists());
    }

    #[test]
    fn index_holds_the_digest_not_the_password() {
        let (_dir, mut store) = open();
        let data = NoteData::new("Diary", "dear diary")
            .with_privacy(Some(PasswordDigest::create("hunter22")));
        let created = store.create(data).unwrap();

        let raw = fs::read_to_string(store.root().join(DATA_FILENAME)).unwrap();
        assert!(!raw.contains("hunter22"));
        assert!(!raw.contains("dear diary"));

        let meta = store.fetch_meta(&created.id).unwrap().unwrap();
        assert!(meta.password.unwrap().verify("hunter22"));
    }

    #[test]
    fn update_refreshes_and_requires_existing_note() {
        let (_dir, mut store) = open();
        let created = store.create(NoteData::new("A", "one")).unwrap();
        let updated = store.update(&created.id, NoteData::new("B", "two")).unwrap();
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(store.fetch_by_id(&created.id).unwrap().unwrap().title, "B");

        assert!(matches!(
            store.update(&NoteId::new("nope"), NoteData::new("C", "")),
            Err(NoteError::NotFound(_))
        ));
    }

    #[test]
    fn delete_removes_files_but_not_examples() {
        let (_dir, mut store) = open();
        let created = store.create(NoteData::new("Temp", "bye")).unwrap();
        let path = store.root().join(format!("note-{}.md", created.id));
        assert!(store.delete(&created.id).unwrap());
        assert!(!path.exists());
        assert!(store.fetch_by_id(&created.id).unwrap().is_none());

        assert!(!store.delete(&NoteId::from(FEATURE_SHOWCASE_ID)).unwrap());
        assert!(store
            .fetch_by_id(&NoteId::from(FEATURE_SHOWCASE_ID))
            .unwrap()
            .is_some());
    }

    #[test]
    fn custom_extension_with_fallback() {
        let (dir, mut store) = open();
        let created = store.create(NoteData::new("Old", "legacy")).unwrap();

        let txt_store = FileStore::open(dir.path().join("notes"))
            .unwrap()
            .with_file_ext("txt");
        assert_eq!(txt_store.file_ext(), ".txt");
        let loaded = txt_store.fetch_by_id(&created.id).unwrap().unwrap();
        assert_eq!(loaded.content, "legacy");
    }

    #[test]
    fn changed_extension_leaves_one_content_file() {
        let (dir, mut store) = open();
        let created = store.create(NoteData::new("Old", "legacy")).unwrap();
        let md = store.root().join(format!("note-{}.md", created.id));
        let txt = store.root().join(format!("note-{}.txt", created.id));
        assert!(md.exists());

        let mut txt_store = FileStore::open(dir.path().join("notes"))
            .unwrap()
            .with_file_ext("txt");
        txt_store
            .update(&created.id, NoteData::new("Old", "rewritten"))
            .unwrap();
        assert!(txt.exists());
        assert!(!md.exists());
        assert_eq!(
            txt_store.fetch_by_id(&created.id).unwrap().unwrap().content,
            "rewritten"
        );

        assert!(txt_store.delete(&created.id).unwrap());
        assert!(!txt.exists());
        assert!(!md.exists());
    }

    #[test]
    fn delete_removes_copies_under_both_extensions() {
        let (dir, mut store) = open();
        let created = store.create(NoteData::new("Twin", "one")).unwrap();
        let txt = store.root().join(format!("note-{}.txt", created.id));
        fs::write(&txt, "two").unwrap();

        let mut txt_store = FileStore::open(dir.path().join("notes"))
            .unwrap()
            .with_file_ext("txt");
        assert!(txt_store.delete(&created.id).unwrap());
        assert!(!txt.exists());
        assert!(!store.root().join(format!("note-{}.md", created.id)).exists());
    }

    #[test]
    fn search_reads_content() {
        let (_dir, mut store) = open();
        store.create(NoteData::new("Plain", "needle here")).unwrap();
        let found = store.fetch_all(Some("NEEDLE")).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Plain");
    }
}
