//! # Editing Session
//!
//! An [`EditingSession`] is the one open note. It owns everything the editor
//! shows: the title, the [`NoteBody`] (document, selection and tags), the
//! privacy lock, list mode, toolbar state, save status and pending
//! notifications.
//!
//! ## Withholding
//!
//! The body is an `Option`. It is `None` exactly while the note is
//! `PrivateLocked`: a locked note's content and tags are never read from the
//! store, and locking drops them from memory. Every edit on a locked note
//! fails with [`NoteError::Locked`].
//!
//! ## Persistence
//!
//! Nothing is written on a timer. The store is called on an explicit save,
//! on every privacy change of a stored note, and when locking (so edits made
//! before locking are never lost).
//!
//! ## Errors
//!
//! Operations return `Result` and also queue a [`Notification`] for the
//! adapter to show. No error ends the session. After [`EditingSession::close`]
//! every operation is a silent no-op.

use chrono::Utc;
use log::{debug, info, warn};

use crate::document::markdown::{from_markdown, to_markdown};
use crate::document::{ActiveState, Document, Selection};
use crate::error::{NoteError, Result};
use crate::format::{FormatCommand, FormattingEngine};
use crate::lists::{end_of, ListController, ListMode};
use crate::lock::{LockState, PasswordPrompt, PrivacyLock, PromptKind};
use crate::messages::Notification;
use crate::model::{normalize_tags, Note, NoteData, NoteId};
use crate::save::{validate_title, DirtyTracker, SaveIndicator, SaveStatus, Snapshot};
use crate::store::NoteStore;

/// The parts of a note withheld while it is locked.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteBody {
    pub document: Document,
    pub selection: Selection,
    pub tags: Vec<String>,
}

impl NoteBody {
    fn from_note(note: &Note) -> Self {
        let document = from_markdown(&note.content);
        let selection = end_of(&document);
        Self {
            document,
            selection,
            tags: normalize_tags(note.tags.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(NoteId),
    Updated(NoteId),
    /// The session was already closed.
    Discarded,
}

#[derive(Debug, Default)]
pub struct EditingSession {
    id: Option<NoteId>,
    title: String,
    body: Option<NoteBody>,
    lock: PrivacyLock,
    formatting: FormattingEngine,
    lists: ListController,
    tracker: DirtyTracker,
    indicator: SaveIndicator,
    prompt: Option<PasswordPrompt>,
    notifications: Vec<Notification>,
    closed: bool,
}

impl EditingSession {
    /// A blank, unsaved, public note.
    pub fn new_note() -> Self {
        Self {
            body: Some(NoteBody::default()),
            ..Self::default()
        }
    }

    /// Opens a stored note, or `None` if the id is unknown.
    ///
    /// Private notes open locked and their content is not read at all.
    pub fn open<S: NoteStore>(store: &S, id: &NoteId) -> Result<Option<Self>> {
        let meta = match store.fetch_meta(id)? {
            Some(meta) => meta,
            None => {
                debug!("note {} not found", id);
                return Ok(None);
            }
        };

        let mut session = Self {
            id: Some(meta.id.clone()),
            title: meta.title.clone(),
            lock: PrivacyLock::from_meta(meta.is_private, meta.password.clone()),
            ..Self::default()
        };

        if session.lock.is_locked() {
            debug!("note {} opened locked", id);
            session.prompt = Some(PasswordPrompt::new(PromptKind::Unlock));
            return Ok(Some(session));
        }

        let note = match store.fetch_by_id(id)? {
            Some(note) => note,
            None => return Ok(None),
        };
        session.load_body(&note);
        Ok(Some(session))
    }

    pub fn id(&self) -> Option<&NoteId> {
        self.id.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    pub fn is_locked(&self) -> bool {
        self.body.is_none()
    }

    /// The document, or `None` while locked.
    pub fn document(&self) -> Option<&Document> {
        self.body.as_ref().map(|body| &body.document)
    }

    pub fn selection(&self) -> Option<Selection> {
        self.body.as_ref().map(|body| body.selection)
    }

    /// Tags of the note; always empty while locked.
    pub fn tags(&self) -> &[String] {
        self.body.as_ref().map(|body| body.tags.as_slice()).unwrap_or(&[])
    }

    pub fn active(&self) -> &ActiveState {
        self.formatting.active()
    }

    pub fn list_mode(&self) -> ListMode {
        self.lists.mode()
    }

    pub fn prompt(&self) -> Option<&PasswordPrompt> {
        self.prompt.as_ref()
    }

    pub fn save_status(&self) -> SaveStatus {
        self.indicator.status()
    }

    pub fn save_indicator(&self) -> &SaveIndicator {
        &self.indicator
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Unsaved changes exist. Locked and blank notes are never dirty.
    pub fn is_dirty(&self) -> bool {
        self.snapshot()
            .map(|snapshot| self.tracker.is_dirty(&snapshot))
            .unwrap_or(false)
    }

    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Ends the session. Anything arriving afterwards is dropped.
    ///
    /// Closing over unsaved changes raises a warning.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        debug!("closing session for {:?}", self.id.as_ref().map(NoteId::as_str));
        if self.is_dirty() {
            self.notifications
                .push(Notification::warning("Unsaved changes discarded"));
        }
        self.closed = true;
        self.prompt = None;
    }

    // --- Editing ---

    pub fn set_title(&mut self, title: impl Into<String>) -> Result<()> {
        if self.discarded("set title") {
            return Ok(());
        }
        if self.body.is_none() {
            return self.report(Err(NoteError::Locked));
        }
        self.title = title.into();
        Ok(())
    }

    pub fn type_text(&mut self, text: &str) -> Result<()> {
        self.edit("type", |body, _, formatting| {
            body.selection = match formatting.take_pending(&body.document, &body.selection) {
                Some(formats) => body.document.insert_styled(&body.selection, text, &formats),
                None => body.document.insert_text(&body.selection, text),
            };
        })
    }

    /// The Enter key, with list continuation.
    pub fn enter(&mut self) -> Result<()> {
        self.edit("newline", |body, lists, _| {
            body.selection = lists.handle_newline(&mut body.document, &body.selection);
        })
    }

    pub fn delete_selection(&mut self) -> Result<()> {
        self.edit("delete", |body, _, _| {
            body.selection = body.document.delete_selection(&body.selection);
        })
    }

    pub fn select(&mut self, selection: Selection) -> Result<()> {
        self.edit("select", |body, _, _| {
            body.selection = body.document.clamp_selection(&selection);
        })
    }

    pub fn select_all(&mut self) -> Result<()> {
        self.edit("select all", |body, _, _| {
            body.selection = body.document.select_all();
        })
    }

    pub fn toggle_format(&mut self, command: FormatCommand) -> Result<()> {
        self.edit("format", |body, _, formatting| {
            body.selection = formatting.toggle(&mut body.document, &body.selection, command);
        })
    }

    pub fn toggle_bullet_list(&mut self) -> Result<()> {
        self.edit("bullet list", |body, lists, _| {
            body.selection = lists.toggle_bullet(&mut body.document, &body.selection);
        })
    }

    pub fn toggle_numbered_list(&mut self) -> Result<()> {
        self.edit("numbered list", |body, lists, _| {
            body.selection = lists.toggle_ordered(&mut body.document, &body.selection);
        })
    }

    /// Adds a tag; returns false if it was blank or already present.
    pub fn add_tag(&mut self, tag: &str) -> Result<bool> {
        let mut added = false;
        self.edit("add tag", |body, _, _| {
            let tag = tag.trim();
            if !tag.is_empty() && !body.tags.iter().any(|t| t == tag) {
                body.tags.push(tag.to_string());
                added = true;
            }
        })?;
        Ok(added)
    }

    pub fn remove_tag(&mut self, tag: &str) -> Result<bool> {
        let mut removed = false;
        self.edit("remove tag", |body, _, _| {
            let before = body.tags.len();
            body.tags.retain(|t| t != tag.trim());
            removed = body.tags.len() != before;
        })?;
        Ok(removed)
    }

    /// Backspace on an empty tag input removes the last tag.
    pub fn pop_tag(&mut self) -> Result<Option<String>> {
        let mut popped = None;
        self.edit("pop tag", |body, _, _| popped = body.tags.pop())?;
        Ok(popped)
    }

    // --- Saving ---

    pub fn save<S: NoteStore>(&mut self, store: &mut S) -> Result<SaveOutcome> {
        if self.discarded("save") {
            return Ok(SaveOutcome::Discarded);
        }
        let result = self.persist(store);
        match &result {
            Ok(_) => {
                self.indicator.set(SaveStatus::Saved, Utc::now());
                self.notifications
                    .push(Notification::success("Note saved successfully"));
            }
            Err(NoteError::Locked) => {}
            Err(_) => self.indicator.set(SaveStatus::Error, Utc::now()),
        }
        self.report(result)
    }

    /// Writes the in-memory note. Validation failures never reach the store.
    fn persist<S: NoteStore>(&mut self, store: &mut S) -> Result<SaveOutcome> {
        let body = self.body.as_ref().ok_or(NoteError::Locked)?;
        let title = validate_title(&self.title)?;
        let data = self.note_data(title.clone(), body);

        self.indicator.set(SaveStatus::Saving, Utc::now());
        let outcome = match &self.id {
            Some(id) => SaveOutcome::Updated(store.update(id, data)?.id),
            None => {
                let note = store.create(data)?;
                info!("created note {}", note.id);
                SaveOutcome::Created(note.id)
            }
        };

        if let SaveOutcome::Created(id) | SaveOutcome::Updated(id) = &outcome {
            self.id = Some(id.clone());
        }
        self.title = title;
        if let Some(snapshot) = self.snapshot() {
            self.tracker.mark_saved(snapshot);
        }
        Ok(outcome)
    }

    fn note_data(&self, title: String, body: &NoteBody) -> NoteData {
        NoteData::new(title, to_markdown(&body.document))
            .with_tags(body.tags.clone())
            .with_privacy(self.lock.password().cloned())
    }

    fn snapshot(&self) -> Option<Snapshot> {
        self.body.as_ref().map(|body| Snapshot {
            title: self.title.clone(),
            content: to_markdown(&body.document),
            tags: body.tags.clone(),
            is_private: self.lock.is_private(),
        })
    }

    fn load_body(&mut self, note: &Note) {
        let body = NoteBody::from_note(note);
        self.formatting.refresh(&body.document, &body.selection);
        self.tracker.mark_saved(Snapshot {
            title: note.title.clone(),
            content: to_markdown(&body.document),
            tags: body.tags.clone(),
            is_private: note.is_private,
        });
        self.body = Some(body);
    }

    // --- Privacy ---

    /// Opens the set-password dialog.
    pub fn open_private_prompt(&mut self) -> Result<()> {
        if self.discarded("private prompt") {
            return Ok(());
        }
        if self.lock.state() != LockState::Public {
            let err = NoteError::InvalidTransition {
                state: self.lock.state(),
                action: "make private",
            };
            return self.report(Err(err));
        }
        self.prompt = Some(PasswordPrompt::new(PromptKind::SetPrivate));
        Ok(())
    }

    /// Fills in the open dialog.
    pub fn set_prompt_input(&mut self, input: &str, confirm: &str) {
        if let Some(prompt) = self.prompt.as_mut() {
            prompt.input = input.to_string();
            prompt.confirm = confirm.to_string();
            prompt.error = None;
        }
    }

    /// Closes the dialog. A note locked for making it public stays locked.
    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
    }

    /// Submits the open dialog with what was typed into it.
    pub fn submit_prompt<S: NoteStore>(&mut self, store: &mut S) -> Result<()> {
        if self.discarded("submit prompt") {
            return Ok(());
        }
        let prompt = match &self.prompt {
            Some(prompt) => prompt.clone(),
            None => return self.report(Err(NoteError::validation("No password prompt is open"))),
        };
        match prompt.kind {
            PromptKind::SetPrivate => self.set_private(store, &prompt.input, &prompt.confirm),
            PromptKind::Unlock => self.unlock(store, &prompt.input),
            PromptKind::MakePublic => self.make_public(store, &prompt.input),
        }
    }

    /// Makes the note private; a stored note is updated right away.
    pub fn set_private<S: NoteStore>(
        &mut self,
        store: &mut S,
        password: &str,
        confirm: &str,
    ) -> Result<()> {
        if self.discarded("set private") {
            return Ok(());
        }
        let result = self.try_set_private(store, password, confirm);
        if let (Err(err), Some(prompt)) = (&result, self.prompt.as_mut()) {
            prompt.fail(err);
        }
        self.report(result)
    }

    fn try_set_private<S: NoteStore>(
        &mut self,
        store: &mut S,
        password: &str,
        confirm: &str,
    ) -> Result<()> {
        let digest = self.lock.begin_set_private(password, confirm)?;
        if let Some(id) = &self.id {
            let stored = store
                .fetch_by_id(id)?
                .ok_or_else(|| NoteError::NotFound(id.to_string()))?;
            store.update(id, stored.data().with_privacy(Some(digest.clone())))?;
            self.tracker.mark_privacy_saved(true);
        }
        self.lock.commit_private(digest);
        self.prompt = None;
        debug!("note {:?} is now private", self.id.as_ref().map(NoteId::as_str));
        self.notifications
            .push(Notification::success("Note is now private and secured"));
        Ok(())
    }

    /// Saves pending edits, then drops content and tags from memory.
    pub fn lock<S: NoteStore>(&mut self, store: &mut S) -> Result<()> {
        if self.discarded("lock") {
            return Ok(());
        }
        let result = self.try_lock(store);
        self.report(result)
    }

    fn try_lock<S: NoteStore>(&mut self, store: &mut S) -> Result<()> {
        self.lock.check_lock()?;

        if self.validated_title_for_lock(store)? {
            if let Err(err) = self.persist(store) {
                warn!("failed to save before locking: {}", err);
                self.indicator.set(SaveStatus::Error, Utc::now());
                return Err(NoteError::Store(format!(
                    "Failed to save note before locking: {}",
                    err
                )));
            }
            self.indicator.set(SaveStatus::Saved, Utc::now());
        }

        self.body = None;
        self.lock.commit_lock();
        self.lists.exit();
        self.formatting.reset();
        debug!("note {:?} locked", self.id.as_ref().map(NoteId::as_str));
        Ok(())
    }

    /// Makes sure locking can save: an empty title falls back to the stored
    /// one. Returns whether there is anything to save.
    fn validated_title_for_lock<S: NoteStore>(&mut self, store: &S) -> Result<bool> {
        if !self.title.trim().is_empty() {
            return Ok(true);
        }
        let stored = match &self.id {
            Some(id) => store.fetch_meta(id)?.map(|meta| meta.title),
            None => None,
        };
        match stored {
            Some(title) => {
                self.title = title;
                Ok(true)
            }
            None => Err(NoteError::validation(
                "Please enter a title before locking this note",
            )),
        }
    }

    pub fn unlock<S: NoteStore>(&mut self, store: &S, attempt: &str) -> Result<()> {
        if self.discarded("unlock") {
            return Ok(());
        }
        let result = self.try_unlock(store, attempt);
        if let Err(err) = &result {
            self.prompt
                .get_or_insert_with(|| PasswordPrompt::new(PromptKind::Unlock))
                .fail(err);
        }
        self.report(result)
    }

    fn try_unlock<S: NoteStore>(&mut self, store: &S, attempt: &str) -> Result<()> {
        self.lock.check_unlock(attempt)?;
        let id = self
            .id
            .clone()
            .ok_or_else(|| NoteError::NotFound("unsaved note".to_string()))?;
        let note = store
            .fetch_by_id(&id)?
            .ok_or_else(|| NoteError::NotFound(id.to_string()))?;

        self.lock.commit_unlock();
        self.title = note.title.clone();
        self.load_body(&note);
        self.prompt = None;
        debug!("note {} unlocked", id);
        self.notifications.push(Notification::success("Note unlocked"));
        Ok(())
    }

    /// Locks a stored private note and asks for its password.
    pub fn request_make_public<S: NoteStore>(&mut self, store: &mut S) -> Result<()> {
        if self.discarded("request make public") {
            return Ok(());
        }
        let result = self.try_request_make_public(store);
        self.report(result)
    }

    fn try_request_make_public<S: NoteStore>(&mut self, store: &mut S) -> Result<()> {
        match self.lock.state() {
            LockState::Public => {
                return Err(NoteError::InvalidTransition {
                    state: LockState::Public,
                    action: "make public",
                })
            }
            LockState::PrivateUnlocked if self.id.is_some() => self.try_lock(store)?,
            _ => {}
        }
        self.prompt = Some(PasswordPrompt::new(PromptKind::MakePublic));
        self.notifications.push(Notification::info(
            "Please enter the password to make this note public",
        ));
        Ok(())
    }

    pub fn make_public<S: NoteStore>(&mut self, store: &mut S, attempt: &str) -> Result<()> {
        if self.discarded("make public") {
            return Ok(());
        }
        let result = self.try_make_public(store, attempt);
        if let Err(err) = &result {
            if let Some(prompt) = self.prompt.as_mut() {
                prompt.fail(err);
            }
        }
        self.report(result)
    }

    fn try_make_public<S: NoteStore>(&mut self, store: &mut S, attempt: &str) -> Result<()> {
        let via_prompt = matches!(
            self.prompt.as_ref().map(|p| p.kind),
            Some(PromptKind::MakePublic)
        );
        self.lock.check_make_public(attempt, via_prompt)?;

        if let Some(id) = self.id.clone() {
            let stored = store
                .fetch_by_id(&id)?
                .ok_or_else(|| NoteError::NotFound(id.to_string()))?;
            let updated = store.update(&id, stored.data().with_privacy(None))?;
            if self.body.is_none() {
                self.title = updated.title.clone();
                self.load_body(&updated);
            } else {
                self.tracker.mark_privacy_saved(false);
            }
        }

        self.lock.commit_public();
        self.prompt = None;
        debug!("note {:?} is now public", self.id.as_ref().map(NoteId::as_str));
        self.notifications.push(Notification::success("Note is now public"));
        Ok(())
    }

    // --- Plumbing ---

    fn discarded(&self, action: &str) -> bool {
        if self.closed {
            debug!("session closed, discarding {}", action);
        }
        self.closed
    }

    fn edit(
        &mut self,
        action: &str,
        apply: impl FnOnce(&mut NoteBody, &mut ListController, &mut FormattingEngine),
    ) -> Result<()> {
        if self.discarded(action) {
            return Ok(());
        }
        let result = match self.body.as_mut() {
            Some(body) => {
                apply(body, &mut self.lists, &mut self.formatting);
                self.formatting.refresh(&body.document, &body.selection);
                Ok(())
            }
            None => Err(NoteError::Locked),
        };
        self.report(result)
    }

    fn report<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!("{}", err);
            self.notifications.push(Notification::error(err.to_string()));
        }
        result
    }
}
