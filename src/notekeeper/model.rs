//! # Domain Model: Notes and Their Persisted Shape
//!
//! A [`Note`] is what the store hands back: identity, timestamps and the
//! user-facing fields. [`NoteData`] is what callers send in on create and
//! update. [`NoteMeta`] is a note without its content and tags, which is all
//! a locked private note is ever allowed to load.
//!
//! ## Identifiers
//!
//! Fresh notes get a v4 UUID rendered as a string. Two ids are reserved for
//! the example notes seeded into every store ([`WELCOME_NOTE_ID`] and
//! [`FEATURE_SHOWCASE_ID`]); they can never be deleted and are never minted
//! for new notes.
//!
//! ## Privacy Invariant
//!
//! `password` is `Some` exactly when `is_private` is true. [`NoteData::new`]
//! and [`NoteData::with_privacy`] keep the pair consistent; stores persist the
//! digest verbatim.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::password::PasswordDigest;

pub const WELCOME_NOTE_ID: &str = "welcome-note";
pub const FEATURE_SHOWCASE_ID: &str = "feature-showcase";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(String);

impl NoteId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for the example notes that ship with every store.
    pub fn is_reserved(&self) -> bool {
        is_reserved_id(&self.0)
    }
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NoteId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

pub fn is_reserved_id(id: &str) -> bool {
    id == WELCOME_NOTE_ID || id == FEATURE_SHOWCASE_ID
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub password: Option<PasswordDigest>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn from_data(id: NoteId, data: NoteData) -> Self {
        let now = Utc::now();
        Self {
            id,
            title: data.title,
            content: data.content,
            tags: data.tags,
            is_private: data.is_private,
            password: data.password,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn meta(&self) -> NoteMeta {
        NoteMeta {
            id: self.id.clone(),
            title: self.title.clone(),
            is_private: self.is_private,
            password: self.password.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn data(&self) -> NoteData {
        NoteData {
            title: self.title.clone(),
            content: self.content.clone(),
            tags: self.tags.clone(),
            is_private: self.is_private,
            password: self.password.clone(),
        }
    }

    /// Splits a stored note back into its metadata and body parts.
    pub fn into_parts(self) -> (NoteMeta, String, Vec<String>) {
        let meta = NoteMeta {
            id: self.id,
            title: self.title,
            is_private: self.is_private,
            password: self.password,
            created_at: self.created_at,
            updated_at: self.updated_at,
        };
        (meta, self.content, self.tags)
    }

    pub fn from_parts(meta: NoteMeta, content: String, tags: Vec<String>) -> Self {
        Self {
            id: meta.id,
            title: meta.title,
            content,
            tags,
            is_private: meta.is_private,
            password: meta.password,
            created_at: meta.created_at,
            updated_at: meta.updated_at,
        }
    }
}

/// Everything about a note except the parts a locked note must withhold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteMeta {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub password: Option<PasswordDigest>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NoteData {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_private: bool,
    pub password: Option<PasswordDigest>,
}

impl NoteData {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            ..Self::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = normalize_tags(tags);
        self
    }

    /// Sets privacy and password together so the pair can never disagree.
    pub fn with_privacy(mut self, password: Option<PasswordDigest>) -> Self {
        self.is_private = password.is_some();
        self.password = password;
        self
    }
}

/// Trims, drops empties and removes duplicates while keeping first-seen order.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let trimmed = tag.trim();
        if trimmed.is_empty() || out.iter().any(|t| t == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}
