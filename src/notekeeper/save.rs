//! Dirty tracking and the transient save status.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::error::{NoteError, Result};

pub const SAVED_VISIBLE_MS: i64 = 2_000;
pub const ERROR_VISIBLE_MS: i64 = 3_000;

/// The fields whose change makes a note dirty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Snapshot {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    pub is_private: bool,
}

impl Snapshot {
    fn is_blank(&self) -> bool {
        self.title.is_empty() && self.content.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct DirtyTracker {
    persisted: Option<Snapshot>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn persisted(snapshot: Snapshot) -> Self {
        Self {
            persisted: Some(snapshot),
        }
    }

    /// A blank note is never dirty, there is nothing to save.
    pub fn is_dirty(&self, current: &Snapshot) -> bool {
        if current.is_blank() {
            return false;
        }
        self.persisted.as_ref() != Some(current)
    }

    pub fn mark_saved(&mut self, snapshot: Snapshot) {
        self.persisted = Some(snapshot);
    }

    /// Records a privacy change the store already has.
    pub fn mark_privacy_saved(&mut self, is_private: bool) {
        if let Some(snapshot) = self.persisted.as_mut() {
            snapshot.is_private = is_private;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

impl fmt::Display for SaveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SaveStatus::Idle => "",
            SaveStatus::Saving => "Saving...",
            SaveStatus::Saved => "Saved",
            SaveStatus::Error => "Error saving",
        };
        f.write_str(label)
    }
}

/// Save status that falls back to idle on its own after a while.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveIndicator {
    status: SaveStatus,
    since: Option<DateTime<Utc>>,
}

impl SaveIndicator {
    pub fn set(&mut self, status: SaveStatus, now: DateTime<Utc>) {
        self.status = status;
        self.since = Some(now);
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> SaveStatus {
        let visible = match self.status {
            SaveStatus::Saved => Duration::milliseconds(SAVED_VISIBLE_MS),
            SaveStatus::Error => Duration::milliseconds(ERROR_VISIBLE_MS),
            other => return other,
        };
        match self.since {
            Some(since) if now - since < visible => self.status,
            _ => SaveStatus::Idle,
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status_at(Utc::now())
    }
}

/// Returns the trimmed title, or fails when nothing is left.
pub fn validate_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(NoteError::validation("Please enter a title for your note"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(title: &str, content: &str) -> Snapshot {
        Snapshot {
            title: title.into(),
            content: content.into(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn blank_notes_are_never_dirty() {
        let tracker = DirtyTracker::new();
        assert!(!tracker.is_dirty(&Snapshot::default()));
        let mut private_blank = Snapshot::default();
        private_blank.is_private = true;
        assert!(!tracker.is_dirty(&private_blank));
    }

    #[test]
    fn any_tracked_field_makes_a_note_dirty() {
        let base = snapshot("T", "body");
        let tracker = DirtyTracker::persisted(base.clone());
        assert!(!tracker.is_dirty(&base));

        let mut tagged = base.clone();
        tagged.tags.push("x".into());
        assert!(tracker.is_dirty(&tagged));

        let mut private = base.clone();
        private.is_private = true;
        assert!(tracker.is_dirty(&private));

        assert!(tracker.is_dirty(&snapshot("T2", "body")));
        assert!(DirtyTracker::new().is_dirty(&snapshot("", "only body")));
    }

    #[test]
    fn privacy_saves_update_the_snapshot() {
        let mut tracker = DirtyTracker::persisted(snapshot("T", "b"));
        let mut current = snapshot("T", "b");
        current.is_private = true;
        tracker.mark_privacy_saved(true);
        assert!(!tracker.is_dirty(&current));
    }

    #[test]
    fn indicator_reverts_after_its_window() {
        let start = Utc::now();
        let mut indicator = SaveIndicator::default();
        indicator.set(SaveStatus::Saved, start);
        assert_eq!(indicator.status_at(start + Duration::milliseconds(1_999)), SaveStatus::Saved);
        assert_eq!(indicator.status_at(start + Duration::milliseconds(2_000)), SaveStatus::Idle);

        indicator.set(SaveStatus::Error, start);
        assert_eq!(indicator.status_at(start + Duration::milliseconds(2_500)), SaveStatus::Error);
        assert_eq!(indicator.status_at(start + Duration::milliseconds(3_000)), SaveStatus::Idle);

        indicator.set(SaveStatus::Saving, start);
        assert_eq!(indicator.status_at(start + Duration::seconds(60)), SaveStatus::Saving);
    }

    #[test]
    fn titles_are_trimmed_and_required() {
        assert_eq!(validate_title("  Groceries ").unwrap(), "Groceries");
        assert!(matches!(validate_title("   "), Err(NoteError::Validation(_))));
        assert!(matches!(validate_title(""), Err(NoteError::Validation(_))));
    }
}
