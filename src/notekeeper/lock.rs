//! # Privacy Lock
//!
//! A note is `Public`, `PrivateUnlocked` or `PrivateLocked`. While locked, the
//! session holds no content and no tags at all; they are fetched from the
//! store again on unlock.
//!
//! | From              | Action                          | To                |
//! |-------------------|---------------------------------|-------------------|
//! | `Public`          | set private (password, confirm) | `PrivateUnlocked` |
//! | `PrivateUnlocked` | lock                            | `PrivateLocked`   |
//! | `PrivateLocked`   | unlock (password)               | `PrivateUnlocked` |
//! | `PrivateUnlocked` | make public (password)          | `Public`          |
//! | `PrivateLocked`   | make public from its own prompt | `Public`          |
//!
//! Every transition is split in two: a `check_*` method that validates the
//! request without changing anything, and a `commit_*` method the session
//! calls once the store has accepted the change. A failed store call thus
//! never leaves the lock in a state the store does not agree with.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{NoteError, Result};
use crate::password::{validate_new_password, PasswordDigest};

pub const WRONG_PASSWORD: &str = "Incorrect password. Please try again.";
pub const EMPTY_PASSWORD: &str = "Please enter a password";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LockState {
    #[default]
    Public,
    PrivateUnlocked,
    PrivateLocked,
}

impl fmt::Display for LockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LockState::Public => "public",
            LockState::PrivateUnlocked => "private (unlocked)",
            LockState::PrivateLocked => "private (locked)",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrivacyLock {
    state: LockState,
    password: Option<PasswordDigest>,
}

impl PrivacyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial lock for a stored note: private notes always start locked.
    pub fn from_meta(is_private: bool, password: Option<PasswordDigest>) -> Self {
        match (is_private, password) {
            (true, Some(password)) => Self {
                state: LockState::PrivateLocked,
                password: Some(password),
            },
            _ => Self::default(),
        }
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn password(&self) -> Option<&PasswordDigest> {
        self.password.as_ref()
    }

    pub fn is_private(&self) -> bool {
        self.state != LockState::Public
    }

    pub fn is_locked(&self) -> bool {
        self.state == LockState::PrivateLocked
    }

    fn require(&self, expected: LockState, action: &'static str) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(NoteError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    fn verify(&self, attempt: &str) -> Result<()> {
        if attempt.is_empty() {
            return Err(NoteError::auth(EMPTY_PASSWORD));
        }
        match &self.password {
            Some(digest) if digest.verify(attempt) => Ok(()),
            _ => Err(NoteError::auth(WRONG_PASSWORD)),
        }
    }

    /// Validates a new password and returns the digest to persist.
    pub fn begin_set_private(&self, password: &str, confirm: &str) -> Result<PasswordDigest> {
        self.require(LockState::Public, "make private")?;
        validate_new_password(password, confirm)?;
        Ok(PasswordDigest::create(password))
    }

    pub fn commit_private(&mut self, digest: PasswordDigest) {
        self.password = Some(digest);
        self.state = LockState::PrivateUnlocked;
    }

    pub fn check_unlock(&self, attempt: &str) -> Result<()> {
        self.require(LockState::PrivateLocked, "unlock")?;
        self.verify(attempt)
    }

    pub fn commit_unlock(&mut self) {
        self.state = LockState::PrivateUnlocked;
    }

    /// Checks a make-public attempt.
    ///
    /// Allowed while unlocked, and while locked if the make-public prompt is
    /// what locked the note.
    pub fn check_make_public(&self, attempt: &str, via_prompt: bool) -> Result<()> {
        match self.state {
            LockState::PrivateUnlocked => {}
            LockState::PrivateLocked if via_prompt => {}
            state => {
                return Err(NoteError::InvalidTransition {
                    state,
                    action: "make public",
                })
            }
        }
        self.verify(attempt)
    }

    pub fn commit_public(&mut self) {
        self.password = None;
        self.state = LockState::Public;
    }

    pub fn check_lock(&self) -> Result<()> {
        self.require(LockState::PrivateUnlocked, "lock")
    }

    pub fn commit_lock(&mut self) {
        self.state = LockState::PrivateLocked;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    SetPrivate,
    Unlock,
    MakePublic,
}

/// The password dialog: what it asks for and what was typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPrompt {
    pub kind: PromptKind,
    pub input: String,
    pub confirm: String,
    pub error: Option<String>,
}

impl PasswordPrompt {
    pub fn new(kind: PromptKind) -> Self {
        Self {
            kind,
            input: String::new(),
            confirm: String::new(),
            error: None,
        }
    }

    /// Clears the attempt and shows the error.
    pub fn fail(&mut self, error: &NoteError) {
        self.input.clear();
        self.confirm.clear();
        self.error = Some(error.to_string());
    }

    pub fn message(&self) -> &'static str {
        match self.kind {
            PromptKind::SetPrivate => "Set a password to make this note private.",
            PromptKind::Unlock => "This note is locked. Enter the password to unlock it.",
            PromptKind::MakePublic => "Enter the password to make this note public.",
        }
    }
}
