use crate::lock::LockState;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NoteError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Auth(String),

    #[error("Note not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Note is locked")]
    Locked,

    #[error("Cannot {action} while note is {state}")]
    InvalidTransition {
        state: LockState,
        action: &'static str,
    },

    #[error("Example note cannot be changed: {0}")]
    ReservedNote(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NoteError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

pub type Result<T> = std::result::Result<T, NoteError>;
