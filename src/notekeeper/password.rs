//! Salted password digests for private notes.
//!
//! Passwords are never stored as typed. A digest is `sha256(salt || password)`
//! with a fresh random salt per note, persisted as `"{salt}${hex digest}"`.
//! Verification recomputes the digest and compares in constant time.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

use crate::error::{NoteError, Result};

pub const MIN_PASSWORD_LEN: usize = 4;

const SEPARATOR: char = '$';

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PasswordDigest {
    salt: String,
    hash: String,
}

impl PasswordDigest {
    pub fn create(password: &str) -> Self {
        let salt = Uuid::new_v4().simple().to_string();
        let hash = digest(&salt, password);
        Self { salt, hash }
    }

    pub fn verify(&self, attempt: &str) -> bool {
        let candidate = digest(&self.salt, attempt);
        constant_time_eq(candidate.as_bytes(), self.hash.as_bytes())
    }
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(..)")
    }
}

impl From<PasswordDigest> for String {
    fn from(value: PasswordDigest) -> Self {
        format!("{}{}{}", value.salt, SEPARATOR, value.hash)
    }
}

impl TryFrom<String> for PasswordDigest {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        let (salt, hash) = value
            .split_once(SEPARATOR)
            .ok_or_else(|| "malformed password digest".to_string())?;
        if salt.is_empty() || hash.len() != 64 || hex::decode(hash).is_err() {
            return Err("malformed password digest".to_string());
        }
        Ok(Self {
            salt: salt.to_string(),
            hash: hash.to_string(),
        })
    }
}

/// Checks a new password and its confirmation before a note is made private.
pub fn validate_new_password(password: &str, confirm: &str) -> Result<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(NoteError::validation(format!(
            "Password must be at least {} characters long",
            MIN_PASSWORD_LEN
        )));
    }
    if password != confirm {
        return Err(NoteError::validation("Passwords do not match"));
    }
    Ok(())
}
