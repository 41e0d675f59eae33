//! Passphrase to lookup-key normalization.

use std::fmt;

use crate::error::{Error, Result};

/// Minimum number of characters a normalized passphrase must have.
pub const MIN_KEY_LENGTH: usize = 3;

/// A normalized passphrase used to address exactly one note.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct NoteKey(String);

impl NoteKey {
    /// Trims surrounding whitespace and keeps everything else as typed.
    ///
    /// Length is not checked here; callers must run [`NoteKey::validate`]
    /// before handing the key to the resolver.
    pub fn normalize(raw: &str) -> Self {
        Self(raw.trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key meets the minimum length (counted in characters).
    pub fn is_valid(&self) -> bool {
        self.0.chars().count() >= MIN_KEY_LENGTH
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(Error::KeyTooShort {
                min: MIN_KEY_LENGTH,
            })
        }
    }

    /// Percent-encoded form for embedding in a URL path.
    pub fn path_segment(&self) -> String {
        urlencoding::encode(&self.0).into_owned()
    }
}

// The key is the only secret in the system; keep it out of logs.
// Use `as_str` where the raw passphrase is needed.
impl fmt::Display for NoteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl fmt::Debug for NoteKey {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_tuple("NoteKey").field(&"[REDACTED]").finish()
    }
}
