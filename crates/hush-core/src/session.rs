//! The note currently open in a client session.
//!
//! Resolutions may overlap when the passphrase changes while a previous
//! lookup is still in flight. Each resolution takes a generation ticket and
//! is applied only if no newer resolution has started since.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::mpsc;

use crate::autosave::{AutosaveCoordinator, AutosaveEvent};
use crate::error::Result;
use crate::key::NoteKey;
use crate::models::Note;
use crate::resolver::NoteResolver;
use crate::transport::HttpTransport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedNote {
    pub key: NoteKey,
    pub note: Note,
}

/// Outcome of a generation-tagged resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Current(Note),
    /// A newer resolution started before this one finished; its result was dropped.
    Superseded,
}

pub struct NoteSession<T> {
    resolver: NoteResolver<T>,
    generation: AtomicU64,
    current: Mutex<Option<LoadedNote>>,
}

impl<T: HttpTransport> NoteSession<T> {
    pub const fn new(resolver: NoteResolver<T>) -> Self {
        Self {
            resolver,
            generation: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    pub const fn resolver(&self) -> &NoteResolver<T> {
        &self.resolver
    }

    pub fn current(&self) -> Option<LoadedNote> {
        self.lock().clone()
    }

    /// Normalizes and validates `passphrase`, then resolves its note.
    ///
    /// A rejected passphrase still supersedes earlier opens and closes the
    /// current note.
    pub async fn open(&self, passphrase: &str) -> Result<Resolution> {
        let key = NoteKey::normalize(passphrase);
        if let Err(error) = key.validate() {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *self.lock() = None;
            return Err(error);
        }
        self.resolve(key, true).await
    }

    /// Re-reads the open note, e.g. after its image changed.
    ///
    /// Never writes: a failed read is returned rather than recreating the
    /// note. Returns `Superseded` when no note is open.
    pub async fn refresh(&self) -> Result<Resolution> {
        let Some(loaded) = self.current() else {
            return Ok(Resolution::Superseded);
        };
        self.resolve(loaded.key, false).await
    }

    /// Replaces the open note with a newer copy of the same note.
    pub fn apply(&self, note: Note) -> bool {
        let mut current = self.lock();
        match current.as_mut() {
            Some(loaded) if loaded.note.id == note.id => {
                loaded.note = note;
                true
            }
            _ => false,
        }
    }

    /// Starts autosave for the open note.
    pub fn autosave(
        &self,
        debounce: Duration,
    ) -> Option<(
        AutosaveCoordinator<T>,
        mpsc::UnboundedReceiver<AutosaveEvent>,
    )> {
        let loaded = self.current()?;
        Some(AutosaveCoordinator::new(
            self.resolver.clone(),
            loaded.key,
            Some(loaded.note),
            debounce,
        ))
    }

    async fn resolve(&self, key: NoteKey, create_missing: bool) -> Result<Resolution> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let result = if create_missing {
            self.resolver.get_or_create(&key).await
        } else {
            self.resolver.read(&key).await
        };

        if self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!(ticket, "Discarding stale note resolution");
            return Ok(Resolution::Superseded);
        }

        let note = result?;
        *self.lock() = Some(LoadedNote {
            key,
            note: note.clone(),
        });
        Ok(Resolution::Current(note))
    }

    fn lock(&self) -> MutexGuard<'_, Option<LoadedNote>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
