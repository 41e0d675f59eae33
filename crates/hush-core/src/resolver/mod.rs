//! Note resolution over the notes API.
//!
//! `get_or_create` turns "the note may or may not exist" into exactly one
//! note: read it, and on any read failure establish it with an upsert,
//! falling back to a create. Write responses are trusted as-is; the server
//! does not guarantee read-after-write consistency for the same key.

use reqwest::Method;
use serde_json::json;

use crate::error::{Error, Result};
use crate::key::NoteKey;
use crate::models::Note;
use crate::transport::{ApiClient, HttpTransport};

/// Message written when a passphrase is used for the first time.
///
/// Never empty: the server rejects or mishandles an empty initial write.
pub const DEFAULT_MESSAGE: &str = "Write your secret note here...";

pub struct NoteResolver<T> {
    api: ApiClient<T>,
}

impl<T> Clone for NoteResolver<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
        }
    }
}

impl<T: HttpTransport> NoteResolver<T> {
    pub const fn new(api: ApiClient<T>) -> Self {
        Self { api }
    }

    pub const fn api(&self) -> &ApiClient<T> {
        &self.api
    }

    /// Fetches the note for `key`.
    pub async fn read(&self, key: &NoteKey) -> Result<Note> {
        let body = self.api.request_json(Method::GET, &note_path(key), None).await?;
        Note::from_response(body)?.ok_or(Error::MissingNote)
    }

    /// Creates the note; the server decides whether an existing note conflicts.
    pub async fn create(&self, key: &NoteKey, message: &str) -> Result<Note> {
        self.write(Method::POST, key, message)
            .await?
            .ok_or(Error::MissingNote)
    }

    /// Creates or replaces the note. The preferred write path.
    pub async fn upsert(&self, key: &NoteKey, message: &str) -> Result<Note> {
        self.write(Method::PUT, key, message)
            .await?
            .ok_or(Error::MissingNote)
    }

    /// Updates an existing note; fails with a not-found error otherwise.
    pub async fn patch(&self, key: &NoteKey, message: &str) -> Result<Note> {
        self.write(Method::PATCH, key, message)
            .await?
            .ok_or(Error::MissingNote)
    }

    /// Resolves `key` to exactly one note, creating it on first use.
    ///
    /// When every attempt fails, the most specific error wins: the create
    /// failure, then the upsert failure, then the read failure.
    pub async fn get_or_create(&self, key: &NoteKey) -> Result<Note> {
        let read_error = match self.read(key).await {
            Ok(note) => return Ok(note),
            Err(error) => error,
        };
        tracing::debug!("Note read failed, establishing it: {read_error}");

        let written = match self.write(Method::PUT, key, DEFAULT_MESSAGE).await {
            Ok(written) => written,
            Err(upsert_error) => {
                tracing::debug!("Upsert failed, falling back to create: {upsert_error}");
                match self.write(Method::POST, key, DEFAULT_MESSAGE).await {
                    Ok(written) => written,
                    Err(create_error) => {
                        tracing::warn!(
                            "Could not establish note (read: {read_error}; upsert: {upsert_error})"
                        );
                        return Err(create_error);
                    }
                }
            }
        };

        if let Some(note) = written {
            tracing::info!(note_id = %note.id, "Note established");
            return Ok(note);
        }

        tracing::warn!("Write succeeded without returning a note, reading it back");
        self.read(key).await
    }

    async fn write(&self, method: Method, key: &NoteKey, message: &str) -> Result<Option<Note>> {
        let body = self
            .api
            .request_json(method, &note_path(key), Some(json!({ "message": message })))
            .await?;
        Note::from_response(body)
    }
}

pub(crate) fn note_path(key: &NoteKey) -> String {
    format!("/notes/{}", key.path_segment())
}
