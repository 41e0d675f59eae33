//! Error types for hush-core

use thiserror::Error;

/// Result type alias using hush-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in hush-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Network unreachable, timeout, or a body that could not be read
    #[error("Network error: {0}")]
    Transport(String),

    /// Non-success status with a structured `error`/`message` body
    #[error("{status} {status_text}: {detail}")]
    ServerRejected {
        status: u16,
        status_text: String,
        detail: String,
    },

    /// 404 with a structured body
    #[error("404 {status_text}: {detail}")]
    NotFound { status_text: String, detail: String },

    /// Non-success status with a body that carries no usable error field
    #[error("{status} {status_text}{}", format_snippet(.snippet))]
    ServerOpaque {
        status: u16,
        status_text: String,
        snippet: String,
    },

    /// The external image URL could not be fetched
    #[error("Failed to fetch image from source URL: {0}")]
    SourceFetchFailed(String),

    /// A write succeeded but its response did not carry a note
    #[error("Server accepted the write but returned no note")]
    MissingNote,

    /// Passphrase shorter than the minimum key length
    #[error("Passphrase must be at least {min} characters")]
    KeyTooShort { min: usize },

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// HTTP status carried by server-side failures.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::ServerRejected { status, .. } | Self::ServerOpaque { status, .. } => {
                Some(*status)
            }
            Self::NotFound { .. } => Some(404),
            _ => None,
        }
    }

    /// Whether the server reported the resource as absent.
    pub const fn is_not_found(&self) -> bool {
        matches!(self.status(), Some(404))
    }
}

fn format_snippet(snippet: &str) -> String {
    if snippet.is_empty() {
        String::new()
    } else {
        format!(": {snippet}")
    }
}
