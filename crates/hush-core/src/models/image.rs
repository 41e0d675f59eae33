//! Image payloads exchanged with the notes API.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Raw image bytes and the content type they were served with.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBytes {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

impl fmt::Debug for ImageBytes {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ImageBytes")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Self-contained form of an image that a rendering surface can show directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayImage {
    /// `data:<content-type>;base64,<payload>`
    pub data_uri: String,
    pub content_type: String,
}

/// The server's description of a stored image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteImageResponse {
    #[serde(default)]
    pub message: String,
}
