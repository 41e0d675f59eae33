//! Note image operations.
//!
//! Images live beside the note at `/notes/{key}/image` and are never cached:
//! every fetch rebuilds the displayable form from the bytes on the wire.

use base64::prelude::{Engine as _, BASE64_STANDARD};
use reqwest::Method;
use url::Url;

use crate::error::{Error, Result};
use crate::key::NoteKey;
use crate::models::{DeleteImageResponse, DisplayImage, ImageBytes, UploadedImage};
use crate::resolver::note_path;
use crate::transport::{ApiClient, HttpTransport, MultipartFile, FALLBACK_CONTENT_TYPE};

/// Bytes fed to the base64 encoder per step.
pub const ENCODE_CHUNK_BYTES: usize = 32 * 1024;
/// Multipart field the notes API reads the upload from.
pub const IMAGE_FIELD_NAME: &str = "image";
/// File name used when the source URL has no usable path segment.
pub const FALLBACK_FILE_NAME: &str = "image";

pub struct ImageService<T> {
    api: ApiClient<T>,
}

impl<T> Clone for ImageService<T> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
        }
    }
}

impl<T: HttpTransport> ImageService<T> {
    pub const fn new(api: ApiClient<T>) -> Self {
        Self { api }
    }

    /// Downloads the note's image as raw bytes.
    pub async fn fetch_image_bytes(&self, key: &NoteKey) -> Result<ImageBytes> {
        self.api.request_binary(Method::GET, &image_path(key)).await
    }

    /// Downloads the note's image as a self-contained data URI.
    pub async fn fetch_image(&self, key: &NoteKey) -> Result<DisplayImage> {
        let image = self.fetch_image_bytes(key).await?;
        tracing::debug!(
            bytes = image.bytes.len(),
            content_type = %image.content_type,
            "Fetched note image"
        );
        Ok(DisplayImage {
            data_uri: encode_data_uri(&image.content_type, &image.bytes),
            content_type: image.content_type,
        })
    }

    /// Copies an image from `source_url` onto the note.
    pub async fn upload_from_url(&self, key: &NoteKey, source_url: &str) -> Result<UploadedImage> {
        let source = self
            .api
            .fetch_external(source_url)
            .await
            .map_err(|error| Error::SourceFetchFailed(error.to_string()))?;
        if !source.status.is_success() {
            return Err(Error::SourceFetchFailed(format!(
                "{} {}",
                source.status.as_u16(),
                source.status_text()
            )));
        }

        let file_name = file_name_from_url(source_url);
        let content_type = upload_content_type(source.content_type.as_deref(), &file_name);
        tracing::debug!(
            bytes = source.body.len(),
            %file_name,
            %content_type,
            "Uploading image from source URL"
        );

        let body = self
            .api
            .request_multipart(
                Method::POST,
                &image_path(key),
                MultipartFile {
                    field_name: IMAGE_FIELD_NAME.to_string(),
                    file_name,
                    content_type,
                    bytes: source.body,
                },
            )
            .await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Removes the note's image. Re-resolve the note to refresh `has_image`.
    pub async fn delete_image(&self, key: &NoteKey) -> Result<DeleteImageResponse> {
        let body = self
            .api
            .request_json(Method::DELETE, &image_path(key), None)
            .await?;
        Ok(serde_json::from_value(body)?)
    }
}

fn image_path(key: &NoteKey) -> String {
    format!("{}/image", note_path(key))
}

/// Builds `data:<content_type>;base64,<payload>`.
///
/// The input is consumed in [`ENCODE_CHUNK_BYTES`] steps; leftover bytes that
/// do not fill a 3-byte group are carried into the next step so the output
/// matches a single-pass encoding.
pub fn encode_data_uri(content_type: &str, bytes: &[u8]) -> String {
    let mut uri = String::with_capacity(content_type.len() + 13 + bytes.len().div_ceil(3) * 4);
    uri.push_str("data:");
    uri.push_str(content_type);
    uri.push_str(";base64,");

    let mut carry = Vec::with_capacity(ENCODE_CHUNK_BYTES + 2);
    for chunk in bytes.chunks(ENCODE_CHUNK_BYTES) {
        carry.extend_from_slice(chunk);
        let aligned = carry.len() - carry.len() % 3;
        BASE64_STANDARD.encode_string(&carry[..aligned], &mut uri);
        carry.drain(..aligned);
    }
    BASE64_STANDARD.encode_string(&carry, &mut uri);
    uri
}

/// Last path segment of `source_url`, without query string or fragment.
pub fn file_name_from_url(source_url: &str) -> String {
    let segment = Url::parse(source_url).map_or_else(
        |_| {
            source_url
                .split(|c| c == '?' || c == '#')
                .next()
                .and_then(|path| path.rsplit('/').next())
                .map(ToString::to_string)
        },
        |url| {
            url.path_segments()
                .and_then(|mut segments| segments.next_back())
                .map(ToString::to_string)
        },
    );

    segment
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_FILE_NAME.to_string())
}

fn upload_content_type(header: Option<&str>, file_name: &str) -> String {
    if let Some(content_type) = header.map(str::trim) {
        if !content_type.is_empty() && !content_type.eq_ignore_ascii_case(FALLBACK_CONTENT_TYPE) {
            return content_type.to_string();
        }
    }

    mime_guess::from_path(file_name)
        .first_raw()
        .unwrap_or(FALLBACK_CONTENT_TYPE)
        .to_string()
}
