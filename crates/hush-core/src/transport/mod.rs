//! Transport adapter for the notes API.
//!
//! Wraps a raw request/response primitive ([`HttpTransport`]) and turns its
//! responses into JSON values, binary payloads, or typed failures. Every
//! response body is read exactly once, whatever the status.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::ImageBytes;
use crate::util::compact_text;

mod http_client;

#[cfg(test)]
pub(crate) mod fake;

pub use http_client::ReqwestTransport;

/// Content type assumed when a binary response does not declare one.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// A single outgoing request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(MultipartFile),
}

/// One file field of a `multipart/form-data` body.
#[derive(Clone, PartialEq, Eq)]
pub struct MultipartFile {
    pub field_name: String,
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for MultipartFile {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("MultipartFile")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn status_text(&self) -> String {
        status_text(self.status)
    }
}

/// Request/response primitive the adapter is built on.
///
/// Implementations report network-level problems as [`Error::Transport`]
/// and return every HTTP response, successful or not, as [`HttpResponse`].
#[async_trait]
pub trait HttpTransport: Send + Sync + 'static {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// JSON/binary/multipart client rooted at the configured API base URL.
pub struct ApiClient<T> {
    base_url: String,
    transport: Arc<T>,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            base_url: self.base_url.clone(),
            transport: Arc::clone(&self.transport),
        }
    }
}

impl<T> fmt::Debug for ApiClient<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ApiClient<ReqwestTransport> {
    /// Builds a client backed by `reqwest`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        Ok(Self::new(config, ReqwestTransport::new(config)?))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn new(config: &ClientConfig, transport: T) -> Self {
        Self {
            base_url: config.api_base_url.clone(),
            transport: Arc::new(transport),
        }
    }

    /// Returns the base URL this client was configured with.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a request with an optional JSON body and decodes a JSON reply.
    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        json_body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value> {
        let body = json_body.map_or(RequestBody::Empty, RequestBody::Json);
        let response = self.send(method, path, body).await?;
        decode_json_response(&response)
    }

    /// Sends a request expecting raw bytes back.
    ///
    /// Binary endpoints do not carry structured errors, so a non-success
    /// status fails with status and status text only.
    pub async fn request_binary(&self, method: Method, path: &str) -> Result<ImageBytes> {
        let response = self.send(method, path, RequestBody::Empty).await?;
        if !response.status.is_success() {
            return Err(Error::ServerOpaque {
                status: response.status.as_u16(),
                status_text: response.status_text(),
                snippet: String::new(),
            });
        }
        Ok(ImageBytes {
            content_type: response
                .content_type
                .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
            bytes: response.body,
        })
    }

    /// Sends a single-file multipart form and decodes a JSON reply.
    pub async fn request_multipart(
        &self,
        method: Method,
        path: &str,
        file: MultipartFile,
    ) -> Result<serde_json::Value> {
        let response = self
            .send(method, path, RequestBody::Multipart(file))
            .await?;
        decode_json_response(&response)
    }

    /// GETs an absolute URL outside the notes API and returns the raw response.
    pub async fn fetch_external(&self, url: &str) -> Result<HttpResponse> {
        tracing::debug!("GET {url}");
        self.transport
            .send(HttpRequest {
                method: Method::GET,
                url: url.to_string(),
                body: RequestBody::Empty,
            })
            .await
    }

    async fn send(&self, method: Method, path: &str, body: RequestBody) -> Result<HttpResponse> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!("{method} {}", redact_path(path));
        let response = self.transport.send(HttpRequest { method, url, body }).await?;
        tracing::debug!(status = response.status.as_u16(), "response received");
        Ok(response)
    }
}

/// Decodes a buffered response into JSON, or a typed failure.
pub fn decode_json_response(response: &HttpResponse) -> Result<serde_json::Value> {
    if !response.status.is_success() {
        return Err(failure_from_body(response.status, &response.body));
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        tracing::trace!(
            status = response.status.as_u16(),
            "empty success body treated as {{}}"
        );
        return Ok(empty_object());
    }

    match serde_json::from_slice(&response.body) {
        Ok(value) => Ok(value),
        Err(error) => {
            tracing::warn!(
                status = response.status.as_u16(),
                "success body is not JSON, treating as {{}}: {error}"
            );
            Ok(empty_object())
        }
    }
}

/// Builds the failure for a non-success response body.
pub fn failure_from_body(status: StatusCode, body: &[u8]) -> Error {
    let text = String::from_utf8_lossy(body);
    let status_text = status_text(status);

    if let Some(detail) = structured_error_detail(&text) {
        if status == StatusCode::NOT_FOUND {
            return Error::NotFound {
                status_text,
                detail,
            };
        }
        return Error::ServerRejected {
            status: status.as_u16(),
            status_text,
            detail,
        };
    }

    Error::ServerOpaque {
        status: status.as_u16(),
        status_text,
        snippet: compact_text(&text),
    }
}

fn structured_error_detail(text: &str) -> Option<String> {
    let payload = serde_json::from_str::<serde_json::Value>(text).ok()?;
    ["error", "message"]
        .iter()
        .filter_map(|field| payload.get(field).and_then(serde_json::Value::as_str))
        .map(str::trim)
        .find(|detail| !detail.is_empty())
        .map(ToString::to_string)
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown Status")
        .to_string()
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

/// `/notes/<key>/image` -> `/notes/[REDACTED]/image`
fn redact_path(path: &str) -> String {
    let mut segments = path.split('/').collect::<Vec<_>>();
    if segments.len() > 2 && segments[1] == "notes" {
        segments[2] = "[REDACTED]";
    }
    segments.join("/")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status: StatusCode::from_u16(status).unwrap(),
            content_type: None,
            body: body.as_bytes().to_vec(),
        }
    }

    #[test]
    fn structured_error_surfaces_detail_with_status_prefix() {
        let error = decode_json_response(&response(400, r#"{"error":"message too long"}"#))
            .unwrap_err();
        assert_eq!(error.to_string(), "400 Bad Request: message too long");
    }

    #[test]
    fn message_field_is_used_when_error_is_absent() {
        let error =
            decode_json_response(&response(500, r#"{"message":"kv unavailable"}"#)).unwrap_err();
        assert!(error.to_string().contains("kv unavailable"));
    }

    #[test]
    fn not_found_with_structured_body_is_typed() {
        let error =
            decode_json_response(&response(404, r#"{"error":"note not found"}"#)).unwrap_err();
        assert!(matches!(error, Error::NotFound { .. }));
        assert!(error.to_string().contains("note not found"));
    }

    #[test]
    fn unstructured_failure_carries_truncated_snippet() {
        let body = format!("<html>{}</html>", "x".repeat(500));
        let error = decode_json_response(&response(502, &body)).unwrap_err();
        let Error::ServerOpaque {
            status, snippet, ..
        } = &error
        else {
            panic!("expected opaque failure, got {error:?}");
        };
        assert_eq!(*status, 502);
        assert_eq!(snippet.chars().count(), 200);
        assert!(body.starts_with(snippet.as_str()));
        assert!(error.to_string().starts_with("502 Bad Gateway: <html>xxx"));
    }

    #[test]
    fn json_without_error_fields_is_opaque() {
        let error = decode_json_response(&response(500, r#"{"code":17}"#)).unwrap_err();
        assert!(matches!(error, Error::ServerOpaque { .. }));
        assert!(error.to_string().contains(r#"{"code":17}"#));
    }

    #[test]
    fn empty_success_body_is_empty_object() {
        assert_eq!(decode_json_response(&response(204, "")).unwrap(), json!({}));
        assert_eq!(decode_json_response(&response(200, " \n")).unwrap(), json!({}));
    }

    #[test]
    fn non_json_success_body_is_tolerated() {
        assert_eq!(
            decode_json_response(&response(200, "OK")).unwrap(),
            json!({})
        );
    }

    #[test]
    fn json_success_body_is_returned() {
        assert_eq!(
            decode_json_response(&response(200, r#"{"message":"image deleted"}"#)).unwrap(),
            json!({ "message": "image deleted" })
        );
    }

    #[test]
    fn redact_path_hides_key_segment() {
        assert_eq!(redact_path("/notes/open%20sesame"), "/notes/[REDACTED]");
        assert_eq!(
            redact_path("/notes/open%20sesame/image"),
            "/notes/[REDACTED]/image"
        );
        assert_eq!(redact_path("/health"), "/health");
    }
}
