//! In-memory notes server used by unit tests.
//!
//! Simulates the REST surface for `/notes/{key}` and `/notes/{key}/image`,
//! records every request, and lets tests script one-off responses or
//! network failures ahead of the simulation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Method, StatusCode};
use serde_json::json;

use super::{ApiClient, HttpRequest, HttpResponse, HttpTransport, RequestBody};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::models::Note;

pub const BASE_URL: &str = "http://notes.test";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path relative to [`BASE_URL`], or the full URL for external requests.
    pub path: String,
    pub body: RequestBody,
}

impl RecordedRequest {
    pub fn json_message(&self) -> Option<String> {
        match &self.body {
            RequestBody::Json(value) => value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Respond {
        status: u16,
        content_type: Option<String>,
        body: Vec<u8>,
    },
    NetworkError,
}

impl Scripted {
    pub fn json(status: u16, body: &serde_json::Value) -> Self {
        Self::Respond {
            status,
            content_type: Some("application/json".to_string()),
            body: body.to_string().into_bytes(),
        }
    }

    pub fn text(status: u16, body: &str) -> Self {
        Self::Respond {
            status,
            content_type: Some("text/plain".to_string()),
            body: body.as_bytes().to_vec(),
        }
    }
}

#[derive(Debug)]
struct Rule {
    method: Method,
    path: String,
    response: Scripted,
    remaining: Option<usize>,
}

#[derive(Debug, Default)]
struct StoredImage {
    id: String,
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

#[derive(Debug, Default)]
struct State {
    notes: HashMap<String, Note>,
    images: HashMap<String, StoredImage>,
    external: HashMap<String, Scripted>,
    rules: Vec<Rule>,
    requests: Vec<RecordedRequest>,
    latency: Option<Duration>,
    path_latency: HashMap<String, Duration>,
    tick: i64,
}

#[derive(Debug, Clone, Default)]
pub struct FakeNotesServer {
    state: Arc<Mutex<State>>,
}

impl FakeNotesServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// An [`ApiClient`] that talks to this server.
    pub fn client(&self) -> ApiClient<Self> {
        let config = ClientConfig::new(BASE_URL).expect("fake base URL is valid");
        ApiClient::new(&config, self.clone())
    }

    /// Answers `times` requests (or every request when `None`) matching
    /// `method` and `path` with `response` instead of simulating them.
    pub fn script(&self, method: Method, path: &str, response: Scripted, times: Option<usize>) {
        self.lock().rules.push(Rule {
            method,
            path: path.to_string(),
            response,
            remaining: times,
        });
    }

    pub fn serve_external(&self, url: &str, response: Scripted) {
        self.lock().external.insert(url.to_string(), response);
    }

    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// Delays requests to `path` only, overriding the global latency.
    pub fn set_path_latency(&self, path: &str, latency: Duration) {
        self.lock().path_latency.insert(path.to_string(), latency);
    }

    pub fn seed_note(&self, key: &str, message: &str) -> Note {
        let mut state = self.lock();
        let now = state.next_timestamp();
        let note = Note {
            id: format!("note-{}", state.notes.len() + 1),
            message: message.to_string(),
            has_image: false,
            created: now,
            updated: now,
        };
        state.notes.insert(key.to_string(), note.clone());
        note
    }

    pub fn seed_image(&self, key: &str, content_type: &str, bytes: &[u8]) {
        let mut state = self.lock();
        state.images.insert(
            key.to_string(),
            StoredImage {
                id: "img-seeded".to_string(),
                file_name: "seeded".to_string(),
                content_type: content_type.to_string(),
                bytes: bytes.to_vec(),
            },
        );
        if let Some(note) = state.notes.get_mut(key) {
            note.has_image = true;
        }
    }

    pub fn note(&self, key: &str) -> Option<Note> {
        self.lock().notes.get(key).cloned()
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.lock().requests.clone()
    }

    pub fn count(&self, method: &Method) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|request| &request.method == method)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl HttpTransport for FakeNotesServer {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let latency = {
            let state = self.lock();
            let path = request.url.strip_prefix(BASE_URL).unwrap_or(&request.url);
            state.path_latency.get(path).copied().or(state.latency)
        };
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let mut state = self.lock();
        let path = request
            .url
            .strip_prefix(BASE_URL)
            .map_or_else(|| request.url.clone(), ToString::to_string);
        state.requests.push(RecordedRequest {
            method: request.method.clone(),
            path: path.clone(),
            body: request.body.clone(),
        });

        if let Some(scripted) = state.take_rule(&request.method, &path) {
            return scripted.into_response();
        }

        if !request.url.starts_with(BASE_URL) {
            return state
                .external
                .get(&request.url)
                .cloned()
                .unwrap_or(Scripted::NetworkError)
                .into_response();
        }

        state.simulate(&request.method, &path, request.body)
    }
}

impl Scripted {
    fn into_response(self) -> Result<HttpResponse> {
        match self {
            Self::Respond {
                status,
                content_type,
                body,
            } => Ok(HttpResponse {
                status: StatusCode::from_u16(status).expect("scripted status is valid"),
                content_type,
                body,
            }),
            Self::NetworkError => Err(Error::Transport(
                "Request failed: connection refused".to_string(),
            )),
        }
    }
}

impl State {
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        self.tick += 1;
        DateTime::from_timestamp(1_780_000_000 + self.tick, 0).expect("timestamp in range")
    }

    fn take_rule(&mut self, method: &Method, path: &str) -> Option<Scripted> {
        let index = self
            .rules
            .iter()
            .position(|rule| &rule.method == method && rule.path == path)?;
        let rule = &mut self.rules[index];
        let response = rule.response.clone();
        if let Some(remaining) = rule.remaining.as_mut() {
            *remaining -= 1;
            if *remaining == 0 {
                self.rules.remove(index);
            }
        }
        Some(response)
    }

    fn simulate(&mut self, method: &Method, path: &str, body: RequestBody) -> Result<HttpResponse> {
        let segments = path.trim_start_matches('/').split('/').collect::<Vec<_>>();
        let response = match segments.as_slice() {
            ["notes", key] => {
                let key = urlencoding::decode(key).expect("key is valid UTF-8");
                self.handle_note(method, &key, &body)
            }
            ["notes", key, "image"] => {
                let key = urlencoding::decode(key).expect("key is valid UTF-8");
                self.handle_image(method, &key, body)
            }
            _ => Scripted::json(404, &json!({ "error": "route not found" })),
        };
        response.into_response()
    }

    fn handle_note(&mut self, method: &Method, key: &str, body: &RequestBody) -> Scripted {
        let message = match body {
            RequestBody::Json(value) => value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(ToString::to_string),
            _ => None,
        };
        let exists = self.notes.contains_key(key);

        match (method.as_str(), exists) {
            ("GET", true) => Scripted::json(200, &note_json(&self.notes[key])),
            ("GET" | "PATCH", false) => {
                Scripted::json(404, &json!({ "error": "note not found" }))
            }
            ("POST", true) => Scripted::json(409, &json!({ "error": "note already exists" })),
            ("POST" | "PUT" | "PATCH", _) => {
                let Some(message) = message else {
                    return Scripted::json(400, &json!({ "error": "message is required" }));
                };
                let now = self.next_timestamp();
                let count = self.notes.len();
                let note = self
                    .notes
                    .entry(key.to_string())
                    .and_modify(|note| {
                        note.message.clone_from(&message);
                        note.updated = now;
                    })
                    .or_insert_with(|| Note {
                        id: format!("note-{}", count + 1),
                        message: message.clone(),
                        has_image: false,
                        created: now,
                        updated: now,
                    });
                let status = if exists { 200 } else { 201 };
                Scripted::json(status, &note_json(note))
            }
            _ => Scripted::json(405, &json!({ "error": "method not allowed" })),
        }
    }

    fn handle_image(&mut self, method: &Method, key: &str, body: RequestBody) -> Scripted {
        if !self.notes.contains_key(key) {
            return Scripted::text(404, "Not Found");
        }

        match method.as_str() {
            "GET" => match self.images.get(key) {
                Some(image) => Scripted::Respond {
                    status: 200,
                    content_type: Some(image.content_type.clone()),
                    body: image.bytes.clone(),
                },
                None => Scripted::text(404, "Not Found"),
            },
            "POST" => {
                let RequestBody::Multipart(file) = body else {
                    return Scripted::json(400, &json!({ "error": "multipart body required" }));
                };
                if file.field_name != "image" {
                    return Scripted::json(400, &json!({ "error": "no image field" }));
                }
                let now = self.next_timestamp();
                let image = StoredImage {
                    id: format!("img-{}", self.tick),
                    file_name: file.file_name,
                    content_type: file.content_type,
                    bytes: file.bytes,
                };
                let payload = json!({
                    "id": image.id,
                    "fileName": image.file_name,
                    "contentType": image.content_type,
                    "created": now.to_rfc3339(),
                });
                self.images.insert(key.to_string(), image);
                if let Some(note) = self.notes.get_mut(key) {
                    note.has_image = true;
                }
                Scripted::json(201, &payload)
            }
            "DELETE" => {
                if self.images.remove(key).is_none() {
                    return Scripted::json(404, &json!({ "error": "image not found" }));
                }
                if let Some(note) = self.notes.get_mut(key) {
                    note.has_image = false;
                }
                Scripted::json(200, &json!({ "message": "image deleted" }))
            }
            _ => Scripted::json(405, &json!({ "error": "method not allowed" })),
        }
    }
}

fn note_json(note: &Note) -> serde_json::Value {
    serde_json::to_value(note).expect("note serializes")
}
