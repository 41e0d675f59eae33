use chrono::{DateTime, Utc};
use hush_core::config::ClientConfig;
use hush_core::transport::{ApiClient, ReqwestTransport};
use hush_core::{Note, NoteKey};
use serde::Serialize;

use crate::error::CliError;

const PREVIEW_CHARS: usize = 60;

/// Resolved settings shared by every command.
pub struct Context {
    pub config: ClientConfig,
    pub json: bool,
}

impl Context {
    pub fn api(&self) -> Result<ApiClient<ReqwestTransport>, CliError> {
        Ok(ApiClient::from_config(&self.config)?)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteOutput {
    pub id: String,
    pub message: String,
    pub has_image: bool,
    pub created: String,
    pub updated: String,
}

impl From<&Note> for NoteOutput {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            message: note.message.clone(),
            has_image: note.has_image,
            created: note.created.to_rfc3339(),
            updated: note.updated.to_rfc3339(),
        }
    }
}

pub fn parse_key(passphrase: &str) -> Result<NoteKey, CliError> {
    let key = NoteKey::normalize(passphrase);
    key.validate()?;
    Ok(key)
}

pub fn resolve_message(parts: &[String]) -> Result<String, CliError> {
    normalize_message(&parts.join(" ")).ok_or(CliError::EmptyMessage)
}

pub fn normalize_message(message: &str) -> Option<String> {
    let message = message.trim();
    if message.is_empty() {
        None
    } else {
        Some(message.to_string())
    }
}

pub fn print_note(note: &Note, as_json: bool) -> Result<(), CliError> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(&NoteOutput::from(note))?);
    } else {
        for line in format_note_lines(note, Utc::now()) {
            println!("{line}");
        }
    }
    Ok(())
}

pub fn format_note_lines(note: &Note, now: DateTime<Utc>) -> Vec<String> {
    let mut lines = note.message.lines().map(ToString::to_string).collect::<Vec<_>>();
    lines.push(String::new());
    let image = if note.has_image { ", image attached" } else { "" };
    lines.push(format!(
        "-- {} (updated {}{image})",
        note.id,
        format_relative_time(note.updated, now)
    ));
    lines
}

pub fn note_summary(note: &Note) -> String {
    let preview = note.title_preview(PREVIEW_CHARS);
    if note.message.chars().count() > preview.chars().count() {
        format!("{preview}...")
    } else {
        preview
    }
}

pub fn format_relative_time(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(timestamp);

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_weeks() < 1 {
        format!("{}d ago", diff.num_days())
    } else if diff.num_days() < 365 {
        format!("{}w ago", diff.num_weeks())
    } else {
        format!("{}y ago", diff.num_days() / 365)
    }
}
