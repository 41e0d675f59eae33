//! Note model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

/// The single note addressed by a passphrase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Server-assigned opaque identifier
    pub id: String,
    /// Plain text content, possibly empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    /// Whether an image is attached (server-derived)
    #[serde(default)]
    pub has_image: bool,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
}

impl Note {
    /// Decodes a write/read response body.
    ///
    /// A body that is not an object, or an empty object, means the server
    /// sent no note back and yields `None`; any other object must be a
    /// complete note.
    pub fn from_response(body: serde_json::Value) -> Result<Option<Self>> {
        match body.as_object() {
            Some(fields) if !fields.is_empty() => {}
            _ => return Ok(None),
        }
        Ok(Some(serde_json::from_value(body)?))
    }

    /// Get first line as title preview, truncated to `max_len` characters
    #[must_use]
    pub fn title_preview(&self, max_len: usize) -> String {
        self.message
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn sample() -> serde_json::Value {
        json!({
            "id": "01HZX",
            "message": "First line\nSecond line",
            "hasImage": true,
            "created": "2026-01-02T03:04:05Z",
            "updated": "2026-01-02T03:05:00Z"
        })
    }

    #[test]
    fn decodes_camel_case_fields() {
        let note = Note::from_response(sample()).unwrap().unwrap();
        assert_eq!(note.id, "01HZX");
        assert!(note.has_image);
        assert!(note.updated >= note.created);
    }

    #[test]
    fn missing_has_image_defaults_to_false() {
        let mut body = sample();
        body.as_object_mut().unwrap().remove("hasImage");
        let note = Note::from_response(body).unwrap().unwrap();
        assert!(!note.has_image);
    }

    #[test]
    fn empty_object_is_no_note() {
        assert_eq!(Note::from_response(json!({})).unwrap(), None);
    }

    #[test]
    fn non_object_body_is_no_note() {
        assert_eq!(Note::from_response(json!(null)).unwrap(), None);
        assert_eq!(Note::from_response(json!("ok")).unwrap(), None);
        assert_eq!(Note::from_response(json!([])).unwrap(), None);
    }

    #[test]
    fn null_message_decodes_as_empty() {
        let mut body = sample();
        body["message"] = json!(null);
        let note = Note::from_response(body).unwrap().unwrap();
        assert_eq!(note.message, "");
    }

    #[test]
    fn partial_note_is_a_serialization_error() {
        assert!(Note::from_response(json!({ "message": "orphan" })).is_err());
    }

    #[test]
    fn title_preview_takes_first_line() {
        let note = Note::from_response(sample()).unwrap().unwrap();
        assert_eq!(note.title_preview(50), "First line");
        assert_eq!(note.title_preview(5), "First");
    }
}
