//! Client configuration.
//!
//! The API base URL and timing policy are explicit values handed to the
//! transport adapter and autosave coordinator at construction time.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

/// Environment variable holding the notes API base URL.
pub const ENV_API_BASE_URL: &str = "HUSH_API_BASE_URL";
/// Environment variable overriding the request timeout in seconds.
pub const ENV_REQUEST_TIMEOUT_SECS: &str = "HUSH_REQUEST_TIMEOUT_SECS";
/// Environment variable overriding the autosave debounce in milliseconds.
pub const ENV_AUTOSAVE_DEBOUNCE_MS: &str = "HUSH_AUTOSAVE_DEBOUNCE_MS";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;
const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 2000;

/// Runtime configuration for the notes API client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_autosave_debounce_ms")]
    pub autosave_debounce_ms: u64,
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_autosave_debounce_ms() -> u64 {
    DEFAULT_AUTOSAVE_DEBOUNCE_MS
}

impl ClientConfig {
    /// Builds a config for an explicit API base URL with default timings.
    pub fn new(api_base_url: impl Into<String>) -> Result<Self> {
        Self {
            api_base_url: api_base_url.into(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            autosave_debounce_ms: DEFAULT_AUTOSAVE_DEBOUNCE_MS,
        }
        .normalized()
    }

    /// Parses a JSON config document.
    pub fn from_json(payload: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(payload)?;
        config.normalized()
    }

    /// Applies environment overrides on top of an optional base config.
    ///
    /// `lookup` is usually `|name| std::env::var(name).ok()`.
    pub fn from_env_with(
        base: Option<Self>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_base_url = normalize_text_option(lookup(ENV_API_BASE_URL))
            .or_else(|| base.as_ref().map(|config| config.api_base_url.clone()))
            .ok_or_else(|| {
                Error::InvalidConfiguration(format!(
                    "API base URL is not configured (set {ENV_API_BASE_URL})"
                ))
            })?;

        let request_timeout_secs = parse_override(&lookup, ENV_REQUEST_TIMEOUT_SECS)?
            .or_else(|| base.as_ref().map(|config| config.request_timeout_secs))
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        let autosave_debounce_ms = parse_override(&lookup, ENV_AUTOSAVE_DEBOUNCE_MS)?
            .or_else(|| base.as_ref().map(|config| config.autosave_debounce_ms))
            .unwrap_or(DEFAULT_AUTOSAVE_DEBOUNCE_MS);

        Self {
            api_base_url,
            request_timeout_secs,
            autosave_debounce_ms,
        }
        .normalized()
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub const fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    fn normalized(mut self) -> Result<Self> {
        self.api_base_url = normalize_base_url(&self.api_base_url)?;
        if self.request_timeout_secs == 0 {
            return Err(Error::InvalidConfiguration(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        Ok(self)
    }
}

fn parse_override(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Result<Option<u64>> {
    let Some(raw) = normalize_text_option(lookup(name)) else {
        return Ok(None);
    };
    raw.parse::<u64>()
        .map(Some)
        .map_err(|error| Error::InvalidConfiguration(format!("{name} is not a number: {error}")))
}

fn normalize_base_url(raw: &str) -> Result<String> {
    let base = raw.trim().trim_end_matches('/').to_string();
    if base.is_empty() {
        return Err(Error::InvalidConfiguration(
            "API base URL must not be empty".to_string(),
        ));
    }
    if !is_http_url(&base) {
        return Err(Error::InvalidConfiguration(
            "API base URL must include http:// or https://".to_string(),
        ));
    }
    Ok(base)
}
