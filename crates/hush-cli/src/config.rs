//! Client configuration for the CLI.
//!
//! Precedence: `--api-url`, then `HUSH_*` environment variables, then the
//! JSON config file.

use std::path::{Path, PathBuf};

use hush_core::config::{ClientConfig, ENV_API_BASE_URL};

use crate::error::CliError;

const CONFIG_DIR_NAME: &str = "hush";
const CONFIG_FILE_NAME: &str = "config.json";

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Reads the config file at `path`, if there is one.
pub fn load_config_file(path: &Path) -> Result<Option<ClientConfig>, CliError> {
    if !path.exists() {
        return Ok(None);
    }

    let raw = std::fs::read_to_string(path).map_err(|error| {
        CliError::Config(format!("Failed to read config at {}: {error}", path.display()))
    })?;
    ClientConfig::from_json(&raw).map(Some).map_err(|error| {
        CliError::Config(format!("Failed to parse config at {}: {error}", path.display()))
    })
}

pub fn resolve_client_config(
    api_url: Option<&str>,
    config_path: Option<&Path>,
) -> Result<ClientConfig, CliError> {
    resolve_client_config_with(api_url, config_path, |name| std::env::var(name).ok())
}

pub fn resolve_client_config_with(
    api_url: Option<&str>,
    config_path: Option<&Path>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ClientConfig, CliError> {
    let file_config = match config_path {
        Some(path) => Some(load_config_file(path)?.ok_or_else(|| {
            CliError::Config(format!("Config file not found: {}", path.display()))
        })?),
        None => match default_config_path() {
            Some(path) => load_config_file(&path)?,
            None => None,
        },
    };

    let lookup = |name: &str| match api_url {
        Some(url) if name == ENV_API_BASE_URL => Some(url.to_string()),
        _ => env(name),
    };
    Ok(ClientConfig::from_env_with(file_config, lookup)?)
}
