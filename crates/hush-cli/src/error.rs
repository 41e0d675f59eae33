use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] hush_core::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
    #[error("Message cannot be empty")]
    EmptyMessage,
    #[error("Image source must be an http:// or https:// URL")]
    InvalidSourceUrl,
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Note was replaced by a newer lookup")]
    Superseded,
}
