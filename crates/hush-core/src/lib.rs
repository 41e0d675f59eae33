//! hush-core - Core library for Hush
//!
//! A passphrase names exactly one note on a remote notes API. This crate
//! resolves passphrases to notes, autosaves edits with a debounce, and moves
//! note images to and from the server.

pub mod autosave;
pub mod config;
pub mod error;
pub mod image;
pub mod key;
pub mod models;
pub mod resolver;
pub mod session;
pub mod transport;
pub mod util;

pub use error::{Error, Result};
pub use key::NoteKey;
pub use models::Note;
