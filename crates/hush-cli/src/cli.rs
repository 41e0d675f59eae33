use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "hush")]
#[command(about = "One passphrase, one secret note")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Notes API base URL (overrides HUSH_API_BASE_URL and the config file)
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Optional path to a JSON config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Open the note for a passphrase, creating it on first use
    Open {
        /// Passphrase naming the note
        passphrase: String,
    },
    /// Replace the note's message
    Write {
        /// Passphrase naming the note
        passphrase: String,
        /// New message
        #[arg(required = true)]
        message: Vec<String>,
        /// Which write the server should perform
        #[arg(long, value_enum, default_value_t = WriteMode::Upsert)]
        mode: WriteMode,
    },
    /// Stream edits from stdin, one full message per line, with autosave
    Edit {
        /// Passphrase naming the note
        passphrase: String,
    },
    /// Manage the note's image
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum WriteMode {
    /// Create or replace
    Upsert,
    /// Create only; fails if the note exists
    Create,
    /// Update only; fails if the note is missing
    Patch,
}

#[derive(Subcommand)]
pub enum ImageCommands {
    /// Print the image as a data URI, or save its bytes
    Show {
        /// Passphrase naming the note
        passphrase: String,
        /// Write raw image bytes to this path instead of printing
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
    /// Copy an image from a URL onto the note
    Upload {
        /// Passphrase naming the note
        passphrase: String,
        /// Source image URL
        url: String,
    },
    /// Remove the note's image
    Delete {
        /// Passphrase naming the note
        passphrase: String,
    },
}
