//! Hush CLI - one passphrase, one secret note
//!
//! Open, write, live-edit, and attach images to passphrase-keyed notes.

mod cli;
mod commands;
mod config;
mod error;


use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ImageCommands};
use crate::commands::common::Context;
use crate::commands::edit::run_edit;
use crate::commands::image::{run_image_delete, run_image_show, run_image_upload};
use crate::commands::open::run_open;
use crate::commands::write::run_write;
use crate::config::resolve_client_config;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("hush=info")),
        )
        .init();

    let cli = Cli::parse();
    let ctx = Context {
        config: resolve_client_config(cli.api_url.as_deref(), cli.config.as_deref())?,
        json: cli.json,
    };
    tracing::debug!(api_base_url = %ctx.config.api_base_url, "Resolved client config");

    match cli.command {
        Commands::Open { passphrase } => run_open(&ctx, &passphrase).await?,
        Commands::Write {
            passphrase,
            message,
            mode,
        } => run_write(&ctx, &passphrase, &message, mode).await?,
        Commands::Edit { passphrase } => run_edit(&ctx, &passphrase).await?,
        Commands::Image { command } => match command {
            ImageCommands::Show { passphrase, output } => {
                run_image_show(&ctx, &passphrase, output.as_deref()).await?;
            }
            ImageCommands::Upload { passphrase, url } => {
                run_image_upload(&ctx, &passphrase, &url).await?;
            }
            ImageCommands::Delete { passphrase } => run_image_delete(&ctx, &passphrase).await?,
        },
    }

    Ok(())
}
