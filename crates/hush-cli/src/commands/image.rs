use std::path::Path;

use hush_core::image::ImageService;
use hush_core::resolver::NoteResolver;
use hush_core::util::is_http_url;

use crate::commands::common::{parse_key, Context};
use crate::error::CliError;

pub async fn run_image_show(
    ctx: &Context,
    passphrase: &str,
    output: Option<&Path>,
) -> Result<(), CliError> {
    let key = parse_key(passphrase)?;
    let service = ImageService::new(ctx.api()?);

    if let Some(path) = output {
        let image = service.fetch_image_bytes(&key).await?;
        std::fs::write(path, &image.bytes)?;
        if ctx.json {
            let summary = serde_json::json!({
                "path": path.display().to_string(),
                "contentType": image.content_type,
                "bytes": image.bytes.len(),
            });
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            eprintln!(
                "Wrote {} bytes ({}) to {}",
                image.bytes.len(),
                image.content_type,
                path.display()
            );
        }
        return Ok(());
    }

    let image = service.fetch_image(&key).await?;
    if ctx.json {
        let summary = serde_json::json!({
            "contentType": image.content_type,
            "dataUri": image.data_uri,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{}", image.data_uri);
    }
    Ok(())
}

pub async fn run_image_upload(ctx: &Context, passphrase: &str, url: &str) -> Result<(), CliError> {
    let key = parse_key(passphrase)?;
    let url = url.trim();
    if !is_http_url(url) {
        return Err(CliError::InvalidSourceUrl);
    }

    let uploaded = ImageService::new(ctx.api()?)
        .upload_from_url(&key, url)
        .await?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&uploaded)?);
    } else {
        println!(
            "{} ({}, {})",
            uploaded.file_name, uploaded.content_type, uploaded.id
        );
    }
    Ok(())
}

/// Deletes the image, then re-reads the note so `hasImage` is current.
///
/// The re-read never falls back to a write; a failed read is reported.
pub async fn run_image_delete(ctx: &Context, passphrase: &str) -> Result<(), CliError> {
    let key = parse_key(passphrase)?;
    let api = ctx.api()?;

    let response = ImageService::new(api.clone()).delete_image(&key).await?;
    let note = NoteResolver::new(api).read(&key).await?;

    if ctx.json {
        let summary = serde_json::json!({
            "message": response.message,
            "hasImage": note.has_image,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        if !response.message.is_empty() {
            println!("{}", response.message);
        }
        println!("hasImage: {}", note.has_image);
    }
    Ok(())
}
