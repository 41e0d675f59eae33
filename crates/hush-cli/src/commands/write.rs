use hush_core::resolver::NoteResolver;

use crate::cli::WriteMode;
use crate::commands::common::{parse_key, print_note, resolve_message, Context};
use crate::error::CliError;

pub async fn run_write(
    ctx: &Context,
    passphrase: &str,
    message_parts: &[String],
    mode: WriteMode,
) -> Result<(), CliError> {
    let key = parse_key(passphrase)?;
    let message = resolve_message(message_parts)?;
    let resolver = NoteResolver::new(ctx.api()?);

    let note = match mode {
        WriteMode::Upsert => resolver.upsert(&key, &message).await?,
        WriteMode::Create => resolver.create(&key, &message).await?,
        WriteMode::Patch => resolver.patch(&key, &message).await?,
    };

    print_note(&note, ctx.json)
}
