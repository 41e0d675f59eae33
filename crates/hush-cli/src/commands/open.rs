use hush_core::resolver::NoteResolver;
use hush_core::session::{NoteSession, Resolution};

use crate::commands::common::{print_note, Context};
use crate::error::CliError;

pub async fn run_open(ctx: &Context, passphrase: &str) -> Result<(), CliError> {
    let session = NoteSession::new(NoteResolver::new(ctx.api()?));
    match session.open(passphrase).await? {
        Resolution::Current(note) => print_note(&note, ctx.json),
        Resolution::Superseded => Err(CliError::Superseded),
    }
}
