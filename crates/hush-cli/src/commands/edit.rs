use hush_core::autosave::{AutosaveEvent, EditOutcome};
use hush_core::resolver::NoteResolver;
use hush_core::session::{NoteSession, Resolution};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::common::{note_summary, print_note, Context};
use crate::error::CliError;

/// Feeds each stdin line to autosave as the note's full message.
///
/// Every save and failure is reported on stderr. At end of input the pending
/// edit is flushed and the last confirmed note is printed.
pub async fn run_edit(ctx: &Context, passphrase: &str) -> Result<(), CliError> {
    let session = NoteSession::new(NoteResolver::new(ctx.api()?));
    if let Resolution::Superseded = session.open(passphrase).await? {
        return Err(CliError::Superseded);
    }
    let Some((coordinator, mut events)) = session.autosave(ctx.config.autosave_debounce()) else {
        return Err(CliError::Superseded);
    };

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_failure = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                if coordinator.edit(line) == EditOutcome::Queued {
                    tracing::debug!("Edit queued behind in-flight save");
                }
            }
            Some(event) = events.recv() => {
                last_failure = report_event(&session, event);
            }
        }
    }

    coordinator.flush().await;
    coordinator.shutdown();
    while let Ok(event) = events.try_recv() {
        last_failure = report_event(&session, event);
    }

    if let Some(error) = last_failure {
        return Err(error.into());
    }
    if let Some(loaded) = session.current() {
        print_note(&loaded.note, ctx.json)?;
    }
    Ok(())
}

fn report_event<T: hush_core::transport::HttpTransport>(
    session: &NoteSession<T>,
    event: AutosaveEvent,
) -> Option<hush_core::Error> {
    match event {
        AutosaveEvent::Saved(note) => {
            eprintln!("Saved: {}", note_summary(&note));
            session.apply(note);
            None
        }
        AutosaveEvent::Failed(error) => {
            eprintln!("Save failed: {error}");
            Some(error)
        }
    }
}
