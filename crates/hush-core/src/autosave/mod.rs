//! Debounced autosave for the resolved note.
//!
//! Edits are coalesced until the debounce window passes without a new edit,
//! then pushed with a single upsert. At most one write is in flight; edits
//! arriving while it runs are kept and scheduled once it resolves. Failed
//! writes are reported on the event channel and never retried automatically.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::error::Error;
use crate::key::NoteKey;
use crate::models::Note;
use crate::resolver::NoteResolver;
use crate::transport::HttpTransport;

/// Quiet period after the last edit before it is written.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(2000);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutosaveState {
    Idle,
    Debouncing,
    Saving,
}

/// What the coordinator did with an edit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOutcome {
    /// No note loaded, key too short, or the coordinator was shut down.
    Ignored,
    /// Matches the confirmed message; nothing to write.
    Unchanged,
    /// Debounce timer (re)started.
    Scheduled,
    /// A write is in flight; the edit will be scheduled after it resolves.
    Queued,
}

#[derive(Debug)]
pub enum AutosaveEvent {
    Saved(Note),
    Failed(Error),
}

pub struct AutosaveCoordinator<T: HttpTransport> {
    shared: Arc<Shared<T>>,
}

struct Shared<T> {
    resolver: NoteResolver<T>,
    key: NoteKey,
    debounce: Duration,
    events: mpsc::UnboundedSender<AutosaveEvent>,
    settled: Notify,
    inner: Mutex<Inner>,
}

struct Inner {
    state: AutosaveState,
    confirmed: Option<Note>,
    pending: Option<String>,
    timer: Option<JoinHandle<()>>,
    timer_seq: u64,
    closed: bool,
}

impl Inner {
    fn cancel_timer(&mut self) {
        self.timer_seq += 1;
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl<T: HttpTransport> AutosaveCoordinator<T> {
    /// Creates a coordinator for `key` starting from the confirmed note.
    ///
    /// Returns the receiving end of the save/failure event stream.
    pub fn new(
        resolver: NoteResolver<T>,
        key: NoteKey,
        confirmed: Option<Note>,
        debounce: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<AutosaveEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let shared = Arc::new(Shared {
            resolver,
            key,
            debounce,
            events,
            settled: Notify::new(),
            inner: Mutex::new(Inner {
                state: AutosaveState::Idle,
                confirmed,
                pending: None,
                timer: None,
                timer_seq: 0,
                closed: false,
            }),
        });
        (Self { shared }, receiver)
    }

    pub fn state(&self) -> AutosaveState {
        self.shared.lock().state
    }

    pub fn confirmed(&self) -> Option<Note> {
        self.shared.lock().confirmed.clone()
    }

    pub fn pending(&self) -> Option<String> {
        self.shared.lock().pending.clone()
    }

    /// Records the latest editor value. Must be called inside a Tokio runtime.
    pub fn edit(&self, message: impl Into<String>) -> EditOutcome {
        let message = message.into();
        let mut inner = self.shared.lock();

        if inner.closed || inner.confirmed.is_none() || !self.shared.key.is_valid() {
            return EditOutcome::Ignored;
        }

        if inner.state == AutosaveState::Saving {
            inner.pending = Some(message);
            return EditOutcome::Queued;
        }

        let unchanged = inner
            .confirmed
            .as_ref()
            .is_some_and(|note| note.message == message);
        if unchanged {
            inner.cancel_timer();
            inner.pending = None;
            inner.state = AutosaveState::Idle;
            return EditOutcome::Unchanged;
        }

        inner.pending = Some(message);
        Shared::schedule(&self.shared, &mut inner);
        EditOutcome::Scheduled
    }

    /// Writes any pending edit now instead of waiting for the timer.
    ///
    /// Waits for an in-flight write first, so on return nothing typed
    /// before the call is left unsaved (unless a write failed).
    pub async fn flush(&self) {
        loop {
            let settled = self.shared.settled.notified();
            let message = {
                let mut inner = self.shared.lock();
                if inner.closed {
                    return;
                }
                if inner.state == AutosaveState::Saving {
                    None
                } else {
                    inner.cancel_timer();
                    let Some(message) = inner.pending.take() else {
                        inner.state = AutosaveState::Idle;
                        return;
                    };
                    inner.state = AutosaveState::Saving;
                    Some(message)
                }
            };

            match message {
                Some(message) => {
                    Shared::save(&self.shared, message).await;
                    if self.state() != AutosaveState::Debouncing {
                        return;
                    }
                }
                None => settled.await,
            }
        }
    }

    /// Cancels the debounce timer and stops accepting edits.
    ///
    /// A write already in flight is allowed to finish.
    pub fn shutdown(&self) {
        let mut inner = self.shared.lock();
        inner.closed = true;
        inner.cancel_timer();
        if inner.state == AutosaveState::Debouncing {
            inner.state = AutosaveState::Idle;
        }
        if inner.pending.take().is_some() {
            tracing::debug!("Discarded unsaved edit on shutdown");
        }
    }
}

impl<T: HttpTransport> Drop for AutosaveCoordinator<T> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<T: HttpTransport> Shared<T> {
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn schedule(shared: &Arc<Self>, inner: &mut Inner) {
        inner.cancel_timer();
        let seq = inner.timer_seq;
        let task_shared = Arc::clone(shared);
        inner.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(task_shared.debounce).await;
            Self::fire(&task_shared, seq).await;
        }));
        inner.state = AutosaveState::Debouncing;
    }

    async fn fire(shared: &Arc<Self>, seq: u64) {
        let message = {
            let mut inner = shared.lock();
            if inner.closed
                || inner.timer_seq != seq
                || inner.state != AutosaveState::Debouncing
            {
                return;
            }
            // Detach the handle so later cancellation cannot abort the write.
            inner.timer = None;
            let Some(message) = inner.pending.take() else {
                inner.state = AutosaveState::Idle;
                return;
            };
            inner.state = AutosaveState::Saving;
            message
        };
        Self::save(shared, message).await;
    }

    async fn save(shared: &Arc<Self>, message: String) {
        let result = shared.resolver.upsert(&shared.key, &message).await;

        {
            let mut inner = shared.lock();
            inner.state = AutosaveState::Idle;
            let event = match result {
                Ok(note) => {
                    tracing::debug!(note_id = %note.id, "Auto-saved note");
                    inner.confirmed = Some(note.clone());
                    AutosaveEvent::Saved(note)
                }
                Err(error) => {
                    tracing::warn!("Failed to auto-save note: {error}");
                    AutosaveEvent::Failed(error)
                }
            };
            let _ = shared.events.send(event);

            if !inner.closed {
                let confirmed = inner.confirmed.as_ref().map(|note| note.message.as_str());
                let needs_write = inner
                    .pending
                    .as_deref()
                    .is_some_and(|pending| Some(pending) != confirmed);
                if needs_write {
                    Self::schedule(shared, &mut inner);
                } else {
                    inner.pending = None;
                }
            }
        }

        shared.settled.notify_waiters();
    }
}
