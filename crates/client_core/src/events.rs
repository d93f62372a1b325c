//! Observer contract between the session state and whatever renders it.

use shared::domain::MessageId;
use tokio::sync::broadcast;

use crate::session::SubmissionPhase;

pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Negative,
}

/// Transient, out-of-band message for the user. Never stored in the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn negative(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Negative,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LogChanged { length: usize, latest: MessageId },
    SubmissionPhaseChanged(SubmissionPhase),
    DraftChanged,
    SourceChanged { source: String },
    TranslationChanged,
    ResultDisplayChanged,
    Notice(Notice),
}

#[derive(Debug, Clone)]
pub struct Notifier {
    events: broadcast::Sender<SessionEvent>,
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self { events }
    }

    pub fn emit(&self, event: SessionEvent) {
        // No subscribers is fine: nobody is rendering yet.
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
