use shared::domain::{Message, MessageId};

use crate::events::{Notifier, SessionEvent};

/// Append-only, chronologically ordered message history.
#[derive(Debug)]
pub struct ConversationLog {
    messages: Vec<Message>,
    notifier: Notifier,
}

impl ConversationLog {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            messages: Vec::new(),
            notifier,
        }
    }

    /// Id the next appended message should carry.
    pub fn next_id(&self) -> MessageId {
        MessageId(self.messages.len() as u64 + 1)
    }

    pub fn append(&mut self, message: Message) {
        let latest = message.id;
        self.messages.push(message);
        self.notifier.emit(SessionEvent::LogChanged {
            length: self.messages.len(),
            latest,
        });
    }

    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    /// Verified flag from the most recent verification citing `source`.
    /// Sources are keyed by name alone, so the latest mention wins.
    pub fn latest_source_status(&self, source: &str) -> Option<bool> {
        self.messages
            .iter()
            .rev()
            .filter_map(|message| message.verification.as_ref())
            .find_map(|verification| verification.source_status(source))
    }

    pub fn latest_explanation(&self) -> Option<(MessageId, &str)> {
        self.messages.iter().rev().find_map(|message| {
            message
                .verification
                .as_ref()
                .and_then(|verification| verification.explanation())
                .map(|explanation| (message.id, explanation))
        })
    }
}
