use std::{collections::HashMap, fmt::Write as _, sync::Arc};

use client_core::{
    dialogs::{ResultDisplay, TranslationRequestState},
    events::{Notice, NoticeKind, SessionEvent},
    registry::SourceInteractionState,
    session::{SessionController, SessionSnapshot, SubmissionPhase},
};
use shared::domain::{Message, MessageKind};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

pub fn render_message(message: &Message) -> String {
    match message.kind {
        MessageKind::UserStatement => format!("#{} [you] {}", message.id, message.content),
        MessageKind::SystemError => format!(
            "#{} [error] {}\n    (type :retry to resend the last statement)",
            message.id, message.content
        ),
        MessageKind::SystemVerification => {
            let Some(verification) = message.verification.as_ref() else {
                return format!("#{} [verdict] {}", message.id, message.content);
            };
            let mut out = String::new();
            let _ = write!(
                out,
                "#{} [verdict] {} ({})",
                message.id,
                verification.classification,
                verification.color().as_str()
            );
            if let Some(explanation) = verification.explanation() {
                let _ = write!(out, "\n    {explanation}");
            }
            if !verification.fragments.is_empty() {
                out.push_str("\n    evidence:");
                for fragment in &verification.fragments {
                    let _ = write!(out, "\n      > {fragment}");
                }
            }
            if !verification.sources.is_empty() {
                out.push_str("\n    sources:");
                for (source, verified) in &verification.sources {
                    let marker = if *verified { "verified" } else { "unverified" };
                    let _ = write!(out, "\n      - {source} [{marker}]");
                }
            }
            out
        }
    }
}

pub fn render_source(source: &str, state: &SourceInteractionState) -> Option<String> {
    let language = state
        .selected_language
        .map_or_else(|| "no language".to_string(), |language| language.to_string());
    if state.summary_busy {
        Some(format!("[{source}] summarizing in {language}..."))
    } else if state.menu_open {
        Some(format!("[{source}] summary menu open ({language})"))
    } else {
        None
    }
}

pub fn render_translation(state: &TranslationRequestState) -> Option<String> {
    let language = state
        .target_language
        .map_or_else(|| "no language".to_string(), |language| language.to_string());
    if state.busy {
        Some(format!("[translate] translating into {language}..."))
    } else if state.visible {
        Some(format!(
            "[translate] menu open ({language}): \"{}\"",
            state.source_text
        ))
    } else {
        None
    }
}

pub fn render_result(result: &ResultDisplay) -> Option<String> {
    if !result.visible {
        return None;
    }
    Some(format!(
        "+-- {} ({})\n{}\n+-- :dismiss to close",
        result.heading, result.language_label, result.body
    ))
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Negative => format!("! {}", notice.message),
    }
}

/// The parts of a session the renderer reads back after an event.
pub trait SessionView {
    fn messages_from(&self, start: usize) -> Vec<Message>;
    fn source_state(&self, source: &str) -> Option<SourceInteractionState>;
    fn translation_state(&self) -> TranslationRequestState;
    fn result_display(&self) -> ResultDisplay;
}

impl SessionView for SessionController {
    fn messages_from(&self, start: usize) -> Vec<Message> {
        SessionController::messages_from(self, start)
    }

    fn source_state(&self, source: &str) -> Option<SourceInteractionState> {
        SessionController::source_state(self, source)
    }

    fn translation_state(&self) -> TranslationRequestState {
        SessionController::translation_state(self)
    }

    fn result_display(&self) -> ResultDisplay {
        SessionController::result_display(self)
    }
}

impl SessionView for SessionSnapshot {
    fn messages_from(&self, start: usize) -> Vec<Message> {
        self.messages.iter().skip(start).cloned().collect()
    }

    fn source_state(&self, source: &str) -> Option<SourceInteractionState> {
        self.sources.get(source).cloned()
    }

    fn translation_state(&self) -> TranslationRequestState {
        self.translation.clone()
    }

    fn result_display(&self) -> ResultDisplay {
        self.result.clone()
    }
}

/// Turns session events into transcript lines, printing each piece of state
/// only when it differs from what was last shown. Each event reads back only
/// the state it names.
#[derive(Debug, Default)]
pub struct Renderer {
    printed_messages: usize,
    sources: HashMap<String, SourceInteractionState>,
    translation: TranslationRequestState,
    result: ResultDisplay,
}

impl Renderer {
    pub fn handle(&mut self, event: &SessionEvent, session: &impl SessionView) -> Vec<String> {
        match event {
            SessionEvent::LogChanged { .. } => {
                let fresh = session.messages_from(self.printed_messages);
                self.printed_messages += fresh.len();
                fresh.iter().map(render_message).collect()
            }
            SessionEvent::SubmissionPhaseChanged(SubmissionPhase::Sending) => {
                vec!["... checking statement".to_string()]
            }
            SessionEvent::SubmissionPhaseChanged(SubmissionPhase::Idle)
            | SessionEvent::DraftChanged => Vec::new(),
            SessionEvent::SourceChanged { source } => {
                let Some(state) = session.source_state(source) else {
                    return Vec::new();
                };
                if self.sources.get(source) == Some(&state) {
                    return Vec::new();
                }
                let lines = render_source(source, &state).into_iter().collect();
                self.sources.insert(source.clone(), state);
                lines
            }
            SessionEvent::TranslationChanged => {
                let translation = session.translation_state();
                if self.translation == translation {
                    return Vec::new();
                }
                let lines = render_translation(&translation).into_iter().collect();
                self.translation = translation;
                lines
            }
            SessionEvent::ResultDisplayChanged => {
                let result = session.result_display();
                if self.result == result {
                    return Vec::new();
                }
                let lines = render_result(&result).into_iter().collect();
                self.result = result;
                lines
            }
            SessionEvent::Notice(notice) => vec![render_notice(notice)],
        }
    }
}

pub async fn render_loop(
    session: Arc<SessionController>,
    mut events: broadcast::Receiver<SessionEvent>,
) {
    let mut renderer = Renderer::default();
    loop {
        match events.recv().await {
            Ok(event) => {
                for line in renderer.handle(&event, &*session) {
                    println!("{line}");
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "render: fell behind session events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
