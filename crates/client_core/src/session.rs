use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use shared::domain::{Language, Message, MessageId};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::{
    dialogs::{ResultDisplay, TranslationRequestState},
    events::{Notice, Notifier, SessionEvent, DEFAULT_EVENT_CAPACITY},
    gateway::Gateway,
    log::ConversationLog,
    registry::{Anchor, SourceInteractionState, SourceRegistry},
};

pub const SUMMARY_FAILED: &str = "Failed to generate summary";
pub const TRANSLATION_FAILED: &str = "Failed to translate text";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    Sending,
}

/// Why an intent was dropped without touching the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyStatement,
    Busy,
    NothingToRetry,
    NoLanguageSelected,
    UnknownSource,
    UnverifiedSource,
    NoExplanation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Succeeded,
    Failed,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub phase: SubmissionPhase,
    pub draft: String,
    pub last_statement: Option<String>,
    pub messages: Vec<Message>,
    pub sources: HashMap<String, SourceInteractionState>,
    pub translation: TranslationRequestState,
    pub result: ResultDisplay,
}

struct SessionState {
    phase: SubmissionPhase,
    draft: String,
    last_statement: Option<String>,
    log: ConversationLog,
    sources: SourceRegistry,
    translation: TranslationRequestState,
    result: ResultDisplay,
    notifier: Notifier,
}

impl SessionState {
    fn new(notifier: Notifier) -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            draft: String::new(),
            last_statement: None,
            log: ConversationLog::new(notifier.clone()),
            sources: SourceRegistry::new(notifier.clone()),
            translation: TranslationRequestState::default(),
            result: ResultDisplay::default(),
            notifier,
        }
    }

    fn set_phase(&mut self, phase: SubmissionPhase) {
        self.phase = phase;
        self.notifier
            .emit(SessionEvent::SubmissionPhaseChanged(phase));
    }

    fn set_draft(&mut self, draft: String) {
        self.draft = draft;
        self.notifier.emit(SessionEvent::DraftChanged);
    }

    fn translation_changed(&self) {
        self.notifier.emit(SessionEvent::TranslationChanged);
    }

    fn show_result(&mut self, result: ResultDisplay) {
        self.result = result;
        self.notifier.emit(SessionEvent::ResultDisplayChanged);
    }

    fn notice(&self, notice: Notice) {
        self.notifier.emit(SessionEvent::Notice(notice));
    }

    fn release(&mut self, flow: &Flow) {
        match flow {
            Flow::FactCheck => self.set_phase(SubmissionPhase::Idle),
            Flow::Summary(source) => self.sources.finish_summary(source),
            Flow::Translation => {
                self.translation.busy = false;
                self.translation_changed();
            }
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            draft: self.draft.clone(),
            last_statement: self.last_statement.clone(),
            messages: self.log.all().to_vec(),
            sources: self.sources.snapshot(),
            translation: self.translation.clone(),
            result: self.result.clone(),
        }
    }
}

enum Flow {
    FactCheck,
    Summary(String),
    Translation,
}

/// Clears a flow's busy marker when dropped, so the flag is released on
/// every exit path, including a cancelled future.
struct FlowGuard<'a> {
    controller: &'a SessionController,
    flow: Flow,
}

impl<'a> FlowGuard<'a> {
    fn new(controller: &'a SessionController, flow: Flow) -> Self {
        Self { controller, flow }
    }
}

impl Drop for FlowGuard<'_> {
    fn drop(&mut self) {
        self.controller
            .with_state(|state| state.release(&self.flow));
    }
}

/// Drives one user's fact-check session: the conversation, the per-source
/// summary menus and the shared translation and result dialogs.
///
/// State sits behind a mutex that is only taken for short synchronous
/// sections and never held across a gateway call. Fact-check, each
/// source's summary and translation are separate single-flight flows.
pub struct SessionController {
    gateway: Arc<dyn Gateway>,
    notifier: Notifier,
    state: Mutex<SessionState>,
}

impl SessionController {
    pub fn new(gateway: Arc<dyn Gateway>) -> Arc<Self> {
        Self::with_event_capacity(gateway, DEFAULT_EVENT_CAPACITY)
    }

    pub fn with_event_capacity(gateway: Arc<dyn Gateway>, capacity: usize) -> Arc<Self> {
        let notifier = Notifier::new(capacity);
        Arc::new(Self {
            gateway,
            state: Mutex::new(SessionState::new(notifier.clone())),
            notifier,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.notifier.subscribe()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut state)
    }

    fn ignored(&self, intent: &'static str, reason: IgnoreReason) -> Dispatch {
        debug!(intent, ?reason, "session: intent ignored");
        Dispatch::Ignored(reason)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.with_state(|state| state.snapshot())
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.with_state(|state| state.phase)
    }

    pub fn is_sending(&self) -> bool {
        self.phase() == SubmissionPhase::Sending
    }

    pub fn messages(&self) -> Vec<Message> {
        self.with_state(|state| state.log.all().to_vec())
    }

    /// Messages appended after the first `start`.
    pub fn messages_from(&self, start: usize) -> Vec<Message> {
        self.with_state(|state| state.log.all().iter().skip(start).cloned().collect())
    }

    pub fn message_count(&self) -> usize {
        self.with_state(|state| state.log.len())
    }

    pub fn last_statement(&self) -> Option<String> {
        self.with_state(|state| state.last_statement.clone())
    }

    pub fn draft(&self) -> String {
        self.with_state(|state| state.draft.clone())
    }

    pub fn set_draft(&self, draft: impl Into<String>) {
        let draft = draft.into();
        self.with_state(|state| state.set_draft(draft));
    }

    pub fn source_state(&self, source: &str) -> Option<SourceInteractionState> {
        self.with_state(|state| state.sources.get(source).cloned())
    }

    pub fn translation_state(&self) -> TranslationRequestState {
        self.with_state(|state| state.translation.clone())
    }

    pub fn result_display(&self) -> ResultDisplay {
        self.with_state(|state| state.result.clone())
    }

    pub async fn submit_draft(&self) -> Dispatch {
        let draft = self.draft();
        self.submit(&draft).await
    }

    /// Sends `statement` for fact-checking.
    ///
    /// The user message is appended before the request goes out; exactly one
    /// system message (verdict or error) follows once it resolves.
    pub async fn submit(&self, statement: &str) -> Dispatch {
        if statement.trim().is_empty() {
            return self.ignored("submit", IgnoreReason::EmptyStatement);
        }

        let started = self.with_state(|state| {
            if state.phase == SubmissionPhase::Sending {
                return Err(IgnoreReason::Busy);
            }
            state.set_phase(SubmissionPhase::Sending);
            state.set_draft(String::new());
            state.last_statement = Some(statement.to_string());
            let id = state.log.next_id();
            state.log.append(Message::user(id, statement));
            Ok(())
        });
        if let Err(reason) = started {
            return self.ignored("submit", reason);
        }
        let _sending = FlowGuard::new(self, Flow::FactCheck);

        info!(chars = statement.len(), "session: fact-check requested");
        let outcome = self.gateway.fact_check(statement).await;

        self.with_state(|state| {
            let id = state.log.next_id();
            match outcome {
                Ok(verification) => {
                    info!(
                        classification = %verification.classification,
                        sources = verification.sources.len(),
                        "session: fact-check completed"
                    );
                    state.log.append(Message::verification(id, verification));
                    Dispatch::Succeeded
                }
                Err(err) => {
                    warn!(error = %err, status = ?err.status(), "session: fact-check failed");
                    state.log.append(Message::error(id, &err.to_string()));
                    Dispatch::Failed
                }
            }
        })
    }

    /// Resubmits the last statement as a fresh cycle; earlier attempts stay
    /// in the log.
    pub async fn retry_last(&self) -> Dispatch {
        let Some(statement) = self.last_statement() else {
            return self.ignored("retry", IgnoreReason::NothingToRetry);
        };
        self.submit(&statement).await
    }

    pub fn open_source_menu(&self, source: &str, anchor: Anchor) -> Result<(), IgnoreReason> {
        self.with_state(|state| {
            let verified = state.log.latest_source_status(source);
            state.sources.open_menu(source, verified, anchor)
        })
        .inspect_err(|reason| debug!(source, ?reason, "session: source menu not opened"))
    }

    pub fn close_source_menu(&self, source: &str) -> Result<(), IgnoreReason> {
        self.with_state(|state| state.sources.close_menu(source))
            .inspect_err(|reason| debug!(source, ?reason, "session: source menu not closed"))
    }

    pub fn select_source_language(
        &self,
        source: &str,
        language: Language,
    ) -> Result<(), IgnoreReason> {
        self.with_state(|state| state.sources.select_language(source, language))
            .inspect_err(|reason| debug!(source, ?reason, "session: language not recorded"))
    }

    pub async fn request_summary(&self, source: &str) -> Dispatch {
        let language = match self.with_state(|state| state.sources.begin_summary(source)) {
            Ok(language) => language,
            Err(reason) => return self.ignored("summary", reason),
        };
        let _busy = FlowGuard::new(self, Flow::Summary(source.to_string()));

        info!(source, language = %language, "session: summary requested");
        let outcome = self.gateway.summarize_source(source, language).await;

        self.with_state(|state| match outcome {
            Ok(response) => {
                state.show_result(ResultDisplay::summary(
                    source,
                    response.source,
                    response.target_language,
                    response.summary,
                ));
                let _ = state.sources.close_menu(source);
                Dispatch::Succeeded
            }
            Err(err) => {
                warn!(source, error = %err, "session: summary failed");
                state.notice(Notice::negative(SUMMARY_FAILED));
                Dispatch::Failed
            }
        })
    }

    pub fn open_translate_menu(&self, text: impl Into<String>, anchor: Anchor) {
        let text = text.into();
        self.with_state(|state| {
            state.translation.visible = true;
            state.translation.anchor = Some(anchor);
            state.translation.source_text = text;
            state.translation_changed();
        });
    }

    /// Opens the translate menu on the explanation of message `id`.
    pub fn open_translate_menu_for(&self, id: MessageId, anchor: Anchor) -> Result<(), IgnoreReason> {
        let explanation = self.with_state(|state| {
            state
                .log
                .get(id)
                .and_then(|message| message.verification.as_ref())
                .and_then(|verification| verification.explanation())
                .map(str::to_string)
        });
        let Some(explanation) = explanation else {
            debug!(%id, "session: translate menu not opened, no explanation");
            return Err(IgnoreReason::NoExplanation);
        };
        self.open_translate_menu(explanation, anchor);
        Ok(())
    }

    pub fn latest_explanation_id(&self) -> Option<MessageId> {
        self.with_state(|state| state.log.latest_explanation().map(|(id, _)| id))
    }

    pub fn select_translate_language(&self, language: Language) {
        self.with_state(|state| {
            state.translation.target_language = Some(language);
            state.translation_changed();
        });
    }

    pub fn close_translate_menu(&self) {
        self.with_state(|state| {
            state.translation.visible = false;
            state.translation_changed();
        });
    }

    /// Translates the text held by the translate menu into its language.
    pub async fn request_translation(&self) -> Dispatch {
        let (text, language) = self.with_state(|state| {
            (
                state.translation.source_text.clone(),
                state.translation.target_language,
            )
        });
        let Some(language) = language else {
            return self.ignored("translate", IgnoreReason::NoLanguageSelected);
        };
        self.translate(&text, language).await
    }

    pub async fn translate(&self, text: &str, language: Language) -> Dispatch {
        let started = self.with_state(|state| {
            if state.translation.busy {
                return Err(IgnoreReason::Busy);
            }
            state.translation.busy = true;
            state.translation.target_language = Some(language);
            state.translation.source_text = text.to_string();
            state.translation_changed();
            Ok(())
        });
        if let Err(reason) = started {
            return self.ignored("translate", reason);
        }
        let _busy = FlowGuard::new(self, Flow::Translation);

        info!(language = %language, chars = text.len(), "session: translation requested");
        let outcome = self.gateway.translate(text, language).await;

        self.with_state(|state| match outcome {
            Ok(response) => {
                state.show_result(ResultDisplay::translation(
                    response.target_language,
                    response.translated_text,
                ));
                state.translation.visible = false;
                state.translation_changed();
                Dispatch::Succeeded
            }
            Err(err) => {
                warn!(error = %err, "session: translation failed");
                state.notice(Notice::negative(TRANSLATION_FAILED));
                Dispatch::Failed
            }
        })
    }

    pub fn close_result(&self) {
        self.with_state(|state| {
            state.result.visible = false;
            state.notifier.emit(SessionEvent::ResultDisplayChanged);
        });
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
