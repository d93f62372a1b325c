use std::collections::HashMap;

use shared::domain::Language;

use crate::{
    events::{Notifier, SessionEvent},
    session::IgnoreReason,
};

/// Opaque position token chosen by the renderer; handed back untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Anchor(pub String);

impl Anchor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceInteractionState {
    pub menu_open: bool,
    pub anchor: Option<Anchor>,
    pub selected_language: Option<Language>,
    pub summary_busy: bool,
}

/// Per-source interaction records, keyed by the source identifier.
///
/// Records appear when a menu first opens and live for the whole session.
#[derive(Debug)]
pub struct SourceRegistry {
    entries: HashMap<String, SourceInteractionState>,
    notifier: Notifier,
}

impl SourceRegistry {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            entries: HashMap::new(),
            notifier,
        }
    }

    pub fn get(&self, source: &str) -> Option<&SourceInteractionState> {
        self.entries.get(source)
    }

    pub fn snapshot(&self) -> HashMap<String, SourceInteractionState> {
        self.entries.clone()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// `verified` is the source's last known status; `None` means no
    /// verification has mentioned it.
    pub fn open_menu(
        &mut self,
        source: &str,
        verified: Option<bool>,
        anchor: Anchor,
    ) -> Result<(), IgnoreReason> {
        if verified == Some(false) {
            return Err(IgnoreReason::UnverifiedSource);
        }
        let entry = self.entries.entry(source.to_string()).or_default();
        entry.menu_open = true;
        entry.anchor = Some(anchor);
        self.changed(source);
        Ok(())
    }

    pub fn close_menu(&mut self, source: &str) -> Result<(), IgnoreReason> {
        let entry = self
            .entries
            .get_mut(source)
            .ok_or(IgnoreReason::UnknownSource)?;
        entry.menu_open = false;
        self.changed(source);
        Ok(())
    }

    /// Only records created by `open_menu` accept a language.
    pub fn select_language(
        &mut self,
        source: &str,
        language: Language,
    ) -> Result<(), IgnoreReason> {
        let entry = self
            .entries
            .get_mut(source)
            .ok_or(IgnoreReason::UnknownSource)?;
        entry.selected_language = Some(language);
        self.changed(source);
        Ok(())
    }

    /// Marks a summary as in flight and returns the language to request.
    /// Never creates a record.
    pub fn begin_summary(&mut self, source: &str) -> Result<Language, IgnoreReason> {
        let entry = self
            .entries
            .get_mut(source)
            .ok_or(IgnoreReason::UnknownSource)?;
        let language = entry
            .selected_language
            .ok_or(IgnoreReason::NoLanguageSelected)?;
        if entry.summary_busy {
            return Err(IgnoreReason::Busy);
        }
        entry.summary_busy = true;
        self.changed(source);
        Ok(language)
    }

    pub fn finish_summary(&mut self, source: &str) {
        if let Some(entry) = self.entries.get_mut(source) {
            entry.summary_busy = false;
            self.changed(source);
        }
    }

    fn changed(&self, source: &str) {
        self.notifier.emit(SessionEvent::SourceChanged {
            source: source.to_string(),
        });
    }
}

#[cfg(test)]
#[path = "tests/registry_tests.rs"]
mod tests;
