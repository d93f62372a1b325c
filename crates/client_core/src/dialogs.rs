use shared::domain::Language;

use crate::registry::Anchor;

pub const TRANSLATION_HEADING: &str = "Explanation";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationRequestState {
    pub visible: bool,
    pub anchor: Option<Anchor>,
    pub target_language: Option<Language>,
    pub busy: bool,
    pub source_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultProvenance {
    Summary { source: String },
    Translation,
}

/// The one result dialog shared by the summary and translation flows.
/// Whichever flow finishes last owns its content.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultDisplay {
    pub visible: bool,
    pub heading: String,
    pub language_label: String,
    pub body: String,
    pub provenance: Option<ResultProvenance>,
}

impl ResultDisplay {
    pub fn summary(requested_source: &str, source: String, language: String, summary: String) -> Self {
        Self {
            visible: true,
            heading: source,
            language_label: language,
            body: summary,
            provenance: Some(ResultProvenance::Summary {
                source: requested_source.to_string(),
            }),
        }
    }

    pub fn translation(language: String, translated_text: String) -> Self {
        Self {
            visible: true,
            heading: TRANSLATION_HEADING.to_string(),
            language_label: language,
            body: translated_text,
            provenance: Some(ResultProvenance::Translation),
        }
    }
}
