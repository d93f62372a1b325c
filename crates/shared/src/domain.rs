use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_newtype!(MessageId);

pub const FACT_CHECK_COMPLETE: &str = "Fact checking complete";
pub const UNEXPECTED_ERROR: &str = "Unexpected error occurred. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    UserStatement,
    SystemVerification,
    SystemError,
}

impl MessageKind {
    pub fn is_system(self) -> bool {
        !matches!(self, Self::UserStatement)
    }
}

/// Fact-check verdict as returned by the backend.
///
/// Fields the client does not model are kept in `extra` so the message
/// carries the full response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    #[serde(default, deserialize_with = "null_as_default")]
    pub classification: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fragments: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: BTreeMap<String, bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Verification {
    /// Explanation text, if the backend sent a non-blank one.
    pub fn explanation(&self) -> Option<&str> {
        self.explanation
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    pub fn source_status(&self, source: &str) -> Option<bool> {
        self.sources.get(source).copied()
    }

    pub fn color(&self) -> VerificationColor {
        verification_color(&self.classification)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub kind: MessageKind,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<Verification>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(id: MessageId, statement: impl Into<String>) -> Self {
        Self {
            id,
            kind: MessageKind::UserStatement,
            content: statement.into(),
            verification: None,
            created_at: Utc::now(),
        }
    }

    pub fn verification(id: MessageId, verification: Verification) -> Self {
        let content = verification
            .explanation()
            .unwrap_or(FACT_CHECK_COMPLETE)
            .to_string();
        Self {
            id,
            kind: MessageKind::SystemVerification,
            content,
            verification: Some(verification),
            created_at: Utc::now(),
        }
    }

    pub fn error(id: MessageId, reason: &str) -> Self {
        let content = if reason.trim().is_empty() {
            UNEXPECTED_ERROR.to_string()
        } else {
            reason.to_string()
        };
        Self {
            id,
            kind: MessageKind::SystemError,
            content,
            verification: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == MessageKind::SystemError
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Spanish,
    French,
    German,
    Italian,
    Portuguese,
    Chinese,
    Japanese,
    Korean,
    Arabic,
    Russian,
}

impl Language {
    pub const ALL: [Language; 11] = [
        Language::English,
        Language::Spanish,
        Language::French,
        Language::German,
        Language::Italian,
        Language::Portuguese,
        Language::Chinese,
        Language::Japanese,
        Language::Korean,
        Language::Arabic,
        Language::Russian,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Spanish => "Spanish",
            Language::French => "French",
            Language::German => "German",
            Language::Italian => "Italian",
            Language::Portuguese => "Portuguese",
            Language::Chinese => "Chinese",
            Language::Japanese => "Japanese",
            Language::Korean => "Korean",
            Language::Arabic => "Arabic",
            Language::Russian => "Russian",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language '{0}'")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        Language::ALL
            .into_iter()
            .find(|language| language.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownLanguage(raw.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationColor {
    Positive,
    Negative,
    Warning,
    Grey,
}

impl VerificationColor {
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationColor::Positive => "positive",
            VerificationColor::Negative => "negative",
            VerificationColor::Warning => "warning",
            VerificationColor::Grey => "grey",
        }
    }
}

/// Maps a classification label to its display color. Matching ignores case;
/// unrecognised labels fall back to grey.
pub fn verification_color(classification: &str) -> VerificationColor {
    match classification.to_uppercase().as_str() {
        "TRUE" => VerificationColor::Positive,
        "FALSE" => VerificationColor::Negative,
        "PARTIALLY TRUE" => VerificationColor::Warning,
        "NOT ENOUGH INFORMATION" => VerificationColor::Grey,
        _ => VerificationColor::Grey,
    }
}
