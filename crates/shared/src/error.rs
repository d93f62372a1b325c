use serde::{Deserialize, Serialize};

pub const GENERIC_REQUEST_FAILURE: &str = "Network response was not ok";

/// Error body the fact-check backend sends alongside non-2xx statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub traceback: Option<String>,
}

impl ApiError {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            traceback: None,
        }
    }
}

/// Picks the user-facing reason out of a failed response body.
///
/// A JSON body with an `error` field wins, then the raw body text, then the
/// generic message.
pub fn failure_reason_from_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return GENERIC_REQUEST_FAILURE.to_string();
    }
    match serde_json::from_str::<ApiError>(trimmed) {
        Ok(api_error) if !api_error.error.trim().is_empty() => api_error.error,
        _ => trimmed.to_string(),
    }
}
