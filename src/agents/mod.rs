//! Agent handlers - one per conversational domain.
//!
//! Each handler turns a detected intent plus its parameters into an
//! [`AgentResponse`]. The paginated book-search handler lives in
//! [`crate::books`]; everything here is a one-shot handler with no state
//! beyond what the conversation history store provides.

pub mod clock;
pub mod memory;
pub mod name;
pub mod tip;
pub mod web;

use serde::{Deserialize, Serialize};

/// Reply produced by an agent for one conversational turn.
///
/// Absent display/redirect are modeled as `None`, never as sentinel
/// strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentResponse {
    /// The textual reply spoken/shown to the user.
    pub fulfillment: String,
    /// Optional structured payload (JSON string) for the UI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Optional UI redirect hint (a URL).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
}

impl AgentResponse {
    pub fn say(fulfillment: impl Into<String>) -> Self {
        Self {
            fulfillment: fulfillment.into(),
            display: None,
            redirect: None,
        }
    }

    pub fn with_display(mut self, payload: impl Into<String>) -> Self {
        self.display = Some(payload.into());
        self
    }

    pub fn with_redirect(mut self, url: impl Into<String>) -> Self {
        self.redirect = Some(url.into());
        self
    }
}

/// Read a string-valued parameter, treating blank values as absent.
pub(crate) fn string_param<'a>(
    parameters: &'a serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<&'a str> {
    parameters
        .get(key)
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

/// Read a numeric parameter. Dialogflow-style NLU services deliver
/// numbers as JSON numbers but occasionally as numeric strings.
pub(crate) fn number_param(
    parameters: &serde_json::Map<String, serde_json::Value>,
    key: &str,
) -> Option<f64> {
    match parameters.get(key)? {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
