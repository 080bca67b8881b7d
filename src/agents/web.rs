//! Web search handler.
//!
//! Produces a redirect hint pointing the UI at a search-results page
//! rather than fetching anything itself.

use super::{string_param, AgentResponse};

const SEARCH_URL: &str = "https://www.google.com/search";

pub fn handle(
    query_text: &str,
    parameters: &serde_json::Map<String, serde_json::Value>,
) -> AgentResponse {
    let term = string_param(parameters, "q")
        .or_else(|| string_param(parameters, "search-term"))
        .unwrap_or(query_text)
        .trim();

    if term.is_empty() {
        return AgentResponse::say("What would you like me to search for?");
    }

    let url = format!("{}?q={}", SEARCH_URL, urlencoding::encode(term));
    AgentResponse::say(format!("Here's what the web says about \"{}\".", term)).with_redirect(url)
}
