//! Conversation recall handler.
//!
//! Searches the user's recorded turns for a keyword and hands the matches
//! back as a display payload, in the shape the conversation view renders.

use serde::Serialize;

use super::{string_param, AgentResponse};
use crate::history::{ConversationStore, TurnRecord};
use crate::storage::StoreError;

/// Display payload for a keyword lookup.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct KeywordDisplay<'a> {
    keyword: &'a str,
    conversation_pairs: Vec<TurnRecord>,
}

pub async fn handle(
    store: &dyn ConversationStore,
    user_id: &str,
    parameters: &serde_json::Map<String, serde_json::Value>,
) -> Result<AgentResponse, StoreError> {
    let Some(keyword) = string_param(parameters, "keyword") else {
        return Ok(AgentResponse::say("What would you like me to look for?"));
    };

    let matches = store.find_keyword(user_id, &keyword.to_lowercase()).await?;
    if matches.is_empty() {
        return Ok(AgentResponse::say(format!(
            "Sorry, there were no results matching the keyword \"{}.\"",
            keyword
        )));
    }

    let display = KeywordDisplay {
        keyword,
        conversation_pairs: matches,
    };
    Ok(AgentResponse::say(format!(
        "Here are all the results including the keyword \"{}.\"",
        keyword
    ))
    .with_display(serde_json::to_string(&display)?))
}
