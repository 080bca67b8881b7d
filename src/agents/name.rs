//! User (nick)name change handler.

use super::{string_param, AgentResponse};

/// Change what the assistant calls the user. The display payload carries
/// the new name so the UI can re-render its greeting.
pub fn handle(parameters: &serde_json::Map<String, serde_json::Value>) -> AgentResponse {
    let name = string_param(parameters, "nick-name")
        .or_else(|| string_param(parameters, "given-name"))
        .or_else(|| string_param(parameters, "name"));

    match name {
        Some(name) => AgentResponse::say(format!("Ok, I'll call you {} from now on.", name))
            .with_display(name),
        None => AgentResponse::say("What would you like me to call you?"),
    }
}
