//! Intent dispatch: from a detected intent to a finished turn.
//!
//! The NLU layer (external) detects an intent like `"books.search"` and
//! extracts parameters. This module splits the dotted name into an agent
//! and an intent, routes to the matching handler through a closed enum
//! (no string dispatch past the boundary), and assembles the final
//! [`TurnOutput`]. Intents nobody claims fall back to the NLU's own
//! fulfillment text.

use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::agents::{self, AgentResponse};
use crate::books::{BooksAgent, BooksError, BooksIntent};
use crate::history::ConversationStore;
use crate::storage::StoreError;

/// Shown when neither an agent nor the NLU produced anything usable.
const REPROMPT: &str = "Can you repeat that?";

/// One detected turn, as supplied by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct IntentRequest {
    /// Stable per-user identifier (scopes all stored state).
    pub user_id: String,
    /// Dotted intent name from the NLU, e.g. `"books.search"`.
    pub intent: String,
    /// The raw utterance as the NLU heard it.
    pub query_text: String,
    /// Structured parameters extracted by the NLU.
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,
    /// The NLU's own canned fulfillment, used when no agent claims the
    /// intent.
    #[serde(default)]
    pub fallback_fulfillment: Option<String>,
}

/// The finished turn, serialized for the display layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnOutput {
    pub user_input: String,
    pub fulfillment_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    pub intent: String,
}

/// The closed set of agents this backend dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Books,
    Tip,
    Time,
    Date,
    Name,
    Web,
    Memory,
}

impl AgentKind {
    /// Map the agent half of a dotted intent name. `calculator` is the
    /// NLU-side name for the tip calculator.
    fn parse(agent: &str) -> Option<Self> {
        match agent {
            "books" => Some(Self::Books),
            "calculator" => Some(Self::Tip),
            "time" => Some(Self::Time),
            "date" => Some(Self::Date),
            "name" => Some(Self::Name),
            "web" => Some(Self::Web),
            "memory" => Some(Self::Memory),
            _ => None,
        }
    }
}

/// Errors from dispatching a turn.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Books(#[from] BooksError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Routes each turn to its agent and records the exchange.
pub struct Dispatcher {
    books: BooksAgent,
    history: Arc<dyn ConversationStore>,
}

impl Dispatcher {
    pub fn new(books: BooksAgent, history: Arc<dyn ConversationStore>) -> Self {
        Self { books, history }
    }

    /// Handle one conversational turn.
    ///
    /// Turns for the same user are read-modify-write against the stores
    /// and must be serialized by the caller.
    pub async fn handle(&self, request: IntentRequest) -> Result<TurnOutput, DispatchError> {
        let (agent_name, intent_name) = split_intent(&request.intent);
        tracing::info!(
            "Dispatching intent {} for user {}",
            request.intent,
            request.user_id
        );

        let response = match AgentKind::parse(agent_name) {
            Some(kind) => self.run_agent(kind, intent_name, &request).await?,
            None => None,
        };

        let response = response.unwrap_or_else(|| {
            AgentResponse::say(request.fallback_fulfillment.clone().unwrap_or_default())
        });
        let fulfillment = if response.fulfillment.trim().is_empty() {
            REPROMPT.to_string()
        } else {
            response.fulfillment
        };

        let user_input = if request.query_text.is_empty() {
            " (null) ".to_string()
        } else {
            request.query_text.clone()
        };

        // History is best-effort; a failed write should not lose the reply.
        if let Err(e) = self
            .history
            .record(&request.user_id, &user_input, &fulfillment)
            .await
        {
            tracing::warn!("Failed to record turn for user {}: {}", request.user_id, e);
        }

        Ok(TurnOutput {
            user_input,
            fulfillment_text: fulfillment,
            display: response.display,
            redirect: response.redirect,
            intent: request.intent,
        })
    }

    /// Run the matched agent. `Ok(None)` means the agent declined the
    /// intent and the NLU fallback should speak instead.
    async fn run_agent(
        &self,
        kind: AgentKind,
        intent_name: &str,
        request: &IntentRequest,
    ) -> Result<Option<AgentResponse>, DispatchError> {
        match kind {
            AgentKind::Books => match BooksIntent::from_str(intent_name) {
                Ok(intent) => {
                    let response = self
                        .books
                        .handle(
                            intent,
                            &request.user_id,
                            &request.query_text,
                            &request.parameters,
                        )
                        .await?;
                    Ok(Some(response))
                }
                // Unhandled books intents (e.g. "about") fall back.
                Err(_) => Ok(None),
            },
            AgentKind::Tip => Ok(Some(agents::tip::handle(&request.parameters))),
            AgentKind::Time => Ok(Some(agents::clock::handle_time())),
            AgentKind::Date => Ok(Some(agents::clock::handle_date())),
            AgentKind::Name => Ok(Some(agents::name::handle(&request.parameters))),
            AgentKind::Web => Ok(Some(agents::web::handle(
                &request.query_text,
                &request.parameters,
            ))),
            AgentKind::Memory => {
                if intent_name.contains("keyword") {
                    let response = agents::memory::handle(
                        self.history.as_ref(),
                        &request.user_id,
                        &request.parameters,
                    )
                    .await?;
                    Ok(Some(response))
                } else {
                    Ok(None)
                }
            }
        }
    }
}

/// Split `"books.search"` into `("books", "search")`. A name with no dot
/// is its own intent.
fn split_intent(detected: &str) -> (&str, &str) {
    match detected.split_once('.') {
        Some((agent, intent)) => (agent, intent),
        None => (detected, detected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::books::engine::testing::FakeProvider;
    use crate::books::store::{InMemoryResultStore, ResultStore};
    use crate::history::InMemoryConversationStore;
    use serde_json::json;

    fn dispatcher_with(provider: Arc<FakeProvider>) -> (Dispatcher, Arc<InMemoryConversationStore>) {
        let result_store = Arc::new(InMemoryResultStore::new());
        let history = Arc::new(InMemoryConversationStore::new());
        let books = BooksAgent::new(provider, result_store as Arc<dyn ResultStore>);
        (
            Dispatcher::new(books, Arc::clone(&history) as Arc<dyn ConversationStore>),
            history,
        )
    }

    fn request(intent: &str, query_text: &str) -> IntentRequest {
        IntentRequest {
            user_id: "user-1".to_string(),
            intent: intent.to_string(),
            query_text: query_text.to_string(),
            parameters: serde_json::Map::new(),
            fallback_fulfillment: None,
        }
    }

    #[test]
    fn intent_names_split_on_first_dot() {
        assert_eq!(split_intent("books.search"), ("books", "search"));
        assert_eq!(split_intent("name.user.change"), ("name", "user.change"));
        assert_eq!(split_intent("smalltalk"), ("smalltalk", "smalltalk"));
    }

    #[tokio::test]
    async fn books_search_turn_end_to_end() {
        let provider = FakeProvider::with_titles(12).shared();
        let (dispatcher, _) = dispatcher_with(provider);

        let output = dispatcher
            .handle(request("books.search", "find me space operas"))
            .await
            .unwrap();
        assert_eq!(output.fulfillment_text, "Here's what I found.");
        assert_eq!(output.user_input, "find me space operas");
        assert_eq!(output.intent, "books.search");
        assert!(output.display.unwrap().contains("Book 0"));
    }

    #[tokio::test]
    async fn tip_turn_matches_calculator_agent() {
        let provider = FakeProvider::with_titles(0).shared();
        let (dispatcher, _) = dispatcher_with(provider);

        let mut req = request("calculator.tips", "15 percent tip on 67.87 for 3");
        req.parameters = json!({
            "tip-percentage": "15%",
            "amount-without-tip": 67.87,
            "currency": "USD",
            "people-number": 3.0
        })
        .as_object()
        .unwrap()
        .clone();

        let output = dispatcher.handle(req).await.unwrap();
        assert_eq!(
            output.fulfillment_text,
            "The total tip is $10.18, coming out to $3.39 per person"
        );
    }

    #[tokio::test]
    async fn unknown_agent_uses_nlu_fallback() {
        let provider = FakeProvider::with_titles(0).shared();
        let (dispatcher, _) = dispatcher_with(provider);

        let mut req = request("smalltalk.greetings", "hello there");
        req.fallback_fulfillment = Some("Hi! How can I help?".to_string());
        let output = dispatcher.handle(req).await.unwrap();
        assert_eq!(output.fulfillment_text, "Hi! How can I help?");
    }

    #[tokio::test]
    async fn empty_fallback_becomes_reprompt() {
        let provider = FakeProvider::with_titles(0).shared();
        let (dispatcher, _) = dispatcher_with(provider);

        let output = dispatcher.handle(request("smalltalk.greetings", "")).await.unwrap();
        assert_eq!(output.fulfillment_text, REPROMPT);
        assert_eq!(output.user_input, " (null) ");
    }

    #[tokio::test]
    async fn unhandled_books_intent_falls_back() {
        let provider = FakeProvider::with_titles(12).shared();
        let (dispatcher, _) = dispatcher_with(provider);

        let mut req = request("books.about", "tell me about the first one");
        req.fallback_fulfillment = Some("I can't describe books yet.".to_string());
        let output = dispatcher.handle(req).await.unwrap();
        assert_eq!(output.fulfillment_text, "I can't describe books yet.");
    }

    #[tokio::test]
    async fn turns_are_recorded_and_recallable() {
        let provider = FakeProvider::with_titles(12).shared();
        let (dispatcher, history) = dispatcher_with(provider);

        dispatcher
            .handle(request("books.search", "find me dune"))
            .await
            .unwrap();

        let hits = history.find_keyword("user-1", "dune").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].user_input, "find me dune");

        // And the memory agent can surface it in a later turn.
        let mut req = request("memory.keyword", "what did I say about dune");
        req.parameters = json!({ "keyword": "dune" }).as_object().unwrap().clone();
        let output = dispatcher.handle(req).await.unwrap();
        assert_eq!(
            output.fulfillment_text,
            "Here are all the results including the keyword \"dune.\""
        );
        assert!(output.display.unwrap().contains("find me dune"));
    }

    #[tokio::test]
    async fn books_follow_up_pages_through_dispatcher() {
        let provider = FakeProvider::with_titles(12).shared();
        let (dispatcher, _) = dispatcher_with(provider);

        dispatcher
            .handle(request("books.search", "find me space operas"))
            .await
            .unwrap();
        let output = dispatcher
            .handle(request("books.more", "show me more"))
            .await
            .unwrap();
        assert_eq!(output.fulfillment_text, "Here's the next page of results");
        assert!(output.display.unwrap().contains("Book 5"));

        let output = dispatcher
            .handle(request("books.previous", "go back"))
            .await
            .unwrap();
        assert_eq!(output.fulfillment_text, "Here's the previous page of results");
        assert!(output.display.unwrap().contains("Book 0"));
    }
}
