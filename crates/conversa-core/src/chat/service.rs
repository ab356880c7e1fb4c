//! Chat service orchestrating conversation memory and model invocation.
//!
//! Each turn: read the session's retained history, build a completion
//! request (fixed system prompt + history + the new user message), invoke
//! the provider, and commit the exchange to the store after the response
//! completes cleanly.
//!
//! Commit policy on failure: nothing. If the provider errors before or
//! during streaming, neither the user message nor the partial assistant
//! text reaches the store, so history is exactly as it was before the
//! failed turn and the alternation invariant cannot be corrupted by a
//! truncated reply. The same holds when the consumer drops the stream
//! mid-turn (client disconnect): the orchestrator stream is pull-based,
//! so dropping it stops pulling from the provider and abandons the turn.

use std::pin::Pin;
use std::sync::Arc;

use futures_util::{Stream, StreamExt};
use tracing::{debug, warn};
use uuid::Uuid;

use conversa_types::config::AppConfig;
use conversa_types::llm::{CompletionRequest, LlmError, Message, StreamEvent};

use crate::conversation::ConversationStore;
use crate::llm::LlmProvider;

/// Per-turn request parameters, derived from [`AppConfig`].
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub system_prompt: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl From<&AppConfig> for ChatConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            system_prompt: config.system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// Orchestrates chat turns against a model provider.
///
/// Generic over the provider so any backend (Bedrock, a local server, a
/// test mock) can be substituted. Explicitly constructed and owned by the
/// application.
pub struct ChatService<P: LlmProvider> {
    provider: Arc<P>,
    store: Arc<ConversationStore>,
    config: ChatConfig,
}

impl<P: LlmProvider + 'static> ChatService<P> {
    pub fn new(provider: Arc<P>, store: Arc<ConversationStore>, config: ChatConfig) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    /// Access the conversation store.
    pub fn store(&self) -> &Arc<ConversationStore> {
        &self.store
    }

    /// Stream one chat turn as text fragments.
    ///
    /// Fragments are forwarded as soon as the provider produces them, in
    /// order, while the full reply accumulates. Once the provider signals
    /// completion, the user message and the accumulated assistant message
    /// are committed to the store as one exchange. A provider error is
    /// yielded as the final item and nothing is committed.
    pub fn stream_message(
        &self,
        session_id: Uuid,
        user_text: String,
    ) -> Pin<Box<dyn Stream<Item = Result<String, LlmError>> + Send + 'static>> {
        let provider = Arc::clone(&self.provider);
        let store = Arc::clone(&self.store);
        let config = self.config.clone();

        Box::pin(async_stream::stream! {
            let history = store.history(&session_id).await;
            let request = build_request(&config, &history, &user_text, true);

            let mut events = provider.stream(request);
            let mut full_response = String::new();
            let mut completed = false;

            while let Some(event) = events.next().await {
                match event {
                    Ok(StreamEvent::TextDelta { text, .. }) => {
                        full_response.push_str(&text);
                        yield Ok(text);
                    }
                    Ok(StreamEvent::Done) => {
                        completed = true;
                        break;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(session_id = %session_id, error = %e, "provider stream failed, discarding turn");
                        yield Err(e);
                        return;
                    }
                }
            }

            if completed && !full_response.is_empty() {
                debug!(
                    session_id = %session_id,
                    chars = full_response.len(),
                    "committing completed exchange"
                );
                store
                    .append_exchange(
                        session_id,
                        Message::user(user_text),
                        Message::assistant(full_response),
                    )
                    .await;
            }
        })
    }

    /// Run one chat turn to completion and return the full reply.
    ///
    /// Provider failure surfaces as an error rather than an empty string,
    /// so callers can distinguish "no response" from "empty answer".
    /// Nothing is committed on failure.
    pub async fn send_message(
        &self,
        session_id: Uuid,
        user_text: &str,
    ) -> Result<String, LlmError> {
        let history = self.store.history(&session_id).await;
        let request = build_request(&self.config, &history, user_text, false);

        let response = self.provider.complete(&request).await?;

        self.store
            .append_exchange(
                session_id,
                Message::user(user_text),
                Message::assistant(response.content.clone()),
            )
            .await;

        Ok(response.content)
    }

    /// Drop all retained history for a session.
    pub async fn clear_conversation(&self, session_id: &Uuid) {
        self.store.clear(session_id).await;
    }
}

/// Assemble the completion request: system prompt, retained history, then
/// the new user message.
fn build_request(
    config: &ChatConfig,
    history: &[Message],
    user_text: &str,
    stream: bool,
) -> CompletionRequest {
    let mut messages = Vec::with_capacity(history.len() + 1);
    messages.extend_from_slice(history);
    messages.push(Message::user(user_text));

    CompletionRequest {
        model: config.model.clone(),
        messages,
        system: Some(config.system_prompt.clone()),
        max_tokens: config.max_tokens,
        temperature: Some(config.temperature),
        stream,
    }
}
