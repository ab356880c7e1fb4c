//! Application state wiring all services together.
//!
//! `AppState` is generic over the model provider so handlers can be
//! exercised with a mock in tests; the binary pins it to the concrete
//! Bedrock implementation via [`ConcreteAppState`]. Everything is
//! explicitly constructed and owned here -- no ambient globals. Process
//! exit discards all conversation data.

use std::sync::Arc;
use std::time::Duration;

use conversa_core::chat::{ChatConfig, ChatService};
use conversa_core::conversation::{ConversationStore, SessionManager};
use conversa_core::llm::LlmProvider;
use conversa_infra::llm::bedrock::BedrockProvider;
use conversa_types::config::AppConfig;

/// State pinned to the Bedrock provider, as used by the binary.
pub type ConcreteAppState = AppState<BedrockProvider>;

/// Shared application state holding all services.
pub struct AppState<P: LlmProvider> {
    pub chat: Arc<ChatService<P>>,
    pub sessions: SessionManager,
}

// Manual impl: `#[derive(Clone)]` would require `P: Clone`.
impl<P: LlmProvider> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            chat: Arc::clone(&self.chat),
            sessions: self.sessions,
        }
    }
}

impl<P: LlmProvider + 'static> AppState<P> {
    /// Wire the conversation store and chat service around a provider.
    ///
    /// The returned store handle is for spawning the eviction sweeper;
    /// the service holds its own reference.
    pub fn new(provider: Arc<P>, config: &AppConfig) -> (Self, Arc<ConversationStore>) {
        let store = Arc::new(ConversationStore::new(
            config.memory_window,
            Duration::from_secs(config.idle_expiry_secs),
            config.max_sessions,
        ));
        let chat = Arc::new(ChatService::new(
            provider,
            Arc::clone(&store),
            ChatConfig::from(config),
        ));

        (
            Self {
                chat,
                sessions: SessionManager::new(),
            },
            store,
        )
    }
}
