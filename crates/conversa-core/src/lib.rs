//! Business logic for Conversa.
//!
//! Three pieces compose into the chat pipeline:
//!
//! - [`conversation::ConversationStore`] — session-scoped, bounded message
//!   history with idle eviction. The store exclusively owns all conversation
//!   data; nothing else retains a mutable copy.
//! - [`llm::provider::LlmProvider`] — the seam behind which any concrete
//!   model backend lives. Implementations are in conversa-infra; this crate
//!   never depends on them.
//! - [`chat::ChatService`] — the orchestrator tying the two together:
//!   history in, fragments out, commit after a clean completion.

pub mod chat;
pub mod conversation;
pub mod llm;
