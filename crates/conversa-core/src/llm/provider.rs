//! LlmProvider trait definition.
//!
//! This is the core abstraction behind which the one genuinely external
//! dependency (the hosted model API) lives. Exactly two operations matter:
//! a blocking completion and a streaming completion. Uses RPITIT for
//! `complete` and `Pin<Box<dyn Stream>>` for `stream` so concrete backends
//! (Bedrock, a local model server, a test mock) can be substituted freely.

use std::pin::Pin;

use futures_util::Stream;

use conversa_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StreamEvent,
};

/// Trait for model provider backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition) for
/// `complete`. The `stream` method returns a boxed stream: the sequence is
/// finite and not restartable, and may terminate early with an error item.
///
/// Implementations live in conversa-infra (e.g. `BedrockProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "bedrock").
    fn name(&self) -> &str;

    /// What this provider supports (streaming, token limits).
    fn capabilities(&self) -> &ProviderCapabilities;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;

    /// Send a streaming completion request. Returns a stream of events.
    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;
}
