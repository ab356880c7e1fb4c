//! Shared domain types for Conversa.
//!
//! Pure data: serde models for LLM requests/responses and streaming events,
//! plus the application configuration. No IO, no async.

pub mod config;
pub mod llm;
