//! Application configuration types for Conversa.
//!
//! `AppConfig` represents the top-level `conversa.toml` that controls the
//! target model, memory window, and conversation cache retention. All fields
//! have sensible defaults so an empty file (or no file) is valid.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the Conversa service.
///
/// Loaded from `conversa.toml` with environment variable overrides applied
/// afterwards (env wins). See `conversa-infra::config` for the loader.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Target Claude model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// AWS region for the Bedrock Runtime endpoint.
    #[serde(default = "default_region")]
    pub region: String,

    /// Fixed system prompt prepended to every completion request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Maximum tokens the model may generate per turn.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f64,

    /// Maximum messages retained per conversation (oldest evicted first).
    #[serde(default = "default_memory_window")]
    pub memory_window: usize,

    /// Seconds since last access after which a conversation is evicted.
    #[serde(default = "default_idle_expiry_secs")]
    pub idle_expiry_secs: u64,

    /// Maximum concurrently tracked sessions (least-recently-accessed
    /// evicted beyond this cap).
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant. Keep answers concise and accurate.".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_temperature() -> f64 {
    0.7
}

fn default_memory_window() -> usize {
    20
}

fn default_idle_expiry_secs() -> u64 {
    30 * 60
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            region: default_region(),
            system_prompt: default_system_prompt(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            memory_window: default_memory_window(),
            idle_expiry_secs: default_idle_expiry_secs(),
            max_sessions: default_max_sessions(),
        }
    }
}
