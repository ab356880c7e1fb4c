//! Configuration loader for Conversa.
//!
//! Reads an optional `conversa.toml` and deserializes it into [`AppConfig`],
//! falling back to defaults when the file is missing or malformed, then
//! applies environment variable overrides (env wins over file).
//!
//! Recognized variables:
//! - `CONVERSA_MODEL` — target Claude model identifier
//! - `AWS_REGION` — Bedrock Runtime region
//! - `CONVERSA_SYSTEM_PROMPT` — fixed system prompt
//! - `CONVERSA_MAX_TOKENS` / `CONVERSA_TEMPERATURE` — generation settings
//! - `CONVERSA_MEMORY_WINDOW` — retained messages per conversation
//! - `CONVERSA_IDLE_EXPIRY_SECS` — idle time before a conversation is evicted
//! - `CONVERSA_MAX_SESSIONS` — cap on concurrently tracked sessions
//!
//! The Bedrock bearer token (`BEDROCK_API_KEY`) is read separately by the
//! binary so it can be wrapped in `SecretString` immediately.

use std::path::Path;

use conversa_types::config::AppConfig;

/// Load configuration from `path`, then layer environment overrides on top.
///
/// - Missing file: defaults.
/// - Unreadable or unparseable file: warning, then defaults.
pub async fn load_config(path: &Path) -> AppConfig {
    let mut config = match tokio::fs::read_to_string(path).await {
        Ok(content) => match toml::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
                AppConfig::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config file at {}, using defaults", path.display());
            AppConfig::default()
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            AppConfig::default()
        }
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok());
    config
}

/// Apply overrides from a key lookup (the environment in production).
///
/// Values that fail to parse are ignored with a warning rather than
/// aborting startup.
pub fn apply_overrides(config: &mut AppConfig, get: impl Fn(&str) -> Option<String>) {
    if let Some(model) = get("CONVERSA_MODEL") {
        config.model = model;
    }
    if let Some(region) = get("AWS_REGION") {
        config.region = region;
    }
    if let Some(prompt) = get("CONVERSA_SYSTEM_PROMPT") {
        config.system_prompt = prompt;
    }
    set_parsed(&get, "CONVERSA_MAX_TOKENS", &mut config.max_tokens);
    set_parsed(&get, "CONVERSA_TEMPERATURE", &mut config.temperature);
    set_parsed(&get, "CONVERSA_MEMORY_WINDOW", &mut config.memory_window);
    set_parsed(
        &get,
        "CONVERSA_IDLE_EXPIRY_SECS",
        &mut config.idle_expiry_secs,
    );
    set_parsed(&get, "CONVERSA_MAX_SESSIONS", &mut config.max_sessions);
}

fn set_parsed<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) {
    if let Some(raw) = get(key) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Ignoring unparseable {key}={raw}"),
        }
    }
}
