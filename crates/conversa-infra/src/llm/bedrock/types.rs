//! AWS Bedrock request/response wire types.
//!
//! Bedrock speaks the Claude Messages API JSON format with two differences
//! from the direct Anthropic API:
//! - The `model` field is omitted from the request body (it goes in the URL path).
//! - An `anthropic_version` field is required in the request body.
//!
//! Streaming responses wrap each event in `{"bytes":"<base64>"}`; the
//! decoded payload is the same JSON as Anthropic SSE `data:` lines. The
//! payload types for those inner events live here too.

use serde::{Deserialize, Serialize};

/// A message as sent on the wire (role as a plain string).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WireMessage {
    pub role: String,
    pub content: String,
}

/// Request body for Bedrock `invoke` / `invoke-with-response-stream`.
#[derive(Debug, Clone, Serialize)]
pub struct BedrockRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// Token usage as reported on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// One block of response content. Only text blocks carry chat output.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Non-streaming response body from `invoke`.
#[derive(Debug, Clone, Deserialize)]
pub struct NonStreamResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: WireUsage,
}

/// A single chunk in the Bedrock event stream.
///
/// Bedrock wraps each SSE-equivalent event inside `{"bytes":"<base64>"}`.
#[derive(Debug, Clone, Deserialize)]
pub struct BedrockStreamChunk {
    pub bytes: String,
}

// --- Inner streaming event payloads (Anthropic SSE JSON) ---

#[derive(Debug, Clone, Deserialize)]
pub struct MessageStartPayload {
    pub message: MessageStart,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageStart {
    pub id: String,
    pub model: String,
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlockStartPayload {
    pub index: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlockDeltaPayload {
    pub index: u32,
    pub delta: Delta,
}

/// Delta within a content block. Non-text deltas are skipped.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlockStopPayload {
    pub index: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeltaPayload {
    pub delta: MessageDeltaInner,
    #[serde(default)]
    pub usage: WireUsage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageDeltaInner {
    pub stop_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorPayload {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}
