//! BedrockProvider -- concrete [`LlmProvider`] implementation for AWS Bedrock.
//!
//! Sends requests to the AWS Bedrock Runtime API using Bearer token
//! authentication. Supports both non-streaming (`invoke`) and streaming
//! (`invoke-with-response-stream`) modes.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::pin::Pin;
use std::time::Duration;

use futures_util::Stream;
use secrecy::{ExposeSecret, SecretString};

use conversa_core::llm::LlmProvider;
use conversa_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, ProviderCapabilities, StopReason, StreamEvent,
    Usage,
};

use super::streaming::create_bedrock_stream;
use super::types::{BedrockRequest, ContentBlock, NonStreamResponse, WireMessage};

/// AWS Bedrock Claude LLM provider.
pub struct BedrockProvider {
    client: reqwest::Client,
    api_key: SecretString,
    region: String,
    model_id: String,
    capabilities: ProviderCapabilities,
}

impl BedrockProvider {
    /// The Anthropic API version for Bedrock.
    const API_VERSION: &'static str = "bedrock-2023-05-31";

    /// Create a new Bedrock provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bedrock bearer token wrapped in SecretString.
    /// * `model` - Model identifier (e.g., "claude-sonnet-4-20250514").
    /// * `region` - AWS region (e.g., "us-east-1").
    pub fn new(api_key: SecretString, model: &str, region: &str) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            region: region.to_string(),
            model_id: Self::to_bedrock_model_id(model, region),
            capabilities: Self::capabilities_for_model(model),
        })
    }

    /// Convert a standard Claude model name to a Bedrock inference profile ID.
    ///
    /// Bedrock cross-region inference profiles use a region shorthand prefix
    /// (e.g., `eu.`, `us.`) before the model ID; the shorthand is the first
    /// dash-separated segment of the full region. Model names that already
    /// contain a `.` are treated as fully qualified and returned unchanged.
    ///
    /// ```text
    /// ("claude-sonnet-4-20250514", "eu-west-1") → "eu.anthropic.claude-sonnet-4-20250514-v1:0"
    /// ("anthropic.claude-sonnet-4-20250514-v1:0", _) → unchanged
    /// ```
    pub fn to_bedrock_model_id(model: &str, region: &str) -> String {
        if model.contains('.') {
            model.to_string()
        } else {
            let region_prefix = region.split('-').next().unwrap_or("us");
            format!("{region_prefix}.anthropic.{model}-v1:0")
        }
    }

    /// Determine capabilities based on model name.
    fn capabilities_for_model(model: &str) -> ProviderCapabilities {
        let max_output_tokens = if model.contains("opus") {
            32_000
        } else if model.contains("sonnet") || model.contains("haiku") {
            8_192
        } else {
            4_096
        };

        ProviderCapabilities {
            streaming: true,
            max_context_tokens: 200_000,
            max_output_tokens,
        }
    }

    /// Build the full Bedrock Runtime URL for a given action.
    fn url(&self, action: &str) -> String {
        format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{}/{}",
            self.region, self.model_id, action
        )
    }

    /// Convert a generic [`CompletionRequest`] into the Bedrock wire format.
    fn to_bedrock_request(&self, request: &CompletionRequest) -> BedrockRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| WireMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect();

        BedrockRequest {
            anthropic_version: Self::API_VERSION.to_string(),
            max_tokens: request.max_tokens,
            messages,
            system: request.system.clone(),
            temperature: request.temperature,
        }
    }

    /// Map a non-success HTTP status to an [`LlmError`].
    pub(super) fn error_for_status(status: reqwest::StatusCode, body: String) -> LlmError {
        match status.as_u16() {
            401 | 403 => LlmError::AuthenticationFailed,
            429 => LlmError::RateLimited {
                retry_after_ms: None,
            },
            529 => LlmError::Overloaded(body),
            s if s >= 500 => LlmError::Provider {
                message: format!("Bedrock server error HTTP {status}: {body}"),
            },
            _ => LlmError::Provider {
                message: format!("HTTP {status}: {body}"),
            },
        }
    }
}

// No Debug impl: the bearer token must never reach log output.

impl LlmProvider for BedrockProvider {
    fn name(&self) -> &str {
        "bedrock"
    }

    fn capabilities(&self) -> &ProviderCapabilities {
        &self.capabilities
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = self.to_bedrock_request(request);
        let url = self.url("invoke");

        tracing::debug!(url = %url, model_id = %self.model_id, region = %self.region, "Bedrock invoke request");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, url = %url, "Bedrock API error response");
            return Err(Self::error_for_status(status, error_body));
        }

        let bedrock_resp: NonStreamResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = bedrock_resp
            .content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let stop_reason = bedrock_resp
            .stop_reason
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(StopReason::EndTurn);

        Ok(CompletionResponse {
            id: bedrock_resp.id,
            content,
            model: bedrock_resp.model,
            stop_reason,
            usage: Usage {
                input_tokens: bedrock_resp.usage.input_tokens,
                output_tokens: bedrock_resp.usage.output_tokens,
            },
        })
    }

    fn stream(
        &self,
        request: CompletionRequest,
    ) -> Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>> {
        let body = self.to_bedrock_request(&request);
        let url = self.url("invoke-with-response-stream");

        create_bedrock_stream(&self.client, &url, body, &self.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conversa_types::llm::Message;

    fn make_provider() -> BedrockProvider {
        BedrockProvider::new(
            SecretString::from("test-not-real"),
            "claude-sonnet-4-20250514",
            "us-east-1",
        )
        .unwrap()
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(make_provider().name(), "bedrock");
    }

    #[test]
    fn test_model_id_mapping_regions() {
        assert_eq!(
            BedrockProvider::to_bedrock_model_id("claude-sonnet-4-20250514", "eu-west-1"),
            "eu.anthropic.claude-sonnet-4-20250514-v1:0"
        );
        assert_eq!(
            BedrockProvider::to_bedrock_model_id("claude-sonnet-4-20250514", "us-east-1"),
            "us.anthropic.claude-sonnet-4-20250514-v1:0"
        );
    }

    #[test]
    fn test_model_id_mapping_already_prefixed() {
        let id = "eu.anthropic.claude-sonnet-4-20250514-v1:0";
        assert_eq!(BedrockProvider::to_bedrock_model_id(id, "us-east-1"), id);
    }

    #[test]
    fn test_url_construction() {
        let provider = make_provider();
        assert_eq!(
            provider.url("invoke"),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/us.anthropic.claude-sonnet-4-20250514-v1:0/invoke"
        );
        assert_eq!(
            provider.url("invoke-with-response-stream"),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/us.anthropic.claude-sonnet-4-20250514-v1:0/invoke-with-response-stream"
        );
    }

    #[test]
    fn test_capabilities_by_model() {
        assert_eq!(make_provider().capabilities().max_output_tokens, 8_192);

        let opus = BedrockProvider::new(
            SecretString::from("test"),
            "claude-opus-4-20250514",
            "us-west-2",
        )
        .unwrap();
        assert_eq!(opus.capabilities().max_output_tokens, 32_000);
        assert!(opus.capabilities().streaming);
    }

    #[test]
    fn test_to_bedrock_request() {
        let provider = make_provider();
        let request = CompletionRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            messages: vec![Message::user("Hello")],
            system: Some("Be helpful".to_string()),
            max_tokens: 1024,
            temperature: Some(0.7),
            stream: false,
        };

        let bedrock_req = provider.to_bedrock_request(&request);
        assert_eq!(bedrock_req.anthropic_version, "bedrock-2023-05-31");
        assert_eq!(bedrock_req.max_tokens, 1024);
        assert_eq!(bedrock_req.messages.len(), 1);
        assert_eq!(bedrock_req.messages[0].role, "user");
        assert_eq!(bedrock_req.system.as_deref(), Some("Be helpful"));
    }

    #[test]
    fn test_error_for_status_mapping() {
        use reqwest::StatusCode;
        assert!(matches!(
            BedrockProvider::error_for_status(StatusCode::FORBIDDEN, String::new()),
            LlmError::AuthenticationFailed
        ));
        assert!(matches!(
            BedrockProvider::error_for_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            LlmError::RateLimited { .. }
        ));
        assert!(matches!(
            BedrockProvider::error_for_status(StatusCode::INTERNAL_SERVER_ERROR, String::new()),
            LlmError::Provider { .. }
        ));
    }
}
