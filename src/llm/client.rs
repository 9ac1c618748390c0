//! Chat-completion gateway.
//!
//! [`ChatGateway`] is the single outbound dependency of the orchestration
//! core. It accepts role-tagged messages plus sampling parameters, returns
//! plain generated text, and surfaces every failure as an [`LlmError`] so
//! callers can degrade instead of crash.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::provider::ProviderKind;
use crate::error::LlmError;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// A message in a conversation with an LLM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message sender (e.g., "system", "user", "assistant").
    pub role: String,
    /// Content of the message.
    pub content: String,
}

impl Message {
    /// Create a new system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    /// Create a new user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    /// Create a new assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Request for text generation.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// Conversation messages, system instructions first.
    pub messages: Vec<Message>,
    /// Sampling temperature. `None` leaves the backend default.
    pub temperature: Option<f64>,
    /// Maximum number of tokens to generate. `None` leaves the backend
    /// default.
    pub max_tokens: Option<u32>,
}

impl GenerationRequest {
    /// Create a new generation request with default sampling parameters.
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the temperature for this request.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the max tokens for this request.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Trait for backends that can generate text.
///
/// The debate driver, persona synthesizer, and analyzers all depend on this
/// trait rather than a concrete client, which is what makes them testable
/// with scripted providers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate text for the given request.
    ///
    /// Implementations must return [`LlmError::EmptyResponse`] for a
    /// whitespace-only result so callers can treat "answered with nothing"
    /// the same as any other generation failure.
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError>;

    /// Sends a minimal fixed exchange and reports whether a non-empty result
    /// came back. Content correctness is not checked.
    async fn test_connection(&self) -> bool {
        let request = GenerationRequest::new(vec![
            Message::system("Reply with OK and nothing else."),
            Message::user("Connection test"),
        ]);
        self.generate(request).await.is_ok()
    }
}

/// Error response body in the OpenAI-compatible shape.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

/// Error detail from the API.
#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Gateway over one chat-completion backend.
///
/// Holds the HTTP client, the provider variant, and connection settings.
/// Besides transport, its one piece of content logic is collapsing
/// immediately-repeated identical lines, which defends against models that
/// echo their own output.
pub struct ChatGateway {
    /// HTTP client for making API requests.
    client: Client,
    /// Which backend variant shapes requests and responses.
    kind: ProviderKind,
    /// Full chat endpoint URL.
    endpoint: String,
    /// Optional bearer token.
    api_key: Option<String>,
    /// Model identifier, where the backend needs one.
    model: Option<String>,
}

impl ChatGateway {
    /// Creates a gateway for the given provider with its default endpoint
    /// and model.
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client - system TLS configuration error"),
            kind,
            endpoint: kind.default_endpoint().to_string(),
            api_key: None,
            model: kind.default_model().map(|m| m.to_string()),
        }
    }

    /// Overrides the chat endpoint URL.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Sets the bearer token sent with each request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Overrides the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Returns the provider variant.
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Returns the chat endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Drops lines that verbatim repeat the previously kept line.
///
/// Comparison trims surrounding whitespace; the kept line keeps its original
/// form.
fn collapse_repeated_lines(content: &str) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for line in content.lines() {
        if kept.last().is_none_or(|prev| prev.trim() != line.trim()) {
            kept.push(line);
        }
    }
    kept.join("\n")
}

#[async_trait]
impl LlmProvider for ChatGateway {
    async fn generate(&self, request: GenerationRequest) -> Result<String, LlmError> {
        let body = self.kind.request_body(
            self.model.as_deref(),
            &request.messages,
            request.temperature.unwrap_or(0.8),
            request.max_tokens,
        );

        let mut http_request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");

        if let Some(ref api_key) = self.api_key {
            http_request = http_request.header("Authorization", format!("Bearer {}", api_key));
        }

        let http_response = http_request.json(&body).send().await.map_err(|e| {
            if e.is_connect() {
                LlmError::ConnectionFailed(e.to_string())
            } else {
                LlmError::RequestFailed(e.to_string())
            }
        })?;

        let status = http_response.status();

        if !status.is_success() {
            let status_code = status.as_u16();
            let error_text = http_response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());

            // Prefer the structured message when the body parses.
            if let Ok(error_response) = serde_json::from_str::<ApiErrorResponse>(&error_text) {
                return Err(LlmError::ApiError {
                    code: status_code,
                    message: error_response.error.message,
                });
            }

            return Err(LlmError::ApiError {
                code: status_code,
                message: error_text,
            });
        }

        let response_body: serde_json::Value = http_response
            .json()
            .await
            .map_err(|e| LlmError::ParseError(format!("Failed to parse API response: {}", e)))?;

        let content = self
            .kind
            .extract_content(&response_body)
            .ok_or_else(|| LlmError::ParseError("Response is missing message content".to_string()))?;

        let content = content.trim();
        if content.is_empty() {
            return Err(LlmError::EmptyResponse);
        }

        tracing::debug!(
            provider = %self.kind,
            chars = content.len(),
            "Received generation response"
        );

        Ok(collapse_repeated_lines(content))
    }
}
