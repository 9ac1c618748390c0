//! Backend variants for the chat gateway.
//!
//! The supported services are near-identical chat-completion APIs that
//! differ only in request shape and response path. Each variant supplies its
//! own body builder and content extractor; everything else lives in
//! [`super::client::ChatGateway`].

use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::client::Message;

/// The text-generation service a gateway talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Local LM Studio server (OpenAI-compatible, no model field required).
    LmStudio,
    /// OpenAI chat completions.
    OpenAi,
    /// Deepseek chat completions (OpenAI-compatible).
    Deepseek,
    /// Local Ollama server (distinct response shape).
    Ollama,
}

impl ProviderKind {
    /// Returns all supported providers.
    pub fn all() -> Vec<Self> {
        vec![Self::LmStudio, Self::OpenAi, Self::Deepseek, Self::Ollama]
    }

    /// Canonical lowercase name, as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::LmStudio => "lmstudio",
            Self::OpenAi => "openai",
            Self::Deepseek => "deepseek",
            Self::Ollama => "ollama",
        }
    }

    /// Default chat endpoint for this provider.
    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Self::LmStudio => "http://localhost:1234/v1/chat/completions",
            Self::OpenAi => "https://api.openai.com/v1/chat/completions",
            Self::Deepseek => "https://api.deepseek.com/v1/chat/completions",
            Self::Ollama => "http://localhost:11434/api/chat",
        }
    }

    /// Default model identifier, where the service needs one.
    ///
    /// LM Studio serves whatever model is loaded and ignores the field, so it
    /// gets none.
    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            Self::LmStudio => None,
            Self::OpenAi => Some("gpt-3.5-turbo"),
            Self::Deepseek => Some("deepseek-chat"),
            Self::Ollama => Some("llama3"),
        }
    }

    /// True when the service rejects unauthenticated requests.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::OpenAi | Self::Deepseek)
    }

    /// Builds the request body for this provider.
    pub fn request_body(
        &self,
        model: Option<&str>,
        messages: &[Message],
        temperature: f64,
        max_tokens: Option<u32>,
    ) -> Value {
        match self {
            // Ollama nests sampling parameters under "options" and has no
            // max_tokens equivalent in the chat body.
            Self::Ollama => json!({
                "model": model.unwrap_or("llama3"),
                "messages": messages,
                "options": { "temperature": temperature },
                "stream": false,
            }),
            _ => {
                let mut body = json!({
                    "messages": messages,
                    "temperature": temperature,
                    "stream": false,
                });
                if let Some(model) = model {
                    body["model"] = json!(model);
                }
                if let Some(max_tokens) = max_tokens {
                    body["max_tokens"] = json!(max_tokens);
                }
                body
            }
        }
    }

    /// Extracts the generated text from a successful response body.
    pub fn extract_content(&self, body: &Value) -> Option<String> {
        let openai_path = |body: &Value| {
            body.get("choices")?
                .get(0)?
                .get("message")?
                .get("content")?
                .as_str()
                .map(|s| s.to_string())
        };

        match self {
            // Ollama answers {"message": {"content": ...}}, but proxies in
            // front of it may answer in the OpenAI shape.
            Self::Ollama => body
                .get("message")
                .and_then(|m| m.get("content"))
                .and_then(|c| c.as_str())
                .map(|s| s.to_string())
                .or_else(|| openai_path(body)),
            _ => openai_path(body),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lmstudio" | "lm-studio" => Ok(Self::LmStudio),
            "openai" => Ok(Self::OpenAi),
            "deepseek" => Ok(Self::Deepseek),
            "ollama" => Ok(Self::Ollama),
            other => Err(format!(
                "unknown provider '{other}' (expected lmstudio, openai, deepseek, or ollama)"
            )),
        }
    }
}
