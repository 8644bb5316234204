//! Builder module for configuring and instantiating chat clients.
//!
//! Provides a fluent interface for selecting a backend provider and setting
//! connection details plus the application-wide default generation options.

use crate::chat::{ChatOptions, StructuredOutputFormat};
use crate::client::ChatClient;
use crate::error::LlmError;

/// Supported chat backend providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatBackend {
    /// OpenAI API provider (GPT models)
    OpenAI,
    /// Ollama local LLM provider for self-hosted models
    Ollama,
}

/// Implements string parsing for the ChatBackend enum.
///
/// The parsing is case-insensitive.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use chat_relay::builder::ChatBackend;
///
/// let backend = ChatBackend::from_str("openai").unwrap();
/// assert!(matches!(backend, ChatBackend::OpenAI));
///
/// let err = ChatBackend::from_str("invalid").unwrap_err();
/// assert!(err.to_string().contains("Unknown chat backend"));
/// ```
impl std::str::FromStr for ChatBackend {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(ChatBackend::OpenAI),
            "ollama" => Ok(ChatBackend::Ollama),
            _ => Err(LlmError::InvalidRequest(format!(
                "Unknown chat backend: {s}"
            ))),
        }
    }
}

/// Builder for configuring and instantiating a [`ChatClient`].
#[derive(Default)]
pub struct ChatClientBuilder {
    /// Selected backend provider
    backend: Option<ChatBackend>,
    /// API key for authentication with the provider
    api_key: Option<String>,
    /// Base URL for API requests (primarily for self-hosted instances)
    base_url: Option<String>,
    /// System prompt/context to guide model behavior
    system: Option<String>,
    /// Request timeout duration in seconds
    timeout_seconds: Option<u64>,
    /// Default generation options applied to every call
    defaults: ChatOptions,
}

impl ChatClientBuilder {
    /// Creates a new empty builder instance with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the backend provider to use.
    pub fn backend(mut self, backend: ChatBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the API key for authentication.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the base URL for API requests.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the default model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.defaults.model = Some(model.into());
        self
    }

    /// Sets the default maximum number of tokens to generate.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.defaults.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the default sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.defaults.temperature = Some(temperature);
        self
    }

    /// Sets the default top-p (nucleus) sampling parameter.
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.defaults.top_p = Some(top_p);
        self
    }

    /// Sets the default frequency penalty.
    pub fn frequency_penalty(mut self, frequency_penalty: f32) -> Self {
        self.defaults.frequency_penalty = Some(frequency_penalty);
        self
    }

    /// Sets the default presence penalty.
    pub fn presence_penalty(mut self, presence_penalty: f32) -> Self {
        self.defaults.presence_penalty = Some(presence_penalty);
        self
    }

    /// Sets a default structured output schema.
    pub fn response_schema(mut self, schema: StructuredOutputFormat) -> Self {
        self.defaults.response_schema = Some(schema);
        self
    }

    /// Sets the system prompt/context.
    pub fn system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Sets the request timeout in seconds.
    pub fn timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Builds the chat client with the configured backend.
    ///
    /// # Errors
    ///
    /// Returns an error if no backend was selected, the backend's cargo
    /// feature is disabled, or the provider rejects the configuration.
    pub fn build(self) -> Result<ChatClient, LlmError> {
        let backend = self
            .backend
            .ok_or_else(|| LlmError::InvalidRequest("No backend specified".to_string()))?;

        match backend {
            ChatBackend::OpenAI => {
                #[cfg(feature = "openai")]
                {
                    let provider = crate::backends::openai::OpenAi::new(
                        self.api_key.unwrap_or_default(),
                        self.base_url,
                        self.system,
                        self.timeout_seconds,
                    )?;
                    Ok(ChatClient::with_defaults(Box::new(provider), self.defaults))
                }
                #[cfg(not(feature = "openai"))]
                {
                    Err(LlmError::InvalidRequest(
                        "OpenAI feature not enabled".to_string(),
                    ))
                }
            }
            ChatBackend::Ollama => {
                #[cfg(feature = "ollama")]
                {
                    let provider = crate::backends::ollama::Ollama::new(
                        self.base_url,
                        self.system,
                        self.timeout_seconds,
                    )?;
                    Ok(ChatClient::with_defaults(Box::new(provider), self.defaults))
                }
                #[cfg(not(feature = "ollama"))]
                {
                    Err(LlmError::InvalidRequest(
                        "Ollama feature not enabled".to_string(),
                    ))
                }
            }
        }
    }
}
