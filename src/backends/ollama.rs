//! Ollama API client implementation for chat functionality.
//!
//! This module provides integration with Ollama's local LLM server through
//! its native `/api/chat` endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chat::{ChatMessage, ChatOptions, ChatProvider, ChatResponse, Usage};
use crate::error::LlmError;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_MODEL: &str = "llama3.1";

/// Client for interacting with Ollama's API.
pub struct Ollama {
    pub base_url: String,
    pub system: Option<String>,
    pub timeout_seconds: Option<u64>,
    client: Client,
}

impl Ollama {
    /// Creates a new Ollama client.
    ///
    /// # Arguments
    /// * `base_url` - Override for the server URL (defaults to the local daemon)
    /// * `system` - Optional system prompt prepended to every conversation
    /// * `timeout_seconds` - Optional per-request timeout
    pub fn new(
        base_url: Option<String>,
        system: Option<String>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }

        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            system,
            timeout_seconds,
            client: builder
                .build()
                .map_err(|e| LlmError::HttpError(e.to_string()))?,
        })
    }
}

/// Individual message in an Ollama chat conversation.
#[derive(Serialize, Debug)]
struct OllamaChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Model options map within an Ollama chat request.
#[derive(Serialize, Debug)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
}

/// Request payload for Ollama's chat API endpoint.
#[derive(Serialize, Debug)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: Vec<OllamaChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
    /// Structured output: a JSON schema object constraining the reply
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<Value>,
}

/// Message content within an Ollama chat API response.
#[derive(Deserialize, Debug)]
struct OllamaChatResponseMessage {
    content: String,
}

/// Response from Ollama's chat API endpoint.
#[derive(Deserialize, Debug)]
struct OllamaChatResponse {
    message: Option<OllamaChatResponseMessage>,
    prompt_eval_count: Option<u32>,
    eval_count: Option<u32>,
}

impl std::fmt::Display for OllamaChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text().unwrap_or_default())
    }
}

impl ChatResponse for OllamaChatResponse {
    fn text(&self) -> Option<String> {
        self.message.as_ref().map(|m| m.content.clone())
    }

    fn usage(&self) -> Option<Usage> {
        match (self.prompt_eval_count, self.eval_count) {
            (Some(prompt), Some(completion)) => Some(Usage {
                prompt_tokens: prompt,
                completion_tokens: completion,
                total_tokens: prompt + completion,
            }),
            _ => None,
        }
    }
}

#[async_trait]
impl ChatProvider for Ollama {
    async fn chat_with_options(
        &self,
        messages: &[ChatMessage],
        options: Option<&ChatOptions>,
    ) -> Result<Box<dyn ChatResponse>, LlmError> {
        let mut ollama_msgs: Vec<OllamaChatMessage> = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = &self.system {
            ollama_msgs.push(OllamaChatMessage {
                role: "system",
                content: system,
            });
        }
        for msg in messages {
            ollama_msgs.push(OllamaChatMessage {
                role: msg.role.as_str(),
                content: &msg.content,
            });
        }

        let default_options = ChatOptions::default();
        let options = options.unwrap_or(&default_options);

        let request_options = OllamaOptions {
            num_predict: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
        };

        // Ollama takes the bare schema object, falling back to plain JSON
        // mode when the schema body is absent.
        let format = options
            .response_schema
            .as_ref()
            .map(|s| s.schema.clone().unwrap_or_else(|| Value::String("json".to_string())));

        let body = OllamaChatRequest {
            model: options.model.as_deref().unwrap_or(DEFAULT_MODEL),
            messages: ollama_msgs,
            stream: false,
            options: Some(request_options),
            format,
        };

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("Ollama request payload: {json}");
            }
        }

        let url = format!("{}/api/chat", self.base_url);
        let mut request = self.client.post(&url).json(&body);

        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let response = request.send().await?;

        log::debug!("Ollama HTTP status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(LlmError::ResponseFormatError {
                message: format!("Ollama API returned error status: {status}"),
                raw_response: error_text,
            });
        }

        let resp_text = response.text().await?;
        match serde_json::from_str::<OllamaChatResponse>(&resp_text) {
            Ok(response) => Ok(Box::new(response)),
            Err(e) => Err(LlmError::ResponseFormatError {
                message: format!("Failed to decode Ollama API response: {e}"),
                raw_response: resp_text,
            }),
        }
    }
}
