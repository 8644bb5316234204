//! OpenAI API client implementation for chat functionality.
//!
//! This module provides integration with OpenAI's GPT models through their
//! chat completions API.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};

use crate::chat::{
    ChatMessage, ChatOptions, ChatProvider, ChatResponse, StructuredOutputFormat, Usage,
};
use crate::error::LlmError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Client for interacting with OpenAI's chat completions API.
pub struct OpenAi {
    pub api_key: String,
    pub base_url: Url,
    pub system: Option<String>,
    pub timeout_seconds: Option<u64>,
    client: Client,
}

impl OpenAi {
    /// Creates a new OpenAI client.
    ///
    /// # Arguments
    /// * `api_key` - Bearer token for the OpenAI API
    /// * `base_url` - Override for the API base URL (proxies, Azure-style gateways)
    /// * `system` - Optional system prompt prepended to every conversation
    /// * `timeout_seconds` - Optional per-request timeout
    pub fn new(
        api_key: impl Into<String>,
        base_url: Option<String>,
        system: Option<String>,
        timeout_seconds: Option<u64>,
    ) -> Result<Self, LlmError> {
        let mut builder = Client::builder();
        if let Some(sec) = timeout_seconds {
            builder = builder.timeout(std::time::Duration::from_secs(sec));
        }

        Ok(Self {
            api_key: api_key.into(),
            base_url: Url::parse(base_url.as_deref().unwrap_or(DEFAULT_BASE_URL))
                .map_err(|e| LlmError::InvalidRequest(format!("invalid base URL: {e}")))?,
            system,
            timeout_seconds,
            client: builder
                .build()
                .map_err(|e| LlmError::HttpError(e.to_string()))?,
        })
    }
}

/// Individual message in an OpenAI chat request.
#[derive(Serialize, Debug)]
struct OpenAiChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Request payload for OpenAI's chat completions endpoint.
#[derive(Serialize, Debug)]
struct OpenAiChatRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAiChatMessage<'a>>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Deserialize, Debug, Serialize)]
enum ResponseType {
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "json_schema")]
    JsonSchema,
    #[serde(rename = "json_object")]
    JsonObject,
}

#[derive(Deserialize, Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    response_type: ResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    json_schema: Option<StructuredOutputFormat>,
}

impl From<StructuredOutputFormat> for ResponseFormat {
    fn from(structured_response_format: StructuredOutputFormat) -> Self {
        // OpenAI requires additionalProperties: false on json_schema objects
        match structured_response_format.schema {
            None => ResponseFormat {
                response_type: ResponseType::JsonSchema,
                json_schema: Some(structured_response_format),
            },
            Some(mut schema) => {
                if schema.get("additionalProperties").is_none() {
                    schema["additionalProperties"] = serde_json::json!(false);
                }

                ResponseFormat {
                    response_type: ResponseType::JsonSchema,
                    json_schema: Some(StructuredOutputFormat {
                        name: structured_response_format.name,
                        description: structured_response_format.description,
                        schema: Some(schema),
                        strict: structured_response_format.strict,
                    }),
                }
            }
        }
    }
}

/// Response from OpenAI's chat completions endpoint.
#[derive(Deserialize, Debug)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChatChoice {
    message: OpenAiChatMsg,
}

#[derive(Deserialize, Debug)]
struct OpenAiChatMsg {
    content: Option<String>,
}

impl std::fmt::Display for OpenAiChatResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.text().unwrap_or_default())
    }
}

impl ChatResponse for OpenAiChatResponse {
    fn text(&self) -> Option<String> {
        self.choices.first().and_then(|c| c.message.content.clone())
    }

    fn usage(&self) -> Option<Usage> {
        self.usage.clone()
    }
}

#[async_trait]
impl ChatProvider for OpenAi {
    async fn chat_with_options(
        &self,
        messages: &[ChatMessage],
        options: Option<&ChatOptions>,
    ) -> Result<Box<dyn ChatResponse>, LlmError> {
        if self.api_key.is_empty() {
            return Err(LlmError::AuthError("Missing OpenAI API key".to_string()));
        }

        let mut openai_msgs: Vec<OpenAiChatMessage> = Vec::with_capacity(messages.len() + 1);
        if let Some(system) = &self.system {
            openai_msgs.push(OpenAiChatMessage {
                role: "system",
                content: system,
            });
        }
        for msg in messages {
            openai_msgs.push(OpenAiChatMessage {
                role: msg.role.as_str(),
                content: &msg.content,
            });
        }

        let default_options = ChatOptions::default();
        let options = options.unwrap_or(&default_options);

        let body = OpenAiChatRequest {
            model: options.model.as_deref().unwrap_or(DEFAULT_MODEL),
            messages: openai_msgs,
            stream: false,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            top_p: options.top_p,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
            response_format: options.response_schema.clone().map(Into::into),
        };

        let url = self
            .base_url
            .join("chat/completions")
            .map_err(|e| LlmError::HttpError(e.to_string()))?;

        if log::log_enabled!(log::Level::Trace) {
            if let Ok(json) = serde_json::to_string(&body) {
                log::trace!("OpenAI request payload: {json}");
            }
        }

        let mut request = self.client.post(url).bearer_auth(&self.api_key).json(&body);

        if let Some(timeout) = self.timeout_seconds {
            request = request.timeout(std::time::Duration::from_secs(timeout));
        }

        let response = request.send().await?;

        log::debug!("OpenAI HTTP status: {}", response.status());

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(LlmError::ResponseFormatError {
                message: format!("OpenAI API returned error status: {status}"),
                raw_response: error_text,
            });
        }

        let resp_text = response.text().await?;
        match serde_json::from_str::<OpenAiChatResponse>(&resp_text) {
            Ok(response) => Ok(Box::new(response)),
            Err(e) => Err(LlmError::ResponseFormatError {
                message: format!("Failed to decode OpenAI API response: {e}"),
                raw_response: resp_text,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_skips_unset_options() {
        let body = OpenAiChatRequest {
            model: "gpt-4o",
            messages: vec![OpenAiChatMessage {
                role: "user",
                content: "hi",
            }],
            stream: false,
            max_tokens: None,
            temperature: Some(0.5),
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
            response_format: None,
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "gpt-4o");
        assert_eq!(value["temperature"], 0.5);
        assert!(value.get("max_tokens").is_none());
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn response_format_injects_additional_properties() {
        let format = StructuredOutputFormat {
            name: "Answer".to_string(),
            description: None,
            schema: Some(json!({
                "type": "object",
                "properties": {"title": {"type": "string"}},
                "required": ["title"]
            })),
            strict: Some(true),
        };
        let response_format: ResponseFormat = format.into();
        let schema = response_format.json_schema.unwrap().schema.unwrap();
        assert_eq!(schema["additionalProperties"], json!(false));
    }

    #[test]
    fn parses_chat_response_with_usage() {
        let raw = r#"{
            "choices": [{"message": {"role": "assistant", "content": "hello"}}],
            "usage": {"prompt_tokens": 2, "completion_tokens": 3, "total_tokens": 5}
        }"#;
        let resp: OpenAiChatResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(resp.text().as_deref(), Some("hello"));
        assert_eq!(resp.usage().unwrap().total_tokens, 5);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = OpenAi::new("sk-test", Some("not a url".to_string()), None, None)
            .err()
            .unwrap();
        assert!(matches!(err, LlmError::InvalidRequest(_)));
    }
}
