use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::LlmError;

/// Usage metadata for a chat response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Number of tokens in the prompt
    pub prompt_tokens: u32,
    /// Number of tokens in the completion
    pub completion_tokens: u32,
    /// Total number of tokens used
    pub total_tokens: u32,
}

/// Role of a participant in a chat conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    /// Instruction message that frames how the model should behave
    System,
    /// The user/human participant in the conversation
    User,
    /// The AI assistant participant in the conversation
    Assistant,
}

impl ChatRole {
    /// Wire name of the role as used by chat completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// The role of who sent this message
    pub role: ChatRole,
    /// The text content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new builder for a system message
    pub fn system() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::System)
    }

    /// Create a new builder for a user message
    pub fn user() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::User)
    }

    /// Create a new builder for an assistant message
    pub fn assistant() -> ChatMessageBuilder {
        ChatMessageBuilder::new(ChatRole::Assistant)
    }
}

/// Builder for ChatMessage
#[derive(Debug)]
pub struct ChatMessageBuilder {
    role: ChatRole,
    content: String,
}

impl ChatMessageBuilder {
    /// Create a new ChatMessageBuilder with specified role
    pub fn new(role: ChatRole) -> Self {
        Self {
            role,
            content: String::new(),
        }
    }

    /// Set the message content
    pub fn content<S: Into<String>>(mut self, content: S) -> Self {
        self.content = content.into();
        self
    }

    /// Build the ChatMessage
    pub fn build(self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content,
        }
    }
}

/// Defines rules for structured output responses based on
/// [OpenAI's structured output requirements](https://platform.openai.com/docs/api-reference/chat/create#chat-create-response_format).
/// Individual providers may translate this into their own wire format.
///
/// If you plan on deserializing into this struct, make sure the source text
/// has a `"name"` field, since that's technically the only thing required by
/// OpenAI.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StructuredOutputFormat {
    /// Name of the schema
    pub name: String,
    /// The description of the schema
    pub description: Option<String>,
    /// The JSON schema for the structured output
    pub schema: Option<Value>,
    /// Whether to enable strict schema adherence
    pub strict: Option<bool>,
}

/// Generation parameters for a single chat call.
///
/// All fields are optional; unset fields fall back to the client defaults,
/// and ultimately to whatever the provider does on its own. Defaults are
/// merged field-wise via [`ChatOptions::merged_with`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatOptions {
    /// Model identifier to use for this call
    pub model: Option<String>,
    /// Maximum length of the generated reply
    pub max_tokens: Option<u32>,
    /// Sampling temperature (lower = factual, higher = creative)
    pub temperature: Option<f32>,
    /// Top-p (nucleus) sampling parameter
    pub top_p: Option<f32>,
    /// Penalty on repeated words or phrases in the response
    pub frequency_penalty: Option<f32>,
    /// Penalty that encourages the model to introduce new topics
    pub presence_penalty: Option<f32>,
    /// Schema constraining the response to a structured JSON shape
    pub response_schema: Option<StructuredOutputFormat>,
}

impl ChatOptions {
    /// Creates an empty set of options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the maximum number of tokens to generate.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the sampling temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Sets the top-p (nucleus) sampling parameter.
    pub fn top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    /// Sets the frequency penalty.
    pub fn frequency_penalty(mut self, frequency_penalty: f32) -> Self {
        self.frequency_penalty = Some(frequency_penalty);
        self
    }

    /// Sets the presence penalty.
    pub fn presence_penalty(mut self, presence_penalty: f32) -> Self {
        self.presence_penalty = Some(presence_penalty);
        self
    }

    /// Sets the structured output schema.
    pub fn response_schema(mut self, schema: StructuredOutputFormat) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Merges these options with a set of defaults, field by field.
    ///
    /// A field set on `self` wins over the same field in `defaults`.
    pub fn merged_with(&self, defaults: &ChatOptions) -> ChatOptions {
        ChatOptions {
            model: self.model.clone().or_else(|| defaults.model.clone()),
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
            frequency_penalty: self.frequency_penalty.or(defaults.frequency_penalty),
            presence_penalty: self.presence_penalty.or(defaults.presence_penalty),
            response_schema: self
                .response_schema
                .clone()
                .or_else(|| defaults.response_schema.clone()),
        }
    }
}

/// A reply from a chat provider.
pub trait ChatResponse: fmt::Debug + fmt::Display {
    /// Text content of the reply, if any
    fn text(&self) -> Option<String>;

    /// Token usage metadata, if the provider reported it
    fn usage(&self) -> Option<Usage> {
        None
    }
}

/// Trait for providers that support chat-style interactions.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Sends a chat request to the provider with a sequence of messages.
    ///
    /// # Arguments
    ///
    /// * `messages` - The conversation as a slice of chat messages
    ///
    /// # Returns
    ///
    /// The provider's response or an error
    async fn chat(&self, messages: &[ChatMessage]) -> Result<Box<dyn ChatResponse>, LlmError> {
        self.chat_with_options(messages, None).await
    }

    /// Sends a chat request with per-call generation parameters.
    ///
    /// # Arguments
    ///
    /// * `messages` - The conversation as a slice of chat messages
    /// * `options` - Optional generation parameters overriding provider defaults
    ///
    /// # Returns
    ///
    /// The provider's response or an error
    async fn chat_with_options(
        &self,
        messages: &[ChatMessage],
        options: Option<&ChatOptions>,
    ) -> Result<Box<dyn ChatResponse>, LlmError>;
}
