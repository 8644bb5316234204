//! High-level chat client with a fluent call API.
//!
//! `ChatClient` wraps a boxed [`ChatProvider`] together with application-wide
//! default [`ChatOptions`]. Every call inherits the defaults unless the
//! request supplies its own overrides.

use serde::de::DeserializeOwned;

use crate::chat::{ChatMessage, ChatOptions, ChatProvider, StructuredOutputFormat, Usage};
use crate::error::LlmError;

/// Provider-agnostic entry point for chat calls.
pub struct ChatClient {
    provider: Box<dyn ChatProvider>,
    defaults: ChatOptions,
}

impl ChatClient {
    /// Creates a client with no default options.
    pub fn new(provider: Box<dyn ChatProvider>) -> Self {
        Self {
            provider,
            defaults: ChatOptions::default(),
        }
    }

    /// Creates a client with application-wide default options applied to
    /// every call unless overridden per prompt.
    pub fn with_defaults(provider: Box<dyn ChatProvider>, defaults: ChatOptions) -> Self {
        Self { provider, defaults }
    }

    /// The default options shared by every call through this client.
    pub fn defaults(&self) -> &ChatOptions {
        &self.defaults
    }

    /// Starts a request with a single user prompt.
    pub fn prompt(&self, text: impl Into<String>) -> PromptRequest<'_> {
        self.request().user(text)
    }

    /// Starts an empty request to be filled with the fluent API.
    pub fn request(&self) -> PromptRequest<'_> {
        PromptRequest {
            client: self,
            messages: Vec::new(),
            options: None,
        }
    }
}

/// In-flight chat request built with a fluent API.
///
/// ```no_run
/// # async fn demo(client: chat_relay::client::ChatClient) -> Result<(), chat_relay::error::LlmError> {
/// let reply = client
///     .request()
///     .system("Act as an expert in Rust")
///     .user("Tell me about ownership")
///     .call()
///     .await?;
/// println!("{}", reply.content());
/// # Ok(())
/// # }
/// ```
pub struct PromptRequest<'a> {
    client: &'a ChatClient,
    messages: Vec<ChatMessage>,
    options: Option<ChatOptions>,
}

impl PromptRequest<'_> {
    /// Appends a user message.
    pub fn user(mut self, text: impl Into<String>) -> Self {
        self.messages.push(ChatMessage::user().content(text).build());
        self
    }

    /// Appends a system message.
    pub fn system(mut self, text: impl Into<String>) -> Self {
        self.messages
            .push(ChatMessage::system().content(text).build());
        self
    }

    /// Appends a prebuilt message (e.g. from a rendered template).
    pub fn message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    /// Sets per-call generation options. These override the client defaults
    /// field by field for this request only. Options already set on the
    /// request (e.g. a schema) are kept unless the new options carry the
    /// same field.
    pub fn options(mut self, options: ChatOptions) -> Self {
        self.options = Some(match self.options.take() {
            Some(existing) => options.merged_with(&existing),
            None => options,
        });
        self
    }

    /// Constrains the reply to a structured JSON shape.
    pub fn schema(mut self, schema: StructuredOutputFormat) -> Self {
        let options = self.options.take().unwrap_or_default();
        self.options = Some(options.response_schema(schema));
        self
    }

    /// Executes the request against the underlying provider.
    pub async fn call(self) -> Result<CallResponse, LlmError> {
        if self.messages.is_empty() {
            return Err(LlmError::InvalidRequest(
                "prompt request has no messages".to_string(),
            ));
        }

        let merged = match &self.options {
            Some(options) => options.merged_with(&self.client.defaults),
            None => self.client.defaults.clone(),
        };

        let response = self
            .client
            .provider
            .chat_with_options(&self.messages, Some(&merged))
            .await?;

        let text = response
            .text()
            .ok_or_else(|| LlmError::ProviderError("provider returned no text".to_string()))?;

        Ok(CallResponse {
            text,
            usage: response.usage(),
        })
    }
}

/// The outcome of a chat call: reply text plus usage metadata.
#[derive(Debug, Clone)]
pub struct CallResponse {
    text: String,
    usage: Option<Usage>,
}

impl CallResponse {
    /// The raw text content of the reply.
    pub fn content(&self) -> &str {
        &self.text
    }

    /// Consumes the response, returning the reply text.
    pub fn into_content(self) -> String {
        self.text
    }

    /// Token usage reported by the provider, if any.
    pub fn usage(&self) -> Option<&Usage> {
        self.usage.as_ref()
    }

    /// Maps the reply into a typed value by parsing it as JSON.
    ///
    /// Models frequently wrap JSON replies in markdown code fences; those are
    /// stripped before parsing. Lists need no special treatment: use
    /// `entity::<Vec<T>>()`.
    ///
    /// # Errors
    ///
    /// Returns `LlmError::ResponseFormatError` carrying the raw reply when
    /// the text is not valid JSON for the target type.
    pub fn entity<T: DeserializeOwned>(&self) -> Result<T, LlmError> {
        serde_json::from_str(extract_json(&self.text)).map_err(|e| {
            LlmError::ResponseFormatError {
                message: format!("failed to map model reply: {e}"),
                raw_response: self.text.clone(),
            }
        })
    }
}

/// Strips a surrounding markdown code fence, if present, and returns the
/// JSON payload inside.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    let inner = if let Some(after) = trimmed.strip_prefix("```json") {
        after.split("```").next().unwrap_or(after)
    } else if let Some(after) = trimmed.strip_prefix("```") {
        after.split("```").next().unwrap_or(after)
    } else {
        trimmed
    };
    inner.trim()
}

#[cfg(test)]
mod tests {
    use std::fmt;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde::Deserialize;

    use super::*;
    use crate::chat::{ChatResponse, ChatRole};

    #[derive(Debug)]
    struct FixedResponse {
        text: String,
        usage: Option<Usage>,
    }

    impl fmt::Display for FixedResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "{}", self.text)
        }
    }

    impl ChatResponse for FixedResponse {
        fn text(&self) -> Option<String> {
            Some(self.text.clone())
        }

        fn usage(&self) -> Option<Usage> {
            self.usage.clone()
        }
    }

    /// Provider that replies with a fixed string and records what it saw.
    struct FixedProvider {
        reply: String,
        seen_messages: Mutex<Vec<ChatMessage>>,
        seen_options: Mutex<Option<ChatOptions>>,
    }

    impl FixedProvider {
        fn new(reply: &str) -> Self {
            Self {
                reply: reply.to_string(),
                seen_messages: Mutex::new(Vec::new()),
                seen_options: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for FixedProvider {
        async fn chat_with_options(
            &self,
            messages: &[ChatMessage],
            options: Option<&ChatOptions>,
        ) -> Result<Box<dyn ChatResponse>, LlmError> {
            *self.seen_messages.lock().unwrap() = messages.to_vec();
            *self.seen_options.lock().unwrap() = options.cloned();
            Ok(Box::new(FixedResponse {
                text: self.reply.clone(),
                usage: Some(Usage {
                    prompt_tokens: 3,
                    completion_tokens: 5,
                    total_tokens: 8,
                }),
            }))
        }
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Answer {
        title: String,
        content: String,
    }

    #[tokio::test]
    async fn call_passes_reply_through_unmodified() {
        let client = ChatClient::new(Box::new(FixedProvider::new("the reply")));
        let response = client.prompt("hi").call().await.unwrap();
        assert_eq!(response.content(), "the reply");
        assert_eq!(response.usage().unwrap().total_tokens, 8);
    }

    #[tokio::test]
    async fn call_without_messages_is_rejected() {
        let client = ChatClient::new(Box::new(FixedProvider::new("x")));
        assert!(matches!(
            client.request().call().await,
            Err(LlmError::InvalidRequest(_))
        ));
    }

    #[tokio::test]
    async fn defaults_reach_the_provider() {
        let provider = std::sync::Arc::new(FixedProvider::new("ok"));
        let defaults = ChatOptions::new().model("gpt-4o").max_tokens(300);
        let client = ChatClient::with_defaults(Box::new(SharedProvider(provider.clone())), defaults);

        let _ = client.prompt("hi").call().await.unwrap();

        let seen = provider.seen_options.lock().unwrap().clone().unwrap();
        assert_eq!(seen.model.as_deref(), Some("gpt-4o"));
        assert_eq!(seen.max_tokens, Some(300));
    }

    #[tokio::test]
    async fn per_call_options_override_defaults() {
        let defaults = ChatOptions::new().model("gpt-4o").temperature(0.5);
        let provider = std::sync::Arc::new(FixedProvider::new("ok"));
        let client = ChatClient::with_defaults(Box::new(SharedProvider(provider.clone())), defaults);

        let _ = client
            .prompt("hi")
            .options(ChatOptions::new().model("gpt-4o-mini"))
            .call()
            .await
            .unwrap();

        let seen = provider.seen_options.lock().unwrap().clone().unwrap();
        assert_eq!(seen.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(seen.temperature, Some(0.5));
    }

    /// Arc wrapper so a test can keep a handle on the provider it hands to
    /// the client.
    struct SharedProvider(std::sync::Arc<FixedProvider>);

    #[async_trait]
    impl ChatProvider for SharedProvider {
        async fn chat_with_options(
            &self,
            messages: &[ChatMessage],
            options: Option<&ChatOptions>,
        ) -> Result<Box<dyn ChatResponse>, LlmError> {
            self.0.chat_with_options(messages, options).await
        }
    }

    #[tokio::test]
    async fn options_after_schema_keep_the_schema() {
        let provider = std::sync::Arc::new(FixedProvider::new("ok"));
        let client = ChatClient::new(Box::new(SharedProvider(provider.clone())));
        let schema = StructuredOutputFormat {
            name: "Answer".to_string(),
            description: None,
            schema: None,
            strict: None,
        };

        let _ = client
            .prompt("hi")
            .schema(schema.clone())
            .options(ChatOptions::new().max_tokens(200))
            .call()
            .await
            .unwrap();

        let seen = provider.seen_options.lock().unwrap().clone().unwrap();
        assert_eq!(seen.response_schema, Some(schema));
        assert_eq!(seen.max_tokens, Some(200));
    }

    #[tokio::test]
    async fn system_and_user_messages_keep_insertion_order() {
        let provider = std::sync::Arc::new(FixedProvider::new("ok"));
        let client = ChatClient::new(Box::new(SharedProvider(provider.clone())));

        let _ = client
            .request()
            .system("Act as an expert")
            .user("Tell me things")
            .call()
            .await
            .unwrap();

        let seen = provider.seen_messages.lock().unwrap().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].role, ChatRole::System);
        assert_eq!(seen[1].role, ChatRole::User);
    }

    #[tokio::test]
    async fn entity_maps_plain_json() {
        let client = ChatClient::new(Box::new(FixedProvider::new(
            r#"{"title": "T", "content": "C"}"#,
        )));
        let answer: Answer = client.prompt("hi").call().await.unwrap().entity().unwrap();
        assert_eq!(
            answer,
            Answer {
                title: "T".to_string(),
                content: "C".to_string()
            }
        );
    }

    #[tokio::test]
    async fn entity_strips_code_fences() {
        let fenced = "```json\n[{\"title\": \"A\", \"content\": \"B\"}]\n```";
        let client = ChatClient::new(Box::new(FixedProvider::new(fenced)));
        let answers: Vec<Answer> = client.prompt("hi").call().await.unwrap().entity().unwrap();
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[0].title, "A");
    }

    #[tokio::test]
    async fn entity_failure_carries_raw_reply() {
        let client = ChatClient::new(Box::new(FixedProvider::new("not json at all")));
        let err = client
            .prompt("hi")
            .call()
            .await
            .unwrap()
            .entity::<Answer>()
            .unwrap_err();
        match err {
            LlmError::ResponseFormatError { raw_response, .. } => {
                assert_eq!(raw_response, "not json at all");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn extract_json_handles_bare_fences() {
        assert_eq!(extract_json("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("  {\"a\":1}  "), "{\"a\":1}");
    }
}
