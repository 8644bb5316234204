//! chat-relay is a small chat-client library plus a REST gateway for calling
//! LLM chat APIs from a web application.
//!
//! # Overview
//! The crate provides a provider-agnostic [`client::ChatClient`] with a
//! fluent call API and forwards prompts to a configured backend. It supports:
//!
//! - Direct prompt calls returning plain text
//! - Structured replies mapped into typed values via JSON schemas
//! - Prompt templates and system+user template composition
//! - Application-wide default generation options with per-call overrides
//! - Multiple backends (OpenAI, Ollama) behind cargo features
//! - A REST server (`api` feature) exposing all of the above over HTTP
//!
//! # Example
//! ```no_run
//! use chat_relay::builder::{ChatBackend, ChatClientBuilder};
//!
//! # async fn demo() -> Result<(), chat_relay::error::LlmError> {
//! let client = ChatClientBuilder::new()
//!     .backend(ChatBackend::OpenAI)
//!     .api_key(std::env::var("OPENAI_API_KEY").unwrap_or_default())
//!     .model("gpt-4o")
//!     .max_tokens(300)
//!     .temperature(0.5)
//!     .build()?;
//!
//! let reply = client.prompt("Tell me about the borrow checker").call().await?;
//! println!("{}", reply.content());
//! # Ok(())
//! # }
//! ```

// Re-export for convenience
pub use async_trait::async_trait;

/// Backend implementations for supported chat providers
pub mod backends;

/// Builder pattern for configuring and instantiating chat clients
pub mod builder;

/// Chat messages, options and provider abstractions
pub mod chat;

/// High-level chat client with the fluent call API
pub mod client;

/// Error types and handling
pub mod error;

/// Prompt templates with named placeholder substitution
pub mod template;

#[cfg(feature = "api")]
pub mod api;

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
/// This is a no-op if the feature is not enabled.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::try_init();
    }
}
