//! REST gateway binary.
//!
//! Reads its configuration from the environment, builds a chat client with
//! application-wide default options and serves the chat endpoints.
//!
//! Environment variables:
//! - `CHAT_RELAY_BACKEND` - "openai" (default) or "ollama"
//! - `OPENAI_API_KEY` - API key when the OpenAI backend is selected
//! - `CHAT_RELAY_MODEL` - model override (default "gpt-4o")
//! - `CHAT_RELAY_BASE_URL` - provider base URL override
//! - `CHAT_RELAY_ADDR` - bind address (default "127.0.0.1:3000")
//! - `CHAT_RELAY_AUTH_KEY` - optional bearer token required from clients

use std::str::FromStr;

use chat_relay::api::Server;
use chat_relay::builder::{ChatBackend, ChatClientBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    chat_relay::init_logging();

    let backend = ChatBackend::from_str(
        &std::env::var("CHAT_RELAY_BACKEND").unwrap_or_else(|_| "openai".to_string()),
    )?;

    let mut builder = ChatClientBuilder::new()
        .backend(backend)
        .model(std::env::var("CHAT_RELAY_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()))
        .max_tokens(300)
        .temperature(0.5)
        .frequency_penalty(0.2)
        .presence_penalty(0.1)
        .top_p(1.0)
        .timeout_seconds(120);

    if let Ok(key) = std::env::var("OPENAI_API_KEY") {
        builder = builder.api_key(key);
    }
    if let Ok(url) = std::env::var("CHAT_RELAY_BASE_URL") {
        builder = builder.base_url(url);
    }

    let client = builder.build()?;

    let mut server = Server::new(client);
    if let Ok(key) = std::env::var("CHAT_RELAY_AUTH_KEY") {
        server = server.with_auth_key(key);
    }

    let addr = std::env::var("CHAT_RELAY_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    server.run(&addr).await?;
    Ok(())
}
