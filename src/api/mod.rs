//! REST server exposing the chat client over HTTP.
//!
//! All endpoints are `GET` with query parameters and delegate straight to
//! the shared [`ChatClient`]; failures from the provider or from mapping its
//! output surface as generic server errors. Supports optional bearer
//! authentication and permissive CORS.

mod handlers;
mod types;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use crate::client::ChatClient;
use crate::error::LlmError;

pub use types::{AiAnswer, AiAnswerList, ChatParams, TemplateParams};

/// REST server wrapping a shared chat client.
pub struct Server {
    client: Arc<ChatClient>,
    /// Optional authentication key for API requests
    pub auth_key: Option<String>,
}

/// Internal server state shared between request handlers
#[derive(Clone)]
struct ServerState {
    /// Shared chat client, default options included
    client: Arc<ChatClient>,
    /// Optional authentication key
    auth_key: Option<String>,
}

impl Server {
    /// Creates a new server instance around the given chat client.
    pub fn new(client: ChatClient) -> Self {
        Self {
            client: Arc::new(client),
            auth_key: None,
        }
    }

    /// Sets the authentication key required for API requests.
    ///
    /// # Arguments
    /// * `key` - API key that clients must provide in the Authorization header
    pub fn with_auth_key(mut self, key: impl Into<String>) -> Self {
        self.auth_key = Some(key.into());
        self
    }

    /// Builds the axum router with every chat endpoint registered.
    fn router(&self) -> Router {
        Router::new()
            .route("/api/v1/chat", get(handlers::chat))
            .route("/api/v1/chat/response", get(handlers::answer))
            .route("/api/v1/chat/responses", get(handlers::answer_list))
            .route("/api/v1/chat/tuned", get(handlers::tuned))
            .route("/api/v1/chat/template", get(handlers::template))
            .route("/api/v1/chat/expert", get(handlers::expert))
            .layer(CorsLayer::permissive())
            .with_state(ServerState {
                client: self.client.clone(),
                auth_key: self.auth_key.clone(),
            })
    }

    /// Starts the server and listens for requests on the specified address.
    ///
    /// # Arguments
    /// * `addr` - Address to bind to (e.g. "127.0.0.1:3000")
    pub async fn run(self, addr: &str) -> Result<(), LlmError> {
        let app = self.router();

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| LlmError::InvalidRequest(e.to_string()))?;

        log::info!("chat-relay listening on {addr}");

        axum::serve(listener, app)
            .await
            .map_err(|e| LlmError::InvalidRequest(e.to_string()))?;

        Ok(())
    }
}
