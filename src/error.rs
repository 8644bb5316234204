use std::fmt;

/// Error types that can occur when talking to an LLM provider or mapping
/// its output.
#[derive(Debug)]
pub enum LlmError {
    /// HTTP request/response errors
    HttpError(String),
    /// Authentication and authorization errors
    AuthError(String),
    /// Invalid request parameters or format
    InvalidRequest(String),
    /// Errors returned by the LLM provider
    ProviderError(String),
    /// JSON serialization/deserialization errors
    JsonError(String),
    /// The provider replied, but the body could not be decoded or mapped
    ResponseFormatError {
        message: String,
        raw_response: String,
    },
    /// Catch-all for errors that fit no other variant
    Generic(String),
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmError::HttpError(e) => write!(f, "HTTP Error: {e}"),
            LlmError::AuthError(e) => write!(f, "Auth Error: {e}"),
            LlmError::InvalidRequest(e) => write!(f, "Invalid Request: {e}"),
            LlmError::ProviderError(e) => write!(f, "Provider Error: {e}"),
            LlmError::JsonError(e) => write!(f, "JSON Parse Error: {e}"),
            LlmError::ResponseFormatError {
                message,
                raw_response,
            } => write!(f, "Response Format Error: {message} (raw: {raw_response})"),
            LlmError::Generic(e) => write!(f, "Error: {e}"),
        }
    }
}

impl std::error::Error for LlmError {}

/// Converts reqwest HTTP errors into LlmErrors
impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        LlmError::HttpError(err.to_string())
    }
}

/// Converts serde_json errors into LlmErrors
impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::JsonError(err.to_string())
    }
}
