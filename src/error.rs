use thiserror::Error;

/// Fallback message used when neither the server nor the transport said anything useful
pub const FALLBACK_ERROR_MESSAGE: &str = "Request failed";

/// The single error shape that reaches callers of the API layer.
///
/// Network failures, timeouts and server-reported failures all collapse into a
/// human-readable message once they pass the response interceptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Source(#[from] ::config::ConfigError),

    #[error("Invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}
