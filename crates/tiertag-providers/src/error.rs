//! Error types for provider clients and normalizers

use std::fmt;

/// Errors that can occur when fetching or normalizing a provider response
#[derive(Debug)]
pub enum ProviderError {
    /// HTTP request failed
    Http(reqwest::Error),
    /// Failed to parse JSON response
    Json(serde_json::Error),
    /// Response parsed as JSON but violated the provider's schema
    Schema(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http(e) => write!(f, "Provider HTTP error: {}", e),
            Self::Json(e) => write!(f, "Provider JSON parse error: {}", e),
            Self::Schema(msg) => write!(f, "Provider schema error: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Schema(_) => None,
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Result type for provider operations
pub type Result<T> = std::result::Result<T, ProviderError>;
