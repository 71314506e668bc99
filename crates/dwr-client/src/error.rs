//! DWR client errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DwrError {
    #[error("Invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClientBuild(#[source] reqwest::Error),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Could not find session ID in response body")]
    SessionTokenNotFound,

    #[error("DWR client not initialized")]
    NotInitialized,
}

impl DwrError {
    /// Whether the error prevented the client from being constructed.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::InvalidBaseUrl { .. } | Self::HttpClientBuild(_))
    }
}
