//! Errors surfaced by the collaborator clients.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("malformed provider response: {0}")]
    Malformed(String),
    #[error("routing provider returned no usable routes")]
    NoRoutes,
    #[error("missing API key: {0}")]
    MissingApiKey(&'static str),
}

/// Decode a JSON response body, surfacing structural problems as
/// [`ProviderError::Malformed`] rather than a transport error.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(body: &str) -> Result<T, ProviderError> {
    serde_json::from_str(body).map_err(|err| ProviderError::Malformed(err.to_string()))
}
