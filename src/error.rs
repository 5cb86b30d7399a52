//! Error taxonomy for the client core.

use thiserror::Error;

/// Failures surfaced by the request engine and the services built on it.
///
/// A lookup that resolves zero entities is not an error; those operations
/// return `Ok(None)` or an empty collection instead.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// The request deadline elapsed before a response was obtained.
    #[error("request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Transport failure before a response was obtained. Not retried here;
    /// retry policy belongs to the caller.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response from the content API, status preserved for
    /// caller-side branching.
    #[error("api error: {status} {status_text}")]
    Api { status: u16, status_text: String },

    /// The rate accountant rejected the call before network dispatch.
    #[error("monthly request quota of {limit} exhausted")]
    QuotaExceeded { limit: u64 },

    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Network(err)
        }
    }

    /// True when the error came from the API with the given status code.
    pub fn is_status(&self, status: u16) -> bool {
        matches!(self, Self::Api { status: s, .. } if *s == status)
    }
}
