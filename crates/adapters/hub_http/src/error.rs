//! HTTP hub adapter error types.

use homebutler_domain::error::HubError;

/// Errors specific to the HTTP hub adapter.
#[derive(Debug, thiserror::Error)]
pub enum HttpHubError {
    /// The HTTP client could not be built (TLS backend, invalid options).
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),

    /// The request never got an answer (DNS, connect, timeout, body read).
    #[error("request to hub failed")]
    Transport(#[source] reqwest::Error),

    /// The hub answered with a non-success status.
    #[error("hub answered with {0}")]
    Status(reqwest::StatusCode),

    /// The response body is not the expected JSON.
    #[error("failed to decode hub response")]
    Decode(#[source] serde_json::Error),
}

impl HttpHubError {
    /// Convert into a [`HubError`] for propagation across the port boundary.
    pub fn into_domain(self) -> HubError {
        match self {
            Self::Status(status) => HubError::Status(status.as_u16()),
            Self::Decode(err) => HubError::Decode(Box::new(err)),
            other => HubError::Unreachable(Box::new(other)),
        }
    }
}

impl From<HttpHubError> for HubError {
    fn from(err: HttpHubError) -> Self {
        err.into_domain()
    }
}
