use thiserror::Error;

/// Errors raised by an [`HttpTransport`](super::HttpTransport) before a
/// response status is available.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum TransportError {
    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Error building the request
    #[error("Build error: {0}")]
    BuildError(String),

    /// Error executing the request
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// Timeout error
    #[error("Timeout error: {0}")]
    Timeout(String),

    /// Body could not be read from the wire
    #[error("Body error: {0}")]
    BodyError(String),

    /// Invocation was cancelled before or during dispatch
    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_builder() {
            Self::BuildError(err.to_string())
        } else if err.is_body() || err.is_decode() {
            Self::BodyError(err.to_string())
        } else {
            Self::RequestFailed(err.to_string())
        }
    }
}
