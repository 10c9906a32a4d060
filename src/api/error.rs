use serde::Deserialize;
use thiserror::Error;

/// Error payload the service attaches to rejected requests.
///
/// Endpoints are inconsistent about which key they use, so both are kept and
/// callers pick the one their message table prefers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    /// Parse a response body, falling back to an empty payload for non-JSON bodies.
    pub fn parse(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.trim().is_empty())
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|m| !m.trim().is_empty())
    }
}

/// Errors from calls against the video service.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No response was received (DNS, connection, TLS, reset).
    #[error("Request failed: {0}")]
    Transport(#[source] reqwest::Error),
    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,
    /// The service answered with a 4xx or 5xx status.
    #[error("HTTP error: status {status}")]
    Server { status: u16, body: ErrorBody },
    /// A success response whose body did not match the expected shape.
    #[error("Invalid response body: {0}")]
    Decode(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Response too large")]
    ResponseTooLarge,
}

impl ApiError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Transport(err)
        }
    }

    /// HTTP status for server rejections.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&ErrorBody> {
        match self {
            ApiError::Server { body, .. } => Some(body),
            _ => None,
        }
    }

    /// True when the request never produced a response.
    pub fn is_no_response(&self) -> bool {
        matches!(self, ApiError::Transport(_) | ApiError::Timeout)
    }
}
