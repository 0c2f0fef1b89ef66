use std::fmt;

use serde_json::Value as JsonValue;

/// Error type returned by this crate.
///
/// Every failed request attempt is classified into exactly one variant.
/// Only [`MondayError::Network`] and [`MondayError::RateLimited`] are retried.
#[derive(Debug, thiserror::Error)]
pub enum MondayError {
    /// The API rejected the token (HTTP 401).
    #[error("authentication failed: invalid API token")]
    Authentication,
    /// The API answered HTTP 429.
    #[error("rate limit exceeded, retry after {retry_after}s")]
    RateLimited {
        /// Suggested wait in seconds, from the `Retry-After` header.
        retry_after: u64,
    },
    /// The query exceeded the account's complexity budget.
    #[error("query complexity too high: {0}")]
    Complexity(String),
    /// Timeout, connection or other transport failure.
    #[error("network error: {0}")]
    Network(String),
    /// Non-success HTTP status, undecodable body or GraphQL `errors`.
    #[error("api error: {message}")]
    Api {
        /// Human readable error text.
        message: String,
        /// HTTP status, when the failure came from the status line.
        status: Option<u16>,
        /// Raw response payload for diagnostics.
        raw: Option<JsonValue>,
    },
    /// Input rejected on the client side before or after talking to the API.
    #[error("validation error: {0}")]
    Validation(String),
}

/// Tag of a [`MondayError`], used for retry decisions and reporting.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorKind {
    Authentication,
    RateLimited,
    Complexity,
    Network,
    Api,
    Validation,
}

impl ErrorKind {
    /// Whether an error of this kind may succeed if the request is repeated.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network | Self::RateLimited)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Authentication => "authentication",
            Self::RateLimited => "rate_limited",
            Self::Complexity => "complexity",
            Self::Network => "network",
            Self::Api => "api",
            Self::Validation => "validation",
        };
        f.write_str(name)
    }
}

impl MondayError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication => ErrorKind::Authentication,
            Self::RateLimited { .. } => ErrorKind::RateLimited,
            Self::Complexity(_) => ErrorKind::Complexity,
            Self::Network(_) => ErrorKind::Network,
            Self::Api { .. } => ErrorKind::Api,
            Self::Validation(_) => ErrorKind::Validation,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    pub(crate) fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
            status: None,
            raw: None,
        }
    }
}
