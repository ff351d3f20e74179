//! Transport error types

use std::time::Duration;

/// Errors that can occur while talking to the remote table store.
///
/// A transport error never poisons the session: a failed load leaves the
/// previously loaded snapshot in place, a failed save leaves the session dirty.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// HTTP error response from the store.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Error message (usually the response body).
        message: String,
    },

    /// The store refused a persist call.
    ///
    /// Carries both bodies so the failure can be diagnosed from the log.
    #[error("persist rejected with HTTP {status}: {response_body}")]
    PersistRejected {
        /// HTTP status code.
        status: u16,
        /// The JSON body that was sent.
        request_body: String,
        /// The raw body the store answered with.
        response_body: String,
    },

    /// Network error during the call.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Invalid endpoint URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The store does not know the requested table.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Failed to parse the store's response.
    #[error("Response parse error: {message}")]
    Parse {
        /// Description of the parse error.
        message: String,
        /// Raw response body, if available.
        body: Option<String>,
    },
}

impl ApiError {
    /// Creates a new HTTP error.
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Creates a new persist rejection.
    pub fn persist_rejected(
        status: u16,
        request_body: impl Into<String>,
        response_body: impl Into<String>,
    ) -> Self {
        Self::PersistRejected {
            status,
            request_body: request_body.into(),
            response_body: response_body.into(),
        }
    }

    /// Creates a new parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: None,
        }
    }

    /// Creates a new parse error with the raw response body.
    pub fn parse_with_body(message: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            body: Some(body.into()),
        }
    }

    /// Returns the HTTP status code if the store answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } | Self::PersistRejected { status, .. } => Some(*status),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns the raw response body, if one was captured.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::Http { message, .. } => Some(message),
            Self::PersistRejected { response_body, .. } => Some(response_body),
            Self::Parse { body, .. } => body.as_deref(),
            _ => None,
        }
    }

    /// Returns the request body of a rejected persist call.
    pub fn request_body(&self) -> Option<&str> {
        match self {
            Self::PersistRejected { request_body, .. } => Some(request_body),
            _ => None,
        }
    }
}
