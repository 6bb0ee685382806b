//! Error types for the Dynatrace provider.

use thiserror::Error;

use crate::schema::Diagnostic;

/// Errors returned by the Dynatrace configuration API client.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connection, TLS, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The message from the API error envelope, or the raw body.
        message: String,
    },

    /// The API token was rejected.
    #[error("Invalid API token")]
    InvalidToken,

    /// A success response carried a body that did not match the model.
    #[error("Deserialization error: {message}")]
    Deserialization {
        /// The decoder's error text.
        message: String,
        /// The body as received.
        body: String,
    },

    /// A request URL could not be built.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    /// Returns `true` when the remote object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// Errors that can occur while serving a provider operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A configuration error occurred.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested resource type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// Invalid request from the framework.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A call to the Dynatrace API failed.
    #[error("{summary}: {source}")]
    Api {
        /// Names the failed operation, e.g. "Unable to create dynatrace_dashboard".
        summary: String,
        /// The underlying client error.
        #[source]
        source: ApiError,
    },
}

impl ProviderError {
    /// Wrap an API error with a summary of the failed operation.
    pub fn api(summary: impl Into<String>, source: ApiError) -> Self {
        Self::Api {
            summary: summary.into(),
            source,
        }
    }

    /// Get the error message as a string.
    ///
    /// For API errors this is the summary; the underlying error is available
    /// through [`std::error::Error::source`].
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration(msg) | Self::UnknownResource(msg) | Self::InvalidRequest(msg) => msg,
            Self::Api { summary, .. } => summary,
        }
    }

    /// Returns `true` when the remote object is gone, so the framework can
    /// drop it from state.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { source, .. } if source.is_not_found())
    }
}

impl From<ProviderError> for Diagnostic {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Api { summary, source } => {
                Diagnostic::error(summary).with_detail(source.to_string())
            },
            ProviderError::Configuration(msg) => {
                Diagnostic::error("Unable to create dynatrace client").with_detail(msg)
            },
            other => Diagnostic::error(other.to_string()),
        }
    }
}
