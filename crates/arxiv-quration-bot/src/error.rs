//! Error types for the bot.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.
//! [`ClientError`] covers the HTTP layer shared by every external API;
//! [`BotError`] is the run-level taxonomy that maps onto process exit codes.

use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by the remote API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Credentials rejected (401/403 response)
    #[error("Unauthorized ({status}): {message}")]
    Unauthorized {
        /// HTTP status code
        status: u16,
        /// Error message from API
        message: String,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Request timeout
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Atom/XML parsing error
    #[error("Failed to parse feed: {0}")]
    Xml(#[from] quick_xml::DeError),

    /// JWT signing error
    #[error("Failed to sign app token: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Well-formed response that is missing what we asked for
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create an unauthorized error.
    #[must_use]
    pub fn unauthorized(status: u16, message: impl Into<String>) -> Self {
        Self::Unauthorized { status, message: message.into() }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Create an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Returns true if a later run might succeed without any change on our side.
    ///
    /// Nothing retries automatically; this only shapes the log line.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::Timeout(_) | Self::Server { .. })
    }
}

/// Stage of the per-paper pipeline in which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Credential resolution and installation lookup.
    Authenticate,
    /// arXiv search.
    Fetch,
    /// DeepL translation.
    Translate,
    /// GitHub issue creation.
    Publish,
}

impl Stage {
    /// Lowercase name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Authenticate => "authenticate",
            Self::Fetch => "fetch",
            Self::Translate => "translate",
            Self::Publish => "publish",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Run-level errors. Each variant has its own process exit code.
#[derive(thiserror::Error, Debug)]
pub enum BotError {
    /// Missing or invalid credentials/settings.
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is missing or malformed
        message: String,
    },

    /// GitHub App authentication or installation lookup failed.
    #[error("Authentication error: {message}")]
    Authentication {
        /// What went wrong
        message: String,
        /// Underlying API error, if any
        #[source]
        source: Option<ClientError>,
    },

    /// arXiv search failed.
    #[error("Fetch error: {0}")]
    Fetch(#[source] ClientError),

    /// DeepL translation failed for one paper.
    #[error("Translation error for {paper_id}: {source}")]
    Translation {
        /// Entry id of the paper being translated
        paper_id: String,
        /// Underlying API error
        #[source]
        source: ClientError,
    },

    /// GitHub issue creation failed for one paper.
    #[error("Publish error for {paper_id}: {source}")]
    Publish {
        /// Entry id of the paper being published
        paper_id: String,
        /// Underlying API error
        #[source]
        source: ClientError,
    },
}

impl BotError {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    /// Create an authentication error without an underlying API error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication { message: message.into(), source: None }
    }

    /// Create an authentication error wrapping an API error.
    #[must_use]
    pub fn authentication_with(message: impl Into<String>, source: ClientError) -> Self {
        Self::Authentication { message: message.into(), source: Some(source) }
    }

    /// Pipeline stage this error belongs to.
    #[must_use]
    pub const fn stage(&self) -> Option<Stage> {
        match self {
            Self::Configuration { .. } => None,
            Self::Authentication { .. } => Some(Stage::Authenticate),
            Self::Fetch(_) => Some(Stage::Fetch),
            Self::Translation { .. } => Some(Stage::Translate),
            Self::Publish { .. } => Some(Stage::Publish),
        }
    }

    /// Process exit code for this error kind.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Configuration { .. } => 2,
            Self::Authentication { .. } => 3,
            Self::Fetch(_) => 4,
            Self::Translation { .. } => 5,
            Self::Publish { .. } => 6,
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for run-level operations.
pub type BotResult<T> = Result<T, BotError>;
