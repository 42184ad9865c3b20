//! Error types and result aliases for x07 client operations.
//!
//! Every fallible operation surfaces an [`ApiError`] tagged with exactly one
//! [`ErrorKind`]. Schema validation of untyped JSON fails with a
//! [`DecodeError`], which the transport layer wraps as `BAD_RESPONSE`.

use thiserror::Error;

/// Failure class of an [`ApiError`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// DNS, connection reset, or other transport-level failure
    Network,
    /// Request exceeded its time bound and was cancelled
    Timeout,
    /// Non-success HTTP status
    Http { status: u16 },
    /// Body was not valid JSON where JSON was required
    BadJson,
    /// JSON parsed but did not match the expected schema
    BadResponse,
    /// A line of a sparse index file was malformed (1-based)
    BadIndex { line: usize },
    /// Bootstrap or index configuration was unusable
    Misconfig,
    /// Caller input rejected before any request was issued
    InvalidInput,
    /// Anything that could not be classified
    Unknown,
}

impl ErrorKind {
    /// Stable wire code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Network => "X07WEB_NETWORK",
            ErrorKind::Timeout => "X07WEB_TIMEOUT",
            ErrorKind::Http { .. } => "X07WEB_HTTP",
            ErrorKind::BadJson => "X07WEB_BAD_JSON",
            ErrorKind::BadResponse => "X07WEB_BAD_RESPONSE",
            ErrorKind::BadIndex { .. } => "X07WEB_BAD_INDEX",
            ErrorKind::Misconfig => "X07WEB_MISCONFIG",
            ErrorKind::InvalidInput => "X07WEB_INVALID_INPUT",
            ErrorKind::Unknown => "X07WEB_UNKNOWN",
        }
    }
}

/// The single error value crossing the client's boundary.
///
/// `code` is normally `kind.code()`, except for structured error documents
/// returned by the registry API, whose code is kept verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub code: String,
    pub message: String,
    pub url: Option<String>,
    pub request_id: Option<String>,
}

/// Result type alias for x07 client operations
pub type X07Result<T> = Result<T, ApiError>;

impl ApiError {
    /// Create an error whose code is derived from its kind
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            code: kind.code().to_string(),
            kind,
            message: message.into(),
            url: None,
            request_id: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn timeout() -> Self {
        Self::new(ErrorKind::Timeout, "request timed out")
    }

    /// Generic HTTP failure when the body carried no structured error
    pub fn http(status: u16) -> Self {
        Self::new(ErrorKind::Http { status }, format!("HTTP {}", status))
    }

    /// Structured error document reported by the registry API
    pub fn server(status: u16, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Http { status },
            code: code.into(),
            message: message.into(),
            url: None,
            request_id: None,
        }
    }

    pub fn bad_json(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadJson, message)
    }

    pub fn bad_response(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadResponse, message)
    }

    pub fn bad_index(line: usize, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadIndex { line }, message)
    }

    pub fn misconfig(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Misconfig, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    /// Attach the URL the failing request targeted
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_request_id(mut self, request_id: Option<String>) -> Self {
        self.request_id = request_id;
        self
    }

    /// HTTP status attached to this error, if any
    pub fn http_status(&self) -> Option<u16> {
        match self.kind {
            ErrorKind::Http { status } => Some(status),
            _ => None,
        }
    }

    /// Check if retrying the same call could plausibly succeed
    pub fn is_recoverable(&self) -> bool {
        match self.kind {
            ErrorKind::Network | ErrorKind::Timeout => true,
            ErrorKind::Http { status } => status >= 500,
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for fixing this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self.kind {
            ErrorKind::Network => Some("Check your internet connection and try again"),
            ErrorKind::Timeout => Some("The registry did not answer in time; try again or raise the timeout"),
            ErrorKind::Http { status: 401 } | ErrorKind::Http { status: 403 } => {
                Some("Log in with a token that has the required scope")
            },
            ErrorKind::Http { status: 404 } => {
                Some("Check the package name and version spelling")
            },
            ErrorKind::BadIndex { .. } => {
                Some("The index file is corrupt; report it to the registry operators")
            },
            ErrorKind::Misconfig => Some("Check the origin and index base settings"),
            ErrorKind::InvalidInput => {
                Some("Package names must match ^[a-z][a-z0-9_-]*$")
            },
            _ => None,
        }
    }
}

/// Schema validation failure over an untyped JSON value
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{what} must be an object")]
    NotObject { what: String },

    #[error("{field} must be a {expected}")]
    WrongType { field: String, expected: &'static str },

    #[error("{field} must be an array of strings")]
    NotStringArray { field: String },

    #[error("{field} must be an array")]
    NotArray { field: String },

    #[error("{field} must be {expected}")]
    WrongLiteral { field: String, expected: String },

    #[error("{field} {reason}")]
    Invalid { field: String, reason: String },
}

/// Result type alias for schema decoding
pub type DecodeResult<T> = Result<T, DecodeError>;

impl DecodeError {
    pub fn not_object(what: impl Into<String>) -> Self {
        Self::NotObject { what: what.into() }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
