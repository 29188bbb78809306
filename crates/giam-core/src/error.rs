//! Error types for template expansion, HTTP transport and reconciliation.

use thiserror::Error;

/// Errors raised while expanding a URL template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateError {
    #[error("Missing template variable: {0}")]
    MissingVariable(String),

    #[error("Unterminated placeholder at byte {0}")]
    Unterminated(usize),
}

impl TemplateError {
    /// Create a new MissingVariable error
    pub fn missing_variable(key: impl Into<String>) -> Self {
        Self::MissingVariable(key.into())
    }
}

/// Errors raised by the HTTP layer.
///
/// A 404 on fetch is not an error; it is reported as `RemoteState::NotFound`.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request never produced a response (connect, TLS, I/O).
    #[error("Request to {url} failed: {message}")]
    Request { url: String, message: String },

    /// The server answered with a status the caller does not accept.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body could not be decoded.
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

impl TransportError {
    /// Create a new Request error
    pub fn request(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a new Status error
    pub fn status(url: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            url: url.into(),
            status,
            body: body.into(),
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Errors raised while building a collection or item URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// `.` and `..` would be resolved away when joined onto the base URL.
    #[error("'{0}' cannot be used as a path segment")]
    DotSegment(String),
}

/// Errors raised while mapping an attribute bag into a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("Missing required attribute: {0}")]
    MissingField(&'static str),

    #[error("Attribute must not be empty: {0}")]
    EmptyField(&'static str),

    #[error("Attribute must not be '.' or '..': {0}")]
    DotSegment(&'static str),

    #[error("Unknown action '{0}'; expected one of: create, present, delete, absent")]
    InvalidIntent(String),
}

/// Errors surfaced to the caller of the reconciler.
///
/// Every failure is propagated unrecovered; a failed create or delete leaves
/// remote state as the provider left it.
#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Invalid descriptor: {0}")]
    InvalidDescriptor(#[from] DescriptorError),

    #[error("Failed to build resource locator: {0}")]
    Locator(#[from] LocatorError),

    #[error("Failed to fetch service account '{name}'")]
    FetchFailed {
        name: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to create service account '{name}'")]
    CreateFailed {
        name: String,
        #[source]
        source: TransportError,
    },

    #[error("Failed to delete service account '{name}'")]
    DeleteFailed {
        name: String,
        #[source]
        source: TransportError,
    },
}

impl ReconcileError {
    pub fn fetch_failed(name: impl Into<String>, source: TransportError) -> Self {
        Self::FetchFailed {
            name: name.into(),
            source,
        }
    }

    pub fn create_failed(name: impl Into<String>, source: TransportError) -> Self {
        Self::CreateFailed {
            name: name.into(),
            source,
        }
    }

    pub fn delete_failed(name: impl Into<String>, source: TransportError) -> Self {
        Self::DeleteFailed {
            name: name.into(),
            source,
        }
    }

    /// The transport error behind a network failure, if any.
    pub fn transport(&self) -> Option<&TransportError> {
        match self {
            Self::FetchFailed { source, .. }
            | Self::CreateFailed { source, .. }
            | Self::DeleteFailed { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidDescriptor(_) | Self::Locator(_) => ErrorCategory::Validation,
            Self::FetchFailed { .. } => ErrorCategory::Fetch,
            Self::CreateFailed { .. } => ErrorCategory::Create,
            Self::DeleteFailed { .. } => ErrorCategory::Delete,
        }
    }
}

/// Error categories for classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Fetch,
    Create,
    Delete,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation => write!(f, "validation"),
            Self::Fetch => write!(f, "fetch"),
            Self::Create => write!(f, "create"),
            Self::Delete => write!(f, "delete"),
        }
    }
}

/// Convenience result type for reconcile operations
pub type Result<T> = std::result::Result<T, ReconcileError>;
