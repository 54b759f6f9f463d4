//! Common error types used throughout mediashelf.
//!
//! Path resolution and listing are strict: every kind below except the
//! tool and internal variants maps onto a 4xx response.

/// Common error type for mediashelf.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The root index does not name a configured root directory.
    #[error("Invalid root index: {0}")]
    InvalidRoot(usize),

    /// The requested path resolves outside of its root directory.
    #[error("Path outside root: {0}")]
    PathEscape(String),

    /// The requested path does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A directory listing was requested for something that is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(String),

    /// An I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// An external tool failed, exited non-zero, or timed out.
    #[error("{tool}: {message}")]
    Tool { tool: String, message: String },

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new NotFound error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new PathEscape error.
    pub fn path_escape<S: Into<String>>(msg: S) -> Self {
        Self::PathEscape(msg.into())
    }

    /// Create a new NotADirectory error.
    pub fn not_a_directory<S: Into<String>>(msg: S) -> Self {
        Self::NotADirectory(msg.into())
    }

    /// Create a new Tool error.
    pub fn tool<T: Into<String>, M: Into<String>>(tool: T, message: M) -> Self {
        Self::Tool {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Create a new Internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }

    /// HTTP status code this error is reported with.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRoot(_) | Self::PathEscape(_) | Self::NotADirectory(_) => 400,
            Self::NotFound(_) => 404,
            Self::Io(_) | Self::Tool { .. } | Self::Internal(_) => 500,
        }
    }
}

/// Result type alias using the common Error type.
pub type Result<T> = std::result::Result<T, Error>;
