//! Error types for the switching engine
//!
//! Every failure is raised where it is detected and travels unmodified up to
//! the caller. Heuristic non-matches (an unknown `*Connection` key, a comment
//! that is not a block header) are never errors.

use std::path::PathBuf;

/// Errors raised while listing or switching connection strings
#[derive(Debug, thiserror::Error)]
pub enum SwitchError {
    /// Configuration file does not exist
    #[error("configuration file not found: {}", path.display())]
    FileNotFound {
        /// Requested path
        path: PathBuf,
    },

    /// No handler registered for the file extension
    #[error("unsupported configuration file type: '{extension}'")]
    UnsupportedFormat {
        /// Extension as given, without the dot (may be empty)
        extension: String,
    },

    /// File content does not parse under the chosen format
    #[error("invalid format in {}: {message}", path.display())]
    InvalidFormat {
        /// File being processed
        path: PathBuf,
        /// Parser message
        message: String,
    },

    /// Referenced section or key is absent from an otherwise valid file
    #[error("{0} not found")]
    NotFound(String),

    /// Source entry exists but carries no value
    #[error("connection string value is empty for '{key}'")]
    EmptyValue {
        /// Source key
        key: String,
    },

    /// Name pattern lacks the `{Environment}` placeholder
    #[error("name pattern '{pattern}' does not contain the {{Environment}} placeholder")]
    InvalidNamePattern {
        /// Pattern as given
        pattern: String,
    },

    /// IO error while reading, writing or backing up a file
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// File involved
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Engine configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

impl SwitchError {
    /// Create invalid format error for path
    pub fn invalid_format(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create not-found error for a connection string key
    pub fn key_not_found(key: &str) -> Self {
        Self::NotFound(format!("connection string '{key}'"))
    }
}

/// Result type alias for engine operations
pub type SwitchResult<T> = Result<T, SwitchError>;
