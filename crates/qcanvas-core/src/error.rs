//! Error types for qcanvas

use std::path::PathBuf;

use thiserror::Error;

use crate::locking::LockError;

/// Result type alias using qcanvas's Error
pub type Result<T> = std::result::Result<T, Error>;

/// qcanvas error types with helpful messages and suggestions
#[derive(Error, Debug)]
pub enum Error {
    // Input errors (E100-E199)
    #[error("Missing input: {0}. Capture both a question and an answer first.")]
    MissingInput(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Target errors (E200-E299)
    #[error("Invalid target '{}': {reason}", path.display())]
    InvalidTarget { path: PathBuf, reason: String },

    // Document errors (E300-E399)
    #[error("Malformed canvas document: {0}")]
    MalformedDocument(String),

    #[error("Failed to encode canvas document: {0}")]
    Serialization(String),

    #[error("Unsupported canvas document: {0}")]
    UnsupportedDocument(String),

    // Persistence errors (E400-E499)
    #[error("Failed to persist '{}': {source}", path.display())]
    PersistenceFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Lock errors (E500-E599)
    #[error(transparent)]
    Lock(#[from] LockError),

    // Config errors (E600-E699)
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Get error code for this error type
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingInput(_) => "E100",
            Self::InvalidInput(_) => "E101",
            Self::InvalidTarget { .. } => "E200",
            Self::MalformedDocument(_) => "E300",
            Self::Serialization(_) => "E301",
            Self::UnsupportedDocument(_) => "E302",
            Self::PersistenceFailure { .. } => "E400",
            Self::Lock(inner) => inner.code(),
            Self::ConfigError(_) => "E600",
            Self::Io(_) => "E9999",
        }
    }

    /// Get suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::MissingInput(_) => Some("capture with `q <text>` and `a <text>`".to_string()),
            Self::InvalidTarget { .. } => {
                Some("pass the path of an existing .canvas file".to_string())
            }
            Self::MalformedDocument(_) => {
                Some("qcanvas config set canvas.on_malformed recover".to_string())
            }
            Self::UnsupportedDocument(_) => {
                Some("fix the document by hand; it was left untouched".to_string())
            }
            Self::Lock(_) => Some("qcanvas config set lock.enabled false".to_string()),
            Self::ConfigError(_) => Some("qcanvas config list".to_string()),
            _ => None,
        }
    }

    pub(crate) fn invalid_target(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidTarget {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn persistence(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::PersistenceFailure {
            path: path.into(),
            source,
        }
    }
}
