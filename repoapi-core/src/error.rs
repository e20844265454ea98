//! Structured error types for repoapi-core.
//!
//! Library consumers get `StoreError`; the CLI wraps it in `anyhow`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for repository store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// I/O operation failed
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// No directory exists at the repository path
    #[error("repository does not exist at {path:?}")]
    RepoNotFound { path: PathBuf },

    /// Directory exists but has no repository layout
    #[error("not a repository at {path:?}: {reason}")]
    NotARepository { path: PathBuf, reason: String },

    /// Owner or repository name that cannot name a directory under the root
    #[error("invalid {field} '{name}': {reason}")]
    InvalidName {
        field: &'static str,
        name: String,
        reason: &'static str,
    },

    /// A reference file could not be parsed
    #[error("invalid reference '{name}' in {path:?}")]
    InvalidRef { name: String, path: PathBuf },

    /// Configuration error
    #[error("Configuration error: {reason}")]
    Config { reason: String },
}

/// Result type alias for repoapi-core operations
pub type Result<T> = std::result::Result<T, StoreError>;

impl StoreError {
    /// Create a repository-not-found error
    pub fn repo_not_found(path: impl Into<PathBuf>) -> Self {
        Self::RepoNotFound { path: path.into() }
    }

    /// Create a not-a-repository error
    pub fn not_a_repository(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::NotARepository {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid name error
    pub fn invalid_name(field: &'static str, name: impl Into<String>, reason: &'static str) -> Self {
        Self::InvalidName {
            field,
            name: name.into(),
            reason,
        }
    }

    /// Create an invalid reference error
    pub fn invalid_ref(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::InvalidRef {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Create a config error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }
}
