//! Error types for babylog.
//!
//! This module defines all error types used throughout the babylog crate.
//! Every failure here is recoverable: validation errors become inline status
//! messages, remote failures fall back to offline mode, and persistence
//! failures surface to the CLI without corrupting in-memory state.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for babylog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === User Input Errors ===
    /// Required user input is missing or blank.
    #[error("{message}")]
    Validation {
        /// Human-readable description of the missing input.
        message: String,
    },

    // === Remote Errors ===
    /// The remote API answered with a non-success status.
    #[error("request failed: {message}")]
    RequestFailed {
        /// The server's response body, or a fallback embedding the status code.
        message: String,
    },

    /// The request never produced a response (connect, DNS, protocol).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    // === Cache Errors ===
    /// Failed to write a cache document.
    #[error("failed to write cache file {path}: {source}")]
    CacheWrite {
        /// Path to the cache file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for babylog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new validation error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new request-failed error.
    #[must_use]
    pub fn request_failed(message: impl Into<String>) -> Self {
        Self::RequestFailed {
            message: message.into(),
        }
    }

    /// Check if this error is a validation error.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this error came from the remote API or its transport.
    ///
    /// Both kinds share a recovery path: fall back to an offline status.
    #[must_use]
    pub fn is_remote_failure(&self) -> bool {
        matches!(self, Self::RequestFailed { .. } | Self::Transport(_))
    }
}
