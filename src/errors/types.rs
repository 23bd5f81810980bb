//! Error type definitions
//!
//! Import failures are fatal by policy: every variant of [`ImportError`] ends
//! the run. Lookup failures surface as [`AppError`] and are reported per
//! request.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Import pipeline errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),

    /// JSON encoding errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Errors raised while loading an archive or building the identity mapping
#[derive(Error, Debug)]
pub enum ImportError {
    /// The store could not be prepared before any work started
    #[error("Bootstrap failed: {message}")]
    Bootstrap { message: String },

    /// The archive could not be opened or an entry could not be read
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Underlying read failures while scanning an entry
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Insert, prepare, commit or cursor failures
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The entry does not look like an EDM file
    #[error("Unexpected file format in {file}: {message}")]
    Format { file: String, message: String },

    /// A data row does not match the declared column layout of its table
    #[error("{file} line {line}: expected {expected} fields, found {found}")]
    ColumnCount {
        file: String,
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The consumer side of a bounded channel went away mid-stream
    #[error("Channel closed: {channel}")]
    ChannelClosed { channel: String },

    /// A loader or reader task panicked or was cancelled
    #[error("Task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

impl ImportError {
    /// Create a bootstrap error
    pub fn bootstrap<S: Into<String>>(message: S) -> Self {
        Self::Bootstrap {
            message: message.into(),
        }
    }

    /// Create a format error for a named archive entry
    pub fn format<F: Into<String>, M: Into<String>>(file: F, message: M) -> Self {
        Self::Format {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a channel-closed error
    pub fn channel_closed<C: Into<String>>(channel: C) -> Self {
        Self::ChannelClosed {
            channel: channel.into(),
        }
    }
}
