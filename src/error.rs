//! Error types for collation and text-sink operations

use std::io;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

/// Errors produced by the collation facade
#[derive(Error, Debug)]
pub enum CollationError {
    #[error("Invalid option combination: {message}")]
    InvalidOptions { message: String },

    #[error("Unknown locale name: {name:?}")]
    UnknownLocale { name: String },

    #[error("Unknown legacy locale identifier: 0x{lcid:04x}")]
    UnknownLocaleId { lcid: u32 },

    #[error("Index {index} is out of range or not on a character boundary (length {len})")]
    InvalidIndex { index: usize, len: usize },

    #[error("Destination buffer too small: {needed} bytes needed, {provided} provided")]
    DestinationTooSmall { needed: usize, provided: usize },
}

impl CollationError {
    /// Create an invalid options error
    pub fn invalid_options(message: &str) -> Self {
        CollationError::InvalidOptions {
            message: message.to_string(),
        }
    }

    /// Create an unknown locale error
    pub fn unknown_locale(name: &str) -> Self {
        CollationError::UnknownLocale {
            name: name.to_string(),
        }
    }

    /// Create an invalid index error
    pub fn invalid_index(index: usize, len: usize) -> Self {
        CollationError::InvalidIndex { index, len }
    }
}

/// Result type for collation operations
pub type CollationResult<T> = Result<T, CollationError>;

/// Errors produced by text sinks
///
/// Cancellation is a distinct outcome kind, not an I/O failure: a sink
/// handed a pre-cancelled token reports `Cancelled` carrying the token it
/// observed, and forwards nothing.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Sink is closed")]
    Closed,

    #[error("Operation cancelled")]
    Cancelled { token: CancellationToken },

    #[error("Formatting failed")]
    Format(#[from] std::fmt::Error),
}

impl SinkError {
    /// Create a cancelled outcome carrying the observed token
    pub fn cancelled(token: &CancellationToken) -> Self {
        SinkError::Cancelled {
            token: token.clone(),
        }
    }

    /// Whether this error is the cancelled outcome
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SinkError::Cancelled { .. })
    }
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;
