//! # Error Types
//!
//! Failure taxonomy for the split pipeline.
//!
//! ## Propagation policy
//!
//! - `FileRead` and `Decode` abort the current operation; the caller surfaces
//!   a banner message and no partial tile set is ever produced.
//! - `Describe` never aborts anything. The description layer downgrades it to
//!   a fixed placeholder string per tile (see [`crate::describe`]), so this
//!   variant only travels between the HTTP client and that wrapper.
//! - `Archive` surfaces an alert and leaves previously written slices alone.
//!
//! The [`Recoverable`] trait encodes that split: callers can ask an error
//! whether the session survives it.

use std::{error::Error as StdError, fmt, io};

/// Base error type for the split pipeline.
#[derive(Debug)]
pub enum SliceError {
    /// The input file could not be read from disk.
    FileRead {
        path: String,
        source: io::Error,
    },
    /// The input bytes could not be decoded as a raster image, or the
    /// decoded image cannot be split (smaller than 3x3 pixels).
    Decode {
        reason: String,
    },
    /// The description service call failed (transport, status or protocol).
    Describe {
        reason: String,
    },
    /// Building the zip archive failed.
    Archive {
        reason: String,
    },
    /// A configuration value is missing or invalid.
    Config {
        field: String,
        reason: String,
    },
    /// I/O error while writing output artifacts.
    Io {
        operation: String,
        source: io::Error,
    },
}

impl SliceError {
    /// Create a file-read error.
    pub fn file_read(path: impl Into<String>, source: io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a decode error.
    pub fn decode(reason: impl Into<String>) -> Self {
        Self::Decode {
            reason: reason.into(),
        }
    }

    /// Create a description-service error.
    pub fn describe(reason: impl Into<String>) -> Self {
        Self::Describe {
            reason: reason.into(),
        }
    }

    /// Create an archive error.
    pub fn archive(reason: impl Into<String>) -> Self {
        Self::Archive {
            reason: reason.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create an output I/O error.
    pub fn io(operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }
}

impl fmt::Display for SliceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SliceError::FileRead { path, source } => {
                write!(f, "failed to read '{}': {}", path, source)
            }
            SliceError::Decode { reason } => write!(f, "image decode failed: {}", reason),
            SliceError::Describe { reason } => {
                write!(f, "description request failed: {}", reason)
            }
            SliceError::Archive { reason } => write!(f, "archive build failed: {}", reason),
            SliceError::Config { field, reason } => write!(f, "invalid {}: {}", field, reason),
            SliceError::Io { operation, source } => {
                write!(f, "I/O error during {}: {}", operation, source)
            }
        }
    }
}

impl StdError for SliceError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            SliceError::FileRead { source, .. } | SliceError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for split pipeline operations.
pub type SliceResult<T> = Result<T, SliceError>;

/// Classification of errors the session can survive.
pub trait Recoverable {
    /// Whether the session keeps running after this error. Recoverable
    /// errors degrade to an in-UI marker instead of aborting.
    fn is_recoverable(&self) -> bool;
}

impl Recoverable for SliceError {
    fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SliceError::Describe { .. } | SliceError::Archive { .. }
        )
    }
}
