//! Error types for link decoding.
//!
//! Errors fall into two groups. Fatal errors stop a decoding pass: an
//! unusable dictionary or configuration, an unreadable input, or an input that
//! ends in the middle of a frame. Per-message errors ([`FrameError`],
//! [`DecodeError`]) are local to one frame; the session converts them into
//! diagnostics and carries on with the next synchronized frame.
//!
//! ```rust
//! use heatlink::{DecodeError, LinkError, ValueType};
//!
//! let error = LinkError::incomplete_frame(12, 7);
//! assert!(error.is_fatal());
//!
//! let local: LinkError =
//!     DecodeError::WrongSize { value_type: ValueType::TimeOfDay, expected: 6, got: 4 }.into();
//! assert!(!local.is_fatal());
//! for suggestion in local.recovery_suggestions() {
//!     println!("  - {}", suggestion);
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

use crate::types::ValueType;

/// Result type alias for link decoding operations.
pub type Result<T, E = LinkError> = std::result::Result<T, E>;

/// Main error type for link decoding operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LinkError {
    #[error("Capture file error: {path}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error while reading the link")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Dictionary(#[from] DictionaryError),

    #[error("Invalid decoder configuration: {details}")]
    Config { details: String },

    #[error("Input ended mid-frame: expected {expected} bytes, got {got}")]
    IncompleteFrame { expected: usize, got: usize },

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl LinkError {
    /// Returns whether this error ends the current decoding pass.
    pub fn is_fatal(&self) -> bool {
        match self {
            LinkError::File { .. } => true,
            LinkError::Io(_) => true,
            LinkError::Dictionary(_) => true,
            LinkError::Config { .. } => true,
            LinkError::IncompleteFrame { .. } => true,
            LinkError::Frame(_) => false,
            LinkError::Decode(_) => false,
        }
    }

    /// Returns suggested recovery actions for this error.
    pub fn recovery_suggestions(&self) -> Vec<&'static str> {
        match self {
            LinkError::File { .. } | LinkError::Io(_) => vec![
                "Check the capture file exists and is readable",
                "Verify whether the capture is raw binary or hex text",
            ],
            LinkError::Dictionary(_) => vec![
                "Check the object dictionary is valid JSON or YAML",
                "Verify every entry has 'type', 'desc' and 'is_array'",
                "Only attach 'values' to Enum entries",
            ],
            LinkError::Config { .. } => vec![
                "Check the configuration keys and value spelling",
                "Remove the configuration file to fall back to defaults",
            ],
            LinkError::IncompleteFrame { .. } => vec![
                "The capture was cut off mid-frame; earlier frames are still valid",
                "Re-capture with a longer acquisition window",
            ],
            LinkError::Frame(_) => vec![
                "Inspect the raw frame bytes for a bit error on the link",
                "Check the synchronizer did not lock onto a marker inside a payload",
            ],
            LinkError::Decode(_) => vec![
                "Check the dictionary type for this datapoint",
                "Compare the raw data length against the declared type width",
            ],
        }
    }

    /// Helper constructor for file errors with path context.
    pub fn file_error(path: PathBuf, source: std::io::Error) -> Self {
        LinkError::File { path, source }
    }

    /// Helper constructor for truncated frames.
    pub fn incomplete_frame(expected: usize, got: usize) -> Self {
        LinkError::IncompleteFrame { expected, got }
    }

    /// Helper constructor for configuration errors.
    pub fn config(details: impl Into<String>) -> Self {
        LinkError::Config { details: details.into() }
    }
}

/// A synchronized frame whose structure cannot be interpreted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Payload of {payload_length} bytes cannot hold datapoint id, subindex and trailer")]
    TooShort { payload_length: u8 },

    #[error("Frame does not start with the 01 00 marker (found {found:02X?})")]
    BadMarker { found: [u8; 2] },

    #[error("Declared payload length {declared} does not match {actual} payload bytes")]
    LengthMismatch { declared: u8, actual: usize },

    #[error("Frame of {len} bytes is shorter than the 8 byte header")]
    Truncated { len: usize },
}

/// A value that cannot be decoded with its descriptor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("{value_type} expects {expected} bytes, got {got}")]
    WrongSize { value_type: ValueType, expected: usize, got: usize },

    #[error("Unhandled value type '{type_name}'")]
    UnsupportedType { type_name: String },

    #[error("Byte {byte:#04x} at offset {offset} is not printable ASCII")]
    InvalidEncoding { offset: usize, byte: u8 },
}

/// The object dictionary cannot be used.
#[derive(Error, Debug)]
pub enum DictionaryError {
    #[error("Object dictionary {path} is unreadable")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Object dictionary is malformed: {details}")]
    Syntax { details: String },

    #[error("Datapoint key '{key}' is not a 2-byte hex identifier")]
    InvalidKey { key: String },

    #[error("Datapoint {key} is missing required field '{field}'")]
    MissingField { key: String, field: &'static str },

    #[error("Datapoint {key} references unknown type '{type_name}'")]
    UnknownType { key: String, type_name: String },

    #[error("Datapoint {key} has enum values but type {value_type}")]
    EnumOnNonEnum { key: String, value_type: ValueType },

    #[error("Datapoint {key} has enum key '{value}' that is not an integer")]
    InvalidEnumKey { key: String, value: String },

    #[error("Datapoint {key} declares max_array_size 0")]
    InvalidArraySize { key: String },
}
