//! Artifact error types.
//!
//! Provides error types for artifact parsing, construction, and encoding.

use thiserror::Error;

/// Result type for artifact operations.
pub type ArtifactResult<T> = Result<T, ArtifactError>;

/// Artifact parsing and construction errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArtifactError {
    /// The encoded artifact was not valid Base64.
    #[error("artifact is not valid base64: {0}")]
    Base64(String),

    /// The decoded artifact is too short to carry a type code.
    #[error("artifact is {len} bytes, too short to carry a type code")]
    TooShort {
        /// Number of bytes actually decoded.
        len: usize,
    },

    /// The type code is not one of the supported artifact formats.
    #[error("unsupported artifact type code {0:#06x}")]
    UnknownTypeCode(u16),

    /// A fixed-size artifact format had the wrong raw length.
    #[error("artifact of type {type_code:#06x} is {actual} bytes, expected {expected}")]
    WrongLength {
        /// Type code of the artifact being parsed.
        type_code: u16,
        /// Exact raw length the format requires.
        expected: usize,
        /// Raw length actually decoded.
        actual: usize,
    },

    /// A variable-size artifact format was shorter than its minimum.
    #[error("artifact of type {type_code:#06x} is {actual} bytes, expected at least {min}")]
    Truncated {
        /// Type code of the artifact being parsed.
        type_code: u16,
        /// Minimum raw length the format requires.
        min: usize,
        /// Raw length actually decoded.
        actual: usize,
    },

    /// The trailing source location bytes were not valid UTF-8.
    #[error("artifact source location is not valid UTF-8")]
    LocationEncoding,

    /// The source location was rejected by URL parsing at construction.
    #[error("invalid source location URL: {0}")]
    InvalidSourceLocation(String),

    /// A message handle had the wrong byte length.
    #[error("message handle is {actual} bytes, expected 20")]
    HandleLength {
        /// Byte length actually supplied.
        actual: usize,
    },

    /// A source ID had the wrong byte length.
    #[error("source ID is {actual} bytes, expected 20")]
    SourceIdLength {
        /// Byte length actually supplied.
        actual: usize,
    },
}
