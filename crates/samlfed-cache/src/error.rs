//! Storage error types.

use std::fmt;

/// Text storage errors.
#[derive(Debug)]
pub enum StoreError {
    /// Context label exceeds the backend's limit.
    ContextTooLong {
        /// Length of the rejected context label in bytes.
        len: usize,
        /// The backend's limit in bytes.
        max: usize,
    },
    /// Storage key exceeds the backend's limit.
    KeyTooLong {
        /// Length of the rejected key in bytes.
        len: usize,
        /// The backend's limit in bytes.
        max: usize,
    },
    /// Stored value exceeds the backend's limit.
    ValueTooLong {
        /// Length of the rejected value in bytes.
        len: usize,
        /// The backend's limit in bytes.
        max: usize,
    },
    /// The backend itself failed.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContextTooLong { len, max } => {
                write!(f, "context label is {len} bytes, backend limit is {max}")
            }
            Self::KeyTooLong { len, max } => {
                write!(f, "storage key is {len} bytes, backend limit is {max}")
            }
            Self::ValueTooLong { len, max } => {
                write!(f, "stored value is {len} bytes, backend limit is {max}")
            }
            Self::Backend(msg) => write!(f, "storage backend error: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = StoreError::KeyTooLong { len: 300, max: 255 };
        assert_eq!(err.to_string(), "storage key is 300 bytes, backend limit is 255");

        let err = StoreError::Backend("connection refused".to_string());
        assert!(err.to_string().contains("connection refused"));
    }
}
