//! Artifact message handles.

use std::fmt;

use crate::error::ArtifactError;

/// A 20-byte artifact message handle.
///
/// The handle is the random half of an artifact: it references a stored
/// message without revealing anything about it. Handles are generated from a
/// cryptographically secure source so they cannot be guessed.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageHandle([u8; 20]);

impl MessageHandle {
    /// Byte length of every message handle.
    pub const LENGTH: usize = 20;

    /// Wraps existing handle bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Generates a fresh random handle.
    #[must_use]
    pub fn random() -> Self {
        Self(samlfed_crypto::random_handle())
    }

    /// Returns the raw handle bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the handle as lowercase hex.
    ///
    /// The hex form is the canonical lookup key for artifact mappings.
    #[must_use]
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<&[u8]> for MessageHandle {
    type Error = ArtifactError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ArtifactError::HandleLength { actual: bytes.len() })?;
        Ok(Self(raw))
    }
}

impl fmt::Debug for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageHandle({})", self.hex())
    }
}

impl fmt::Display for MessageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}
