//! Artifact source IDs.

use std::fmt;

use crate::error::ArtifactError;

/// A 20-byte artifact source ID.
///
/// The source ID names the issuer of an artifact so the receiver can work
/// out where to send the resolution request. It is the SHA-1 digest of the
/// issuer's entity ID, which keeps the field at a fixed width regardless of
/// how long the entity ID is.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceId([u8; 20]);

impl SourceId {
    /// Byte length of every source ID.
    pub const LENGTH: usize = 20;

    /// Wraps existing source ID bytes.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Derives the source ID for an issuer entity ID.
    ///
    /// The entity ID is digested exactly as given. Callers that normalize
    /// entity IDs (trailing slashes, case) must do so before calling this.
    #[must_use]
    pub fn from_entity_id(entity_id: &str) -> Self {
        Self(samlfed_crypto::sha1(entity_id.as_bytes()))
    }

    /// Returns the raw source ID bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the source ID as lowercase hex.
    #[must_use]
    pub fn hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl TryFrom<&[u8]> for SourceId {
    type Error = ArtifactError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw: [u8; 20] = bytes
            .try_into()
            .map_err(|_| ArtifactError::SourceIdLength { actual: bytes.len() })?;
        Ok(Self(raw))
    }
}

impl fmt::Debug for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceId({})", self.hex())
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_entity_id_is_the_sha1_digest() {
        let entity_id = "https://idp.example.org/";
        let source = SourceId::from_entity_id(entity_id);
        assert_eq!(source.as_bytes(), &samlfed_crypto::sha1(entity_id.as_bytes()));
    }

    #[test]
    fn from_entity_id_is_deterministic() {
        let a = SourceId::from_entity_id("https://idp.example.org/");
        let b = SourceId::from_entity_id("https://idp.example.org/");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_entity_ids_produce_distinct_source_ids() {
        let a = SourceId::from_entity_id("https://idp.example.org/");
        let b = SourceId::from_entity_id("https://other.example.org/");
        assert_ne!(a, b);
    }

    #[test]
    fn try_from_rejects_wrong_length() {
        let err = SourceId::try_from(&[0u8; 8][..]).unwrap_err();
        assert_eq!(err, ArtifactError::SourceIdLength { actual: 8 });
    }
}
