//! Artifact formats and the Base64 wire codec.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use url::Url;

use crate::error::{ArtifactError, ArtifactResult};
use crate::handle::MessageHandle;
use crate::source_id::SourceId;

/// Type code of the SAML 1.x source ID artifact.
pub const TYPE_0001: u16 = 0x0001;

/// Type code of the SAML 1.x URL artifact.
pub const TYPE_0002: u16 = 0x0002;

/// Type code of the SAML 2.0 artifact.
pub const TYPE_0004: u16 = 0x0004;

const TYPE_CODE_LEN: usize = 2;
const INDEX_LEN: usize = 2;

const TYPE_0001_LEN: usize = TYPE_CODE_LEN + SourceId::LENGTH + MessageHandle::LENGTH;
const TYPE_0002_MIN: usize = TYPE_CODE_LEN + MessageHandle::LENGTH + 1;
const TYPE_0004_LEN: usize = TYPE_CODE_LEN + INDEX_LEN + SourceId::LENGTH + MessageHandle::LENGTH;

/// A SAML artifact in one of the three supported wire formats.
///
/// The set of formats is closed: the 2-byte type code at the front of the
/// raw bytes selects the variant, and [`SamlArtifact::decode`] rejects any
/// code outside this set. Each variant owns exactly the fields its format
/// defines, so a decoded artifact can never be missing a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SamlArtifact {
    /// SAML 1.x artifact (type 0x0001): a source ID plus a message handle.
    Type0001 {
        /// SHA-1 source ID naming the issuer.
        source_id: SourceId,
        /// Random handle referencing the stored message.
        message_handle: MessageHandle,
    },

    /// SAML 1.x URL artifact (type 0x0002): a message handle plus the
    /// issuer's resolution URL in clear text.
    Type0002 {
        /// Random handle referencing the stored message.
        message_handle: MessageHandle,
        /// URL of the issuer's artifact resolution service. The field runs
        /// to the end of the raw bytes, there is no length prefix.
        source_location: String,
    },

    /// SAML 2.0 artifact (type 0x0004): an endpoint index, a source ID,
    /// and a message handle.
    Type0004 {
        /// Index of the issuer's resolution endpoint, big-endian on the
        /// wire.
        endpoint_index: u16,
        /// SHA-1 source ID naming the issuer.
        source_id: SourceId,
        /// Random handle referencing the stored message.
        message_handle: MessageHandle,
    },
}

/// The issuer-identifying field of an artifact.
///
/// Types 0x0001 and 0x0004 carry a hashed source ID that must be matched
/// against known issuers. Type 0x0002 instead carries the resolution URL
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactSource<'a> {
    /// A 20-byte hashed source ID.
    Id(&'a SourceId),
    /// A clear-text resolution URL.
    Location(&'a str),
}

impl SamlArtifact {
    /// Builds a type 0x0001 artifact with a fresh random handle.
    #[must_use]
    pub fn type0001(source_id: SourceId) -> Self {
        Self::type0001_with_handle(source_id, MessageHandle::random())
    }

    /// Builds a type 0x0001 artifact with the given handle.
    #[must_use]
    pub const fn type0001_with_handle(source_id: SourceId, message_handle: MessageHandle) -> Self {
        Self::Type0001 {
            source_id,
            message_handle,
        }
    }

    /// Builds a type 0x0002 artifact with a fresh random handle.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::InvalidSourceLocation`] if `source_location`
    /// is not an absolute URL. The check runs at construction only; decoding
    /// stays lenient so foreign artifacts with unusual locations still parse.
    pub fn type0002(source_location: &str) -> ArtifactResult<Self> {
        Self::type0002_with_handle(source_location, MessageHandle::random())
    }

    /// Builds a type 0x0002 artifact with the given handle.
    ///
    /// # Errors
    ///
    /// Returns [`ArtifactError::InvalidSourceLocation`] if `source_location`
    /// is not an absolute URL.
    pub fn type0002_with_handle(
        source_location: &str,
        message_handle: MessageHandle,
    ) -> ArtifactResult<Self> {
        Url::parse(source_location)
            .map_err(|e| ArtifactError::InvalidSourceLocation(e.to_string()))?;
        Ok(Self::Type0002 {
            message_handle,
            source_location: source_location.to_string(),
        })
    }

    /// Builds a type 0x0004 artifact with a fresh random handle.
    #[must_use]
    pub fn type0004(source_id: SourceId, endpoint_index: u16) -> Self {
        Self::type0004_with_handle(source_id, endpoint_index, MessageHandle::random())
    }

    /// Builds a type 0x0004 artifact with the given handle.
    #[must_use]
    pub const fn type0004_with_handle(
        source_id: SourceId,
        endpoint_index: u16,
        message_handle: MessageHandle,
    ) -> Self {
        Self::Type0004 {
            endpoint_index,
            source_id,
            message_handle,
        }
    }

    /// Decodes an artifact from its Base64 wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not valid Base64, if the raw bytes
    /// are shorter than the 2-byte type code, if the type code is not a
    /// supported format, or if the remaining bytes do not match the
    /// format's layout.
    pub fn decode(encoded: &str) -> ArtifactResult<Self> {
        let raw = STANDARD
            .decode(encoded)
            .map_err(|e| ArtifactError::Base64(e.to_string()))?;
        Self::from_raw(&raw)
    }

    /// Parses an artifact from raw, already Base64-decoded bytes.
    ///
    /// # Errors
    ///
    /// Returns the same layout errors as [`SamlArtifact::decode`].
    pub fn from_raw(raw: &[u8]) -> ArtifactResult<Self> {
        if raw.len() < TYPE_CODE_LEN {
            return Err(ArtifactError::TooShort { len: raw.len() });
        }
        let type_code = u16::from_be_bytes([raw[0], raw[1]]);
        match type_code {
            TYPE_0001 => Self::parse_type0001(raw),
            TYPE_0002 => Self::parse_type0002(raw),
            TYPE_0004 => Self::parse_type0004(raw),
            other => Err(ArtifactError::UnknownTypeCode(other)),
        }
    }

    fn parse_type0001(raw: &[u8]) -> ArtifactResult<Self> {
        if raw.len() != TYPE_0001_LEN {
            return Err(ArtifactError::WrongLength {
                type_code: TYPE_0001,
                expected: TYPE_0001_LEN,
                actual: raw.len(),
            });
        }
        Ok(Self::Type0001 {
            source_id: SourceId::new(array20(raw, TYPE_CODE_LEN)),
            message_handle: MessageHandle::new(array20(raw, TYPE_CODE_LEN + SourceId::LENGTH)),
        })
    }

    fn parse_type0002(raw: &[u8]) -> ArtifactResult<Self> {
        if raw.len() < TYPE_0002_MIN {
            return Err(ArtifactError::Truncated {
                type_code: TYPE_0002,
                min: TYPE_0002_MIN,
                actual: raw.len(),
            });
        }
        let location_bytes = &raw[TYPE_CODE_LEN + MessageHandle::LENGTH..];
        let source_location = std::str::from_utf8(location_bytes)
            .map_err(|_| ArtifactError::LocationEncoding)?
            .to_string();
        Ok(Self::Type0002 {
            message_handle: MessageHandle::new(array20(raw, TYPE_CODE_LEN)),
            source_location,
        })
    }

    fn parse_type0004(raw: &[u8]) -> ArtifactResult<Self> {
        if raw.len() != TYPE_0004_LEN {
            return Err(ArtifactError::WrongLength {
                type_code: TYPE_0004,
                expected: TYPE_0004_LEN,
                actual: raw.len(),
            });
        }
        let endpoint_index = u16::from_be_bytes([raw[TYPE_CODE_LEN], raw[TYPE_CODE_LEN + 1]]);
        let source_offset = TYPE_CODE_LEN + INDEX_LEN;
        Ok(Self::Type0004 {
            endpoint_index,
            source_id: SourceId::new(array20(raw, source_offset)),
            message_handle: MessageHandle::new(array20(raw, source_offset + SourceId::LENGTH)),
        })
    }

    /// Returns the raw wire bytes, type code first.
    #[must_use]
    pub fn raw_bytes(&self) -> Vec<u8> {
        match self {
            Self::Type0001 {
                source_id,
                message_handle,
            } => {
                let mut raw = Vec::with_capacity(TYPE_0001_LEN);
                raw.extend_from_slice(&TYPE_0001.to_be_bytes());
                raw.extend_from_slice(source_id.as_bytes());
                raw.extend_from_slice(message_handle.as_bytes());
                raw
            }
            Self::Type0002 {
                message_handle,
                source_location,
            } => {
                let mut raw =
                    Vec::with_capacity(TYPE_CODE_LEN + MessageHandle::LENGTH + source_location.len());
                raw.extend_from_slice(&TYPE_0002.to_be_bytes());
                raw.extend_from_slice(message_handle.as_bytes());
                raw.extend_from_slice(source_location.as_bytes());
                raw
            }
            Self::Type0004 {
                endpoint_index,
                source_id,
                message_handle,
            } => {
                let mut raw = Vec::with_capacity(TYPE_0004_LEN);
                raw.extend_from_slice(&TYPE_0004.to_be_bytes());
                raw.extend_from_slice(&endpoint_index.to_be_bytes());
                raw.extend_from_slice(source_id.as_bytes());
                raw.extend_from_slice(message_handle.as_bytes());
                raw
            }
        }
    }

    /// Encodes the artifact into its Base64 wire form.
    #[must_use]
    pub fn encode(&self) -> String {
        STANDARD.encode(self.raw_bytes())
    }

    /// Returns the 2-byte type code of this artifact.
    #[must_use]
    pub const fn type_code(&self) -> u16 {
        match self {
            Self::Type0001 { .. } => TYPE_0001,
            Self::Type0002 { .. } => TYPE_0002,
            Self::Type0004 { .. } => TYPE_0004,
        }
    }

    /// Returns the message handle.
    ///
    /// Every format carries one; it is the key artifact mappings are stored
    /// under.
    #[must_use]
    pub const fn message_handle(&self) -> &MessageHandle {
        match self {
            Self::Type0001 { message_handle, .. }
            | Self::Type0002 { message_handle, .. }
            | Self::Type0004 { message_handle, .. } => message_handle,
        }
    }

    /// Returns the issuer-identifying field in whichever form the format
    /// carries it.
    #[must_use]
    pub fn source(&self) -> ArtifactSource<'_> {
        match self {
            Self::Type0001 { source_id, .. } | Self::Type0004 { source_id, .. } => {
                ArtifactSource::Id(source_id)
            }
            Self::Type0002 {
                source_location, ..
            } => ArtifactSource::Location(source_location),
        }
    }

    /// Returns the hashed source ID, if this format carries one.
    #[must_use]
    pub const fn source_id(&self) -> Option<&SourceId> {
        match self {
            Self::Type0001 { source_id, .. } | Self::Type0004 { source_id, .. } => Some(source_id),
            Self::Type0002 { .. } => None,
        }
    }

    /// Returns the clear-text source location, if this format carries one.
    #[must_use]
    pub fn source_location(&self) -> Option<&str> {
        match self {
            Self::Type0002 {
                source_location, ..
            } => Some(source_location),
            _ => None,
        }
    }

    /// Returns the resolution endpoint index, if this format carries one.
    #[must_use]
    pub const fn endpoint_index(&self) -> Option<u16> {
        match self {
            Self::Type0004 { endpoint_index, .. } => Some(*endpoint_index),
            _ => None,
        }
    }
}

fn array20(raw: &[u8], offset: usize) -> [u8; 20] {
    let mut out = [0u8; 20];
    out.copy_from_slice(&raw[offset..offset + 20]);
    out
}

impl fmt::Display for SamlArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for SamlArtifact {
    type Err = ArtifactError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

impl Serialize for SamlArtifact {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.encode())
    }
}

impl<'de> Deserialize<'de> for SamlArtifact {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let encoded = String::deserialize(deserializer)?;
        Self::decode(&encoded).map_err(serde::de::Error::custom)
    }
}
