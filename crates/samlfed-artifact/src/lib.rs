//! # samlfed-artifact
//!
//! SAML artifact value types and their wire codec.
//!
//! An artifact is a small, opaque reference that travels in place of a full
//! protocol message. The receiver dereferences it over a direct channel to
//! the issuer, so the artifact itself only has to carry enough to route that
//! callback:
//!
//! - **Type 0x0001** - SAML 1.x artifact: a 20-byte source ID naming the
//!   issuer plus a 20-byte message handle
//! - **Type 0x0002** - SAML 1.x URL artifact: a 20-byte message handle plus
//!   the issuer's resolution URL in clear text
//! - **Type 0x0004** - SAML 2.0 artifact: an endpoint index, a 20-byte
//!   source ID, and a 20-byte message handle
//!
//! On the wire an artifact is the standard-alphabet Base64 encoding of its
//! raw bytes, with the 2-byte big-endian type code first. [`SamlArtifact`]
//! is a closed enum over the three formats; parsing rejects any other type
//! code outright.
//!
//! ```rust
//! use samlfed_artifact::{SamlArtifact, SourceId};
//!
//! let source = SourceId::from_entity_id("https://idp.example.org/");
//! let artifact = SamlArtifact::type0004(source, 1);
//! let encoded = artifact.encode();
//! let decoded = SamlArtifact::decode(&encoded).unwrap();
//! assert_eq!(artifact, decoded);
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod artifact;
pub mod error;
pub mod handle;
pub mod source_id;

pub use artifact::{ArtifactSource, SamlArtifact, TYPE_0001, TYPE_0002, TYPE_0004};
pub use error::{ArtifactError, ArtifactResult};
pub use handle::MessageHandle;
pub use source_id::SourceId;
