//! SAML artifact binding and message security for samlfed.
//!
//! This crate provides the server side of the artifact binding plus the
//! inbound message vetting that goes with it:
//!
//! - **Artifact map** - One-time, TTL-bounded mapping from issued
//!   artifacts to the messages they stand in for
//! - **Relying-party binding** - Mappings may be restricted to the party
//!   they were issued to
//! - **Security policy** - An ordered rule pipeline that extracts message
//!   metadata, enforces freshness and replay limits, and authenticates
//!   the issuer
//! - **Pluggable persistence** - Mappings and replay records can live in
//!   process memory or in any shared [`samlfed_cache::TextStore`]
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`artifact_map`] - Artifact-to-message mapping with one-time release
//! - [`policy`] - Security policy rules and the pipeline driver
//! - [`message`] - Traits messages and transport requests implement to be
//!   vetted
//! - [`payload`] - Traits and types for the stored message payloads
//! - [`config`] - Key-value rule configuration
//! - [`error`] - Error types for binding operations
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use samlfed_artifact::{SamlArtifact, SourceId};
//! use samlfed_binding::{ArtifactMap, RawXmlPayload};
//!
//! # fn main() -> Result<(), samlfed_binding::BindingError> {
//! let map: ArtifactMap<RawXmlPayload> = ArtifactMap::in_memory();
//!
//! let source = SourceId::from_entity_id("https://idp.example.org/");
//! let artifact = SamlArtifact::type0004(source, 0);
//! let response = RawXmlPayload::new("<Response ID=\"r1\"/>")?;
//!
//! map.store(
//!     response,
//!     &artifact,
//!     Some("https://sp.example.org/"),
//!     Duration::from_secs(180),
//! )?;
//!
//! // The relying party resolves the artifact exactly once.
//! let resolved = map.retrieve(&artifact, Some("https://sp.example.org/"))?;
//! assert_eq!(resolved.as_str(), "<Response ID=\"r1\"/>");
//! assert!(map.retrieve(&artifact, Some("https://sp.example.org/")).is_err());
//! # Ok(())
//! # }
//! ```
//!
//! # SAML Specifications
//!
//! This implementation follows these specifications:
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod artifact_map;
pub mod config;
pub mod error;
pub mod message;
pub mod payload;
pub mod policy;

pub use artifact_map::ArtifactMap;
pub use config::{MapRuleConfig, RuleConfig};
pub use error::{BindingError, BindingResult};
pub use message::{SecuredMessage, TransportRequest};
pub use payload::{MapPayload, RawXmlPayload};
pub use policy::{
    ClientCertAuthRule, MessageFlowRule, MessageInfoRule, MessageSignatureVerifier, PolicyContext,
    PolicyError, SecurityPolicy, SecurityPolicyRule, SignatureVerifyError, XmlSigningRule,
};
