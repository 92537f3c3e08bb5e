//! Binding error types.
//!
//! Provides error types for artifact mapping and payload marshalling.
//! Policy rule failures have their own type, [`crate::policy::PolicyError`],
//! because they carry rule attribution for audit logging.

use samlfed_cache::StoreError;
use thiserror::Error;

/// Result type for binding operations.
pub type BindingResult<T> = Result<T, BindingError>;

/// Artifact binding errors.
#[derive(Debug, Error)]
pub enum BindingError {
    /// No mapping exists for the artifact.
    #[error("no mapping exists for the artifact")]
    NotFound,

    /// The mapping existed but its lifetime had already passed.
    #[error("the artifact mapping has expired")]
    Expired,

    /// The mapping is bound to a different relying party.
    ///
    /// The mapping is destroyed when this is returned; retrying with the
    /// right identity will not recover the message.
    #[error("artifact resolution attempted by an unauthorized party")]
    Unauthorized {
        /// Identity the requester presented, if any.
        requester: Option<String>,
    },

    /// The payload is still attached to an enclosing document.
    #[error("payload is attached to an enclosing document")]
    PayloadAttached,

    /// A live mapping already exists under the artifact's handle.
    #[error("a mapping already exists for this artifact")]
    DuplicateArtifact,

    /// The stored mapping envelope was malformed.
    #[error("malformed mapping envelope: {0}")]
    Envelope(String),

    /// The payload could not be marshalled to XML.
    #[error("payload marshalling failed: {0}")]
    Marshal(String),

    /// The payload could not be rebuilt from XML.
    #[error("payload parsing failed: {0}")]
    Parse(String),

    /// The storage backend failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
