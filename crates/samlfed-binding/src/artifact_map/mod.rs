//! One-time mapping from artifacts to the messages they stand for.
//!
//! When an issuer hands out an artifact it parks the real message here,
//! keyed by the artifact's handle. The later resolution call retrieves the
//! message exactly once: success, expiry, and authorization failure all
//! remove the mapping, so a captured artifact cannot be replayed against
//! the resolution service.

mod memory;
mod store;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use samlfed_artifact::SamlArtifact;
use samlfed_cache::{StoreCaps, TextStore};

use crate::error::{BindingError, BindingResult};
use crate::payload::MapPayload;

use self::memory::MemoryMappings;

/// Default storage context label for artifact mappings.
pub const DEFAULT_CONTEXT: &str = "samlfed.binding.ArtifactMap";

/// Maps issued artifacts to pending messages.
///
/// Every mapping lives at most once and at most `ttl` long:
///
/// - [`ArtifactMap::retrieve`] moves the message out and destroys the
///   mapping, success or not
/// - a mapping stored with a relying party is only released to a requester
///   presenting exactly that identity, and a mismatched attempt destroys
///   the mapping rather than leaving it around for a second try
/// - expired mappings behave as absent and are cleaned up lazily as other
///   calls touch the map
///
/// The in-memory backend keeps payloads in process memory under one lock.
/// The store backend serializes payloads to XML and persists them through a
/// [`TextStore`], which is what lets several cluster members resolve each
/// other's artifacts.
pub struct ArtifactMap<P: MapPayload> {
    backend: Backend<P>,
    context: String,
}

enum Backend<P> {
    Memory(MemoryMappings<P>),
    Store(Arc<dyn TextStore>),
}

impl<P: MapPayload> ArtifactMap<P> {
    /// Creates a map holding mappings in process memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(MemoryMappings::new()),
            context: DEFAULT_CONTEXT.to_string(),
        }
    }

    /// Creates a map persisting mappings through a text store.
    #[must_use]
    pub fn with_store(store: Arc<dyn TextStore>) -> Self {
        Self {
            backend: Backend::Store(store),
            context: DEFAULT_CONTEXT.to_string(),
        }
    }

    /// Replaces the storage context label, builder style.
    ///
    /// Only meaningful for store-backed maps; distinct maps sharing one
    /// backend must use distinct labels or they will see each other's
    /// mappings.
    #[must_use]
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Returns the storage context label.
    #[must_use]
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Parks `payload` under `artifact` for `ttl`.
    ///
    /// Passing a `relying_party` binds the mapping to that identity.
    /// `None` leaves the mapping unbound, any requester may resolve it.
    ///
    /// The payload is moved into the map; the caller gets it back from
    /// [`ArtifactMap::retrieve`] and from nowhere else.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::PayloadAttached`] if the payload still sits
    /// inside an enclosing document, [`BindingError::DuplicateArtifact`] if
    /// a live mapping already uses the artifact's handle, or a marshalling
    /// or storage error from the backend.
    pub fn store(
        &self,
        payload: P,
        artifact: &SamlArtifact,
        relying_party: Option<&str>,
        ttl: Duration,
    ) -> BindingResult<()> {
        if payload.has_parent() {
            return Err(BindingError::PayloadAttached);
        }
        let expires_at = expiry_from_ttl(ttl);
        match &self.backend {
            Backend::Memory(mappings) => mappings.store(
                artifact.message_handle().hex(),
                payload,
                relying_party,
                expires_at,
            )?,
            Backend::Store(text_store) => {
                let key = storage_key(artifact, text_store.caps());
                store::store(
                    text_store.as_ref(),
                    &self.context,
                    &key,
                    &payload,
                    relying_party,
                    expires_at,
                )?;
            }
        }
        tracing::debug!(
            "stored mapping for artifact handle '{}'",
            artifact.message_handle()
        );
        Ok(())
    }

    /// Retrieves the message parked under `artifact`, destroying the
    /// mapping.
    ///
    /// `requesting_party` is the authenticated identity of the caller, or
    /// `None` for an anonymous request. It must match the identity the
    /// mapping was bound to; unbound mappings are released to anyone.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::NotFound`] if no mapping exists (including
    /// when it was already resolved once), [`BindingError::Expired`] if the
    /// in-memory mapping outlived its TTL, or
    /// [`BindingError::Unauthorized`] on an identity mismatch. The two
    /// failure modes destroy the mapping as well.
    pub fn retrieve(
        &self,
        artifact: &SamlArtifact,
        requesting_party: Option<&str>,
    ) -> BindingResult<P> {
        let payload = match &self.backend {
            Backend::Memory(mappings) => {
                mappings.retrieve(&artifact.message_handle().hex(), requesting_party)?
            }
            Backend::Store(text_store) => {
                let key = storage_key(artifact, text_store.caps());
                store::retrieve(text_store.as_ref(), &self.context, &key, requesting_party)?
            }
        };
        tracing::debug!(
            "resolved mapping for artifact handle '{}'",
            artifact.message_handle()
        );
        Ok(payload)
    }

    /// Looks up which relying party a mapping is bound to, without
    /// consuming it.
    ///
    /// Returns `Ok(None)` for a mapping stored unbound. Intended for
    /// diagnostics and for resolvers that route by audience before doing
    /// the real retrieval.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError::NotFound`] if no live mapping exists.
    pub fn relying_party_of(&self, artifact: &SamlArtifact) -> BindingResult<Option<String>> {
        match &self.backend {
            Backend::Memory(mappings) => {
                mappings.relying_party(&artifact.message_handle().hex())
            }
            Backend::Store(text_store) => {
                let key = storage_key(artifact, text_store.caps());
                store::relying_party(text_store.as_ref(), &self.context, &key)
            }
        }
    }
}

impl<P: MapPayload> fmt::Debug for ArtifactMap<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let backend = match &self.backend {
            Backend::Memory(_) => "memory",
            Backend::Store(_) => "store",
        };
        f.debug_struct("ArtifactMap")
            .field("backend", &backend)
            .field("context", &self.context)
            .finish()
    }
}

/// Derives the storage key for an artifact.
///
/// The canonical key is the hex form of the message handle. If the backend
/// caps keys below that, the handle is shortened to a SHA-1 digest in hex,
/// which stays fixed-width no matter what the handle looked like.
fn storage_key(artifact: &SamlArtifact, caps: StoreCaps) -> String {
    let hexed = artifact.message_handle().hex();
    if hexed.len() > caps.max_key_len {
        samlfed_crypto::sha1_hex(artifact.message_handle().as_bytes())
    } else {
        hexed
    }
}

fn expiry_from_ttl(ttl: Duration) -> DateTime<Utc> {
    let delta = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
    Utc::now()
        .checked_add_signed(delta)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
