//! Replay detection cache.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::error::StoreResult;
use crate::memory::MemoryTextStore;
use crate::store::TextStore;

// Only the record's presence matters, the value is never read back.
const SEEN: &str = "x";

/// First-seen tracking of security tokens.
///
/// A token checks out exactly once before its expiration: the first call for
/// a given `(context, token)` pair returns `true`, every further call before
/// `expires_at` returns `false`. Message IDs, assertion IDs, and nonces all
/// go through this to stop an attacker re-submitting a captured message.
///
/// The cache is only as wide as its [`TextStore`]. Point it at a shared
/// backend and detection covers the whole cluster; the in-process fallback
/// covers a single node only.
pub struct ReplayCache {
    store: Arc<dyn TextStore>,
    shared: bool,
}

impl ReplayCache {
    /// Creates a replay cache over the given store.
    ///
    /// Detection is as wide as the store: a backend reachable from every
    /// cluster member gives cluster-wide detection.
    #[must_use]
    pub fn new(store: Arc<dyn TextStore>) -> Self {
        Self {
            store,
            shared: true,
        }
    }

    /// Creates a process-local replay cache.
    ///
    /// Logs a warning, since a replayed message could be accepted by another
    /// cluster member that does not see this cache.
    #[must_use]
    pub fn in_process() -> Self {
        tracing::warn!("no shared text store configured, replay detection is process-local only");
        Self {
            store: Arc::new(MemoryTextStore::new()),
            shared: false,
        }
    }

    /// Returns `false` if this cache was built with the process-local
    /// fallback.
    #[must_use]
    pub const fn is_shared(&self) -> bool {
        self.shared
    }

    /// Checks whether `token` is being seen for the first time.
    ///
    /// Returns `true` on first sight and records the token until
    /// `expires_at`; returns `false` for a replay. Tokens longer than the
    /// store's key limit are shortened to a SHA-1 digest before storage, so
    /// arbitrary-length message IDs work against bounded backends.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying store fails. Callers should treat
    /// that as a failed check: accepting a message because the replay store
    /// was down defeats the point.
    pub fn check(&self, context: &str, token: &str, expires_at: DateTime<Utc>) -> StoreResult<bool> {
        let caps = self.store.caps();
        let key = if token.len() > caps.max_key_len {
            samlfed_crypto::sha1_hex(token.as_bytes())
        } else {
            token.to_string()
        };
        let first_seen = self.store.create_text(context, &key, SEEN, expires_at)?;
        if !first_seen {
            tracing::warn!("replay of token '{token}' detected in context '{context}'");
        }
        Ok(first_seen)
    }
}

impl fmt::Debug for ReplayCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplayCache")
            .field("shared", &self.shared)
            .finish_non_exhaustive()
    }
}
