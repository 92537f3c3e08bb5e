//! Text storage traits.

use chrono::{DateTime, Utc};

use crate::error::StoreResult;

/// Size limits of a text storage backend.
///
/// Callers that derive keys from variable-length input check these limits
/// and shorten their keys to a fixed-width digest when needed, so a backend
/// with bounded columns can still store them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreCaps {
    /// Maximum context label length in bytes.
    pub max_context_len: usize,
    /// Maximum key length in bytes.
    pub max_key_len: usize,
    /// Maximum value length in bytes.
    pub max_value_len: usize,
}

impl StoreCaps {
    /// Marker for a dimension the backend does not bound.
    pub const UNBOUNDED: usize = usize::MAX;
}

/// Expiring text storage.
///
/// Records are addressed by a `(context, key)` pair. The context label
/// partitions the keyspace so independent subsystems can share one backend
/// without key collisions. Every record carries an expiration instant;
/// expired records behave as absent everywhere, whether or not the backend
/// has physically removed them yet.
///
/// Implementations must be safe to share across threads. A record whose
/// `expires_at` is less than or equal to the current time is expired.
pub trait TextStore: Send + Sync {
    /// Returns the backend's size limits.
    fn caps(&self) -> StoreCaps;

    /// Inserts a record if no live record exists under `(context, key)`.
    ///
    /// Returns `true` if the record was inserted, `false` if a live record
    /// already occupies the slot. An expired occupant counts as absent and
    /// is replaced.
    ///
    /// The existence check and the insert must be atomic with respect to
    /// concurrent `create_text` calls for the same pair. Replay detection
    /// depends on exactly one of two racing inserts winning.
    ///
    /// # Errors
    ///
    /// Returns an error if an input exceeds the backend's limits or the
    /// backend fails.
    fn create_text(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Reads the live record under `(context, key)`.
    ///
    /// Returns `None` if there is no record or the record has expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn read_text(&self, context: &str, key: &str) -> StoreResult<Option<String>>;

    /// Deletes the record under `(context, key)`.
    ///
    /// Returns `true` if a live record was removed, `false` otherwise.
    /// Expired leftovers are also removed but reported as `false`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete_text(&self, context: &str, key: &str) -> StoreResult<bool>;

    /// Removes expired records in `context` and returns how many went.
    ///
    /// Purely an eager cleanup: expired records are already invisible to
    /// reads.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn reap(&self, context: &str) -> StoreResult<usize>;

    /// Removes every record in `context`, live or expired.
    ///
    /// Returns how many records were removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails.
    fn delete_context(&self, context: &str) -> StoreResult<usize>;
}
