//! In-process text store.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::{StoreError, StoreResult};
use crate::store::{StoreCaps, TextStore};

const MAX_CONTEXT_LEN: usize = 255;
const MAX_KEY_LEN: usize = 255;

#[derive(Debug)]
struct Record {
    value: String,
    expires_at: DateTime<Utc>,
}

/// Process-local [`TextStore`] over a concurrent map.
///
/// Suitable for single-node deployments and tests. Nothing is shared across
/// processes, so replay detection and artifact mappings held here are not
/// visible to other cluster members.
///
/// Expired records are dropped lazily, when a read or create touches their
/// slot, or eagerly through [`TextStore::reap`]. There is no background
/// cleanup task.
#[derive(Debug, Default)]
pub struct MemoryTextStore {
    records: DashMap<(String, String), Record>,
}

impl MemoryTextStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Returns the number of records currently held, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the store holds no records at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn check_limits(context: &str, key: &str) -> StoreResult<()> {
        if context.len() > MAX_CONTEXT_LEN {
            return Err(StoreError::ContextTooLong {
                len: context.len(),
                max: MAX_CONTEXT_LEN,
            });
        }
        if key.len() > MAX_KEY_LEN {
            return Err(StoreError::KeyTooLong {
                len: key.len(),
                max: MAX_KEY_LEN,
            });
        }
        Ok(())
    }
}

impl TextStore for MemoryTextStore {
    fn caps(&self) -> StoreCaps {
        StoreCaps {
            max_context_len: MAX_CONTEXT_LEN,
            max_key_len: MAX_KEY_LEN,
            max_value_len: StoreCaps::UNBOUNDED,
        }
    }

    fn create_text(
        &self,
        context: &str,
        key: &str,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        Self::check_limits(context, key)?;
        let now = Utc::now();
        // The entry guard holds the shard lock, making the occupancy check
        // and the insert one atomic step.
        match self.records.entry((context.to_string(), key.to_string())) {
            Entry::Occupied(mut slot) => {
                if slot.get().expires_at > now {
                    Ok(false)
                } else {
                    slot.insert(Record {
                        value: value.to_string(),
                        expires_at,
                    });
                    Ok(true)
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(Record {
                    value: value.to_string(),
                    expires_at,
                });
                Ok(true)
            }
        }
    }

    fn read_text(&self, context: &str, key: &str) -> StoreResult<Option<String>> {
        let lookup = (context.to_string(), key.to_string());
        let now = Utc::now();
        let live = match self.records.get(&lookup) {
            Some(record) if record.expires_at > now => Some(record.value.clone()),
            Some(_) => None,
            None => return Ok(None),
        };
        if live.is_none() {
            // Drop the expired leftover so a later create is not refused.
            self.records.remove_if(&lookup, |_, record| record.expires_at <= now);
        }
        Ok(live)
    }

    fn delete_text(&self, context: &str, key: &str) -> StoreResult<bool> {
        let now = Utc::now();
        match self.records.remove(&(context.to_string(), key.to_string())) {
            Some((_, record)) => Ok(record.expires_at > now),
            None => Ok(false),
        }
    }

    fn reap(&self, context: &str) -> StoreResult<usize> {
        let now = Utc::now();
        let before = self.records.len();
        self.records
            .retain(|(c, _), record| c.as_str() != context || record.expires_at > now);
        Ok(before.saturating_sub(self.records.len()))
    }

    fn delete_context(&self, context: &str) -> StoreResult<usize> {
        let before = self.records.len();
        self.records.retain(|(c, _), _| c.as_str() != context);
        Ok(before.saturating_sub(self.records.len()))
    }
}
