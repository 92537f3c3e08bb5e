//! In-process mapping table.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::error::{BindingError, BindingResult};

struct Mapping<P> {
    payload: P,
    relying_party: Option<String>,
    expires_at: DateTime<Utc>,
}

/// Mapping table guarded by a single lock.
///
/// Two structures move together under the lock: the key table holding the
/// mappings, and an expiry index ordering keys by deadline. The index makes
/// the lazy sweep proportional to the number of mappings actually due, not
/// the size of the table.
pub(super) struct MemoryMappings<P> {
    tables: Mutex<Tables<P>>,
}

struct Tables<P> {
    by_key: HashMap<String, Mapping<P>>,
    by_expiry: BTreeMap<DateTime<Utc>, Vec<String>>,
}

impl<P> MemoryMappings<P> {
    pub(super) fn new() -> Self {
        Self {
            tables: Mutex::new(Tables {
                by_key: HashMap::new(),
                by_expiry: BTreeMap::new(),
            }),
        }
    }

    pub(super) fn store(
        &self,
        key: String,
        payload: P,
        relying_party: Option<&str>,
        expires_at: DateTime<Utc>,
    ) -> BindingResult<()> {
        let mut tables = self.tables.lock();
        let now = Utc::now();

        // Piggyback cleanup on writes instead of running a timer thread.
        let swept = tables.sweep(now);
        if swept > 0 {
            tracing::debug!("swept {swept} expired artifact mappings");
        }

        // The sweep just removed everything expired, so any occupant of the
        // slot is live.
        if tables.by_key.contains_key(&key) {
            return Err(BindingError::DuplicateArtifact);
        }

        tables.by_expiry.entry(expires_at).or_default().push(key.clone());
        tables.by_key.insert(
            key,
            Mapping {
                payload,
                relying_party: relying_party.map(str::to_string),
                expires_at,
            },
        );
        Ok(())
    }

    pub(super) fn retrieve(&self, key: &str, requesting_party: Option<&str>) -> BindingResult<P> {
        let mut tables = self.tables.lock();
        let now = Utc::now();

        // Remove first: success, expiry, and authorization failure all
        // consume the mapping.
        let Some(mapping) = tables.remove(key) else {
            return Err(BindingError::NotFound);
        };

        if mapping.expires_at <= now {
            tracing::debug!("artifact mapping expired before retrieval");
            return Err(BindingError::Expired);
        }

        if let Some(bound) = &mapping.relying_party {
            if requesting_party != Some(bound.as_str()) {
                tracing::warn!(
                    "artifact mapping bound to '{bound}' requested by '{}', mapping destroyed",
                    requesting_party.unwrap_or("<anonymous>")
                );
                return Err(BindingError::Unauthorized {
                    requester: requesting_party.map(str::to_string),
                });
            }
        }

        Ok(mapping.payload)
    }

    pub(super) fn relying_party(&self, key: &str) -> BindingResult<Option<String>> {
        let mut tables = self.tables.lock();
        let now = Utc::now();

        if let Some(mapping) = tables.by_key.get(key) {
            if mapping.expires_at > now {
                return Ok(mapping.relying_party.clone());
            }
        } else {
            return Err(BindingError::NotFound);
        }

        // Expired on touch: burn it and report it gone.
        tables.remove(key);
        Err(BindingError::NotFound)
    }
}

impl<P> Tables<P> {
    fn remove(&mut self, key: &str) -> Option<Mapping<P>> {
        let mapping = self.by_key.remove(key)?;
        if let Some(keys) = self.by_expiry.get_mut(&mapping.expires_at) {
            keys.retain(|k| k != key);
            if keys.is_empty() {
                self.by_expiry.remove(&mapping.expires_at);
            }
        }
        Some(mapping)
    }

    fn sweep(&mut self, now: DateTime<Utc>) -> usize {
        let due: Vec<DateTime<Utc>> = self.by_expiry.range(..=now).map(|(t, _)| *t).collect();
        let mut removed = 0;
        for deadline in due {
            if let Some(keys) = self.by_expiry.remove(&deadline) {
                for key in keys {
                    if self.by_key.remove(&key).is_some() {
                        removed += 1;
                    }
                }
            }
        }
        removed
    }
}
