//! # samlfed-cache
//!
//! Expiring text storage and replay detection.
//!
//! Federation deployments need a small amount of short-lived shared state:
//! artifact mappings waiting to be resolved, and the IDs of messages that
//! have already been accepted. Both reduce to the same primitive, a
//! key-value store of text records with per-record expiry, which this crate
//! models as the [`TextStore`] trait.
//!
//! - [`store`] - the [`TextStore`] trait and backend size limits
//! - [`memory`] - a process-local [`MemoryTextStore`]
//! - [`replay`] - first-seen tracking of message IDs over any [`TextStore`]
//!
//! A clustered deployment points these at a store backed by its shared
//! database or cache tier. The in-process store is correct for a single
//! node and a warning is logged when replay detection falls back to it.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod error;
pub mod memory;
pub mod replay;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryTextStore;
pub use replay::ReplayCache;
pub use store::{StoreCaps, TextStore};
