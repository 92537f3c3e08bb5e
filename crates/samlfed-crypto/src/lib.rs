//! # samlfed-crypto
//!
//! Hashing and secure random generation for the samlfed workspace.
//!
//! SAML artifacts and their source IDs are built from two primitives:
//!
//! - **SHA-1 digests** - entity IDs are condensed into 20-byte source IDs,
//!   and over-long storage keys are shortened to a fixed-width digest
//! - **Secure random bytes** - message handles must be unpredictable so an
//!   artifact cannot be guessed and resolved by a third party
//!
//! SHA-1 is retained here for wire compatibility with the SAML artifact
//! format, which fixes both fields at 20 bytes. It is never used for
//! signature or certificate validation.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod hash;
pub mod random;

pub use hash::{sha1, sha1_hex};
pub use random::{random_bytes, random_handle};
