//! SHA-1 digest helpers.
//!
//! The SAML artifact format fixes source IDs at 20 bytes, the width of a
//! SHA-1 digest of the issuer's entity ID. Storage backends with bounded key
//! sizes also rely on the fixed digest width to shorten arbitrary keys.

use sha1::{Digest, Sha1};

/// Computes the SHA-1 digest of the input.
///
/// # Arguments
///
/// * `data` - Bytes to digest
///
/// # Returns
///
/// The 20-byte SHA-1 digest.
#[must_use]
pub fn sha1(data: &[u8]) -> [u8; 20] {
    let mut hasher = Sha1::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes the SHA-1 digest of the input and returns it hex-encoded.
///
/// The result is always 40 lowercase hex characters, which makes it suitable
/// as a fixed-width storage key for arbitrary-length input.
#[must_use]
pub fn sha1_hex(data: &[u8]) -> String {
    hex::encode(sha1(data))
}
