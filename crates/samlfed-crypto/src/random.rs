//! Cryptographically secure random generation.
//!
//! Message handles identify artifacts on the wire, so they must come from a
//! cryptographically secure generator. A predictable handle would let an
//! attacker fetch a message that was never issued to them.

use rand::Rng;

/// Generates a cryptographically secure random byte vector.
///
/// Uses the thread-local random number generator which is cryptographically
/// secure by default.
///
/// # Arguments
///
/// * `len` - Number of random bytes to generate
#[must_use]
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut rng = rand::rng();
    let mut bytes = vec![0u8; len];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Generates a random 20-byte artifact message handle.
///
/// The SAML artifact format fixes message handles at 20 bytes. The handle
/// carries no structure, it is purely a random reference that the issuer
/// later resolves back to the stored message.
#[must_use]
pub fn random_handle() -> [u8; 20] {
    let mut rng = rand::rng();
    let mut handle = [0u8; 20];
    rng.fill(&mut handle[..]);
    handle
}
