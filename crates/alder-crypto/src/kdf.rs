//! SHA-256 hashing and HKDF key derivation.
//!
//! Pure functions over byte strings; the handshake owns all mutable
//! state.

use hkdf::Hkdf;
use sha2::{Digest, Sha256};

/// Compute the SHA-256 digest of `data`.
#[must_use]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Fold `data` into a rolling transcript hash:
/// `SHA256(transcript || data)`.
#[must_use]
pub fn transcript_fold(transcript: &[u8; 32], data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(transcript);
    hasher.update(data);
    hasher.finalize().into()
}

/// HKDF-SHA256 extract-and-expand with empty info, producing 64 bytes
/// of output keying material.
#[must_use]
pub fn expand(ikm: &[u8], salt: &[u8; 32]) -> [u8; 64] {
    let hkdf = Hkdf::<Sha256>::new(Some(salt), ikm);
    let mut okm = [0u8; 64];
    hkdf.expand(&[], &mut okm)
        .expect("64 bytes is a valid HKDF-SHA256 output length");
    okm
}
