//! # Alder Crypto
//!
//! Secure channel establishment for the Alder messaging protocol.
//!
//! This crate provides:
//! - `Noise_XX` handshake with a rolling SHA-256 transcript
//! - AES-256-GCM AEAD framing keyed from the handshake
//! - HKDF-SHA256 key derivation
//! - X25519 key exchange and Ed25519 signed envelopes
//!
//! ## Cryptographic Suite
//!
//! The suite is fixed by [`PROTOCOL_NAME`], which seeds the handshake
//! transcript; changing any algorithm is a wire-incompatible change.
//!
//! | Function | Algorithm |
//! |----------|-----------|
//! | Key Exchange | X25519 |
//! | AEAD | AES-256-GCM |
//! | Hash | SHA-256 |
//! | KDF | HKDF-SHA256 |
//! | Signatures | Ed25519 |
//!
//! ## Concurrency
//!
//! One [`Handshake`] and one pair of session ciphers exist per logical
//! connection. Their nonce counters and transcript are sequential,
//! order-dependent state: confine them to one task per connection or
//! guard the whole object with a single mutex. Nothing here blocks on
//! I/O; all inputs are in-memory byte buffers.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod envelope;
pub mod error;
pub mod gcm;
pub mod handshake;
pub mod kdf;
pub mod signatures;
pub mod x25519;

pub use envelope::Envelope;
pub use error::CryptoError;
pub use gcm::SessionCipher;
pub use handshake::{ClientFinish, Handshake, Initiator};

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Handshake pattern, cipher and hash suite identifier.
///
/// Seeds the transcript hash, salt and crypto key of every new
/// handshake. Exactly 32 bytes, zero-padded.
pub const PROTOCOL_NAME: [u8; 32] = *b"Noise_XX_25519_AESGCM_SHA256\0\0\0\0";

/// Fixed marker sent as the first bytes of every new connection and
/// folded into the transcript before any other handshake data.
pub const PROLOGUE: [u8; 4] = *b"AL\x03\x00";

/// Symmetric key size (AES-256-GCM)
pub const KEY_SIZE: usize = 32;

/// AES-GCM nonce size
pub const NONCE_SIZE: usize = 12;

/// AEAD authentication tag size
pub const TAG_SIZE: usize = 16;

/// X25519 / Ed25519 public key size
pub const PUBLIC_KEY_SIZE: usize = 32;

/// Ed25519 signature size
pub const SIGNATURE_SIZE: usize = 64;

/// Directional session keys derived by [`Handshake::finish`].
///
/// The sole output the transport receives from this crate: it applies
/// them with AES-GCM and its own independent per-direction nonce
/// counters for all post-handshake traffic (see
/// [`SessionCipher`]). Zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionKeys {
    /// Key for outbound traffic
    pub write_key: [u8; KEY_SIZE],
    /// Key for inbound traffic
    pub read_key: [u8; KEY_SIZE],
}
