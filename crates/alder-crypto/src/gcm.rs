//! AES-256-GCM with counter-derived nonces.
//!
//! The handshake and the post-handshake session framing both encrypt
//! with AES-256-GCM under a 96-bit nonce built from a monotonic
//! counter: four zero bytes followed by the counter in big-endian.
//! Nonce uniqueness therefore rests on the counter never repeating
//! under one key; counters reset only when the key is rederived.

use aes_gcm::aead::{Aead, Payload};
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::{KEY_SIZE, NONCE_SIZE};

/// Build the 96-bit nonce for a counter value.
#[must_use]
pub fn nonce_for_counter(counter: u64) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    nonce[4..].copy_from_slice(&counter.to_be_bytes());
    nonce
}

/// Encrypt `plaintext`, appending the 16-byte authentication tag.
///
/// # Errors
///
/// Returns [`CryptoError::EncryptionFailed`] if AEAD encryption fails.
pub fn encrypt(
    key: &[u8; KEY_SIZE],
    counter: u64,
    aad: &[u8],
    plaintext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = nonce_for_counter(counter);
    Aes256Gcm::new(key.into())
        .encrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: plaintext,
                aad,
            },
        )
        .map_err(|_| CryptoError::EncryptionFailed)
}

/// Decrypt `ciphertext` (tag included), verifying tag and associated
/// data.
///
/// # Errors
///
/// Returns [`CryptoError::DecryptionFailed`] on authentication
/// failure. This error is fatal for the connection.
pub fn decrypt(
    key: &[u8; KEY_SIZE],
    counter: u64,
    aad: &[u8],
    ciphertext: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let nonce = nonce_for_counter(counter);
    Aes256Gcm::new(key.into())
        .decrypt(
            Nonce::from_slice(&nonce),
            Payload {
                msg: ciphertext,
                aad,
            },
        )
        .map_err(|_| CryptoError::DecryptionFailed)
}

/// One direction of post-handshake traffic.
///
/// Wraps a session key from [`crate::SessionKeys`] with its own
/// monotonic nonce counter, independent of the handshake's counter and
/// of the opposite direction. No associated data: the transcript ends
/// with the handshake. Key material is zeroized on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct SessionCipher {
    key: [u8; KEY_SIZE],
    counter: u64,
}

impl SessionCipher {
    /// Create a cipher for one direction of a session.
    #[must_use]
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self { key, counter: 0 }
    }

    /// Messages processed so far.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Encrypt the next outbound message.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EncryptionFailed`] if AEAD encryption
    /// fails.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let ciphertext = encrypt(&self.key, self.counter, &[], plaintext)?;
        self.counter += 1;
        Ok(ciphertext)
    }

    /// Decrypt the next inbound message.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::DecryptionFailed`] on authentication
    /// failure; the session must then be torn down.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let plaintext = decrypt(&self.key, self.counter, &[], ciphertext)?;
        self.counter += 1;
        Ok(plaintext)
    }
}
