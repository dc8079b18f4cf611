//! Cryptographic error types.

use thiserror::Error;

/// Errors raised while establishing or using the secure channel.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// AEAD encryption failed
    #[error("encryption failed")]
    EncryptionFailed,

    /// AEAD authentication failure on decrypt.
    ///
    /// Fatal and non-retryable: the session cannot be trusted and must
    /// be torn down and re-established from a fresh handshake.
    #[error("decryption failed: authentication failure")]
    DecryptionFailed,

    /// Key material of the wrong length
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected length
        expected: usize,
        /// Actual length
        actual: usize,
    },

    /// Operation called out of order on the handshake
    #[error("invalid state for operation")]
    InvalidState,

    /// Diffie-Hellman peer key was a low-order point
    #[error("low-order public key rejected")]
    LowOrderPoint,

    /// Signature does not validate (untrusted envelope)
    #[error("invalid signature")]
    InvalidSignature,

    /// Malformed public key encoding
    #[error("invalid public key")]
    InvalidPublicKey,

    /// Malformed handshake or envelope message
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// Wire-level decode failure
    #[error("wire error: {0}")]
    Wire(#[from] alder_wire::WireError),
}
