//! Noise XX handshake state machine.
//!
//! [`Handshake`] holds the symmetric protocol state: the rolling
//! SHA-256 transcript, the HKDF chaining salt, the current AEAD key
//! and its nonce counter. It is driven through the exchange by
//! [`Initiator`], which performs the three XX messages for the client
//! role and hands the derived [`SessionKeys`] to the transport.
//!
//! There is no failure state: any AEAD failure, malformed frame or
//! low-order peer key aborts the whole session; the object is dropped
//! and a fresh connection starts over. Key material is zeroized on
//! drop.

use rand_core::{CryptoRng, RngCore};
use tracing::{debug, trace};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;
use crate::x25519::{PrivateKey, PublicKey};
use crate::{KEY_SIZE, PROLOGUE, PROTOCOL_NAME, SessionKeys, gcm, kdf};

/// Symmetric handshake state.
///
/// Invariants:
/// - `counter` increases by one per successful cipher invocation and
///   resets to zero exactly when [`mix_into_key`](Self::mix_into_key)
///   rederives `salt` and `key`.
/// - The transcript is updated once per handshake message sent or
///   received and once more per cipher operation, and both peers must
///   observe identical bytes: the ciphertext is folded in on both the
///   encrypt and the decrypt side.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Handshake {
    transcript: [u8; 32],
    salt: [u8; 32],
    key: [u8; KEY_SIZE],
    counter: u64,
}

impl Handshake {
    /// Create a handshake seeded from [`PROTOCOL_NAME`], with
    /// [`PROLOGUE`] already folded into the transcript.
    #[must_use]
    pub fn new() -> Self {
        let mut handshake = Self {
            transcript: PROTOCOL_NAME,
            salt: PROTOCOL_NAME,
            key: PROTOCOL_NAME,
            counter: 0,
        };
        handshake.update_hash(&PROLOGUE);
        handshake
    }

    /// Fold unencrypted handshake bytes into the transcript:
    /// `transcript = SHA256(transcript || data)`.
    pub fn update_hash(&mut self, data: &[u8]) {
        self.transcript = kdf::transcript_fold(&self.transcript, data);
    }

    /// Encrypt a handshake payload under the current key and counter,
    /// with the transcript as associated data, then fold the
    /// ciphertext into the transcript.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::EncryptionFailed`] if AEAD encryption
    /// fails.
    pub fn encrypt(&mut self, plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let ciphertext = gcm::encrypt(&self.key, self.counter, &self.transcript, plaintext)?;
        self.counter += 1;
        self.update_hash(&ciphertext);
        Ok(ciphertext)
    }

    /// Decrypt a handshake payload, then fold the ciphertext as
    /// received (not the recovered plaintext) into the transcript, so
    /// both peers hash identical bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::DecryptionFailed`] on authentication
    /// failure, which is fatal for the connection.
    pub fn decrypt(&mut self, ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let plaintext = gcm::decrypt(&self.key, self.counter, &self.transcript, ciphertext)?;
        self.counter += 1;
        self.update_hash(ciphertext);
        Ok(plaintext)
    }

    /// Mix a Diffie-Hellman result into the key schedule.
    ///
    /// `salt || key = HKDF(ikm = material, salt = salt)`; the nonce
    /// counter resets to zero for the new key. Called once per DH
    /// output, three times across a full XX exchange.
    pub fn mix_into_key(&mut self, material: &[u8]) {
        let mut expanded = kdf::expand(material, &self.salt);
        self.salt.copy_from_slice(&expanded[..32]);
        self.key.copy_from_slice(&expanded[32..]);
        self.counter = 0;
        expanded.zeroize();
    }

    /// Derive the directional session keys from the final salt:
    /// `write || read = HKDF(ikm = zeros, salt = salt)`.
    ///
    /// Deterministic for a given state; the handshake is discarded
    /// after this and each direction keeps its own nonce counter from
    /// here on.
    #[must_use]
    pub fn finish(&self) -> SessionKeys {
        let mut expanded = kdf::expand(&[0u8; 32], &self.salt);
        let mut keys = SessionKeys {
            write_key: [0u8; KEY_SIZE],
            read_key: [0u8; KEY_SIZE],
        };
        keys.write_key.copy_from_slice(&expanded[..32]);
        keys.read_key.copy_from_slice(&expanded[32..]);
        expanded.zeroize();
        keys
    }

    /// Cipher invocations since the last re-key.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }
}

impl Default for Handshake {
    fn default() -> Self {
        Self::new()
    }
}

/// Client-side progress through the XX exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Constructed, nothing sent
    Initialized,
    /// Ephemeral key sent in the clear
    HelloSent,
    /// Server ephemeral, static and payload processed
    ServerHelloRead,
    /// Session keys derived, object is spent
    Finished,
}

/// Output of the final handshake message.
pub struct ClientFinish {
    /// Client static key, encrypted to the server
    pub encrypted_static: Vec<u8>,
    /// Client payload, encrypted to the server
    pub encrypted_payload: Vec<u8>,
    /// Derived directional session keys
    pub keys: SessionKeys,
}

/// Drives [`Handshake`] through the XX pattern as the connecting
/// client.
///
/// Message sequence, one method per message:
///
/// ```text
/// -> e                  client_hello
/// <- e, ee, s, es       read_server_hello
/// -> s, se              client_finish
/// ```
///
/// The server payload returned by
/// [`read_server_hello`](Self::read_server_hello) carries the server's
/// certificate chain; verifying it is the caller's responsibility
/// before `client_finish` is sent.
pub struct Initiator {
    noise: Handshake,
    static_secret: PrivateKey,
    static_public: PublicKey,
    ephemeral_secret: PrivateKey,
    ephemeral_public: PublicKey,
    server_ephemeral: Option<PublicKey>,
    phase: Phase,
}

impl Initiator {
    /// Create an initiator around the client's static identity key,
    /// generating a fresh ephemeral key.
    pub fn new<R: RngCore + CryptoRng>(static_secret: PrivateKey, rng: &mut R) -> Self {
        let static_public = static_secret.public_key();
        let ephemeral_secret = PrivateKey::generate(rng);
        let ephemeral_public = ephemeral_secret.public_key();
        Self {
            noise: Handshake::new(),
            static_secret,
            static_public,
            ephemeral_secret,
            ephemeral_public,
            server_ephemeral: None,
            phase: Phase::Initialized,
        }
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Produce the first message: the ephemeral public key, sent in
    /// the clear and folded into the transcript.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidState`] when called out of order.
    pub fn client_hello(&mut self) -> Result<[u8; 32], CryptoError> {
        if self.phase != Phase::Initialized {
            return Err(CryptoError::InvalidState);
        }
        self.noise.update_hash(self.ephemeral_public.as_bytes());
        self.phase = Phase::HelloSent;
        debug!("client hello prepared");
        Ok(self.ephemeral_public.to_bytes())
    }

    /// Process the server's reply: its clear ephemeral key, its
    /// encrypted static key, and an encrypted payload.
    ///
    /// Performs the `ee` and `es` mixes and returns the decrypted
    /// payload for the caller to verify.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidState`] out of order,
    /// [`CryptoError::DecryptionFailed`] on any AEAD failure,
    /// [`CryptoError::LowOrderPoint`] on a degenerate server key,
    /// [`CryptoError::InvalidMessage`] when the decrypted static key
    /// is not 32 bytes.
    pub fn read_server_hello(
        &mut self,
        server_ephemeral: &[u8; 32],
        encrypted_static: &[u8],
        encrypted_payload: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if self.phase != Phase::HelloSent {
            return Err(CryptoError::InvalidState);
        }
        let server_ephemeral = PublicKey::from_bytes(*server_ephemeral);
        self.noise.update_hash(server_ephemeral.as_bytes());

        let shared = self.ephemeral_secret.exchange(&server_ephemeral)?;
        self.noise.mix_into_key(shared.as_bytes());

        let static_bytes = self.noise.decrypt(encrypted_static)?;
        let server_static: [u8; 32] = static_bytes.as_slice().try_into().map_err(|_| {
            CryptoError::InvalidMessage(format!(
                "server static key: expected 32 bytes, got {}",
                static_bytes.len()
            ))
        })?;
        let shared = self
            .ephemeral_secret
            .exchange(&PublicKey::from_bytes(server_static))?;
        self.noise.mix_into_key(shared.as_bytes());

        let payload = self.noise.decrypt(encrypted_payload)?;
        self.server_ephemeral = Some(server_ephemeral);
        self.phase = Phase::ServerHelloRead;
        trace!(payload_len = payload.len(), "server hello processed");
        Ok(payload)
    }

    /// Produce the final message: the client's encrypted static key
    /// and encrypted payload, after the `se` mix; derives the session
    /// keys.
    ///
    /// # Errors
    ///
    /// [`CryptoError::InvalidState`] out of order, otherwise as the
    /// underlying cipher operations.
    pub fn client_finish(&mut self, payload: &[u8]) -> Result<ClientFinish, CryptoError> {
        if self.phase != Phase::ServerHelloRead {
            return Err(CryptoError::InvalidState);
        }
        let encrypted_static = self.noise.encrypt(self.static_public.as_bytes())?;

        let server_ephemeral = self.server_ephemeral.ok_or(CryptoError::InvalidState)?;
        let shared = self.static_secret.exchange(&server_ephemeral)?;
        self.noise.mix_into_key(shared.as_bytes());

        let encrypted_payload = self.noise.encrypt(payload)?;
        let keys = self.noise.finish();
        self.phase = Phase::Finished;
        debug!("handshake finished, session keys derived");
        Ok(ClientFinish {
            encrypted_static,
            encrypted_payload,
            keys,
        })
    }
}
