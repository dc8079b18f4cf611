//! Shared helpers for Alder integration tests.
//!
//! The production crates only implement the client role; the responder
//! here mirrors the server side of the XX exchange out of the same
//! `Handshake` primitives so the full exchange can be exercised
//! end-to-end.

use alder_crypto::x25519::{PrivateKey, PublicKey};
use alder_crypto::{CryptoError, Handshake, SessionKeys};
use alder_wire::{Node, NodeContent};
use proptest::collection::vec;
use proptest::prelude::*;
use rand_core::{CryptoRng, RngCore};

/// The server-hello message produced by [`TestResponder::respond`].
pub struct ServerHello {
    /// Server ephemeral public key, sent in the clear
    pub ephemeral: [u8; 32],
    /// Server static public key, encrypted
    pub encrypted_static: Vec<u8>,
    /// Server payload (certificate stand-in), encrypted
    pub encrypted_payload: Vec<u8>,
}

/// Minimal server side of the XX exchange, for tests.
pub struct TestResponder {
    noise: Handshake,
    static_secret: PrivateKey,
    ephemeral_secret: PrivateKey,
}

impl TestResponder {
    /// Create a responder with fresh static and ephemeral keys.
    pub fn new<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        Self {
            noise: Handshake::new(),
            static_secret: PrivateKey::generate(rng),
            ephemeral_secret: PrivateKey::generate(rng),
        }
    }

    /// Consume the client hello and produce the server hello:
    /// `<- e, ee, s, es` with `payload` as the certificate stand-in.
    pub fn respond(
        &mut self,
        client_hello: &[u8; 32],
        payload: &[u8],
    ) -> Result<ServerHello, CryptoError> {
        let client_ephemeral = PublicKey::from_bytes(*client_hello);
        self.noise.update_hash(client_ephemeral.as_bytes());

        let ephemeral_public = self.ephemeral_secret.public_key();
        self.noise.update_hash(ephemeral_public.as_bytes());
        let shared = self.ephemeral_secret.exchange(&client_ephemeral)?;
        self.noise.mix_into_key(shared.as_bytes());

        let static_public = self.static_secret.public_key();
        let encrypted_static = self.noise.encrypt(static_public.as_bytes())?;
        let shared = self.static_secret.exchange(&client_ephemeral)?;
        self.noise.mix_into_key(shared.as_bytes());

        let encrypted_payload = self.noise.encrypt(payload)?;
        Ok(ServerHello {
            ephemeral: ephemeral_public.to_bytes(),
            encrypted_static,
            encrypted_payload,
        })
    }

    /// Consume the client finish: `-> s, se`. Returns the client's
    /// payload and the responder's session keys, already swapped so
    /// that its write key matches the client's read key.
    pub fn finish(
        &mut self,
        encrypted_static: &[u8],
        encrypted_payload: &[u8],
    ) -> Result<(Vec<u8>, SessionKeys), CryptoError> {
        let static_bytes = self.noise.decrypt(encrypted_static)?;
        let client_static: [u8; 32] = static_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidMessage("client static key length".into()))?;
        let shared = self
            .ephemeral_secret
            .exchange(&PublicKey::from_bytes(client_static))?;
        self.noise.mix_into_key(shared.as_bytes());

        let payload = self.noise.decrypt(encrypted_payload)?;
        let keys = self.noise.finish();
        let swapped = SessionKeys {
            write_key: keys.read_key,
            read_key: keys.write_key,
        };
        Ok((payload, swapped))
    }
}

fn content_strategy(node: impl Strategy<Value = Node> + Clone) -> impl Strategy<Value = NodeContent> {
    prop_oneof![
        vec(any::<u8>(), 0..64).prop_map(NodeContent::Bytes),
        "[ -~]{0,32}".prop_map(NodeContent::Text),
        any::<u32>().prop_map(NodeContent::Number),
        vec(node, 0..4).prop_map(NodeContent::Children),
    ]
}

fn description_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("message".to_owned()),
        Just("iq".to_owned()),
        Just("presence".to_owned()),
        "[a-z][a-z0-9:-]{0,14}",
    ]
}

/// Arbitrary node trees covering all four content kinds, token and
/// non-token strings, and nesting.
pub fn node_strategy() -> impl Strategy<Value = Node> {
    let leaf = (
        description_strategy(),
        vec(("[a-z]{1,8}", "[ -~]{0,16}"), 0..4),
    )
        .prop_map(|(description, attributes)| {
            let mut node = Node::new(description);
            for (key, value) in attributes {
                node = node.attr(key, value);
            }
            node
        });
    leaf.prop_recursive(3, 24, 4, |inner| {
        (
            description_strategy(),
            vec(("[a-z]{1,8}", "[ -~]{0,16}"), 0..4),
            proptest::option::of(content_strategy(inner)),
        )
            .prop_map(|(description, attributes, content)| {
                let mut node = Node::new(description);
                for (key, value) in attributes {
                    node = node.attr(key, value);
                }
                if let Some(content) = content {
                    node = node.content(content);
                }
                node
            })
    })
}
