//! Signed, versioned ciphertext envelopes.
//!
//! The envelope is the container for signed binary blobs embedded in
//! node content, such as per-group message keys. Layout:
//!
//! ```text
//! [version: 1][structured fields][signature: 64]
//! ```
//!
//! The version byte packs the message version in the high nibble and
//! [`CURRENT_VERSION`] in the low nibble. The structured fields are a
//! protobuf-compatible encoding: field 1 varint `id`, field 2 varint
//! `iteration`, field 3 length-delimited `cipher_text`. The signature
//! covers everything before it and is computed at construction;
//! decoding captures it but does not verify — callers decide when (and
//! whether) to [`verify`](Envelope::verify), so verification can be
//! batched or skipped for trusted local storage.

use alder_wire::ByteCursor;
use alder_wire::cursor::var_int_len;

use crate::SIGNATURE_SIZE;
use crate::error::CryptoError;
use crate::signatures::{Signature, SigningKey, VerifyingKey};

/// Envelope format version.
pub const CURRENT_VERSION: u8 = 3;

// Protobuf field keys: (field number << 3) | wire type.
const FIELD_ID: u8 = 0x08;
const FIELD_ITERATION: u8 = 0x10;
const FIELD_CIPHER_TEXT: u8 = 0x1a;

/// A signed, versioned ciphertext container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    version: u8,
    id: u32,
    iteration: u32,
    cipher_text: Vec<u8>,
    signature: Signature,
    serialized: Vec<u8>,
}

impl Envelope {
    /// Build and sign an envelope.
    ///
    /// The signature is computed over the version byte and structured
    /// fields; the full serialization is cached.
    ///
    /// # Errors
    ///
    /// Returns a wire error when `cipher_text` exceeds the format's
    /// length limit.
    pub fn new(
        id: u32,
        iteration: u32,
        cipher_text: Vec<u8>,
        signing_key: &SigningKey,
    ) -> Result<Self, CryptoError> {
        let body_len = 1 + fields_len(id, iteration, &cipher_text)?;
        let mut cursor = ByteCursor::with_capacity(body_len + SIGNATURE_SIZE);
        cursor.write_u8(pack_version(CURRENT_VERSION))?;
        write_fields(&mut cursor, id, iteration, &cipher_text)?;

        let signature = signing_key.sign(cursor.written());
        cursor.write_bytes(signature.as_bytes())?;
        Ok(Self {
            version: CURRENT_VERSION,
            id,
            iteration,
            cipher_text,
            signature,
            serialized: cursor.into_written(),
        })
    }

    /// Reconstruct an envelope from its serialized form.
    ///
    /// The trailing signature is captured but not verified.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidMessage`] for inputs too short to
    /// hold a version byte, the three fields and a signature, or with
    /// unexpected field keys; wire errors for truncated field
    /// encodings.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() < 1 + SIGNATURE_SIZE {
            return Err(CryptoError::InvalidMessage(format!(
                "envelope too short: {} bytes",
                bytes.len()
            )));
        }
        let body_len = bytes.len() - SIGNATURE_SIZE;
        let signature = Signature::from_slice(&bytes[body_len..])?;

        let mut cursor = ByteCursor::wrap(bytes[..body_len].to_vec());
        let version = unpack_version(cursor.read_u8()?);
        let (id, iteration, cipher_text) = read_fields(&mut cursor)?;
        Ok(Self {
            version,
            id,
            iteration,
            cipher_text,
            signature,
            serialized: bytes.to_vec(),
        })
    }

    /// Validate the captured signature over the signed region.
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::InvalidSignature`] when it does not
    /// validate; the envelope must then be treated as untrusted.
    pub fn verify(&self, key: &VerifyingKey) -> Result<(), CryptoError> {
        let signed = &self.serialized[..self.serialized.len() - SIGNATURE_SIZE];
        key.verify(signed, &self.signature)
    }

    /// Message version from the high nibble of the version byte.
    #[must_use]
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Key identifier.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Ratchet iteration.
    #[must_use]
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    /// Encrypted payload.
    #[must_use]
    pub fn cipher_text(&self) -> &[u8] {
        &self.cipher_text
    }

    /// Trailing signature.
    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Full serialized form, signature included.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.serialized
    }
}

fn pack_version(version: u8) -> u8 {
    (version << 4) | CURRENT_VERSION
}

fn unpack_version(byte: u8) -> u8 {
    byte >> 4
}

fn cipher_text_len(cipher_text: &[u8]) -> Result<u32, CryptoError> {
    u32::try_from(cipher_text.len())
        .map_err(|_| alder_wire::WireError::LengthOverflow(cipher_text.len()).into())
}

fn fields_len(id: u32, iteration: u32, cipher_text: &[u8]) -> Result<usize, CryptoError> {
    let len = cipher_text_len(cipher_text)?;
    Ok(1 + var_int_len(id) + 1 + var_int_len(iteration) + 1 + var_int_len(len) + cipher_text.len())
}

fn write_fields(
    cursor: &mut ByteCursor,
    id: u32,
    iteration: u32,
    cipher_text: &[u8],
) -> Result<(), CryptoError> {
    cursor.write_u8(FIELD_ID)?.write_var_int(id)?;
    cursor.write_u8(FIELD_ITERATION)?.write_var_int(iteration)?;
    cursor
        .write_u8(FIELD_CIPHER_TEXT)?
        .write_var_int(cipher_text_len(cipher_text)?)?
        .write_bytes(cipher_text)?;
    Ok(())
}

fn read_fields(cursor: &mut ByteCursor) -> Result<(u32, u32, Vec<u8>), CryptoError> {
    expect_field(cursor, FIELD_ID)?;
    let id = cursor.read_var_int()?;
    expect_field(cursor, FIELD_ITERATION)?;
    let iteration = cursor.read_var_int()?;
    expect_field(cursor, FIELD_CIPHER_TEXT)?;
    let len = cursor.read_var_int()? as usize;
    let cipher_text = cursor.read_bytes(len)?;
    if cursor.remaining() != 0 {
        return Err(CryptoError::InvalidMessage(format!(
            "{} unexpected bytes after envelope fields",
            cursor.remaining()
        )));
    }
    Ok((id, iteration, cipher_text))
}

fn expect_field(cursor: &mut ByteCursor, key: u8) -> Result<(), CryptoError> {
    let actual = cursor.read_u8()?;
    if actual != key {
        return Err(CryptoError::InvalidMessage(format!(
            "unexpected field key 0x{actual:02X}, expected 0x{key:02X}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_core::OsRng;

    fn signing_key() -> SigningKey {
        SigningKey::from_bytes(&[11u8; 32])
    }

    #[test]
    fn roundtrip_preserves_fields() {
        let envelope = Envelope::new(42, 1337, vec![1, 2, 3, 4, 5], &signing_key()).unwrap();
        let decoded = Envelope::from_bytes(envelope.as_bytes()).unwrap();
        assert_eq!(decoded, envelope);
        assert_eq!(decoded.version(), CURRENT_VERSION);
        assert_eq!(decoded.id(), 42);
        assert_eq!(decoded.iteration(), 1337);
        assert_eq!(decoded.cipher_text(), &[1, 2, 3, 4, 5]);
    }

    #[test]
    fn layout_is_version_fields_signature() {
        let envelope = Envelope::new(1, 2, vec![0xaa; 3], &signing_key()).unwrap();
        let bytes = envelope.as_bytes();
        assert_eq!(bytes[0], (CURRENT_VERSION << 4) | CURRENT_VERSION);
        assert_eq!(bytes[1], FIELD_ID);
        assert_eq!(
            &bytes[bytes.len() - SIGNATURE_SIZE..],
            envelope.signature().as_bytes()
        );
    }

    #[test]
    fn decoded_signature_verifies() {
        let key = signing_key();
        let envelope = Envelope::new(7, 9, vec![0x55; 32], &key).unwrap();
        let decoded = Envelope::from_bytes(envelope.as_bytes()).unwrap();
        assert!(decoded.verify(&key.verifying_key()).is_ok());
    }

    #[test]
    fn tampered_field_fails_verification() {
        let key = signing_key();
        let envelope = Envelope::new(7, 9, vec![0x55; 8], &key).unwrap();
        let mut bytes = envelope.as_bytes().to_vec();
        bytes[2] ^= 0x01; // flip a bit of the id field
        let decoded = Envelope::from_bytes(&bytes).unwrap();
        assert!(matches!(
            decoded.verify(&key.verifying_key()),
            Err(CryptoError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_key_fails_verification() {
        let envelope = Envelope::new(7, 9, vec![0x55; 8], &signing_key()).unwrap();
        let other = SigningKey::generate(&mut OsRng);
        assert!(envelope.verify(&other.verifying_key()).is_err());
    }

    #[test]
    fn truncated_input_rejected() {
        let envelope = Envelope::new(7, 9, vec![0x55; 8], &signing_key()).unwrap();
        let bytes = envelope.as_bytes();
        assert!(Envelope::from_bytes(&bytes[..SIGNATURE_SIZE]).is_err());
        // Dropping one byte shears the signature boundary into the fields
        assert!(Envelope::from_bytes(&bytes[..bytes.len() - 1]).is_err());
    }

    #[test]
    fn empty_cipher_text_roundtrips() {
        let envelope = Envelope::new(0, 0, Vec::new(), &signing_key()).unwrap();
        let decoded = Envelope::from_bytes(envelope.as_bytes()).unwrap();
        assert_eq!(decoded.cipher_text(), &[] as &[u8]);
    }
}
