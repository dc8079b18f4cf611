//! Property-based tests for the wire codec and crypto envelopes.

use alder_crypto::Envelope;
use alder_crypto::gcm::SessionCipher;
use alder_crypto::signatures::SigningKey;
use alder_integration_tests::node_strategy;
use alder_wire::cursor::var_int_len;
use alder_wire::{ByteCursor, decode, encode};
use proptest::collection::vec;
use proptest::prelude::*;

proptest! {
    #[test]
    fn fixed_width_fields_roundtrip(
        a in any::<u8>(),
        b in any::<u16>(),
        c in any::<i32>(),
        d in any::<u64>(),
        e in any::<f64>(),
    ) {
        let mut cursor = ByteCursor::with_capacity(32);
        cursor.write_u8(a).unwrap()
            .write_u16(b).unwrap()
            .write_i32(c).unwrap()
            .write_u64(d).unwrap()
            .write_f64(e).unwrap();
        let mut cursor = ByteCursor::wrap(cursor.into_written());
        prop_assert_eq!(cursor.read_u8().unwrap(), a);
        prop_assert_eq!(cursor.read_u16().unwrap(), b);
        prop_assert_eq!(cursor.read_i32().unwrap(), c);
        prop_assert_eq!(cursor.read_u64().unwrap(), d);
        prop_assert_eq!(cursor.read_f64().unwrap().to_bits(), e.to_bits());
        prop_assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn var_int_roundtrips_for_any_u32(value in any::<u32>()) {
        let mut cursor = ByteCursor::with_capacity(5);
        cursor.write_var_int(value).unwrap();
        prop_assert_eq!(cursor.written().len(), var_int_len(value));
        let mut cursor = ByteCursor::wrap(cursor.into_written());
        prop_assert_eq!(cursor.read_var_int().unwrap(), value);
        prop_assert_eq!(cursor.remaining(), 0);
    }

    #[test]
    fn node_codec_roundtrips(node in node_strategy()) {
        let encoded = encode(&node).unwrap();
        let decoded = decode(&encoded).unwrap();
        prop_assert_eq!(decoded, node);
    }

    #[test]
    fn envelope_roundtrips(
        id in any::<u32>(),
        iteration in any::<u32>(),
        cipher_text in vec(any::<u8>(), 0..256),
        seed in any::<[u8; 32]>(),
    ) {
        let key = SigningKey::from_bytes(&seed);
        let envelope = Envelope::new(id, iteration, cipher_text, &key).unwrap();
        let decoded = Envelope::from_bytes(envelope.as_bytes()).unwrap();
        prop_assert_eq!(&decoded, &envelope);
        prop_assert!(decoded.verify(&key.verifying_key()).is_ok());
    }

    #[test]
    fn session_cipher_roundtrips_in_order(
        key in any::<[u8; 32]>(),
        frames in vec(vec(any::<u8>(), 0..128), 1..8),
    ) {
        let mut tx = SessionCipher::new(key);
        let mut rx = SessionCipher::new(key);
        for frame in &frames {
            let sealed = tx.encrypt(frame).unwrap();
            prop_assert_eq!(&rx.decrypt(&sealed).unwrap(), frame);
        }
    }
}
