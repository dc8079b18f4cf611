//! Shared tag dictionary for the node codec.
//!
//! Common protocol keywords are interned into single-byte tokens so
//! that the most frequent strings cost one byte on the wire. The table
//! is a static shared constant: both peers must hold byte-identical
//! copies for the encodings to interoperate, so entries are only ever
//! appended, never reordered.
//!
//! Structural tags occupy the values outside the token range and mark
//! list headers, length-delimited byte strings and varint numbers.

use std::collections::HashMap;
use std::sync::LazyLock;

/// Empty list (zero items follow).
pub const LIST_EMPTY: u8 = 0;
/// List header with a u8 item count.
pub const LIST_8: u8 = 248;
/// List header with a u16 item count.
pub const LIST_16: u8 = 249;
/// UTF-8 text content with a u8 length (non-dictionary strings).
pub const TEXT_8: u8 = 250;
/// Varint-encoded numeric content.
pub const NUMBER: u8 = 251;
/// Byte string with a u8 length.
pub const BINARY_8: u8 = 252;
/// Byte string with a 20-bit length packed into three bytes.
pub const BINARY_20: u8 = 253;
/// Byte string with a u32 length.
pub const BINARY_32: u8 = 254;
/// UTF-8 text content with a u32 length.
pub const TEXT_32: u8 = 255;

/// First tag value assigned to dictionary tokens.
pub const TOKEN_BASE: u8 = 3;

/// Largest byte string length representable with [`BINARY_20`].
pub const BINARY_20_MAX: usize = (1 << 20) - 1;

/// Single-byte token table, indexed from [`TOKEN_BASE`].
///
/// Order is wire-significant.
pub static TOKENS: &[&str] = &[
    "iq",
    "message",
    "presence",
    "receipt",
    "notification",
    "ack",
    "stream:features",
    "success",
    "failure",
    "error",
    "result",
    "type",
    "id",
    "from",
    "to",
    "xmlns",
    "class",
    "name",
    "get",
    "set",
    "query",
    "ping",
    "available",
    "unavailable",
    "composing",
    "paused",
    "read",
    "delivered",
    "played",
    "user",
    "device",
    "participant",
    "contact",
    "chat",
    "group",
    "groups",
    "member",
    "admin",
    "superadmin",
    "create",
    "add",
    "remove",
    "promote",
    "demote",
    "leave",
    "subject",
    "description",
    "invite",
    "body",
    "media",
    "image",
    "video",
    "audio",
    "document",
    "sticker",
    "url",
    "mimetype",
    "filehash",
    "mediakey",
    "duration",
    "width",
    "height",
    "count",
    "index",
    "key",
    "keys",
    "identity",
    "registration",
    "skey",
    "prekey",
    "signature",
    "session",
    "enc",
    "encrypt",
    "retry",
    "offline",
    "config",
    "props",
    "prop",
    "value",
    "version",
    "platform",
    "battery",
    "state",
    "active",
    "passive",
    "pair-device",
    "pair-success",
    "ref",
    "code",
    "challenge",
    "response",
    "stream:error",
    "conflict",
    "not-authorized",
    "timestamp",
    "t",
    "jid",
    "true",
    "false",
];

static TOKEN_INDEX: LazyLock<HashMap<&'static str, u8>> = LazyLock::new(|| {
    TOKENS
        .iter()
        .enumerate()
        .map(|(index, token)| (*token, TOKEN_BASE + index as u8))
        .collect()
});

/// Tag value for `string` when it is a dictionary member.
#[must_use]
pub fn token_tag(string: &str) -> Option<u8> {
    TOKEN_INDEX.get(string).copied()
}

/// Dictionary string for a token tag, if the tag is in the token range.
#[must_use]
pub fn token_string(tag: u8) -> Option<&'static str> {
    if tag < TOKEN_BASE {
        return None;
    }
    TOKENS.get(usize::from(tag - TOKEN_BASE)).copied()
}

/// Whether a tag byte falls inside the token range.
#[must_use]
pub fn is_token(tag: u8) -> bool {
    token_string(tag).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_fits_below_structural_tags() {
        assert!(TOKEN_BASE as usize + TOKENS.len() <= LIST_8 as usize);
    }

    #[test]
    fn no_duplicate_tokens() {
        let mut seen = std::collections::HashSet::new();
        for token in TOKENS {
            assert!(seen.insert(*token), "duplicate token: {token}");
        }
    }

    #[test]
    fn lookup_is_bidirectional() {
        for (index, token) in TOKENS.iter().enumerate() {
            let tag = TOKEN_BASE + index as u8;
            assert_eq!(token_tag(token), Some(tag));
            assert_eq!(token_string(tag), Some(*token));
            assert!(is_token(tag));
        }
    }

    #[test]
    fn out_of_range_tags_are_not_tokens() {
        assert_eq!(token_string(0), None);
        assert_eq!(token_string(TOKEN_BASE - 1), None);
        assert_eq!(token_string(LIST_8), None);
        assert_eq!(token_tag("definitely-not-a-token"), None);
    }
}
