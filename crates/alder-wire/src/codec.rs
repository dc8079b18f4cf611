//! Node tree <-> compact binary encoding.
//!
//! A node serializes as a list whose item count is [`Node::size`]:
//! the description string, one item per attribute key and value, and
//! the optional content. Strings are a single token byte when the
//! string is in the shared dictionary, otherwise length-delimited
//! UTF-8. Content dispatches on its own tag: byte string, text,
//! varint number, or a counted list of recursively encoded children.
//!
//! `decode(encode(n))` is structurally equal to `n` for every
//! representable tree.

use crate::cursor::{ByteCursor, var_int_len};
use crate::error::WireError;
use crate::node::{Node, NodeContent};
use crate::tokens::{
    BINARY_8, BINARY_20, BINARY_20_MAX, BINARY_32, LIST_8, LIST_16, LIST_EMPTY, NUMBER, TEXT_8,
    TEXT_32, TOKEN_BASE, token_string, token_tag,
};

/// Encode a node tree to its wire representation.
///
/// # Errors
///
/// Returns [`WireError::LengthOverflow`] when a list or byte string
/// exceeds the limits of the format. Any tree within those limits
/// encodes successfully.
pub fn encode(node: &Node) -> Result<Vec<u8>, WireError> {
    let mut cursor = ByteCursor::with_capacity(node_len(node)?);
    write_node(&mut cursor, node)?;
    Ok(cursor.into_written())
}

/// Decode a single node tree, requiring the input to be fully consumed.
///
/// # Errors
///
/// Fails on truncated input, an unrecognized tag or token, invalid
/// UTF-8, an empty node list, or bytes trailing the root node.
pub fn decode(bytes: &[u8]) -> Result<Node, WireError> {
    let mut cursor = ByteCursor::wrap(bytes.to_vec());
    let node = decode_node(&mut cursor)?;
    if cursor.remaining() != 0 {
        return Err(WireError::TrailingBytes {
            consumed: cursor.position(),
            limit: cursor.limit(),
        });
    }
    Ok(node)
}

/// Encode a node into an existing cursor.
///
/// # Errors
///
/// As [`encode`], plus [`WireError::CapacityExceeded`] when the cursor
/// cannot hold the encoding.
pub fn write_node(cursor: &mut ByteCursor, node: &Node) -> Result<(), WireError> {
    write_list_header(cursor, node.size())?;
    write_string(cursor, node.description())?;
    for (key, value) in node.attrs().iter() {
        write_string(cursor, key)?;
        write_string(cursor, value)?;
    }
    if let Some(content) = node.get_content() {
        write_content(cursor, content)?;
    }
    Ok(())
}

/// Decode one node from the cursor, leaving any following bytes.
///
/// # Errors
///
/// As [`decode`], without the trailing-bytes check.
pub fn decode_node(cursor: &mut ByteCursor) -> Result<Node, WireError> {
    let tag = cursor.read_u8()?;
    let size = read_list_size(cursor, tag)?;
    if size == 0 {
        return Err(WireError::EmptyNode);
    }

    let mut node = Node::new(read_string(cursor)?);
    let attribute_count = (size - 1) / 2;
    for _ in 0..attribute_count {
        let key = read_string(cursor)?;
        let value = read_string(cursor)?;
        node = node.attr(key, value);
    }
    if (size - 1) % 2 == 1 {
        node = node.content(read_content(cursor)?);
    }
    Ok(node)
}

/// Exact length of a node's wire encoding.
///
/// # Errors
///
/// Returns [`WireError::LengthOverflow`] for trees outside the format
/// limits.
pub fn node_len(node: &Node) -> Result<usize, WireError> {
    let mut len = list_header_len(node.size())? + string_len(node.description())?;
    for (key, value) in node.attrs().iter() {
        len += string_len(key)? + string_len(value)?;
    }
    if let Some(content) = node.get_content() {
        len += content_len(content)?;
    }
    Ok(len)
}

fn list_header_len(count: usize) -> Result<usize, WireError> {
    match count {
        0 => Ok(1),
        1..=0xff => Ok(2),
        0x100..=0xffff => Ok(3),
        _ => Err(WireError::LengthOverflow(count)),
    }
}

fn blob_len(len: usize) -> Result<usize, WireError> {
    if len <= 0xff {
        Ok(2 + len)
    } else if len <= BINARY_20_MAX {
        Ok(4 + len)
    } else if len <= u32::MAX as usize {
        Ok(5 + len)
    } else {
        Err(WireError::LengthOverflow(len))
    }
}

fn string_len(string: &str) -> Result<usize, WireError> {
    if token_tag(string).is_some() {
        Ok(1)
    } else {
        blob_len(string.len())
    }
}

fn text_len(text: &str) -> Result<usize, WireError> {
    if token_tag(text).is_some() {
        Ok(1)
    } else if text.len() <= 0xff {
        Ok(2 + text.len())
    } else if text.len() <= u32::MAX as usize {
        Ok(5 + text.len())
    } else {
        Err(WireError::LengthOverflow(text.len()))
    }
}

fn content_len(content: &NodeContent) -> Result<usize, WireError> {
    match content {
        NodeContent::Bytes(bytes) => blob_len(bytes.len()),
        NodeContent::Text(text) => text_len(text),
        NodeContent::Number(number) => Ok(1 + var_int_len(*number)),
        NodeContent::Children(children) => {
            let mut len = list_header_len(children.len())?;
            for child in children {
                len += node_len(child)?;
            }
            Ok(len)
        }
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_list_header(cursor: &mut ByteCursor, count: usize) -> Result<(), WireError> {
    match count {
        0 => cursor.write_u8(LIST_EMPTY)?,
        1..=0xff => cursor.write_u8(LIST_8)?.write_u8(count as u8)?,
        0x100..=0xffff => cursor.write_u8(LIST_16)?.write_u16(count as u16)?,
        _ => return Err(WireError::LengthOverflow(count)),
    };
    Ok(())
}

#[allow(clippy::cast_possible_truncation)]
fn write_blob(cursor: &mut ByteCursor, bytes: &[u8]) -> Result<(), WireError> {
    let len = bytes.len();
    if len <= 0xff {
        cursor.write_u8(BINARY_8)?.write_u8(len as u8)?;
    } else if len <= BINARY_20_MAX {
        cursor
            .write_u8(BINARY_20)?
            .write_u8(((len >> 16) & 0x0f) as u8)?
            .write_u8(((len >> 8) & 0xff) as u8)?
            .write_u8((len & 0xff) as u8)?;
    } else if len <= u32::MAX as usize {
        cursor.write_u8(BINARY_32)?.write_u32(len as u32)?;
    } else {
        return Err(WireError::LengthOverflow(len));
    }
    cursor.write_bytes(bytes)?;
    Ok(())
}

fn write_string(cursor: &mut ByteCursor, string: &str) -> Result<(), WireError> {
    match token_tag(string) {
        Some(tag) => {
            cursor.write_u8(tag)?;
            Ok(())
        }
        None => write_blob(cursor, string.as_bytes()),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn write_text(cursor: &mut ByteCursor, text: &str) -> Result<(), WireError> {
    if let Some(tag) = token_tag(text) {
        cursor.write_u8(tag)?;
        return Ok(());
    }
    let len = text.len();
    if len <= 0xff {
        cursor.write_u8(TEXT_8)?.write_u8(len as u8)?;
    } else if len <= u32::MAX as usize {
        cursor.write_u8(TEXT_32)?.write_u32(len as u32)?;
    } else {
        return Err(WireError::LengthOverflow(len));
    }
    cursor.write_string(text)?;
    Ok(())
}

fn write_content(cursor: &mut ByteCursor, content: &NodeContent) -> Result<(), WireError> {
    match content {
        NodeContent::Bytes(bytes) => write_blob(cursor, bytes),
        NodeContent::Text(text) => write_text(cursor, text),
        NodeContent::Number(number) => {
            cursor.write_u8(NUMBER)?.write_var_int(*number)?;
            Ok(())
        }
        NodeContent::Children(children) => {
            write_list_header(cursor, children.len())?;
            for child in children {
                write_node(cursor, child)?;
            }
            Ok(())
        }
    }
}

fn read_list_size(cursor: &mut ByteCursor, tag: u8) -> Result<usize, WireError> {
    match tag {
        LIST_EMPTY => Ok(0),
        LIST_8 => Ok(usize::from(cursor.read_u8()?)),
        LIST_16 => Ok(usize::from(cursor.read_u16()?)),
        _ => Err(WireError::UnexpectedTag(tag)),
    }
}

fn read_blob_len(cursor: &mut ByteCursor, tag: u8) -> Result<usize, WireError> {
    match tag {
        BINARY_8 => Ok(usize::from(cursor.read_u8()?)),
        BINARY_20 => {
            let high = usize::from(cursor.read_u8()? & 0x0f);
            let mid = usize::from(cursor.read_u8()?);
            let low = usize::from(cursor.read_u8()?);
            Ok((high << 16) | (mid << 8) | low)
        }
        BINARY_32 => Ok(cursor.read_u32()? as usize),
        _ => Err(WireError::UnexpectedTag(tag)),
    }
}

fn read_blob(cursor: &mut ByteCursor, tag: u8) -> Result<Vec<u8>, WireError> {
    let len = read_blob_len(cursor, tag)?;
    cursor.read_bytes(len)
}

fn read_string(cursor: &mut ByteCursor) -> Result<String, WireError> {
    let tag = cursor.read_u8()?;
    if let Some(token) = token_string(tag) {
        return Ok(token.to_owned());
    }
    match tag {
        BINARY_8 | BINARY_20 | BINARY_32 => {
            let len = read_blob_len(cursor, tag)?;
            cursor.read_string(len)
        }
        tag if tag >= TOKEN_BASE && tag < LIST_8 => Err(WireError::UnknownToken(tag)),
        tag => Err(WireError::UnexpectedTag(tag)),
    }
}

fn read_text(cursor: &mut ByteCursor, tag: u8) -> Result<String, WireError> {
    let len = match tag {
        TEXT_8 => usize::from(cursor.read_u8()?),
        TEXT_32 => cursor.read_u32()? as usize,
        _ => return Err(WireError::UnexpectedTag(tag)),
    };
    cursor.read_string(len)
}

fn read_content(cursor: &mut ByteCursor) -> Result<NodeContent, WireError> {
    let tag = cursor.read_u8()?;
    if let Some(token) = token_string(tag) {
        return Ok(NodeContent::Text(token.to_owned()));
    }
    match tag {
        LIST_EMPTY | LIST_8 | LIST_16 => {
            let count = read_list_size(cursor, tag)?;
            let mut children = Vec::with_capacity(count.min(1024));
            for _ in 0..count {
                children.push(decode_node(cursor)?);
            }
            Ok(NodeContent::Children(children))
        }
        NUMBER => Ok(NodeContent::Number(cursor.read_var_int()?)),
        BINARY_8 | BINARY_20 | BINARY_32 => Ok(NodeContent::Bytes(read_blob(cursor, tag)?)),
        TEXT_8 | TEXT_32 => Ok(NodeContent::Text(read_text(cursor, tag)?)),
        tag if tag >= TOKEN_BASE && tag < LIST_8 => Err(WireError::UnknownToken(tag)),
        tag => Err(WireError::UnexpectedTag(tag)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokens::TOKENS;

    fn roundtrip(node: &Node) -> Node {
        let encoded = encode(node).expect("encode");
        assert_eq!(encoded.len(), node_len(node).unwrap());
        decode(&encoded).expect("decode")
    }

    #[test]
    fn bare_node() {
        let node = Node::new("presence");
        assert_eq!(roundtrip(&node), node);
        // Token description: list header (2) + one token byte
        assert_eq!(encode(&node).unwrap().len(), 3);
    }

    #[test]
    fn non_token_description_is_inlined() {
        let node = Node::new("custom-element");
        assert_eq!(roundtrip(&node), node);
        let encoded = encode(&node).unwrap();
        assert_eq!(encoded[2], BINARY_8);
        assert_eq!(encoded[3] as usize, "custom-element".len());
    }

    #[test]
    fn attributes_roundtrip() {
        let node = Node::new("iq")
            .attr("type", "get")
            .attr("id", "17")
            .attr("custom", "value-1");
        assert_eq!(roundtrip(&node), node);
    }

    #[test]
    fn bytes_content_roundtrip() {
        let node = Node::new("enc").bytes(vec![0u8, 1, 2, 250, 255]);
        assert_eq!(roundtrip(&node), node);
    }

    #[test]
    fn text_content_roundtrip() {
        // Token text, short inline text, and text that looks like bytes
        for text in ["composing", "hello there", "415"] {
            let node = Node::new("body").text(text);
            assert_eq!(roundtrip(&node), node, "text: {text}");
        }
    }

    #[test]
    fn number_content_roundtrip() {
        for number in [0u32, 1, 127, 128, 1 << 20, u32::MAX] {
            let node = Node::new("count").number(number);
            assert_eq!(roundtrip(&node), node);
        }
    }

    #[test]
    fn children_content_roundtrip() {
        let node = Node::new("iq").attr("id", "1").children(vec![
            Node::new("query")
                .attr("xmlns", "urn:alder:sync")
                .children(vec![Node::new("item").number(4)]),
            Node::new("ping"),
        ]);
        assert_eq!(roundtrip(&node), node);
    }

    #[test]
    fn empty_child_list_roundtrip() {
        let node = Node::new("groups").children(Vec::new());
        let decoded = roundtrip(&node);
        assert_eq!(decoded, node);
        assert!(decoded.has_content());
    }

    #[test]
    fn binary_20_length_class() {
        let payload = vec![0x5a; 300];
        let node = Node::new("enc").bytes(payload);
        let encoded = encode(&node).unwrap();
        assert_eq!(roundtrip(&node), node);
        // description token (1) + list header (2) puts the content tag at 3
        assert_eq!(encoded[3], BINARY_20);
        assert_eq!(&encoded[4..7], &[0x00, 0x01, 0x2c]);
    }

    #[test]
    fn truncated_input_fails() {
        let node = Node::new("message").attr("id", "9").text("hello");
        let encoded = encode(&node).unwrap();
        for cut in 1..encoded.len() {
            assert!(
                decode(&encoded[..cut]).is_err(),
                "truncation at {cut} must fail"
            );
        }
    }

    #[test]
    fn unknown_token_fails() {
        // Highest unused token index
        let unused = TOKEN_BASE + TOKENS.len() as u8;
        let bytes = [LIST_8, 1, unused];
        assert_eq!(decode(&bytes).unwrap_err(), WireError::UnknownToken(unused));
    }

    #[test]
    fn unexpected_tag_fails() {
        // 1 is not a valid node list header
        assert_eq!(decode(&[1, 1, 3]).unwrap_err(), WireError::UnexpectedTag(1));
    }

    #[test]
    fn empty_node_list_fails() {
        assert_eq!(decode(&[LIST_EMPTY]).unwrap_err(), WireError::EmptyNode);
    }

    #[test]
    fn trailing_bytes_fail() {
        let mut encoded = encode(&Node::new("ping")).unwrap();
        let consumed = encoded.len();
        encoded.push(0x00);
        assert_eq!(
            decode(&encoded).unwrap_err(),
            WireError::TrailingBytes {
                consumed,
                limit: consumed + 1,
            }
        );
    }

    #[test]
    fn invalid_utf8_in_string_fails() {
        // The reported offset points at the string bytes, past the
        // length prefix
        let bytes = [LIST_8, 1, BINARY_8, 2, 0xff, 0xfe];
        assert_eq!(
            decode(&bytes).unwrap_err(),
            WireError::InvalidUtf8 { offset: 4 }
        );
    }
}
