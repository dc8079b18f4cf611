//! # Alder Wire
//!
//! Binary wire format for the Alder messaging protocol.
//!
//! This crate provides:
//! - [`ByteCursor`] - fixed-capacity byte buffer with an explicit
//!   read/write cursor and integer/varint/byte primitives
//! - [`Node`] - the recursive description/attributes/content tree the
//!   protocol exchanges
//! - [`codec`] - the dictionary-backed tag codec mapping trees to and
//!   from their compact binary representation
//! - [`tokens`] - the shared static tag dictionary
//!
//! No cryptography lives here; the encrypted channel wrapping these
//! bytes is `alder-crypto`'s concern.
//!
//! ## Concurrency
//!
//! A [`ByteCursor`] is sequential mutable state and must not be shared
//! across threads without external synchronization. The tag dictionary
//! is immutable static data, safe for unsynchronized concurrent reads.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod codec;
pub mod cursor;
pub mod error;
pub mod node;
pub mod tokens;

pub use codec::{decode, decode_node, encode, write_node};
pub use cursor::ByteCursor;
pub use error::WireError;
pub use node::{Attributes, Node, NodeContent};
