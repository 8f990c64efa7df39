//! Wire codec for the identifier lookup protocol.
//!
//! Requests are exactly 8 bytes: the identifier in big-endian order with no
//! header or terminator. Responses are classified by length alone:
//! - 0 bytes: the peer closed the connection
//! - 4 bytes: an IPv4 address in network byte order
//! - anything else: unrecognized, kept only for display

use bytes::Bytes;

/// Size of a request frame on the wire.
pub const REQUEST_FRAME_LEN: usize = 8;

/// Size of an address response payload.
pub const ADDRESS_LEN: usize = 4;

/// A received payload, classified by length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Zero-length read: the peer closed the connection.
    Closed,
    /// Four bytes: an IPv4 address, reported both as an integer and a
    /// dotted quad.
    Address { value: u32, dotted: String },
    /// Any other length: displayed raw, not decoded further.
    Unexpected(Bytes),
}

/// Encode an identifier as its 8-byte big-endian wire representation.
pub fn encode_identifier(id: u64) -> [u8; REQUEST_FRAME_LEN] {
    id.to_be_bytes()
}

/// Decode a 4-byte payload as an IPv4 address in network byte order.
///
/// Returns the big-endian integer value and the dotted-quad rendering of
/// the same four bytes.
pub fn decode_address(payload: &[u8; ADDRESS_LEN]) -> (u32, String) {
    let value = u32::from_be_bytes(*payload);
    let dotted = format!(
        "{}.{}.{}.{}",
        payload[0], payload[1], payload[2], payload[3]
    );
    (value, dotted)
}

/// Classify a received payload by its length.
pub fn classify(payload: Bytes) -> Reply {
    match payload.len() {
        0 => Reply::Closed,
        ADDRESS_LEN => {
            let mut quad = [0u8; ADDRESS_LEN];
            quad.copy_from_slice(&payload);
            let (value, dotted) = decode_address(&quad);
            Reply::Address { value, dotted }
        }
        _ => Reply::Unexpected(payload),
    }
}

/// Render bytes as space-separated lowercase hex for display.
pub fn hex_bytes(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        // Writing to a String cannot fail.
        let _ = write!(out, "{:02x}", b);
    }
    out
}
