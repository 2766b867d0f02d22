//! Art-Net wire codec
//!
//! Art-Net is a UDP protocol for transmitting DMX512 over Ethernet. Every
//! packet starts with the 8-byte identifier `"Art-Net\0"` followed by a
//! little-endian opcode.
//!
//! This module only converts between bytes and typed packets; it performs no
//! I/O and holds no state.
//!
//! ## Example
//!
//! ```rust
//! use artnode_control::artnet::{decode_data_frame, encode_data_frame, DataFrame};
//! use artnode_core::PortAddress;
//!
//! let channels = [255u8, 128, 0];
//! let frame = DataFrame::new(PortAddress::new(0, 0, 1), 1, &channels);
//! let packet = encode_data_frame(&frame);
//!
//! let decoded = decode_data_frame(&packet).unwrap();
//! assert_eq!(decoded.data, &channels);
//! ```

pub mod opcode;
pub mod packet;
pub mod poll;
pub mod program;

pub use opcode::OpCode;
pub use packet::{
    decode_data_frame, decode_header, encode_data_frame, DataFrame, PacketHeader,
    DMX_PREFIX_LENGTH,
};
pub use poll::{decode_poll_reply, encode_poll_reply, PollReply, PollResponder, POLL_REPLY_LENGTH};
pub use program::{
    decode_address, decode_ip_prog, encode_address, encode_ip_prog, encode_ip_prog_reply,
    AddressCommand, IpProgCommand,
};

/// Packet identifier
pub const ARTNET_ID: &[u8; 8] = b"Art-Net\0";

/// Identifier plus opcode
pub const HEADER_LENGTH: usize = 10;

/// Protocol revision written into outgoing packets
pub const PROTOCOL_VERSION: u16 = 14;

/// Longest prefix of `text` that fits a `field`-byte wire field with its NUL
///
/// Never splits a UTF-8 sequence.
pub(crate) fn clip(text: &str, field: usize) -> &str {
    let mut end = text.len().min(field.saturating_sub(1));
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// Copy `text` into a NUL-padded field, always leaving room for the NUL
pub(crate) fn write_str(field: &mut [u8], text: &str) {
    field.fill(0);
    let text = clip(text, field.len());
    field[..text.len()].copy_from_slice(text.as_bytes());
}

/// Read a NUL-terminated field
///
/// The result is clipped like [`write_str`] input, so it always fits back
/// into a field of the same width even when the sender omitted the NUL or
/// sent invalid UTF-8.
pub(crate) fn read_str(field: &[u8]) -> String {
    let end = field.iter().position(|b| *b == 0).unwrap_or(field.len());
    let text = String::from_utf8_lossy(&field[..end]);
    clip(&text, field.len()).to_string()
}
