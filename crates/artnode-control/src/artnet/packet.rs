//! Packet header and ArtDmx frame codec
//!
//! Every field is read and written explicitly with its wire byte order:
//! the opcode is little-endian, protocol version and channel count are
//! big-endian.

use artnode_core::{PortAddress, DMX_CHANNELS};

use super::opcode::OpCode;
use super::{ARTNET_ID, HEADER_LENGTH, PROTOCOL_VERSION};
use crate::error::DecodeError;

/// Length of the fixed ArtDmx prefix before channel data
pub const DMX_PREFIX_LENGTH: usize = 18;

/// Decoded common header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    pub opcode: OpCode,
}

/// Decode the identifier and opcode shared by all packets
pub fn decode_header(bytes: &[u8]) -> Result<PacketHeader, DecodeError> {
    if bytes.len() < HEADER_LENGTH || bytes[..8] != ARTNET_ID[..] {
        return Err(DecodeError::MalformedHeader);
    }
    let opcode = u16::from_le_bytes([bytes[8], bytes[9]]);
    Ok(PacketHeader {
        opcode: OpCode::from(opcode),
    })
}

/// Write the identifier and opcode into the start of `packet`
pub(crate) fn write_header(packet: &mut [u8], opcode: OpCode) {
    packet[..8].copy_from_slice(ARTNET_ID);
    packet[8..10].copy_from_slice(&opcode.value().to_le_bytes());
}

/// One ArtDmx frame, borrowing its channel data from the datagram
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFrame<'a> {
    /// Protocol version of the sender
    pub version: u16,
    /// Sequence number (0 = sequencing disabled)
    pub sequence: u8,
    /// Physical input port of the sender, informational
    pub physical: u8,
    /// Target universe
    pub address: PortAddress,
    /// Channel count as declared by the sender
    pub declared_length: u16,
    /// Channel data actually present, clamped to the datagram and to 512
    pub data: &'a [u8],
}

impl<'a> DataFrame<'a> {
    /// Frame whose declared length matches its data
    pub fn new(address: PortAddress, sequence: u8, data: &'a [u8]) -> Self {
        let data = &data[..data.len().min(DMX_CHANNELS)];
        Self {
            version: PROTOCOL_VERSION,
            sequence,
            physical: 0,
            address,
            declared_length: data.len() as u16,
            data,
        }
    }

    /// Number of channels available to ingest
    pub fn channel_count(&self) -> usize {
        self.data.len()
    }

    /// Whether the sender declared more channels than it delivered
    pub fn is_clamped(&self) -> bool {
        self.declared_length as usize > self.data.len()
    }
}

/// Decode an ArtDmx packet
///
/// The declared channel count is never trusted upward: the data slice ends
/// at whichever comes first of the declared count, the end of the datagram
/// and 512 channels.
pub fn decode_data_frame(bytes: &[u8]) -> Result<DataFrame<'_>, DecodeError> {
    decode_header(bytes)?;
    if bytes.len() < DMX_PREFIX_LENGTH {
        return Err(DecodeError::Truncated {
            expected: DMX_PREFIX_LENGTH,
            actual: bytes.len(),
        });
    }

    let version = u16::from_be_bytes([bytes[10], bytes[11]]);
    let declared_length = u16::from_be_bytes([bytes[16], bytes[17]]);
    let available = bytes.len() - DMX_PREFIX_LENGTH;
    let count = (declared_length as usize).min(available).min(DMX_CHANNELS);

    Ok(DataFrame {
        version,
        sequence: bytes[12],
        physical: bytes[13],
        address: PortAddress::from_wire(bytes[14], bytes[15]),
        declared_length,
        data: &bytes[DMX_PREFIX_LENGTH..DMX_PREFIX_LENGTH + count],
    })
}

/// Encode an ArtDmx packet
///
/// The length field carries `frame.declared_length`, so a frame that declares
/// more channels than it holds is sent overstated, the way some senders do.
/// Any frame produced by [`decode_data_frame`] encodes back to the same frame.
pub fn encode_data_frame(frame: &DataFrame<'_>) -> Vec<u8> {
    let data = &frame.data[..frame.data.len().min(DMX_CHANNELS)];
    let mut packet = vec![0u8; DMX_PREFIX_LENGTH + data.len()];

    write_header(&mut packet, OpCode::Dmx);
    packet[10..12].copy_from_slice(&frame.version.to_be_bytes());
    packet[12] = frame.sequence;
    packet[13] = frame.physical;
    packet[14] = frame.address.sub_uni();
    packet[15] = frame.address.net;
    packet[16..18].copy_from_slice(&frame.declared_length.to_be_bytes());
    packet[DMX_PREFIX_LENGTH..].copy_from_slice(data);

    packet
}
