//! ArtAddress and ArtIpProg codecs
//!
//! Both messages let a controller reprogram a node remotely. Each field is
//! only meant to be applied when its program flag is set; the flags are
//! exposed as methods so the engine never inspects raw bits.

use artnode_core::TransportInfo;
use std::net::Ipv4Addr;

use super::opcode::OpCode;
use super::packet::{decode_header, write_header};
use super::{read_str, write_str, PROTOCOL_VERSION};
use crate::error::DecodeError;

/// Size of an ArtAddress packet
pub const ADDRESS_LENGTH: usize = 107;

/// Minimum ArtIpProg size that carries IP and subnet mask
pub const IP_PROG_MIN_LENGTH: usize = 24;

/// Size of a full ArtIpProg packet
pub const IP_PROG_LENGTH: usize = 34;

/// Size of an ArtIpProgReply
pub const IP_PROG_REPLY_LENGTH: usize = 34;

/// Bit 7 of a switch field: program this switch
const PROGRAM_BIT: u8 = 0x80;

/// Decoded ArtAddress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressCommand {
    pub net_switch: u8,
    pub bind_index: u8,
    /// `None` when the sender left the field empty
    pub short_name: Option<String>,
    /// `None` when the sender left the field empty
    pub long_name: Option<String>,
    pub sw_in: [u8; 4],
    pub sw_out: [u8; 4],
    pub sub_switch: u8,
    pub sw_video: u8,
    pub command: u8,
}

impl AddressCommand {
    /// New net switch, if the sender asked to program it
    pub fn net(&self) -> Option<u8> {
        programmed(self.net_switch, 0x7F)
    }

    /// New sub-net switch, if the sender asked to program it
    pub fn sub_net(&self) -> Option<u8> {
        programmed(self.sub_switch, 0x0F)
    }

    /// New output universe for port 0, if the sender asked to program it
    pub fn universe(&self) -> Option<u8> {
        programmed(self.sw_out[0], 0x0F)
    }
}

fn programmed(field: u8, mask: u8) -> Option<u8> {
    (field & PROGRAM_BIT != 0).then_some(field & mask)
}

fn optional_name(field: &[u8]) -> Option<String> {
    (field[0] != 0).then(|| read_str(field))
}

/// Decode an ArtAddress packet
pub fn decode_address(bytes: &[u8]) -> Result<AddressCommand, DecodeError> {
    decode_header(bytes)?;
    if bytes.len() < ADDRESS_LENGTH {
        return Err(DecodeError::Truncated {
            expected: ADDRESS_LENGTH,
            actual: bytes.len(),
        });
    }

    let quad = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
    Ok(AddressCommand {
        net_switch: bytes[12],
        bind_index: bytes[13],
        short_name: optional_name(&bytes[14..32]),
        long_name: optional_name(&bytes[32..96]),
        sw_in: quad(96),
        sw_out: quad(100),
        sub_switch: bytes[104],
        sw_video: bytes[105],
        command: bytes[106],
    })
}

/// Encode an ArtAddress packet
pub fn encode_address(command: &AddressCommand) -> [u8; ADDRESS_LENGTH] {
    let mut packet = [0u8; ADDRESS_LENGTH];
    write_header(&mut packet, OpCode::Address);
    packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet[12] = command.net_switch;
    packet[13] = command.bind_index;
    if let Some(name) = &command.short_name {
        write_str(&mut packet[14..32], name);
    }
    if let Some(name) = &command.long_name {
        write_str(&mut packet[32..96], name);
    }
    packet[96..100].copy_from_slice(&command.sw_in);
    packet[100..104].copy_from_slice(&command.sw_out);
    packet[104] = command.sub_switch;
    packet[105] = command.sw_video;
    packet[106] = command.command;
    packet
}

/// Decoded ArtIpProg
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IpProgCommand {
    pub command: u8,
    pub ip: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    /// Deprecated port field, absent in short packets
    pub port: Option<u16>,
}

impl IpProgCommand {
    /// Programming is enabled; without this all other bits are ignored
    pub fn is_enabled(&self) -> bool {
        self.command & 0x80 != 0
    }

    pub fn enables_dhcp(&self) -> bool {
        self.is_enabled() && self.command & 0x40 != 0
    }

    pub fn resets_to_default(&self) -> bool {
        self.is_enabled() && self.command & 0x08 != 0
    }

    pub fn programs_ip(&self) -> bool {
        self.is_enabled() && self.command & 0x04 != 0
    }

    pub fn programs_subnet_mask(&self) -> bool {
        self.is_enabled() && self.command & 0x02 != 0
    }

    pub fn programs_port(&self) -> bool {
        self.is_enabled() && self.command & 0x01 != 0
    }
}

/// Decode an ArtIpProg packet
pub fn decode_ip_prog(bytes: &[u8]) -> Result<IpProgCommand, DecodeError> {
    decode_header(bytes)?;
    if bytes.len() < IP_PROG_MIN_LENGTH {
        return Err(DecodeError::Truncated {
            expected: IP_PROG_MIN_LENGTH,
            actual: bytes.len(),
        });
    }

    let port = (bytes.len() >= 26).then(|| u16::from_be_bytes([bytes[24], bytes[25]]));
    Ok(IpProgCommand {
        command: bytes[14],
        ip: Ipv4Addr::new(bytes[16], bytes[17], bytes[18], bytes[19]),
        subnet_mask: Ipv4Addr::new(bytes[20], bytes[21], bytes[22], bytes[23]),
        port,
    })
}

/// Encode an ArtIpProg packet
pub fn encode_ip_prog(command: &IpProgCommand) -> [u8; IP_PROG_LENGTH] {
    let mut packet = [0u8; IP_PROG_LENGTH];
    write_header(&mut packet, OpCode::IpProg);
    packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet[14] = command.command;
    packet[16..20].copy_from_slice(&command.ip.octets());
    packet[20..24].copy_from_slice(&command.subnet_mask.octets());
    if let Some(port) = command.port {
        packet[24..26].copy_from_slice(&port.to_be_bytes());
    }
    packet
}

/// Encode an ArtIpProgReply describing the current transport settings
pub fn encode_ip_prog_reply(transport: &TransportInfo) -> [u8; IP_PROG_REPLY_LENGTH] {
    let mut packet = [0u8; IP_PROG_REPLY_LENGTH];
    write_header(&mut packet, OpCode::IpProgReply);
    packet[10..12].copy_from_slice(&PROTOCOL_VERSION.to_be_bytes());
    packet[16..20].copy_from_slice(&transport.ip.octets());
    packet[20..24].copy_from_slice(&transport.subnet_mask.octets());
    packet[24..26].copy_from_slice(&transport.port.to_be_bytes());
    packet
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address_command() -> AddressCommand {
        AddressCommand {
            net_switch: 0x80 | 5,
            bind_index: 0,
            short_name: Some("Renamed".to_string()),
            long_name: None,
            sw_in: [0; 4],
            sw_out: [0x80 | 9, 0, 0, 0],
            sub_switch: 0x7F,
            sw_video: 0,
            command: 0,
        }
    }

    #[test]
    fn test_address_roundtrip() {
        let command = address_command();
        let decoded = decode_address(&encode_address(&command)).unwrap();
        assert_eq!(decoded, command);
    }

    #[test]
    fn test_program_flags() {
        let command = address_command();
        assert_eq!(command.net(), Some(5));
        assert_eq!(command.universe(), Some(9));
        // Bit 7 clear: no change requested
        assert_eq!(command.sub_net(), None);
    }

    #[test]
    fn test_short_address_packet() {
        let packet = encode_address(&address_command());
        assert_eq!(
            decode_address(&packet[..60]),
            Err(DecodeError::Truncated {
                expected: ADDRESS_LENGTH,
                actual: 60
            })
        );
    }

    #[test]
    fn test_ip_prog_flags_require_enable() {
        let command = IpProgCommand {
            command: 0x04,
            ip: Ipv4Addr::new(2, 0, 0, 10),
            subnet_mask: Ipv4Addr::new(255, 0, 0, 0),
            port: None,
        };
        assert!(!command.is_enabled());
        assert!(!command.programs_ip());

        let enabled = IpProgCommand {
            command: 0x84,
            ..command
        };
        assert!(enabled.programs_ip());
        assert!(!enabled.programs_subnet_mask());
    }

    #[test]
    fn test_ip_prog_decode() {
        let command = IpProgCommand {
            command: 0x86,
            ip: Ipv4Addr::new(2, 0, 0, 10),
            subnet_mask: Ipv4Addr::new(255, 0, 0, 0),
            port: Some(0x1936),
        };
        let decoded = decode_ip_prog(&encode_ip_prog(&command)).unwrap();
        assert_eq!(decoded, command);

        let short = decode_ip_prog(&encode_ip_prog(&command)[..24]).unwrap();
        assert_eq!(short.port, None);
    }

    #[test]
    fn test_ip_prog_reply_layout() {
        let transport = TransportInfo {
            ip: Ipv4Addr::new(192, 168, 0, 20),
            ..Default::default()
        };
        let packet = encode_ip_prog_reply(&transport);
        assert_eq!(&packet[8..10], &[0x00, 0xF9]);
        assert_eq!(&packet[16..20], &[192, 168, 0, 20]);
        assert_eq!(&packet[20..24], &[255, 255, 255, 0]);
        assert_eq!(&packet[24..26], &[0x19, 0x36]);
    }
}
