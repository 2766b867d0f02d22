//! ArtPollReply codec and the poll responder

use artnode_core::{
    identity::{LONG_NAME_LENGTH, NODE_REPORT_LENGTH, SHORT_NAME_LENGTH},
    AddressingMode, NodeIdentity, TransportInfo,
};
use std::net::Ipv4Addr;

use super::opcode::OpCode;
use super::packet::{decode_header, write_header};
use super::{clip, read_str, write_str};
use crate::error::DecodeError;

/// Size of an ArtPollReply
pub const POLL_REPLY_LENGTH: usize = 239;

/// Firmware version reported to controllers
pub const FIRMWARE_VERSION: u16 = 0x0100;

/// OEM code reported to controllers
pub const OEM_CODE: u16 = 0x08B1;

/// Port type: DMX512 output
pub const PORT_TYPE_DMX_OUTPUT: u8 = 0x80;

/// GoodOutput: data is being transmitted
const GOOD_OUTPUT_TRANSMITTING: u8 = 0x80;

/// Status2: node supports 15-bit Port-Address
const STATUS2_PORT_ADDRESS_15BIT: u8 = 0x08;

/// Style code of a DMX node
const STYLE_NODE: u8 = 0x00;

/// Node identification and status announced in reply to ArtPoll
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReply {
    pub ip: Ipv4Addr,
    pub port: u16,
    pub version_info: u16,
    pub net_switch: u8,
    pub sub_switch: u8,
    pub oem: u16,
    pub ubea_version: u8,
    pub status1: u8,
    pub esta_code: u16,
    pub short_name: String,
    pub long_name: String,
    pub node_report: String,
    pub num_ports: u16,
    pub port_types: [u8; 4],
    pub good_input: [u8; 4],
    pub good_output: [u8; 4],
    pub sw_in: [u8; 4],
    pub sw_out: [u8; 4],
    pub sw_video: u8,
    pub sw_macro: u8,
    pub sw_remote: u8,
    pub style: u8,
    pub mac: [u8; 6],
    pub bind_ip: Ipv4Addr,
    pub bind_index: u8,
    pub status2: u8,
}

/// Encode an ArtPollReply; reserved and unused bytes are zero
pub fn encode_poll_reply(reply: &PollReply) -> [u8; POLL_REPLY_LENGTH] {
    let mut packet = [0u8; POLL_REPLY_LENGTH];

    write_header(&mut packet, OpCode::PollReply);
    packet[10..14].copy_from_slice(&reply.ip.octets());
    packet[14..16].copy_from_slice(&reply.port.to_le_bytes());
    packet[16..18].copy_from_slice(&reply.version_info.to_be_bytes());
    packet[18] = reply.net_switch;
    packet[19] = reply.sub_switch;
    packet[20..22].copy_from_slice(&reply.oem.to_be_bytes());
    packet[22] = reply.ubea_version;
    packet[23] = reply.status1;
    packet[24..26].copy_from_slice(&reply.esta_code.to_le_bytes());
    write_str(&mut packet[26..44], &reply.short_name);
    write_str(&mut packet[44..108], &reply.long_name);
    write_str(&mut packet[108..172], &reply.node_report);
    packet[172..174].copy_from_slice(&reply.num_ports.to_be_bytes());
    packet[174..178].copy_from_slice(&reply.port_types);
    packet[178..182].copy_from_slice(&reply.good_input);
    packet[182..186].copy_from_slice(&reply.good_output);
    packet[186..190].copy_from_slice(&reply.sw_in);
    packet[190..194].copy_from_slice(&reply.sw_out);
    packet[194] = reply.sw_video;
    packet[195] = reply.sw_macro;
    packet[196] = reply.sw_remote;
    // 197..200 spare
    packet[200] = reply.style;
    packet[201..207].copy_from_slice(&reply.mac);
    packet[207..211].copy_from_slice(&reply.bind_ip.octets());
    packet[211] = reply.bind_index;
    packet[212] = reply.status2;
    // 213..239 filler

    packet
}

/// Decode an ArtPollReply
pub fn decode_poll_reply(bytes: &[u8]) -> Result<PollReply, DecodeError> {
    decode_header(bytes)?;
    if bytes.len() < POLL_REPLY_LENGTH {
        return Err(DecodeError::Truncated {
            expected: POLL_REPLY_LENGTH,
            actual: bytes.len(),
        });
    }

    let quad = |at: usize| [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]];
    let mut mac = [0u8; 6];
    mac.copy_from_slice(&bytes[201..207]);

    Ok(PollReply {
        ip: Ipv4Addr::from(quad(10)),
        port: u16::from_le_bytes([bytes[14], bytes[15]]),
        version_info: u16::from_be_bytes([bytes[16], bytes[17]]),
        net_switch: bytes[18],
        sub_switch: bytes[19],
        oem: u16::from_be_bytes([bytes[20], bytes[21]]),
        ubea_version: bytes[22],
        status1: bytes[23],
        esta_code: u16::from_le_bytes([bytes[24], bytes[25]]),
        short_name: read_str(&bytes[26..44]),
        long_name: read_str(&bytes[44..108]),
        node_report: read_str(&bytes[108..172]),
        num_ports: u16::from_be_bytes([bytes[172], bytes[173]]),
        port_types: quad(174),
        good_input: quad(178),
        good_output: quad(182),
        sw_in: quad(186),
        sw_out: quad(190),
        sw_video: bytes[194],
        sw_macro: bytes[195],
        sw_remote: bytes[196],
        style: bytes[200],
        mac,
        bind_ip: Ipv4Addr::from(quad(207)),
        bind_index: bytes[211],
        status2: bytes[212],
    })
}

/// Builds poll replies for a single-output node
#[derive(Debug, Clone)]
pub struct PollResponder {
    addressing: AddressingMode,
    output_active: bool,
}

impl PollResponder {
    pub fn new(addressing: AddressingMode, output_active: bool) -> Self {
        Self {
            addressing,
            output_active,
        }
    }

    /// Snapshot the identity and transport info into a reply
    pub fn build(&self, identity: &NodeIdentity, transport: &TransportInfo) -> PollReply {
        let address = identity.address();

        let mut good_output = [0u8; 4];
        if self.output_active {
            good_output[0] = GOOD_OUTPUT_TRANSMITTING;
        }

        let status2 = match self.addressing {
            AddressingMode::PortAddress => STATUS2_PORT_ADDRESS_15BIT,
            AddressingMode::Legacy => 0,
        };

        PollReply {
            ip: transport.ip,
            port: transport.port,
            version_info: FIRMWARE_VERSION,
            net_switch: address.net,
            sub_switch: address.sub_net,
            oem: OEM_CODE,
            ubea_version: 0,
            status1: 0,
            esta_code: 0,
            short_name: clip(&identity.short_name, SHORT_NAME_LENGTH).to_string(),
            long_name: clip(&identity.long_name, LONG_NAME_LENGTH).to_string(),
            node_report: clip(&identity.node_report, NODE_REPORT_LENGTH).to_string(),
            num_ports: 1,
            port_types: [PORT_TYPE_DMX_OUTPUT, 0, 0, 0],
            good_input: [0; 4],
            good_output,
            sw_in: [0; 4],
            sw_out: [address.universe, 0, 0, 0],
            sw_video: 0,
            sw_macro: 0,
            sw_remote: 0,
            style: STYLE_NODE,
            mac: transport.mac,
            bind_ip: transport.ip,
            bind_index: 1,
            status2,
        }
    }

    /// Build and encode a reply
    pub fn respond(
        &self,
        identity: &NodeIdentity,
        transport: &TransportInfo,
    ) -> [u8; POLL_REPLY_LENGTH] {
        encode_poll_reply(&self.build(identity, transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> TransportInfo {
        TransportInfo {
            ip: Ipv4Addr::new(10, 0, 0, 7),
            mac: [1, 2, 3, 4, 5, 6],
            ..Default::default()
        }
    }

    #[test]
    fn test_poll_reply_layout() {
        let identity = NodeIdentity {
            net: 2,
            sub_net: 3,
            universe: 4,
            short_name: "Dimmer".to_string(),
            ..Default::default()
        };
        let packet = PollResponder::new(AddressingMode::PortAddress, true)
            .respond(&identity, &transport());

        assert_eq!(packet.len(), 239);
        assert_eq!(&packet[0..8], b"Art-Net\0");
        assert_eq!(&packet[8..10], &[0x00, 0x21]);
        assert_eq!(&packet[10..14], &[10, 0, 0, 7]);
        // Port 0x1936 little-endian
        assert_eq!(&packet[14..16], &[0x36, 0x19]);
        assert_eq!(&packet[16..18], &[0x01, 0x00]);
        assert_eq!(packet[18], 2);
        assert_eq!(packet[19], 3);
        assert_eq!(&packet[20..22], &[0x08, 0xB1]);
        assert_eq!(&packet[26..32], b"Dimmer");
        assert_eq!(packet[32], 0);
        assert_eq!(&packet[108..110], b"OK");
        assert_eq!(&packet[172..174], &[0, 1]);
        assert_eq!(packet[174], PORT_TYPE_DMX_OUTPUT);
        assert_eq!(packet[182], GOOD_OUTPUT_TRANSMITTING);
        assert_eq!(packet[190], 4);
        assert_eq!(&packet[201..207], &[1, 2, 3, 4, 5, 6]);
        assert_eq!(packet[212], STATUS2_PORT_ADDRESS_15BIT);
        assert!(packet[213..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_poll_reply_roundtrip() {
        let reply = PollResponder::new(AddressingMode::Legacy, false)
            .build(&NodeIdentity::default(), &transport());
        let decoded = decode_poll_reply(&encode_poll_reply(&reply)).unwrap();
        assert_eq!(decoded, reply);
    }

    #[test]
    fn test_long_names_truncated_with_terminator() {
        let identity = NodeIdentity {
            short_name: "x".repeat(40),
            ..Default::default()
        };
        let packet = PollResponder::new(AddressingMode::PortAddress, false)
            .respond(&identity, &transport());
        assert!(packet[26..43].iter().all(|b| *b == b'x'));
        assert_eq!(packet[43], 0);
    }
}
