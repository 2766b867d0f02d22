//! Node identity and Art-Net addressing
//!
//! An Art-Net node is addressed by a 15-bit Port-Address split into three
//! switches: `Net` (7 bits), `Sub-Net` (4 bits) and `Universe` (4 bits). On the
//! wire the lower byte carries sub-net and universe as two nibbles (`SubUni`)
//! and the upper byte carries the net.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};

/// Short name field width on the wire (including the terminating NUL)
pub const SHORT_NAME_LENGTH: usize = 18;
/// Long name field width on the wire (including the terminating NUL)
pub const LONG_NAME_LENGTH: usize = 64;
/// Node report field width on the wire (including the terminating NUL)
pub const NODE_REPORT_LENGTH: usize = 64;

/// Combined net / sub-net / universe address of a DMX universe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PortAddress {
    /// Net switch (0-127)
    pub net: u8,
    /// Sub-net switch (0-15)
    pub sub_net: u8,
    /// Universe switch (0-15)
    pub universe: u8,
}

impl PortAddress {
    /// Create an address, masking each switch to its wire width
    pub const fn new(net: u8, sub_net: u8, universe: u8) -> Self {
        Self {
            net: net & 0x7F,
            sub_net: sub_net & 0x0F,
            universe: universe & 0x0F,
        }
    }

    /// Build an address from the two wire bytes of an ArtDmx packet
    pub const fn from_wire(sub_uni: u8, net: u8) -> Self {
        Self::new(net, sub_uni >> 4, sub_uni & 0x0F)
    }

    /// The `SubUni` byte: sub-net in the high nibble, universe in the low
    pub const fn sub_uni(&self) -> u8 {
        (self.sub_net << 4) | self.universe
    }

    /// The full 15-bit Port-Address
    pub const fn to_u16(&self) -> u16 {
        ((self.net as u16) << 8) | self.sub_uni() as u16
    }

    /// Split a 15-bit Port-Address into its switches
    pub const fn from_u16(value: u16) -> Self {
        Self::from_wire((value & 0xFF) as u8, (value >> 8) as u8)
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.net, self.sub_net, self.universe)
    }
}

/// How inbound DMX addresses are compared against this node
///
/// Older senders of the protocol family only fill the `SubUni` byte and leave
/// the net byte unset; newer ones use the full Port-Address. The mode is an
/// explicit configuration switch rather than a guess per packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AddressingMode {
    /// Net, sub-net and universe must all match
    #[default]
    PortAddress,
    /// Only the `SubUni` byte is compared; the net byte is ignored
    Legacy,
}

/// Identity of this node as announced on the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeIdentity {
    /// Net switch (0-127)
    pub net: u8,
    /// Sub-net switch (0-15)
    pub sub_net: u8,
    /// Output universe switch (0-15)
    pub universe: u8,
    /// Short name shown by controllers (max 17 characters)
    pub short_name: String,
    /// Long name shown by controllers (max 63 characters)
    pub long_name: String,
    /// Free-form status text reported in poll replies
    #[serde(default = "default_node_report")]
    pub node_report: String,
    /// First DMX channel (1-based) mapped to the hardware outputs
    pub channel_offset: u16,
}

fn default_node_report() -> String {
    "OK".to_string()
}

impl Default for NodeIdentity {
    fn default() -> Self {
        Self {
            net: 0,
            sub_net: 0,
            universe: 1,
            short_name: "ArtNode".to_string(),
            long_name: "ArtNode Art-Net to DMX512 bridge".to_string(),
            node_report: default_node_report(),
            channel_offset: 1,
        }
    }
}

impl NodeIdentity {
    /// The Port-Address this node listens on
    pub fn address(&self) -> PortAddress {
        PortAddress::new(self.net, self.sub_net, self.universe)
    }

    /// Replace the net / sub-net / universe switches
    pub fn set_address(&mut self, address: PortAddress) {
        self.net = address.net;
        self.sub_net = address.sub_net;
        self.universe = address.universe;
    }

    /// Zero-based index of the first buffer slot driven by the outputs
    pub fn channel_index(&self) -> usize {
        (self.channel_offset as usize).saturating_sub(1)
    }

    /// Check ranges and name lengths
    pub fn validate(&self) -> Result<()> {
        if self.net > 0x7F {
            return Err(CoreError::InvalidIdentity(format!(
                "net {} out of range (0-127)",
                self.net
            )));
        }
        if self.sub_net > 0x0F || self.universe > 0x0F {
            return Err(CoreError::InvalidIdentity(format!(
                "sub-net {} / universe {} out of range (0-15)",
                self.sub_net, self.universe
            )));
        }
        if self.short_name.len() >= SHORT_NAME_LENGTH {
            return Err(CoreError::InvalidIdentity(format!(
                "short name longer than {} bytes",
                SHORT_NAME_LENGTH - 1
            )));
        }
        if self.long_name.len() >= LONG_NAME_LENGTH {
            return Err(CoreError::InvalidIdentity(format!(
                "long name longer than {} bytes",
                LONG_NAME_LENGTH - 1
            )));
        }
        if self.channel_offset == 0 || self.channel_offset > crate::buffer::DMX_CHANNELS as u16 {
            return Err(CoreError::InvalidIdentity(format!(
                "channel offset {} out of range (1-512)",
                self.channel_offset
            )));
        }
        Ok(())
    }
}
