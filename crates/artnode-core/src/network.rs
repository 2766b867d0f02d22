//! Network configuration and transport information

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};

use crate::error::{CoreError, Result};

/// Art-Net UDP port
pub const ARTNET_PORT: u16 = 0x1936;

/// Socket and advertisement settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Local address to bind
    pub bind_address: IpAddr,
    /// Local UDP port
    pub port: u16,
    /// Address reported in poll replies; falls back to the bound address
    #[serde(default)]
    pub advertise_ip: Option<Ipv4Addr>,
    /// Subnet mask reported in IP programming replies
    pub subnet_mask: Ipv4Addr,
    /// MAC reported in poll replies, `aa:bb:cc:dd:ee:ff`
    pub mac: String,
    /// Send replies to the directed broadcast address instead of the sender
    #[serde(default)]
    pub reply_broadcast: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: ARTNET_PORT,
            advertise_ip: None,
            subnet_mask: Ipv4Addr::new(255, 255, 255, 0),
            mac: "00:00:00:00:00:00".to_string(),
            reply_broadcast: false,
        }
    }
}

impl NetworkConfig {
    /// Parse the configured MAC address
    pub fn mac_bytes(&self) -> Result<[u8; 6]> {
        parse_mac(&self.mac)
    }
}

/// Parse a MAC address written as six hex octets separated by `:` or `-`
pub fn parse_mac(text: &str) -> Result<[u8; 6]> {
    let digits: String = text
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect();
    let bytes = hex::decode(&digits).map_err(|e| CoreError::InvalidMac(format!("{text}: {e}")))?;
    <[u8; 6]>::try_from(bytes.as_slice())
        .map_err(|_| CoreError::InvalidMac(format!("{text}: expected 6 octets")))
}

/// Addressing details of the bound interface, reported back to controllers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportInfo {
    pub ip: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub port: u16,
    pub mac: [u8; 6],
}

impl Default for TransportInfo {
    fn default() -> Self {
        Self {
            ip: Ipv4Addr::UNSPECIFIED,
            subnet_mask: Ipv4Addr::new(255, 255, 255, 0),
            port: ARTNET_PORT,
            mac: [0; 6],
        }
    }
}

impl TransportInfo {
    /// Directed broadcast address of the configured subnet
    pub fn broadcast(&self) -> Ipv4Addr {
        let ip = u32::from(self.ip);
        let mask = u32::from(self.subnet_mask);
        Ipv4Addr::from(ip | !mask)
    }
}
