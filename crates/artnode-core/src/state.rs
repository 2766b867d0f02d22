//! Node configuration state
//!
//! This module defines the configuration structure that is persisted to disk
//! and read once at session start.

use crate::{
    error::Result, identity::AddressingMode, logging::LogConfig, network::NetworkConfig,
    output::OutputConfig, NodeIdentity,
};
use serde::{Deserialize, Serialize};

/// Complete node configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct NodeConfig {
    /// Addressing and names announced on the network
    pub identity: NodeIdentity,

    /// How inbound DMX addresses are matched
    #[serde(default)]
    pub addressing: AddressingMode,

    /// Socket settings
    #[serde(default)]
    pub network: NetworkConfig,

    /// Output driver settings
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

impl NodeConfig {
    /// Validate every section that has constraints
    pub fn validate(&self) -> Result<()> {
        self.identity.validate()?;
        self.network.mac_bytes()?;
        self.output.validate()?;
        Ok(())
    }
}
