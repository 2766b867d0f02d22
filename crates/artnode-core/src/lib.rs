//! ArtNode Core - node state shared by the protocol engine and output drivers
//!
//! This crate holds the plain data a session is built from:
//! - **Identity**: net / sub-net / universe switches and node names
//! - **Channel buffer**: the 512-slot DMX buffer with change tracking
//! - **Configuration**: network, output and logging settings
//!
//! ## Modules
//!
//! - [`buffer`] - Channel buffer shared between network and output
//! - [`identity`] - Node identity and Port-Address handling
//! - [`network`] - Socket settings and transport info
//! - [`output`] - Output strategy and DMX timing
//! - [`logging`] - Logging settings
//! - [`state`] - The persisted node configuration

pub mod buffer;
pub mod error;
pub mod identity;
pub mod logging;
pub mod network;
pub mod output;
pub mod state;

pub use buffer::{ChannelBuffer, IngestOutcome, SharedChannelBuffer, DMX_CHANNELS};
pub use error::{CoreError, Result};
pub use identity::{AddressingMode, NodeIdentity, PortAddress};
pub use logging::LogConfig;
pub use network::{NetworkConfig, TransportInfo, ARTNET_PORT};
pub use output::{
    DmxTiming, DutyConfig, DutySinkKind, OutputConfig, OutputStrategy, SerialConfig,
    SerialSinkKind,
};
pub use state::NodeConfig;
