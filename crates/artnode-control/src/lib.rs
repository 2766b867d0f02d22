//! ArtNode Control - Art-Net protocol engine and DMX output
//!
//! This crate turns Art-Net datagrams into channel values and channel values
//! into hardware output:
//! - **Art-Net**: wire codec for ArtPoll, ArtPollReply, ArtDmx, ArtAddress and ArtIpProg
//! - **Engine**: universe filtering, poll replies, remote programming
//! - **Transport**: UDP binding and the async receive loop
//! - **Output**: PWM duty outputs and DMX512 serial refresh
//!
//! ## Feature Flags
//!
//! - `serial`: Enable the UART sink (requires `serialport`), on by default
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use artnode_control::{ProtocolEngine, transport};
//! use artnode_core::{ChannelBuffer, NodeConfig, TransportInfo};
//!
//! # async fn run() -> artnode_control::Result<()> {
//! let config = NodeConfig::default();
//! let socket = transport::bind(&config.network).await?;
//! let mut engine = ProtocolEngine::new(
//!     config.identity.clone(),
//!     TransportInfo::default(),
//!     config.addressing,
//!     ChannelBuffer::shared(),
//!     true,
//! );
//! transport::serve(&socket, &mut engine, std::future::pending(), |_| {}).await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`artnet`] - Packet encoding and decoding
//! - [`filter`] - Universe matching
//! - [`engine`] - Datagram dispatch
//! - [`transport`] - Datagram transport and receive loop
//! - [`output`] - Output drivers, timers and sinks
//! - [`error`] - Error types

#![allow(missing_docs)]

/// Art-Net wire codec
pub mod artnet;
/// Datagram dispatch
pub mod engine;
/// Error types
pub mod error;
/// Universe filtering
pub mod filter;
/// Output drivers
pub mod output;
/// UDP transport
pub mod transport;

// Re-exports
pub use engine::{EngineEvent, EngineOutcome, EngineStats, ProtocolEngine, Reply};
pub use error::{ControlError, DecodeError, Result};
pub use filter::AddressFilter;
pub use output::{spawn as spawn_output, OutputDriver, OutputHandle, OutputStats};
pub use transport::{serve, DatagramTransport};
