//! Datagram dispatch
//!
//! [`ProtocolEngine`] turns one received datagram into at most one reply and
//! at most one event for the host. It never fails: anything it cannot use is
//! counted and dropped.

use artnode_core::{AddressingMode, NodeIdentity, SharedChannelBuffer, TransportInfo};
use std::net::{IpAddr, SocketAddr};
use tracing::{debug, info, trace, warn};

use crate::artnet::{
    decode_address, decode_data_frame, decode_header, decode_ip_prog, encode_ip_prog_reply,
    AddressCommand, IpProgCommand, OpCode, PollResponder,
};
use crate::filter::AddressFilter;

/// Counters kept for diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Datagrams handed to the engine
    pub received: u64,
    /// Datagrams that failed to decode
    pub malformed: u64,
    /// Data frames addressed to another universe
    pub filtered: u64,
    /// Data frames copied into the buffer
    pub ingested: u64,
    /// Data frames that changed at least one channel
    pub changed: u64,
    /// Poll requests answered
    pub polls: u64,
    /// Valid packets with an opcode the node does not act on
    pub ignored: u64,
}

/// Outbound datagram produced by the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub destination: SocketAddr,
    pub bytes: Vec<u8>,
}

/// Something the host should act on after a datagram was handled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// ArtAddress changed the identity; the new identity should be persisted
    IdentityChanged(NodeIdentity),
    /// ArtIpProg asked for new interface settings
    IpProgRequested(IpProgCommand),
}

/// Result of handling one datagram
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineOutcome {
    pub reply: Option<Reply>,
    pub event: Option<EngineEvent>,
}

impl EngineOutcome {
    fn reply(reply: Reply) -> Self {
        Self {
            reply: Some(reply),
            event: None,
        }
    }
}

/// Art-Net protocol engine for a single-universe node
pub struct ProtocolEngine {
    identity: NodeIdentity,
    transport: TransportInfo,
    filter: AddressFilter,
    responder: PollResponder,
    buffer: SharedChannelBuffer,
    reply_broadcast: bool,
    stats: EngineStats,
}

impl ProtocolEngine {
    pub fn new(
        identity: NodeIdentity,
        transport: TransportInfo,
        addressing: AddressingMode,
        buffer: SharedChannelBuffer,
        output_active: bool,
    ) -> Self {
        let filter = AddressFilter::new(identity.address(), addressing);
        Self {
            identity,
            transport,
            filter,
            responder: PollResponder::new(addressing, output_active),
            buffer,
            reply_broadcast: false,
            stats: EngineStats::default(),
        }
    }

    /// Send replies to the subnet broadcast address instead of the sender
    pub fn with_reply_broadcast(mut self, enabled: bool) -> Self {
        self.reply_broadcast = enabled;
        self
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    /// Replace the identity wholesale
    pub fn set_identity(&mut self, identity: NodeIdentity) {
        self.filter.set_address(identity.address());
        self.identity = identity;
    }

    pub fn transport(&self) -> &TransportInfo {
        &self.transport
    }

    pub fn buffer(&self) -> &SharedChannelBuffer {
        &self.buffer
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Handle one received datagram
    pub fn handle_datagram(&mut self, sender: SocketAddr, bytes: &[u8]) -> EngineOutcome {
        self.stats.received += 1;

        let header = match decode_header(bytes) {
            Ok(header) => header,
            Err(e) => {
                self.stats.malformed += 1;
                trace!("Dropping datagram from {}: {}", sender, e);
                return EngineOutcome::default();
            }
        };

        match header.opcode {
            OpCode::Poll => {
                self.stats.polls += 1;
                debug!("ArtPoll from {}", sender);
                EngineOutcome::reply(self.poll_reply(sender))
            }
            OpCode::Dmx => {
                self.handle_data(sender, bytes);
                EngineOutcome::default()
            }
            OpCode::Address => self.handle_address(sender, bytes),
            OpCode::IpProg => self.handle_ip_prog(sender, bytes),
            OpCode::PollReply | OpCode::IpProgReply | OpCode::Unknown(_) => {
                self.stats.ignored += 1;
                trace!("Ignoring {:?} from {}", header.opcode, sender);
                EngineOutcome::default()
            }
        }
    }

    fn handle_data(&mut self, sender: SocketAddr, bytes: &[u8]) {
        let frame = match decode_data_frame(bytes) {
            Ok(frame) => frame,
            Err(e) => {
                self.stats.malformed += 1;
                trace!("Dropping ArtDmx from {}: {}", sender, e);
                return;
            }
        };

        if !self.filter.matches(frame.address) {
            self.stats.filtered += 1;
            trace!(
                "ArtDmx for {} ignored, listening on {}",
                frame.address,
                self.filter.address()
            );
            return;
        }

        if frame.is_clamped() {
            warn!(
                "ArtDmx from {} declares {} channels but carries {}",
                sender,
                frame.declared_length,
                frame.channel_count()
            );
        }

        let outcome = self.buffer.lock().ingest(frame.data);
        self.stats.ingested += 1;
        if outcome.changed {
            self.stats.changed += 1;
        }
        trace!(
            "ArtDmx seq {} from {}: {} channels, changed={}",
            frame.sequence,
            sender,
            outcome.copied,
            outcome.changed
        );
    }

    fn handle_address(&mut self, sender: SocketAddr, bytes: &[u8]) -> EngineOutcome {
        let command = match decode_address(bytes) {
            Ok(command) => command,
            Err(e) => {
                self.stats.malformed += 1;
                trace!("Dropping ArtAddress from {}: {}", sender, e);
                return EngineOutcome::default();
            }
        };

        let updated = apply_address(&self.identity, &command);
        let event = if let Err(e) = updated.validate() {
            warn!("Rejecting ArtAddress from {}: {}", sender, e);
            None
        } else if updated != self.identity {
            info!(
                "ArtAddress from {}: now '{}' on {}",
                sender,
                updated.short_name,
                updated.address()
            );
            self.set_identity(updated.clone());
            Some(EngineEvent::IdentityChanged(updated))
        } else {
            debug!("ArtAddress from {} left identity unchanged", sender);
            None
        };

        EngineOutcome {
            reply: Some(self.poll_reply(sender)),
            event,
        }
    }

    fn handle_ip_prog(&mut self, sender: SocketAddr, bytes: &[u8]) -> EngineOutcome {
        let command = match decode_ip_prog(bytes) {
            Ok(command) => command,
            Err(e) => {
                self.stats.malformed += 1;
                trace!("Dropping ArtIpProg from {}: {}", sender, e);
                return EngineOutcome::default();
            }
        };

        let event = command.is_enabled().then(|| {
            info!(
                "ArtIpProg from {}: command {:#04x}, ip {}, mask {}",
                sender, command.command, command.ip, command.subnet_mask
            );
            EngineEvent::IpProgRequested(command)
        });

        EngineOutcome {
            reply: Some(Reply {
                destination: self.reply_destination(sender),
                bytes: encode_ip_prog_reply(&self.transport).to_vec(),
            }),
            event,
        }
    }

    fn poll_reply(&self, sender: SocketAddr) -> Reply {
        Reply {
            destination: self.reply_destination(sender),
            bytes: self
                .responder
                .respond(&self.identity, &self.transport)
                .to_vec(),
        }
    }

    fn reply_destination(&self, sender: SocketAddr) -> SocketAddr {
        if self.reply_broadcast {
            SocketAddr::new(IpAddr::V4(self.transport.broadcast()), self.transport.port)
        } else {
            sender
        }
    }
}

/// Identity after applying the programmed fields of an ArtAddress
fn apply_address(identity: &NodeIdentity, command: &AddressCommand) -> NodeIdentity {
    let mut updated = identity.clone();
    if let Some(net) = command.net() {
        updated.net = net;
    }
    if let Some(sub_net) = command.sub_net() {
        updated.sub_net = sub_net;
    }
    if let Some(universe) = command.universe() {
        updated.universe = universe;
    }
    if let Some(name) = &command.short_name {
        updated.short_name = name.clone();
    }
    if let Some(name) = &command.long_name {
        updated.long_name = name.clone();
    }
    updated
}
