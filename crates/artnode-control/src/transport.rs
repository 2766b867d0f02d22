//! Datagram transport and the receive loop
//!
//! The engine is transport-agnostic; [`serve`] pumps datagrams from any
//! [`DatagramTransport`] through it and sends the replies back out.

use artnode_core::NetworkConfig;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

use crate::engine::{EngineEvent, EngineStats, ProtocolEngine};
use crate::error::Result;

/// Largest datagram the node reads; every Art-Net packet fits
pub const MAX_DATAGRAM: usize = 1500;

/// Unreliable datagram transport
pub trait DatagramTransport {
    /// Receive one datagram, returning its length and sender
    fn recv_from(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send;

    /// Send one datagram
    fn send_to(
        &self,
        buf: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send;
}

impl DatagramTransport for UdpSocket {
    fn recv_from(
        &self,
        buf: &mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send {
        UdpSocket::recv_from(self, buf)
    }

    fn send_to(
        &self,
        buf: &[u8],
        target: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send {
        UdpSocket::send_to(self, buf, target)
    }
}

/// Bind the Art-Net socket described by `config`, with broadcast enabled
pub async fn bind(config: &NetworkConfig) -> Result<UdpSocket> {
    let address = SocketAddr::new(config.bind_address, config.port);
    let socket = UdpSocket::bind(address).await?;
    socket.set_broadcast(true)?;
    info!("Art-Net socket bound to {}", socket.local_addr()?);
    Ok(socket)
}

/// Run the engine until `shutdown` resolves
///
/// Replies are sent without waiting for confirmation; a failed send is
/// logged and forgotten. Events are passed to `on_event` in arrival order.
pub async fn serve<T, S, F>(
    transport: &T,
    engine: &mut ProtocolEngine,
    shutdown: S,
    mut on_event: F,
) -> EngineStats
where
    T: DatagramTransport,
    S: Future<Output = ()>,
    F: FnMut(EngineEvent),
{
    let mut buf = [0u8; MAX_DATAGRAM];
    tokio::pin!(shutdown);

    loop {
        let received = tokio::select! {
            _ = &mut shutdown => break,
            received = transport.recv_from(&mut buf) => received,
        };

        let (len, sender) = match received {
            Ok(received) => received,
            Err(e) => {
                warn!("Receive failed: {}", e);
                continue;
            }
        };

        let outcome = engine.handle_datagram(sender, &buf[..len]);

        if let Some(reply) = outcome.reply {
            if let Err(e) = transport.send_to(&reply.bytes, reply.destination).await {
                debug!("Reply to {} dropped: {}", reply.destination, e);
            }
        }

        if let Some(event) = outcome.event {
            on_event(event);
        }
    }

    let stats = engine.stats();
    info!(
        "Receive loop stopped after {} datagrams ({} ingested, {} filtered, {} malformed)",
        stats.received, stats.ingested, stats.filtered, stats.malformed
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artnet::{decode_poll_reply, encode_data_frame, DataFrame};
    use artnode_core::{AddressingMode, ChannelBuffer, NodeIdentity, PortAddress, TransportInfo};
    use tokio::sync::{mpsc, oneshot, Mutex};

    type Datagram = (Vec<u8>, SocketAddr);

    /// In-memory transport fed from a channel
    struct ChannelTransport {
        inbound: Mutex<mpsc::Receiver<Datagram>>,
        outbound: mpsc::UnboundedSender<Datagram>,
    }

    impl DatagramTransport for ChannelTransport {
        async fn recv_from(&self, buf: &mut [u8]) -> io::Result<(usize, SocketAddr)> {
            let mut inbound = self.inbound.lock().await;
            match inbound.recv().await {
                Some((bytes, sender)) => {
                    let len = bytes.len().min(buf.len());
                    buf[..len].copy_from_slice(&bytes[..len]);
                    Ok((len, sender))
                }
                None => std::future::pending().await,
            }
        }

        async fn send_to(&self, buf: &[u8], target: SocketAddr) -> io::Result<usize> {
            self.outbound
                .send((buf.to_vec(), target))
                .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))?;
            Ok(buf.len())
        }
    }

    fn channel_transport() -> (
        ChannelTransport,
        mpsc::Sender<Datagram>,
        mpsc::UnboundedReceiver<Datagram>,
    ) {
        let (in_tx, in_rx) = mpsc::channel(16);
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let transport = ChannelTransport {
            inbound: Mutex::new(in_rx),
            outbound: out_tx,
        };
        (transport, in_tx, out_rx)
    }

    fn engine() -> ProtocolEngine {
        ProtocolEngine::new(
            NodeIdentity::default(),
            TransportInfo::default(),
            AddressingMode::PortAddress,
            ChannelBuffer::shared(),
            true,
        )
    }

    #[tokio::test]
    async fn test_serve_answers_poll() {
        let (transport, inbound, mut outbound) = channel_transport();
        let mut engine = engine();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let controller: SocketAddr = "192.168.1.10:6454".parse().unwrap();

        let server = serve(
            &transport,
            &mut engine,
            async {
                let _ = stop_rx.await;
            },
            |_| {},
        );
        let client = async {
            inbound
                .send((b"Art-Net\0\x00\x20\x00\x0e\x00\x00".to_vec(), controller))
                .await
                .unwrap();
            let reply = outbound.recv().await.unwrap();
            let _ = stop_tx.send(());
            reply
        };

        let (stats, (bytes, destination)) = tokio::join!(server, client);
        assert_eq!(destination, controller);
        assert_eq!(decode_poll_reply(&bytes).unwrap().short_name, "ArtNode");
        assert_eq!(stats.polls, 1);
    }

    #[tokio::test]
    async fn test_serve_ingests_without_reply() {
        let (transport, inbound, mut outbound) = channel_transport();
        let mut engine = engine();
        let buffer = engine.buffer().clone();
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let controller: SocketAddr = "192.168.1.10:6454".parse().unwrap();

        let channels = [7u8, 8, 9];
        let packet = encode_data_frame(&DataFrame::new(PortAddress::new(0, 0, 1), 1, &channels));

        let server = serve(
            &transport,
            &mut engine,
            async {
                let _ = stop_rx.await;
            },
            |_| {},
        );
        let client = async {
            inbound.send((packet, controller)).await.unwrap();
            // A poll afterwards proves the data frame was processed first
            inbound
                .send((b"Art-Net\0\x00\x20".to_vec(), controller))
                .await
                .unwrap();
            let first = outbound.recv().await.unwrap();
            let _ = stop_tx.send(());
            first
        };

        let (stats, (bytes, _)) = tokio::join!(server, client);
        assert_eq!(bytes.len(), 239);
        assert_eq!(stats.ingested, 1);
        assert_eq!(buffer.lock().window(0, 3), &channels);
    }
}
