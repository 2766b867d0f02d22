//! ArtNode - Art-Net to DMX512 / PWM bridge
//!
//! Listens for Art-Net on UDP, answers discovery, and drives the configured
//! output from the universe it is addressed on.

mod logging_setup;

use anyhow::{Context, Result};
use artnode_control::{
    serve, spawn_output, transport, EngineEvent, OutputDriver, OutputHandle, ProtocolEngine,
};
use artnode_core::{ChannelBuffer, NodeConfig, NodeIdentity, SharedChannelBuffer, TransportInfo};
use artnode_io::{load_or_create, persist_identity, save_config};
use clap::Parser;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Art-Net node
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (.ron, .json or .toml); created with defaults if missing
    #[arg(short, long, default_value = "artnode.ron")]
    config: PathBuf,

    /// Local address to bind, overriding the configuration
    #[arg(short, long)]
    bind: Option<IpAddr>,

    /// UDP port, overriding the configuration
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (error, warn, info, debug, trace), overriding the configuration
    #[arg(long)]
    log_level: Option<String>,

    /// Write the default configuration to --config and exit
    #[arg(long)]
    write_default: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.write_default {
        save_config(&NodeConfig::default(), &args.config)
            .with_context(|| format!("Failed to write {}", args.config.display()))?;
        println!("Wrote default configuration to {}", args.config.display());
        return Ok(());
    }

    let (mut config, created) = load_or_create(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    apply_overrides(&mut config, &args);

    let _log_guard = logging_setup::init(&config.log)?;
    if created {
        info!("Created default configuration at {}", args.config.display());
    }

    run(config, &args.config).await
}

fn apply_overrides(config: &mut NodeConfig, args: &Args) {
    if let Some(bind) = args.bind {
        config.network.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.network.port = port;
    }
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }
}

async fn run(config: NodeConfig, config_path: &Path) -> Result<()> {
    let buffer = ChannelBuffer::shared();
    let mut output = start_output(&config, &buffer)?;

    let socket = transport::bind(&config.network)
        .await
        .context("Failed to bind Art-Net socket")?;
    let announced = transport_info(&config, socket.local_addr()?)?;

    let mut engine = ProtocolEngine::new(
        config.identity.clone(),
        announced,
        config.addressing,
        buffer,
        output.is_some(),
    )
    .with_reply_broadcast(config.network.reply_broadcast);

    info!(
        "Node '{}' listening on {} for universe {} ({:?} addressing), advertising {}",
        config.identity.short_name,
        socket.local_addr()?,
        config.identity.address(),
        config.addressing,
        announced.ip
    );

    let shutdown = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(e) => {
                error!("Cannot listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    let (identities, saver) = spawn_identity_saver(config_path.to_path_buf(), config.clone());

    serve(&socket, &mut engine, shutdown, |event| handle_event(event, &identities)).await;

    // Let the saver drain anything still queued
    drop(identities);
    if saver.await.is_err() {
        error!("Identity saver task panicked");
    }

    if let Some(output) = output.as_mut() {
        output.stop();
    }
    Ok(())
}

fn start_output(
    config: &NodeConfig,
    buffer: &SharedChannelBuffer,
) -> Result<Option<OutputHandle>> {
    if !config.output.enabled {
        info!("Output disabled; running network side only");
        return Ok(None);
    }

    let driver = OutputDriver::from_config(&config.output, config.identity.channel_index())
        .context("Failed to open output")?;
    match &driver {
        OutputDriver::Duty { interval, .. } => info!(
            "Duty output from channel {}, refresh every {:?}",
            config.identity.channel_offset, interval
        ),
        OutputDriver::Serial(_) => info!("DMX512 serial output started"),
    }

    let handle = spawn_output(driver, buffer.clone()).context("Failed to start output thread")?;
    Ok(Some(handle))
}

/// Addressing details announced to controllers
fn transport_info(config: &NodeConfig, local: SocketAddr) -> Result<TransportInfo> {
    let ip = match (config.network.advertise_ip, local.ip()) {
        (Some(ip), _) => ip,
        (None, IpAddr::V4(ip)) if !ip.is_unspecified() => ip,
        _ => {
            warn!(
                "No advertise_ip configured and bound to {}; replies will announce 0.0.0.0",
                local
            );
            Ipv4Addr::UNSPECIFIED
        }
    };

    Ok(TransportInfo {
        ip,
        subnet_mask: config.network.subnet_mask,
        port: local.port(),
        mac: config.network.mac_bytes()?,
    })
}

/// Persist identity changes off the receive loop
///
/// Saves run one at a time on the blocking pool. When several changes queue up
/// while a save is running only the newest is written.
fn spawn_identity_saver(
    path: PathBuf,
    fallback: NodeConfig,
) -> (mpsc::UnboundedSender<NodeIdentity>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<NodeIdentity>();

    let task = tokio::spawn(async move {
        while let Some(mut identity) = rx.recv().await {
            while let Ok(newer) = rx.try_recv() {
                identity = newer;
            }

            let path = path.clone();
            let fallback = fallback.clone();
            let saved = tokio::task::spawn_blocking(move || {
                persist_identity(&path, &identity, &fallback)
            })
            .await;

            match saved {
                Ok(Ok(())) => debug!("Identity saved"),
                Ok(Err(e)) => warn!("Identity change not saved: {}", e),
                Err(e) => error!("Identity save task failed: {}", e),
            }
        }
    });

    (tx, task)
}

fn handle_event(event: EngineEvent, identities: &mpsc::UnboundedSender<NodeIdentity>) {
    match event {
        EngineEvent::IdentityChanged(identity) => {
            if identities.send(identity).is_err() {
                warn!("Identity change not saved: saver stopped");
            }
        }
        EngineEvent::IpProgRequested(command) => {
            if command.resets_to_default() || command.enables_dhcp() {
                warn!("IP reset or DHCP requested; interface setup is managed by the host");
            } else if command.programs_ip() || command.programs_subnet_mask() {
                warn!(
                    "IP programming to {}/{} requested; interface setup is managed by the host",
                    command.ip, command.subnet_mask
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use artnode_io::load_config;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_identity_saver_writes_latest_identity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("artnode.ron");
        let config = NodeConfig::default();
        save_config(&config, &path).unwrap();

        let (identities, saver) = spawn_identity_saver(path.clone(), config.clone());
        for universe in [3, 9] {
            let event = EngineEvent::IdentityChanged(NodeIdentity {
                universe,
                ..config.identity.clone()
            });
            handle_event(event, &identities);
        }
        drop(identities);
        saver.await.unwrap();

        let saved = load_config(&path).unwrap();
        assert_eq!(saved.identity.universe, 9);
        assert_eq!(saved.output, config.output);
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["artnode"]);
        assert_eq!(args.config, PathBuf::from("artnode.ron"));
        assert!(args.bind.is_none());
        assert!(!args.write_default);
    }

    #[test]
    fn test_overrides_applied() {
        let args = Args::parse_from([
            "artnode",
            "--bind",
            "10.0.0.5",
            "--port",
            "6455",
            "--log-level",
            "debug",
        ]);
        let mut config = NodeConfig::default();
        apply_overrides(&mut config, &args);

        assert_eq!(config.network.bind_address, "10.0.0.5".parse::<IpAddr>().unwrap());
        assert_eq!(config.network.port, 6455);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_transport_info_prefers_advertised_ip() {
        let mut config = NodeConfig::default();
        config.network.advertise_ip = Some(Ipv4Addr::new(2, 0, 0, 20));
        config.network.mac = "02:00:00:00:00:14".to_string();

        let info = transport_info(&config, "0.0.0.0:6454".parse().unwrap()).unwrap();
        assert_eq!(info.ip, Ipv4Addr::new(2, 0, 0, 20));
        assert_eq!(info.mac, [0x02, 0, 0, 0, 0, 0x14]);
        assert_eq!(info.port, 6454);
    }

    #[test]
    fn test_transport_info_falls_back_to_bound_address() {
        let config = NodeConfig::default();
        let info = transport_info(&config, "192.168.1.7:6454".parse().unwrap()).unwrap();
        assert_eq!(info.ip, Ipv4Addr::new(192, 168, 1, 7));
    }
}
