use artnode_core::{
    AddressingMode, DmxTiming, NodeConfig, NodeIdentity, OutputStrategy, SerialConfig,
    SerialSinkKind,
};
use artnode_io::{load_config, load_or_create, persist_identity, save_config, ConfigFile};
use std::net::Ipv4Addr;
use tempfile::TempDir;

fn serial_config() -> NodeConfig {
    let mut config = NodeConfig::default();
    config.addressing = AddressingMode::Legacy;
    config.network.advertise_ip = Some(Ipv4Addr::new(2, 0, 0, 20));
    config.network.mac = "02:00:00:00:00:14".to_string();
    config.output.strategy = OutputStrategy::Serial(SerialConfig {
        timing: DmxTiming {
            channel_count: 128,
            ..Default::default()
        },
        sink: SerialSinkKind::Port {
            path: "/dev/ttyUSB0".to_string(),
        },
    });
    config
}

#[test]
fn test_every_format_roundtrips() {
    let dir = TempDir::new().unwrap();
    let config = serial_config();

    for name in ["node.ron", "node.json", "node.toml"] {
        let path = dir.path().join(name);
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path).unwrap(), config, "format {name}");
    }
}

#[test]
fn test_load_or_create_writes_default_once() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("artnode.ron");

    let (config, created) = load_or_create(&path).unwrap();
    assert!(created);
    assert_eq!(config, NodeConfig::default());
    assert!(path.exists());

    let (_, created) = load_or_create(&path).unwrap();
    assert!(!created);
}

#[test]
fn test_persist_identity_keeps_other_sections() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("artnode.json");
    let config = serial_config();
    save_config(&config, &path).unwrap();
    let created_at = ConfigFile::load(&path).unwrap().metadata.created_at;

    let identity = NodeIdentity {
        universe: 9,
        short_name: "Renamed".to_string(),
        ..config.identity.clone()
    };
    persist_identity(&path, &identity, &config).unwrap();

    let file = ConfigFile::load(&path).unwrap();
    assert_eq!(file.metadata.created_at, created_at);
    assert_eq!(file.config.identity, identity);
    assert_eq!(file.config.output, config.output);
    assert_eq!(file.config.addressing, AddressingMode::Legacy);
}

#[test]
fn test_persist_identity_recreates_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("artnode.ron");
    let config = NodeConfig::default();

    let identity = NodeIdentity {
        net: 3,
        ..Default::default()
    };
    persist_identity(&path, &identity, &config).unwrap();

    assert_eq!(load_config(&path).unwrap().identity.net, 3);
}
