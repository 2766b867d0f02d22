use artnode_core::{
    output::{DutySinkKind, OutputStrategy, SerialConfig, SerialSinkKind},
    AddressingMode, NodeConfig, NodeIdentity,
};

#[test]
fn test_node_config_default() {
    let config = NodeConfig::default();
    assert_eq!(config.identity.universe, 1);
    assert_eq!(config.identity.channel_offset, 1);
    assert_eq!(config.network.port, 6454);
    assert!(matches!(config.output.strategy, OutputStrategy::Duty(_)));
}

#[test]
fn test_node_config_serialization() {
    let mut config = NodeConfig::default();
    config.identity.short_name = "Stage Left".to_string();
    config.addressing = AddressingMode::Legacy;
    config.output.strategy = OutputStrategy::Serial(SerialConfig {
        sink: SerialSinkKind::Port {
            path: "/dev/ttyUSB0".to_string(),
        },
        ..Default::default()
    });

    let json = serde_json::to_string(&config).expect("Failed to serialize NodeConfig");
    let deserialized: NodeConfig =
        serde_json::from_str(&json).expect("Failed to deserialize NodeConfig");

    assert_eq!(config, deserialized);
}

#[test]
fn test_missing_sections_use_defaults() {
    let json = r#"{
        "identity": {
            "net": 0,
            "sub_net": 1,
            "universe": 2,
            "short_name": "Node",
            "long_name": "Node long",
            "channel_offset": 5
        }
    }"#;
    let config: NodeConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.identity.node_report, "OK");
    assert_eq!(config.addressing, AddressingMode::PortAddress);
    assert!(matches!(
        config.output.strategy,
        OutputStrategy::Duty(ref duty) if duty.sink == DutySinkKind::Log
    ));
}

#[test]
fn test_invalid_mac_fails_validation() {
    let mut config = NodeConfig::default();
    config.network.mac = "not-a-mac".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn test_identity_address_roundtrip() {
    let mut identity = NodeIdentity::default();
    let address = artnode_core::PortAddress::new(4, 3, 2);
    identity.set_address(address);
    assert_eq!(identity.address(), address);
    assert_eq!(identity.net, 4);
}
