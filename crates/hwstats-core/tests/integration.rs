//! Integration tests for hwstats-core.
//!
//! These tests drive the factory end to end:
//! services → factory → reader → snapshot callback.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use hwstats_core::error::CommandError;
use hwstats_core::platform::{
    CommandRunner, FirmwareService, InterfaceAddress, InterfaceRecord, InterfaceSource,
    ProcessRegistry, RawValue,
};
use hwstats_core::{
    AnySnapshot, Bandwidth, FourCharCode, NetworkMode, Reader, ReaderFactory, ReaderKind,
    Services, StatsConfig, StatsReaders,
};

struct MapFirmware(BTreeMap<&'static str, RawValue>);

impl MapFirmware {
    fn new(entries: &[(&'static str, &str, &[u8])]) -> Self {
        Self(
            entries
                .iter()
                .map(|(key, data_type, bytes)| {
                    let raw = RawValue {
                        data_type: data_type.parse::<FourCharCode>().unwrap(),
                        bytes: bytes.to_vec(),
                    };
                    (*key, raw)
                })
                .collect(),
        )
    }
}

impl FirmwareService for MapFirmware {
    fn all_keys(&self) -> Vec<String> {
        self.0.keys().map(|k| k.to_string()).collect()
    }

    fn read_key(&self, key: &str) -> Option<RawValue> {
        self.0.get(key).cloned()
    }
}

struct Outputs(HashMap<&'static str, &'static str>);

impl CommandRunner for Outputs {
    fn run(&self, program: &str, _args: &[&str]) -> Result<String, CommandError> {
        self.0
            .get(program)
            .map(|out| out.to_string())
            .ok_or_else(|| CommandError::Status {
                program: program.to_string(),
                code: Some(1),
            })
    }
}

struct Apps;

impl ProcessRegistry for Apps {
    fn application_names(&self) -> HashMap<u32, String> {
        HashMap::from([(412, "Window Server".to_string())])
    }
}

struct Counters(Mutex<u64>);

impl InterfaceSource for Counters {
    fn interfaces(&self) -> Option<Vec<InterfaceRecord>> {
        let mut bytes = self.0.lock().unwrap();
        *bytes += 1_000;
        Some(vec![InterfaceRecord {
            name: "en0".to_string(),
            address: InterfaceAddress::Link {
                tx_bytes: *bytes,
                rx_bytes: *bytes * 2,
            },
        }])
    }
}

fn services() -> Services {
    let firmware = MapFirmware::new(&[
        ("TC0P", "sp78", &[0x2D, 0x80]),
        ("TG0P", "sp78", &[0x7F, 0x00]),
        ("VC0C", "fp2e", &[0x40, 0x00]),
        ("FNum", "ui8 ", &[1]),
        ("F0Ac", "fpe2", &[0x1F, 0x40]),
    ]);
    let commands = Outputs(HashMap::from([(
        "/bin/ps",
        "  PID  %CPU COMM\n  412  12,5 WindowServer\n    1   0.0 launchd\n",
    )]));

    Services {
        firmware: Arc::new(firmware),
        commands: Arc::new(commands),
        apps: Arc::new(Apps),
        interfaces: Arc::new(Counters(Mutex::new(0))),
        ..Services::null()
    }
}

#[test]
fn cpu_reader_end_to_end() {
    let factory = ReaderFactory::new(services(), StatsConfig::default());
    let list = factory.cpu().snapshot().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].usage, 12.5);
    assert_eq!(list[0].name.as_deref(), Some("Window Server"));
    assert_eq!(list[1].name, None);
}

#[test]
fn sensors_drop_implausible_temperatures() {
    let factory = ReaderFactory::new(services(), StatsConfig::default());
    let sensors = factory.sensors().snapshot().unwrap();
    let keys: Vec<&str> = sensors.iter().map(|s| s.key.as_str()).collect();

    // TG0P reads 127 °C and is discarded; F0Ac is exposed as a fan sensor.
    assert!(keys.contains(&"TC0P"));
    assert!(!keys.contains(&"TG0P"));
    assert!(keys.contains(&"F0Ac"));
    let voltage = sensors.iter().find(|s| s.key == "VC0C").unwrap();
    assert_eq!(voltage.value, 1.0);
}

#[test]
fn network_reports_deltas_between_reads() {
    let factory = ReaderFactory::new(services(), StatsConfig::default());
    let mut reader = factory.create(ReaderKind::Network);

    let Some(AnySnapshot::Network(first)) = reader.snapshot() else {
        panic!("expected a network snapshot");
    };
    assert_eq!(first.bandwidth, Bandwidth::ZERO);

    let Some(AnySnapshot::Network(second)) = reader.snapshot() else {
        panic!("expected a network snapshot");
    };
    assert_eq!(second.bandwidth, Bandwidth::new(1_000, 2_000));
    assert_eq!(second.total, Bandwidth::new(1_000, 2_000));
}

#[test]
fn process_mode_without_nettop_reports_nothing() {
    let config = StatsConfig {
        network_mode: NetworkMode::Process,
        ..StatsConfig::default()
    };
    let factory = ReaderFactory::new(services(), config);
    assert!(factory.network().snapshot().is_none());
}

#[test]
fn every_kind_is_constructible_and_serializes() {
    let factory = ReaderFactory::new(services(), StatsConfig::default());
    for kind in ReaderKind::ALL {
        let mut reader = factory.create(kind);
        if let Some(snapshot) = reader.snapshot() {
            assert_eq!(snapshot.kind(), kind);
            let json = serde_json::to_value(&snapshot).unwrap();
            assert_eq!(json["kind"], kind.as_str());
        }
    }
}

#[test]
fn stats_readers_share_services() {
    let factory = ReaderFactory::new(services(), StatsConfig::default());
    let mut readers = StatsReaders::new(&factory);
    let fans = readers.fans.snapshot().unwrap();
    assert_eq!(fans.len(), 1);
    assert_eq!(fans[0].value, 2000.0);
    assert!(readers.battery.snapshot().is_none());
}

#[test]
#[ignore] // Requires macOS with an SMC
fn system_sensors_are_plausible() {
    let factory = ReaderFactory::system(StatsConfig::default());
    let sensors = factory.sensors().snapshot().unwrap();
    assert!(!sensors.is_empty());
    for sensor in sensors.iter().filter(|s| s.kind == hwstats_core::SensorKind::Temperature) {
        assert!(sensor.value <= 110.0, "{} = {}", sensor.key, sensor.value);
    }
}

#[test]
#[ignore] // Requires ps
fn system_cpu_list_is_not_empty() {
    let factory = ReaderFactory::system(StatsConfig {
        process_limit: Some(5),
        ..StatsConfig::default()
    });
    let list = factory.cpu().snapshot().unwrap();
    assert!(!list.is_empty() && list.len() <= 5);
}

#[test]
#[ignore] // Requires a machine with network interfaces
fn system_network_counters_are_monotonic() {
    let factory = ReaderFactory::system(StatsConfig::default());
    let mut reader = factory.network();
    reader.snapshot().unwrap();
    let second = reader.snapshot().unwrap();
    assert!(second.bandwidth.upload >= 0 && second.bandwidth.download >= 0);
}
