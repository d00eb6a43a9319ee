//! Reader construction and dispatch.
//!
//! [`ReaderFactory`] wires each [`ReaderKind`] to its reader, handing it the
//! shared [`Services`] and the [`StatsConfig`]. Callers that know the kind at
//! compile time use the typed constructors; callers that pick kinds at run
//! time get an [`AnyReader`] whose snapshots arrive as an [`AnySnapshot`].

use std::sync::Arc;

use serde::Serialize;

use crate::catalog::Sensor;
use crate::config::StatsConfig;
use crate::platform::{
    AcceleratorRegistry, CommandRunner, FirmwareService, InterfaceSource, IoregAccelerators,
    LaunchServicesApps, NoAccelerators, NoApps, NoCommands, NoInterfaces, NoPowerSources,
    NullFirmware, PmsetPowerSources, PowerSources, ProcessRegistry, SystemCommand,
    SystemInterfaces,
};
use crate::process_table::ProcessUsage;
use crate::reader::{Reader, ReaderInfo, ReaderKind};
use crate::readers::{
    BatteryReader, BatterySnapshot, CpuReader, Fan, FansReader, GpuReader, Gpus, NetworkReader,
    NetworkSnapshot, RamReader, SensorsReader, battery, cpu, fans, gpu, network, ram, sensors,
};

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// Collaborator handles shared by every reader a factory builds.
#[derive(Clone)]
pub struct Services {
    pub firmware: Arc<dyn FirmwareService>,
    pub power: Arc<dyn PowerSources>,
    pub accelerators: Arc<dyn AcceleratorRegistry>,
    pub commands: Arc<dyn CommandRunner>,
    pub apps: Arc<dyn ProcessRegistry>,
    pub interfaces: Arc<dyn InterfaceSource>,
}

impl Services {
    /// Platform-backed collaborators for the running OS.
    pub fn system() -> Self {
        let commands: Arc<dyn CommandRunner> = Arc::new(SystemCommand);
        Self {
            firmware: system_firmware(),
            power: Arc::new(PmsetPowerSources::new(commands.clone())),
            accelerators: Arc::new(IoregAccelerators::new(commands.clone())),
            apps: Arc::new(LaunchServicesApps::new(commands.clone())),
            interfaces: Arc::new(SystemInterfaces),
            commands,
        }
    }

    /// Collaborators that report nothing. Useful as a base for tests.
    pub fn null() -> Self {
        Self {
            firmware: Arc::new(NullFirmware),
            power: Arc::new(NoPowerSources),
            accelerators: Arc::new(NoAccelerators),
            commands: Arc::new(NoCommands),
            apps: Arc::new(NoApps),
            interfaces: Arc::new(NoInterfaces),
        }
    }
}

#[cfg(target_os = "macos")]
fn system_firmware() -> Arc<dyn FirmwareService> {
    match crate::platform::AppleSmc::open() {
        Ok(smc) => Arc::new(smc),
        Err(e) => {
            log::warn!("SMC unavailable: {e}");
            Arc::new(NullFirmware)
        }
    }
}

#[cfg(not(target_os = "macos"))]
fn system_firmware() -> Arc<dyn FirmwareService> {
    Arc::new(NullFirmware)
}

// ---------------------------------------------------------------------------
// Dynamic dispatch
// ---------------------------------------------------------------------------

/// Static metadata for `kind`, without constructing a reader.
pub fn reader_info(kind: ReaderKind) -> &'static ReaderInfo {
    match kind {
        ReaderKind::Cpu => &cpu::CPU_INFO,
        ReaderKind::Gpu => &gpu::GPU_INFO,
        ReaderKind::Ram => &ram::RAM_INFO,
        ReaderKind::Battery => &battery::BATTERY_INFO,
        ReaderKind::Fans => &fans::FANS_INFO,
        ReaderKind::Network => &network::NETWORK_INFO,
        ReaderKind::Sensors => &sensors::SENSORS_INFO,
    }
}

/// A reader of any kind.
pub enum AnyReader {
    Cpu(CpuReader),
    Gpu(GpuReader),
    Ram(RamReader),
    Battery(BatteryReader),
    Fans(FansReader),
    Network(NetworkReader),
    Sensors(SensorsReader),
}

/// A snapshot from an [`AnyReader`], tagged with its kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum AnySnapshot {
    Cpu(Vec<ProcessUsage>),
    Gpu(Gpus),
    Ram(Vec<ProcessUsage>),
    Battery(BatterySnapshot),
    Fans(Vec<Fan>),
    Network(NetworkSnapshot),
    Sensors(Vec<Sensor>),
}

impl AnySnapshot {
    pub fn kind(&self) -> ReaderKind {
        match self {
            Self::Cpu(_) => ReaderKind::Cpu,
            Self::Gpu(_) => ReaderKind::Gpu,
            Self::Ram(_) => ReaderKind::Ram,
            Self::Battery(_) => ReaderKind::Battery,
            Self::Fans(_) => ReaderKind::Fans,
            Self::Network(_) => ReaderKind::Network,
            Self::Sensors(_) => ReaderKind::Sensors,
        }
    }
}

impl AnyReader {
    pub fn kind(&self) -> ReaderKind {
        self.info().kind
    }
}

impl Reader for AnyReader {
    type Snapshot = AnySnapshot;

    fn info(&self) -> &ReaderInfo {
        match self {
            Self::Cpu(r) => r.info(),
            Self::Gpu(r) => r.info(),
            Self::Ram(r) => r.info(),
            Self::Battery(r) => r.info(),
            Self::Fans(r) => r.info(),
            Self::Network(r) => r.info(),
            Self::Sensors(r) => r.info(),
        }
    }

    fn read(&mut self, on_result: impl FnOnce(AnySnapshot)) {
        match self {
            Self::Cpu(r) => r.read(|s| on_result(AnySnapshot::Cpu(s))),
            Self::Gpu(r) => r.read(|s| on_result(AnySnapshot::Gpu(s))),
            Self::Ram(r) => r.read(|s| on_result(AnySnapshot::Ram(s))),
            Self::Battery(r) => r.read(|s| on_result(AnySnapshot::Battery(s))),
            Self::Fans(r) => r.read(|s| on_result(AnySnapshot::Fans(s))),
            Self::Network(r) => r.read(|s| on_result(AnySnapshot::Network(s))),
            Self::Sensors(r) => r.read(|s| on_result(AnySnapshot::Sensors(s))),
        }
    }
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

/// Builds readers from shared services and one configuration.
///
/// Construction never fails: a reader whose collaborator is unavailable is
/// still built and reports empty data (or nothing) when read.
#[derive(Clone)]
pub struct ReaderFactory {
    services: Services,
    config: StatsConfig,
}

impl ReaderFactory {
    pub fn new(services: Services, config: StatsConfig) -> Self {
        Self { services, config }
    }

    /// Platform services with the given configuration.
    pub fn system(config: StatsConfig) -> Self {
        Self::new(Services::system(), config)
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn create(&self, kind: ReaderKind) -> AnyReader {
        log::debug!("creating {kind} reader");
        match kind {
            ReaderKind::Cpu => AnyReader::Cpu(self.cpu()),
            ReaderKind::Gpu => AnyReader::Gpu(self.gpu()),
            ReaderKind::Ram => AnyReader::Ram(self.ram()),
            ReaderKind::Battery => AnyReader::Battery(self.battery()),
            ReaderKind::Fans => AnyReader::Fans(self.fans()),
            ReaderKind::Network => AnyReader::Network(self.network()),
            ReaderKind::Sensors => AnyReader::Sensors(self.sensors()),
        }
    }

    pub fn cpu(&self) -> CpuReader {
        CpuReader::new(
            self.services.commands.clone(),
            self.services.apps.clone(),
            self.config.process_limit,
        )
    }

    pub fn ram(&self) -> RamReader {
        RamReader::new(
            self.services.commands.clone(),
            self.services.apps.clone(),
            self.config.ram_process_count,
        )
    }

    pub fn gpu(&self) -> GpuReader {
        GpuReader::new(self.services.accelerators.clone())
    }

    pub fn battery(&self) -> BatteryReader {
        BatteryReader::new(self.services.power.clone(), self.config.health_mode)
    }

    pub fn fans(&self) -> FansReader {
        FansReader::new(self.services.firmware.clone(), &self.config)
    }

    pub fn network(&self) -> NetworkReader {
        NetworkReader::new(
            self.config.network_mode,
            self.services.interfaces.clone(),
            self.services.commands.clone(),
        )
    }

    pub fn sensors(&self) -> SensorsReader {
        SensorsReader::new(
            self.services.firmware.clone(),
            self.config.max_plausible_temperature,
        )
    }

    /// Kinds whose platform matches the running OS.
    pub fn available(&self) -> Vec<ReaderKind> {
        ReaderKind::ALL
            .into_iter()
            .filter(|kind| reader_info(*kind).platform.is_current())
            .collect()
    }

    /// One reader per available kind.
    pub fn readers(&self) -> Vec<AnyReader> {
        self.available()
            .into_iter()
            .map(|kind| self.create(kind))
            .collect()
    }
}

/// One reader of every kind, owned together.
pub struct StatsReaders {
    pub cpu: CpuReader,
    pub gpu: GpuReader,
    pub ram: RamReader,
    pub battery: BatteryReader,
    pub fans: FansReader,
    pub network: NetworkReader,
    pub sensors: SensorsReader,
}

impl StatsReaders {
    pub fn new(factory: &ReaderFactory) -> Self {
        Self {
            cpu: factory.cpu(),
            gpu: factory.gpu(),
            ram: factory.ram(),
            battery: factory.battery(),
            fans: factory.fans(),
            network: factory.network(),
            sensors: factory.sensors(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bandwidth::Bandwidth;
    use crate::config::NetworkMode;
    use crate::test_support::{FakeCommands, FakeFirmware};

    #[test]
    fn create_matches_kind() {
        let factory = ReaderFactory::new(Services::null(), StatsConfig::default());
        for kind in ReaderKind::ALL {
            let reader = factory.create(kind);
            assert_eq!(reader.kind(), kind);
            assert_eq!(reader.name(), kind.as_str());
            assert_eq!(reader_info(kind).kind, kind);
        }
    }

    #[test]
    fn null_services_degrade_per_kind() {
        let factory = ReaderFactory::new(Services::null(), StatsConfig::default());
        for kind in ReaderKind::ALL {
            let snapshot = factory.create(kind).snapshot();
            match kind {
                ReaderKind::Fans => assert_eq!(snapshot, Some(AnySnapshot::Fans(Vec::new()))),
                ReaderKind::Sensors => {
                    assert_eq!(snapshot, Some(AnySnapshot::Sensors(Vec::new())))
                }
                _ => assert!(snapshot.is_none(), "{kind}"),
            }
        }
    }

    #[test]
    fn config_flows_into_readers() {
        let config = StatsConfig {
            network_mode: NetworkMode::Process,
            disabled_fans: vec![0],
            ..StatsConfig::default()
        };
        let services = Services {
            firmware: Arc::new(
                FakeFirmware::new()
                    .with_raw("FNum", "ui8 ", &[1])
                    .with_value("F0Ac", 1800.0),
            ),
            commands: Arc::new(
                FakeCommands::new().with_output("/usr/bin/nettop", "header\np.1,100,50,\n"),
            ),
            ..Services::null()
        };
        let factory = ReaderFactory::new(services, config);

        let fans = factory.fans().snapshot().unwrap();
        assert!(!fans[0].enabled);

        let mut network = factory.network();
        assert_eq!(network.mode(), NetworkMode::Process);
        network.snapshot().unwrap();
        assert_eq!(network.tracker().baseline(), Bandwidth::new(50, 100));
    }

    #[test]
    fn snapshot_serializes_with_kind_tag() {
        let json = serde_json::to_value(AnySnapshot::Fans(Vec::new())).unwrap();
        assert_eq!(json["kind"], "fans");
        assert!(json["data"].as_array().unwrap().is_empty());
        assert_eq!(AnySnapshot::Fans(Vec::new()).kind(), ReaderKind::Fans);
    }

    #[test]
    fn available_kinds_match_platform() {
        let factory = ReaderFactory::new(Services::null(), StatsConfig::default());
        let available = factory.available();
        assert!(available.contains(&ReaderKind::Cpu));
        assert!(available.contains(&ReaderKind::Network));
        assert_eq!(
            available.contains(&ReaderKind::Sensors),
            cfg!(target_os = "macos")
        );
        assert_eq!(factory.readers().len(), available.len());
    }

    #[test]
    fn stats_readers_hold_one_of_each() {
        let factory = ReaderFactory::new(Services::null(), StatsConfig::default());
        let mut readers = StatsReaders::new(&factory);
        assert_eq!(readers.fans.snapshot(), Some(Vec::new()));
        assert!(readers.cpu.snapshot().is_none());
        assert_eq!(readers.sensors.name(), "sensors");
    }
}
