//! # hwstats-core
//!
//! **Point-in-time hardware telemetry for macOS.**
//!
//! `hwstats-core` produces one-shot snapshots of the busiest processes (CPU
//! and memory), battery state, network throughput, fan speeds, SMC sensor
//! readings and GPU utilization.
//!
//! ## Quick Start
//!
//! ```no_run
//! use hwstats_core::{Reader, ReaderFactory, ReaderKind, StatsConfig};
//!
//! let factory = ReaderFactory::system(StatsConfig::default());
//!
//! // Typed reader: the snapshot type is known statically.
//! let mut fans = factory.fans();
//! fans.read(|list| {
//!     for fan in list {
//!         println!("{}: {}", fan.name, fan.formatted_value());
//!     }
//! });
//!
//! // Dynamic reader: pick the kind at run time.
//! let mut reader = factory.create(ReaderKind::Network);
//! if let Some(snapshot) = reader.snapshot() {
//!     println!("{}", serde_json::to_string(&snapshot).unwrap());
//! }
//! ```
//!
//! ## Architecture
//!
//! Collaborators (firmware, power sources, IO registry, subprocesses,
//! running apps, interfaces) → Readers → Snapshot callback
//!
//! Every reader implements the [`Reader`] trait: `read` runs synchronously
//! and hands at most one snapshot to its callback. Unavailable data never
//! surfaces as an error; the reader either skips the callback or reports
//! zero-valued fields. Polling cadence is the caller's concern.

pub mod bandwidth;
pub mod catalog;
pub mod codec;
pub mod config;
pub mod error;
pub mod platform;
pub mod process_table;
pub mod reader;
pub mod readers;
pub mod registry;

#[cfg(test)]
pub(crate) mod test_support;

pub use bandwidth::{Bandwidth, BandwidthTracker};
pub use catalog::{SENSOR_TABLE, Sensor, SensorDefinition, SensorKind, build_catalog};
pub use codec::{Decoded, FourCharCode};
pub use config::{HealthMode, NetworkMode, StatsConfig, TemperatureUnit};
pub use error::{CodecError, CommandError, ConfigError, SmcError, UnknownKind};
pub use platform::{PlatformInfo, platform_info};
pub use process_table::ProcessUsage;
pub use reader::{Platform, Reader, ReaderInfo, ReaderKind, Requirement};
pub use readers::{
    BatteryReader, BatterySnapshot, CpuReader, Fan, FansReader, GpuInfo, GpuModel, GpuReader,
    Gpus, NetworkReader, NetworkSnapshot, RamReader, SensorsReader,
};
pub use registry::{AnyReader, AnySnapshot, ReaderFactory, Services, StatsReaders, reader_info};

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
