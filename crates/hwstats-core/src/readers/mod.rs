//! One [`Reader`](crate::Reader) per telemetry kind.

pub mod battery;
pub mod cpu;
pub mod fans;
pub mod gpu;
pub mod network;
pub mod ram;
pub mod sensors;

pub use battery::{BatteryReader, BatterySnapshot};
pub use cpu::CpuReader;
pub use fans::{Fan, FansReader};
pub use gpu::{GpuInfo, GpuModel, GpuReader, Gpus};
pub use network::{NetworkReader, NetworkSnapshot};
pub use ram::RamReader;
pub use sensors::SensorsReader;
