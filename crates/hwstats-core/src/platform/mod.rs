//! Collaborators the readers query: firmware, power sources, the IO
//! registry, subprocesses, running applications and network interfaces.
//!
//! Each is a trait so readers can be driven by fakes in tests. The default
//! implementations shell out to macOS utilities or call IOKit/libc directly
//! and degrade to empty results elsewhere.

pub mod apps;
pub mod command;
pub mod firmware;
pub mod interfaces;
pub mod ioreg;
pub mod power;
#[cfg(target_os = "macos")]
pub mod smc;

pub use apps::{LaunchServicesApps, NoApps, ProcessRegistry};
pub use command::{CommandRunner, NoCommands, SystemCommand};
pub use firmware::{FirmwareService, NullFirmware, RawValue};
pub use interfaces::{
    InterfaceAddress, InterfaceRecord, InterfaceSource, NoInterfaces, SystemInterfaces,
};
pub use ioreg::{AcceleratorRegistry, IoDict, IoValue, IoregAccelerators, NoAccelerators};
pub use power::{
    AdapterDetails, NoPowerSources, PmsetPowerSources, PowerSourceDescription, PowerSources,
};
#[cfg(target_os = "macos")]
pub use smc::AppleSmc;

/// Platform information.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PlatformInfo {
    pub system: String,
    pub machine: String,
    pub family: String,
}

pub fn platform_info() -> PlatformInfo {
    PlatformInfo {
        system: std::env::consts::OS.to_string(),
        machine: std::env::consts::ARCH.to_string(),
        family: std::env::consts::FAMILY.to_string(),
    }
}
