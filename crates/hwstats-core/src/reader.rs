//! The reader contract every telemetry source implements.
//!
//! A [`Reader`] owns whatever state its kind needs between calls (a sensor
//! catalog, a bandwidth baseline, a battery snapshot) and produces one
//! snapshot per [`read`](Reader::read). Static metadata lives in a
//! [`ReaderInfo`] so callers can list readers without constructing them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::UnknownKind;

/// The telemetry kinds the dispatcher knows how to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReaderKind {
    Cpu,
    Gpu,
    Ram,
    Battery,
    Fans,
    Network,
    Sensors,
}

impl ReaderKind {
    pub const ALL: [ReaderKind; 7] = [
        Self::Cpu,
        Self::Gpu,
        Self::Ram,
        Self::Battery,
        Self::Fans,
        Self::Network,
        Self::Sensors,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Ram => "ram",
            Self::Battery => "battery",
            Self::Fans => "fans",
            Self::Network => "network",
            Self::Sensors => "sensors",
        }
    }
}

impl fmt::Display for ReaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReaderKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownKind(s.to_string()))
    }
}

/// Target platform for a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Works on any platform.
    Any,
    /// Requires macOS.
    MacOS,
    /// Requires Linux.
    Linux,
}

impl Platform {
    /// Whether this reader can produce data on the running OS.
    pub fn is_current(self) -> bool {
        match self {
            Self::Any => true,
            Self::MacOS => cfg!(target_os = "macos"),
            Self::Linux => cfg!(target_os = "linux"),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::MacOS => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
        }
    }
}

/// Hardware/software requirement for a reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Requirement {
    /// AppleSMC user client.
    Smc,
    /// IOKit registry queries.
    IOKit,
    /// Power-source management (`pmset`).
    PowerManagement,
    /// An external utility such as `ps`, `top` or `nettop`.
    Subprocess,
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Smc => write!(f, "smc"),
            Self::IOKit => write!(f, "iokit"),
            Self::PowerManagement => write!(f, "power_management"),
            Self::Subprocess => write!(f, "subprocess"),
        }
    }
}

/// Metadata about a reader.
#[derive(Debug, Clone, Serialize)]
pub struct ReaderInfo {
    /// Unique identifier (e.g. `"cpu"`).
    pub name: &'static str,
    /// One-line human-readable description.
    pub description: &'static str,
    pub kind: ReaderKind,
    /// Target platform.
    pub platform: Platform,
    /// Hardware/software requirements beyond the platform.
    pub requirements: &'static [Requirement],
}

/// Trait that every telemetry reader implements.
///
/// `read` is synchronous: `on_result` runs before `read` returns, or not at
/// all when the underlying source is unavailable. Missing data never turns
/// into an error or a panic at this boundary.
pub trait Reader: Send {
    type Snapshot;

    /// Reader metadata.
    fn info(&self) -> &ReaderInfo;

    /// Take one snapshot and hand it to `on_result`.
    fn read(&mut self, on_result: impl FnOnce(Self::Snapshot));

    /// Convenience: capture the callback value, `None` if none was delivered.
    fn snapshot(&mut self) -> Option<Self::Snapshot> {
        let mut out = None;
        self.read(|snapshot| out = Some(snapshot));
        out
    }

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}
