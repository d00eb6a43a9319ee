//! Power-source queries: battery descriptions, smart-battery properties and
//! the attached AC adapter.

use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::command::CommandRunner;
use super::ioreg::{self, IoDict, IOREG_PATH};

const PMSET_PATH: &str = "/usr/bin/pmset";

static BATTERY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*-(?P<name>\S+)(?:\s+\(id=\d+\))?\s+(?P<pct>\d+)%;\s*(?P<state>[^;]*?)\s*(?:;\s*(?P<rest>.*))?$",
    )
    .expect("valid regex")
});

static REMAINING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+):(\d{2}) remaining").expect("valid regex"));

static DRAWING_FROM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Now drawing from '([^']+)'").expect("valid regex"));

static WATTAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Wattage\s*=\s*(\d+)W").expect("valid regex"));

/// One power source as the OS describes it. Absent keys stay `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PowerSourceDescription {
    /// e.g. `"InternalBattery-0"`.
    pub name: String,
    /// e.g. `"InternalBattery"`.
    pub kind: Option<String>,
    /// `"AC Power"` or `"Battery Power"`.
    pub power_source_state: Option<String>,
    pub is_charged: Option<bool>,
    pub is_charging: Option<bool>,
    /// Percent of full charge.
    pub current_capacity: Option<i64>,
    /// Minutes; `None` while the OS is still estimating.
    pub time_to_empty: Option<i64>,
    /// Minutes.
    pub time_to_full_charge: Option<i64>,
    /// Condition string such as `"Good"`.
    pub battery_health: Option<String>,
}

/// The external adapter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdapterDetails {
    pub watts: Option<i64>,
}

pub trait PowerSources: Send + Sync {
    /// Every power source; empty on machines without a battery.
    fn descriptions(&self) -> Vec<PowerSourceDescription>;

    /// Properties of the smart-battery registry entry (`CycleCount`,
    /// `MaxCapacity`, `Voltage`, ...).
    fn battery_properties(&self) -> Option<IoDict>;

    fn adapter_details(&self) -> Option<AdapterDetails>;
}

/// [`PowerSources`] backed by `pmset` and `ioreg`.
pub struct PmsetPowerSources {
    commands: Arc<dyn CommandRunner>,
}

impl PmsetPowerSources {
    pub fn new(commands: Arc<dyn CommandRunner>) -> Self {
        Self { commands }
    }

    fn run(&self, program: &str, args: &[&str]) -> Option<String> {
        self.commands
            .run(program, args)
            .map_err(|e| log::warn!("{e}"))
            .ok()
    }
}

impl PowerSources for PmsetPowerSources {
    fn descriptions(&self) -> Vec<PowerSourceDescription> {
        self.run(PMSET_PATH, &["-g", "batt"])
            .map(|out| parse_pmset_batt(&out))
            .unwrap_or_default()
    }

    fn battery_properties(&self) -> Option<IoDict> {
        let out = self.run(IOREG_PATH, &["-r", "-n", "AppleSmartBattery", "-w0"])?;
        ioreg::parse_blocks(&out)
            .into_iter()
            .find(|block| !block.is_empty())
    }

    fn adapter_details(&self) -> Option<AdapterDetails> {
        let out = self.run(PMSET_PATH, &["-g", "ac"])?;
        parse_pmset_ac(&out)
    }
}

/// Parse `pmset -g batt`.
pub fn parse_pmset_batt(output: &str) -> Vec<PowerSourceDescription> {
    let drawing_from = DRAWING_FROM
        .captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string());

    output
        .lines()
        .filter_map(|line| BATTERY_LINE.captures(line))
        .map(|caps| {
            let name = caps["name"].to_string();
            let state = caps["state"].trim().to_ascii_lowercase();
            let rest = caps.name("rest").map_or("", |m| m.as_str());

            let remaining = REMAINING.captures(rest).and_then(|c| {
                let hours: i64 = c[1].parse().ok()?;
                let minutes: i64 = c[2].parse().ok()?;
                hours.checked_mul(60)?.checked_add(minutes)
            });
            let is_charging = state == "charging" || state == "finishing charge";
            let is_charged = state == "charged";

            PowerSourceDescription {
                kind: Some(battery_kind(&name).to_string()),
                name,
                power_source_state: drawing_from.clone(),
                is_charged: Some(is_charged),
                is_charging: Some(is_charging),
                current_capacity: caps["pct"].parse().ok(),
                time_to_empty: if state == "discharging" { remaining } else { None },
                time_to_full_charge: if is_charging || is_charged { remaining } else { None },
                battery_health: None,
            }
        })
        .collect()
}

/// `"InternalBattery-0"` -> `"InternalBattery"`.
fn battery_kind(name: &str) -> &str {
    match name.rsplit_once('-') {
        Some((kind, index)) if index.chars().all(|c| c.is_ascii_digit()) => kind,
        _ => name,
    }
}

/// Parse `pmset -g ac`. `None` when no adapter is attached.
pub fn parse_pmset_ac(output: &str) -> Option<AdapterDetails> {
    if output.contains("No adapter attached") {
        return None;
    }
    let watts = WATTAGE
        .captures(output)
        .and_then(|c| c[1].parse::<i64>().ok());
    Some(AdapterDetails { watts })
}

/// Machines without power management.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPowerSources;

impl PowerSources for NoPowerSources {
    fn descriptions(&self) -> Vec<PowerSourceDescription> {
        Vec::new()
    }

    fn battery_properties(&self) -> Option<IoDict> {
        None
    }

    fn adapter_details(&self) -> Option<AdapterDetails> {
        None
    }
}
