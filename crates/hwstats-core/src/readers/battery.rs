//! BatteryReader: charge, health and electrical state of the internal battery.
//!
//! Three sources are combined on every read:
//!
//! - the OS power-source description (charge %, flags, time remaining),
//! - the smart-battery registry properties (cycles, capacities, amperage,
//!   voltage, temperature),
//! - the AC adapter details (wattage).
//!
//! The reader keeps one [`BatterySnapshot`] and updates it field by field, so
//! a time estimate that is momentarily unavailable keeps its last value while
//! the charging direction is unchanged. The estimate for the other direction
//! is reset to zero.

use std::sync::Arc;

use serde::Serialize;

use crate::config::HealthMode;
use crate::platform::{IoDict, PowerSourceDescription, PowerSources};
use crate::reader::{Platform, Reader, ReaderInfo, ReaderKind, Requirement};

pub(crate) static BATTERY_INFO: ReaderInfo = ReaderInfo {
    name: "battery",
    description: "Battery charge, health, cycles, electrical state and adapter wattage",
    kind: ReaderKind::Battery,
    platform: Platform::MacOS,
    requirements: &[Requirement::PowerManagement, Requirement::IOKit],
};

const DEFAULT_POWER_SOURCE: &str = "AC Power";

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BatterySnapshot {
    /// `"AC Power"` or `"Battery Power"`.
    pub power_source: String,
    /// Health condition string, reported with [`HealthMode::Percent`] only.
    pub state: Option<String>,
    pub is_charged: bool,
    pub is_charging: bool,
    /// Charge level in `[0, 1]`.
    pub level: f64,
    pub cycles: i64,
    /// Percent of design capacity, or the raw maximum capacity.
    pub health: i64,
    /// mA; negative while discharging.
    pub amperage: i64,
    /// Volts.
    pub voltage: f64,
    /// °C.
    pub temperature: f64,
    pub ac_watts: i64,
    /// Minutes.
    pub time_to_empty: i64,
    /// Minutes.
    pub time_to_charge: i64,
}

pub struct BatteryReader {
    power: Arc<dyn PowerSources>,
    health_mode: HealthMode,
    usage: BatterySnapshot,
}

impl BatteryReader {
    pub fn new(power: Arc<dyn PowerSources>, health_mode: HealthMode) -> Self {
        Self {
            power,
            health_mode,
            usage: BatterySnapshot::default(),
        }
    }

    /// The state delivered by the most recent read.
    pub fn current(&self) -> &BatterySnapshot {
        &self.usage
    }

    fn apply_description(&mut self, desc: &PowerSourceDescription, props: &IoDict) {
        let usage = &mut self.usage;

        usage.power_source = desc
            .power_source_state
            .clone()
            .unwrap_or_else(|| DEFAULT_POWER_SOURCE.to_string());
        usage.is_charged = desc.is_charged.unwrap_or(false);
        usage.is_charging = property_bool(props, "IsCharging")
            .or(desc.is_charging)
            .unwrap_or(false);
        usage.level = capacity_level(desc.current_capacity.unwrap_or(0));

        // Only the estimate for the current direction is meaningful.
        if usage.is_charging || usage.is_charged {
            usage.time_to_empty = 0;
        } else if let Some(minutes) = desc.time_to_empty.filter(|m| *m >= 0) {
            usage.time_to_empty = minutes;
        }
        if !usage.is_charging {
            usage.time_to_charge = 0;
        } else if let Some(minutes) = desc.time_to_full_charge.filter(|m| *m >= 0) {
            usage.time_to_charge = minutes;
        }

        usage.cycles = property_int(props, "CycleCount").unwrap_or(0);

        let max_capacity = property_int(props, "MaxCapacity").unwrap_or(1);
        match self.health_mode {
            HealthMode::Percent => {
                let design_capacity = property_int(props, "DesignCapacity").unwrap_or(1);
                usage.health = health_percent(max_capacity, design_capacity);
                usage.state = desc.battery_health.clone();
            }
            HealthMode::RawCapacity => usage.health = max_capacity,
        }

        usage.amperage = property_int(props, "Amperage").unwrap_or(0);
        usage.voltage = props
            .get("Voltage")
            .and_then(|v| v.as_f64())
            .map_or(0.0, |mv| mv / 1000.0);
        usage.temperature = props
            .get("Temperature")
            .and_then(|v| v.as_f64())
            .map_or(0.0, |centi| centi / 100.0);
    }
}

impl Reader for BatteryReader {
    type Snapshot = BatterySnapshot;

    fn info(&self) -> &ReaderInfo {
        &BATTERY_INFO
    }

    fn read(&mut self, on_result: impl FnOnce(BatterySnapshot)) {
        let descriptions = self.power.descriptions();
        if descriptions.is_empty() {
            log::debug!("battery: no power sources");
            return;
        }

        let props = self.power.battery_properties().unwrap_or_default();
        for desc in &descriptions {
            self.apply_description(desc, &props);
        }
        self.usage.ac_watts = self
            .power
            .adapter_details()
            .and_then(|adapter| adapter.watts)
            .unwrap_or(0);

        on_result(self.usage.clone());
    }
}

fn property_int(props: &IoDict, key: &str) -> Option<i64> {
    props.get(key).and_then(|v| v.as_i64())
}

fn property_bool(props: &IoDict, key: &str) -> Option<bool> {
    props.get(key).and_then(|v| v.as_bool())
}

/// Percent capacity to a `[0, 1]` level.
pub fn capacity_level(percent: i64) -> f64 {
    (percent as f64 / 100.0).clamp(0.0, 1.0)
}

/// `100 * max / design`, bounded to `0..=100`; 0 without a design capacity.
pub fn health_percent(max_capacity: i64, design_capacity: i64) -> i64 {
    if design_capacity <= 0 {
        return 0;
    }
    (max_capacity.saturating_mul(100) / design_capacity).clamp(0, 100)
}
