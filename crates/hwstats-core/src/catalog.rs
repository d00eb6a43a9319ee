//! Sensor catalog: which firmware keys this machine actually has.
//!
//! The firmware advertises hundreds of keys; [`SENSOR_TABLE`] names the ones
//! worth showing. [`build_catalog`] intersects the two once, expanding
//! templated entries (`%` stands for an instance digit) and dropping
//! temperature sensors that report impossible values.

use std::collections::HashSet;

use serde::Serialize;

use crate::platform::FirmwareService;

/// Placeholder for an instance index in templated keys and names.
const PLACEHOLDER: char = '%';

/// Highest instance digit probed for templated keys.
const MAX_INSTANCE: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorKind {
    Temperature,
    Voltage,
    Power,
    Frequency,
}

impl SensorKind {
    pub fn unit(self) -> &'static str {
        match self {
            Self::Temperature => "°C",
            Self::Voltage => "V",
            Self::Power => "W",
            Self::Frequency => "RPM",
        }
    }

    /// Firmware key prefixes that can hold sensor readings.
    fn is_sensor_prefix(key: &str) -> bool {
        matches!(key.as_bytes().first(), Some(b'T' | b'V' | b'P' | b'F'))
    }
}

impl std::fmt::Display for SensorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Temperature => write!(f, "temperature"),
            Self::Voltage => write!(f, "voltage"),
            Self::Power => write!(f, "power"),
            Self::Frequency => write!(f, "frequency"),
        }
    }
}

/// A known sensor key and how to label it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub kind: SensorKind,
}

impl SensorDefinition {
    const fn new(key: &'static str, name: &'static str, kind: SensorKind) -> Self {
        Self { key, name, kind }
    }

    pub fn is_templated(&self) -> bool {
        self.key.contains(PLACEHOLDER)
    }
}

/// A catalog entry with its latest reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sensor {
    pub key: String,
    pub name: String,
    pub kind: SensorKind,
    pub value: f64,
}

impl Sensor {
    fn from_definition(def: &SensorDefinition, key: String, name: String) -> Self {
        Self {
            key,
            name,
            kind: def.kind,
            value: 0.0,
        }
    }
}

use SensorKind::{Frequency, Power, Temperature, Voltage};

/// Common Apple SMC sensor keys (Intel and Apple Silicon).
pub static SENSOR_TABLE: &[SensorDefinition] = &[
    // CPU
    SensorDefinition::new("TC0D", "CPU diode", Temperature),
    SensorDefinition::new("TC0E", "CPU diode virtual", Temperature),
    SensorDefinition::new("TC0F", "CPU diode filtered", Temperature),
    SensorDefinition::new("TC0H", "CPU heatsink", Temperature),
    SensorDefinition::new("TC0P", "CPU proximity", Temperature),
    SensorDefinition::new("TCAD", "CPU package", Temperature),
    SensorDefinition::new("TC%c", "CPU core %", Temperature),
    SensorDefinition::new("Tp0%", "Performance core %", Temperature),
    SensorDefinition::new("Te0%", "Efficiency core %", Temperature),
    // GPU
    SensorDefinition::new("TCGC", "GPU Intel Graphics", Temperature),
    SensorDefinition::new("TG0D", "GPU diode", Temperature),
    SensorDefinition::new("TG0H", "GPU heatsink", Temperature),
    SensorDefinition::new("TG0P", "GPU proximity", Temperature),
    SensorDefinition::new("TGDD", "GPU AMD Radeon", Temperature),
    SensorDefinition::new("Tg0%", "GPU cluster %", Temperature),
    // System
    SensorDefinition::new("TA0P", "Ambient", Temperature),
    SensorDefinition::new("TB0T", "Battery", Temperature),
    SensorDefinition::new("TB%T", "Battery cell %", Temperature),
    SensorDefinition::new("TH0a", "SSD A", Temperature),
    SensorDefinition::new("TH0b", "SSD B", Temperature),
    SensorDefinition::new("TM0P", "Memory proximity", Temperature),
    SensorDefinition::new("TN0D", "Northbridge diode", Temperature),
    SensorDefinition::new("TN0P", "Northbridge proximity", Temperature),
    SensorDefinition::new("TPCD", "Platform controller hub", Temperature),
    SensorDefinition::new("Ts0P", "Palm rest", Temperature),
    SensorDefinition::new("TW0P", "Airport", Temperature),
    // Voltage
    SensorDefinition::new("VC0C", "CPU core", Voltage),
    SensorDefinition::new("VG0C", "GPU core", Voltage),
    SensorDefinition::new("VM0R", "Memory", Voltage),
    SensorDefinition::new("VN0C", "Northbridge", Voltage),
    SensorDefinition::new("VD0R", "DC in", Voltage),
    SensorDefinition::new("VP0R", "12V rail", Voltage),
    // Power
    SensorDefinition::new("PC0C", "CPU core", Power),
    SensorDefinition::new("PCPC", "CPU package", Power),
    SensorDefinition::new("PCPG", "CPU package GPU", Power),
    SensorDefinition::new("PG0R", "GPU rail", Power),
    SensorDefinition::new("PMVC", "Memory", Power),
    SensorDefinition::new("PPBR", "Battery", Power),
    SensorDefinition::new("PDTR", "DC in", Power),
    SensorDefinition::new("PSTR", "System total", Power),
    // Fans
    SensorDefinition::new("F%Ac", "Fan %", Frequency),
];

/// Intersect the firmware's keys with `table`.
///
/// Literal entries are taken first and consume their key; templated entries
/// then probe instances 0..=9 and are numbered 1, 2, 3... in the order found.
/// Temperatures above `max_temperature` are dropped; entries without a
/// readable value keep 0.0.
pub fn build_catalog(
    firmware: &dyn FirmwareService,
    table: &[SensorDefinition],
    max_temperature: f64,
) -> Vec<Sensor> {
    let mut available: HashSet<String> = firmware
        .all_keys()
        .into_iter()
        .filter(|key| SensorKind::is_sensor_prefix(key))
        .collect();

    let mut catalog = Vec::new();

    for def in table.iter().filter(|d| !d.is_templated()) {
        if available.remove(def.key) {
            catalog.push(Sensor::from_definition(
                def,
                def.key.to_string(),
                def.name.to_string(),
            ));
        }
    }

    for def in table.iter().filter(|d| d.is_templated()) {
        let mut display = 1;
        for instance in 0..=MAX_INSTANCE {
            let key = def.key.replace(PLACEHOLDER, &instance.to_string());
            if available.contains(&key) {
                let name = def.name.replace(PLACEHOLDER, &display.to_string());
                catalog.push(Sensor::from_definition(def, key, name));
                display += 1;
            }
        }
    }

    catalog.retain_mut(|sensor| {
        let Some(value) = firmware.value(&sensor.key) else {
            return true;
        };
        if sensor.kind == SensorKind::Temperature && value > max_temperature {
            log::info!(
                "dropping sensor {} ({}): {value:.1} exceeds {max_temperature}",
                sensor.key,
                sensor.name
            );
            return false;
        }
        sensor.value = value;
        true
    });

    log::debug!("sensor catalog: {} entries", catalog.len());
    catalog
}
