//! FansReader: per-fan speed and limits from the firmware.
//!
//! Fan identity (name, min/max RPM) is read once at construction. Each read
//! only refreshes the actual speed key `F<i>Ac`.

use std::sync::Arc;

use serde::Serialize;

use crate::config::StatsConfig;
use crate::platform::FirmwareService;
use crate::reader::{Platform, Reader, ReaderInfo, ReaderKind, Requirement};

pub(crate) static FANS_INFO: ReaderInfo = ReaderInfo {
    name: "fans",
    description: "Fan speeds with their minimum and maximum RPM",
    kind: ReaderKind::Fans,
    platform: Platform::MacOS,
    requirements: &[Requirement::Smc],
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fan {
    pub id: usize,
    pub name: String,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Current speed in RPM.
    pub value: f64,
    pub enabled: bool,
}

impl Fan {
    fn speed_key(&self) -> String {
        format!("F{}Ac", self.id)
    }

    /// Speed as a whole-RPM label, e.g. `"1843 RPM"`.
    pub fn formatted_value(&self) -> String {
        format!("{} RPM", self.value as i64)
    }
}

pub struct FansReader {
    firmware: Arc<dyn FirmwareService>,
    fans: Vec<Fan>,
}

impl FansReader {
    pub fn new(firmware: Arc<dyn FirmwareService>, config: &StatsConfig) -> Self {
        let fans = discover_fans(firmware.as_ref(), config);
        Self { firmware, fans }
    }

    pub fn fans(&self) -> &[Fan] {
        &self.fans
    }
}

/// Upper bound on `FNum`; anything larger is a garbage reply.
const MAX_FANS: usize = 16;

fn discover_fans(firmware: &dyn FirmwareService, config: &StatsConfig) -> Vec<Fan> {
    let Some(count) = firmware.value("FNum") else {
        log::debug!("fans: FNum unavailable");
        return Vec::new();
    };
    let count = count.clamp(0.0, MAX_FANS as f64) as usize;

    (0..count)
        .map(|id| Fan {
            id,
            name: firmware
                .string_value(&format!("F{id}ID"))
                .unwrap_or_else(|| format!("Fan #{id}")),
            min_speed: firmware.value(&format!("F{id}Mn")).unwrap_or(1.0),
            max_speed: firmware.value(&format!("F{id}Mx")).unwrap_or(1.0),
            value: firmware.value(&format!("F{id}Ac")).unwrap_or(0.0),
            enabled: config.fan_enabled(id),
        })
        .collect()
}

impl Reader for FansReader {
    type Snapshot = Vec<Fan>;

    fn info(&self) -> &ReaderInfo {
        &FANS_INFO
    }

    fn read(&mut self, on_result: impl FnOnce(Vec<Fan>)) {
        for fan in &mut self.fans {
            if let Some(value) = self.firmware.value(&fan.speed_key()) {
                fan.value = value;
            }
        }
        on_result(self.fans.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::NullFirmware;
    use crate::test_support::FakeFirmware;

    fn two_fans() -> FakeFirmware {
        FakeFirmware::new()
            .with_raw("FNum", "ui8 ", &[2])
            .with_text("F0ID", "Left side")
            .with_raw("F0Mn", "fpe2", &[0x1F, 0x40])
            .with_raw("F0Mx", "fpe2", &[0x5D, 0xC0])
            .with_raw("F0Ac", "fpe2", &[0x2E, 0xE0])
    }

    #[test]
    fn identity_is_read_at_construction() {
        let reader = FansReader::new(Arc::new(two_fans()), &StatsConfig::default());
        let fans = reader.fans();
        assert_eq!(fans.len(), 2);

        assert_eq!(fans[0].name, "Left side");
        assert_eq!(fans[0].min_speed, 2000.0);
        assert_eq!(fans[0].max_speed, 6000.0);
        assert_eq!(fans[0].value, 3000.0);

        assert_eq!(fans[1].name, "Fan #1");
        assert_eq!(fans[1].min_speed, 1.0);
        assert_eq!(fans[1].max_speed, 1.0);
        assert_eq!(fans[1].value, 0.0);
        assert!(fans.iter().all(|f| f.enabled));
    }

    #[test]
    fn read_refreshes_speed_only() {
        let firmware = Arc::new(two_fans());
        let mut reader = FansReader::new(firmware.clone(), &StatsConfig::default());

        firmware.set_value("F0Ac", 4200.0);
        firmware.set_raw("F0ID", "ch8*", b"Renamed");
        let fans = reader.snapshot().unwrap();
        assert_eq!(fans[0].value, 4200.0);
        assert_eq!(fans[0].name, "Left side");
        assert_eq!(fans[0].formatted_value(), "4200 RPM");
    }

    #[test]
    fn implausible_fan_count_is_capped() {
        let firmware = FakeFirmware::new().with_value("FNum", 4e9);
        let reader = FansReader::new(Arc::new(firmware), &StatsConfig::default());
        assert_eq!(reader.fans().len(), MAX_FANS);

        let firmware = FakeFirmware::new().with_value("FNum", -3.0);
        let reader = FansReader::new(Arc::new(firmware), &StatsConfig::default());
        assert!(reader.fans().is_empty());
    }

    #[test]
    fn disabled_fans_come_from_config() {
        let config = StatsConfig {
            disabled_fans: vec![1],
            ..StatsConfig::default()
        };
        let reader = FansReader::new(Arc::new(two_fans()), &config);
        assert!(reader.fans()[0].enabled);
        assert!(!reader.fans()[1].enabled);
    }

    #[test]
    fn no_firmware_still_calls_back() {
        let mut reader = FansReader::new(Arc::new(NullFirmware), &StatsConfig::default());
        assert_eq!(reader.snapshot(), Some(Vec::new()));
    }
}
