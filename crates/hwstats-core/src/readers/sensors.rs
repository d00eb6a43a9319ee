//! SensorsReader: temperatures, voltages, power rails and fan speeds from
//! the firmware catalog.

use std::sync::Arc;

use crate::catalog::{SENSOR_TABLE, Sensor, SensorDefinition, build_catalog};
use crate::platform::FirmwareService;
use crate::reader::{Platform, Reader, ReaderInfo, ReaderKind, Requirement};

pub(crate) static SENSORS_INFO: ReaderInfo = ReaderInfo {
    name: "sensors",
    description: "SMC temperature, voltage, power and fan-speed sensors",
    kind: ReaderKind::Sensors,
    platform: Platform::MacOS,
    requirements: &[Requirement::Smc],
};

pub struct SensorsReader {
    firmware: Arc<dyn FirmwareService>,
    sensors: Vec<Sensor>,
}

impl SensorsReader {
    /// Build the catalog from [`SENSOR_TABLE`].
    pub fn new(firmware: Arc<dyn FirmwareService>, max_temperature: f64) -> Self {
        Self::with_table(firmware, SENSOR_TABLE, max_temperature)
    }

    pub fn with_table(
        firmware: Arc<dyn FirmwareService>,
        table: &[SensorDefinition],
        max_temperature: f64,
    ) -> Self {
        let sensors = build_catalog(firmware.as_ref(), table, max_temperature);
        Self { firmware, sensors }
    }

    pub fn sensors(&self) -> &[Sensor] {
        &self.sensors
    }
}

impl Reader for SensorsReader {
    type Snapshot = Vec<Sensor>;

    fn info(&self) -> &ReaderInfo {
        &SENSORS_INFO
    }

    /// Always calls back, with an empty list when the catalog is empty.
    fn read(&mut self, on_result: impl FnOnce(Vec<Sensor>)) {
        for sensor in &mut self.sensors {
            // A failed read keeps the last good value.
            if let Some(value) = self.firmware.value(&sensor.key) {
                sensor.value = value;
            }
        }
        on_result(self.sensors.clone());
    }
}
