//! In-memory collaborators for unit tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use crate::codec::FourCharCode;
use crate::error::CommandError;
use crate::platform::{
    AcceleratorRegistry, AdapterDetails, CommandRunner, FirmwareService, InterfaceRecord,
    InterfaceSource, IoDict, PowerSourceDescription, PowerSources, ProcessRegistry, RawValue,
};

fn code(tag: &str) -> FourCharCode {
    tag.parse().unwrap()
}

/// Firmware backed by a key map. Values can be changed between reads.
#[derive(Default)]
pub struct FakeFirmware {
    keys: Mutex<BTreeMap<String, RawValue>>,
}

impl FakeFirmware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(self, key: &str, data_type: &str, bytes: &[u8]) -> Self {
        self.set_raw(key, data_type, bytes);
        self
    }

    /// Stored as a little-endian `flt `.
    pub fn with_value(self, key: &str, value: f64) -> Self {
        self.set_value(key, value);
        self
    }

    pub fn with_text(self, key: &str, text: &str) -> Self {
        self.set_raw(key, "ch8*", text.as_bytes());
        self
    }

    pub fn set_raw(&self, key: &str, data_type: &str, bytes: &[u8]) {
        self.keys.lock().unwrap().insert(
            key.to_string(),
            RawValue {
                data_type: code(data_type),
                bytes: bytes.to_vec(),
            },
        );
    }

    pub fn set_value(&self, key: &str, value: f64) {
        self.set_raw(key, "flt ", &(value as f32).to_le_bytes());
    }
}

impl FirmwareService for FakeFirmware {
    fn all_keys(&self) -> Vec<String> {
        self.keys.lock().unwrap().keys().cloned().collect()
    }

    fn read_key(&self, key: &str) -> Option<RawValue> {
        self.keys.lock().unwrap().get(key).cloned()
    }
}

/// Canned stdout per program path. Unknown programs fail to spawn.
#[derive(Default)]
pub struct FakeCommands {
    outputs: Mutex<HashMap<String, String>>,
    calls: Mutex<Vec<(String, Vec<String>)>>,
}

impl FakeCommands {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(self, program: &str, output: &str) -> Self {
        self.set_output(program, output);
        self
    }

    pub fn set_output(&self, program: &str, output: &str) {
        self.outputs
            .lock()
            .unwrap()
            .insert(program.to_string(), output.to_string());
    }

    pub fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

impl CommandRunner for FakeCommands {
    fn run(&self, program: &str, args: &[&str]) -> Result<String, CommandError> {
        self.calls.lock().unwrap().push((
            program.to_string(),
            args.iter().map(|a| a.to_string()).collect(),
        ));
        self.outputs
            .lock()
            .unwrap()
            .get(program)
            .cloned()
            .ok_or_else(|| CommandError::Spawn {
                program: program.to_string(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
    }
}

#[derive(Default)]
pub struct FakeInterfaces {
    records: Mutex<Option<Vec<InterfaceRecord>>>,
}

impl FakeInterfaces {
    pub fn new(records: Option<Vec<InterfaceRecord>>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    pub fn set(&self, records: Option<Vec<InterfaceRecord>>) {
        *self.records.lock().unwrap() = records;
    }
}

impl InterfaceSource for FakeInterfaces {
    fn interfaces(&self) -> Option<Vec<InterfaceRecord>> {
        self.records.lock().unwrap().clone()
    }
}

#[derive(Default)]
pub struct FakePower {
    pub descriptions: Vec<PowerSourceDescription>,
    pub properties: Option<IoDict>,
    pub adapter: Option<AdapterDetails>,
}

impl PowerSources for FakePower {
    fn descriptions(&self) -> Vec<PowerSourceDescription> {
        self.descriptions.clone()
    }

    fn battery_properties(&self) -> Option<IoDict> {
        self.properties.clone()
    }

    fn adapter_details(&self) -> Option<AdapterDetails> {
        self.adapter.clone()
    }
}

pub struct FakeAccelerators(pub Option<Vec<IoDict>>);

impl AcceleratorRegistry for FakeAccelerators {
    fn accelerators(&self) -> Option<Vec<IoDict>> {
        self.0.clone()
    }
}

#[derive(Default)]
pub struct FakeApps(pub HashMap<u32, String>);

impl ProcessRegistry for FakeApps {
    fn application_names(&self) -> HashMap<u32, String> {
        self.0.clone()
    }
}
