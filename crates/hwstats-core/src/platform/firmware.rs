//! Firmware key/value access (the SMC on Macs).

use crate::codec::{self, Decoded, FourCharCode};

/// A firmware reply before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawValue {
    pub data_type: FourCharCode,
    pub bytes: Vec<u8>,
}

impl RawValue {
    pub fn decode(&self) -> Result<Decoded, crate::error::CodecError> {
        codec::decode(self.data_type, &self.bytes)
    }
}

/// The embedded controller's key/value store.
///
/// Implementations only fetch bytes. Decoding is shared through the
/// provided methods so every backend agrees on data-type semantics.
pub trait FirmwareService: Send + Sync {
    /// Every key the firmware advertises.
    fn all_keys(&self) -> Vec<String>;

    /// Raw reply for `key`, `None` if absent or unreadable.
    fn read_key(&self, key: &str) -> Option<RawValue>;

    fn value(&self, key: &str) -> Option<f64> {
        let raw = self.read_key(key)?;
        match raw.decode() {
            Ok(decoded) => decoded.as_number(),
            Err(e) => {
                log::debug!("{key}: {e}");
                None
            }
        }
    }

    fn string_value(&self, key: &str) -> Option<String> {
        let raw = self.read_key(key)?;
        match raw.decode() {
            Ok(Decoded::Text(text)) if !text.is_empty() => Some(text),
            Ok(_) => None,
            Err(e) => {
                log::debug!("{key}: {e}");
                None
            }
        }
    }
}

/// Firmware that advertises nothing. Used where no SMC exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullFirmware;

impl FirmwareService for NullFirmware {
    fn all_keys(&self) -> Vec<String> {
        Vec::new()
    }

    fn read_key(&self, _key: &str) -> Option<RawValue> {
        None
    }
}
