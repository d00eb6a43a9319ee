//! AppleSMC user client.
//!
//! Talks to the `AppleSMC` IOKit service through `IOConnectCallStructMethod`
//! with the fixed 80-byte [`KeyData`] parameter block. Every request is a
//! round trip: ask for a key's info (size and type), then read its bytes.

use std::ffi::{c_void, CString};

use crate::codec::FourCharCode;
use crate::error::SmcError;
use crate::platform::firmware::{FirmwareService, RawValue};

// ---------------------------------------------------------------------------
// IOKit FFI
// ---------------------------------------------------------------------------

#[allow(non_camel_case_types)]
type kern_return_t = i32;
#[allow(non_camel_case_types)]
type mach_port_t = u32;
#[allow(non_camel_case_types)]
type io_object_t = u32;
#[allow(non_camel_case_types)]
type io_connect_t = u32;

const KERN_SUCCESS: kern_return_t = 0;
const K_IO_MAIN_PORT_DEFAULT: mach_port_t = 0;

#[link(name = "IOKit", kind = "framework")]
unsafe extern "C" {
    fn IOServiceMatching(name: *const std::ffi::c_char) -> *mut c_void;
    fn IOServiceGetMatchingService(main_port: mach_port_t, matching: *mut c_void) -> io_object_t;
    fn IOServiceOpen(
        service: io_object_t,
        owning_task: mach_port_t,
        kind: u32,
        connect: *mut io_connect_t,
    ) -> kern_return_t;
    fn IOServiceClose(connect: io_connect_t) -> kern_return_t;
    fn IOObjectRelease(object: io_object_t) -> kern_return_t;
    fn IOConnectCallStructMethod(
        connection: io_connect_t,
        selector: u32,
        input: *const c_void,
        input_size: usize,
        output: *mut c_void,
        output_size: *mut usize,
    ) -> kern_return_t;
}

// Mach kernel FFI bindings.
unsafe extern "C" {
    fn mach_task_self() -> mach_port_t;
}

// ---------------------------------------------------------------------------
// Parameter block
// ---------------------------------------------------------------------------

/// `kSMCHandleYPCEvent`: the only selector the user client exposes.
const SELECTOR: u32 = 2;

const CMD_READ_BYTES: u8 = 5;
const CMD_READ_INDEX: u8 = 8;
const CMD_READ_KEY_INFO: u8 = 9;

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct KeyDataVersion {
    major: u8,
    minor: u8,
    build: u8,
    reserved: u8,
    release: u16,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct PowerLimitData {
    version: u16,
    length: u16,
    cpu: u32,
    gpu: u32,
    mem: u32,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct KeyInfo {
    data_size: u32,
    data_type: u32,
    data_attributes: u8,
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct KeyData {
    key: u32,
    version: KeyDataVersion,
    limits: PowerLimitData,
    info: KeyInfo,
    result: u8,
    status: u8,
    data8: u8,
    data32: u32,
    bytes: [u8; 32],
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// An open connection to the AppleSMC service. Closed on drop.
#[derive(Debug)]
pub struct AppleSmc {
    connection: io_connect_t,
}

impl AppleSmc {
    pub fn open() -> Result<Self, SmcError> {
        let name = CString::new("AppleSMC").map_err(|_| SmcError::ServiceNotFound)?;

        // SAFETY: IOServiceMatching builds a matching dictionary from a valid
        // NUL-terminated class name. IOServiceGetMatchingService consumes it.
        let service = unsafe {
            let matching = IOServiceMatching(name.as_ptr());
            if matching.is_null() {
                return Err(SmcError::ServiceNotFound);
            }
            IOServiceGetMatchingService(K_IO_MAIN_PORT_DEFAULT, matching)
        };
        if service == 0 {
            return Err(SmcError::ServiceNotFound);
        }

        let mut connection: io_connect_t = 0;
        // SAFETY: `service` is a valid io_object_t from the lookup above and
        // `connection` is a valid out-pointer. mach_task_self() returns the
        // current task port (always valid). The service reference is released
        // whether or not the open succeeds.
        let kr = unsafe {
            let kr = IOServiceOpen(service, mach_task_self(), 0, &mut connection);
            IOObjectRelease(service);
            kr
        };
        if kr != KERN_SUCCESS {
            return Err(SmcError::Open(kr));
        }

        log::debug!("opened AppleSMC connection {connection}");
        Ok(Self { connection })
    }

    fn call(&self, key: FourCharCode, input: &KeyData) -> Result<KeyData, SmcError> {
        let mut output = KeyData::default();
        let mut output_size = std::mem::size_of::<KeyData>();

        // SAFETY: both buffers are live, properly aligned `KeyData` values of
        // the size passed alongside them, and `self.connection` stays open for
        // the lifetime of `self`.
        let kr = unsafe {
            IOConnectCallStructMethod(
                self.connection,
                SELECTOR,
                (input as *const KeyData).cast(),
                std::mem::size_of::<KeyData>(),
                (&mut output as *mut KeyData).cast(),
                &mut output_size,
            )
        };

        if kr != KERN_SUCCESS {
            return Err(SmcError::Call {
                key: key.to_string(),
                code: kr,
            });
        }
        if output.result != 0 {
            return Err(SmcError::Firmware {
                key: key.to_string(),
                result: output.result,
            });
        }
        Ok(output)
    }

    fn key_info(&self, key: FourCharCode) -> Result<KeyInfo, SmcError> {
        let input = KeyData {
            key: key.0,
            data8: CMD_READ_KEY_INFO,
            ..KeyData::default()
        };
        Ok(self.call(key, &input)?.info)
    }

    /// Read the raw reply for a key given as text.
    pub fn read(&self, key: &str) -> Result<RawValue, SmcError> {
        let code: FourCharCode = key.parse()?;
        let info = self.key_info(code)?;

        let input = KeyData {
            key: code.0,
            info: KeyInfo {
                data_size: info.data_size,
                ..KeyInfo::default()
            },
            data8: CMD_READ_BYTES,
            ..KeyData::default()
        };
        let output = self.call(code, &input)?;

        let len = (info.data_size as usize).min(output.bytes.len());
        Ok(RawValue {
            data_type: FourCharCode(info.data_type),
            bytes: output.bytes[..len].to_vec(),
        })
    }

    /// The key stored at `index` in the firmware's key table.
    fn key_at(&self, index: u32) -> Result<FourCharCode, SmcError> {
        let input = KeyData {
            data8: CMD_READ_INDEX,
            data32: index,
            ..KeyData::default()
        };
        let output = self.call(FourCharCode::default(), &input)?;
        Ok(FourCharCode(output.key))
    }

    /// Number of keys the firmware advertises (the `#KEY` key).
    pub fn key_count(&self) -> Result<u32, SmcError> {
        let raw = self.read("#KEY")?;
        let bytes: [u8; 4] = raw
            .bytes
            .get(..4)
            .and_then(|b| b.try_into().ok())
            .ok_or_else(|| crate::error::CodecError::ShortBuffer {
                data_type: raw.data_type.to_string(),
                expected: 4,
                actual: raw.bytes.len(),
            })?;
        Ok(u32::from_be_bytes(bytes))
    }
}

impl Drop for AppleSmc {
    fn drop(&mut self) {
        // SAFETY: `connection` was returned by a successful IOServiceOpen and
        // is closed exactly once.
        unsafe {
            IOServiceClose(self.connection);
        }
    }
}

impl FirmwareService for AppleSmc {
    fn all_keys(&self) -> Vec<String> {
        let count = match self.key_count() {
            Ok(count) => count,
            Err(e) => {
                log::warn!("cannot enumerate SMC keys: {e}");
                return Vec::new();
            }
        };

        (0..count)
            .filter_map(|index| match self.key_at(index) {
                Ok(code) => Some(code.to_string()),
                Err(e) => {
                    log::debug!("SMC key #{index}: {e}");
                    None
                }
            })
            .collect()
    }

    fn read_key(&self, key: &str) -> Option<RawValue> {
        match self.read(key) {
            Ok(raw) if !raw.bytes.is_empty() => Some(raw),
            Ok(_) => None,
            Err(e) => {
                log::debug!("SMC read {key}: {e}");
                None
            }
        }
    }
}
