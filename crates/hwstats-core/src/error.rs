//! Error types for collaborators and configuration.
//!
//! None of these cross the [`Reader`](crate::Reader) boundary: readers log
//! them and either skip the callback or fall back to default-valued fields.

use std::path::PathBuf;

/// Failure to run an external utility.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// The program could not be launched at all.
    #[error("failed to launch {program}: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// The program ran but exited unsuccessfully.
    #[error("{program} exited with status {code:?}")]
    Status { program: String, code: Option<i32> },
}

/// Failure to decode a firmware reply.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Four-character codes are exactly four bytes long.
    #[error("four-character code must be 4 bytes, got {0}")]
    KeyLength(usize),

    /// The reply is shorter than its data type requires.
    #[error("{data_type} needs {expected} bytes, got {actual}")]
    ShortBuffer {
        data_type: String,
        expected: usize,
        actual: usize,
    },

    /// No decoder exists for this data type.
    #[error("unsupported data type {0:?}")]
    Unsupported(String),
}

/// Failure talking to the SMC user client.
#[derive(Debug, thiserror::Error)]
pub enum SmcError {
    #[error("AppleSMC service not found")]
    ServiceNotFound,

    #[error("IOServiceOpen failed with kern_return {0:#x}")]
    Open(i32),

    #[error("SMC call for {key} failed with kern_return {code:#x}")]
    Call { key: String, code: i32 },

    #[error("SMC reported result {result} for {key}")]
    Firmware { key: String, result: u8 },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Failure to load a [`StatsConfig`](crate::StatsConfig) file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// A string that names no [`ReaderKind`](crate::ReaderKind).
#[derive(Debug, thiserror::Error)]
#[error("unknown reader kind {0:?} (expected one of cpu, gpu, ram, battery, fans, network, sensors)")]
pub struct UnknownKind(pub String);
