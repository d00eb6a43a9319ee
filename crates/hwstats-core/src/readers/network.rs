//! NetworkReader: upload/download throughput since the previous read.
//!
//! Two counter sources, chosen by [`NetworkMode`]:
//!
//! - `Interface`: link-layer byte counters summed over every interface.
//! - `Process`: one `nettop` sample summed over every process row.
//!
//! Both feed the same [`BandwidthTracker`]. Note that `nettop -L 1` already
//! reports per-sample figures rather than counters since boot, so in process
//! mode the tracker differences two consecutive samples.

use std::sync::Arc;

use serde::Serialize;

use crate::bandwidth::{Bandwidth, BandwidthTracker};
use crate::config::NetworkMode;
use crate::platform::{CommandRunner, InterfaceAddress, InterfaceRecord, InterfaceSource};
use crate::reader::{Platform, Reader, ReaderInfo, ReaderKind};

const NETTOP_PATH: &str = "/usr/bin/nettop";

/// One sample, per-process rows, every column except bytes in/out excluded.
const NETTOP_ARGS: &[&str] = &[
    "-P",
    "-L",
    "1",
    "-k",
    "time,interface,state,rx_dupe,rx_ooo,re-tx,rtt_avg,rcvsize,tx_win,tc_class,tc_mgt,cc_algo,P,C,R,W,arch",
];

pub(crate) static NETWORK_INFO: ReaderInfo = ReaderInfo {
    name: "network",
    description: "Bytes uploaded/downloaded since the previous read, plus running totals",
    kind: ReaderKind::Network,
    platform: Platform::Any,
    requirements: &[],
};

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct NetworkSnapshot {
    /// Bytes moved since the previous read.
    pub bandwidth: Bandwidth,
    /// Sum of every `bandwidth` reported by this reader.
    pub total: Bandwidth,
    /// First non-loopback IPv4 address (interface mode only).
    pub local_address: Option<String>,
}

pub struct NetworkReader {
    mode: NetworkMode,
    interfaces: Arc<dyn InterfaceSource>,
    commands: Arc<dyn CommandRunner>,
    tracker: BandwidthTracker,
}

impl NetworkReader {
    pub fn new(
        mode: NetworkMode,
        interfaces: Arc<dyn InterfaceSource>,
        commands: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            mode,
            interfaces,
            commands,
            tracker: BandwidthTracker::new(),
        }
    }

    pub fn mode(&self) -> NetworkMode {
        self.mode
    }

    pub fn tracker(&self) -> &BandwidthTracker {
        &self.tracker
    }

    fn interface_counters(&self) -> Option<(Bandwidth, Option<String>)> {
        let Some(records) = self.interfaces.interfaces() else {
            log::warn!("network: interface enumeration failed");
            return None;
        };
        Some((sum_links(&records), local_address(&records)))
    }

    fn process_counters(&self) -> Option<(Bandwidth, Option<String>)> {
        match self.commands.run(NETTOP_PATH, NETTOP_ARGS) {
            Ok(output) => Some((sum_nettop(&output), None)),
            Err(e) => {
                log::warn!("network: {e}");
                None
            }
        }
    }
}

impl Reader for NetworkReader {
    type Snapshot = NetworkSnapshot;

    fn info(&self) -> &ReaderInfo {
        &NETWORK_INFO
    }

    fn read(&mut self, on_result: impl FnOnce(NetworkSnapshot)) {
        let counters = match self.mode {
            NetworkMode::Interface => self.interface_counters(),
            NetworkMode::Process => self.process_counters(),
        };
        let Some((current, local_address)) = counters else {
            return;
        };

        self.tracker.observe(current, |bandwidth, total| {
            on_result(NetworkSnapshot {
                bandwidth,
                total,
                local_address,
            })
        });
    }
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Sum link-layer counters across every interface.
pub fn sum_links(records: &[InterfaceRecord]) -> Bandwidth {
    records
        .iter()
        .fold(Bandwidth::ZERO, |acc, record| match record.address {
            InterfaceAddress::Link { tx_bytes, rx_bytes } => Bandwidth {
                upload: acc.upload.saturating_add(saturating_i64(tx_bytes)),
                download: acc.download.saturating_add(saturating_i64(rx_bytes)),
            },
            _ => acc,
        })
}

/// First IPv4 address that is not loopback.
pub fn local_address(records: &[InterfaceRecord]) -> Option<String> {
    records.iter().find_map(|record| match record.address {
        InterfaceAddress::Ipv4(addr) if !addr.is_loopback() => Some(addr.to_string()),
        _ => None,
    })
}

/// Sum `nettop -P` CSV rows: column 2 is bytes in, column 3 bytes out.
///
/// The header is skipped, empty cells are dropped before indexing, rows with
/// fewer than three cells are ignored and unparseable cells count as nothing.
pub fn sum_nettop(output: &str) -> Bandwidth {
    let mut total = Bandwidth::ZERO;
    for line in output.lines().skip(1) {
        let cells: Vec<&str> = line.split(',').filter(|c| !c.is_empty()).collect();
        if cells.len() < 3 {
            continue;
        }
        if let Ok(download) = cells[1].trim().parse::<i64>() {
            total.download = total.download.saturating_add(download);
        }
        if let Ok(upload) = cells[2].trim().parse::<i64>() {
            total.upload = total.upload.saturating_add(upload);
        }
    }
    total
}
