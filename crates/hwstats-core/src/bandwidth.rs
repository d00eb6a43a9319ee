//! Cumulative byte counters to per-interval deltas.
//!
//! The OS reports bytes-since-boot. [`BandwidthTracker`] remembers the last
//! reading and turns each new one into the bytes moved since then, plus a
//! running total of those deltas.

use serde::Serialize;

/// Upload and download byte counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Bandwidth {
    pub upload: i64,
    pub download: i64,
}

impl Bandwidth {
    pub const ZERO: Bandwidth = Bandwidth {
        upload: 0,
        download: 0,
    };

    pub fn new(upload: i64, download: i64) -> Self {
        Self { upload, download }
    }
}

/// Converts cumulative counters into deltas.
///
/// A zero baseline component means "never observed", so the first reading of
/// each direction yields a zero delta rather than the whole boot-time total.
/// Counter resets (current below baseline) clamp to zero.
#[derive(Debug, Clone, Default)]
pub struct BandwidthTracker {
    baseline: Bandwidth,
    total: Bandwidth,
}

impl BandwidthTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previous cumulative reading.
    pub fn baseline(&self) -> Bandwidth {
        self.baseline
    }

    /// Sum of every delta emitted so far.
    pub fn total(&self) -> Bandwidth {
        self.total
    }

    /// The delta `current` represents against the stored baseline, without
    /// updating any state.
    pub fn delta(&self, current: Bandwidth) -> Bandwidth {
        Bandwidth {
            upload: component_delta(self.baseline.upload, current.upload),
            download: component_delta(self.baseline.download, current.download),
        }
    }

    /// Record `current`: accumulate its delta into the total, hand
    /// `(delta, total)` to `emit`, then adopt `current` as the new baseline.
    pub fn observe(&mut self, current: Bandwidth, emit: impl FnOnce(Bandwidth, Bandwidth)) {
        let delta = self.delta(current);
        self.total.upload = self.total.upload.saturating_add(delta.upload);
        self.total.download = self.total.download.saturating_add(delta.download);
        emit(delta, self.total);
        self.baseline = current;
    }
}

fn component_delta(baseline: i64, current: i64) -> i64 {
    if baseline == 0 {
        return 0;
    }
    current.saturating_sub(baseline).max(0)
}
