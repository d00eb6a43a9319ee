//! GpuReader: accelerator utilization, one entry per vendor.

use std::sync::Arc;

use serde::Serialize;

use crate::platform::{AcceleratorRegistry, IoDict};
use crate::reader::{Platform, Reader, ReaderInfo, ReaderKind, Requirement};

pub(crate) static GPU_INFO: ReaderInfo = ReaderInfo {
    name: "gpu",
    description: "GPU utilization from IOAccelerator performance statistics",
    kind: ReaderKind::Gpu,
    platform: Platform::MacOS,
    requirements: &[Requirement::IOKit],
};

const UTILIZATION_KEYS: [&str; 2] = ["Device Utilization %", "GPU Activity(%)"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GpuModel {
    Nvidia,
    Amd,
    Intel,
}

impl GpuModel {
    /// Classify an accelerator by its registry class name.
    pub fn classify(io_class: &str) -> Self {
        let class = io_class.to_lowercase();
        if class == "nvaccelerator" || class.contains("nvidia") {
            Self::Nvidia
        } else if class.contains("amd") {
            Self::Amd
        } else {
            Self::Intel
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Nvidia => "Nvidia Graphics",
            Self::Amd => "AMD Graphics",
            Self::Intel => "Intel Graphics",
        }
    }
}

impl std::fmt::Display for GpuModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GpuInfo {
    /// Class of the first accelerator seen for this model.
    pub io_class: String,
    pub model: GpuModel,
    /// Fraction in `[0, 1]`; `None` until statistics are reported.
    pub utilization: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Gpus {
    pub list: Vec<GpuInfo>,
}

impl Gpus {
    /// Entry for `model`, appended on first sight.
    fn entry(&mut self, model: GpuModel, io_class: &str) -> &mut GpuInfo {
        let idx = match self.list.iter().position(|g| g.model == model) {
            Some(idx) => idx,
            None => {
                self.list.push(GpuInfo {
                    io_class: io_class.to_string(),
                    model,
                    utilization: None,
                });
                self.list.len() - 1
            }
        };
        &mut self.list[idx]
    }
}

pub struct GpuReader {
    registry: Arc<dyn AcceleratorRegistry>,
    gpus: Gpus,
}

impl GpuReader {
    pub fn new(registry: Arc<dyn AcceleratorRegistry>) -> Self {
        Self {
            registry,
            gpus: Gpus::default(),
        }
    }

    fn observe(&mut self, accelerator: &IoDict) {
        let Some(io_class) = accelerator.get("IOClass").and_then(|v| v.as_str()) else {
            log::debug!("gpu: accelerator without IOClass");
            return;
        };
        let Some(stats) = accelerator
            .get("PerformanceStatistics")
            .and_then(|v| v.as_dict())
        else {
            log::debug!("gpu: {io_class} has no PerformanceStatistics");
            return;
        };

        let utilization = UTILIZATION_KEYS
            .iter()
            .find_map(|key| stats.get(*key).and_then(|v| v.as_f64()));

        let entry = self.gpus.entry(GpuModel::classify(io_class), io_class);
        if let Some(percent) = utilization {
            entry.utilization = Some((percent / 100.0).clamp(0.0, 1.0));
        }
    }
}

impl Reader for GpuReader {
    type Snapshot = Gpus;

    fn info(&self) -> &ReaderInfo {
        &GPU_INFO
    }

    fn read(&mut self, on_result: impl FnOnce(Gpus)) {
        let Some(accelerators) = self.registry.accelerators() else {
            log::debug!("gpu: no accelerators");
            return;
        };
        for accelerator in &accelerators {
            self.observe(accelerator);
        }
        on_result(self.gpus.clone());
    }
}
