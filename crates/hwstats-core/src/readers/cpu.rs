//! CpuReader: top CPU consumers from `ps`.

use std::sync::Arc;

use crate::platform::{CommandRunner, ProcessRegistry};
use crate::process_table::{ProcessUsage, parse_cpu_line};
use crate::reader::{Platform, Reader, ReaderInfo, ReaderKind, Requirement};

const PS_PATH: &str = "/bin/ps";

/// pid, percent of one core, command name; sorted by CPU descending.
#[cfg(target_os = "macos")]
const PS_ARGS: &[&str] = &["-Aceo", "pid,pcpu,comm", "-r"];
#[cfg(not(target_os = "macos"))]
const PS_ARGS: &[&str] = &["-Aeo", "pid,pcpu,comm", "--sort=-pcpu"];

pub(crate) static CPU_INFO: ReaderInfo = ReaderInfo {
    name: "cpu",
    description: "Per-process CPU usage from ps, highest first",
    kind: ReaderKind::Cpu,
    platform: Platform::Any,
    requirements: &[Requirement::Subprocess],
};

pub struct CpuReader {
    commands: Arc<dyn CommandRunner>,
    apps: Arc<dyn ProcessRegistry>,
    limit: Option<usize>,
}

impl CpuReader {
    pub fn new(
        commands: Arc<dyn CommandRunner>,
        apps: Arc<dyn ProcessRegistry>,
        limit: Option<usize>,
    ) -> Self {
        Self {
            commands,
            apps,
            limit,
        }
    }
}

impl Reader for CpuReader {
    type Snapshot = Vec<ProcessUsage>;

    fn info(&self) -> &ReaderInfo {
        &CPU_INFO
    }

    fn read(&mut self, on_result: impl FnOnce(Vec<ProcessUsage>)) {
        let output = match self.commands.run(PS_PATH, PS_ARGS) {
            Ok(output) => output,
            Err(e) => {
                log::warn!("cpu: {e}");
                return;
            }
        };
        if output.trim().is_empty() {
            log::warn!("cpu: ps produced no output");
            return;
        }

        let names = self.apps.application_names();
        let rows = output
            .lines()
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(parse_cpu_line)
            .map(|row| ProcessUsage {
                name: names.get(&row.pid).cloned(),
                pid: row.pid,
                command: row.command,
                usage: row.usage,
            })
            .take(self.limit.unwrap_or(usize::MAX));

        on_result(rows.collect());
    }
}
