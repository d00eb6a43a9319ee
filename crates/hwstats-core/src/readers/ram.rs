//! RamReader: top memory consumers from `top`.

use std::sync::Arc;

use crate::platform::{CommandRunner, ProcessRegistry};
use crate::process_table::{ProcessUsage, is_ram_row, parse_ram_line};
use crate::reader::{Platform, Reader, ReaderInfo, ReaderKind, Requirement};

const TOP_PATH: &str = "/usr/bin/top";

const BYTES_PER_MEGABYTE: f64 = 1024.0 * 1024.0;

pub(crate) static RAM_INFO: ReaderInfo = ReaderInfo {
    name: "ram",
    description: "Per-process memory footprint from top, largest first",
    kind: ReaderKind::Ram,
    platform: Platform::MacOS,
    requirements: &[Requirement::Subprocess],
};

pub struct RamReader {
    commands: Arc<dyn CommandRunner>,
    apps: Arc<dyn ProcessRegistry>,
    count: usize,
}

impl RamReader {
    pub fn new(
        commands: Arc<dyn CommandRunner>,
        apps: Arc<dyn ProcessRegistry>,
        count: usize,
    ) -> Self {
        Self {
            commands,
            apps,
            count,
        }
    }
}

impl Reader for RamReader {
    /// `usage` is in bytes.
    type Snapshot = Vec<ProcessUsage>;

    fn info(&self) -> &ReaderInfo {
        &RAM_INFO
    }

    fn read(&mut self, on_result: impl FnOnce(Vec<ProcessUsage>)) {
        let count = self.count.to_string();
        let args = [
            "-l", "1", "-o", "mem", "-n", &count, "-stats", "pid,command,mem",
        ];
        let output = match self.commands.run(TOP_PATH, &args) {
            Ok(output) => output,
            Err(e) => {
                log::warn!("ram: {e}");
                return;
            }
        };
        if output.trim().is_empty() {
            log::warn!("ram: top produced no output");
            return;
        }

        let names = self.apps.application_names();
        let list = output
            .lines()
            .filter(|line| is_ram_row(line))
            .map(parse_ram_line)
            .map(|row| ProcessUsage {
                name: names.get(&row.pid).cloned(),
                pid: row.pid,
                command: row.command,
                usage: row.usage * BYTES_PER_MEGABYTE,
            })
            .collect();

        on_result(list);
    }
}
