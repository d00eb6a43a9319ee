//! Application names for process ids.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::command::CommandRunner;

const LSAPPINFO_PATH: &str = "/usr/bin/lsappinfo";

static APP_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*\d+\)\s+"([^"]*)"\s+ASN:"#).expect("valid regex"));

static APP_PID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bpid\s*=\s*(\d+)").expect("valid regex"));

/// Maps running processes to the application they belong to.
pub trait ProcessRegistry: Send + Sync {
    /// Localized names of every running application, keyed by pid.
    /// Queried once per reader pass so each row lookup is a map hit.
    fn application_names(&self) -> HashMap<u32, String>;
}

/// [`ProcessRegistry`] backed by `lsappinfo list`.
pub struct LaunchServicesApps {
    commands: Arc<dyn CommandRunner>,
}

impl LaunchServicesApps {
    pub fn new(commands: Arc<dyn CommandRunner>) -> Self {
        Self { commands }
    }
}

impl ProcessRegistry for LaunchServicesApps {
    fn application_names(&self) -> HashMap<u32, String> {
        match self.commands.run(LSAPPINFO_PATH, &["list"]) {
            Ok(out) => parse_lsappinfo(&out),
            Err(e) => {
                log::debug!("{e}");
                HashMap::new()
            }
        }
    }
}

/// Parse `lsappinfo list`: a numbered `"Name" ASN:` header per app followed
/// by indented attribute lines, one of which carries `pid = N`.
pub fn parse_lsappinfo(output: &str) -> HashMap<u32, String> {
    let mut names = HashMap::new();
    let mut current: Option<String> = None;

    for line in output.lines() {
        if let Some(caps) = APP_HEADER.captures(line) {
            current = Some(caps[1].to_string());
            continue;
        }
        let Some(name) = current.as_ref() else {
            continue;
        };
        if let Some(pid) = APP_PID
            .captures(line)
            .and_then(|caps| caps[1].parse::<u32>().ok())
        {
            names.insert(pid, name.clone());
            current = None;
        }
    }

    names
}

/// No application metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoApps;

impl ProcessRegistry for NoApps {
    fn application_names(&self) -> HashMap<u32, String> {
        HashMap::new()
    }
}
