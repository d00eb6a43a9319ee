//! Process-table line parsing for the CPU and RAM readers.
//!
//! `ps` rows look like `  412  12,5 WindowServer` (pid, usage, command) and
//! `top` rows like `412  WindowServer  1024M+` (pid, command, size). Neither
//! grammar aborts on bad input: unparseable fields come back as zero.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::codec::parse_decimal;

static PID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+").expect("valid regex"));

static CPU_USAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9][0-9,.]*(?:\s+|$)").expect("valid regex"));

static RAM_USAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)(\d+(?:[.,]\d+)?)([BKMGT]?)\s*[+-]*\s*$").expect("valid regex")
});

static SIGN_ARTIFACTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[+-]+$").expect("valid regex"));

static RAM_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d+ +.* +\d+(?:[.,]\d+)?[A-Z]*\+?-? *$").expect("valid regex")
});

/// One entry of a top-consumer list.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessUsage {
    pub pid: u32,
    pub command: String,
    /// Localized application name, when the process belongs to one.
    pub name: Option<String>,
    /// Percent of one core (CPU) or bytes (RAM).
    pub usage: f64,
}

/// The fields a single table row carries before enrichment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProcessLine {
    pub pid: u32,
    pub command: String,
    /// Percent for CPU rows, megabytes for RAM rows.
    pub usage: f64,
}

/// Remove the first match of `re` from the front of `text`, returning the
/// matched token (trimmed) and the remainder.
fn crop<'a>(re: &Regex, text: &'a str) -> (&'a str, &'a str) {
    match re.find(text) {
        Some(m) => (m.as_str().trim(), text[m.end()..].trim_start()),
        None => ("", text),
    }
}

/// Parse a `ps -o pid,pcpu,comm` row.
pub fn parse_cpu_line(line: &str) -> ProcessLine {
    let rest = line.trim();
    let (pid, rest) = crop(&PID, rest);
    let (usage, rest) = crop(&CPU_USAGE, rest.trim_start());

    ProcessLine {
        pid: pid.parse().unwrap_or(0),
        command: rest.trim().to_string(),
        usage: parse_decimal(usage).unwrap_or(0.0),
    }
}

/// Parse a `top -stats pid,command,mem` row. Usage is returned in megabytes.
pub fn parse_ram_line(line: &str) -> ProcessLine {
    let rest = line.trim();
    let (pid, rest) = crop(&PID, rest);

    let (command, usage) = match RAM_USAGE.captures(rest) {
        Some(caps) => {
            let start = caps.get(0).map_or(rest.len(), |m| m.start());
            let amount = caps.get(1).and_then(|m| parse_decimal(m.as_str()));
            let unit = caps.get(2).map_or("", |m| m.as_str());
            let megabytes = amount.map_or(0.0, |v| to_megabytes(v, unit));
            (&rest[..start], megabytes)
        }
        None => (rest, 0.0),
    };

    let command = SIGN_ARTIFACTS.replace(command.trim(), "");

    ProcessLine {
        pid: pid.parse().unwrap_or(0),
        command: command.trim().to_string(),
        usage,
    }
}

/// Whether a `top` output line is a process row rather than a header or
/// summary line.
pub fn is_ram_row(line: &str) -> bool {
    RAM_ROW.is_match(line.trim_start())
}

/// `top` suffixes: B, K, M, G, T. A bare number is already megabytes.
fn to_megabytes(value: f64, unit: &str) -> f64 {
    const KIB: f64 = 1024.0;
    match unit {
        "B" => value / (KIB * KIB),
        "K" => value / KIB,
        "G" => value * KIB,
        "T" => value * KIB * KIB,
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn cpu_line_basic() {
        let parsed = parse_cpu_line("  412  12.5 WindowServer");
        assert_eq!(parsed.pid, 412);
        assert_eq!(parsed.usage, 12.5);
        assert_eq!(parsed.command, "WindowServer");
    }

    #[test]
    fn cpu_line_locale_comma_and_spaces_in_command() {
        let parsed = parse_cpu_line("9031   0,3 Google Chrome Helper");
        assert_eq!(parsed.pid, 9031);
        assert_eq!(parsed.usage, 0.3);
        assert_eq!(parsed.command, "Google Chrome Helper");
    }

    #[test]
    fn cpu_line_with_digit_leading_command() {
        let parsed = parse_cpu_line("77 1.0 1Password");
        assert_eq!(parsed.usage, 1.0);
        assert_eq!(parsed.command, "1Password");
    }

    #[test]
    fn cpu_line_malformed_is_zeroed() {
        let parsed = parse_cpu_line("  PID  %CPU COMM");
        assert_eq!(parsed.pid, 0);
        assert_eq!(parsed.usage, 0.0);
        assert_eq!(parsed.command, "PID  %CPU COMM");

        assert_eq!(parse_cpu_line(""), ProcessLine::default());
    }

    #[test]
    fn ram_line_megabytes() {
        let parsed = parse_ram_line("412   WindowServer    1024M+");
        assert_eq!(parsed.pid, 412);
        assert_eq!(parsed.command, "WindowServer");
        assert_eq!(parsed.usage, 1024.0);
    }

    #[test]
    fn ram_line_units_are_honoured() {
        assert_eq!(parse_ram_line("1 kernel_task 2G").usage, 2048.0);
        assert_eq!(parse_ram_line("2 mds 512K-").usage, 0.5);
        assert_eq!(parse_ram_line("3 launchd 1048576B").usage, 1.0);
        assert_eq!(parse_ram_line("4 huge 1T").usage, 1024.0 * 1024.0);
        assert_eq!(parse_ram_line("5 plain 300").usage, 300.0);
    }

    #[test]
    fn ram_line_keeps_spaces_and_strips_sign_artifacts() {
        let parsed = parse_ram_line("3344  Google Chrome He 87,5M -");
        assert_eq!(parsed.pid, 3344);
        assert_eq!(parsed.command, "Google Chrome He");
        assert_eq!(parsed.usage, 87.5);
    }

    #[test]
    fn ram_line_without_size_is_zeroed() {
        let parsed = parse_ram_line("PID    COMMAND      MEM");
        assert_eq!(parsed.pid, 0);
        assert_eq!(parsed.usage, 0.0);
    }

    #[test]
    fn ram_rows_are_recognised() {
        assert!(is_ram_row("412   WindowServer    1024M+"));
        assert!(is_ram_row("  98  kernel_task  2G"));
        assert!(is_ram_row("3344  Google Chrome He 87M-"));
        assert!(!is_ram_row("PID    COMMAND      MEM"));
        assert!(!is_ram_row("Processes: 512 total, 2 running, 510 sleeping, 2789 threads"));
        assert!(!is_ram_row("PhysMem: 15G used (2806M wired), 1024M unused."));
        assert!(!is_ram_row(""));
    }

    proptest! {
        #[test]
        fn cpu_parse_never_negative(line in "\\PC*") {
            let parsed = parse_cpu_line(&line);
            prop_assert!(parsed.usage >= 0.0);
        }

        #[test]
        fn ram_parse_never_negative(line in "\\PC*") {
            let parsed = parse_ram_line(&line);
            prop_assert!(parsed.usage >= 0.0);
        }

        #[test]
        fn cpu_parse_recovers_fields(pid in 1u32..100_000, tenths in 0u32..10_000, command in "[A-Za-z][A-Za-z ]{0,20}[A-Za-z]") {
            let line = format!("{pid:>6} {}.{} {command}", tenths / 10, tenths % 10);
            let parsed = parse_cpu_line(&line);
            prop_assert_eq!(parsed.pid, pid);
            prop_assert_eq!(parsed.command, command);
            prop_assert!((parsed.usage - f64::from(tenths) / 10.0).abs() < 1e-9);
        }
    }
}
