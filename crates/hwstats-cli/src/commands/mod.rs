pub mod list;
pub mod read;
pub mod watch;

use std::path::Path;

use hwstats_core::{NetworkMode, ReaderFactory, ReaderKind, StatsConfig};

/// Global flags shared by every subcommand.
pub struct FactoryOptions<'a> {
    pub config_path: Option<&'a Path>,
    pub network_mode: Option<&'a str>,
    pub limit: Option<usize>,
}

/// Load the config file (if any) and apply flag overrides.
pub fn load_config(options: &FactoryOptions<'_>) -> StatsConfig {
    let mut config = match options.config_path {
        Some(path) => match StatsConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => StatsConfig::default(),
    };

    if let Some(mode) = options.network_mode {
        config.network_mode = parse_network_mode(mode);
    }
    if options.limit.is_some() {
        config.process_limit = options.limit;
    }
    config
}

/// Build a factory over the platform services.
pub fn make_factory(options: &FactoryOptions<'_>) -> ReaderFactory {
    ReaderFactory::system(load_config(options))
}

/// Parse a network mode string into the enum.
pub fn parse_network_mode(s: &str) -> NetworkMode {
    match s {
        "interface" | "if" => NetworkMode::Interface,
        "process" | "nettop" => NetworkMode::Process,
        _ => {
            eprintln!("Unknown network mode '{s}', using interface");
            NetworkMode::Interface
        }
    }
}

/// Parse reader kind arguments. Empty input means every available kind.
/// Both `cpu ram` and `cpu,ram` are accepted.
pub fn parse_kinds(args: &[String], available: &[ReaderKind]) -> Result<Vec<ReaderKind>, String> {
    let mut kinds = Vec::new();
    for name in args.iter().flat_map(|a| a.split(',')).filter(|s| !s.trim().is_empty()) {
        let kind: ReaderKind = name.parse().map_err(|e| format!("{e}"))?;
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    if kinds.is_empty() {
        kinds = available.to_vec();
    }
    Ok(kinds)
}
