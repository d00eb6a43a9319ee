//! CLI for hwstats: one-shot hardware telemetry snapshots.

mod commands;
mod format;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "hwstats")]
#[command(about = "hwstats: point-in-time hardware telemetry")]
#[command(version = hwstats_core::VERSION)]
struct Cli {
    /// JSON config file (fields missing from the file keep their defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Network counter source: interface (link counters) or process (nettop)
    #[arg(long, global = true, value_parser = ["interface", "process"])]
    network_mode: Option<String>,

    /// Keep only the N busiest processes in the CPU list
    #[arg(long, global = true)]
    limit: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every reader and whether it can run on this machine
    List,

    /// Take one snapshot from each requested reader
    Read {
        /// Reader kinds (cpu, gpu, ram, battery, fans, network, sensors); default: all available
        kinds: Vec<String>,

        /// Print snapshots as JSON, one object per line
        #[arg(long)]
        json: bool,
    },

    /// Poll one reader repeatedly
    Watch {
        /// Reader kind
        kind: String,

        /// Seconds between reads
        #[arg(long, default_value = "1.0")]
        interval: f64,

        /// Stop after N reads (default: run until interrupted)
        #[arg(long)]
        count: Option<usize>,

        /// Print snapshots as JSON, one object per line
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let options = commands::FactoryOptions {
        config_path: cli.config.as_deref(),
        network_mode: cli.network_mode.as_deref(),
        limit: cli.limit,
    };

    match cli.command {
        Commands::List => commands::list::run(&options),
        Commands::Read { kinds, json } => commands::read::run(&options, &kinds, json),
        Commands::Watch {
            kind,
            interval,
            count,
            json,
        } => commands::watch::run(&options, &kind, interval, count, json),
    }
}
