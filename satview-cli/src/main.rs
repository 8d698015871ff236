//! satview CLI - watch satellites reported by gpsd
//!
//! Subcommands:
//! - `watch`: continuous satellites in view / in use until Ctrl+C
//! - `request`: one-shot update with a timeout
//! - `replay`: decode a recorded NMEA log offline

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use error::CliError;
use runner::{CliRunner, GlobalOptions};

#[derive(Parser)]
#[command(name = "satview")]
#[command(about = "Satellite view monitor for gpsd NMEA streams", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.satview/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// gpsd host, overrides config
    #[arg(long, global = true)]
    host: Option<String>,

    /// gpsd port, overrides config
    #[arg(long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print satellites in view and in use as they are reported
    Watch,

    /// Request a single update and exit
    Request {
        /// Timeout in milliseconds (0 = minimum update interval)
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Decode a recorded NMEA log
    Replay {
        /// File with one NMEA sentence per line
        file: PathBuf,

        /// Answer a one-shot request with this timeout instead of streaming
        #[arg(long)]
        request_timeout_ms: Option<u64>,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let options = GlobalOptions {
        config: cli.config,
        host: cli.host,
        port: cli.port,
    };
    let runner = CliRunner::new(&options)?;

    match cli.command {
        Commands::Watch => commands::watch::run(&runner),
        Commands::Request { timeout_ms } => commands::request::run(&runner, timeout_ms),
        Commands::Replay {
            file,
            request_timeout_ms,
        } => commands::replay::run(&runner, &file, request_timeout_ms),
    }
}
