//! Wayfinder command line
//!
//! - `replay`: drive the engine from a scenario file against a simulated backend
//! - `config`: show resolved paths and the effective engine config
//! - `distance`: great-circle distance between two coordinates

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use wayfinder_engine::Coordinate;
use wayfinder_logging::{init_logging, LogConfig};

mod cli;

#[derive(Parser, Debug)]
#[command(name = "wayfinder", about = "Routing query orchestration engine", version)]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Engine config file (default: ~/.wayfinder/config.toml)
    #[arg(long, global = true, env = "WAYFINDER_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a scenario (.json or .toml) through the engine
    Replay {
        /// Scenario file
        scenario: PathBuf,

        /// Output the final state as JSON
        #[arg(long)]
        json: bool,

        /// Simulated backend latency for primary requests
        #[arg(long, default_value = "50")]
        latency_ms: u64,

        /// Give up if the replay has not settled after this many seconds
        #[arg(long, default_value = "30")]
        timeout_secs: u64,
    },

    /// Show configuration paths and effective settings
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Great-circle distance between two "lat,lng" coordinates
    Distance {
        #[arg(allow_hyphen_values = true)]
        from: Coordinate,

        #[arg(allow_hyphen_values = true)]
        to: Coordinate,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn command_wants_json(command: &Commands) -> bool {
    match command {
        Commands::Replay { json, .. } => *json,
        Commands::Config { json } => *json,
        Commands::Distance { json, .. } => *json,
    }
}

fn run_command(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Replay {
            scenario,
            json,
            latency_ms,
            timeout_secs,
        } => cli::replay::run(cli::replay::ReplayArgs {
            scenario,
            json,
            latency_ms,
            timeout_secs,
            config_path: cli.config,
        }),
        Commands::Config { json } => cli::config::run(cli::config::ConfigArgs {
            json,
            config_path: cli.config,
        }),
        Commands::Distance { from, to, json } => cli::distance::run(from, to, json),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let json_mode = command_wants_json(&cli.command);

    let _log_guard = match init_logging(LogConfig {
        app_name: "wayfinder",
        verbose: cli.verbose,
    }) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: failed to initialize logging: {:#}", err);
            None
        }
    };

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if json_mode {
                let payload = serde_json::json!({ "error": format!("{:#}", err) });
                println!("{}", payload);
            } else {
                eprintln!("Error: {:?}", err);
            }
            ExitCode::from(1)
        }
    }
}
