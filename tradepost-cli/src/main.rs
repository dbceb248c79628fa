//! Tradepost CLI - command-line interface
//!
//! This binary runs proximity searches and geodesy queries against a
//! JSON catalog, exercising the tradepost library the way an embedding
//! UI would.

use clap::{Parser, Subcommand};

use tradepost::logging::{self, LogConfig};

mod commands;
mod error;

use error::CliError;

#[derive(Parser)]
#[command(name = "tradepost")]
#[command(version = tradepost::VERSION)]
#[command(about = "Proximity search for a peer-to-peer trading marketplace", long_about = None)]
struct Cli {
    /// Mirror engine logs to stdout
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filter and rank a catalog around an origin
    Search(commands::search::SearchArgs),
    /// Suggest an approximate meetup point between two coordinates
    Midpoint(commands::midpoint::MidpointArgs),
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig {
        stdout: cli.verbose,
        ..LogConfig::default()
    };
    let _logging_guard = match logging::init(&log_config) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e).exit(),
    };

    let result = match cli.command {
        Commands::Search(args) => commands::search::run(&args),
        Commands::Midpoint(args) => commands::midpoint::run(&args),
    };

    if let Err(e) = result {
        e.exit();
    }
}
