//! LocTrack CLI
//!
//! Command-line interface for LocTrack

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use loctrack_core::logging_facility::{init, Profile};
use loctrack_core::TrackerConfig;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "loctrack")]
#[command(about = "LocTrack - Location sample ingestion and queries", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON logs instead of human-readable ones
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run the ingestion service against a recorded track
    Track(commands::track::TrackArgs),
    /// Print all samples, newest first, as JSON
    List(commands::list::ListArgs),
    /// Print the most recent sample as JSON
    Latest(commands::latest::LatestArgs),
    /// Create or upgrade the database schema
    Migrate(commands::migrate::MigrateArgs),
}

fn main() {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match TrackerConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let profile = if cli.json_logs {
        Profile::Production
    } else {
        config.log_profile
    };
    init(profile);

    let result = match cli.command {
        Commands::Track(args) => commands::track::execute(args, &config),
        Commands::List(args) => commands::list::execute(args, &config),
        Commands::Latest(args) => commands::latest::execute(args, &config),
        Commands::Migrate(args) => commands::migrate::execute(args, &config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
