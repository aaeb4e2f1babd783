use anyhow::Result;
use clap::{Parser, Subcommand};
use spotter::commands::{config, run, session};
use spotter::logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "spotter")]
#[command(about = "Safety spotter for a motorised squat rack", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the configuration file (defaults apply if it does not exist)
    #[arg(short, long, global = true, default_value = "spotter.toml")]
    config: PathBuf,

    /// Increase diagnostic output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch the rack and spot every set until stopped
    Run,

    /// Print the effective configuration as TOML
    Config,

    /// Run a single set immediately, without waiting for the bar to leave the rack
    Session,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    match cli.command {
        Commands::Run => run::execute(&cli.config),
        Commands::Config => config::execute(&cli.config),
        Commands::Session => session::execute(&cli.config),
    }
}
