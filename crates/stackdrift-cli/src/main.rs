mod commands;
mod progress;
mod summary;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "stackdrift", about = "Drift estimation and correction for image stacks")]
#[command(version)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show stack metadata
    Info(commands::info::InfoArgs),
    /// Estimate drift and print or save the drift table
    Estimate(commands::estimate::EstimateArgs),
    /// Estimate drift and write the corrected stack
    Correct(commands::correct::CorrectArgs),
    /// Print the default pipeline config as TOML
    Config(commands::config::ConfigArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Info(args) => commands::info::run(args),
        Commands::Estimate(args) => commands::estimate::run(args),
        Commands::Correct(args) => commands::correct::run(args),
        Commands::Config(args) => commands::config::run(args),
    }
}
