//! Command-line interface for jobpool
//!
//! A small driver around the library: run a synthetic workload through a
//! configured pool, show the resolved configuration, or print the version.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;
mod output;

pub use output::Output;

#[derive(Parser)]
#[command(
    name = "jobpool",
    version = env!("CARGO_PKG_VERSION"),
    about = "Fixed-size worker thread pool with scoped completion tracking",
    long_about = "jobpool runs synthetic workloads through a fixed-size worker pool, \
                  tracking completion per executor and through a standalone job counter."
)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file (TOML, or JSON by extension)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a synthetic workload through a worker pool
    Run(commands::run::RunArgs),
    /// Show the resolved pool configuration
    Config(commands::config::ConfigArgs),
    /// Show version information
    Version,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);

        match self.command {
            Commands::Run(args) => commands::run::execute(args, self.config.as_deref(), &output),
            Commands::Config(args) => {
                commands::config::execute(args, self.config.as_deref(), &output)
            }
            Commands::Version => commands::version::execute(&output),
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        match verbose {
            0 => tracing_subscriber::EnvFilter::new("warn"),
            1 => tracing_subscriber::EnvFilter::new("info"),
            2 => tracing_subscriber::EnvFilter::new("debug"),
            _ => tracing_subscriber::EnvFilter::new("trace"),
        }
    });

    // Logs go to stderr so that --json output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
