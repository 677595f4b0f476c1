use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::num::NonZeroUsize;

use crate::cli::Output;
use crate::config::ZipmergeConfig;

pub mod compare;
pub mod config;
pub mod generate;
pub mod run;

#[derive(Parser)]
#[command(
    name = "zipmerge",
    version = env!("CARGO_PKG_VERSION"),
    about = "Merge XML records from zip archives into two CSV tables",
    long_about = "zipmerge reads every XML record from a directory of zip archives, \
                  merges them with a selectable concurrency strategy and writes an \
                  id/level table and an id/object table."
)]
pub struct Cli {
    /// Increase verbosity (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Use custom configuration file
    #[arg(long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge all archives in a directory into the two tables
    Run(run::RunArgs),
    /// Run every strategy on the same input and compare timings
    Compare(compare::CompareArgs),
    /// Write a synthetic archive set
    Generate(generate::GenerateArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        setup_logging(self.verbose, self.quiet);
        let output = Output::new(self.verbose > 0, self.quiet);
        let custom_config = self.config.as_deref();

        match self.command {
            Some(Commands::Run(args)) => run::execute(args, custom_config, &output),
            Some(Commands::Compare(args)) => compare::execute(args, custom_config, &output),
            Some(Commands::Generate(args)) => generate::execute(args, &output),
            Some(Commands::Config(args)) => config::execute(args, custom_config, &output),
            None => {
                Cli::command().print_help()?;
                Ok(())
            }
        }
    }
}

/// Layered configuration with the flags shared by `run` and `compare` on top
pub(crate) fn load_config(custom_config: Option<&str>, flags: &PipelineFlags) -> Result<ZipmergeConfig> {
    Ok(ZipmergeConfig::load_with_custom_config(custom_config)?
        .with_override("input.directory", flags.dir.clone())
        .with_override("input.extension", flags.extension.clone())
        .with_override("pipeline.workers", flags.workers.map(NonZeroUsize::get))
        .with_override("pipeline.chunk_size", flags.chunk_size.map(NonZeroUsize::get))
        .with_override("progress.enabled", flags.no_progress.then_some(false)))
}

/// Input and sizing flags shared by `run` and `compare`
#[derive(clap::Args, Debug, Default, Clone)]
pub struct PipelineFlags {
    /// Directory containing the archives
    #[arg(short, long)]
    pub dir: Option<String>,

    /// Archive file extension
    #[arg(long)]
    pub extension: Option<String>,

    /// Number of workers (default: derived from CPU cores)
    #[arg(short, long)]
    pub workers: Option<NonZeroUsize>,

    /// Archives per chunk (default: derived from the worker count)
    #[arg(long)]
    pub chunk_size: Option<NonZeroUsize>,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
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

    // Logs share stderr with the progress bar; stdout carries the report
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
