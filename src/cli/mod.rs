//! Command-line interface for zipmerge
//!
//! Argument parsing uses clap derive; each subcommand lives in its own module
//! under [`commands`].

pub mod commands;
pub mod output;

pub use commands::Cli;
pub use output::Output;
