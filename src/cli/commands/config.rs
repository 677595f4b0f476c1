use anyhow::Result;
use clap::{Args, Subcommand};

use crate::cli::Output;
use crate::config::ZipmergeConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Display current merged configuration as TOML
    Show,
}

pub fn execute(args: ConfigArgs, custom_config: Option<&str>, output: &Output) -> Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = ZipmergeConfig::load_with_custom_config(custom_config)?;
            output.raw(&config.to_toml()?);
        }
    }
    Ok(())
}
