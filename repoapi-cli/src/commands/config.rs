//! Inspect resolved settings

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use repoapi_core::Settings;

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the settings after file and environment overrides
    Show {
        /// Config file (default: ~/.repoapi/config.toml)
        #[arg(long, short = 'c', env = "REPOAPI_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Print the default config file location
    Path,
}

pub fn run_config(args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommand::Show { config } => {
            let settings = Settings::load(config.as_deref()).context("Failed to load settings")?;
            let rendered = toml::to_string_pretty(&settings).context("Failed to render settings")?;
            print!("{}", rendered);
        }
        ConfigCommand::Path => {
            println!("{}", Settings::config_path().display());
        }
    }
    Ok(())
}
