use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};

use crate::config::ParallelConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Display current merged configuration
    Show {
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ConfigFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
}

pub fn execute(args: ConfigArgs, config: &ParallelConfig) -> Result<()> {
    match args.command {
        ConfigCommand::Show { format } => {
            let rendered = match format {
                ConfigFormat::Toml => {
                    toml::to_string_pretty(config).context("Failed to render configuration as TOML")?
                }
                ConfigFormat::Json => serde_json::to_string_pretty(config)
                    .context("Failed to render configuration as JSON")?,
            };
            println!("{}", rendered.trim_end());
        }
    }
    Ok(())
}
