use anyhow::Result;
use clap::{Args, Subcommand, ValueEnum};
use std::path::Path;

use crate::config::ConfigLoader;

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
        format: ShowFormat,
    },
    /// Check that the merged configuration is usable
    Validate,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShowFormat {
    Toml,
    Json,
    Yaml,
}

pub fn execute(args: ConfigArgs, custom_config: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load_with(custom_config, None::<()>)?.extract()?;

    match args.command {
        ConfigCommand::Show { format } => {
            let rendered = match format {
                ShowFormat::Toml => toml::to_string_pretty(&config)?,
                ShowFormat::Json => serde_json::to_string_pretty(&config)?,
                ShowFormat::Yaml => serde_yml::to_string(&config)?,
            };
            println!("{}", rendered.trim_end());
        }
        ConfigCommand::Validate => {
            println!(
                "Configuration OK: {} keyword(s), {} text column(s)",
                config.filter.keywords.len(),
                config.filter.text_columns.len()
            );
        }
    }
    Ok(())
}
