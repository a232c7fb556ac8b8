use clap::{Args, Subcommand};
use std::path::{Path, PathBuf};

use super::OutputFormat;
use crate::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long, short)]
        force: bool,
    },
}

impl ConfigCommand {
    pub fn run(
        &self,
        config: &Config,
        config_path: Option<PathBuf>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!(
                            "recipe_source: {}",
                            config.recipe_source.value.as_deref().unwrap_or("(none)")
                        );
                        println!("  source: {}", config.recipe_source.source);
                        println!();

                        println!("row_height: {}", config.row_height.value);
                        println!("  source: {}", config.row_height.source);
                        println!();

                        println!(
                            "similarity_threshold: {}",
                            config.similarity_threshold.value
                        );
                        println!("  source: {}", config.similarity_threshold.source);
                        println!();

                        println!("palette: {}", config.palette.value.join(", "));
                        println!("  source: {}", config.palette.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init { force } => {
                let path = config_path.unwrap_or_else(Config::default_config_path);
                if path.exists() && !force {
                    return Err(format!(
                        "Config file already exists: {} (use --force to overwrite)",
                        path.display()
                    )
                    .into());
                }

                write_default_config(&path)?;
                println!("Wrote config file: {}", path.display());
                Ok(())
            }
        }
    }
}

fn default_config_contents() -> String {
    format!(
        "# prepbag configuration\n\
         \n\
         # Where the session is saved\n\
         # data_dir: {data_dir}\n\
         \n\
         # Recipe catalogue: a JSON file or an http(s) base URL\n\
         # recipe_source: https://recipes.example.com\n\
         \n\
         # Rows per column in the bag grid\n\
         row_height: {row_height}\n\
         \n\
         # How alike two names must be (0-1) to merge in `view remaining`\n\
         similarity_threshold: {threshold}\n",
        data_dir = Config::default_data_dir().display(),
        row_height = prep_core::DEFAULT_ROW_HEIGHT,
        threshold = prep_core::similarity::DEFAULT_THRESHOLD,
    )
}

fn write_default_config(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, default_config_contents())
}
