use clap::{Args, Subcommand};

use super::OutputFormat;
use crate::config::Config;
use crate::recipes::source_from_config;

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// List recipes from the configured source
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show one recipe
    Show {
        /// Recipe name (case-insensitive)
        name: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl RecipeCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let source = source_from_config(config)?;

        match &self.command {
            RecipeSubcommand::List { format } => {
                let recipes = source.recipes()?;
                if recipes.is_empty() {
                    println!("No recipes found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipes)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<30}  {:>8}  {:>11}", "NAME", "PORTIONS", "INGREDIENTS");
                        println!("{}", "-".repeat(53));
                        for recipe in &recipes {
                            println!(
                                "{:<30}  {:>8}  {:>11}",
                                recipe.name,
                                recipe.original_portion,
                                recipe.ingredients.len()
                            );
                        }
                        println!("\nTotal: {} recipe(s)", recipes.len());
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Show { name, format } => {
                let recipe = source.find(name)?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipe)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", recipe);
                    }
                }
                Ok(())
            }
        }
    }
}
