use clap::{Args, Subcommand};

use prep_core::views::ingredient_progress;
use prep_core::Session;

use super::{bag_label, find_dish, format_weight, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct ViewCommand {
    #[command(subcommand)]
    pub command: ViewSubcommand,
}

#[derive(Subcommand)]
pub enum ViewSubcommand {
    /// Total weight still to gather per ingredient, across unfinished dishes
    Remaining {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Bags of a dish grouped by what has gone into them
    Groups {
        /// Name of the dish
        dish: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Per-ingredient progress, marking ingredients that are in every bag
    Exhausted {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ViewCommand {
    pub fn run(&self, session: &Session, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ViewSubcommand::Remaining { format } => {
                let remaining = session.remaining_weights(config.similarity_threshold.value);

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&remaining)?);
                    }
                    OutputFormat::Text => {
                        if remaining.is_empty() {
                            println!("Nothing left to gather");
                            return Ok(());
                        }
                        for ingredient in &remaining {
                            println!(
                                "  {:<30}  {} {}",
                                ingredient.name,
                                format_weight(ingredient.weight),
                                ingredient.unit
                            );
                        }
                    }
                }
                Ok(())
            }

            ViewSubcommand::Groups { dish, format } => {
                let dish = find_dish(session, dish)?;
                let groups = session.group_bags(dish.id)?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&groups)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", dish.name);
                        println!("{}", "=".repeat(dish.name.len()));
                        for group in &groups {
                            let labels: Vec<String> = group
                                .bag_ids
                                .iter()
                                .map(|id| bag_label(session, *id))
                                .collect();
                            println!("{}:", group.label);
                            println!("  {}", labels.join(", "));
                        }
                    }
                }
                Ok(())
            }

            ViewSubcommand::Exhausted { format } => {
                let progress = ingredient_progress(session.dishes());

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&progress)?);
                    }
                    OutputFormat::Text => {
                        if progress.is_empty() {
                            println!("No ingredients to track");
                            return Ok(());
                        }
                        println!("{:<30}  {:>9}  DONE", "INGREDIENT", "BAGS");
                        println!("{}", "-".repeat(48));
                        for entry in &progress {
                            println!(
                                "{:<30}  {:>9}  {}",
                                entry.name,
                                format!("{}/{}", entry.confirmed_bags, entry.required_bags),
                                if entry.is_exhausted() { "yes" } else { "" }
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
