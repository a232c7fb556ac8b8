use clap::{Args, Subcommand};
use uuid::Uuid;

use prep_core::{ConfirmOutcome, Ingredient, PrepBag, Session, StoreError, StoreResult};

use super::{bag_label, resolve_bag, OutputFormat};

#[derive(Args)]
pub struct BagCommand {
    #[command(subcommand)]
    pub command: BagSubcommand,
}

#[derive(Subcommand)]
pub enum BagSubcommand {
    /// Show a prep bag and what has gone into it
    Show {
        /// Bag ID (UUID) or DISH#N
        bag: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Replace the confirmed ingredients of a bag
    Set {
        /// Bag ID (UUID) or DISH#N
        bag: String,

        /// Ingredient name from the dish's recipe (can be repeated; none empties the bag)
        #[arg(long = "ingredient", short, value_name = "NAME")]
        ingredients: Vec<String>,
    },

    /// Stage additions and removals across bags, then confirm each bag
    Toggle {
        /// Bag IDs (UUID) or DISH#N
        #[arg(required = true)]
        bags: Vec<String>,

        /// Ingredient to put in (can be repeated)
        #[arg(long = "add", value_name = "NAME")]
        add: Vec<String>,

        /// Ingredient to take out (can be repeated)
        #[arg(long = "remove", value_name = "NAME")]
        remove: Vec<String>,

        /// Show the resulting counts without confirming
        #[arg(long)]
        dry_run: bool,
    },
}

impl BagSubcommand {
    pub fn is_write(&self) -> bool {
        match self {
            BagSubcommand::Show { .. } => false,
            BagSubcommand::Set { .. } => true,
            BagSubcommand::Toggle { dry_run, .. } => !dry_run,
        }
    }
}

impl BagCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            BagSubcommand::Show { bag, format } => {
                let bag_id = resolve_bag(session, bag)?;
                let bag = session
                    .store()
                    .bag(bag_id)
                    .ok_or_else(|| format!("Prep bag not found: {}", bag_id))?;

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(bag)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", bag_label(session, bag_id));
                        print!("{}", bag);
                        println!(
                            "\n{}/{} ingredient(s) in",
                            bag.required_names().len() - bag.missing_count(),
                            bag.required_names().len()
                        );
                    }
                }
                Ok(())
            }

            BagSubcommand::Set { bag, ingredients } => {
                let bag_id = resolve_bag(session, bag)?;
                let bag = session
                    .store()
                    .bag(bag_id)
                    .ok_or_else(|| format!("Prep bag not found: {}", bag_id))?;
                let added = resolve_names(bag, ingredients)?;

                session.update_prep_bag(bag_id, added)?;
                println!(
                    "Set {} ingredient(s) on {}",
                    ingredients.len(),
                    bag_label(session, bag_id)
                );
                Ok(())
            }

            BagSubcommand::Toggle {
                bags,
                add,
                remove,
                dry_run,
            } => {
                if add.is_empty() && remove.is_empty() {
                    return Err("Nothing to toggle. Use --add or --remove.".into());
                }

                let bag_ids = bags
                    .iter()
                    .map(|b| resolve_bag(session, b))
                    .collect::<Result<Vec<Uuid>, String>>()?;

                for bag_id in &bag_ids {
                    for name in add {
                        session.stage(*bag_id, name, true)?;
                    }
                    for name in remove {
                        session.stage(*bag_id, name, false)?;
                    }
                }

                println!("{:<24}  {:>6}  {:>7}", "BAG", "IN", "MISSING");
                println!("{}", "-".repeat(41));
                for bag_id in &bag_ids {
                    println!(
                        "{:<24}  {:>6}  {:>7}",
                        bag_label(session, *bag_id),
                        session.effective_count(*bag_id, false)?,
                        session.effective_count(*bag_id, true)?
                    );
                }

                if *dry_run {
                    println!("\nDry run: nothing confirmed");
                    return Ok(());
                }

                let (confirmed, failed) = split_outcomes(session.confirm_all());
                for outcome in &confirmed {
                    for name in &outcome.unresolved {
                        eprintln!(
                            "Warning: '{}' is not in the recipe for {}",
                            name,
                            bag_label(session, outcome.bag_id)
                        );
                    }
                }
                for e in &failed {
                    eprintln!("Failed to confirm bag: {}", e);
                }
                println!("\nConfirmed {} bag(s)", confirmed.len());

                if failed.is_empty() {
                    Ok(())
                } else {
                    Err(format!("{} bag(s) could not be confirmed", failed.len()).into())
                }
            }
        }
    }
}

/// Separates committed bags from failed ones; a failure never hides the
/// bags committed before or after it.
fn split_outcomes(
    outcomes: Vec<StoreResult<ConfirmOutcome>>,
) -> (Vec<ConfirmOutcome>, Vec<StoreError>) {
    let mut confirmed = Vec::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        match outcome {
            Ok(outcome) => confirmed.push(outcome),
            Err(e) => failed.push(e),
        }
    }
    (confirmed, failed)
}

/// Looks up each name in the bag's recipe, in the order given.
fn resolve_names(bag: &PrepBag, names: &[String]) -> Result<Vec<Ingredient>, String> {
    let mut resolved: Vec<Ingredient> = Vec::new();
    for name in names {
        let ingredient = bag
            .ingredients
            .iter()
            .find(|i| i.name == *name)
            .ok_or_else(|| format!("'{}' is not an ingredient of {}", name, bag.dish_name))?;
        if !resolved.iter().any(|i| i.name == ingredient.name) {
            resolved.push(ingredient.clone());
        }
    }
    Ok(resolved)
}
