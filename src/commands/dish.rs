use clap::{Args, Subcommand};
use serde_json::json;

use prep_core::{Dish, DishSpec, Ingredient, Session};

use super::{find_dish, format_weight, parse_ingredient, OutputFormat};
use crate::config::Config;
use crate::recipes::source_from_config;

#[derive(Args)]
pub struct DishCommand {
    #[command(subcommand)]
    pub command: DishSubcommand,
}

#[derive(Subcommand)]
pub enum DishSubcommand {
    /// Add a dish and generate its prep bags
    Add {
        /// Name of the dish (ignored with --recipe)
        #[arg(required_unless_present = "recipe")]
        name: Option<String>,

        /// Ingredient per bag as NAME:WEIGHT[:UNIT] (can be repeated)
        #[arg(long = "ingredient", short, value_name = "INGREDIENT", value_parser = parse_ingredient)]
        ingredients: Vec<Ingredient>,

        /// Take name and ingredients from the recipe source
        #[arg(long, conflicts_with = "ingredients")]
        recipe: Option<String>,

        /// Number of prep bags
        #[arg(long)]
        qty: u32,

        /// Display colour
        #[arg(long)]
        colour: Option<String>,
    },

    /// Remove the most recently added dish
    Undo,

    /// Remove every dish
    Clear,

    /// Remove every dish with this name
    Remove {
        /// Name of the dish
        name: String,
    },

    /// Change a dish's bag count and ingredients, keeping existing bags
    Update {
        /// Name of the dish
        name: String,

        /// New number of prep bags
        #[arg(long)]
        qty: u32,

        /// Replacement ingredient list as NAME:WEIGHT[:UNIT] (can be repeated)
        #[arg(long = "ingredient", short, value_name = "INGREDIENT", value_parser = parse_ingredient)]
        ingredients: Vec<Ingredient>,
    },

    /// List all dishes
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a dish with its bag grid and groups
    Show {
        /// Name of the dish
        name: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Move a dish to another position in the list
    Move {
        /// Name of the dish
        name: String,

        /// New position (1-based)
        #[arg(long)]
        to: usize,
    },
}

impl DishSubcommand {
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            DishSubcommand::List { .. } | DishSubcommand::Show { .. }
        )
    }
}

impl DishCommand {
    pub fn run(
        &self,
        session: &mut Session,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            DishSubcommand::Add {
                name,
                ingredients,
                recipe,
                qty,
                colour,
            } => {
                let mut spec = match recipe {
                    Some(recipe_name) => {
                        let source = source_from_config(config)?;
                        DishSpec::from(&source.find(recipe_name)?)
                    }
                    None => {
                        let name = name.as_deref().map(str::trim).unwrap_or_default();
                        if name.is_empty() {
                            return Err("Dish name cannot be empty".into());
                        }
                        DishSpec::new(name).with_ingredients(ingredients.clone())
                    }
                };
                if let Some(colour) = colour {
                    spec = spec.with_colour(colour);
                }

                let id = session.add_dish(spec, *qty)?;
                if let Some(dish) = session.store().dish(id) {
                    println!("Added dish:");
                    println!("{}", dish);
                }
                Ok(())
            }

            DishSubcommand::Undo => {
                match session.undo_dish() {
                    Some(dish) => println!("Removed dish: {}", dish.name),
                    None => println!("Nothing to undo"),
                }
                Ok(())
            }

            DishSubcommand::Clear => {
                let count = session.dishes().len();
                session.clear_dishes();
                println!("Cleared {} dish(es)", count);
                Ok(())
            }

            DishSubcommand::Remove { name } => {
                let removed = session.remove_dish(name)?;
                let bags: usize = removed.iter().map(|d| d.prep_bags.len()).sum();
                println!(
                    "Removed {} dish(es) named '{}' ({} bag(s))",
                    removed.len(),
                    name,
                    bags
                );
                Ok(())
            }

            DishSubcommand::Update {
                name,
                qty,
                ingredients,
            } => {
                let ingredients = if ingredients.is_empty() {
                    find_dish(session, name)?.ingredients.clone()
                } else {
                    ingredients.clone()
                };

                let update = session.update_dish(name, *qty, ingredients)?;
                println!(
                    "Updated '{}': {} bag(s) added, {} dropped",
                    name,
                    update.added_bags.len(),
                    update.dropped_bags.len()
                );
                Ok(())
            }

            DishSubcommand::List { format } => {
                let colours = dish_colours(session);
                let dishes = session.dishes();
                if dishes.is_empty() {
                    println!("No dishes found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(dishes)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<4}{:<30}  {:>5}  {:>5}  COLOUR", "#", "NAME", "BAGS", "DONE");
                        println!("{}", "-".repeat(60));
                        for (i, (dish, colour)) in dishes.iter().zip(&colours).enumerate() {
                            println!(
                                "{:<4}{:<30}  {:>5}  {:>5}  {}",
                                i + 1,
                                truncate(&dish.name, 30),
                                dish.prep_bags.len(),
                                dish.completed_bags(),
                                colour
                            );
                        }
                        println!("\nTotal: {} dish(es)", dishes.len());
                    }
                }
                Ok(())
            }

            DishSubcommand::Show { name, format } => {
                let colours = dish_colours(session);
                let dish = find_dish(session, name)?;
                let matrix = session
                    .store()
                    .matrix(dish.id, config.row_height.value)
                    .ok_or_else(|| format!("Dish not found: {}", name))?;
                let groups = session.group_bags(dish.id)?;

                match format {
                    OutputFormat::Json => {
                        let value = json!({
                            "dish": dish,
                            "matrix": matrix,
                            "groups": groups,
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => {
                        print!("{}", dish);
                        if dish.colour.is_none() {
                            let position = session
                                .dishes()
                                .iter()
                                .position(|d| d.id == dish.id);
                            if let Some(colour) = position.and_then(|i| colours.get(i)) {
                                println!("Colour: {} (assigned)", colour);
                            }
                        }

                        println!("\nBags:");
                        for row in matrix.rows() {
                            let cells: Vec<String> = row
                                .iter()
                                .map(|cell| match cell.and_then(|id| bag_cell(dish, id)) {
                                    Some(text) => format!("{:<12}", text),
                                    None => " ".repeat(12),
                                })
                                .collect();
                            println!("  {}", cells.join("").trim_end());
                        }

                        println!("\nGroups:");
                        for group in &groups {
                            println!("  {} ({} bag(s))", group.label, group.bag_ids.len());
                        }

                        let per_bag: f64 = dish.ingredients.iter().map(|i| i.weight).sum();
                        if per_bag > 0.0 {
                            println!(
                                "\nTotal weight across bags: {}",
                                format_weight(per_bag * dish.prep_bags.len() as f64)
                            );
                        }
                    }
                }
                Ok(())
            }

            DishSubcommand::Move { name, to } => {
                let from = session
                    .dishes()
                    .iter()
                    .position(|d| d.name == *name)
                    .ok_or_else(|| format!("Dish not found: {}", name))?;
                let to = to
                    .checked_sub(1)
                    .ok_or("Position must be 1 or greater")?;

                session.move_dish(from, to)?;
                println!("Moved '{}' to position {}", name, to + 1);
                Ok(())
            }
        }
    }
}

/// Colours for every dish in display order, assigned in that order.
fn dish_colours(session: &mut Session) -> Vec<String> {
    let ids: Vec<uuid::Uuid> = session.dishes().iter().map(|d| d.id).collect();
    ids.into_iter()
        .filter_map(|id| session.colour_for(id))
        .collect()
}

/// `#3 [x]` for a complete bag, `#3 [2]` with the number still missing.
fn bag_cell(dish: &Dish, bag_id: uuid::Uuid) -> Option<String> {
    let position = dish.bag_position(bag_id)?;
    let bag = &dish.prep_bags[position];
    let status = if bag.is_complete() {
        "x".to_string()
    } else {
        bag.missing_count().to_string()
    };
    Some(format!("#{} [{}]", position + 1, status))
}

fn truncate(name: &str, width: usize) -> String {
    if name.chars().count() > width {
        let cut: String = name.chars().take(width - 3).collect();
        format!("{}...", cut)
    } else {
        name.to_string()
    }
}
