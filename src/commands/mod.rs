mod bag;
mod config_cmd;
mod dish;
mod recipe;
mod tick;
mod view;

pub use bag::BagCommand;
pub use config_cmd::ConfigCommand;
pub use dish::DishCommand;
pub use recipe::RecipeCommand;
pub use tick::TickCommand;
pub use view::ViewCommand;

use clap::ValueEnum;
use uuid::Uuid;

use prep_core::{Dish, Ingredient, Session};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses `NAME:WEIGHT[:UNIT]`, e.g. `Salt:5:g` or `Eggs:2`.
pub fn parse_ingredient(s: &str) -> Result<Ingredient, String> {
    let mut parts = s.splitn(3, ':');
    let name = parts.next().unwrap_or_default().trim();
    let weight = parts.next().map(str::trim);
    let unit = parts.next().map(str::trim).unwrap_or_default();

    if name.is_empty() {
        return Err(format!("Missing ingredient name in '{}'", s));
    }
    let weight = weight
        .ok_or_else(|| format!("Missing weight in '{}'. Use NAME:WEIGHT[:UNIT]", s))?
        .parse::<f64>()
        .map_err(|_| format!("Invalid weight in '{}'", s))?;
    if weight < 0.0 || !weight.is_finite() {
        return Err(format!("Weight must be a non-negative number in '{}'", s));
    }

    Ok(Ingredient::new(name, weight, unit))
}

/// Resolves a bag reference: a full UUID or `<dish name>#<n>` (1-based,
/// first dish with that name).
pub fn resolve_bag(session: &Session, reference: &str) -> Result<Uuid, String> {
    if let Ok(id) = Uuid::parse_str(reference) {
        return session
            .store()
            .bag(id)
            .map(|b| b.id)
            .ok_or_else(|| format!("Prep bag not found: {}", reference));
    }

    let (dish_name, index) = reference
        .rsplit_once('#')
        .ok_or_else(|| format!("Invalid bag '{}'. Use a bag id or DISH#N", reference))?;
    let index: usize = index
        .parse()
        .map_err(|_| format!("Invalid bag number in '{}'", reference))?;

    let dish = find_dish(session, dish_name)?;
    index
        .checked_sub(1)
        .and_then(|i| dish.prep_bags.get(i))
        .map(|b| b.id)
        .ok_or_else(|| {
            format!(
                "'{}' has {} bag(s); there is no bag #{}",
                dish.name,
                dish.prep_bags.len(),
                index
            )
        })
}

/// First dish with the given name.
pub fn find_dish<'a>(session: &'a Session, name: &'a str) -> Result<&'a Dish, String> {
    session
        .store()
        .dishes_named(name)
        .next()
        .ok_or_else(|| format!("Dish not found: {}", name))
}

/// Short label for a bag, `Soup#2`.
pub fn bag_label(session: &Session, bag_id: Uuid) -> String {
    session
        .store()
        .dish_of_bag(bag_id)
        .and_then(|dish| {
            dish.bag_position(bag_id)
                .map(|pos| format!("{}#{}", dish.name, pos + 1))
        })
        .unwrap_or_else(|| bag_id.to_string())
}

/// Format a weight, removing unnecessary decimal places.
pub fn format_weight(weight: f64) -> String {
    if weight.fract() == 0.0 {
        format!("{}", weight as i64)
    } else {
        format!("{:.1}", weight)
    }
}
