use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use super::ingredient::Ingredient;

/// One portion's worth of ingredients to gather for a dish.
///
/// `ingredients` is what the portion needs, `added_ingredients` what has
/// been confirmed so far. Completion is derived from the two name sets and
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PrepBag {
    pub id: Uuid,
    pub dish_name: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(default)]
    pub added_ingredients: Vec<Ingredient>,
}

impl PrepBag {
    pub fn new(id: Uuid, dish_name: impl Into<String>, ingredients: Vec<Ingredient>) -> Self {
        Self {
            id,
            dish_name: dish_name.into(),
            ingredients,
            added_ingredients: Vec::new(),
        }
    }

    /// Names the bag needs.
    pub fn required_names(&self) -> BTreeSet<&str> {
        self.ingredients.iter().map(|i| i.name.as_str()).collect()
    }

    /// Names confirmed in the bag.
    pub fn confirmed_names(&self) -> BTreeSet<&str> {
        self.added_ingredients.iter().map(|i| i.name.as_str()).collect()
    }

    pub fn requires(&self, name: &str) -> bool {
        self.ingredients.iter().any(|i| i.name == name)
    }

    pub fn has_confirmed(&self, name: &str) -> bool {
        self.added_ingredients.iter().any(|i| i.name == name)
    }

    /// True when the confirmed name set equals the required name set.
    pub fn is_complete(&self) -> bool {
        self.confirmed_names() == self.required_names()
    }

    /// Number of required ingredients not yet confirmed.
    pub fn missing_count(&self) -> usize {
        let confirmed = self.confirmed_names();
        self.required_names()
            .iter()
            .filter(|name| !confirmed.contains(*name))
            .count()
    }
}

impl fmt::Display for PrepBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.is_complete() { "[x]" } else { "[ ]" };
        writeln!(f, "{} {} ({})", status, self.dish_name, self.id)?;
        for ingredient in &self.ingredients {
            let mark = if self.has_confirmed(&ingredient.name) {
                "x"
            } else {
                " "
            };
            writeln!(f, "  [{}] {}", mark, ingredient)?;
        }
        Ok(())
    }
}
