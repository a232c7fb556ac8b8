use serde::{Deserialize, Serialize};
use std::fmt;

/// Unit recorded when a confirmed name cannot be found in the recipe.
pub const UNRESOLVED_UNIT: &str = "unitless";

/// A recipe line for one portion. Identity is the exact `name` string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    pub name: String,
    pub weight: f64,
    #[serde(default)]
    pub unit: String,
}

impl Ingredient {
    pub fn new(name: impl Into<String>, weight: f64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            weight,
            unit: unit.into(),
        }
    }

    /// Placeholder record for a name that has no recipe entry.
    pub fn unresolved(name: impl Into<String>) -> Self {
        Self::new(name, 0.0, UNRESOLVED_UNIT)
    }

    /// Same ingredient scaled to `count` portions.
    pub fn scaled(&self, count: usize) -> Self {
        Self::new(self.name.clone(), self.weight * count as f64, self.unit.clone())
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.unit.is_empty() {
            write!(f, "{} {}", self.weight, self.name)
        } else {
            write!(f, "{} {} {}", self.weight, self.unit, self.name)
        }
    }
}

/// Looks up an ingredient by exact name.
pub fn find_ingredient<'a>(ingredients: &'a [Ingredient], name: &str) -> Option<&'a Ingredient> {
    ingredients.iter().find(|i| i.name == name)
}
