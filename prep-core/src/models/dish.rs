use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::ingredient::Ingredient;
use super::prep_bag::PrepBag;
use super::recipe::Recipe;

/// What a caller supplies to create a dish.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DishSpec {
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
}

impl DishSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ingredients: Vec::new(),
            colour: None,
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<Ingredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_colour(mut self, colour: impl Into<String>) -> Self {
        self.colour = Some(colour.into());
        self
    }
}

impl From<&Recipe> for DishSpec {
    fn from(recipe: &Recipe) -> Self {
        Self::new(recipe.name.clone()).with_ingredients(recipe.ingredients.clone())
    }
}

/// A recipe scaled to a prep quantity, tracked as independent prep bags.
///
/// `prep_bags.len() == quantity` holds after every store operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dish {
    pub id: Uuid,
    pub name: String,
    pub ingredients: Vec<Ingredient>,
    pub quantity: u32,
    pub prep_bags: Vec<PrepBag>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colour: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Dish {
    pub fn new(id: Uuid, spec: DishSpec) -> Self {
        Self {
            id,
            name: spec.name,
            ingredients: spec.ingredients,
            quantity: 0,
            prep_bags: Vec::new(),
            colour: spec.colour,
            created_at: Utc::now(),
        }
    }

    pub fn remaining_bags(&self) -> usize {
        self.prep_bags.iter().filter(|b| !b.is_complete()).count()
    }

    pub fn completed_bags(&self) -> usize {
        self.prep_bags.len() - self.remaining_bags()
    }

    pub fn requires(&self, name: &str) -> bool {
        self.ingredients.iter().any(|i| i.name == name)
    }

    pub fn bag_position(&self, bag_id: Uuid) -> Option<usize> {
        self.prep_bags.iter().position(|b| b.id == bag_id)
    }
}

impl fmt::Display for Dish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;
        writeln!(
            f,
            "Bags: {} ({} complete)",
            self.quantity,
            self.completed_bags()
        )?;

        if let Some(colour) = &self.colour {
            writeln!(f, "Colour: {}", colour)?;
        }

        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients (per bag):")?;
            for ingredient in &self.ingredients {
                writeln!(f, "  - {}", ingredient)?;
            }
        }

        Ok(())
    }
}
