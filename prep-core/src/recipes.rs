//! Where recipes come from.
//!
//! The core only consumes already-fetched recipes; fetching lives with the
//! caller behind [`RecipeSource`].

use thiserror::Error;

use crate::models::Recipe;

#[derive(Error, Debug)]
pub enum RecipeError {
    #[error("No recipe source configured")]
    NotConfigured,

    #[error("Recipe not found: {0}")]
    NotFound(String),

    #[error("Failed to read recipes from {location}: {message}")]
    Unavailable { location: String, message: String },

    #[error("Invalid recipe data from {location}: {message}")]
    InvalidData { location: String, message: String },
}

pub trait RecipeSource {
    fn recipes(&self) -> Result<Vec<Recipe>, RecipeError>;

    /// Finds a recipe by name, ignoring case.
    fn find(&self, name: &str) -> Result<Recipe, RecipeError> {
        let wanted = name.to_lowercase();
        self.recipes()?
            .into_iter()
            .find(|r| r.name.to_lowercase() == wanted)
            .ok_or_else(|| RecipeError::NotFound(name.to_string()))
    }
}

impl RecipeSource for Vec<Recipe> {
    fn recipes(&self) -> Result<Vec<Recipe>, RecipeError> {
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Ingredient;

    fn catalogue() -> Vec<Recipe> {
        vec![
            Recipe::new("1", "Tomato Soup")
                .with_ingredients(vec![Ingredient::new("Tomato", 120.0, "g")]),
            Recipe::new("2", "Toast"),
        ]
    }

    #[test]
    fn test_find_ignores_case() {
        let recipe = catalogue().find("tomato soup").unwrap();
        assert_eq!(recipe.id, "1");
    }

    #[test]
    fn test_find_missing() {
        let err = catalogue().find("Stew").unwrap_err();
        assert!(matches!(err, RecipeError::NotFound(name) if name == "Stew"));
    }
}
