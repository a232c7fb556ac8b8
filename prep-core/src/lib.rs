//! Prepbag Core Library
//!
//! Dishes, their per-portion prep bags, and the staged workflow for
//! ticking ingredients off across many bags at once.

pub mod colour;
pub mod error;
pub mod generator;
pub mod ids;
pub mod models;
pub mod reconcile;
pub mod recipes;
pub mod session;
pub mod similarity;
pub mod store;
pub mod views;

pub use colour::ColorAssigner;
pub use error::{StoreError, StoreResult};
pub use generator::{build_matrix, generate_bags, BagMatrix, DEFAULT_ROW_HEIGHT};
pub use ids::{IdGenerator, RandomIds, SequentialIds};
pub use models::{Dish, DishSpec, Ingredient, PrepBag, Recipe};
pub use reconcile::{compute_effective, confirm_updates, ConfirmOutcome, PendingUpdates};
pub use recipes::{RecipeError, RecipeSource};
pub use session::Session;
pub use similarity::{find_similar_key, similarity};
pub use store::{DishStore, DishUpdate, StoreState};
pub use views::{BagGroup, IngredientProgress, EMPTY_GROUP};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
