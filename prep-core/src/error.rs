//! Errors raised at the dish store boundary.

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Invalid quantity {0}: a dish needs at least one prep bag")]
    InvalidQuantity(u32),

    #[error("Dish not found: {0}")]
    DishNotFound(String),

    #[error("Prep bag not found: {0}")]
    BagNotFound(Uuid),

    #[error("Ingredient '{name}' is not part of the recipe for bag {bag_id}")]
    UnknownIngredient { bag_id: Uuid, name: String },

    #[error("Dish order must list every current dish exactly once")]
    InvalidOrder,

    #[error("Position {position} is out of range for {len} dishes")]
    PositionOutOfRange { position: usize, len: usize },
}

pub type StoreResult<T> = Result<T, StoreError>;
