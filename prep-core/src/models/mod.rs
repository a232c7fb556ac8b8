mod dish;
mod ingredient;
mod prep_bag;
mod recipe;

pub use dish::{Dish, DishSpec};
pub use ingredient::{find_ingredient, Ingredient, UNRESOLVED_UNIT};
pub use prep_bag::PrepBag;
pub use recipe::Recipe;
