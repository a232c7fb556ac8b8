//! The dish store: sole owner of dishes and their prep bags.
//!
//! Dishes are kept in display order. Lookups go through id indexes that are
//! rebuilt after every structural change, so names are only used where the
//! caller explicitly addresses dishes by name.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};
use crate::generator::{build_matrix, generate_bags, BagMatrix};
use crate::ids::{IdGenerator, RandomIds};
use crate::models::{find_ingredient, Dish, DishSpec, Ingredient, PrepBag};

/// The serializable part of the store.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreState {
    /// Dishes in display order.
    pub dishes: Vec<Dish>,
    /// Dish ids in creation order; the last entry is undone first.
    #[serde(default)]
    pub history: Vec<Uuid>,
}

/// Bags created and dropped by a dish update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DishUpdate {
    pub added_bags: Vec<Uuid>,
    pub dropped_bags: Vec<Uuid>,
}

pub struct DishStore {
    state: StoreState,
    dish_index: HashMap<Uuid, usize>,
    bag_index: HashMap<Uuid, (Uuid, usize)>,
    ids: Box<dyn IdGenerator>,
}

impl Default for DishStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DishStore {
    /// Empty store with random ids.
    pub fn new() -> Self {
        Self::with_ids(RandomIds)
    }

    pub fn with_ids(ids: impl IdGenerator + 'static) -> Self {
        Self::from_state(StoreState::default(), ids)
    }

    /// Restores a store from saved state, repairing bag counts and history.
    pub fn from_state(mut state: StoreState, ids: impl IdGenerator + 'static) -> Self {
        for dish in &mut state.dishes {
            dish.quantity = dish.prep_bags.len() as u32;
        }

        let known: HashSet<Uuid> = state.dishes.iter().map(|d| d.id).collect();
        state.history.retain(|id| known.contains(id));
        for dish in &state.dishes {
            if !state.history.contains(&dish.id) {
                state.history.push(dish.id);
            }
        }

        let mut store = Self {
            state,
            dish_index: HashMap::new(),
            bag_index: HashMap::new(),
            ids: Box::new(ids),
        };
        store.reindex();
        store
    }

    pub fn state(&self) -> &StoreState {
        &self.state
    }

    pub fn into_state(self) -> StoreState {
        self.state
    }

    pub fn dishes(&self) -> &[Dish] {
        &self.state.dishes
    }

    pub fn is_empty(&self) -> bool {
        self.state.dishes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.state.dishes.len()
    }

    pub fn bag_count(&self) -> usize {
        self.bag_index.len()
    }

    pub fn dish(&self, id: Uuid) -> Option<&Dish> {
        self.dish_index.get(&id).map(|&pos| &self.state.dishes[pos])
    }

    pub fn dishes_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Dish> + 'a {
        self.state.dishes.iter().filter(move |d| d.name == name)
    }

    pub fn bag(&self, bag_id: Uuid) -> Option<&PrepBag> {
        let (dish_id, pos) = self.bag_index.get(&bag_id)?;
        self.dish(*dish_id).map(|d| &d.prep_bags[*pos])
    }

    /// The dish a bag belongs to.
    pub fn dish_of_bag(&self, bag_id: Uuid) -> Option<&Dish> {
        let (dish_id, _) = self.bag_index.get(&bag_id)?;
        self.dish(*dish_id)
    }

    /// Display matrix for a dish, built from its current bags.
    pub fn matrix(&self, dish_id: Uuid, row_height: usize) -> Option<BagMatrix> {
        self.dish(dish_id).map(|d| build_matrix(&d.prep_bags, row_height))
    }

    /// Creates a dish with `quantity` empty bags and appends it.
    pub fn add_dish(&mut self, spec: DishSpec, quantity: u32) -> StoreResult<Uuid> {
        if quantity == 0 {
            return Err(StoreError::InvalidQuantity(quantity));
        }

        let mut dish = Dish::new(self.ids.next_id(), spec);
        dish.prep_bags =
            generate_bags(&dish.name, &dish.ingredients, quantity, self.ids.as_mut());
        dish.quantity = quantity;

        let id = dish.id;
        tracing::debug!(dish = %dish.name, quantity, "added dish");
        self.state.dishes.push(dish);
        self.state.history.push(id);
        self.reindex();
        Ok(id)
    }

    /// Removes the most recently added dish. No-op on an empty store.
    pub fn undo_dish(&mut self) -> Option<Dish> {
        let id = self.state.history.pop()?;
        let pos = self.dish_index.get(&id).copied()?;
        let dish = self.state.dishes.remove(pos);
        tracing::debug!(dish = %dish.name, "undid dish");
        self.reindex();
        Some(dish)
    }

    pub fn clear_dishes(&mut self) {
        self.state.dishes.clear();
        self.state.history.clear();
        self.reindex();
    }

    /// Removes every dish called `name` and returns them.
    pub fn remove_dish(&mut self, name: &str) -> StoreResult<Vec<Dish>> {
        let (removed, kept): (Vec<Dish>, Vec<Dish>) = std::mem::take(&mut self.state.dishes)
            .into_iter()
            .partition(|d| d.name == name);
        self.state.dishes = kept;

        if removed.is_empty() {
            return Err(StoreError::DishNotFound(name.to_string()));
        }

        let gone: HashSet<Uuid> = removed.iter().map(|d| d.id).collect();
        self.state.history.retain(|id| !gone.contains(id));
        tracing::debug!(dish = name, count = removed.len(), "removed dishes");
        self.reindex();
        Ok(removed)
    }

    /// Resizes every dish called `name` to `quantity` bags and replaces its
    /// ingredient list.
    ///
    /// New bags are appended empty. Shrinking drops bags from the tail
    /// whatever their progress. Retained bags take the new ingredient list;
    /// their confirmed entries are kept only for names still in it, with the
    /// new recipe weight and unit.
    pub fn update_dish(
        &mut self,
        name: &str,
        quantity: u32,
        ingredients: Vec<Ingredient>,
    ) -> StoreResult<DishUpdate> {
        if quantity == 0 {
            return Err(StoreError::InvalidQuantity(quantity));
        }
        if !self.state.dishes.iter().any(|d| d.name == name) {
            return Err(StoreError::DishNotFound(name.to_string()));
        }

        let mut update = DishUpdate::default();
        let ids = self.ids.as_mut();

        for dish in self.state.dishes.iter_mut().filter(|d| d.name == name) {
            dish.ingredients = ingredients.clone();

            for bag in &mut dish.prep_bags {
                bag.ingredients = ingredients.clone();
                bag.added_ingredients = bag
                    .added_ingredients
                    .iter()
                    .filter_map(|added| find_ingredient(&ingredients, &added.name).cloned())
                    .collect();
            }

            let current = dish.prep_bags.len();
            let target = quantity as usize;
            if target > current {
                let fresh =
                    generate_bags(&dish.name, &ingredients, (target - current) as u32, ids);
                update.added_bags.extend(fresh.iter().map(|b| b.id));
                dish.prep_bags.extend(fresh);
            } else {
                update
                    .dropped_bags
                    .extend(dish.prep_bags.drain(target..).map(|b| b.id));
            }
            dish.quantity = quantity;
        }

        tracing::debug!(
            dish = name,
            quantity,
            added = update.added_bags.len(),
            dropped = update.dropped_bags.len(),
            "updated dish"
        );
        self.reindex();
        Ok(update)
    }

    /// Replaces the display order. `order` must be a permutation of the
    /// current dish ids.
    pub fn reorder_dishes(&mut self, order: &[Uuid]) -> StoreResult<()> {
        let unique: HashSet<Uuid> = order.iter().copied().collect();
        if order.len() != self.state.dishes.len()
            || unique.len() != order.len()
            || !unique.iter().all(|id| self.dish_index.contains_key(id))
        {
            return Err(StoreError::InvalidOrder);
        }

        let mut by_id: HashMap<Uuid, Dish> = std::mem::take(&mut self.state.dishes)
            .into_iter()
            .map(|d| (d.id, d))
            .collect();
        self.state.dishes = order.iter().filter_map(|id| by_id.remove(id)).collect();
        self.reindex();
        Ok(())
    }

    /// Moves the dish at `from` to `to`, shifting the dishes in between.
    pub fn move_dish(&mut self, from: usize, to: usize) -> StoreResult<()> {
        let len = self.state.dishes.len();
        for position in [from, to] {
            if position >= len {
                return Err(StoreError::PositionOutOfRange { position, len });
            }
        }

        let mut order: Vec<Uuid> = self.state.dishes.iter().map(|d| d.id).collect();
        let id = order.remove(from);
        order.insert(to, id);
        self.reorder_dishes(&order)
    }

    /// Replaces a bag's confirmed ingredients wholesale.
    pub fn update_prep_bag(&mut self, bag_id: Uuid, added: Vec<Ingredient>) -> StoreResult<()> {
        let bag = self.bag_mut(bag_id)?;
        bag.added_ingredients = added;
        tracing::trace!(%bag_id, complete = bag.is_complete(), "updated prep bag");
        Ok(())
    }

    /// Confirms `name` in every bag that needs it and has not recorded it,
    /// using the weight and unit from that bag's recipe. Returns the number
    /// of bags changed.
    pub fn tick_off_ingredient(&mut self, name: &str) -> usize {
        let mut ticked = 0;
        for bag in self
            .state
            .dishes
            .iter_mut()
            .flat_map(|d| d.prep_bags.iter_mut())
        {
            if bag.has_confirmed(name) {
                continue;
            }
            if let Some(record) = find_ingredient(&bag.ingredients, name).cloned() {
                bag.added_ingredients.push(record);
                ticked += 1;
            }
        }
        tracing::debug!(ingredient = name, bags = ticked, "ticked off ingredient");
        ticked
    }

    fn bag_mut(&mut self, bag_id: Uuid) -> StoreResult<&mut PrepBag> {
        let (dish_id, pos) = *self
            .bag_index
            .get(&bag_id)
            .ok_or(StoreError::BagNotFound(bag_id))?;
        let dish_pos = *self
            .dish_index
            .get(&dish_id)
            .ok_or(StoreError::BagNotFound(bag_id))?;
        Ok(&mut self.state.dishes[dish_pos].prep_bags[pos])
    }

    fn reindex(&mut self) {
        self.dish_index.clear();
        self.bag_index.clear();
        for (pos, dish) in self.state.dishes.iter().enumerate() {
            self.dish_index.insert(dish.id, pos);
            for (bag_pos, bag) in dish.prep_bags.iter().enumerate() {
                self.bag_index.insert(bag.id, (dish.id, bag_pos));
            }
        }
    }
}
