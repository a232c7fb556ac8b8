//! A prep session: the dish store plus the staged updates against it.
//!
//! All mutations go through one `Session`, so bag lookups, staging and
//! commits never interleave. Store operations that drop bags, or drop
//! ingredients from a bag's recipe, also drop the intents staged for them.
//! Dishes that go away hand their colour back to the assigner.

use uuid::Uuid;

use crate::colour::ColorAssigner;
use crate::error::{StoreError, StoreResult};
use crate::ids::IdGenerator;
use crate::models::{Dish, DishSpec, Ingredient};
use crate::reconcile::{compute_effective, confirm_updates, ConfirmOutcome, PendingUpdates};
use crate::store::{DishStore, DishUpdate};
use crate::views::{self, BagGroup};

#[derive(Default)]
pub struct Session {
    store: DishStore,
    pending: PendingUpdates,
    colours: ColorAssigner,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids(ids: impl IdGenerator + 'static) -> Self {
        Self::with_store(DishStore::with_ids(ids))
    }

    pub fn with_store(store: DishStore) -> Self {
        Self {
            store,
            pending: PendingUpdates::new(),
            colours: ColorAssigner::default(),
        }
    }

    /// Replaces the colour palette. Colours handed out so far are forgotten.
    pub fn set_palette(&mut self, palette: Vec<String>) {
        self.colours = ColorAssigner::new(palette);
    }

    pub fn store(&self) -> &DishStore {
        &self.store
    }

    /// Ends the session. Anything still staged is discarded.
    pub fn into_store(self) -> DishStore {
        if !self.pending.is_empty() {
            tracing::debug!("discarding unconfirmed updates");
        }
        self.store
    }

    pub fn pending(&self) -> &PendingUpdates {
        &self.pending
    }

    pub fn dishes(&self) -> &[Dish] {
        self.store.dishes()
    }

    pub fn add_dish(&mut self, spec: DishSpec, quantity: u32) -> StoreResult<Uuid> {
        self.store.add_dish(spec, quantity)
    }

    pub fn undo_dish(&mut self) -> Option<Dish> {
        let dish = self.store.undo_dish()?;
        self.forget_dish(&dish);
        Some(dish)
    }

    pub fn clear_dishes(&mut self) {
        let dishes = self.store.dishes().to_vec();
        self.store.clear_dishes();
        self.pending.clear_all();
        for dish in &dishes {
            self.colours.release(&dish.name);
        }
    }

    pub fn remove_dish(&mut self, name: &str) -> StoreResult<Vec<Dish>> {
        let removed = self.store.remove_dish(name)?;
        for dish in &removed {
            self.forget_dish(dish);
        }
        Ok(removed)
    }

    pub fn update_dish(
        &mut self,
        name: &str,
        quantity: u32,
        ingredients: Vec<Ingredient>,
    ) -> StoreResult<DishUpdate> {
        let update = self.store.update_dish(name, quantity, ingredients)?;
        let store = &self.store;
        self.pending
            .retain(|bag_id, name| store.bag(bag_id).is_some_and(|bag| bag.requires(name)));
        Ok(update)
    }

    pub fn reorder_dishes(&mut self, order: &[Uuid]) -> StoreResult<()> {
        self.store.reorder_dishes(order)
    }

    pub fn move_dish(&mut self, from: usize, to: usize) -> StoreResult<()> {
        self.store.move_dish(from, to)
    }

    pub fn update_prep_bag(&mut self, bag_id: Uuid, added: Vec<Ingredient>) -> StoreResult<()> {
        self.store.update_prep_bag(bag_id, added)
    }

    pub fn tick_off_ingredient(&mut self, name: &str) -> usize {
        self.store.tick_off_ingredient(name)
    }

    /// Stages adding (`add = true`) or removing an ingredient on a bag.
    ///
    /// Only names from the bag's own recipe can be staged.
    pub fn stage(&mut self, bag_id: Uuid, name: &str, add: bool) -> StoreResult<()> {
        let bag = self
            .store
            .bag(bag_id)
            .ok_or(StoreError::BagNotFound(bag_id))?;
        if !bag.requires(name) {
            return Err(StoreError::UnknownIngredient {
                bag_id,
                name: name.to_string(),
            });
        }
        self.pending.stage(bag_id, name, add);
        Ok(())
    }

    pub fn clear_pending(&mut self, bag_id: Uuid) {
        self.pending.clear(bag_id);
    }

    /// Live count for a bag with its staged intents applied.
    pub fn effective_count(&self, bag_id: Uuid, show_missing: bool) -> StoreResult<usize> {
        let bag = self
            .store
            .bag(bag_id)
            .ok_or(StoreError::BagNotFound(bag_id))?;
        Ok(compute_effective(
            bag.added_ingredients.iter().map(|i| i.name.as_str()),
            self.pending.intents(bag_id),
            bag.required_names().len(),
            show_missing,
        ))
    }

    /// Commits the staged intents for one bag.
    pub fn confirm(&mut self, bag_id: Uuid) -> StoreResult<ConfirmOutcome> {
        let bag = self
            .store
            .bag(bag_id)
            .ok_or(StoreError::BagNotFound(bag_id))?;
        let confirmed = bag.added_ingredients.clone();
        let recipe = bag.ingredients.clone();

        let store = &mut self.store;
        confirm_updates(&mut self.pending, bag_id, &confirmed, &recipe, |id, list| {
            store.update_prep_bag(id, list)
        })
    }

    /// Commits every bag with staged intents, one bag at a time in display
    /// order.
    ///
    /// This is not atomic across bags: each bag commits on its own and a
    /// failure leaves later bags pending.
    pub fn confirm_all(&mut self) -> Vec<StoreResult<ConfirmOutcome>> {
        let staged: Vec<Uuid> = self
            .store
            .dishes()
            .iter()
            .flat_map(|d| d.prep_bags.iter().map(|b| b.id))
            .filter(|id| self.pending.has_pending(*id))
            .collect();

        staged.into_iter().map(|id| self.confirm(id)).collect()
    }

    pub fn is_exhausted(&self, name: &str) -> bool {
        views::is_exhausted(self.store.dishes(), name)
    }

    pub fn exhausted_ingredients(&self) -> Vec<String> {
        views::exhausted_ingredients(self.store.dishes())
    }

    pub fn remaining_weights(&self, threshold: f64) -> Vec<Ingredient> {
        views::remaining_weights(self.store.dishes(), threshold)
    }

    pub fn group_bags(&self, dish_id: Uuid) -> StoreResult<Vec<BagGroup>> {
        self.store
            .dish(dish_id)
            .map(views::group_bags)
            .ok_or_else(|| StoreError::DishNotFound(dish_id.to_string()))
    }

    /// Display colour for a dish: its own, or one from the session palette.
    pub fn colour_for(&mut self, dish_id: Uuid) -> Option<String> {
        let dish = self.store.dish(dish_id)?;
        Some(self.colours.colour_for(dish))
    }

    fn forget_dish(&mut self, dish: &Dish) {
        for bag in &dish.prep_bags {
            self.pending.clear(bag.id);
        }
        if self.store.dishes_named(&dish.name).next().is_none() {
            self.colours.release(&dish.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use crate::models::UNRESOLVED_UNIT;

    fn soup() -> DishSpec {
        DishSpec::new("Soup").with_ingredients(vec![
            Ingredient::new("Salt", 5.0, "g"),
            Ingredient::new("Pepper", 1.0, "g"),
        ])
    }

    fn session_with_soup(quantity: u32) -> (Session, Vec<Uuid>) {
        let mut session = Session::with_ids(SequentialIds::new());
        let id = session.add_dish(soup(), quantity).unwrap();
        let bags = session
            .store()
            .dish(id)
            .unwrap()
            .prep_bags
            .iter()
            .map(|b| b.id)
            .collect();
        (session, bags)
    }

    #[test]
    fn test_stage_then_confirm() {
        let (mut session, bags) = session_with_soup(1);
        let bag_a = bags[0];

        session.stage(bag_a, "Salt", true).unwrap();
        session.stage(bag_a, "Pepper", true).unwrap();
        assert_eq!(session.effective_count(bag_a, false).unwrap(), 2);
        assert_eq!(session.effective_count(bag_a, true).unwrap(), 0);
        assert!(session.store().bag(bag_a).unwrap().added_ingredients.is_empty());

        let outcome = session.confirm(bag_a).unwrap();
        assert_eq!(outcome.confirmed.len(), 2);

        let bag = session.store().bag(bag_a).unwrap();
        assert!(bag.is_complete());
        assert_eq!(
            bag.added_ingredients,
            vec![
                Ingredient::new("Salt", 5.0, "g"),
                Ingredient::new("Pepper", 1.0, "g"),
            ]
        );
        assert!(!session.pending().has_pending(bag_a));
    }

    #[test]
    fn test_confirm_twice_changes_nothing() {
        let (mut session, bags) = session_with_soup(1);
        session.stage(bags[0], "Salt", true).unwrap();
        session.confirm(bags[0]).unwrap();
        let before = session.store().state().clone();

        session.confirm(bags[0]).unwrap();
        assert_eq!(session.store().state(), &before);
    }

    #[test]
    fn test_stage_rejects_foreign_ingredient() {
        let (mut session, bags) = session_with_soup(1);
        assert_eq!(
            session.stage(bags[0], "Sugar", true),
            Err(StoreError::UnknownIngredient {
                bag_id: bags[0],
                name: "Sugar".into()
            })
        );

        let missing = Uuid::from_u128(999);
        assert_eq!(
            session.stage(missing, "Salt", true),
            Err(StoreError::BagNotFound(missing))
        );
    }

    #[test]
    fn test_clear_pending_discards_intents() {
        let (mut session, bags) = session_with_soup(1);
        session.stage(bags[0], "Salt", true).unwrap();
        session.clear_pending(bags[0]);

        session.confirm(bags[0]).unwrap();
        assert!(session.store().bag(bags[0]).unwrap().added_ingredients.is_empty());
    }

    #[test]
    fn test_confirm_all_commits_each_bag() {
        let (mut session, bags) = session_with_soup(3);
        for bag in &bags {
            session.stage(*bag, "Salt", true).unwrap();
        }
        session.stage(bags[1], "Pepper", true).unwrap();

        let outcomes = session.confirm_all();
        assert_eq!(outcomes.len(), 3);
        assert!(outcomes.iter().all(Result::is_ok));
        assert!(session.pending().is_empty());
        assert!(session.store().bag(bags[1]).unwrap().is_complete());
        assert!(!session.store().bag(bags[0]).unwrap().is_complete());
    }

    #[test]
    fn test_staging_does_not_change_exhaustion() {
        let (mut session, bags) = session_with_soup(2);
        for bag in &bags {
            session.stage(*bag, "Salt", true).unwrap();
        }
        assert!(!session.is_exhausted("Salt"));

        session.confirm_all();
        assert!(session.is_exhausted("Salt"));

        session.stage(bags[0], "Salt", false).unwrap();
        assert!(session.is_exhausted("Salt"));
        assert_eq!(session.exhausted_ingredients(), vec!["Salt".to_string()]);

        session.confirm(bags[0]).unwrap();
        assert!(!session.is_exhausted("Salt"));
    }

    #[test]
    fn test_shrinking_dish_drops_pending_for_dropped_bags() {
        let (mut session, bags) = session_with_soup(3);
        session.stage(bags[0], "Salt", true).unwrap();
        session.stage(bags[2], "Salt", true).unwrap();

        session.update_dish("Soup", 1, soup().ingredients).unwrap();
        assert!(session.pending().has_pending(bags[0]));
        assert!(!session.pending().has_pending(bags[2]));
    }

    #[test]
    fn test_recipe_change_drops_intents_for_removed_ingredients() {
        let (mut session, bags) = session_with_soup(1);
        session.stage(bags[0], "Pepper", true).unwrap();
        session
            .update_dish("Soup", 1, vec![Ingredient::new("Salt", 5.0, "g")])
            .unwrap();
        assert!(!session.pending().has_pending(bags[0]));

        let outcome = session.confirm(bags[0]).unwrap();
        assert!(outcome.unresolved.is_empty());
        session.tick_off_ingredient("Salt");

        let bag = session.store().bag(bags[0]).unwrap();
        assert_eq!(bag.added_ingredients, vec![Ingredient::new("Salt", 5.0, "g")]);
        assert!(bag.is_complete());
        assert!(session.remaining_weights(0.8).is_empty());
    }

    #[test]
    fn test_recipe_change_keeps_intents_for_retained_ingredients() {
        let (mut session, bags) = session_with_soup(1);
        session.stage(bags[0], "Salt", true).unwrap();
        session.stage(bags[0], "Pepper", true).unwrap();
        session
            .update_dish("Soup", 1, vec![Ingredient::new("Salt", 7.0, "g")])
            .unwrap();

        let intents = session.pending().intents(bags[0]).unwrap();
        assert_eq!(intents.keys().collect::<Vec<_>>(), vec!["Salt"]);

        session.confirm(bags[0]).unwrap();
        let bag = session.store().bag(bags[0]).unwrap();
        assert_eq!(bag.added_ingredients, vec![Ingredient::new("Salt", 7.0, "g")]);
    }

    #[test]
    fn test_confirm_after_recipe_drift_falls_back_to_sentinel() {
        let (mut session, bags) = session_with_soup(1);
        let drifted = vec![Ingredient::new("Garlic", 3.0, "g")];
        session.update_prep_bag(bags[0], drifted).unwrap();

        let outcome = session.confirm(bags[0]).unwrap();
        assert_eq!(outcome.unresolved, vec!["Garlic".to_string()]);
        let bag = session.store().bag(bags[0]).unwrap();
        assert_eq!(bag.added_ingredients[0].unit, UNRESOLVED_UNIT);
        assert!(!bag.is_complete());
    }

    #[test]
    fn test_removed_dish_releases_colour() {
        let mut session = Session::with_ids(SequentialIds::new());
        session.set_palette(vec!["red".into(), "green".into()]);
        let soup = session.add_dish(soup(), 1).unwrap();
        let salad = session.add_dish(DishSpec::new("Salad"), 1).unwrap();
        assert_eq!(session.colour_for(soup).as_deref(), Some("red"));
        assert_eq!(session.colour_for(salad).as_deref(), Some("green"));

        session.remove_dish("Soup").unwrap();
        let tea = session.add_dish(DishSpec::new("Tea"), 1).unwrap();
        assert_eq!(session.colour_for(tea).as_deref(), Some("red"));
        assert!(session.colour_for(soup).is_none());
    }

    #[test]
    fn test_colour_kept_while_a_dish_with_the_name_remains() {
        let mut session = Session::with_ids(SequentialIds::new());
        session.set_palette(vec!["red".into(), "green".into()]);
        let first = session.add_dish(soup(), 1).unwrap();
        let second = session.add_dish(soup(), 1).unwrap();
        assert_eq!(session.colour_for(first).as_deref(), Some("red"));

        session.undo_dish().unwrap();
        assert!(session.store().dish(second).is_none());
        let salad = session.add_dish(DishSpec::new("Salad"), 1).unwrap();
        assert_eq!(session.colour_for(salad).as_deref(), Some("green"));
        assert_eq!(session.colour_for(first).as_deref(), Some("red"));
    }

    #[test]
    fn test_undo_and_remove_forget_pending() {
        let (mut session, bags) = session_with_soup(1);
        session.stage(bags[0], "Salt", true).unwrap();
        session.undo_dish().unwrap();
        assert!(session.pending().is_empty());

        let (mut session, bags) = session_with_soup(2);
        session.stage(bags[1], "Salt", true).unwrap();
        session.remove_dish("Soup").unwrap();
        assert!(session.pending().is_empty());
    }

    #[test]
    fn test_views_through_session() {
        let (mut session, bags) = session_with_soup(2);
        let dish_id = session.dishes()[0].id;
        session.tick_off_ingredient("Salt");
        session.tick_off_ingredient("Pepper");
        session.update_prep_bag(bags[1], Vec::new()).unwrap();

        let totals = session.remaining_weights(0.8);
        assert_eq!(totals[0], Ingredient::new("Salt", 5.0, "g"));

        let groups = session.group_bags(dish_id).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Pepper, Salt");
    }
}
