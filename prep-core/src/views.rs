//! Read-only views derived from the dish list.
//!
//! Everything here is recomputed on every call and only reads confirmed
//! state; staged intents never influence these results.

use serde::Serialize;
use uuid::Uuid;

use crate::models::{Dish, Ingredient};
use crate::similarity::find_similar_key;

/// Label of the group holding bags with nothing confirmed.
pub const EMPTY_GROUP: &str = "empty";

/// Total weight still to prep per ingredient across all dishes.
///
/// Each dish contributes `weight * remaining bags`. Names within
/// `threshold` similarity accumulate into the bucket of the first name
/// seen, which also supplies the unit.
pub fn remaining_weights(dishes: &[Dish], threshold: f64) -> Vec<Ingredient> {
    let mut buckets: Vec<Ingredient> = Vec::new();

    for dish in dishes {
        let remaining = dish.remaining_bags();
        if remaining == 0 {
            continue;
        }

        for ingredient in &dish.ingredients {
            let needed = ingredient.scaled(remaining);
            let existing = find_similar_key(
                buckets.iter().map(|b| b.name.as_str()),
                &needed.name,
                threshold,
            )
            .and_then(|key| buckets.iter().position(|b| b.name == key));

            match existing {
                Some(idx) => buckets[idx].weight += needed.weight,
                None => buckets.push(needed),
            }
        }
    }

    buckets
}

/// Bags of one dish sharing the same confirmed ingredient names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BagGroup {
    pub label: String,
    /// Sorted confirmed names; empty for the [`EMPTY_GROUP`].
    pub ingredients: Vec<String>,
    pub bag_ids: Vec<Uuid>,
}

/// Groups a dish's bags by the sorted names they have confirmed. Repeated
/// entries count, so `[Salt, Salt]` and `[Salt]` are different groups.
///
/// Groups appear in the order their first bag appears.
pub fn group_bags(dish: &Dish) -> Vec<BagGroup> {
    let mut groups: Vec<BagGroup> = Vec::new();

    for bag in &dish.prep_bags {
        let mut signature: Vec<String> = bag
            .added_ingredients
            .iter()
            .map(|i| i.name.clone())
            .collect();
        signature.sort();

        match groups.iter_mut().find(|g| g.ingredients == signature) {
            Some(group) => group.bag_ids.push(bag.id),
            None => {
                let label = if signature.is_empty() {
                    EMPTY_GROUP.to_string()
                } else {
                    signature.join(", ")
                };
                groups.push(BagGroup {
                    label,
                    ingredients: signature,
                    bag_ids: vec![bag.id],
                });
            }
        }
    }

    groups
}

/// True when every bag of every dish needing `name` has confirmed it.
///
/// An ingredient no dish needs is not exhausted.
pub fn is_exhausted(dishes: &[Dish], name: &str) -> bool {
    let mut needed = false;
    for dish in dishes.iter().filter(|d| d.requires(name)) {
        needed = true;
        if !dish.prep_bags.iter().all(|b| b.has_confirmed(name)) {
            return false;
        }
    }
    needed
}

/// Required ingredient names that are exhausted, in first-seen order.
pub fn exhausted_ingredients(dishes: &[Dish]) -> Vec<String> {
    ingredient_progress(dishes)
        .into_iter()
        .filter(IngredientProgress::is_exhausted)
        .map(|p| p.name)
        .collect()
}

/// How many bags have confirmed an ingredient out of how many need it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngredientProgress {
    pub name: String,
    pub confirmed_bags: usize,
    pub required_bags: usize,
}

impl IngredientProgress {
    pub fn is_exhausted(&self) -> bool {
        self.required_bags > 0 && self.confirmed_bags == self.required_bags
    }
}

/// Per-ingredient confirmation counts across all dishes, keyed by exact name.
pub fn ingredient_progress(dishes: &[Dish]) -> Vec<IngredientProgress> {
    let mut progress: Vec<IngredientProgress> = Vec::new();

    for dish in dishes {
        for ingredient in &dish.ingredients {
            let idx = match progress.iter().position(|p| p.name == ingredient.name) {
                Some(idx) => idx,
                None => {
                    progress.push(IngredientProgress {
                        name: ingredient.name.clone(),
                        confirmed_bags: 0,
                        required_bags: 0,
                    });
                    progress.len() - 1
                }
            };
            let entry = &mut progress[idx];
            entry.required_bags += dish.prep_bags.len();
            entry.confirmed_bags += dish
                .prep_bags
                .iter()
                .filter(|b| b.has_confirmed(&ingredient.name))
                .count();
        }
    }

    progress
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DishSpec, PrepBag};
    use crate::similarity::DEFAULT_THRESHOLD;

    fn dish(id: u128, name: &str, ingredients: Vec<Ingredient>, bags: usize) -> Dish {
        let mut dish = Dish::new(
            Uuid::from_u128(id),
            DishSpec::new(name).with_ingredients(ingredients.clone()),
        );
        dish.prep_bags = (0..bags)
            .map(|i| {
                let bag_id = Uuid::from_u128(id * 100 + i as u128);
                PrepBag::new(bag_id, name, ingredients.clone())
            })
            .collect();
        dish.quantity = bags as u32;
        dish
    }

    fn confirm(dish: &mut Dish, bag: usize, names: &[&str]) {
        let records = names
            .iter()
            .map(|n| {
                dish.ingredients
                    .iter()
                    .find(|i| i.name == *n)
                    .cloned()
                    .unwrap()
            })
            .collect();
        dish.prep_bags[bag].added_ingredients = records;
    }

    #[test]
    fn test_remaining_weights_scale_by_open_bags() {
        let mut soup = dish(1, "Soup", vec![Ingredient::new("Salt", 5.0, "g")], 3);
        confirm(&mut soup, 0, &["Salt"]);

        let totals = remaining_weights(&[soup], DEFAULT_THRESHOLD);
        assert_eq!(totals, vec![Ingredient::new("Salt", 10.0, "g")]);
    }

    #[test]
    fn test_remaining_weights_merge_similar_names() {
        let soup = dish(1, "Soup", vec![Ingredient::new("Tomato", 100.0, "g")], 2);
        let salad = dish(
            2,
            "Salad",
            vec![
                Ingredient::new("tomatos", 50.0, "g"),
                Ingredient::new("Lettuce", 1.0, "head"),
            ],
            1,
        );

        let totals = remaining_weights(&[soup, salad], DEFAULT_THRESHOLD);
        assert_eq!(
            totals,
            vec![
                Ingredient::new("Tomato", 250.0, "g"),
                Ingredient::new("Lettuce", 1.0, "head"),
            ]
        );
    }

    #[test]
    fn test_remaining_weights_skip_finished_dishes() {
        let mut soup = dish(1, "Soup", vec![Ingredient::new("Salt", 5.0, "g")], 1);
        confirm(&mut soup, 0, &["Salt"]);
        assert!(remaining_weights(&[soup], DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn test_group_bags_is_order_insensitive() {
        let ingredients = vec![
            Ingredient::new("Salt", 5.0, "g"),
            Ingredient::new("Water", 500.0, "ml"),
        ];
        let mut soup = dish(1, "Soup", ingredients, 4);
        confirm(&mut soup, 0, &["Salt", "Water"]);
        confirm(&mut soup, 2, &["Water", "Salt"]);
        confirm(&mut soup, 3, &["Salt"]);

        let groups = group_bags(&soup);
        assert_eq!(groups.len(), 3);

        assert_eq!(groups[0].label, "Salt, Water");
        assert_eq!(
            groups[0].bag_ids,
            vec![soup.prep_bags[0].id, soup.prep_bags[2].id]
        );
        assert_eq!(groups[1].label, EMPTY_GROUP);
        assert!(groups[1].ingredients.is_empty());
        assert_eq!(groups[2].label, "Salt");
    }

    #[test]
    fn test_group_bags_keeps_repeated_names_apart() {
        let mut soup = dish(1, "Soup", vec![Ingredient::new("Salt", 5.0, "g")], 3);
        confirm(&mut soup, 0, &["Salt", "Salt"]);
        confirm(&mut soup, 1, &["Salt"]);
        confirm(&mut soup, 2, &["Salt", "Salt"]);

        let groups = group_bags(&soup);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].ingredients, vec!["Salt", "Salt"]);
        assert_eq!(groups[0].label, "Salt, Salt");
        assert_eq!(
            groups[0].bag_ids,
            vec![soup.prep_bags[0].id, soup.prep_bags[2].id]
        );
        assert_eq!(groups[1].ingredients, vec!["Salt"]);
    }

    #[test]
    fn test_exhaustion_requires_every_bag_of_every_dish() {
        let mut soup = dish(1, "Soup", vec![Ingredient::new("Salt", 5.0, "g")], 2);
        let mut salad = dish(2, "Salad", vec![Ingredient::new("Salt", 1.0, "g")], 1);
        confirm(&mut soup, 0, &["Salt"]);
        confirm(&mut soup, 1, &["Salt"]);

        assert!(!is_exhausted(&[soup.clone(), salad.clone()], "Salt"));

        confirm(&mut salad, 0, &["Salt"]);
        let dishes = [soup, salad];
        assert!(is_exhausted(&dishes, "Salt"));
        assert_eq!(exhausted_ingredients(&dishes), vec!["Salt".to_string()]);
    }

    #[test]
    fn test_unrequired_ingredient_is_not_exhausted() {
        let soup = dish(1, "Soup", vec![Ingredient::new("Salt", 5.0, "g")], 1);
        assert!(!is_exhausted(&[soup], "Saffron"));
        assert!(!is_exhausted(&[], "Salt"));
    }

    #[test]
    fn test_ingredient_progress() {
        let mut soup = dish(1, "Soup", vec![Ingredient::new("Salt", 5.0, "g")], 3);
        confirm(&mut soup, 1, &["Salt"]);

        let progress = ingredient_progress(&[soup]);
        assert_eq!(
            progress,
            vec![IngredientProgress {
                name: "Salt".into(),
                confirmed_bags: 1,
                required_bags: 3,
            }]
        );
        assert!(!progress[0].is_exhausted());
    }
}
