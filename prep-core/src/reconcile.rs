//! Staged ingredient updates.
//!
//! A user toggles ingredients on many bags; each toggle is recorded as a
//! pending intent keyed by bag id and ingredient name. Nothing touches a
//! bag's confirmed list until [`confirm_updates`] commits that bag.
//!
//! The effective set (confirmed plus intents) is computed in exactly one
//! place, [`effective_names`], and used both for the live count and for the
//! commit.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

use crate::models::{find_ingredient, Ingredient};

/// Ingredient name -> `true` to add, `false` to remove.
pub type Intents = BTreeMap<String, bool>;

/// Staged intents for every bag with uncommitted changes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PendingUpdates {
    by_bag: HashMap<Uuid, Intents>,
}

impl PendingUpdates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an intent, replacing any earlier intent for the same pair.
    pub fn stage(&mut self, bag_id: Uuid, name: impl Into<String>, add: bool) {
        self.by_bag.entry(bag_id).or_default().insert(name.into(), add);
    }

    /// Discards everything staged for a bag.
    pub fn clear(&mut self, bag_id: Uuid) -> Option<Intents> {
        self.by_bag.remove(&bag_id)
    }

    pub fn clear_all(&mut self) {
        self.by_bag.clear();
    }

    pub fn intents(&self, bag_id: Uuid) -> Option<&Intents> {
        self.by_bag.get(&bag_id).filter(|i| !i.is_empty())
    }

    pub fn has_pending(&self, bag_id: Uuid) -> bool {
        self.intents(bag_id).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.by_bag.values().all(BTreeMap::is_empty)
    }

    /// Keeps only the intents for which `keep(bag_id, name)` holds. Bags left
    /// with no intents are dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(Uuid, &str) -> bool) {
        self.by_bag.retain(|id, intents| {
            intents.retain(|name, _| keep(*id, name));
            !intents.is_empty()
        });
    }
}

/// Confirmed names with the staged intents applied.
pub fn effective_names<'a, I>(confirmed: I, intents: Option<&'a Intents>) -> BTreeSet<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut names: BTreeSet<&'a str> = confirmed.into_iter().collect();
    for (name, &add) in intents.into_iter().flatten() {
        if add {
            names.insert(name.as_str());
        } else {
            names.remove(name.as_str());
        }
    }
    names
}

/// Count the UI shows while intents are staged.
///
/// With `show_missing` this is how many of `total` are still outstanding,
/// otherwise how many are (effectively) confirmed.
pub fn compute_effective<'a, I>(
    confirmed: I,
    intents: Option<&'a Intents>,
    total: usize,
    show_missing: bool,
) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    let effective = effective_names(confirmed, intents).len();
    if show_missing {
        total.saturating_sub(effective)
    } else {
        effective
    }
}

/// Result of committing one bag.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmOutcome {
    pub bag_id: Uuid,
    /// The list handed to the write-back.
    pub confirmed: Vec<Ingredient>,
    /// Names that had no recipe entry and were recorded with the sentinel.
    pub unresolved: Vec<String>,
}

/// Commits the staged intents for one bag.
///
/// The effective names are resolved against `recipe`: names already
/// confirmed keep their position, new names follow in recipe order, and
/// names missing from the recipe come last with a zero-weight `unitless`
/// record. `write_back` is invoked exactly once with the resolved list;
/// pending intents for the bag are cleared only if it succeeds.
pub fn confirm_updates<F, E>(
    pending: &mut PendingUpdates,
    bag_id: Uuid,
    confirmed: &[Ingredient],
    recipe: &[Ingredient],
    write_back: F,
) -> Result<ConfirmOutcome, E>
where
    F: FnOnce(Uuid, Vec<Ingredient>) -> Result<(), E>,
{
    let effective = effective_names(
        confirmed.iter().map(|i| i.name.as_str()),
        pending.intents(bag_id),
    );

    let mut ordered: Vec<String> = Vec::with_capacity(effective.len());
    for ingredient in confirmed.iter().chain(recipe) {
        let name = ingredient.name.as_str();
        if effective.contains(name) && !ordered.iter().any(|n| n == name) {
            ordered.push(name.to_string());
        }
    }
    for name in &effective {
        if !ordered.iter().any(|n| n == name) {
            ordered.push(name.to_string());
        }
    }

    let mut unresolved = Vec::new();
    let resolved: Vec<Ingredient> = ordered
        .into_iter()
        .map(|name| match find_ingredient(recipe, &name) {
            Some(record) => record.clone(),
            None => {
                tracing::warn!(
                    %bag_id,
                    ingredient = %name,
                    "ingredient missing from recipe, recorded as unitless"
                );
                unresolved.push(name.clone());
                Ingredient::unresolved(name)
            }
        })
        .collect();

    write_back(bag_id, resolved.clone())?;
    pending.clear(bag_id);

    Ok(ConfirmOutcome {
        bag_id,
        confirmed: resolved,
        unresolved,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    const BAG_A: Uuid = Uuid::from_u128(0xA);

    fn recipe() -> Vec<Ingredient> {
        vec![
            Ingredient::new("Salt", 5.0, "g"),
            Ingredient::new("Pepper", 1.0, "g"),
            Ingredient::new("Water", 500.0, "ml"),
        ]
    }

    fn names(list: &[Ingredient]) -> Vec<&str> {
        list.iter().map(|i| i.name.as_str()).collect()
    }

    #[test]
    fn test_stage_last_write_wins() {
        let mut pending = PendingUpdates::new();
        pending.stage(BAG_A, "Salt", true);
        pending.stage(BAG_A, "Salt", false);

        let intents = pending.intents(BAG_A).unwrap();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents.get("Salt"), Some(&false));
    }

    #[test]
    fn test_clear_pending() {
        let mut pending = PendingUpdates::new();
        pending.stage(BAG_A, "Salt", true);
        assert!(pending.has_pending(BAG_A));

        pending.clear(BAG_A);
        assert!(!pending.has_pending(BAG_A));
        assert!(pending.is_empty());
    }

    #[test]
    fn test_compute_effective_applies_intents() {
        let mut intents = Intents::new();
        intents.insert("Pepper".into(), true);
        intents.insert("Salt".into(), false);
        intents.insert("Water".into(), true);

        let confirmed = ["Salt"];
        assert_eq!(compute_effective(confirmed, Some(&intents), 3, false), 2);
        assert_eq!(compute_effective(confirmed, Some(&intents), 3, true), 1);
        assert_eq!(compute_effective(confirmed, None, 3, true), 2);
    }

    #[test]
    fn test_compute_effective_add_already_confirmed_counts_once() {
        let mut intents = Intents::new();
        intents.insert("Salt".into(), true);
        assert_eq!(compute_effective(["Salt"], Some(&intents), 3, false), 1);
    }

    #[test]
    fn test_compute_effective_missing_never_negative() {
        assert_eq!(compute_effective(["A", "B", "C"], None, 2, true), 0);
    }

    #[test]
    fn test_confirm_writes_back_once_and_clears() {
        let mut pending = PendingUpdates::new();
        pending.stage(BAG_A, "Salt", true);
        pending.stage(BAG_A, "Pepper", true);

        let mut calls = Vec::new();
        let outcome = confirm_updates(&mut pending, BAG_A, &[], &recipe(), |id, list| {
            calls.push((id, list));
            Ok::<(), Infallible>(())
        })
        .unwrap();

        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, BAG_A);
        assert_eq!(
            calls[0].1,
            vec![
                Ingredient::new("Salt", 5.0, "g"),
                Ingredient::new("Pepper", 1.0, "g"),
            ]
        );
        assert!(outcome.unresolved.is_empty());
        assert!(!pending.has_pending(BAG_A));
    }

    #[test]
    fn test_confirm_keeps_confirmed_order_then_recipe_order() {
        let mut pending = PendingUpdates::new();
        pending.stage(BAG_A, "Salt", true);
        let confirmed = vec![Ingredient::new("Water", 500.0, "ml")];

        let outcome = confirm_updates(&mut pending, BAG_A, &confirmed, &recipe(), |_, _| {
            Ok::<(), Infallible>(())
        })
        .unwrap();

        assert_eq!(names(&outcome.confirmed), vec!["Water", "Salt"]);
    }

    #[test]
    fn test_confirm_removal() {
        let mut pending = PendingUpdates::new();
        pending.stage(BAG_A, "Salt", false);
        let confirmed = vec![
            Ingredient::new("Salt", 5.0, "g"),
            Ingredient::new("Water", 500.0, "ml"),
        ];

        let outcome = confirm_updates(&mut pending, BAG_A, &confirmed, &recipe(), |_, _| {
            Ok::<(), Infallible>(())
        })
        .unwrap();

        assert_eq!(names(&outcome.confirmed), vec!["Water"]);
    }

    #[test]
    fn test_confirm_twice_is_idempotent() {
        let mut pending = PendingUpdates::new();
        pending.stage(BAG_A, "Water", true);
        pending.stage(BAG_A, "Salt", true);

        let first = confirm_updates(&mut pending, BAG_A, &[], &recipe(), |_, _| {
            Ok::<(), Infallible>(())
        })
        .unwrap();
        let bag = first.confirmed;

        let second = confirm_updates(&mut pending, BAG_A, &bag, &recipe(), |_, _| {
            Ok::<(), Infallible>(())
        })
        .unwrap();
        assert_eq!(second.confirmed, bag);
        assert!(pending.is_empty());
    }

    #[test]
    fn test_confirm_unknown_name_uses_sentinel() {
        let mut pending = PendingUpdates::new();
        pending.stage(BAG_A, "Saffron", true);
        pending.stage(BAG_A, "Salt", true);

        let outcome = confirm_updates(&mut pending, BAG_A, &[], &recipe(), |_, _| {
            Ok::<(), Infallible>(())
        })
        .unwrap();

        assert_eq!(outcome.unresolved, vec!["Saffron".to_string()]);
        assert_eq!(
            outcome.confirmed,
            vec![
                Ingredient::new("Salt", 5.0, "g"),
                Ingredient::unresolved("Saffron"),
            ]
        );
    }

    #[test]
    fn test_failed_write_back_keeps_pending() {
        let mut pending = PendingUpdates::new();
        pending.stage(BAG_A, "Salt", true);

        let result = confirm_updates(&mut pending, BAG_A, &[], &recipe(), |_, _| Err("gone"));
        assert_eq!(result, Err("gone"));
        assert!(pending.has_pending(BAG_A));
    }

    #[test]
    fn test_retain_filters_by_bag_and_name() {
        let other = Uuid::from_u128(0xB);
        let mut pending = PendingUpdates::new();
        pending.stage(BAG_A, "Salt", true);
        pending.stage(other, "Salt", true);
        pending.stage(other, "Pepper", false);

        pending.retain(|id, name| id == other && name != "Pepper");
        assert!(!pending.has_pending(BAG_A));
        let intents = pending.intents(other).unwrap();
        assert_eq!(intents.len(), 1);
        assert_eq!(intents.get("Salt"), Some(&true));
    }
}
