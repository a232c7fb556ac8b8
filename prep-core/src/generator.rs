//! Prep bag generation and the column-major display matrix.

use serde::Serialize;
use uuid::Uuid;

use crate::ids::IdGenerator;
use crate::models::{Ingredient, PrepBag};

/// Rows per column in the bag display.
pub const DEFAULT_ROW_HEIGHT: usize = 8;

/// Creates `quantity` fresh bags for a dish, each needing `ingredients`.
pub fn generate_bags(
    dish_name: &str,
    ingredients: &[Ingredient],
    quantity: u32,
    ids: &mut dyn IdGenerator,
) -> Vec<PrepBag> {
    (0..quantity)
        .map(|_| PrepBag::new(ids.next_id(), dish_name, ingredients.to_vec()))
        .collect()
}

/// Bags laid out top-to-bottom, then left-to-right.
///
/// Always built from the current bag list; never stored on a dish.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BagMatrix {
    row_height: usize,
    rows: Vec<Vec<Option<Uuid>>>,
}

impl BagMatrix {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn row_height(&self) -> usize {
        self.row_height
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<Uuid> {
        self.rows.get(row).and_then(|r| r.get(col)).copied().flatten()
    }

    pub fn rows(&self) -> &[Vec<Option<Uuid>>] {
        &self.rows
    }

    /// Bag ids in column-major order with empty slots dropped.
    pub fn flatten(&self) -> Vec<Uuid> {
        (0..self.column_count())
            .flat_map(|col| (0..self.row_count()).filter_map(move |row| self.cell(row, col)))
            .collect()
    }
}

/// Lays `bags` out in columns of `row_height` (zero is treated as one).
pub fn build_matrix(bags: &[PrepBag], row_height: usize) -> BagMatrix {
    let height = row_height.max(1);
    let columns = bags.len().div_ceil(height);
    let row_count = bags.len().min(height);

    let rows = (0..row_count)
        .map(|row| {
            (0..columns)
                .map(|col| bags.get(col * height + row).map(|b| b.id))
                .collect()
        })
        .collect();

    BagMatrix {
        row_height: height,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::SequentialIds;
    use std::collections::HashSet;

    fn salt() -> Vec<Ingredient> {
        vec![Ingredient::new("Salt", 5.0, "g")]
    }

    fn bags(n: u32) -> Vec<PrepBag> {
        generate_bags("Soup", &salt(), n, &mut SequentialIds::new())
    }

    #[test]
    fn test_generate_exact_quantity() {
        for quantity in [0, 1, 3, 8, 17] {
            let generated = bags(quantity);
            assert_eq!(generated.len(), quantity as usize);

            let ids: HashSet<Uuid> = generated.iter().map(|b| b.id).collect();
            assert_eq!(ids.len(), quantity as usize);
            assert!(generated.iter().all(|b| !b.is_complete()));
            assert!(generated.iter().all(|b| b.added_ingredients.is_empty()));
        }
    }

    #[test]
    fn test_generated_bags_share_recipe() {
        let generated = bags(2);
        assert_eq!(generated[0].ingredients, salt());
        assert_eq!(generated[1].ingredients, salt());
        assert_eq!(generated[0].dish_name, "Soup");
    }

    #[test]
    fn test_matrix_three_bags_single_column() {
        let generated = bags(3);
        let matrix = build_matrix(&generated, DEFAULT_ROW_HEIGHT);

        assert_eq!(matrix.row_count(), 3);
        assert_eq!(matrix.column_count(), 1);
        assert_eq!(matrix.cell(2, 0), Some(generated[2].id));
    }

    #[test]
    fn test_matrix_is_column_major() {
        let generated = bags(10);
        let matrix = build_matrix(&generated, DEFAULT_ROW_HEIGHT);

        assert_eq!(matrix.row_count(), 8);
        assert_eq!(matrix.column_count(), 2);
        assert_eq!(matrix.cell(0, 1), Some(generated[8].id));
        assert_eq!(matrix.cell(1, 1), Some(generated[9].id));
        assert_eq!(matrix.cell(2, 1), None);
        assert_eq!(matrix.cell(7, 0), Some(generated[7].id));
    }

    #[test]
    fn test_matrix_flatten_reproduces_order() {
        for n in [0, 1, 7, 8, 9, 16, 23] {
            let generated = bags(n);
            for height in [1, 3, DEFAULT_ROW_HEIGHT] {
                let matrix = build_matrix(&generated, height);
                let order: Vec<Uuid> = generated.iter().map(|b| b.id).collect();
                assert_eq!(matrix.flatten(), order, "n={} height={}", n, height);
            }
        }
    }

    #[test]
    fn test_matrix_empty() {
        let matrix = build_matrix(&[], DEFAULT_ROW_HEIGHT);
        assert_eq!(matrix.row_count(), 0);
        assert_eq!(matrix.column_count(), 0);
        assert!(matrix.flatten().is_empty());
    }

    #[test]
    fn test_zero_row_height_is_one() {
        let generated = bags(3);
        let matrix = build_matrix(&generated, 0);
        assert_eq!(matrix.row_height(), 1);
        assert_eq!(matrix.row_count(), 1);
        assert_eq!(matrix.column_count(), 3);
    }
}
