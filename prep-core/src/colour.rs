//! Colour assignment for dishes without an explicit colour.
//!
//! One assigner lives for the whole session and is handed to whatever
//! renders dishes. Colours are handed out from a free pool and returned
//! when a dish goes away.

use std::collections::{HashMap, VecDeque};

use crate::models::Dish;

pub const DEFAULT_PALETTE: &[&str] = &[
    "#e57373", "#64b5f6", "#81c784", "#ffb74d", "#ba68c8", "#4db6ac", "#f06292", "#a1887f",
];

#[derive(Debug, Clone)]
pub struct ColorAssigner {
    palette: Vec<String>,
    free: VecDeque<String>,
    assigned: HashMap<String, String>,
    overflow: usize,
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::new(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

impl ColorAssigner {
    /// An empty palette falls back to [`DEFAULT_PALETTE`].
    pub fn new(palette: Vec<String>) -> Self {
        if palette.is_empty() {
            return Self::default();
        }
        Self {
            free: palette.iter().cloned().collect(),
            palette,
            assigned: HashMap::new(),
            overflow: 0,
        }
    }

    /// Colour for a dish name, taking the next free one on first use.
    ///
    /// Once the pool is empty, palette colours are reused in order.
    pub fn assign(&mut self, name: &str) -> String {
        if let Some(colour) = self.assigned.get(name) {
            return colour.clone();
        }

        let colour = match self.free.pop_front() {
            Some(colour) => colour,
            None => {
                let colour = self.palette[self.overflow % self.palette.len()].clone();
                self.overflow += 1;
                colour
            }
        };
        self.assigned.insert(name.to_string(), colour.clone());
        colour
    }

    /// Returns a name's colour to the pool.
    pub fn release(&mut self, name: &str) {
        if let Some(colour) = self.assigned.remove(name) {
            let still_used = self.assigned.values().any(|c| *c == colour);
            if !still_used && !self.free.contains(&colour) {
                self.free.push_back(colour);
            }
        }
    }

    /// The dish's own colour if it has one, otherwise an assigned one.
    pub fn colour_for(&mut self, dish: &Dish) -> String {
        match &dish.colour {
            Some(colour) => colour.clone(),
            None => self.assign(&dish.name),
        }
    }

    pub fn assigned(&self, name: &str) -> Option<&str> {
        self.assigned.get(name).map(String::as_str)
    }
}
