//! Identity for dishes and prep bags.
//!
//! Ids are UUIDs. Production code uses random v4 ids; tests use
//! [`SequentialIds`] so assertions can name bags directly.

use uuid::Uuid;

/// Source of fresh, collision-resistant ids.
pub trait IdGenerator {
    fn next_id(&mut self) -> Uuid;
}

/// Random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Deterministic ids `1, 2, 3, ...` encoded as UUIDs.
#[derive(Debug, Clone, Default)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continue numbering after `last`.
    pub fn starting_after(last: u128) -> Self {
        Self { next: last }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.next += 1;
        Uuid::from_u128(self.next)
    }
}
