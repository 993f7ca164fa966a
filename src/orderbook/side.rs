//! One side of a rank-ordered order book
//!
//! Rows are kept in the order the feed dictates: index 0 is the best level
//! for the side and every operation addresses a row by its rank.

use super::{DepthOperation, PriceLevel};

/// What an operation did to the side
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    Inserted,
    Removed,
    Updated,
    /// Rank was out of range for the operation; the side is unchanged
    Ignored,
}

impl ApplyOutcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, ApplyOutcome::Ignored)
    }
}

/// Rank-ordered rows for either the bid or the ask side
#[derive(Debug, Clone, Default)]
pub struct OrderBookSide {
    levels: Vec<PriceLevel>,
}

impl OrderBookSide {
    /// Create an empty side
    pub fn new() -> Self {
        Self { levels: Vec::new() }
    }

    /// Apply one feed operation at `rank`.
    ///
    /// `Add` accepts `rank <= len` and shifts later rows down; `Remove` and
    /// `Update` accept `rank < len`. Anything else leaves the side untouched.
    pub fn apply(
        &mut self,
        operation: DepthOperation,
        rank: usize,
        level: PriceLevel,
    ) -> ApplyOutcome {
        match operation {
            DepthOperation::Add => {
                if rank > self.levels.len() {
                    return ApplyOutcome::Ignored;
                }
                self.levels.insert(rank, level);
                ApplyOutcome::Inserted
            }
            DepthOperation::Remove => {
                if rank >= self.levels.len() {
                    return ApplyOutcome::Ignored;
                }
                self.levels.remove(rank);
                ApplyOutcome::Removed
            }
            DepthOperation::Update => match self.levels.get_mut(rank) {
                Some(row) => {
                    *row = level;
                    ApplyOutcome::Updated
                }
                None => ApplyOutcome::Ignored,
            },
        }
    }

    /// Volume at rank 0, or 0 when the side is empty
    pub fn best_volume(&self) -> i64 {
        self.levels.first().map(|level| level.volume).unwrap_or(0)
    }

    /// Row at rank 0
    pub fn best_level(&self) -> Option<PriceLevel> {
        self.levels.first().copied()
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// All rows, best first
    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels
    }

    pub fn clear(&mut self) {
        self.levels.clear();
    }
}
