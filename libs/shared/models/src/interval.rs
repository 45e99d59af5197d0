//! Half-open interval arithmetic shared by the conflict checker and the
//! slot generator.
//!
//! Every comparison in the booking engine goes through [`overlaps`]: two
//! intervals overlap iff `a_start < b_end && b_start < a_end`, so touching
//! endpoints never collide and back-to-back bookings stay legal.

use serde::{Deserialize, Serialize};

/// Strict half-open overlap test.
pub fn overlaps<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start < b_end && b_start < a_end
}

/// Closed-interval overlap test: touching endpoints count as overlapping.
/// Used where a stricter rule is wanted, e.g. time-off against time-off.
pub fn overlaps_inclusive<T: PartialOrd>(a_start: T, a_end: T, b_start: T, b_end: T) -> bool {
    a_start <= b_end && b_start <= a_end
}

/// An ephemeral `[start, end)` pair. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval<T> {
    pub start: T,
    pub end: T,
}

impl<T: PartialOrd + Copy> TimeInterval<T> {
    pub fn new(start: T, end: T) -> Self {
        Self { start, end }
    }

    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    pub fn overlaps(&self, other: &TimeInterval<T>) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }

    pub fn overlaps_inclusive(&self, other: &TimeInterval<T>) -> bool {
        overlaps_inclusive(self.start, self.end, other.start, other.end)
    }

    /// True when `other` lies entirely inside `self`.
    pub fn contains(&self, other: &TimeInterval<T>) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}
