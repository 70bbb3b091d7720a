//! Module: index::range
//! Responsibility: lower a (start, end, direction) triple into ordered
//! storage bounds.
//! Does not own: index selection (planner) or scanning (backend).

use crate::db::{Direction, index::IndexKey};
use serde::{Deserialize, Serialize};
use std::ops::Bound;

///
/// KeyRange
///
/// Scan envelope in traversal order: `start` is where the scan begins and
/// `end` where it stops. For descending scans `start` is therefore the high
/// key. `end` is inclusive unless `inclusive_end` is cleared.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct KeyRange {
    pub start: IndexKey,
    pub end: IndexKey,
    pub direction: Direction,
    pub inclusive_end: bool,
}

impl KeyRange {
    #[must_use]
    pub const fn new(start: IndexKey, end: IndexKey, direction: Direction) -> Self {
        Self {
            start,
            end,
            direction,
            inclusive_end: true,
        }
    }

    #[must_use]
    pub const fn exclusive_end(mut self) -> Self {
        self.inclusive_end = false;
        self
    }

    /// Low/high storage bounds regardless of traversal direction.
    #[must_use]
    pub fn bounds(&self) -> (Bound<&IndexKey>, Bound<&IndexKey>) {
        let start = Bound::Included(&self.start);
        let end = if self.inclusive_end {
            Bound::Included(&self.end)
        } else {
            Bound::Excluded(&self.end)
        };

        match self.direction {
            Direction::Asc => (start, end),
            Direction::Desc => (end, start),
        }
    }

    /// True when no key can fall inside the envelope.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let (low, high) = match self.direction {
            Direction::Asc => (&self.start, &self.end),
            Direction::Desc => (&self.end, &self.start),
        };

        if low < high {
            return false;
        }
        if low > high {
            return true;
        }

        !self.inclusive_end
    }

    #[must_use]
    pub fn contains(&self, key: &IndexKey) -> bool {
        let (low, high) = self.bounds();

        bound_allows_above(low, key) && bound_allows_below(high, key)
    }
}

fn bound_allows_above(bound: Bound<&IndexKey>, key: &IndexKey) -> bool {
    match bound {
        Bound::Included(low) => key >= low,
        Bound::Excluded(low) => key > low,
        Bound::Unbounded => true,
    }
}

fn bound_allows_below(bound: Bound<&IndexKey>, key: &IndexKey) -> bool {
    match bound {
        Bound::Included(high) => key <= high,
        Bound::Excluded(high) => key < high,
        Bound::Unbounded => true,
    }
}
