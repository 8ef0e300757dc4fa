//! Core editor types: selection ranges, multi-range selections, and affinity.
//!
//! These types are framework-agnostic; all offsets are character offsets
//! (Unicode scalar values) into the document.

use std::ops::Range;

use crate::changes::ChangeSet;

/// Which side of an insertion point a position sticks to when remapped.
///
/// `Before` keeps the position in front of text inserted exactly at it,
/// `After` moves it past the inserted text.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    #[default]
    Before,
    After,
}

/// A single selection range with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `from()` and `to()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct SelectionRange {
    /// Where selection started
    pub anchor: usize,
    /// Where cursor is now
    pub head: usize,
}

impl SelectionRange {
    /// Create a new range.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed range (cursor position).
    pub fn cursor(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Lower bound of the range.
    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Upper bound of the range.
    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the range is collapsed (cursor only).
    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the range length.
    pub fn len(&self) -> usize {
        self.to() - self.from()
    }

    /// Convert to a `Range<usize>` (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.from()..self.to()
    }

    /// Check if the range is backwards (head before anchor).
    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }

    /// Map both ends through a change set with the same affinity.
    pub fn map(&self, changes: &ChangeSet, affinity: Affinity) -> Self {
        Self {
            anchor: changes.map_pos(self.anchor, affinity),
            head: changes.map_pos(self.head, affinity),
        }
    }
}

impl From<Range<usize>> for SelectionRange {
    fn from(r: Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

/// An ordered set of disjoint selection ranges with a designated main range.
///
/// Construction normalizes: ranges are sorted by position and overlapping
/// ranges (or cursors touching a range) are merged.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Selection {
    ranges: Vec<SelectionRange>,
    main: usize,
}

impl Selection {
    /// Build a selection from arbitrary ranges. `main` indexes into `ranges`
    /// before normalization. An empty list yields a cursor at 0.
    pub fn new(ranges: Vec<SelectionRange>, main: usize) -> Self {
        if ranges.is_empty() {
            return Self::cursor(0);
        }
        let main = main.min(ranges.len() - 1);
        let main_range = ranges[main];

        let mut indexed: Vec<(usize, SelectionRange)> = ranges.into_iter().enumerate().collect();
        indexed.sort_by_key(|(_, r)| (r.from(), r.to()));

        let mut merged: Vec<SelectionRange> = Vec::with_capacity(indexed.len());
        let mut new_main = 0;
        for (idx, range) in indexed {
            let overlaps = merged.last().is_some_and(|prev: &SelectionRange| {
                if range.is_empty() {
                    range.from() <= prev.to()
                } else {
                    range.from() < prev.to()
                }
            });
            match merged.last_mut() {
                Some(prev) if overlaps => {
                    let from = prev.from().min(range.from());
                    let to = prev.to().max(range.to());
                    *prev = if prev.is_backwards() || range.is_backwards() {
                        SelectionRange::new(to, from)
                    } else {
                        SelectionRange::new(from, to)
                    };
                }
                _ => merged.push(range),
            }
            if idx == main {
                new_main = merged.len() - 1;
            }
        }

        tracing::trace!(?main_range, ranges = merged.len(), "normalized selection");
        Self {
            ranges: merged,
            main: new_main,
        }
    }

    /// A selection holding one range.
    pub fn single(anchor: usize, head: usize) -> Self {
        Self {
            ranges: vec![SelectionRange::new(anchor, head)],
            main: 0,
        }
    }

    /// A selection holding one collapsed cursor.
    pub fn cursor(offset: usize) -> Self {
        Self::single(offset, offset)
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    pub fn main(&self) -> SelectionRange {
        self.ranges[self.main]
    }

    pub fn main_index(&self) -> usize {
        self.main
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.iter().all(SelectionRange::is_empty)
    }

    /// Map every range through a change set.
    pub fn map(&self, changes: &ChangeSet, affinity: Affinity) -> Self {
        let ranges = self
            .ranges
            .iter()
            .map(|r| r.map(changes, affinity))
            .collect();
        Self::new(ranges, self.main)
    }

    /// Clamp every range into `0..=len`.
    pub fn clamp(&self, len: usize) -> Self {
        let ranges = self
            .ranges
            .iter()
            .map(|r| SelectionRange::new(r.anchor.min(len), r.head.min(len)))
            .collect();
        Self::new(ranges, self.main)
    }
}

impl From<SelectionRange> for Selection {
    fn from(range: SelectionRange) -> Self {
        Self {
            ranges: vec![range],
            main: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_bounds() {
        // Forward range
        let range = SelectionRange::new(5, 10);
        assert_eq!(range.from(), 5);
        assert_eq!(range.to(), 10);
        assert!(!range.is_backwards());

        // Backward range
        let range = SelectionRange::new(10, 5);
        assert_eq!(range.from(), 5);
        assert_eq!(range.to(), 10);
        assert!(range.is_backwards());
    }

    #[test]
    fn test_range_cursor() {
        let range = SelectionRange::cursor(7);
        assert!(range.is_empty());
        assert_eq!(range.len(), 0);
        assert_eq!(range.to_range(), 7..7);
    }

    #[test]
    fn test_selection_sorts_ranges() {
        let sel = Selection::new(
            vec![SelectionRange::new(10, 12), SelectionRange::new(0, 3)],
            0,
        );
        assert_eq!(
            sel.ranges(),
            &[SelectionRange::new(0, 3), SelectionRange::new(10, 12)]
        );
        // Main range follows its range through the sort.
        assert_eq!(sel.main(), SelectionRange::new(10, 12));
    }

    #[test]
    fn test_selection_merges_overlaps() {
        let sel = Selection::new(
            vec![
                SelectionRange::new(0, 5),
                SelectionRange::new(3, 8),
                SelectionRange::cursor(8),
            ],
            2,
        );
        assert_eq!(sel.ranges(), &[SelectionRange::new(0, 8)]);
        assert_eq!(sel.main_index(), 0);
    }

    #[test]
    fn test_touching_ranges_stay_separate() {
        let sel = Selection::new(
            vec![SelectionRange::new(0, 5), SelectionRange::new(5, 9)],
            0,
        );
        assert_eq!(sel.len(), 2);
    }

    #[test]
    fn test_empty_ranges_list_is_cursor() {
        let sel = Selection::new(Vec::new(), 3);
        assert_eq!(sel.main(), SelectionRange::cursor(0));
    }
}
