//! Character-offset spans over a text.

use serde::{Deserialize, Serialize};

use crate::entities::Entity;

/// A half-open `[start, end)` interval of a text, in characters, plus the
/// term that matched and the entity it resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub term: String,
    pub entity: Entity,
}

impl Span {
    pub fn new(start: usize, end: usize, term: impl Into<String>, entity: Entity) -> Self {
        debug_assert!(start < end, "span must be non-empty: {start}..{end}");
        Self {
            start,
            end,
            term: term.into(),
            entity,
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Same offsets, regardless of payload.
    pub fn same_extent(&self, other: &Span) -> bool {
        self.start == other.start && self.end == other.end
    }

    /// `other` lies within `self` (identical extents included).
    pub fn contains(&self, other: &Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// `other` lies within `self` and the extents differ.
    pub fn strictly_contains(&self, other: &Span) -> bool {
        self.contains(other) && !self.same_extent(other)
    }

    pub fn overlaps(&self, other: &Span) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The covered slice of `text`, assuming `text` is the text this span was
    /// produced from.
    pub fn slice(&self, text: &str) -> String {
        text.chars().skip(self.start).take(self.len()).collect()
    }
}
