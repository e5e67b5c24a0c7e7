//! Value types shared by the design representation.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One piece of a unit's bar, occupying `[start, end)` inside a column.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Segment {
    /// Population unit that owns this piece.
    pub unit: usize,
    /// Lower edge, in `[0, 1)`.
    pub start: f64,
    /// Upper edge, in `(start, 1]`.
    pub end: f64,
}

impl Segment {
    /// Creates a segment.
    pub fn new(unit: usize, start: f64, end: f64) -> Self {
        Self { unit, start, end }
    }

    /// Length of the segment (its share of the unit's probability).
    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    /// Whether the segment has no extent.
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Overlap length with `[start, end)`.
    pub fn overlap(&self, start: f64, end: f64) -> f64 {
        (self.end.min(end) - self.start.max(start)).max(0.0)
    }
}

/// An elementary FIP-preserving move.
///
/// Inside `column`, the piece of `unit_a` at `[at_a, at_a + amount)` and
/// the piece of `unit_b` at `[at_b, at_b + amount)` trade places. Both
/// units keep their total length and the column keeps its occupancy, but
/// the heights each unit covers change, and with them the SIP.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Switch {
    /// First unit.
    pub unit_a: usize,
    /// Second unit.
    pub unit_b: usize,
    /// Column in which both pieces live.
    pub column: usize,
    /// Length of the exchanged pieces.
    pub amount: f64,
    /// Lower edge of the moved piece of `unit_a`.
    pub at_a: f64,
    /// Lower edge of the moved piece of `unit_b`.
    pub at_b: f64,
}

impl Switch {
    /// Creates a switch.
    pub fn new(
        unit_a: usize,
        unit_b: usize,
        column: usize,
        amount: f64,
        at_a: f64,
        at_b: f64,
    ) -> Self {
        Self {
            unit_a,
            unit_b,
            column,
            amount,
            at_a,
            at_b,
        }
    }

    /// The switch that undoes this one.
    ///
    /// After `self` is applied, `unit_a` sits at `at_b` and `unit_b` at
    /// `at_a`; swapping them back restores the original layout.
    pub fn inverse(&self) -> Self {
        Self {
            at_a: self.at_b,
            at_b: self.at_a,
            ..*self
        }
    }
}

/// One bar piece as handed to a renderer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BarSegment {
    /// Owning unit.
    pub unit: usize,
    /// Lower edge in the column.
    pub start: f64,
    /// Segment length.
    pub length: f64,
}

/// Segments of one column, ordered bottom to top.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ColumnBars {
    /// Column index.
    pub column: usize,
    /// Occupied length.
    pub occupied: f64,
    /// Segments, sorted by `start`.
    pub segments: Vec<BarSegment>,
}

/// Snapshot of a design's geometry for external plotting.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BarLayout {
    /// Population size.
    pub num_units: usize,
    /// Target inclusion probabilities.
    pub fip: Vec<f64>,
    /// One entry per draw-column.
    pub columns: Vec<ColumnBars>,
}
