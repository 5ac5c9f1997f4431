#![forbid(unsafe_code)]

//! Proportional grid layout.
//!
//! This crate provides the shared measure/arrange core used by every
//! container that arranges children spatially:
//!
//! - [`GridLayoutEngine`] - resolves column/row [`Proportion`]s and cell
//!   spans into pixel geometry
//! - [`Grid`] - 2D container with hover/selection cell geometry
//! - [`StackPanel`] - single-axis specialization
//! - [`SplitPane`] - alternating content/handle tracks with interactive
//!   proportion dragging
//!
//! # Sizing model
//!
//! Each column and row declares a [`Proportion`]: a fixed pixel extent,
//! a content-driven `Auto` extent, a weighted share of the space left
//! over (`Part`), or "absorb whatever remains" (`Fill`). The engine
//! resolves them in that order and guarantees that, whenever the tracks
//! underfill the available extent, the resolved sizes plus spacing sum
//! to the available extent exactly.
//!
//! ```
//! use weft_layout::{GridLayoutEngine, Proportion, CellPosition};
//! use weft_core::{Rect, Size};
//!
//! let mut engine = GridLayoutEngine::new();
//! engine.add_column(Proportion::pixels(150.0).unwrap());
//! engine.add_column(Proportion::part(1.0).unwrap());
//! engine.add_column(Proportion::fill());
//! engine.add_row(Proportion::fill());
//!
//! let cells = [CellPosition::new(0, 0), CellPosition::new(1, 0)];
//! engine.measure(Size::new(900, 300), &cells, |_, c| c);
//! engine.arrange(Rect::new(0, 0, 900, 300), &cells, |_, _| {});
//! assert_eq!(engine.column_width(0), 150);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod engine;
pub mod grid;
pub mod split;
pub mod stack;

pub use engine::{GridLayoutEngine, LayoutResult};
pub use grid::{Grid, GridCell, GridSelectionMode};
pub use split::{SplitPane, SplitPaneSnapshot};
pub use stack::StackPanel;
pub use weft_core::{LayoutNode, Point, Rect, Size, UNBOUNDED};

/// The sizing policy of one track (column or row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProportionKind {
    /// Track sized to its content's measured extent.
    #[default]
    Auto,
    /// Track sized to a fixed pixel value (the proportion's weight).
    Pixels,
    /// Track sized to a weighted share of the space remaining after
    /// `Auto`/`Pixels` allocation.
    Part,
    /// Track that absorbs whatever remains after `Part` allocation.
    Fill,
}

/// Sizing policy plus weight for one track.
///
/// The weight's meaning depends on the kind: ignored for `Auto` and
/// `Fill`, an absolute pixel extent for `Pixels`, a relative share for
/// `Part`. The weight is always finite and non-negative; a negative or
/// non-finite weight is a configuration error and is rejected up front
/// rather than clamped, since it cannot arise from normal interactive
/// use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Proportion {
    kind: ProportionKind,
    weight: f32,
}

impl Default for Proportion {
    fn default() -> Self {
        Self::auto()
    }
}

impl Proportion {
    /// A content-sized track.
    #[inline]
    #[must_use]
    pub const fn auto() -> Self {
        Self {
            kind: ProportionKind::Auto,
            weight: 1.0,
        }
    }

    /// A track that absorbs remaining space.
    #[inline]
    #[must_use]
    pub const fn fill() -> Self {
        Self {
            kind: ProportionKind::Fill,
            weight: 1.0,
        }
    }

    /// A fixed-size track of `px` pixels.
    pub fn pixels(px: f32) -> Result<Self, LayoutError> {
        Self::with_weight(ProportionKind::Pixels, px)
    }

    /// A weighted track receiving `weight / Σweight` of the remaining space.
    pub fn part(weight: f32) -> Result<Self, LayoutError> {
        Self::with_weight(ProportionKind::Part, weight)
    }

    /// Create a proportion with an explicit kind and weight.
    pub fn with_weight(kind: ProportionKind, weight: f32) -> Result<Self, LayoutError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(LayoutError::InvalidWeight { weight });
        }
        Ok(Self { kind, weight })
    }

    /// Internal constructor for weights already validated by the caller.
    pub(crate) const fn part_unchecked(weight: f32) -> Self {
        Self {
            kind: ProportionKind::Part,
            weight,
        }
    }

    /// Internal constructor for pixel extents already validated by the
    /// caller.
    pub(crate) const fn pixels_unchecked(px: f32) -> Self {
        Self {
            kind: ProportionKind::Pixels,
            weight: px,
        }
    }

    /// The sizing policy.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> ProportionKind {
        self.kind
    }

    /// The weight (pixels for `Pixels`, relative share for `Part`).
    #[inline]
    #[must_use]
    pub const fn weight(&self) -> f32 {
        self.weight
    }

    /// Change the sizing policy. Returns whether the value changed, so
    /// the owning container can invalidate its cached layout.
    pub fn set_kind(&mut self, kind: ProportionKind) -> bool {
        if self.kind == kind {
            return false;
        }
        self.kind = kind;
        true
    }

    /// Change the weight. Returns whether the value changed; a negative
    /// or non-finite weight fails fast.
    pub fn set_weight(&mut self, weight: f32) -> Result<bool, LayoutError> {
        if !weight.is_finite() || weight < 0.0 {
            return Err(LayoutError::InvalidWeight { weight });
        }
        if self.weight == weight {
            return Ok(false);
        }
        self.weight = weight;
        Ok(true)
    }
}

/// Logical grid placement attached to one child.
///
/// Spans are clamped at solve time: a zero span counts as 1, and a span
/// reaching past the last defined track stops at the grid edge. A start
/// index past the last track is not an error either; the child degrades
/// to a zero-size rectangle at the grid's trailing edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellPosition {
    /// Zero-based column index.
    pub column: usize,
    /// Zero-based row index.
    pub row: usize,
    /// Number of columns occupied (treated as at least 1).
    pub column_span: usize,
    /// Number of rows occupied (treated as at least 1).
    pub row_span: usize,
}

impl Default for CellPosition {
    fn default() -> Self {
        Self {
            column: 0,
            row: 0,
            column_span: 1,
            row_span: 1,
        }
    }
}

impl CellPosition {
    /// Place a child in a single cell.
    #[inline]
    #[must_use]
    pub const fn new(column: usize, row: usize) -> Self {
        Self {
            column,
            row,
            column_span: 1,
            row_span: 1,
        }
    }

    /// Set the column span.
    #[inline]
    #[must_use]
    pub const fn with_column_span(mut self, span: usize) -> Self {
        self.column_span = span;
        self
    }

    /// Set the row span.
    #[inline]
    #[must_use]
    pub const fn with_row_span(mut self, span: usize) -> Self {
        self.row_span = span;
        self
    }
}

/// The axis a single-axis container stacks along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    /// Top to bottom.
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
}

/// Configuration errors.
///
/// Runtime inputs (spans, pointer samples, undersized areas) never
/// error; they degrade gracefully. Only genuinely invalid construction
/// input is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A proportion weight was negative or non-finite.
    InvalidWeight { weight: f32 },
    /// A spacing value was negative.
    InvalidSpacing { spacing: i32 },
    /// A split-pane handle size was negative.
    InvalidHandleSize { size: i32 },
    /// A splitter index referenced a handle that does not exist.
    SplitterOutOfRange { index: usize, handles: usize },
    /// A snapshot's splitter count does not match the pane's.
    SnapshotMismatch { expected: usize, actual: usize },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidWeight { weight } => {
                write!(f, "proportion weight must be finite and >= 0, got {weight}")
            }
            Self::InvalidSpacing { spacing } => {
                write!(f, "track spacing must be >= 0, got {spacing}")
            }
            Self::InvalidHandleSize { size } => {
                write!(f, "split handle size must be >= 0, got {size}")
            }
            Self::SplitterOutOfRange { index, handles } => {
                write!(f, "splitter index {index} out of range ({handles} handles)")
            }
            Self::SnapshotMismatch { expected, actual } => {
                write!(
                    f,
                    "snapshot has {actual} splitter positions, pane has {expected}"
                )
            }
        }
    }
}

impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportion_defaults_to_auto() {
        let p = Proportion::default();
        assert_eq!(p.kind(), ProportionKind::Auto);
    }

    #[test]
    fn proportion_rejects_negative_weight() {
        assert!(matches!(
            Proportion::part(-1.0),
            Err(LayoutError::InvalidWeight { .. })
        ));
        assert!(matches!(
            Proportion::pixels(-0.5),
            Err(LayoutError::InvalidWeight { .. })
        ));
    }

    #[test]
    fn proportion_rejects_non_finite_weight() {
        assert!(Proportion::part(f32::NAN).is_err());
        assert!(Proportion::pixels(f32::INFINITY).is_err());
    }

    #[test]
    fn proportion_set_weight_reports_change() {
        let mut p = Proportion::part(1.0).unwrap();
        assert!(!p.set_weight(1.0).unwrap());
        assert!(p.set_weight(2.0).unwrap());
        assert_eq!(p.weight(), 2.0);
        assert!(p.set_weight(-3.0).is_err());
        // Rejected update leaves the value untouched.
        assert_eq!(p.weight(), 2.0);
    }

    #[test]
    fn proportion_set_kind_reports_change() {
        let mut p = Proportion::auto();
        assert!(!p.set_kind(ProportionKind::Auto));
        assert!(p.set_kind(ProportionKind::Fill));
        assert_eq!(p.kind(), ProportionKind::Fill);
    }

    #[test]
    fn cell_position_defaults() {
        let c = CellPosition::default();
        assert_eq!((c.column, c.row, c.column_span, c.row_span), (0, 0, 1, 1));
    }

    #[test]
    fn cell_position_builder() {
        let c = CellPosition::new(2, 3).with_column_span(4).with_row_span(2);
        assert_eq!((c.column, c.row, c.column_span, c.row_span), (2, 3, 4, 2));
    }

    #[test]
    fn layout_error_display() {
        let err = LayoutError::InvalidSpacing { spacing: -2 };
        assert_eq!(err.to_string(), "track spacing must be >= 0, got -2");
    }

    #[test]
    fn proportion_serde_round_trip() {
        let p = Proportion::part(2.5).unwrap();
        let json = serde_json::to_string(&p).unwrap();
        let back: Proportion = serde_json::from_str(&json).unwrap();
        assert_eq!(p, back);
    }
}
