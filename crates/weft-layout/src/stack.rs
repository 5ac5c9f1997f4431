#![forbid(unsafe_code)]

//! Single-axis stacking container.
//!
//! [`StackPanel`] lays its children along one [`Orientation`], each with
//! its own [`Proportion`] (default `Auto`). The cross axis is a single
//! `Fill` track, so every child stretches to the panel's full cross
//! extent. Internally this is a one-column (or one-row) grid; all solve
//! behavior, spacing, and degradation rules come from the engine.

use weft_core::geometry::{Rect, Size};
use weft_core::node::LayoutNode;

use crate::engine::GridLayoutEngine;
use crate::{CellPosition, LayoutError, Orientation, Proportion};

/// Stacking container.
pub struct StackPanel<W> {
    engine: GridLayoutEngine,
    children: Vec<(W, Proportion)>,
    orientation: Orientation,
    bounds: Rect,
    tracks_stale: bool,
}

impl<W> std::fmt::Debug for StackPanel<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackPanel")
            .field("orientation", &self.orientation)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl<W> Default for StackPanel<W> {
    fn default() -> Self {
        Self::new(Orientation::default())
    }
}

impl<W> StackPanel<W> {
    /// Create an empty panel stacking along `orientation`.
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            engine: GridLayoutEngine::new(),
            children: Vec::new(),
            orientation,
            bounds: Rect::default(),
            tracks_stale: true,
        }
    }

    /// Append a content-sized child.
    pub fn add_child(&mut self, child: W) {
        self.add_child_with(child, Proportion::auto());
    }

    /// Append a child with an explicit proportion.
    pub fn add_child_with(&mut self, child: W, proportion: Proportion) {
        self.children.push((child, proportion));
        self.tracks_stale = true;
    }

    /// Remove the child at `index`, returning it. Out of range is a no-op.
    pub fn remove_child(&mut self, index: usize) -> Option<W> {
        if index >= self.children.len() {
            return None;
        }
        let (child, _) = self.children.remove(index);
        self.tracks_stale = true;
        Some(child)
    }

    /// Replace the proportion of the child at `index`. Out of range is a
    /// no-op.
    pub fn set_proportion(&mut self, index: usize, proportion: Proportion) {
        if let Some(slot) = self.children.get_mut(index)
            && slot.1 != proportion
        {
            slot.1 = proportion;
            self.tracks_stale = true;
        }
    }

    /// The stacking axis.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Change the stacking axis.
    pub fn set_orientation(&mut self, orientation: Orientation) {
        if self.orientation != orientation {
            self.orientation = orientation;
            self.tracks_stale = true;
        }
    }

    /// Set the gap between adjacent children.
    pub fn set_spacing(&mut self, spacing: i32) -> Result<(), LayoutError> {
        if spacing < 0 {
            return Err(LayoutError::InvalidSpacing { spacing });
        }
        self.engine.set_column_spacing(spacing)?;
        self.engine.set_row_spacing(spacing)?;
        Ok(())
    }

    /// Number of children.
    #[must_use]
    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Child accessor.
    #[must_use]
    pub fn child(&self, index: usize) -> Option<&W> {
        self.children.get(index).map(|(c, _)| c)
    }

    /// Mutable child accessor.
    pub fn child_mut(&mut self, index: usize) -> Option<&mut W> {
        self.children.get_mut(index).map(|(c, _)| c)
    }

    /// Resolved extent of the child at `index` along the stacking axis.
    #[must_use]
    pub fn child_extent(&self, index: usize) -> i32 {
        match self.orientation {
            Orientation::Vertical => self.engine.row_height(index),
            Orientation::Horizontal => self.engine.column_width(index),
        }
    }

    /// Rebuild the engine's track lists from the child proportions.
    fn sync_tracks(&mut self) {
        if !self.tracks_stale {
            return;
        }
        self.engine.clear_columns();
        self.engine.clear_rows();
        match self.orientation {
            Orientation::Vertical => {
                self.engine.add_column(Proportion::fill());
                for (_, p) in &self.children {
                    self.engine.add_row(*p);
                }
            }
            Orientation::Horizontal => {
                self.engine.add_row(Proportion::fill());
                for (_, p) in &self.children {
                    self.engine.add_column(*p);
                }
            }
        }
        self.tracks_stale = false;
    }

    fn cells(&self) -> Vec<CellPosition> {
        let vertical = self.orientation == Orientation::Vertical;
        (0..self.children.len())
            .map(|i| {
                if vertical {
                    CellPosition::new(0, i)
                } else {
                    CellPosition::new(i, 0)
                }
            })
            .collect()
    }
}

impl<W: LayoutNode> LayoutNode for StackPanel<W> {
    fn measure(&mut self, constraint: Size) -> Size {
        self.sync_tracks();
        let cells = self.cells();
        let children = &mut self.children;
        self.engine
            .measure(constraint, &cells, |i, c| children[i].0.measure(c))
    }

    fn arrange(&mut self, bounds: Rect) {
        if self.tracks_stale || self.engine.is_dirty() || self.bounds.size() != bounds.size() {
            self.measure(bounds.size());
        }
        self.bounds = bounds;
        let cells = self.cells();
        let children = &mut self.children;
        self.engine
            .arrange(bounds, &cells, |i, rect| children[i].0.arrange(rect));
    }
}
