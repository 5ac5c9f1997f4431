#![forbid(unsafe_code)]

//! Split-pane container with draggable dividers.
//!
//! [`SplitPane`] shows `k` panes separated by `k - 1` fixed-size handle
//! tracks. Internally it synthesizes `2k - 1` tracks along its axis:
//! content tracks at even indices, `Pixels` handle tracks at odd
//! indices. Content tracks default to `Part(1.0)` except the last,
//! which defaults to `Fill` so the pane always covers the full extent.
//!
//! Dragging a handle rewrites the weights of the two content tracks it
//! separates. The pixel displacement since drag start is converted to
//! weight space at the rate `total part weight / content space`, and
//! the pair's weight sum is preserved exactly on every accepted sample.
//! A sample that would drive either weight negative is dropped; the
//! next sample is evaluated fresh, so the handle simply sticks at the
//! end stop. A `Fill` neighbor is converted to an equivalent `Part`
//! when a drag or position write first touches it, since only `Part`
//! weights enter the weighted solve.
//!
//! Splitter positions are also exposed as fractions of the total weight
//! ([`splitter_position`](SplitPane::splitter_position) /
//! [`set_splitter_position`](SplitPane::set_splitter_position)), which
//! is what [`SplitPaneSnapshot`] persists: a saved layout restores
//! correctly at any pane size because no pixel values are stored.

use serde::{Deserialize, Serialize};
use weft_core::geometry::{Point, Rect, Size};
use weft_core::logging::debug;
use weft_core::node::LayoutNode;

use crate::engine::GridLayoutEngine;
use crate::{CellPosition, LayoutError, Orientation, Proportion, ProportionKind};

/// Default divider thickness in pixels.
pub const DEFAULT_HANDLE_SIZE: i32 = 6;

/// An in-progress handle drag.
#[derive(Debug, Clone, Copy)]
struct HandleDrag {
    handle: usize,
    start: i32,
    left_weight: f32,
    right_weight: f32,
    /// Weight-space delta per pixel of displacement, fixed at drag start.
    weight_per_pixel: f32,
}

/// Persistable splitter positions, as fractions of the total weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitPaneSnapshot {
    /// One fraction in `0..=1` per handle, in handle order.
    pub positions: Vec<f32>,
}

/// Split container.
pub struct SplitPane<W> {
    engine: GridLayoutEngine,
    children: Vec<W>,
    proportions: Vec<Proportion>,
    orientation: Orientation,
    handle_size: i32,
    bounds: Rect,
    drag: Option<HandleDrag>,
    on_proportions_changed: Option<Box<dyn FnMut()>>,
    tracks_stale: bool,
}

impl<W> std::fmt::Debug for SplitPane<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplitPane")
            .field("orientation", &self.orientation)
            .field("panes", &self.children.len())
            .field("handle_size", &self.handle_size)
            .field("dragging", &self.drag.is_some())
            .finish_non_exhaustive()
    }
}

impl<W> Default for SplitPane<W> {
    fn default() -> Self {
        Self::new(Orientation::Horizontal)
    }
}

impl<W> SplitPane<W> {
    /// Create an empty pane splitting along `orientation`.
    ///
    /// `Horizontal` places panes side by side with vertical dividers;
    /// `Vertical` stacks panes with horizontal dividers.
    #[must_use]
    pub fn new(orientation: Orientation) -> Self {
        Self {
            engine: GridLayoutEngine::new(),
            children: Vec::new(),
            proportions: Vec::new(),
            orientation,
            handle_size: DEFAULT_HANDLE_SIZE,
            bounds: Rect::default(),
            drag: None,
            on_proportions_changed: None,
            tracks_stale: true,
        }
    }

    /// Append a pane. The new pane becomes the trailing `Fill` track;
    /// the previous trailing pane, if it was still `Fill`, becomes
    /// `Part(1.0)`.
    pub fn add_pane(&mut self, child: W) {
        if let Some(last) = self.proportions.last_mut()
            && last.kind() == ProportionKind::Fill
        {
            *last = Proportion::part_unchecked(1.0);
        }
        self.children.push(child);
        self.proportions.push(Proportion::fill());
        self.tracks_stale = true;
    }

    /// Remove the pane at `index`, returning it. Out of range is a no-op.
    ///
    /// Removing the trailing pane while it is still the default `Fill`
    /// promotes the new last pane to `Fill`, keeping the trailing
    /// absorber in place. A trailing pane that a drag or position write
    /// already converted to `Part` leaves the remaining weights as they
    /// are.
    pub fn remove_pane(&mut self, index: usize) -> Option<W> {
        if index >= self.children.len() {
            return None;
        }
        let removed = self.proportions.remove(index);
        if index == self.proportions.len()
            && removed.kind() == ProportionKind::Fill
            && let Some(last) = self.proportions.last_mut()
        {
            *last = Proportion::fill();
        }
        self.drag = None;
        self.tracks_stale = true;
        Some(self.children.remove(index))
    }

    /// Number of panes.
    #[must_use]
    pub fn pane_count(&self) -> usize {
        self.children.len()
    }

    /// Number of drag handles (`pane_count - 1`).
    #[must_use]
    pub fn handle_count(&self) -> usize {
        self.children.len().saturating_sub(1)
    }

    /// Pane accessor.
    #[must_use]
    pub fn pane(&self, index: usize) -> Option<&W> {
        self.children.get(index)
    }

    /// Mutable pane accessor.
    pub fn pane_mut(&mut self, index: usize) -> Option<&mut W> {
        self.children.get_mut(index)
    }

    /// The split axis.
    #[must_use]
    pub const fn orientation(&self) -> Orientation {
        self.orientation
    }

    /// Divider thickness in pixels.
    #[must_use]
    pub const fn handle_size(&self) -> i32 {
        self.handle_size
    }

    /// Set the divider thickness.
    pub fn set_handle_size(&mut self, size: i32) -> Result<(), LayoutError> {
        if size < 0 {
            return Err(LayoutError::InvalidHandleSize { size });
        }
        if self.handle_size != size {
            self.handle_size = size;
            self.tracks_stale = true;
        }
        Ok(())
    }

    /// Invoke `callback` after every accepted proportion update (drag
    /// sample, position write, snapshot restore).
    pub fn on_proportions_changed(&mut self, callback: impl FnMut() + 'static) {
        self.on_proportions_changed = Some(Box::new(callback));
    }

    /// Rectangle of handle `index` in the arranged geometry.
    #[must_use]
    pub fn handle_rectangle(&self, index: usize) -> Rect {
        let track = 2 * index + 1;
        match self.orientation {
            Orientation::Horizontal => self.engine.span_rectangle(track, 0, 1, 1),
            Orientation::Vertical => self.engine.span_rectangle(0, track, 1, 1),
        }
    }

    /// The handle under `point`, if any.
    #[must_use]
    pub fn handle_at(&self, point: Point) -> Option<usize> {
        (0..self.handle_count()).find(|&j| self.handle_rectangle(j).contains(point))
    }

    /// Whether a drag is in progress.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Start a drag if `point` is over a handle. Returns whether a drag
    /// began.
    pub fn begin_drag(&mut self, point: Point) -> bool {
        let Some(handle) = self.handle_at(point) else {
            return false;
        };
        self.normalize_fill(handle);
        self.normalize_fill(handle + 1);

        let content_space: i64 = (0..self.children.len())
            .map(|i| i64::from(self.content_extent(i)))
            .sum();
        let total_part_weight: f32 = self
            .proportions
            .iter()
            .filter(|p| p.kind() == ProportionKind::Part)
            .map(Proportion::weight)
            .sum();
        let weight_per_pixel = if content_space > 0 {
            total_part_weight / content_space as f32
        } else {
            0.0
        };

        self.drag = Some(HandleDrag {
            handle,
            start: self.axis_coordinate(point),
            left_weight: self.proportions[handle].weight(),
            right_weight: self.proportions[handle + 1].weight(),
            weight_per_pixel,
        });
        debug!(handle, weight_per_pixel, "split drag started");
        true
    }

    /// Feed a pointer sample into the active drag. Returns whether the
    /// sample was accepted; a sample that would drive either neighbor's
    /// weight negative is dropped without changing anything.
    pub fn drag_to(&mut self, point: Point) -> bool {
        let Some(drag) = self.drag else {
            return false;
        };
        let delta_px = self.axis_coordinate(point) - drag.start;
        let delta_weight = delta_px as f32 * drag.weight_per_pixel;
        let pair_sum = drag.left_weight + drag.right_weight;
        let new_left = drag.left_weight + delta_weight;
        let new_right = pair_sum - new_left;
        if new_left < 0.0 || new_right < 0.0 {
            return false;
        }
        self.proportions[drag.handle] = Proportion::part_unchecked(new_left);
        self.proportions[drag.handle + 1] = Proportion::part_unchecked(new_right);
        self.tracks_stale = true;
        self.notify_proportions_changed();
        true
    }

    /// Finish the active drag.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Position of handle `index` as a fraction of the total weight,
    /// in `0..=1`.
    pub fn splitter_position(&self, index: usize) -> Result<f32, LayoutError> {
        let handles = self.handle_count();
        if index >= handles {
            return Err(LayoutError::SplitterOutOfRange { index, handles });
        }
        let weights = self.effective_weights();
        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return Ok((index + 1) as f32 / self.children.len() as f32);
        }
        Ok(weights[..=index].iter().sum::<f32>() / total)
    }

    /// Move handle `index` to `fraction` of the total weight by
    /// rewriting the two neighboring weights, preserving their sum. The
    /// fraction is clamped so neither neighbor goes negative.
    pub fn set_splitter_position(&mut self, index: usize, fraction: f32) -> Result<(), LayoutError> {
        let handles = self.handle_count();
        if index >= handles {
            return Err(LayoutError::SplitterOutOfRange { index, handles });
        }
        if !fraction.is_finite() {
            return Err(LayoutError::InvalidWeight { weight: fraction });
        }
        let fraction = fraction.clamp(0.0, 1.0);

        self.normalize_fill(index);
        self.normalize_fill(index + 1);
        let weights = self.effective_weights();
        let total: f32 = weights.iter().sum();
        let pair_sum = weights[index] + weights[index + 1];
        let (new_left, new_right) = if total > 0.0 {
            let before: f32 = weights[..index].iter().sum();
            let left = (fraction * total - before).clamp(0.0, pair_sum);
            (left, pair_sum - left)
        } else {
            (fraction, 1.0 - fraction)
        };
        self.proportions[index] = Proportion::part_unchecked(new_left);
        self.proportions[index + 1] = Proportion::part_unchecked(new_right);
        self.tracks_stale = true;
        self.notify_proportions_changed();
        Ok(())
    }

    /// Capture every splitter position for persistence.
    #[must_use]
    pub fn snapshot(&self) -> SplitPaneSnapshot {
        let positions = (0..self.handle_count())
            .map(|i| self.splitter_position(i).unwrap_or(0.0))
            .collect();
        SplitPaneSnapshot { positions }
    }

    /// Restore splitter positions from a snapshot taken on a pane with
    /// the same number of panes. Positions are clamped into `0..=1` and
    /// forced monotonic, then converted back into content weights.
    pub fn restore(&mut self, snapshot: &SplitPaneSnapshot) -> Result<(), LayoutError> {
        let expected = self.handle_count();
        if snapshot.positions.len() != expected {
            return Err(LayoutError::SnapshotMismatch {
                expected,
                actual: snapshot.positions.len(),
            });
        }
        for &p in &snapshot.positions {
            if !p.is_finite() {
                return Err(LayoutError::InvalidWeight { weight: p });
            }
        }

        let mut previous = 0.0f32;
        for (i, &raw) in snapshot.positions.iter().enumerate() {
            let position = raw.clamp(previous, 1.0);
            self.proportions[i] = Proportion::part_unchecked(position - previous);
            previous = position;
        }
        if let Some(last) = self.proportions.last_mut() {
            *last = Proportion::part_unchecked(1.0 - previous);
        }
        self.tracks_stale = true;
        self.notify_proportions_changed();
        Ok(())
    }

    /// Resolved extent of pane `index` along the split axis.
    #[must_use]
    pub fn pane_extent(&self, index: usize) -> i32 {
        self.content_extent(index)
    }

    fn axis_coordinate(&self, point: Point) -> i32 {
        match self.orientation {
            Orientation::Horizontal => point.x,
            Orientation::Vertical => point.y,
        }
    }

    fn content_extent(&self, pane: usize) -> i32 {
        let track = 2 * pane;
        match self.orientation {
            Orientation::Horizontal => self.engine.column_width(track),
            Orientation::Vertical => self.engine.row_height(track),
        }
    }

    /// Every pane's weight with `Fill` tracks mapped to the `Part`
    /// weight that would produce their currently resolved extent. An
    /// unsolved pane maps `Fill` to `1.0`.
    fn effective_weights(&self) -> Vec<f32> {
        let (part_px, part_weight) = self.part_totals();
        self.proportions
            .iter()
            .enumerate()
            .map(|(i, p)| match p.kind() {
                ProportionKind::Part => p.weight(),
                ProportionKind::Fill => {
                    if part_px > 0 && part_weight > 0.0 {
                        self.content_extent(i) as f32 * part_weight / part_px as f32
                    } else {
                        1.0
                    }
                }
                _ => 0.0,
            })
            .collect()
    }

    fn part_totals(&self) -> (i64, f32) {
        let mut px = 0i64;
        let mut weight = 0.0f32;
        for (i, p) in self.proportions.iter().enumerate() {
            if p.kind() == ProportionKind::Part {
                px += i64::from(self.content_extent(i));
                weight += p.weight();
            }
        }
        (px, weight)
    }

    /// Replace a `Fill` pane with the equivalent `Part` so its weight
    /// participates in the weighted solve.
    fn normalize_fill(&mut self, pane: usize) {
        if self
            .proportions
            .get(pane)
            .is_none_or(|p| p.kind() != ProportionKind::Fill)
        {
            return;
        }
        let weight = self.effective_weights()[pane];
        self.proportions[pane] = Proportion::part_unchecked(weight.max(0.0));
        self.tracks_stale = true;
    }

    fn notify_proportions_changed(&mut self) {
        if let Some(cb) = self.on_proportions_changed.as_mut() {
            cb();
        }
    }

    fn sync_tracks(&mut self) {
        if !self.tracks_stale {
            return;
        }
        self.engine.clear_columns();
        self.engine.clear_rows();
        let handle = Proportion::pixels_unchecked(self.handle_size as f32);
        match self.orientation {
            Orientation::Horizontal => {
                self.engine.add_row(Proportion::fill());
                for (i, &p) in self.proportions.iter().enumerate() {
                    if i > 0 {
                        self.engine.add_column(handle);
                    }
                    self.engine.add_column(p);
                }
            }
            Orientation::Vertical => {
                self.engine.add_column(Proportion::fill());
                for (i, &p) in self.proportions.iter().enumerate() {
                    if i > 0 {
                        self.engine.add_row(handle);
                    }
                    self.engine.add_row(p);
                }
            }
        }
        self.tracks_stale = false;
    }

    fn cells(&self) -> Vec<CellPosition> {
        let horizontal = self.orientation == Orientation::Horizontal;
        (0..self.children.len())
            .map(|i| {
                if horizontal {
                    CellPosition::new(2 * i, 0)
                } else {
                    CellPosition::new(0, 2 * i)
                }
            })
            .collect()
    }
}

impl<W: LayoutNode> LayoutNode for SplitPane<W> {
    fn measure(&mut self, constraint: Size) -> Size {
        self.sync_tracks();
        let cells = self.cells();
        let children = &mut self.children;
        self.engine
            .measure(constraint, &cells, |i, c| children[i].measure(c))
    }

    fn arrange(&mut self, bounds: Rect) {
        if self.tracks_stale || self.engine.is_dirty() || self.bounds.size() != bounds.size() {
            self.measure(bounds.size());
        }
        self.bounds = bounds;
        let cells = self.cells();
        let children = &mut self.children;
        self.engine
            .arrange(bounds, &cells, |i, rect| children[i].arrange(rect));
    }
}
