#![forbid(unsafe_code)]

//! 2D grid container with hover and selection geometry.
//!
//! [`Grid`] owns its children together with their [`CellPosition`]s and
//! delegates all sizing to [`GridLayoutEngine`]. On top of the layout it
//! tracks which cell the pointer is over and which cell (or row, or
//! column) is selected, reporting changes through optional callbacks.
//!
//! Hit testing splits the spacing between two tracks down the middle, so
//! a pointer inside a gap still resolves to the nearer track and hover
//! never flickers to "none" while crossing a gap.

use serde::{Deserialize, Serialize};
use weft_core::geometry::{Point, Rect, Size};
use weft_core::node::LayoutNode;

use crate::engine::GridLayoutEngine;
use crate::{CellPosition, Proportion};

/// A single cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    /// Zero-based column index.
    pub column: usize,
    /// Zero-based row index.
    pub row: usize,
}

impl GridCell {
    /// Create a cell coordinate.
    #[inline]
    #[must_use]
    pub const fn new(column: usize, row: usize) -> Self {
        Self { column, row }
    }
}

/// What a pointer press selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSelectionMode {
    /// Presses never change the selection.
    #[default]
    Disabled,
    /// A press selects the whole row under the pointer.
    Row,
    /// A press selects the whole column under the pointer.
    Column,
    /// A press selects the single cell under the pointer.
    Cell,
}

type CellCallback = Box<dyn FnMut(Option<GridCell>)>;

/// Grid container.
///
/// Children are appended with an explicit [`CellPosition`]; the track
/// lists live on the embedded engine and are exposed through
/// [`engine_mut`](Self::engine_mut).
pub struct Grid<W> {
    engine: GridLayoutEngine,
    children: Vec<(W, CellPosition)>,
    bounds: Rect,
    hovered: Option<GridCell>,
    selected: Option<GridCell>,
    selection_mode: GridSelectionMode,
    allow_empty_selection: bool,
    on_hover_changed: Option<CellCallback>,
    on_selection_changed: Option<CellCallback>,
}

impl<W> std::fmt::Debug for Grid<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grid")
            .field("children", &self.children.len())
            .field("hovered", &self.hovered)
            .field("selected", &self.selected)
            .field("selection_mode", &self.selection_mode)
            .finish_non_exhaustive()
    }
}

impl<W> Default for Grid<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W> Grid<W> {
    /// Create an empty grid with no tracks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine: GridLayoutEngine::new(),
            children: Vec::new(),
            bounds: Rect::default(),
            hovered: None,
            selected: None,
            selection_mode: GridSelectionMode::default(),
            allow_empty_selection: false,
            on_hover_changed: None,
            on_selection_changed: None,
        }
    }

    /// Append a column track (builder form).
    #[must_use]
    pub fn with_column(mut self, proportion: Proportion) -> Self {
        self.engine.add_column(proportion);
        self
    }

    /// Append a row track (builder form).
    #[must_use]
    pub fn with_row(mut self, proportion: Proportion) -> Self {
        self.engine.add_row(proportion);
        self
    }

    /// Append a child at the given cell.
    pub fn add_child(&mut self, child: W, cell: CellPosition) {
        self.children.push((child, cell));
        self.engine.invalidate();
    }

    /// Remove the child at `index`, returning it. Out of range is a no-op.
    pub fn remove_child(&mut self, index: usize) -> Option<W> {
        if index >= self.children.len() {
            return None;
        }
        let (child, _) = self.children.remove(index);
        self.engine.invalidate();
        Some(child)
    }

    /// Move the child at `index` to a different cell.
    pub fn set_cell(&mut self, index: usize, cell: CellPosition) {
        if let Some(slot) = self.children.get_mut(index)
            && slot.1 != cell
        {
            slot.1 = cell;
            self.engine.invalidate();
        }
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

    /// The embedded layout engine (tracks, spacing, solved geometry).
    #[must_use]
    pub fn engine(&self) -> &GridLayoutEngine {
        &self.engine
    }

    /// Mutable engine access for track and spacing configuration.
    pub fn engine_mut(&mut self) -> &mut GridLayoutEngine {
        &mut self.engine
    }

    /// Set what a pointer press selects.
    pub fn set_selection_mode(&mut self, mode: GridSelectionMode) {
        self.selection_mode = mode;
        if mode == GridSelectionMode::Disabled {
            self.set_selected(None);
        }
    }

    /// Current selection mode.
    #[must_use]
    pub const fn selection_mode(&self) -> GridSelectionMode {
        self.selection_mode
    }

    /// Allow a press on the already-selected cell to clear the selection.
    pub fn set_allow_empty_selection(&mut self, allow: bool) {
        self.allow_empty_selection = allow;
    }

    /// Invoke `callback` whenever the hovered cell changes.
    pub fn on_hover_changed(&mut self, callback: impl FnMut(Option<GridCell>) + 'static) {
        self.on_hover_changed = Some(Box::new(callback));
    }

    /// Invoke `callback` whenever the selected cell changes.
    pub fn on_selection_changed(&mut self, callback: impl FnMut(Option<GridCell>) + 'static) {
        self.on_selection_changed = Some(Box::new(callback));
    }

    /// The cell currently under the pointer, if any.
    #[must_use]
    pub const fn hovered_cell(&self) -> Option<GridCell> {
        self.hovered
    }

    /// The selected cell anchor, if any. In `Row`/`Column` mode this is
    /// the cell that was pressed; the whole row or column is selected.
    #[must_use]
    pub const fn selected_cell(&self) -> Option<GridCell> {
        self.selected
    }

    /// Whether `cell` falls inside the current selection under the
    /// active selection mode.
    #[must_use]
    pub fn is_selected(&self, cell: GridCell) -> bool {
        let Some(sel) = self.selected else {
            return false;
        };
        match self.selection_mode {
            GridSelectionMode::Disabled => false,
            GridSelectionMode::Row => sel.row == cell.row,
            GridSelectionMode::Column => sel.column == cell.column,
            GridSelectionMode::Cell => sel == cell,
        }
    }

    /// Rectangle of a single cell in the arranged geometry.
    #[must_use]
    pub fn cell_rectangle(&self, cell: GridCell) -> Rect {
        self.engine.cell_rectangle(cell.column, cell.row)
    }

    /// The cell under `point`, with gap spacing split between the
    /// neighboring tracks. `None` when the point lies outside the grid.
    #[must_use]
    pub fn cell_at(&self, point: Point) -> Option<GridCell> {
        if !self.bounds.contains(point) {
            return None;
        }
        let column = hit_track(
            self.engine.grid_lines_x(),
            self.engine.result()?.column_widths(),
            self.engine.column_spacing(),
            point.x,
        )?;
        let row = hit_track(
            self.engine.grid_lines_y(),
            self.engine.result()?.row_heights(),
            self.engine.row_spacing(),
            point.y,
        )?;
        Some(GridCell::new(column, row))
    }

    /// Report a pointer position; updates the hovered cell.
    pub fn pointer_moved(&mut self, point: Point) {
        let cell = self.cell_at(point);
        if cell != self.hovered {
            self.hovered = cell;
            if let Some(cb) = self.on_hover_changed.as_mut() {
                cb(cell);
            }
        }
    }

    /// Report the pointer leaving the grid; clears hover.
    pub fn pointer_left(&mut self) {
        if self.hovered.is_some() {
            self.hovered = None;
            if let Some(cb) = self.on_hover_changed.as_mut() {
                cb(None);
            }
        }
    }

    /// Report a pointer press; updates the selection per the selection
    /// mode. A press outside the grid, or in `Disabled` mode, changes
    /// nothing.
    pub fn pointer_pressed(&mut self, point: Point) {
        if self.selection_mode == GridSelectionMode::Disabled {
            return;
        }
        let Some(cell) = self.cell_at(point) else {
            return;
        };
        if self.allow_empty_selection && self.is_selected(cell) {
            self.set_selected(None);
        } else {
            self.set_selected(Some(cell));
        }
    }

    fn set_selected(&mut self, cell: Option<GridCell>) {
        if cell != self.selected {
            self.selected = cell;
            if let Some(cb) = self.on_selection_changed.as_mut() {
                cb(cell);
            }
        }
    }

    fn cells(&self) -> Vec<CellPosition> {
        self.children.iter().map(|(_, c)| *c).collect()
    }
}

impl<W: LayoutNode> LayoutNode for Grid<W> {
    fn measure(&mut self, constraint: Size) -> Size {
        let cells = self.cells();
        let children = &mut self.children;
        self.engine
            .measure(constraint, &cells, |i, c| children[i].0.measure(c))
    }

    fn arrange(&mut self, bounds: Rect) {
        if self.engine.is_dirty() || self.bounds.size() != bounds.size() {
            self.measure(bounds.size());
        }
        self.bounds = bounds;
        let cells = self.cells();
        let children = &mut self.children;
        self.engine
            .arrange(bounds, &cells, |i, rect| children[i].0.arrange(rect));
    }
}

/// Resolve a 1D coordinate to a track index. Track `i`'s hit zone runs
/// from its leading edge to the midpoint of the gap after it; the first
/// track's zone starts at the grid's leading edge.
fn hit_track(offsets: &[i32], sizes: &[i32], spacing: i32, pos: i32) -> Option<usize> {
    let n = offsets.len();
    for i in 0..n {
        let end = if i + 1 < n {
            offsets[i] + sizes[i] + (spacing + 1) / 2
        } else {
            offsets[i] + sizes[i]
        };
        if pos < end {
            return Some(i);
        }
    }
    None
}
