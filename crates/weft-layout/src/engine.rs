#![forbid(unsafe_code)]

//! The shared measure/arrange solver.
//!
//! [`GridLayoutEngine`] resolves a list of column and row [`Proportion`]s
//! plus per-child [`CellPosition`]s into pixel geometry. Containers feed
//! it a measurement callback (`FnMut(child_index, constraint) -> Size`)
//! at measure time and a placement callback at arrange time; the engine
//! itself never touches widgets.
//!
//! # Solve order (per axis, axes independent)
//!
//! 1. `Pixels` tracks get their declared extent.
//! 2. `Auto` tracks take the maximum measured extent of their
//!    single-span children, then multi-span children grow the `Auto`
//!    tracks inside their span until no child wants more than its span's
//!    total (growth is monotonic and bounded by each child's
//!    measurement, so the loop terminates; a hard round cap guards
//!    against a measurer that keeps inflating its answer).
//! 3. `Part` tracks split what remains by weight (floor), then `Fill`
//!    tracks split what is left after that equally (floor).
//! 4. Rounding leftovers go to the last `Fill` track, else the last
//!    `Part` track, so the track sizes plus spacing sum to the
//!    available extent exactly whenever the tracks underfill it.
//!
//! The solved [`LayoutResult`] is cached behind a dirty flag keyed on
//! the last available size and recomputed lazily on the next query.

use weft_core::geometry::{Point, Rect, Size, UNBOUNDED};
use weft_core::logging::trace;

use crate::{CellPosition, LayoutError, Proportion, ProportionKind};

/// Hard cap on auto-span growth rounds.
const MAX_SPAN_GROWTH_ROUNDS: usize = 64;

/// Resolved track geometry from the most recent measure/arrange cycle.
///
/// Owned by the engine and read-only to callers. Offsets are relative to
/// the measure origin (0) until the first arrange rewrites them against
/// the final bounds.
#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
    column_widths: Vec<i32>,
    row_heights: Vec<i32>,
    column_offsets: Vec<i32>,
    row_offsets: Vec<i32>,
    desired: Size,
}

impl LayoutResult {
    /// Resolved width of every column.
    #[must_use]
    pub fn column_widths(&self) -> &[i32] {
        &self.column_widths
    }

    /// Resolved height of every row.
    #[must_use]
    pub fn row_heights(&self) -> &[i32] {
        &self.row_heights
    }

    /// Leading-edge x position of every column, spacing included.
    #[must_use]
    pub fn column_offsets(&self) -> &[i32] {
        &self.column_offsets
    }

    /// Leading-edge y position of every row, spacing included.
    #[must_use]
    pub fn row_offsets(&self) -> &[i32] {
        &self.row_offsets
    }

    /// Total desired size (track sizes plus spacing).
    #[must_use]
    pub const fn desired(&self) -> Size {
        self.desired
    }
}

/// One child's placement along a single axis, clamped to the track list.
///
/// `span == 0` marks a start index past the last track; such children
/// do not participate in the solve.
#[derive(Debug, Clone, Copy)]
struct AxisCell {
    start: usize,
    span: usize,
}

impl AxisCell {
    fn clamped(start: usize, span: usize, tracks: usize) -> Self {
        if start >= tracks {
            return Self { start, span: 0 };
        }
        let span = span.max(1).min(tracks - start);
        Self { start, span }
    }
}

/// The proportional grid solver.
///
/// A container owns one engine instance together with its child list;
/// mutating proportions or spacing marks the cached result stale, and
/// the next `measure`/`arrange` recomputes it.
#[derive(Default)]
pub struct GridLayoutEngine {
    columns: Vec<Proportion>,
    rows: Vec<Proportion>,
    column_spacing: i32,
    row_spacing: i32,
    result: LayoutResult,
    solved: bool,
    dirty: bool,
    last_available: Option<Size>,
    origin: Point,
}

impl std::fmt::Debug for GridLayoutEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GridLayoutEngine")
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .field("column_spacing", &self.column_spacing)
            .field("row_spacing", &self.row_spacing)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl GridLayoutEngine {
    /// Create an engine with no tracks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column track.
    pub fn add_column(&mut self, proportion: Proportion) {
        self.columns.push(proportion);
        self.dirty = true;
    }

    /// Append a row track.
    pub fn add_row(&mut self, proportion: Proportion) {
        self.rows.push(proportion);
        self.dirty = true;
    }

    /// Replace the proportion of column `index`. Returns whether the
    /// stored value changed; an out-of-range index is a no-op.
    pub fn set_column(&mut self, index: usize, proportion: Proportion) -> bool {
        Self::set_track(&mut self.columns, &mut self.dirty, index, proportion)
    }

    /// Replace the proportion of row `index`. Returns whether the stored
    /// value changed; an out-of-range index is a no-op.
    pub fn set_row(&mut self, index: usize, proportion: Proportion) -> bool {
        Self::set_track(&mut self.rows, &mut self.dirty, index, proportion)
    }

    fn set_track(
        tracks: &mut [Proportion],
        dirty: &mut bool,
        index: usize,
        proportion: Proportion,
    ) -> bool {
        match tracks.get_mut(index) {
            Some(slot) if *slot != proportion => {
                *slot = proportion;
                *dirty = true;
                true
            }
            _ => false,
        }
    }

    /// Remove all column tracks.
    pub fn clear_columns(&mut self) {
        self.columns.clear();
        self.dirty = true;
    }

    /// Remove all row tracks.
    pub fn clear_rows(&mut self) {
        self.rows.clear();
        self.dirty = true;
    }

    /// The column proportions, in track order.
    #[must_use]
    pub fn columns(&self) -> &[Proportion] {
        &self.columns
    }

    /// The row proportions, in track order.
    #[must_use]
    pub fn rows(&self) -> &[Proportion] {
        &self.rows
    }

    /// Number of defined columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Number of defined rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Set the spacing between adjacent columns.
    pub fn set_column_spacing(&mut self, spacing: i32) -> Result<(), LayoutError> {
        if spacing < 0 {
            return Err(LayoutError::InvalidSpacing { spacing });
        }
        if self.column_spacing != spacing {
            self.column_spacing = spacing;
            self.dirty = true;
        }
        Ok(())
    }

    /// Set the spacing between adjacent rows.
    pub fn set_row_spacing(&mut self, spacing: i32) -> Result<(), LayoutError> {
        if spacing < 0 {
            return Err(LayoutError::InvalidSpacing { spacing });
        }
        if self.row_spacing != spacing {
            self.row_spacing = spacing;
            self.dirty = true;
        }
        Ok(())
    }

    /// Spacing between adjacent columns.
    #[must_use]
    pub const fn column_spacing(&self) -> i32 {
        self.column_spacing
    }

    /// Spacing between adjacent rows.
    #[must_use]
    pub const fn row_spacing(&self) -> i32 {
        self.row_spacing
    }

    /// Mark the cached result stale (children added/removed/moved).
    pub fn invalidate(&mut self) {
        self.dirty = true;
    }

    /// Whether the cached result is stale.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// The most recent solve, if any.
    #[must_use]
    pub fn result(&self) -> Option<&LayoutResult> {
        self.solved.then_some(&self.result)
    }

    /// Resolve track sizes for the given available size.
    ///
    /// `measure_child(index, constraint)` reports the desired size of
    /// the child at `index` in `cells`. Re-measuring with identical
    /// inputs and no intervening mutation returns the cached result
    /// without touching any child.
    pub fn measure<F>(&mut self, available: Size, cells: &[CellPosition], mut measure_child: F) -> Size
    where
        F: FnMut(usize, Size) -> Size,
    {
        if self.solved && !self.dirty && self.last_available == Some(available) {
            return self.result.desired;
        }

        let col_cells: Vec<AxisCell> = cells
            .iter()
            .map(|c| AxisCell::clamped(c.column, c.column_span, self.columns.len()))
            .collect();
        let row_cells: Vec<AxisCell> = cells
            .iter()
            .map(|c| AxisCell::clamped(c.row, c.row_span, self.rows.len()))
            .collect();

        let column_widths = solve_axis(
            &self.columns,
            self.column_spacing,
            available.width,
            &col_cells,
            |i, extent| measure_child(i, Size::new(extent, available.height)).width,
        );
        let row_heights = solve_axis(
            &self.rows,
            self.row_spacing,
            available.height,
            &row_cells,
            |i, extent| measure_child(i, Size::new(available.width, extent)).height,
        );

        let desired = Size::new(
            track_sum(&column_widths, self.column_spacing),
            track_sum(&row_heights, self.row_spacing),
        );
        trace!(
            columns = column_widths.len(),
            rows = row_heights.len(),
            desired_width = desired.width,
            desired_height = desired.height,
            "grid layout solved"
        );

        let column_offsets = running_offsets(&column_widths, self.column_spacing, self.origin.x);
        let row_offsets = running_offsets(&row_heights, self.row_spacing, self.origin.y);
        self.result = LayoutResult {
            column_widths,
            row_heights,
            column_offsets,
            row_offsets,
            desired,
        };
        self.solved = true;
        self.dirty = false;
        self.last_available = Some(available);
        desired
    }

    /// Place children inside the final bounds.
    ///
    /// Reuses the track sizes from the last measure (the final rectangle
    /// may differ in size when the parent stretches the container) and
    /// recomputes offsets from the rectangle's origin. A child whose
    /// start index lies past the defined tracks receives a zero-size
    /// rectangle at the grid's trailing edge.
    pub fn arrange<F>(&mut self, bounds: Rect, cells: &[CellPosition], mut arrange_child: F)
    where
        F: FnMut(usize, Rect),
    {
        if !self.solved {
            // Arrange without a prior measure still degrades gracefully:
            // solve against the final bounds with zero-sized content.
            self.measure(bounds.size(), cells, |_, _| Size::zero());
        }
        self.origin = bounds.origin();
        self.result.column_offsets =
            running_offsets(&self.result.column_widths, self.column_spacing, bounds.x);
        self.result.row_offsets =
            running_offsets(&self.result.row_heights, self.row_spacing, bounds.y);

        for (i, cell) in cells.iter().enumerate() {
            let rect =
                self.span_rectangle(cell.column, cell.row, cell.column_span, cell.row_span);
            arrange_child(i, rect);
        }
    }

    /// Resolved width of column `index` (0 when out of range or unsolved).
    #[must_use]
    pub fn column_width(&self, index: usize) -> i32 {
        self.result.column_widths.get(index).copied().unwrap_or(0)
    }

    /// Resolved height of row `index` (0 when out of range or unsolved).
    #[must_use]
    pub fn row_height(&self, index: usize) -> i32 {
        self.result.row_heights.get(index).copied().unwrap_or(0)
    }

    /// Leading-edge x of column `index`; `index == column_count()` gives
    /// the grid's trailing edge.
    #[must_use]
    pub fn cell_location_x(&self, index: usize) -> i32 {
        self.result
            .column_offsets
            .get(index)
            .copied()
            .unwrap_or_else(|| self.trailing_x())
    }

    /// Leading-edge y of row `index`; `index == row_count()` gives the
    /// grid's trailing edge.
    #[must_use]
    pub fn cell_location_y(&self, index: usize) -> i32 {
        self.result
            .row_offsets
            .get(index)
            .copied()
            .unwrap_or_else(|| self.trailing_y())
    }

    /// Column leading edges, for grid-line drawing and debug overlays.
    #[must_use]
    pub fn grid_lines_x(&self) -> &[i32] {
        &self.result.column_offsets
    }

    /// Row leading edges, for grid-line drawing and debug overlays.
    #[must_use]
    pub fn grid_lines_y(&self) -> &[i32] {
        &self.result.row_offsets
    }

    /// Rectangle of a single cell.
    #[must_use]
    pub fn cell_rectangle(&self, column: usize, row: usize) -> Rect {
        self.span_rectangle(column, row, 1, 1)
    }

    /// Rectangle of a spanning region, spacing between spanned tracks
    /// included. Out-of-range start indices degrade to a zero extent at
    /// the trailing edge on that axis.
    #[must_use]
    pub fn span_rectangle(
        &self,
        column: usize,
        row: usize,
        column_span: usize,
        row_span: usize,
    ) -> Rect {
        let (x, width) = axis_extent(
            &self.result.column_offsets,
            &self.result.column_widths,
            self.column_spacing,
            self.trailing_x(),
            column,
            column_span,
        );
        let (y, height) = axis_extent(
            &self.result.row_offsets,
            &self.result.row_heights,
            self.row_spacing,
            self.trailing_y(),
            row,
            row_span,
        );
        Rect::new(x, y, width, height)
    }

    fn trailing_x(&self) -> i32 {
        trailing_edge(
            &self.result.column_offsets,
            &self.result.column_widths,
            self.origin.x,
        )
    }

    fn trailing_y(&self) -> i32 {
        trailing_edge(&self.result.row_offsets, &self.result.row_heights, self.origin.y)
    }
}

fn trailing_edge(offsets: &[i32], sizes: &[i32], origin: i32) -> i32 {
    match (offsets.last(), sizes.last()) {
        (Some(&off), Some(&size)) => off.saturating_add(size),
        _ => origin,
    }
}

fn axis_extent(
    offsets: &[i32],
    sizes: &[i32],
    spacing: i32,
    trailing: i32,
    start: usize,
    span: usize,
) -> (i32, i32) {
    let n = sizes.len();
    if start >= n {
        return (trailing, 0);
    }
    let span = span.max(1).min(n - start);
    let extent = track_sum(&sizes[start..start + span], spacing);
    (offsets[start], extent)
}

/// Sum of track sizes plus the spacing between them.
fn track_sum(sizes: &[i32], spacing: i32) -> i32 {
    let inner = sizes.iter().fold(0i32, |acc, &s| acc.saturating_add(s));
    if sizes.len() > 1 {
        inner.saturating_add(spacing.saturating_mul((sizes.len() - 1) as i32))
    } else {
        inner
    }
}

fn running_offsets(sizes: &[i32], spacing: i32, origin: i32) -> Vec<i32> {
    let mut offsets = Vec::with_capacity(sizes.len());
    let mut pos = origin;
    for &size in sizes {
        offsets.push(pos);
        pos = pos.saturating_add(size).saturating_add(spacing);
    }
    offsets
}

/// Resolve one axis. `measure(child, extent)` reports the child's
/// desired extent on this axis under the given axis constraint.
fn solve_axis<M>(
    proportions: &[Proportion],
    spacing: i32,
    available: i32,
    cells: &[AxisCell],
    mut measure: M,
) -> Vec<i32>
where
    M: FnMut(usize, i32) -> i32,
{
    let n = proportions.len();
    let mut sizes = vec![0i32; n];
    if n == 0 {
        return sizes;
    }

    // 1. Fixed pass.
    for (i, p) in proportions.iter().enumerate() {
        if p.kind() == ProportionKind::Pixels {
            sizes[i] = p.weight().round() as i32;
        }
    }

    // 2a. Auto pass: single-span children size their track to the
    // maximum desired extent, measured unconstrained on this axis.
    for (child, cell) in cells.iter().enumerate() {
        if cell.span != 1 || proportions[cell.start].kind() != ProportionKind::Auto {
            continue;
        }
        let desired = measure(child, UNBOUNDED).max(0);
        sizes[cell.start] = sizes[cell.start].max(desired);
    }

    // 2b. Spanning children touching at least one Auto track grow those
    // tracks until no child wants more than its span's current total.
    let spanning: Vec<usize> = cells
        .iter()
        .enumerate()
        .filter(|(_, c)| {
            c.span > 1
                && proportions[c.start..c.start + c.span]
                    .iter()
                    .any(|p| p.kind() == ProportionKind::Auto)
        })
        .map(|(i, _)| i)
        .collect();
    for _round in 0..MAX_SPAN_GROWTH_ROUNDS {
        if spanning.is_empty() {
            break;
        }
        let mut grew = false;
        for &child in &spanning {
            let cell = cells[child];
            let range = cell.start..cell.start + cell.span;
            let current = track_sum(&sizes[range.clone()], spacing);
            let desired = measure(child, current).max(0);
            let shortfall = desired.saturating_sub(current);
            if shortfall <= 0 {
                continue;
            }
            let autos: Vec<usize> = range
                .filter(|&t| proportions[t].kind() == ProportionKind::Auto)
                .collect();
            let count = autos.len() as i32;
            let base = shortfall / count;
            let rem = (shortfall % count) as usize;
            for (j, &t) in autos.iter().enumerate() {
                sizes[t] = sizes[t].saturating_add(base + i32::from(j < rem));
            }
            grew = true;
        }
        if !grew {
            break;
        }
    }

    // 3. Weighted pass over the remaining space.
    let consumed = sizes.iter().fold(0i64, |acc, &s| acc + i64::from(s));
    let spacing_total = i64::from(spacing) * (n as i64 - 1);
    let remaining = if available >= UNBOUNDED {
        // No finite remainder exists under an unbounded constraint.
        0
    } else {
        i64::from(available) - consumed - spacing_total
    };
    if remaining <= 0 {
        return sizes;
    }
    let remaining = remaining.min(i64::from(i32::MAX)) as i32;

    let parts: Vec<usize> = kind_indices(proportions, ProportionKind::Part);
    let fills: Vec<usize> = kind_indices(proportions, ProportionKind::Fill);
    // The weight sum must be accumulated at the same precision as the
    // per-track shares: an f32 sum lets a tiny weight cancel out of the
    // denominator while still earning its own floor share, pushing the
    // Part total past `remaining` and the Fill split negative.
    let part_weight_sum: f64 = parts
        .iter()
        .map(|&i| f64::from(proportions[i].weight()))
        .sum();

    let mut after_part = remaining;
    if part_weight_sum > 0.0 {
        for &i in &parts {
            let share = (f64::from(remaining) * f64::from(proportions[i].weight())
                / part_weight_sum)
                .floor() as i32;
            sizes[i] = share;
            after_part -= share;
        }
        // Floor rounding keeps the Part total at or below `remaining`;
        // guard the Fill split against residual float error regardless.
        after_part = after_part.max(0);
    }

    // 4. Remainder absorption: last Fill, else last weighted Part.
    if let Some(&last_fill) = fills.last() {
        let count = fills.len() as i32;
        let share = after_part / count;
        for &i in &fills {
            sizes[i] = share;
        }
        sizes[last_fill] += after_part - share * count;
    } else if part_weight_sum > 0.0
        && after_part > 0
        && let Some(&last_part) = parts.last()
    {
        sizes[last_part] += after_part;
    }

    sizes
}

fn kind_indices(proportions: &[Proportion], kind: ProportionKind) -> Vec<usize> {
    proportions
        .iter()
        .enumerate()
        .filter(|(_, p)| p.kind() == kind)
        .map(|(i, _)| i)
        .collect()
}
