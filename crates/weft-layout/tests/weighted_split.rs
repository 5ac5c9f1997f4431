//! End-to-end checks of the documented sizing walkthrough and the
//! graceful-degradation rules, driven through the public container API
//! rather than the engine internals.

use weft_core::node::ProbeNode;
use weft_layout::engine::GridLayoutEngine;
use weft_layout::{
    CellPosition, Grid, LayoutNode, Orientation, Proportion, Rect, Size, StackPanel,
};

/// Columns `[Auto, Part(1), Part(2), Pixels(150), Fill]` at 900 wide
/// with the auto column measuring 50: the weighted budget is
/// 900 - 50 - 150 = 700, split 1:2 into 233 and 466, and the Fill
/// absorbs the last pixel so the row totals exactly 900.
#[test]
fn documented_weighted_walkthrough() {
    let mut grid: Grid<ProbeNode> = Grid::new()
        .with_column(Proportion::auto())
        .with_column(Proportion::part(1.0).unwrap())
        .with_column(Proportion::part(2.0).unwrap())
        .with_column(Proportion::pixels(150.0).unwrap())
        .with_column(Proportion::fill())
        .with_row(Proportion::fill());
    for col in 0..5 {
        grid.add_child(ProbeNode::new(50, 10), CellPosition::new(col, 0));
    }

    grid.measure(Size::new(900, 300));
    grid.arrange(Rect::new(0, 0, 900, 300));

    let widths: Vec<i32> = (0..5).map(|i| grid.engine().column_width(i)).collect();
    assert_eq!(widths, [50, 233, 466, 150, 1]);
    assert_eq!(widths.iter().sum::<i32>(), 900);
}

#[test]
fn span_reaching_past_last_track_is_clamped() {
    let mut engine = GridLayoutEngine::new();
    for _ in 0..3 {
        engine.add_column(Proportion::part(1.0).unwrap());
    }
    engine.add_row(Proportion::fill());

    let cells = [CellPosition::new(1, 0).with_column_span(10)];
    engine.measure(Size::new(300, 100), &cells, |_, c| c);
    let mut rect = Rect::default();
    engine.arrange(Rect::new(0, 0, 300, 100), &cells, |_, r| rect = r);

    // The span stops at the grid edge: columns 1 and 2 only.
    assert_eq!(rect, Rect::new(100, 0, 200, 100));
}

#[test]
fn zero_span_counts_as_one() {
    let mut engine = GridLayoutEngine::new();
    for _ in 0..3 {
        engine.add_column(Proportion::part(1.0).unwrap());
    }
    engine.add_row(Proportion::fill());

    let cells = [CellPosition::new(1, 0).with_column_span(0)];
    engine.measure(Size::new(300, 100), &cells, |_, c| c);
    let mut rect = Rect::default();
    engine.arrange(Rect::new(0, 0, 300, 100), &cells, |_, r| rect = r);
    assert_eq!(rect, Rect::new(100, 0, 100, 100));
}

#[test]
fn child_past_defined_tracks_degrades_to_trailing_edge() {
    let mut grid: Grid<ProbeNode> = Grid::new()
        .with_column(Proportion::pixels(60.0).unwrap())
        .with_row(Proportion::pixels(40.0).unwrap());
    grid.add_child(ProbeNode::new(10, 10), CellPosition::new(7, 9));

    grid.arrange(Rect::new(0, 0, 200, 100));
    let rect = grid.child_mut(0).unwrap().arranged.unwrap();
    assert_eq!(rect.size(), Size::zero());
    assert_eq!((rect.x, rect.y), (60, 40));
}

/// Containers nest through the shared layout contract: a grid cell can
/// hold a stack panel whose own children lay out inside the cell rect.
#[test]
fn containers_compose_recursively() {
    let mut inner = StackPanel::new(Orientation::Vertical);
    inner.add_child(ProbeNode::new(10, 30));
    inner.add_child_with(ProbeNode::new(10, 0), Proportion::fill());

    let mut outer: Grid<StackPanel<ProbeNode>> = Grid::new()
        .with_column(Proportion::pixels(120.0).unwrap())
        .with_column(Proportion::fill())
        .with_row(Proportion::fill());
    outer.add_child(inner, CellPosition::new(1, 0));

    outer.arrange(Rect::new(0, 0, 420, 200));

    let stack = outer.child_mut(0).unwrap();
    assert_eq!(
        stack.child_mut(0).unwrap().arranged,
        Some(Rect::new(120, 0, 300, 30))
    );
    assert_eq!(
        stack.child_mut(1).unwrap().arranged,
        Some(Rect::new(120, 30, 300, 170))
    );
}

/// A weight ratio near the f32 mantissa limit must not let the small
/// Part's share overdraw the budget: `16777216 + 1` is unrepresentable
/// in f32, so a single-precision weight sum would hand the big Part the
/// full budget while the small Part still takes its own floor share,
/// driving the Fill negative.
#[test]
fn extreme_weight_ratio_keeps_tracks_non_negative() {
    let mut engine = GridLayoutEngine::new();
    engine.add_column(Proportion::part(16_777_216.0).unwrap());
    engine.add_column(Proportion::part(1.0).unwrap());
    engine.add_column(Proportion::fill());
    engine.add_row(Proportion::fill());

    engine.measure(Size::new(2_000_000_000, 100), &[], |_, _| Size::zero());

    let widths: Vec<i32> = (0..3).map(|i| engine.column_width(i)).collect();
    for &w in &widths {
        assert!(w >= 0, "negative track width: {widths:?}");
    }
    assert_eq!(widths, [1_999_999_880, 119, 1]);
    assert_eq!(widths.iter().map(|&w| i64::from(w)).sum::<i64>(), 2_000_000_000);
}

#[test]
fn content_overflow_zeroes_flexible_tracks() {
    let mut grid: Grid<ProbeNode> = Grid::new()
        .with_column(Proportion::pixels(500.0).unwrap())
        .with_column(Proportion::part(1.0).unwrap())
        .with_column(Proportion::fill())
        .with_row(Proportion::fill());
    grid.add_child(ProbeNode::new(10, 10), CellPosition::new(0, 0));

    grid.arrange(Rect::new(0, 0, 300, 100));
    assert_eq!(grid.engine().column_width(0), 500);
    assert_eq!(grid.engine().column_width(1), 0);
    assert_eq!(grid.engine().column_width(2), 0);
}
