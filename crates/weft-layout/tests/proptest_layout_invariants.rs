//! Property-based invariant tests for the proportional grid solver.
//!
//! These verify structural invariants that must hold for **any**
//! combination of track proportions, spacing, and available space:
//!
//! 1. Sum invariant: with an absorbing track and `remaining >= 0`, the
//!    resolved track sizes plus spacing equal the available extent
//!    exactly.
//! 2. Monotonicity: growing the available extent never shrinks any
//!    track in a Fill-free list, and never shrinks a non-absorbing
//!    track in any list.
//! 3. Determinism: identical inputs resolve to identical geometry.
//! 4. Idempotence: re-measuring with unchanged inputs is a cache hit
//!    and yields the same result.
//! 5. Auto-span growth: a child spanning only `Auto` tracks gets its
//!    desired extent distributed within one pixel per track, and the
//!    solve terminates.
//! 6. Offsets are non-decreasing and arranged rects stay inside the
//!    bounds when no track overflows.
//! 7. Drag weight conservation: a two-pane split preserves the weight
//!    sum exactly across any accepted drag sequence.
//! 8. Splitter position round-trips through `set_splitter_position`.
//! 9. Extreme weight ratios: mixing tiny and near-f32-mantissa-limit
//!    Part weights at large available extents never produces a
//!    negative track, and the absorber still closes the sum exactly.

use proptest::prelude::*;
use weft_core::node::ProbeNode;
use weft_layout::engine::GridLayoutEngine;
use weft_layout::{
    CellPosition, LayoutNode, Orientation, Point, Proportion, Rect, Size, SplitPane,
};

// ── Helpers ─────────────────────────────────────────────────────────────

fn proportion_strategy() -> impl Strategy<Value = Proportion> {
    prop_oneof![
        Just(Proportion::auto()),
        (0.0f32..=300.0).prop_map(|px| Proportion::pixels(px).expect("finite px")),
        (0.0f32..=10.0).prop_map(|w| Proportion::part(w).expect("finite weight")),
        Just(Proportion::fill()),
    ]
}

fn proportion_list(max_len: usize) -> impl Strategy<Value = Vec<Proportion>> {
    proptest::collection::vec(proportion_strategy(), 1..=max_len)
}

fn engine_for(columns: &[Proportion], spacing: i32) -> GridLayoutEngine {
    let mut engine = GridLayoutEngine::new();
    for &c in columns {
        engine.add_column(c);
    }
    engine.add_row(Proportion::fill());
    engine.set_column_spacing(spacing).expect("non-negative");
    engine
}

fn zero(_: usize, _: Size) -> Size {
    Size::zero()
}

/// Fixed-pass total: what Pixels tracks will consume (Auto resolves to
/// zero with no children).
fn fixed_total(columns: &[Proportion]) -> i64 {
    columns
        .iter()
        .filter(|p| p.kind() == weft_layout::ProportionKind::Pixels)
        .map(|p| i64::from(p.weight().round() as i32))
        .sum()
}

fn spacing_total(tracks: usize, spacing: i32) -> i64 {
    i64::from(spacing) * (tracks as i64 - 1)
}

fn widths(engine: &GridLayoutEngine) -> Vec<i32> {
    (0..engine.column_count())
        .map(|i| engine.column_width(i))
        .collect()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Sum invariant
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn resolved_sizes_plus_spacing_fill_available_exactly(
        mut columns in proportion_list(8),
        spacing in 0i32..=20,
        available in 1i32..=3000,
    ) {
        // A trailing Fill guarantees an absorber for rounding leftovers.
        columns.push(Proportion::fill());
        let remaining =
            i64::from(available) - fixed_total(&columns) - spacing_total(columns.len(), spacing);
        prop_assume!(remaining >= 0);

        let mut engine = engine_for(&columns, spacing);
        engine.measure(Size::new(available, 100), &[], zero);

        let track_sum: i64 = widths(&engine).iter().map(|&w| i64::from(w)).sum();
        prop_assert_eq!(
            track_sum + spacing_total(columns.len(), spacing),
            i64::from(available)
        );
    }

    #[test]
    fn last_part_absorbs_when_no_fill_exists(
        weights in proptest::collection::vec(0.1f32..=10.0, 1..=6),
        spacing in 0i32..=10,
        available in 100i32..=3000,
    ) {
        let columns: Vec<Proportion> = weights
            .iter()
            .map(|&w| Proportion::part(w).expect("finite weight"))
            .collect();
        prop_assume!(spacing_total(columns.len(), spacing) < i64::from(available));

        let mut engine = engine_for(&columns, spacing);
        engine.measure(Size::new(available, 100), &[], zero);

        let track_sum: i64 = widths(&engine).iter().map(|&w| i64::from(w)).sum();
        prop_assert_eq!(
            track_sum + spacing_total(columns.len(), spacing),
            i64::from(available)
        );
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    /// In a Fill-free list every track is monotone in the available
    /// extent, including the last Part track that absorbs rounding
    /// leftovers.
    #[test]
    fn growing_available_never_shrinks_any_track_without_fill(
        columns in proptest::collection::vec(
            prop_oneof![
                (0.0f32..=200.0).prop_map(|px| Proportion::pixels(px).expect("finite px")),
                (0.0f32..=10.0).prop_map(|w| Proportion::part(w).expect("finite weight")),
            ],
            1..=8,
        ),
        spacing in 0i32..=10,
        available in 1i32..=2000,
        growth in 1i32..=500,
    ) {
        let mut small = engine_for(&columns, spacing);
        small.measure(Size::new(available, 100), &[], zero);
        let mut large = engine_for(&columns, spacing);
        large.measure(Size::new(available + growth, 100), &[], zero);

        for (s, l) in widths(&small).iter().zip(widths(&large).iter()) {
            prop_assert!(l >= s, "track shrank from {s} to {l}");
        }
    }

    /// With arbitrary lists, every track except the absorber (the last
    /// Fill, or the last Part when no Fill exists) is monotone. The
    /// absorber itself may oscillate by the rounding leftover.
    #[test]
    fn growing_available_never_shrinks_non_absorbing_tracks(
        columns in proportion_list(8),
        spacing in 0i32..=10,
        available in 1i32..=2000,
        growth in 1i32..=500,
    ) {
        let absorber = columns
            .iter()
            .rposition(|p| p.kind() == weft_layout::ProportionKind::Fill)
            .or_else(|| {
                columns
                    .iter()
                    .rposition(|p| p.kind() == weft_layout::ProportionKind::Part)
            });

        let mut small = engine_for(&columns, spacing);
        small.measure(Size::new(available, 100), &[], zero);
        let mut large = engine_for(&columns, spacing);
        large.measure(Size::new(available + growth, 100), &[], zero);

        for (i, (s, l)) in widths(&small).iter().zip(widths(&large).iter()).enumerate() {
            if Some(i) == absorber {
                continue;
            }
            prop_assert!(l >= s, "track {i} shrank from {s} to {l}");
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3 + 4. Determinism and idempotence
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn identical_inputs_resolve_identically(
        columns in proportion_list(8),
        spacing in 0i32..=20,
        available in 1i32..=3000,
    ) {
        let mut a = engine_for(&columns, spacing);
        let mut b = engine_for(&columns, spacing);
        let da = a.measure(Size::new(available, 100), &[], zero);
        let db = b.measure(Size::new(available, 100), &[], zero);
        prop_assert_eq!(da, db);
        prop_assert_eq!(widths(&a), widths(&b));
    }

    #[test]
    fn remeasure_with_unchanged_inputs_is_stable(
        columns in proportion_list(8),
        spacing in 0i32..=20,
        available in 1i32..=3000,
    ) {
        let mut engine = engine_for(&columns, spacing);
        let first = engine.measure(Size::new(available, 100), &[], zero);
        let before = widths(&engine);
        let second = engine.measure(Size::new(available, 100), &[], |_, _| {
            panic!("cached measure must not call back into children")
        });
        prop_assert_eq!(first, second);
        prop_assert_eq!(before, widths(&engine));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Auto-span growth
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn span_shortfall_distributes_within_one_pixel(
        track_count in 1usize..=5,
        desired in 0i32..=500,
    ) {
        let columns = vec![Proportion::auto(); track_count];
        let mut engine = engine_for(&columns, 0);
        let cells = [CellPosition::new(0, 0).with_column_span(track_count)];
        engine.measure(Size::new(2000, 100), &cells, |_, _| Size::new(desired, 10));

        let sizes = widths(&engine);
        let total: i32 = sizes.iter().sum();
        prop_assert_eq!(total, desired);
        let max = sizes.iter().copied().max().unwrap_or(0);
        let min = sizes.iter().copied().min().unwrap_or(0);
        prop_assert!(max - min <= 1, "uneven distribution: {sizes:?}");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Arranged geometry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn offsets_ascend_and_rects_stay_inside_bounds(
        weights in proptest::collection::vec(0.0f32..=10.0, 1..=6),
        spacing in 0i32..=10,
        origin_x in -100i32..=100,
        origin_y in -100i32..=100,
        available in 50i32..=2000,
    ) {
        let columns: Vec<Proportion> = weights
            .iter()
            .map(|&w| Proportion::part(w).expect("finite weight"))
            .collect();
        prop_assume!(spacing_total(columns.len(), spacing) < i64::from(available));

        let mut engine = engine_for(&columns, spacing);
        let cells: Vec<CellPosition> =
            (0..columns.len()).map(|i| CellPosition::new(i, 0)).collect();
        let bounds = Rect::new(origin_x, origin_y, available, 100);
        engine.measure(bounds.size(), &cells, zero);

        let mut rects = vec![Rect::default(); cells.len()];
        engine.arrange(bounds, &cells, |i, r| rects[i] = r);

        let offsets = engine.grid_lines_x();
        for pair in offsets.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
        for rect in &rects {
            prop_assert!(rect.x >= bounds.x);
            prop_assert!(rect.right() <= bounds.right());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Drag weight conservation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn two_pane_drag_sequence_conserves_weight_sum(
        width in 100i32..=2000,
        samples in proptest::collection::vec(-3000i32..=3000, 1..=20),
    ) {
        let mut pane = SplitPane::new(Orientation::Horizontal);
        pane.add_pane(ProbeNode::new(10, 10));
        pane.add_pane(ProbeNode::new(10, 10));
        pane.arrange(Rect::new(0, 0, width, 50));

        let handle = pane.handle_rectangle(0);
        let grab = Point::new(handle.x, handle.y + 10);
        prop_assume!(pane.begin_drag(grab));

        for dx in samples {
            pane.drag_to(Point::new(grab.x + dx, grab.y));
            let left = pane.splitter_position(0).expect("handle 0 exists");
            prop_assert!((0.0..=1.0).contains(&left));
        }
        // The two content weights were normalized to sum 1.0 at drag
        // start; every accepted sample preserves that sum exactly, so
        // re-arranging still fills the pane.
        pane.end_drag();
        pane.arrange(Rect::new(0, 0, width, 50));
        let content = pane.pane_extent(0) + pane.pane_extent(1);
        prop_assert_eq!(content, width - pane.handle_size());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 8. Splitter position round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn splitter_position_round_trips(
        width in 100i32..=2000,
        fraction in 0.0f32..=1.0,
    ) {
        let mut pane = SplitPane::new(Orientation::Horizontal);
        pane.add_pane(ProbeNode::new(10, 10));
        pane.add_pane(ProbeNode::new(10, 10));
        pane.arrange(Rect::new(0, 0, width, 50));

        pane.set_splitter_position(0, fraction).expect("handle 0 exists");
        let back = pane.splitter_position(0).expect("handle 0 exists");
        prop_assert!((back - fraction).abs() < 1e-5, "{back} != {fraction}");
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. Extreme weight ratios
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    /// Weight sums where a small weight vanishes in single-precision
    /// addition (e.g. 16777216 + 1) must not let the Part shares
    /// overdraw the budget and push the Fill split negative.
    #[test]
    fn extreme_weight_ratios_never_yield_negative_tracks(
        weights in proptest::collection::vec(
            prop_oneof![0.0f32..=10.0, 1.0e6f32..=3.0e7],
            1..=6,
        ),
        available in 1i32..=2_000_000_000,
    ) {
        let mut columns: Vec<Proportion> = weights
            .iter()
            .map(|&w| Proportion::part(w).expect("finite weight"))
            .collect();
        columns.push(Proportion::fill());

        let mut engine = engine_for(&columns, 0);
        engine.measure(Size::new(available, 100), &[], zero);

        let sizes = widths(&engine);
        for (i, &w) in sizes.iter().enumerate() {
            prop_assert!(w >= 0, "track {i} is negative: {sizes:?}");
        }
        let total: i64 = sizes.iter().map(|&w| i64::from(w)).sum();
        prop_assert_eq!(total, i64::from(available));
    }
}
