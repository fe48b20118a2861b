//! Property-based invariant tests for the gesture geometry helpers.
//!
//! 1. Overlap is symmetric.
//! 2. Every rectangle overlaps itself, and overlaps a copy sharing one edge.
//! 3. Overlap agrees with the separating-axis definition.
//! 4. Clamped origins keep the box inside the bounds.
//! 5. Grid-aware clamping stays on the grid whenever a grid line fits.
//! 6. Snapping produces exact multiples of the grid.
//! 7. The midpoint scan returns the first qualifying index.

use pinboard_core::geometry::{
    Axis, Point, Rect, Size, clamp_origin, insertion_index, rects_intersect, snap_to_grid,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn coord() -> impl Strategy<Value = f32> {
    (-500i32..=500).prop_map(|v| v as f32)
}

fn extent() -> impl Strategy<Value = f32> {
    (0i32..=300).prop_map(|v| v as f32)
}

fn rect_strategy() -> impl Strategy<Value = Rect> {
    (coord(), coord(), extent(), extent()).prop_map(|(x, y, w, h)| Rect::new(x, y, w, h))
}

fn is_multiple(value: f32, grid: f32) -> bool {
    let q = value / grid;
    (q - q.round()).abs() < 1e-4
}

// ═════════════════════════════════════════════════════════════════════════
// 1–3. Overlap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn overlap_is_symmetric(a in rect_strategy(), b in rect_strategy()) {
        prop_assert_eq!(rects_intersect(&a, &b), rects_intersect(&b, &a));
    }

    #[test]
    fn overlap_is_reflexive_and_edge_inclusive(a in rect_strategy()) {
        prop_assert!(rects_intersect(&a, &a));
        let neighbour = Rect::new(a.right(), a.y, 10.0, a.height);
        prop_assert!(
            rects_intersect(&a, &neighbour),
            "edge-adjacent rects must overlap: {:?} {:?}",
            a, neighbour
        );
    }

    #[test]
    fn overlap_matches_separating_axis(a in rect_strategy(), b in rect_strategy()) {
        let separated = a.right() < b.left()
            || b.right() < a.left()
            || a.bottom() < b.top()
            || b.bottom() < a.top();
        prop_assert_eq!(rects_intersect(&a, &b), !separated);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4–6. Clamp and snap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clamp_keeps_box_inside(
        bounds in (coord(), coord(), 50i32..=400, 50i32..=400)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w as f32, h as f32)),
        size in (1i32..=50, 1i32..=50).prop_map(|(w, h)| Size::new(w as f32, h as f32)),
        origin in (coord(), coord()).prop_map(|(x, y)| Point::new(x, y)),
    ) {
        let clamped = clamp_origin(origin, size, &bounds, None);
        let moved = Rect::from_origin_size(clamped, size);
        prop_assert!(bounds.contains_rect(&moved), "{:?} escaped {:?}", moved, bounds);
    }

    #[test]
    fn grid_clamp_stays_on_grid(
        grid in 1i32..=25,
        bounds in (coord(), coord(), 100i32..=400, 100i32..=400)
            .prop_map(|(x, y, w, h)| Rect::new(x, y, w as f32, h as f32)),
        size in (1i32..=50, 1i32..=50).prop_map(|(w, h)| Size::new(w as f32, h as f32)),
        origin in (coord(), coord()).prop_map(|(x, y)| Point::new(x, y)),
    ) {
        let g = grid as f32;
        let snapped = Point::new(snap_to_grid(origin.x, g), snap_to_grid(origin.y, g));
        let clamped = clamp_origin(snapped, size, &bounds, Some(g));
        // Bounds are at least 100 wide and the box at most 50, so a grid line
        // of spacing <= 25 always fits.
        prop_assert!(is_multiple(clamped.x, g), "x={} grid={}", clamped.x, g);
        prop_assert!(is_multiple(clamped.y, g), "y={} grid={}", clamped.y, g);
        prop_assert!(bounds.contains_rect(&Rect::from_origin_size(clamped, size)));
    }

    #[test]
    fn snap_yields_multiples(value in -10_000i32..=10_000, grid in 1i32..=64) {
        let g = grid as f32;
        prop_assert!(is_multiple(snap_to_grid(value as f32, g), g));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Midpoint scan
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn scan_returns_first_qualifying(
        heights in prop::collection::vec(1i32..=80, 0..12),
        pointer_y in -50i32..=1000,
    ) {
        let mut y = 0.0;
        let rows: Vec<Rect> = heights
            .iter()
            .map(|h| {
                let r = Rect::new(0.0, y, 100.0, *h as f32);
                y += *h as f32;
                r
            })
            .collect();
        let pointer = Point::new(10.0, pointer_y as f32);
        match insertion_index(&rows, pointer, Axis::Y) {
            Some(idx) => {
                prop_assert!(rows[idx].midpoint(Axis::Y) > pointer.y);
                for earlier in &rows[..idx] {
                    prop_assert!(earlier.midpoint(Axis::Y) <= pointer.y);
                }
            }
            None => {
                for row in &rows {
                    prop_assert!(row.midpoint(Axis::Y) <= pointer.y);
                }
            }
        }
    }
}
