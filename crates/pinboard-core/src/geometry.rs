#![forbid(unsafe_code)]

//! Geometric primitives and the pure helpers the gesture controllers share.
//!
//! Coordinates are logical screen pixels with the origin at the top-left and
//! `y` growing downwards. Everything here is stateless.

use std::ops::{Add, Sub};

/// A point (or a delta) in screen space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// The origin.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new point.
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Component along `axis`. `Axis::Free` has no single component and yields `x`.
    #[inline]
    pub const fn along(self, axis: Axis) -> f32 {
        match axis {
            Axis::Y => self.y,
            Axis::X | Axis::Free => self.x,
        }
    }

    /// Zero the component that `axis` locks out.
    #[inline]
    pub const fn constrain(self, axis: Axis) -> Self {
        match axis {
            Axis::X => Self::new(self.x, 0.0),
            Axis::Y => Self::new(0.0, self.y),
            Axis::Free => self,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self::new(x, y)
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// An empty size.
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Create a new size.
    #[inline]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle: origin plus size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Create a rectangle from an origin and a size.
    #[inline]
    pub const fn from_origin_size(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub const fn left(&self) -> f32 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> f32 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Centre point.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Midpoint along `axis`. For `Axis::Free` this is the horizontal midpoint.
    #[inline]
    pub fn midpoint(&self, axis: Axis) -> f32 {
        self.center().along(axis)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Point containment. Both edges are inclusive.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    /// Whether `other` lies entirely inside this rectangle.
    #[inline]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Same size, new origin.
    #[inline]
    #[must_use]
    pub fn moved_to(&self, origin: Point) -> Rect {
        Rect::from_origin_size(origin, self.size())
    }

    /// Same size, origin shifted by `delta`.
    #[inline]
    #[must_use]
    pub fn translated(&self, delta: Point) -> Rect {
        self.moved_to(self.origin() + delta)
    }

    /// Grow the rectangle outwards by `margin` (the margin box of a border box).
    #[must_use]
    pub fn outer(&self, margin: Sides) -> Rect {
        Rect::new(
            self.x - margin.left,
            self.y - margin.top,
            self.width + margin.horizontal_sum(),
            self.height + margin.vertical_sum(),
        )
    }
}

/// Per-edge lengths, used for item margins.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Sides {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Sides {
    /// No margin.
    pub const ZERO: Self = Self::all(0.0);

    /// Same value on every edge.
    pub const fn all(val: f32) -> Self {
        Self::new(val, val, val, val)
    }

    /// Explicit values, clockwise from the top.
    pub const fn new(top: f32, right: f32, bottom: f32, left: f32) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[inline]
    pub fn horizontal_sum(&self) -> f32 {
        self.left + self.right
    }

    #[inline]
    pub fn vertical_sum(&self) -> f32 {
        self.top + self.bottom
    }
}

impl From<f32> for Sides {
    fn from(val: f32) -> Self {
        Self::all(val)
    }
}

impl From<(f32, f32)> for Sides {
    fn from((vertical, horizontal): (f32, f32)) -> Self {
        Self::new(vertical, horizontal, vertical, horizontal)
    }
}

/// Which axis a gesture may travel along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Axis {
    /// Horizontal only.
    X,
    /// Vertical only.
    Y,
    /// Unconstrained.
    #[default]
    Free,
}

// ---------------------------------------------------------------------------
// Gesture helpers
// ---------------------------------------------------------------------------

/// Boundary-inclusive overlap test.
///
/// Rectangles that merely share an edge (or a corner) overlap. Drop-target
/// tie-breaking depends on exactly this behaviour.
#[inline]
pub fn rects_intersect(a: &Rect, b: &Rect) -> bool {
    a.left() <= b.right() && b.left() <= a.right() && a.top() <= b.bottom() && b.top() <= a.bottom()
}

/// First-match scan for a list insertion slot.
///
/// For `Axis::X`/`Axis::Y` this returns the index of the first rectangle whose
/// midpoint on that axis lies strictly past the pointer coordinate. For
/// `Axis::Free` it returns the first rectangle containing the pointer. `None`
/// means nothing qualified; callers decide what that maps to.
pub fn insertion_index(rects: &[Rect], pointer: Point, axis: Axis) -> Option<usize> {
    match axis {
        Axis::Free => rects.iter().position(|rect| rect.contains(pointer)),
        Axis::X | Axis::Y => {
            let coord = pointer.along(axis);
            rects.iter().position(|rect| rect.midpoint(axis) > coord)
        }
    }
}

/// Round a coordinate to the nearest multiple of `grid`.
///
/// Non-positive or non-finite grid sizes leave the value untouched.
#[inline]
pub fn snap_to_grid(value: f32, grid: f32) -> f32 {
    if grid > 0.0 && grid.is_finite() {
        (value / grid).round() * grid
    } else {
        value
    }
}

/// Restrict a rectangle's origin so that a box of `size` stays inside `bounds`.
///
/// When the box is larger than the bounds on an axis it is pinned to the
/// bounds' leading edge. With `grid` set, the permitted range shrinks to the
/// innermost grid lines so a snapped position stays snapped after clamping.
/// An axis whose bounds are not finite is left unclamped.
pub fn clamp_origin(origin: Point, size: Size, bounds: &Rect, grid: Option<f32>) -> Point {
    Point::new(
        clamp_span(origin.x, size.width, bounds.x, bounds.width, grid),
        clamp_span(origin.y, size.height, bounds.y, bounds.height, grid),
    )
}

fn clamp_span(pos: f32, len: f32, lo: f32, extent: f32, grid: Option<f32>) -> f32 {
    let hi = lo + extent - len;
    // `f32::clamp` panics on NaN bounds.
    if !(lo.is_finite() && hi.is_finite()) {
        return pos;
    }
    if hi < lo {
        return lo;
    }
    if let Some(g) = grid.filter(|g| *g > 0.0 && g.is_finite()) {
        let snapped_lo = (lo / g).ceil() * g;
        let snapped_hi = (hi / g).floor() * g;
        if snapped_lo <= snapped_hi {
            return pos.clamp(snapped_lo, snapped_hi);
        }
    }
    pos.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Point::new(25.0, 40.0));
    }

    #[test]
    fn rect_contains_is_inclusive() {
        let r = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(r.contains(Point::new(0.0, 0.0)));
        assert!(r.contains(Point::new(10.0, 10.0)));
        assert!(!r.contains(Point::new(10.1, 5.0)));
    }

    #[test]
    fn rect_outer_adds_margins() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        let outer = r.outer(Sides::new(1.0, 2.0, 3.0, 4.0));
        assert_eq!(outer, Rect::new(6.0, 9.0, 26.0, 24.0));
    }

    #[test]
    fn intersect_overlapping() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert!(rects_intersect(&a, &b));
        assert!(rects_intersect(&b, &a));
    }

    #[test]
    fn intersect_shared_edge_counts() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let right = Rect::new(10.0, 0.0, 10.0, 10.0);
        let below = Rect::new(0.0, 10.0, 10.0, 10.0);
        let corner = Rect::new(10.0, 10.0, 5.0, 5.0);
        assert!(rects_intersect(&a, &right));
        assert!(rects_intersect(&a, &below));
        assert!(rects_intersect(&a, &corner));
    }

    #[test]
    fn intersect_disjoint() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.5, 0.0, 10.0, 10.0);
        assert!(!rects_intersect(&a, &b));
    }

    #[test]
    fn insertion_index_vertical_midpoints() {
        let rows = [
            Rect::new(0.0, 0.0, 100.0, 50.0),
            Rect::new(0.0, 50.0, 100.0, 50.0),
            Rect::new(0.0, 100.0, 100.0, 50.0),
        ];
        assert_eq!(insertion_index(&rows, Point::new(5.0, 10.0), Axis::Y), Some(0));
        assert_eq!(insertion_index(&rows, Point::new(5.0, 25.0), Axis::Y), Some(1));
        assert_eq!(insertion_index(&rows, Point::new(5.0, 74.0), Axis::Y), Some(1));
        assert_eq!(insertion_index(&rows, Point::new(5.0, 140.0), Axis::Y), None);
    }

    #[test]
    fn insertion_index_horizontal_uses_x() {
        let cols = [Rect::new(0.0, 0.0, 40.0, 10.0), Rect::new(40.0, 0.0, 40.0, 10.0)];
        assert_eq!(insertion_index(&cols, Point::new(30.0, 500.0), Axis::X), Some(1));
    }

    #[test]
    fn insertion_index_free_uses_containment() {
        let tiles = [Rect::new(0.0, 0.0, 10.0, 10.0), Rect::new(20.0, 0.0, 10.0, 10.0)];
        assert_eq!(insertion_index(&tiles, Point::new(25.0, 5.0), Axis::Free), Some(1));
        assert_eq!(insertion_index(&tiles, Point::new(15.0, 5.0), Axis::Free), None);
    }

    #[test]
    fn insertion_index_empty() {
        assert_eq!(insertion_index(&[], Point::ZERO, Axis::Y), None);
    }

    #[test]
    fn snap_rounds_to_nearest() {
        assert_eq!(snap_to_grid(14.0, 10.0), 10.0);
        assert_eq!(snap_to_grid(15.0, 10.0), 20.0);
        assert_eq!(snap_to_grid(-14.0, 10.0), -10.0);
        assert_eq!(snap_to_grid(7.3, 0.0), 7.3);
    }

    #[test]
    fn clamp_pins_far_edge() {
        let bounds = Rect::new(0.0, 0.0, 300.0, 300.0);
        let clamped = clamp_origin(Point::new(450.0, 450.0), Size::new(50.0, 50.0), &bounds, None);
        assert_eq!(clamped, Point::new(250.0, 250.0));
    }

    #[test]
    fn clamp_oversized_box_pins_leading_edge() {
        let bounds = Rect::new(10.0, 10.0, 20.0, 20.0);
        let clamped = clamp_origin(Point::new(50.0, -5.0), Size::new(40.0, 40.0), &bounds, None);
        assert_eq!(clamped, Point::new(10.0, 10.0));
    }

    #[test]
    fn clamp_with_grid_stays_on_grid() {
        let bounds = Rect::new(3.0, 0.0, 100.0, 100.0);
        let clamped = clamp_origin(
            Point::new(0.0, 90.0),
            Size::new(10.0, 10.0),
            &bounds,
            Some(8.0),
        );
        assert_eq!(clamped, Point::new(8.0, 88.0));
    }

    #[test]
    fn clamp_ignores_non_finite_bounds() {
        let bounds = Rect::new(f32::NAN, 0.0, 100.0, 100.0);
        let clamped = clamp_origin(Point::new(500.0, 500.0), Size::new(10.0, 10.0), &bounds, None);
        assert_eq!(clamped, Point::new(500.0, 90.0));

        let bounds = Rect::new(0.0, 0.0, f32::INFINITY, f32::NAN);
        let clamped = clamp_origin(Point::new(-5.0, 7.0), Size::new(10.0, 10.0), &bounds, Some(4.0));
        assert_eq!(clamped, Point::new(-5.0, 7.0));
    }

    #[test]
    fn point_constrain() {
        let p = Point::new(3.0, 4.0);
        assert_eq!(p.constrain(Axis::X), Point::new(3.0, 0.0));
        assert_eq!(p.constrain(Axis::Y), Point::new(0.0, 4.0));
        assert_eq!(p.constrain(Axis::Free), p);
    }
}
