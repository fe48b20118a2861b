#![forbid(unsafe_code)]

//! Time-based animation primitives.
//!
//! The gesture engine only animates one thing: a dragged element settling
//! back to where it started. Animations are advanced explicitly by the host's
//! frame loop via [`Animation::tick`]; nothing here reads a clock.

use std::time::Duration;

use crate::geometry::Point;

/// Easing function signature: maps `t` in [0, 1] to output in [0, 1].
pub type EasingFn = fn(f32) -> f32;

/// Identity easing (constant velocity).
#[inline]
pub fn linear(t: f32) -> f32 {
    t.clamp(0.0, 1.0)
}

/// Quadratic ease-out (slow end).
#[inline]
pub fn ease_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t) * (1.0 - t)
}

/// Cubic ease-out (slower end than quadratic).
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// A time-based animation producing values in [0.0, 1.0].
pub trait Animation {
    /// Advance the animation by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has reached its end.
    fn is_complete(&self) -> bool;

    /// Current eased progress, clamped to [0.0, 1.0].
    fn value(&self) -> f32;

    /// Reset the animation to its initial state.
    fn reset(&mut self);
}

/// Interpolates a point from `from` to `to` over a duration.
///
/// A zero duration completes immediately: [`Settle::position`] already
/// reports `to` before the first tick.
#[derive(Debug, Clone, Copy)]
pub struct Settle {
    from: Point,
    to: Point,
    elapsed: Duration,
    duration: Duration,
    easing: EasingFn,
}

impl Settle {
    /// Create a settle animation.
    pub fn new(from: Point, to: Point, duration: Duration) -> Self {
        Self {
            from,
            to,
            elapsed: Duration::ZERO,
            duration,
            easing: ease_out_cubic,
        }
    }

    /// Set the easing function (builder).
    #[must_use]
    pub fn easing(mut self, easing: EasingFn) -> Self {
        self.easing = easing;
        self
    }

    /// Destination point.
    pub fn target(&self) -> Point {
        self.to
    }

    fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (t as f32).clamp(0.0, 1.0)
    }

    /// Current interpolated position. Exactly `to` once complete.
    pub fn position(&self) -> Point {
        if self.is_complete() {
            return self.to;
        }
        let t = (self.easing)(self.progress());
        Point::new(
            self.from.x + (self.to.x - self.from.x) * t,
            self.from.y + (self.to.y - self.from.y) * t,
        )
    }
}

impl Animation for Settle {
    fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt);
    }

    fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    fn value(&self) -> f32 {
        (self.easing)(self.progress())
    }

    fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS_100: Duration = Duration::from_millis(100);

    #[test]
    fn easing_endpoints() {
        for f in [linear as EasingFn, ease_out, ease_out_cubic] {
            assert_eq!(f(0.0), 0.0);
            assert_eq!(f(1.0), 1.0);
            assert_eq!(f(2.0), 1.0, "input is clamped");
        }
    }

    #[test]
    fn settle_interpolates_linearly() {
        let mut s = Settle::new(Point::new(0.0, 100.0), Point::ZERO, MS_100).easing(linear);
        s.tick(Duration::from_millis(50));
        assert_eq!(s.position(), Point::new(0.0, 50.0));
        assert!(!s.is_complete());
    }

    #[test]
    fn settle_lands_exactly_on_target() {
        let mut s = Settle::new(Point::new(13.7, -4.2), Point::new(1.0, 2.0), MS_100);
        s.tick(Duration::from_millis(60));
        s.tick(Duration::from_millis(60));
        assert!(s.is_complete());
        assert_eq!(s.position(), Point::new(1.0, 2.0));
        assert_eq!(s.value(), 1.0);
    }

    #[test]
    fn zero_duration_is_complete_immediately() {
        let s = Settle::new(Point::new(5.0, 5.0), Point::ZERO, Duration::ZERO);
        assert!(s.is_complete());
        assert_eq!(s.position(), Point::ZERO);
    }

    #[test]
    fn reset_restarts() {
        let mut s = Settle::new(Point::new(10.0, 0.0), Point::ZERO, MS_100).easing(linear);
        s.tick(MS_100);
        s.reset();
        assert_eq!(s.position(), Point::new(10.0, 0.0));
    }
}
