#![forbid(unsafe_code)]

//! Canonical pointer event types.
//!
//! Hosts translate their native mouse and touch input into [`PointerEvent`]s
//! and feed them to the gesture hub. Only the primary mouse button and the
//! primary touch point drive gestures; everything else is carried through so
//! the filtering decision stays in one place ([`PointerEvent::is_primary`]).

use bitflags::bitflags;

use crate::geometry::Point;

/// Phase of a pointer interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    /// Button pressed or finger touched down.
    Down,
    /// Pointer moved.
    Move,
    /// Button released or finger lifted.
    Up,
    /// Pointer left the surface while pressed. Ends a gesture like `Up`.
    Leave,
    /// The platform aborted the interaction (e.g. touch cancel).
    Cancel,
}

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// The device that produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSource {
    /// Mouse input. For moves, the button is the one currently held.
    Mouse(MouseButton),
    /// Touch input.
    Touch {
        /// Platform touch identifier, stable for the lifetime of a touch.
        id: u64,
        /// Whether this is the first touch point of the current contact set.
        primary: bool,
    },
}

/// Identity of a pointer across the events of one gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerId {
    Mouse,
    Touch(u64),
}

bitflags! {
    /// Modifier keys held during a pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A single pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub source: PointerSource,
    pub position: Point,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new event.
    #[must_use]
    pub const fn new(kind: PointerKind, source: PointerSource, position: Point) -> Self {
        Self {
            kind,
            source,
            position,
            modifiers: Modifiers::NONE,
        }
    }

    /// Left-button mouse event at `(x, y)`.
    #[must_use]
    pub const fn mouse(kind: PointerKind, x: f32, y: f32) -> Self {
        Self::new(kind, PointerSource::Mouse(MouseButton::Left), Point::new(x, y))
    }

    /// Primary touch event at `(x, y)`.
    #[must_use]
    pub const fn touch(kind: PointerKind, id: u64, x: f32, y: f32) -> Self {
        Self::new(
            kind,
            PointerSource::Touch { id, primary: true },
            Point::new(x, y),
        )
    }

    /// Attach modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Override the source.
    #[must_use]
    pub const fn with_source(mut self, source: PointerSource) -> Self {
        self.source = source;
        self
    }

    /// Whether this event comes from the left mouse button or the primary touch point.
    #[must_use]
    pub const fn is_primary(&self) -> bool {
        match self.source {
            PointerSource::Mouse(button) => matches!(button, MouseButton::Left),
            PointerSource::Touch { primary, .. } => primary,
        }
    }

    /// Identity used to match follow-up events to the pointer that started a gesture.
    #[must_use]
    pub const fn pointer_id(&self) -> PointerId {
        match self.source {
            PointerSource::Mouse(_) => PointerId::Mouse,
            PointerSource::Touch { id, .. } => PointerId::Touch(id),
        }
    }

    /// Whether this event terminates a gesture.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(
            self.kind,
            PointerKind::Up | PointerKind::Leave | PointerKind::Cancel
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_mouse_is_primary() {
        let ev = PointerEvent::mouse(PointerKind::Down, 1.0, 2.0);
        assert!(ev.is_primary());
        assert_eq!(ev.position, Point::new(1.0, 2.0));
        assert_eq!(ev.pointer_id(), PointerId::Mouse);
    }

    #[test]
    fn secondary_buttons_are_not_primary() {
        for button in [MouseButton::Right, MouseButton::Middle] {
            let ev = PointerEvent::mouse(PointerKind::Down, 0.0, 0.0)
                .with_source(PointerSource::Mouse(button));
            assert!(!ev.is_primary(), "{button:?} should not be primary");
        }
    }

    #[test]
    fn secondary_touch_is_not_primary() {
        let ev = PointerEvent::touch(PointerKind::Down, 4, 0.0, 0.0).with_source(
            PointerSource::Touch {
                id: 5,
                primary: false,
            },
        );
        assert!(!ev.is_primary());
        assert_eq!(ev.pointer_id(), PointerId::Touch(5));
    }

    #[test]
    fn terminal_kinds() {
        assert!(PointerEvent::mouse(PointerKind::Up, 0.0, 0.0).is_terminal());
        assert!(PointerEvent::mouse(PointerKind::Leave, 0.0, 0.0).is_terminal());
        assert!(PointerEvent::mouse(PointerKind::Cancel, 0.0, 0.0).is_terminal());
        assert!(!PointerEvent::mouse(PointerKind::Move, 0.0, 0.0).is_terminal());
    }

    #[test]
    fn modifiers_default_to_none() {
        let ev = PointerEvent::mouse(PointerKind::Move, 0.0, 0.0);
        assert_eq!(ev.modifiers, Modifiers::NONE);
        let ev = ev.with_modifiers(Modifiers::SHIFT | Modifiers::CTRL);
        assert!(ev.modifiers.contains(Modifiers::CTRL));
    }
}
