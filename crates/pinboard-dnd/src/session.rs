#![forbid(unsafe_code)]

//! Per-gesture pointer state and scoped pointer capture.
//!
//! A controller only receives document-level move/up/cancel events while it
//! holds a [`Capture`]. The capture lives inside the controller's gesture
//! session, so dropping the session (normal end, cancel, `destroy()` in the
//! middle of a gesture, or unwinding out of a host callback) always releases
//! it. There is no separate "detach listeners" call to forget.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::fmt;
use std::rc::{Rc, Weak};

use pinboard_core::event::{PointerEvent, PointerId};
use pinboard_core::geometry::{Point, Rect};

/// Registration-order identifier of a controller inside a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ControllerId(pub(crate) u64);

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctl{}", self.0)
    }
}

/// The set of controllers currently capturing the pointer.
#[derive(Debug, Clone, Default)]
pub struct ListenerSet {
    active: Rc<RefCell<BTreeSet<ControllerId>>>,
}

impl ListenerSet {
    /// Start routing document-level events to `id` until the guard drops.
    pub fn acquire(&self, id: ControllerId) -> Capture {
        self.active.borrow_mut().insert(id);
        Capture {
            id,
            set: Rc::downgrade(&self.active),
        }
    }

    /// Whether `id` currently holds a capture.
    pub fn is_captured(&self, id: ControllerId) -> bool {
        self.active.borrow().contains(&id)
    }

    /// Capturing controllers in registration order.
    pub fn snapshot(&self) -> Vec<ControllerId> {
        self.active.borrow().iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.active.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.borrow().is_empty()
    }
}

/// Guard for one controller's pointer capture.
#[derive(Debug)]
pub struct Capture {
    id: ControllerId,
    set: Weak<RefCell<BTreeSet<ControllerId>>>,
}

impl Capture {
    pub fn id(&self) -> ControllerId {
        self.id
    }
}

impl Drop for Capture {
    fn drop(&mut self) {
        if let Some(set) = self.set.upgrade() {
            set.borrow_mut().remove(&self.id);
        }
    }
}

/// Pointer state recorded when a gesture starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSession {
    /// Pointer position at press.
    pub start: Point,
    /// Bounding rectangle of the gesture's element at press.
    pub origin: Rect,
    /// The pointer that owns the gesture.
    pub pointer: PointerId,
    /// Set once the first move has been processed.
    pub active: bool,
}

impl PointerSession {
    pub fn new(event: &PointerEvent, origin: Rect) -> Self {
        Self {
            start: event.position,
            origin,
            pointer: event.pointer_id(),
            active: false,
        }
    }

    /// Whether `event` belongs to this gesture.
    pub fn owns(&self, event: &PointerEvent) -> bool {
        event.pointer_id() == self.pointer && event.is_primary()
    }

    /// Pointer travel since press.
    pub fn delta(&self, event: &PointerEvent) -> Point {
        event.position - self.start
    }
}
