#![forbid(unsafe_code)]

//! Pinboard public facade crate.
//!
//! Re-exports the geometry, pointer, surface, and gesture types hosts need,
//! plus a small prelude. Hosts either implement [`Surface`] for their own
//! visual tree or use the bundled [`Scene`].

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use pinboard_core::animation::{Animation, Settle};
pub use pinboard_core::event::{
    Modifiers, MouseButton, PointerEvent, PointerId, PointerKind, PointerSource,
};
pub use pinboard_core::geometry::{
    Axis, Point, Rect, Sides, Size, clamp_origin, insertion_index, rects_intersect, snap_to_grid,
};

// --- Layout re-exports -----------------------------------------------------

pub use pinboard_layout::{Flow, NodeId, NodeSpec, Scene, Selector, SelectorError, Surface};

// --- Gesture re-exports ----------------------------------------------------

pub use pinboard_dnd::{
    CallbackFault, ChangeEvent, Containment, DragController, DragEndEvent, DragHandle,
    DragMoveEvent, DragOptions, DragOutcome, DragPhase, DragStartEvent, DragVisual, DropContext,
    DropEvent, DropTarget, GestureHub, RegistrationError, SortEndEvent, SortEvent, SortHandle,
    SortStartEvent, SortableController, SortableOptions,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for Pinboard hosts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A draggable or sortable registration was refused.
    Registration(RegistrationError),
    /// A host callback panicked and its gesture was aborted.
    Callback(CallbackFault),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registration(err) => write!(f, "{err}"),
            Self::Callback(fault) => write!(f, "{fault}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registration(err) => Some(err),
            Self::Callback(fault) => Some(fault),
        }
    }
}

impl From<RegistrationError> for Error {
    fn from(err: RegistrationError) -> Self {
        Self::Registration(err)
    }
}

impl From<CallbackFault> for Error {
    fn from(fault: CallbackFault) -> Self {
        Self::Callback(fault)
    }
}

/// Standard result type for Pinboard APIs.
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Axis, Containment, DragHandle, DragOptions, DropTarget, Error, GestureHub, NodeId,
        NodeSpec, PointerEvent, PointerKind, Rect, Result, Scene, SortHandle, SortableOptions,
        Surface,
    };

    pub use crate::{core, dnd, layout};
}

pub use pinboard_core as core;
pub use pinboard_dnd as dnd;
pub use pinboard_layout as layout;
