#![forbid(unsafe_code)]

//! Gesture controllers.
//!
//! - [`DragController`] - free drag with axis lock, grid snap, containment,
//!   clone or live visuals, and drop targets
//! - [`SortableController`] - placeholder-based list reordering
//! - [`GestureHub`] - registration, press hit-testing, and captured routing
//!
//! # Example
//!
//! ```
//! use pinboard_core::event::{PointerEvent, PointerKind};
//! use pinboard_dnd::{GestureHub, SortableOptions};
//! use pinboard_layout::{Flow, NodeSpec, Scene};
//!
//! let mut scene = Scene::new(200.0, 200.0);
//! let list = scene.append(scene.root(), NodeSpec::new("ul").flow(Flow::Column).size(100.0, 200.0));
//! for id in ["a", "b", "c"] {
//!     scene.append(list, NodeSpec::new("li").id(id).size(100.0, 20.0));
//! }
//!
//! let mut hub = GestureHub::new(scene);
//! let sortable = hub.register_sortable(list, SortableOptions::default());
//!
//! hub.dispatch(&PointerEvent::mouse(PointerKind::Down, 5.0, 45.0));
//! hub.dispatch(&PointerEvent::mouse(PointerKind::Move, 5.0, 2.0));
//! hub.dispatch(&PointerEvent::mouse(PointerKind::Up, 5.0, 2.0));
//!
//! assert_eq!(hub.surface().child_ids(list), vec!["c", "a", "b"]);
//! assert_eq!(sortable.get_items(&hub).len(), 3);
//! ```

pub mod boundary;
pub mod drag;
pub mod error;
pub mod hub;
pub mod session;
pub mod sortable;

pub use boundary::{Callback, CallbackFault};
pub use drag::{
    Containment, DragController, DragEndEvent, DragMoveEvent, DragOptions, DragOutcome,
    DragPhase, DragStartEvent, DragVisual, DropContext, DropEvent, DropTarget,
};
pub use error::RegistrationError;
pub use hub::{DragHandle, GestureHub, SortHandle};
pub use session::{Capture, ControllerId, ListenerSet};
pub use sortable::{
    ChangeEvent, SortEndEvent, SortEvent, SortStartEvent, SortableController, SortableOptions,
};
