#![forbid(unsafe_code)]

//! Surface abstraction and scene primitives.
//!
//! - [`Surface`] - what the gesture controllers need from a host's visual tree
//! - [`Selector`] - handle and item locators
//! - [`Scene`] - an in-memory [`Surface`] with column/row/free flow layout

pub mod scene;
pub mod selector;
pub mod surface;

pub use pinboard_core::geometry::{Point, Rect, Sides, Size};
pub use scene::{Flow, NodeSpec, Scene};
pub use selector::{Matchable, Selector, SelectorError};
pub use surface::{NodeId, Surface};
