#![forbid(unsafe_code)]

//! The gesture engine's view of the host's visual tree.
//!
//! The host owns every element. Controllers only read geometry and structure,
//! toggle state classes, and (while a gesture is active) reposition, float,
//! duplicate, insert and remove nodes through this trait.

use std::fmt;

use pinboard_core::geometry::{Point, Rect, Sides, Size};

use crate::selector::Selector;

/// Opaque handle to an on-screen element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Wrap a host-side identifier.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The host-side identifier.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Mutable access to a retained visual tree.
///
/// Geometry queries return the element's current border box in screen space,
/// including any offset applied with [`Surface::set_offset`]. Mutations take
/// effect (and re-flow siblings) before the call returns.
pub trait Surface {
    /// Whether `node` exists and is connected to the document root.
    fn is_attached(&self, node: NodeId) -> bool;

    /// Current bounding rectangle.
    fn rect(&self, node: NodeId) -> Option<Rect>;

    /// Outer margins used when the element takes part in flow layout.
    fn margin(&self, node: NodeId) -> Sides;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Direct children in structural order.
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn matches(&self, node: NodeId, selector: &Selector) -> bool;

    /// Topmost, deepest element under `point`.
    fn hit_test(&self, point: Point) -> Option<NodeId>;

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    /// Visual translation relative to the element's laid-out position.
    fn offset(&self, node: NodeId) -> Point;
    fn set_offset(&mut self, node: NodeId, offset: Point);

    /// Take the element out of flow at an absolute screen origin, or put it
    /// back into flow with `None`.
    fn set_floating(&mut self, node: NodeId, origin: Option<Point>);

    /// Create a visually identical copy floating exactly over `node`.
    fn duplicate(&mut self, node: NodeId) -> Option<NodeId>;

    /// Create a detached, empty element of the given size and margins.
    fn create_spacer(&mut self, size: Size, margin: Sides) -> NodeId;

    /// Move `node` under `parent`, before `before` (or last when `None` or
    /// when `before` is not a child of `parent`).
    fn insert(&mut self, parent: NodeId, node: NodeId, before: Option<NodeId>);

    /// Detach and discard `node` and its subtree.
    fn remove(&mut self, node: NodeId);

    /// Whether `node` is `ancestor` or lies inside it.
    fn is_within(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    /// Nearest inclusive ancestor of `node` matching `selector`, without
    /// climbing past `boundary`.
    fn closest(&self, node: NodeId, selector: &Selector, boundary: NodeId) -> Option<NodeId> {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if self.matches(current, selector) {
                return Some(current);
            }
            if current == boundary {
                return None;
            }
            cursor = self.parent(current);
        }
        None
    }
}
