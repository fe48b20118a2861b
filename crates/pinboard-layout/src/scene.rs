#![forbid(unsafe_code)]

//! In-memory retained surface with a minimal flow layout.
//!
//! [`Scene`] is a [`Surface`] for hosts that do not bring their own tree
//! (and for tests). Containers stack their in-flow children in a column or a
//! row, or place them at explicit offsets; floating children are positioned
//! absolutely in screen space. Layout is recomputed eagerly after every
//! mutation.
//!
//! # Example
//!
//! ```
//! use pinboard_layout::scene::{Flow, NodeSpec, Scene};
//! use pinboard_layout::Surface;
//! use pinboard_core::geometry::Rect;
//!
//! let mut scene = Scene::new(400.0, 300.0);
//! let list = scene.append(scene.root(), NodeSpec::new("ul").flow(Flow::Column).size(100.0, 200.0));
//! let a = scene.append(list, NodeSpec::new("li").size(100.0, 40.0));
//! let b = scene.append(list, NodeSpec::new("li").size(100.0, 40.0));
//! assert_eq!(scene.rect(b), Some(Rect::new(0.0, 40.0, 100.0, 40.0)));
//! assert_eq!(scene.children(list), vec![a, b]);
//! ```

use pinboard_core::geometry::{Point, Rect, Sides, Size};

use crate::selector::{Matchable, Selector};
use crate::surface::{NodeId, Surface};

/// How a container positions its in-flow children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Flow {
    /// Top to bottom.
    Column,
    /// Left to right.
    Row,
    /// Each child at its own `position` relative to the container origin.
    #[default]
    Free,
}

/// Description of a node to create.
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    tag: String,
    element_id: Option<String>,
    classes: Vec<String>,
    size: Size,
    margin: Sides,
    flow: Flow,
    position: Point,
}

impl NodeSpec {
    /// A node of the given element type.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    #[must_use]
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    #[must_use]
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    #[must_use]
    pub fn margin(mut self, margin: impl Into<Sides>) -> Self {
        self.margin = margin.into();
        self
    }

    #[must_use]
    pub fn flow(mut self, flow: Flow) -> Self {
        self.flow = flow;
        self
    }

    /// Position relative to a `Flow::Free` parent.
    #[must_use]
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Point::new(x, y);
        self
    }
}

#[derive(Debug, Clone)]
struct Node {
    spec: NodeSpec,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    offset: Point,
    floating: Option<Point>,
    /// Computed border box.
    rect: Rect,
}

/// A retained element tree.
///
/// Node ids are never reused: removing a node vacates its slot for the life
/// of the scene, so a stale id always reads as detached. Each sortable
/// gesture (spacer) and each clone drag (subtree copy) therefore leaves
/// vacant slots behind. [`Scene::len`] counts live nodes only.
#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    root: NodeId,
}

impl Scene {
    /// A scene whose root (`body`) covers `width` x `height`.
    pub fn new(width: f32, height: f32) -> Self {
        let root = Node {
            spec: NodeSpec::new("body").size(width, height),
            parent: None,
            children: Vec::new(),
            offset: Point::ZERO,
            floating: None,
            rect: Rect::new(0.0, 0.0, width, height),
        };
        Self {
            nodes: vec![Some(root)],
            root: NodeId::new(0),
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Create a node and append it to `parent`.
    pub fn append(&mut self, parent: NodeId, spec: NodeSpec) -> NodeId {
        let id = self.alloc(spec);
        self.insert(parent, id, None);
        id
    }

    /// First attached node carrying `#id`.
    pub fn find(&self, element_id: &str) -> Option<NodeId> {
        self.ids()
            .find(|id| self.element_id(*id) == Some(element_id) && self.is_attached(*id))
    }

    /// Element id of `node`, if any.
    pub fn element_id(&self, node: NodeId) -> Option<&str> {
        self.node(node).and_then(|n| n.spec.element_id.as_deref())
    }

    /// Element ids of `node`'s children, in order; unnamed children appear as `"?"`.
    pub fn child_ids(&self, node: NodeId) -> Vec<&str> {
        self.children(node)
            .into_iter()
            .map(|child| self.element_id(child).unwrap_or("?"))
            .collect()
    }

    /// Whether `node` is currently floating.
    pub fn is_floating(&self, node: NodeId) -> bool {
        self.node(node).is_some_and(|n| n.floating.is_some())
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(idx, _)| NodeId::new(idx as u64))
    }

    fn alloc(&mut self, spec: NodeSpec) -> NodeId {
        let rect = Rect::from_origin_size(Point::ZERO, spec.size);
        self.nodes.push(Some(Node {
            spec,
            parent: None,
            children: Vec::new(),
            offset: Point::ZERO,
            floating: None,
            rect,
        }));
        NodeId::new((self.nodes.len() - 1) as u64)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.raw() as usize).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.raw() as usize).and_then(Option::as_mut)
    }

    fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|child| *child != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    fn copy_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let source = self.node(id)?.clone();
        let copy = self.alloc(source.spec.clone());
        if let Some(n) = self.node_mut(copy) {
            n.offset = source.offset;
            n.rect = source.rect;
        }
        for child in source.children {
            let floating = self.node(child).and_then(|n| n.floating);
            if let Some(child_copy) = self.copy_subtree(child) {
                if let Some(c) = self.node_mut(child_copy) {
                    c.parent = Some(copy);
                    c.floating = floating;
                }
                if let Some(n) = self.node_mut(copy) {
                    n.children.push(child_copy);
                }
            }
        }
        Some(copy)
    }

    fn relayout(&mut self) {
        let root = self.root;
        self.layout_children(root);
    }

    fn layout_children(&mut self, id: NodeId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let frame = node.rect;
        let flow = node.spec.flow;
        let children = node.children.clone();
        let mut cursor = match flow {
            Flow::Column => frame.y,
            Flow::Row | Flow::Free => frame.x,
        };

        for child in children {
            let Some(c) = self.node(child) else {
                continue;
            };
            let margin = c.spec.margin;
            let size = c.spec.size;
            let base = if let Some(origin) = c.floating {
                origin
            } else {
                match flow {
                    Flow::Column => {
                        let at = Point::new(frame.x + margin.left, cursor + margin.top);
                        cursor += margin.vertical_sum() + size.height;
                        at
                    }
                    Flow::Row => {
                        let at = Point::new(cursor + margin.left, frame.y + margin.top);
                        cursor += margin.horizontal_sum() + size.width;
                        at
                    }
                    Flow::Free => frame.origin() + c.spec.position,
                }
            };
            let offset = c.offset;
            if let Some(c) = self.node_mut(child) {
                c.rect = Rect::from_origin_size(base + offset, size);
            }
            self.layout_children(child);
        }
    }

    fn hit(&self, id: NodeId, point: Point) -> Option<NodeId> {
        let node = self.node(id)?;
        for child in node.children.iter().rev() {
            if let Some(found) = self.hit(*child, point) {
                return Some(found);
            }
        }
        node.rect.contains(point).then_some(id)
    }
}

/// Borrowed view of a scene node for selector matching.
#[derive(Clone, Copy)]
struct SceneElement<'a> {
    scene: &'a Scene,
    node: &'a Node,
}

impl Matchable for SceneElement<'_> {
    fn tag(&self) -> &str {
        &self.node.spec.tag
    }

    fn element_id(&self) -> Option<&str> {
        self.node.spec.element_id.as_deref()
    }

    fn has_class(&self, class: &str) -> bool {
        self.node.spec.classes.iter().any(|c| c == class)
    }

    fn parent_element(&self) -> Option<Self> {
        let parent = self.scene.node(self.node.parent?)?;
        Some(SceneElement {
            scene: self.scene,
            node: parent,
        })
    }
}

impl Surface for Scene {
    fn is_attached(&self, node: NodeId) -> bool {
        let mut cursor = Some(node);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.node(current).and_then(|n| n.parent);
        }
        false
    }

    fn rect(&self, node: NodeId) -> Option<Rect> {
        self.node(node).map(|n| n.rect)
    }

    fn margin(&self, node: NodeId) -> Sides {
        self.node(node).map(|n| n.spec.margin).unwrap_or_default()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.node(node).map(|n| n.children.clone()).unwrap_or_default()
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.node(node).is_some_and(|n| {
            selector.matches(&SceneElement {
                scene: self,
                node: n,
            })
        })
    }

    fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.hit(self.root, point)
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node)
            .is_some_and(|n| n.spec.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if class.is_empty() {
            return;
        }
        if let Some(n) = self.node_mut(node)
            && !n.spec.classes.iter().any(|c| c == class)
        {
            n.spec.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(n) = self.node_mut(node) {
            n.spec.classes.retain(|c| c != class);
        }
    }

    fn offset(&self, node: NodeId) -> Point {
        self.node(node).map(|n| n.offset).unwrap_or_default()
    }

    fn set_offset(&mut self, node: NodeId, offset: Point) {
        if let Some(n) = self.node_mut(node) {
            n.offset = offset;
        }
        self.relayout();
    }

    fn set_floating(&mut self, node: NodeId, origin: Option<Point>) {
        if let Some(n) = self.node_mut(node) {
            n.floating = origin;
        }
        self.relayout();
    }

    fn duplicate(&mut self, node: NodeId) -> Option<NodeId> {
        let origin = self.rect(node)?.origin();
        let copy = self.copy_subtree(node)?;
        if let Some(n) = self.node_mut(copy) {
            n.offset = Point::ZERO;
            n.floating = Some(origin);
        }
        let root = self.root;
        self.insert(root, copy, None);
        Some(copy)
    }

    fn create_spacer(&mut self, size: Size, margin: Sides) -> NodeId {
        self.alloc(NodeSpec::new("div").size(size.width, size.height).margin(margin))
    }

    fn insert(&mut self, parent: NodeId, node: NodeId, before: Option<NodeId>) {
        if node == parent || self.is_within(parent, node) || self.node(parent).is_none() {
            pinboard_core::trace!(target: pinboard_core::logging::SCENE_TARGET, node = %node, parent = %parent, "insert refused");
            return;
        }
        self.detach(node);
        if let Some(p) = self.node_mut(parent) {
            let idx = before
                .and_then(|b| p.children.iter().position(|c| *c == b))
                .unwrap_or(p.children.len());
            p.children.insert(idx, node);
        }
        if let Some(n) = self.node_mut(node) {
            n.parent = Some(parent);
        }
        self.relayout();
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.root {
            return;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(slot) = self.nodes.get_mut(id.raw() as usize)
                && let Some(n) = slot.take()
            {
                stack.extend(n.children);
            }
        }
        self.relayout();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_list(scene: &mut Scene) -> (NodeId, Vec<NodeId>) {
        let list = scene.append(
            scene.root(),
            NodeSpec::new("ul").id("list").flow(Flow::Column).at(10.0, 20.0).size(100.0, 400.0),
        );
        let items = ["a", "b", "c"]
            .iter()
            .map(|id| scene.append(list, NodeSpec::new("li").id(*id).size(100.0, 30.0).margin((5.0, 0.0))))
            .collect();
        (list, items)
    }

    #[test]
    fn column_flow_stacks_with_margins() {
        let mut scene = Scene::new(500.0, 500.0);
        let (_, items) = column_list(&mut scene);
        assert_eq!(scene.rect(items[0]), Some(Rect::new(10.0, 25.0, 100.0, 30.0)));
        assert_eq!(scene.rect(items[1]), Some(Rect::new(10.0, 65.0, 100.0, 30.0)));
        assert_eq!(scene.rect(items[2]), Some(Rect::new(10.0, 105.0, 100.0, 30.0)));
    }

    #[test]
    fn row_flow_stacks_horizontally() {
        let mut scene = Scene::new(500.0, 500.0);
        let row = scene.append(scene.root(), NodeSpec::new("div").flow(Flow::Row).size(300.0, 50.0));
        let a = scene.append(row, NodeSpec::new("span").size(40.0, 50.0));
        let b = scene.append(row, NodeSpec::new("span").size(60.0, 50.0).margin(Sides::new(0.0, 0.0, 0.0, 4.0)));
        assert_eq!(scene.rect(a).map(|r| r.x), Some(0.0));
        assert_eq!(scene.rect(b).map(|r| r.x), Some(44.0));
    }

    #[test]
    fn floating_leaves_flow() {
        let mut scene = Scene::new(500.0, 500.0);
        let (_, items) = column_list(&mut scene);
        scene.set_floating(items[0], Some(Point::new(200.0, 200.0)));
        assert_eq!(scene.rect(items[0]).map(|r| r.origin()), Some(Point::new(200.0, 200.0)));
        // b moves up into a's slot.
        assert_eq!(scene.rect(items[1]).map(|r| r.y), Some(25.0));
        scene.set_floating(items[0], None);
        assert_eq!(scene.rect(items[1]).map(|r| r.y), Some(65.0));
    }

    #[test]
    fn offset_translates_subtree() {
        let mut scene = Scene::new(500.0, 500.0);
        let card = scene.append(scene.root(), NodeSpec::new("div").at(10.0, 10.0).size(50.0, 50.0));
        let grip = scene.append(card, NodeSpec::new("span").at(5.0, 5.0).size(10.0, 10.0));
        scene.set_offset(card, Point::new(100.0, 0.0));
        assert_eq!(scene.rect(card).map(|r| r.x), Some(110.0));
        assert_eq!(scene.rect(grip).map(|r| r.x), Some(115.0));
        assert_eq!(scene.offset(card), Point::new(100.0, 0.0));
    }

    #[test]
    fn insert_reorders_and_remove_discards() {
        let mut scene = Scene::new(500.0, 500.0);
        let (list, items) = column_list(&mut scene);
        scene.insert(list, items[2], Some(items[0]));
        assert_eq!(scene.child_ids(list), vec!["c", "a", "b"]);
        scene.remove(items[1]);
        assert_eq!(scene.child_ids(list), vec!["c", "a"]);
        assert!(!scene.is_attached(items[1]));
        assert_eq!(scene.rect(items[1]), None);
    }

    #[test]
    fn removed_ids_are_not_reused() {
        let mut scene = Scene::new(500.0, 500.0);
        let (list, _) = column_list(&mut scene);
        let live = scene.len();

        let first = scene.create_spacer(Size::new(10.0, 10.0), Sides::default());
        scene.insert(list, first, None);
        scene.remove(first);
        let second = scene.create_spacer(Size::new(10.0, 10.0), Sides::default());

        assert_ne!(first, second);
        assert!(!scene.is_attached(first));
        assert_eq!(scene.rect(first), None);
        assert_eq!(scene.len(), live + 1);
    }

    #[test]
    fn insert_refuses_cycles() {
        let mut scene = Scene::new(500.0, 500.0);
        let (list, items) = column_list(&mut scene);
        scene.insert(items[0], list, None);
        assert_eq!(scene.parent(list), Some(scene.root()));
    }

    #[test]
    fn hit_test_prefers_deepest_topmost() {
        let mut scene = Scene::new(500.0, 500.0);
        let (list, items) = column_list(&mut scene);
        assert_eq!(scene.hit_test(Point::new(20.0, 30.0)), Some(items[0]));
        assert_eq!(scene.hit_test(Point::new(20.0, 22.0)), Some(list));
        assert_eq!(scene.hit_test(Point::new(450.0, 450.0)), Some(scene.root()));
        assert_eq!(scene.hit_test(Point::new(900.0, 0.0)), None);
    }

    #[test]
    fn duplicate_floats_over_original() {
        let mut scene = Scene::new(500.0, 500.0);
        let (_, items) = column_list(&mut scene);
        scene.add_class(items[1], "note");
        let copy = scene.duplicate(items[1]).unwrap();
        assert_ne!(copy, items[1]);
        assert_eq!(scene.rect(copy), scene.rect(items[1]));
        assert!(scene.has_class(copy, "note"));
        assert_eq!(scene.parent(copy), Some(scene.root()));
        assert!(scene.is_floating(copy));
        // Topmost wins the hit test.
        let center = scene.rect(items[1]).unwrap().center();
        assert_eq!(scene.hit_test(center), Some(copy));
    }

    #[test]
    fn spacer_is_detached_until_inserted() {
        let mut scene = Scene::new(500.0, 500.0);
        let (list, items) = column_list(&mut scene);
        let spacer = scene.create_spacer(Size::new(100.0, 30.0), Sides::from((5.0, 0.0)));
        assert!(!scene.is_attached(spacer));
        scene.insert(list, spacer, Some(items[0]));
        assert_eq!(scene.rect(items[0]).map(|r| r.y), Some(65.0));
    }

    #[test]
    fn classes_and_selectors() {
        let mut scene = Scene::new(500.0, 500.0);
        let (list, items) = column_list(&mut scene);
        scene.add_class(items[0], "chosen");
        scene.add_class(items[0], "chosen");
        assert!(scene.matches(items[0], &Selector::parse("#list li.chosen").unwrap()));
        scene.remove_class(items[0], "chosen");
        assert!(!scene.has_class(items[0], "chosen"));
        let li = Selector::parse("li").unwrap();
        assert_eq!(scene.closest(items[1], &li, list), Some(items[1]));
        assert_eq!(scene.closest(list, &li, list), None);
        assert_eq!(scene.find("b"), Some(items[1]));
    }
}
