//! Property-based invariant tests for the in-memory scene.
//!
//! 1. Column flow stacks children top to bottom without overlap.
//! 2. Moving a child within its parent keeps the child set intact.
//! 3. Floating a child takes it out of flow; unfloating restores the layout.

use pinboard_core::geometry::{Point, Sides};
use pinboard_layout::{Flow, NodeId, NodeSpec, Scene, Surface};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn heights() -> impl Strategy<Value = Vec<(f32, f32)>> {
    prop::collection::vec(((1i32..=80), (0i32..=10)).prop_map(|(h, m)| (h as f32, m as f32)), 1..10)
}

fn column(items: &[(f32, f32)]) -> (Scene, NodeId, Vec<NodeId>) {
    let mut scene = Scene::new(500.0, 5000.0);
    let list = scene.append(scene.root(), NodeSpec::new("ul").flow(Flow::Column).size(200.0, 5000.0));
    let nodes = items
        .iter()
        .map(|(h, m)| scene.append(list, NodeSpec::new("li").size(200.0, *h).margin(Sides::all(*m))))
        .collect();
    (scene, list, nodes)
}

// ═════════════════════════════════════════════════════════════════════════
// 1–3. Flow layout
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn column_children_do_not_overlap(items in heights()) {
        let (scene, _, nodes) = column(&items);
        let rects: Vec<_> = nodes.iter().filter_map(|n| scene.rect(*n)).collect();
        prop_assert_eq!(rects.len(), items.len());
        for pair in rects.windows(2) {
            prop_assert!(pair[0].bottom() <= pair[1].y, "{:?} overlaps {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn reinsert_preserves_child_set(items in heights(), from in 0usize..10, to in 0usize..10) {
        let (mut scene, list, nodes) = column(&items);
        let from = from % nodes.len();
        let to = to % nodes.len();
        let before = (to != from).then(|| nodes[to]);
        scene.insert(list, nodes[from], before);

        let mut children = scene.children(list);
        prop_assert_eq!(children.len(), nodes.len());
        children.sort();
        let mut expected = nodes.clone();
        expected.sort();
        prop_assert_eq!(children, expected);
    }

    #[test]
    fn floating_round_trip_restores_layout(items in heights(), pick in 0usize..10) {
        let (mut scene, _, nodes) = column(&items);
        let pick = nodes[pick % nodes.len()];
        let layout: Vec<_> = nodes.iter().map(|n| scene.rect(*n)).collect();

        let origin = scene.rect(pick).map(|r| r.origin()).unwrap_or(Point::ZERO);
        scene.set_floating(pick, Some(origin));
        prop_assert_eq!(scene.rect(pick).map(|r| r.origin()), Some(origin));
        scene.set_floating(pick, None);

        let restored: Vec<_> = nodes.iter().map(|n| scene.rect(*n)).collect();
        prop_assert_eq!(restored, layout);
    }
}
