#![forbid(unsafe_code)]

//! Reorderable list controller.
//!
//! The list's structural child order is the only source of truth for item
//! order. During a gesture the dragged item floats above the list while a
//! placeholder (sized and spaced like the item) reserves the candidate slot.
//! On release the item is spliced in front of the placeholder and the final
//! index is read back from the container.
//!
//! # Candidate index
//!
//! The candidate is computed against the *other* items (the list without the
//! dragged item), so it is directly the item's index after the splice:
//!
//! - `Axis::Y` / `Axis::X`: first other item whose midpoint lies past the
//!   pointer.
//! - `Axis::Free`: first other item containing the pointer.
//!
//! When no item qualifies the candidate is `others.len()` (end of list).

use std::fmt;

use pinboard_core::event::{PointerEvent, PointerKind};
use pinboard_core::geometry::{Axis, Point, Rect, insertion_index};
use pinboard_core::logging::SORT_TARGET;
use pinboard_layout::{NodeId, Selector, Surface};

use crate::boundary::{Callback, CallbackFault, emit, emit_unless_faulted};
use crate::session::{Capture, ControllerId, ListenerSet, PointerSession};

/// Payload of the sortable `on_start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortStartEvent {
    pub item: NodeId,
    pub index: usize,
    pub event: PointerEvent,
}

/// Payload of `on_sort`: the candidate slot moved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortEvent {
    pub item: NodeId,
    pub start_index: usize,
    pub current_index: usize,
    pub event: PointerEvent,
}

/// Payload of `on_change`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChangeEvent {
    pub item: NodeId,
    pub old_index: usize,
    pub new_index: usize,
    pub event: PointerEvent,
}

/// Payload of the sortable `on_end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SortEndEvent {
    pub item: NodeId,
    pub old_index: usize,
    pub new_index: usize,
    pub changed: bool,
    pub event: PointerEvent,
}

// ---------------------------------------------------------------------------
// SortableOptions
// ---------------------------------------------------------------------------

/// Registration options for a sortable list.
pub struct SortableOptions {
    /// Which children count as items. `None` means every child.
    pub items: Option<String>,
    pub handle: Option<String>,
    /// Default: `Axis::Y`.
    pub axis: Axis,
    /// Class on the dragged item (default: `"sortable-drag"`).
    pub dragging_class: String,
    /// Class on the placeholder (default: `"sortable-ghost"`).
    pub ghost_class: String,
    /// Class on the chosen item (default: `"sortable-chosen"`).
    pub chosen_class: String,
    /// Register in the disabled state.
    pub disabled: bool,
    on_start: Option<Callback<SortStartEvent>>,
    on_sort: Option<Callback<SortEvent>>,
    on_change: Option<Callback<ChangeEvent>>,
    on_end: Option<Callback<SortEndEvent>>,
}

impl Default for SortableOptions {
    fn default() -> Self {
        Self {
            items: None,
            handle: None,
            axis: Axis::Y,
            dragging_class: "sortable-drag".to_string(),
            ghost_class: "sortable-ghost".to_string(),
            chosen_class: "sortable-chosen".to_string(),
            disabled: false,
            on_start: None,
            on_sort: None,
            on_change: None,
            on_end: None,
        }
    }
}

impl SortableOptions {
    #[must_use]
    pub fn with_items(mut self, selector: impl Into<String>) -> Self {
        self.items = Some(selector.into());
        self
    }

    #[must_use]
    pub fn with_handle(mut self, selector: impl Into<String>) -> Self {
        self.handle = Some(selector.into());
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    #[must_use]
    pub fn with_dragging_class(mut self, class: impl Into<String>) -> Self {
        self.dragging_class = class.into();
        self
    }

    #[must_use]
    pub fn with_ghost_class(mut self, class: impl Into<String>) -> Self {
        self.ghost_class = class.into();
        self
    }

    #[must_use]
    pub fn with_chosen_class(mut self, class: impl Into<String>) -> Self {
        self.chosen_class = class.into();
        self
    }

    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    #[must_use]
    pub fn on_start(mut self, f: impl FnMut(&SortStartEvent) + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_sort(mut self, f: impl FnMut(&SortEvent) + 'static) -> Self {
        self.on_sort = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_change(mut self, f: impl FnMut(&ChangeEvent) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_end(mut self, f: impl FnMut(&SortEndEvent) + 'static) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }
}

impl fmt::Debug for SortableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SortableOptions")
            .field("items", &self.items)
            .field("handle", &self.handle)
            .field("axis", &self.axis)
            .field("dragging_class", &self.dragging_class)
            .field("ghost_class", &self.ghost_class)
            .field("chosen_class", &self.chosen_class)
            .field("disabled", &self.disabled)
            .field("on_start", &self.on_start.is_some())
            .field("on_sort", &self.on_sort.is_some())
            .field("on_change", &self.on_change.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// SortableController
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SortSession {
    pointer: PointerSession,
    item: NodeId,
    start_index: usize,
    /// Offset the item had at press; restored on release.
    base_offset: Point,
    placeholder: NodeId,
    candidate: usize,
    _capture: Capture,
}

/// Gesture controller for one sortable list.
#[derive(Debug)]
pub struct SortableController {
    id: ControllerId,
    list: NodeId,
    items: Option<Selector>,
    handle: Option<Selector>,
    options: SortableOptions,
    enabled: bool,
    session: Option<SortSession>,
}

impl SortableController {
    pub(crate) fn new(
        id: ControllerId,
        list: NodeId,
        items: Option<Selector>,
        handle: Option<Selector>,
        options: SortableOptions,
    ) -> Self {
        Self {
            id,
            list,
            items,
            handle,
            enabled: !options.disabled,
            options,
            session: None,
        }
    }

    /// The registered list container.
    pub fn list(&self) -> NodeId {
        self.list
    }

    pub fn options(&self) -> &SortableOptions {
        &self.options
    }

    /// Current items in structural order, queried fresh from the container.
    /// The placeholder is never reported.
    pub fn items(&self, surface: &dyn Surface) -> Vec<NodeId> {
        let placeholder = self.session.as_ref().map(|s| s.placeholder);
        surface
            .children(self.list)
            .into_iter()
            .filter(|child| Some(*child) != placeholder && self.is_item(surface, *child))
            .collect()
    }

    pub fn is_sorting(&self) -> bool {
        self.session.is_some()
    }

    /// The dragged item, while a gesture is active.
    pub fn dragged_item(&self) -> Option<NodeId> {
        self.session.as_ref().map(|s| s.item)
    }

    /// Last computed candidate index, while a gesture is active.
    pub fn candidate_index(&self) -> Option<usize> {
        self.session.as_ref().map(|s| s.candidate)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Refuse new gestures. A gesture already in progress runs to completion.
    pub fn disable(&mut self) {
        self.enabled = false;
    }

    fn is_item(&self, surface: &dyn Surface, node: NodeId) -> bool {
        self.items
            .as_ref()
            .is_none_or(|selector| surface.matches(node, selector))
    }

    /// Nearest inclusive ancestor of `target` that is an item of this list.
    fn item_for(&self, surface: &dyn Surface, target: NodeId) -> Option<NodeId> {
        let mut cursor = target;
        loop {
            let parent = surface.parent(cursor)?;
            if parent == self.list {
                return self.is_item(surface, cursor).then_some(cursor);
            }
            cursor = parent;
        }
    }

    pub(crate) fn begin(
        &mut self,
        surface: &mut dyn Surface,
        listeners: &ListenerSet,
        target: NodeId,
        event: &PointerEvent,
    ) -> bool {
        if !self.enabled || self.session.is_some() || !event.is_primary() {
            return false;
        }
        let Some(item) = self.item_for(&*surface, target) else {
            pinboard_core::trace!(target: SORT_TARGET, list = %self.list, "press outside any item");
            return false;
        };
        if let Some(handle) = &self.handle
            && surface.closest(target, handle, item).is_none()
        {
            pinboard_core::trace!(target: SORT_TARGET, list = %self.list, handle = %handle, "press outside sort handle");
            return false;
        }
        let Some(start_index) = self.items(&*surface).iter().position(|n| *n == item) else {
            return false;
        };
        let Some(rect) = surface.rect(item) else {
            return false;
        };

        let base_offset = surface.offset(item);
        let next_sibling = {
            let siblings = surface.children(self.list);
            siblings
                .iter()
                .position(|n| *n == item)
                .and_then(|idx| siblings.get(idx + 1).copied())
        };
        let margin = surface.margin(item);
        let placeholder = surface.create_spacer(rect.size(), margin);
        surface.add_class(placeholder, &self.options.ghost_class);
        surface.insert(self.list, placeholder, next_sibling);
        surface.set_floating(item, Some(rect.origin() - base_offset));
        surface.add_class(item, &self.options.dragging_class);
        surface.add_class(item, &self.options.chosen_class);

        self.session = Some(SortSession {
            pointer: PointerSession::new(event, rect),
            item,
            start_index,
            base_offset,
            placeholder,
            candidate: start_index,
            _capture: listeners.acquire(self.id),
        });
        pinboard_core::debug!(target: SORT_TARGET, list = %self.list, item = %item, index = start_index, "sort pressed");
        true
    }

    pub(crate) fn pointer_event(
        &mut self,
        surface: &mut dyn Surface,
        event: &PointerEvent,
    ) -> Result<(), CallbackFault> {
        match event.kind {
            PointerKind::Move => {
                let result = self.apply_move(surface, event);
                if result.is_err() {
                    self.teardown(surface);
                }
                result
            }
            PointerKind::Up | PointerKind::Leave | PointerKind::Cancel => self.finish(surface, event),
            PointerKind::Down => Ok(()),
        }
    }

    fn apply_move(
        &mut self,
        surface: &mut dyn Surface,
        event: &PointerEvent,
    ) -> Result<(), CallbackFault> {
        let Some(active) = self.session.as_ref() else {
            return Ok(());
        };
        if !active.pointer.owns(event) {
            return Ok(());
        }
        let item = active.item;
        let axis = self.options.axis;

        let others: Vec<NodeId> = self
            .items(&*surface)
            .into_iter()
            .filter(|n| *n != item)
            .collect();

        let Some(active) = self.session.as_mut() else {
            return Ok(());
        };
        if !active.pointer.active {
            active.pointer.active = true;
            let start = SortStartEvent {
                item,
                index: active.start_index,
                event: *event,
            };
            emit(&mut self.options.on_start, "on_start", &start)?;
        }

        let delta = active.pointer.delta(event).constrain(axis);
        surface.set_offset(item, active.base_offset + delta);

        let rects: Vec<Rect> = others
            .iter()
            .map(|n| surface.rect(*n).unwrap_or_default())
            .collect();
        let candidate = insertion_index(&rects, event.position, axis).unwrap_or(others.len());
        if candidate == active.candidate {
            return Ok(());
        }

        place_placeholder(surface, self.list, active.placeholder, &others, candidate);
        active.candidate = candidate;
        pinboard_core::trace!(target: SORT_TARGET, list = %self.list, item = %item, candidate, "candidate moved");
        let sorted = SortEvent {
            item,
            start_index: active.start_index,
            current_index: candidate,
            event: *event,
        };
        emit(&mut self.options.on_sort, "on_sort", &sorted)
    }

    fn finish(&mut self, surface: &mut dyn Surface, event: &PointerEvent) -> Result<(), CallbackFault> {
        let Some(active) = self.session.take_if(|s| s.pointer.owns(event)) else {
            pinboard_core::trace!(target: SORT_TARGET, list = %self.list, "terminal event without matching gesture");
            return Ok(());
        };
        let item = active.item;
        let old_index = active.start_index;
        if event.kind == PointerKind::Cancel {
            self.restore_start_slot(surface, &active);
        }
        self.settle_item(surface, &active);

        let new_index = self
            .items(&*surface)
            .iter()
            .position(|n| *n == item)
            .unwrap_or(old_index);
        let changed = new_index != old_index;

        let mut fault = None;
        if changed {
            let change = ChangeEvent {
                item,
                old_index,
                new_index,
                event: *event,
            };
            emit_unless_faulted(&mut fault, &mut self.options.on_change, "on_change", &change);
        }
        let ended = SortEndEvent {
            item,
            old_index,
            new_index,
            changed,
            event: *event,
        };
        emit_unless_faulted(&mut fault, &mut self.options.on_end, "on_end", &ended);
        pinboard_core::debug!(target: SORT_TARGET, list = %self.list, item = %item, old_index, new_index, changed, "sort ended");
        drop(active);
        fault.map_or(Ok(()), Err)
    }

    /// Abort without callbacks; the item returns to its start slot.
    pub(crate) fn teardown(&mut self, surface: &mut dyn Surface) {
        let Some(active) = self.session.take() else {
            return;
        };
        self.restore_start_slot(surface, &active);
        self.settle_item(surface, &active);
        pinboard_core::debug!(target: SORT_TARGET, list = %self.list, item = %active.item, "sort torn down");
    }

    fn restore_start_slot(&self, surface: &mut dyn Surface, active: &SortSession) {
        let others: Vec<NodeId> = surface
            .children(self.list)
            .into_iter()
            .filter(|n| *n != active.item && *n != active.placeholder && self.is_item(&*surface, *n))
            .collect();
        place_placeholder(surface, self.list, active.placeholder, &others, active.start_index);
    }

    /// Return the item to flow in front of the placeholder, then drop the placeholder.
    fn settle_item(&self, surface: &mut dyn Surface, active: &SortSession) {
        let item = active.item;
        surface.set_floating(item, None);
        surface.set_offset(item, active.base_offset);
        surface.remove_class(item, &self.options.dragging_class);
        surface.remove_class(item, &self.options.chosen_class);
        if surface.parent(active.placeholder) == Some(self.list) {
            surface.insert(self.list, item, Some(active.placeholder));
        }
        surface.remove(active.placeholder);
    }
}

/// Move `placeholder` so that it sits at index `slot` among `others`.
fn place_placeholder(
    surface: &mut dyn Surface,
    list: NodeId,
    placeholder: NodeId,
    others: &[NodeId],
    slot: usize,
) {
    if let Some(before) = others.get(slot) {
        surface.insert(list, placeholder, Some(*before));
        return;
    }
    let Some(last) = others.last() else {
        return;
    };
    let siblings: Vec<NodeId> = surface
        .children(list)
        .into_iter()
        .filter(|n| *n != placeholder)
        .collect();
    let after_last = siblings
        .iter()
        .position(|n| n == last)
        .and_then(|idx| siblings.get(idx + 1).copied());
    surface.insert(list, placeholder, after_last);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinboard_layout::{Flow, NodeSpec, Scene};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn list_scene(ids: &[&str]) -> (Scene, NodeId) {
        let mut scene = Scene::new(400.0, 400.0);
        let list = scene.append(
            scene.root(),
            NodeSpec::new("ul").id("list").flow(Flow::Column).size(200.0, 400.0),
        );
        for id in ids {
            scene.append(list, NodeSpec::new("li").id(*id).size(200.0, 40.0));
        }
        (scene, list)
    }

    fn ctl(list: NodeId, options: SortableOptions) -> SortableController {
        SortableController::new(ControllerId(0), list, None, None, options)
    }

    fn mouse(kind: PointerKind, x: f32, y: f32) -> PointerEvent {
        PointerEvent::mouse(kind, x, y)
    }

    #[test]
    fn items_exclude_placeholder() {
        let (mut scene, list) = list_scene(&["a", "b"]);
        let listeners = ListenerSet::default();
        let mut sort = ctl(list, SortableOptions::default());
        let a = scene.find("a").unwrap();
        assert!(sort.begin(&mut scene, &listeners, a, &mouse(PointerKind::Down, 10.0, 10.0)));
        assert_eq!(scene.children(list).len(), 3);
        assert_eq!(sort.items(&scene).len(), 2);
        assert!(scene.is_floating(a));
        assert!(scene.has_class(a, "sortable-chosen"));
    }

    #[test]
    fn placeholder_reserves_the_slot() {
        let (mut scene, list) = list_scene(&["a", "b", "c"]);
        let listeners = ListenerSet::default();
        let mut sort = ctl(list, SortableOptions::default());
        let b = scene.find("b").unwrap();
        let c = scene.find("c").unwrap();
        assert!(sort.begin(&mut scene, &listeners, b, &mouse(PointerKind::Down, 10.0, 50.0)));
        assert_eq!(scene.rect(b).map(|r| r.y), Some(40.0));
        assert_eq!(scene.rect(c).map(|r| r.y), Some(80.0));
    }

    #[test]
    fn release_without_gesture_is_noop() {
        let (mut scene, list) = list_scene(&["a"]);
        let ended = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&ended);
        let mut sort = ctl(list, SortableOptions::default().on_end(move |_| *sink.borrow_mut() += 1));
        assert_eq!(sort.pointer_event(&mut scene, &mouse(PointerKind::Up, 0.0, 0.0)), Ok(()));
        assert_eq!(*ended.borrow(), 0);
    }

    #[test]
    fn press_on_list_gap_is_ignored() {
        let (mut scene, list) = list_scene(&["a"]);
        let listeners = ListenerSet::default();
        let mut sort = ctl(list, SortableOptions::default());
        assert!(!sort.begin(&mut scene, &listeners, list, &mouse(PointerKind::Down, 10.0, 300.0)));
        assert!(listeners.is_empty());
    }

    #[test]
    fn disabled_option_starts_disabled() {
        let (mut scene, list) = list_scene(&["a"]);
        let listeners = ListenerSet::default();
        let mut sort = ctl(list, SortableOptions::default().disabled());
        let a = scene.find("a").unwrap();
        assert!(!sort.is_enabled());
        assert!(!sort.begin(&mut scene, &listeners, a, &mouse(PointerKind::Down, 10.0, 10.0)));
        sort.enable();
        assert!(sort.begin(&mut scene, &listeners, a, &mouse(PointerKind::Down, 10.0, 10.0)));
    }

    #[test]
    fn disable_mid_gesture_still_completes() {
        let (mut scene, list) = list_scene(&["a", "b"]);
        let listeners = ListenerSet::default();
        let mut sort = ctl(list, SortableOptions::default());
        let b = scene.find("b").unwrap();
        assert!(sort.begin(&mut scene, &listeners, b, &mouse(PointerKind::Down, 10.0, 50.0)));
        sort.disable();
        sort.pointer_event(&mut scene, &mouse(PointerKind::Move, 10.0, 5.0)).unwrap();
        sort.pointer_event(&mut scene, &mouse(PointerKind::Up, 10.0, 5.0)).unwrap();
        assert_eq!(scene.child_ids(list), vec!["b", "a"]);
    }

    #[test]
    fn cancel_restores_start_slot() {
        let (mut scene, list) = list_scene(&["a", "b", "c"]);
        let listeners = ListenerSet::default();
        let changed = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&changed);
        let mut sort = ctl(
            list,
            SortableOptions::default().on_end(move |e| *sink.borrow_mut() = Some(e.changed)),
        );
        let c = scene.find("c").unwrap();
        assert!(sort.begin(&mut scene, &listeners, c, &mouse(PointerKind::Down, 10.0, 90.0)));
        sort.pointer_event(&mut scene, &mouse(PointerKind::Move, 10.0, 5.0)).unwrap();
        assert_eq!(sort.candidate_index(), Some(0));
        sort.pointer_event(&mut scene, &mouse(PointerKind::Cancel, 10.0, 5.0)).unwrap();
        assert_eq!(scene.child_ids(list), vec!["a", "b", "c"]);
        assert_eq!(*changed.borrow(), Some(false));
        assert!(!scene.is_floating(c));
        assert_eq!(scene.rect(c).map(|r| r.y), Some(80.0));
    }

    #[test]
    fn item_selector_skips_non_items() {
        let mut scene = Scene::new(400.0, 400.0);
        let list = scene.append(scene.root(), NodeSpec::new("ul").flow(Flow::Column).size(200.0, 400.0));
        scene.append(list, NodeSpec::new("li").id("header").class("header").size(200.0, 20.0));
        let a = scene.append(list, NodeSpec::new("li").id("a").class("row").size(200.0, 40.0));
        scene.append(list, NodeSpec::new("li").id("b").class("row").size(200.0, 40.0));
        let selector = Selector::parse(".row").ok();
        let sort = SortableController::new(ControllerId(0), list, selector, None, SortableOptions::default());
        assert_eq!(sort.items(&scene).len(), 2);
        assert_eq!(sort.items(&scene).first(), Some(&a));
        let header = scene.find("header").unwrap();
        assert_eq!(sort.item_for(&scene, header), None);
    }

    #[test]
    fn options_debug_hides_closures() {
        let opts = SortableOptions::default().on_change(|_| {});
        let dbg = format!("{opts:?}");
        assert!(dbg.contains("on_change: true"));
        assert!(dbg.contains("on_sort: false"));
    }
}
