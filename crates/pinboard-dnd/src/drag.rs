#![forbid(unsafe_code)]

//! Free-form drag controller.
//!
//! One [`DragController`] manages the gestures of one registered element:
//! axis locking, grid snapping, containment, live-vs-clone dragging, drop
//! target hit-testing and the `on_start`/`on_drag`/`on_drop`/`on_end`
//! lifecycle.
//!
//! # State machine
//!
//! ```text
//! Idle --press--> Pressed --move--> Dragging --up/leave--> Dropped | Reverted --> Idle
//!                    \                  \------cancel----> Cancelled ---------> Idle
//!                     \--up/leave/cancel (no movement)---> Reverted ----------> Idle
//! ```
//!
//! ## Invariants
//!
//! 1. At most one gesture per controller; a second press while one is active
//!    is ignored.
//! 2. `on_start` fires exactly once per gesture, on the first move, before any
//!    `on_drag`. A press released without movement only reports `on_end`.
//! 3. `on_end` fires exactly once per gesture that reaches the terminal event.
//! 4. Drop targets are scanned in registration order and the first
//!    overlapping one wins; enter/leave fire once per transition.
//! 5. The clone (if any) never outlives the gesture.
//!
//! ## Failure Modes
//!
//! | Failure | Cause | Fallback |
//! |---------|-------|----------|
//! | Press outside handle | `handle` set, press elsewhere | Gesture not started |
//! | Element detached at press | Host removed it | Gesture not started |
//! | Host callback panics | Bug in host code | Gesture aborted, visuals restored, fault reported |
//! | Terminal event without gesture | Stray event | Ignored |

use std::fmt;
use std::time::Duration;

use pinboard_core::animation::{Animation, Settle};
use pinboard_core::event::{PointerEvent, PointerKind};
use pinboard_core::geometry::{Axis, Point, Rect, clamp_origin, rects_intersect, snap_to_grid};
use pinboard_core::logging::DRAG_TARGET;
use pinboard_layout::{NodeId, Selector, Surface};

use crate::boundary::{Callback, CallbackFault, emit, emit_unless_faulted};
use crate::session::{Capture, ControllerId, ListenerSet, PointerSession};

// ---------------------------------------------------------------------------
// Callback payloads
// ---------------------------------------------------------------------------

/// Payload of `on_start`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragStartEvent {
    pub element: NodeId,
    /// Position of the dragged visual when the gesture started.
    pub x: f32,
    pub y: f32,
    pub event: PointerEvent,
}

/// Payload of `on_drag`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragMoveEvent {
    pub element: NodeId,
    /// Current top-left of the dragged visual.
    pub x: f32,
    pub y: f32,
    /// Drop target currently under the dragged visual.
    pub drop_target: Option<NodeId>,
    pub event: PointerEvent,
}

/// Payload of `on_drop`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropEvent {
    pub element: NodeId,
    pub target: NodeId,
    pub event: PointerEvent,
}

/// Payload of `on_end`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragEndEvent {
    pub element: NodeId,
    pub dropped: bool,
    pub target: Option<NodeId>,
    pub event: PointerEvent,
}

/// Payload of drop-target enter/leave/drop hooks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropContext {
    pub target: NodeId,
    /// The registered (original) element, even when a clone is dragged.
    pub element: NodeId,
    pub event: PointerEvent,
}

// ---------------------------------------------------------------------------
// DropTarget
// ---------------------------------------------------------------------------

/// A destination that can accept a dragged element.
pub struct DropTarget {
    pub node: NodeId,
    /// Class applied while this target is the active one.
    pub hover_class: Option<String>,
    on_enter: Option<Callback<DropContext>>,
    on_leave: Option<Callback<DropContext>>,
    on_drop: Option<Callback<DropContext>>,
}

impl DropTarget {
    /// A target with no hooks.
    #[must_use]
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            hover_class: None,
            on_enter: None,
            on_leave: None,
            on_drop: None,
        }
    }

    #[must_use]
    pub fn with_hover_class(mut self, class: impl Into<String>) -> Self {
        self.hover_class = Some(class.into());
        self
    }

    #[must_use]
    pub fn on_enter(mut self, f: impl FnMut(&DropContext) + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_leave(mut self, f: impl FnMut(&DropContext) + 'static) -> Self {
        self.on_leave = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_drop(mut self, f: impl FnMut(&DropContext) + 'static) -> Self {
        self.on_drop = Some(Box::new(f));
        self
    }

    fn clear_hover(&self, surface: &mut dyn Surface) {
        if let Some(class) = &self.hover_class {
            surface.remove_class(self.node, class);
        }
    }

    fn enter(&mut self, surface: &mut dyn Surface, ctx: &DropContext) -> Result<(), CallbackFault> {
        if let Some(class) = &self.hover_class {
            surface.add_class(self.node, class);
        }
        emit(&mut self.on_enter, "drop_target.on_enter", ctx)
    }

    fn leave(&mut self, surface: &mut dyn Surface, ctx: &DropContext) -> Result<(), CallbackFault> {
        self.clear_hover(surface);
        emit(&mut self.on_leave, "drop_target.on_leave", ctx)
    }

    fn accept(&mut self, surface: &mut dyn Surface, ctx: &DropContext) -> Result<(), CallbackFault> {
        self.clear_hover(surface);
        emit(&mut self.on_drop, "drop_target.on_drop", ctx)
    }
}

impl fmt::Debug for DropTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DropTarget")
            .field("node", &self.node)
            .field("hover_class", &self.hover_class)
            .field("on_enter", &self.on_enter.is_some())
            .field("on_leave", &self.on_leave.is_some())
            .field("on_drop", &self.on_drop.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Containment and visual strategy
// ---------------------------------------------------------------------------

/// Bounds the dragged rectangle must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Containment {
    /// A fixed screen rectangle.
    Rect(Rect),
    /// The element's parent, measured at press.
    Parent,
    /// Another element, measured at press.
    Node(NodeId),
}

impl Containment {
    fn resolve(self, surface: &dyn Surface, element: NodeId) -> Option<Rect> {
        match self {
            Self::Rect(rect) => Some(rect),
            Self::Parent => surface.parent(element).and_then(|p| surface.rect(p)),
            Self::Node(node) => surface.rect(node),
        }
    }
}

/// What moves on screen during a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragVisual {
    /// The registered element itself.
    #[default]
    Live,
    /// A copy floating over the element; the original stays put.
    Clone,
}

impl DragVisual {
    fn acquire(self, surface: &mut dyn Surface, element: NodeId) -> Option<DisplayProxy> {
        match self {
            Self::Live => Some(DisplayProxy {
                node: element,
                base_offset: surface.offset(element),
                owned: false,
            }),
            Self::Clone => surface.duplicate(element).map(|node| DisplayProxy {
                node,
                base_offset: Point::ZERO,
                owned: true,
            }),
        }
    }
}

/// The node actually repositioned during a gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DisplayProxy {
    node: NodeId,
    /// Offset the node had at press.
    base_offset: Point,
    /// Whether the controller created (and must remove) the node.
    owned: bool,
}

impl DisplayProxy {
    fn place(&self, surface: &mut dyn Surface, origin: Point, position: Point) {
        surface.set_offset(self.node, self.base_offset + (position - origin));
    }

    fn release(self, surface: &mut dyn Surface) {
        if self.owned {
            surface.remove(self.node);
        }
    }
}

// ---------------------------------------------------------------------------
// DragOptions
// ---------------------------------------------------------------------------

/// Registration options for a draggable element.
pub struct DragOptions {
    /// Locator for the sub-element(s) that may start a gesture.
    pub handle: Option<String>,
    pub containment: Option<Containment>,
    pub axis: Axis,
    pub visual: DragVisual,
    pub snap_to_grid: bool,
    /// Grid spacing used when `snap_to_grid` is set (default: 20).
    pub grid_size: f32,
    /// Class applied to the dragged visual (default: `"dragging"`).
    pub active_class: String,
    /// Duration of the return-to-origin animation (default: 200ms).
    pub revert_duration: Duration,
    /// Scanned in order; the first overlapping target wins.
    pub drop_targets: Vec<DropTarget>,
    on_start: Option<Callback<DragStartEvent>>,
    on_drag: Option<Callback<DragMoveEvent>>,
    on_drop: Option<Callback<DropEvent>>,
    on_end: Option<Callback<DragEndEvent>>,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            handle: None,
            containment: None,
            axis: Axis::Free,
            visual: DragVisual::Live,
            snap_to_grid: false,
            grid_size: 20.0,
            active_class: "dragging".to_string(),
            revert_duration: Duration::from_millis(200),
            drop_targets: Vec::new(),
            on_start: None,
            on_drag: None,
            on_drop: None,
            on_end: None,
        }
    }
}

impl DragOptions {
    #[must_use]
    pub fn with_handle(mut self, selector: impl Into<String>) -> Self {
        self.handle = Some(selector.into());
        self
    }

    #[must_use]
    pub fn with_containment(mut self, containment: Containment) -> Self {
        self.containment = Some(containment);
        self
    }

    #[must_use]
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Drag a floating copy instead of the element itself.
    #[must_use]
    pub fn clone_visual(mut self) -> Self {
        self.visual = DragVisual::Clone;
        self
    }

    /// Enable grid snapping with the given spacing.
    #[must_use]
    pub fn with_grid(mut self, grid_size: f32) -> Self {
        self.snap_to_grid = true;
        self.grid_size = grid_size;
        self
    }

    #[must_use]
    pub fn with_active_class(mut self, class: impl Into<String>) -> Self {
        self.active_class = class.into();
        self
    }

    #[must_use]
    pub fn with_revert_duration(mut self, duration: Duration) -> Self {
        self.revert_duration = duration;
        self
    }

    #[must_use]
    pub fn with_drop_target(mut self, target: DropTarget) -> Self {
        self.drop_targets.push(target);
        self
    }

    #[must_use]
    pub fn on_start(mut self, f: impl FnMut(&DragStartEvent) + 'static) -> Self {
        self.on_start = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_drag(mut self, f: impl FnMut(&DragMoveEvent) + 'static) -> Self {
        self.on_drag = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_drop(mut self, f: impl FnMut(&DropEvent) + 'static) -> Self {
        self.on_drop = Some(Box::new(f));
        self
    }

    #[must_use]
    pub fn on_end(mut self, f: impl FnMut(&DragEndEvent) + 'static) -> Self {
        self.on_end = Some(Box::new(f));
        self
    }

    fn grid(&self) -> Option<f32> {
        (self.snap_to_grid && self.grid_size > 0.0 && self.grid_size.is_finite())
            .then_some(self.grid_size)
    }

    /// Axis lock, then grid snap, then containment clamp.
    fn constrain(&self, origin: Rect, delta: Point, bounds: Option<Rect>) -> Point {
        let mut position = origin.origin() + delta.constrain(self.axis);
        let grid = self.grid();
        if let Some(g) = grid {
            position = Point::new(snap_to_grid(position.x, g), snap_to_grid(position.y, g));
        }
        if let Some(bounds) = bounds {
            position = clamp_origin(position, origin.size(), &bounds, grid);
        }
        position
    }

    fn hit_test(&self, surface: &dyn Surface, dragged: &Rect, skip: [NodeId; 2]) -> Option<NodeId> {
        self.drop_targets
            .iter()
            .filter(|t| !skip.contains(&t.node) && surface.is_attached(t.node))
            .find(|t| surface.rect(t.node).is_some_and(|r| rects_intersect(dragged, &r)))
            .map(|t| t.node)
    }

    fn target_mut(&mut self, node: NodeId) -> Option<&mut DropTarget> {
        self.drop_targets.iter_mut().find(|t| t.node == node)
    }
}

impl fmt::Debug for DragOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DragOptions")
            .field("handle", &self.handle)
            .field("containment", &self.containment)
            .field("axis", &self.axis)
            .field("visual", &self.visual)
            .field("snap_to_grid", &self.snap_to_grid)
            .field("grid_size", &self.grid_size)
            .field("active_class", &self.active_class)
            .field("revert_duration", &self.revert_duration)
            .field("drop_targets", &self.drop_targets)
            .field("on_start", &self.on_start.is_some())
            .field("on_drag", &self.on_drag.is_some())
            .field("on_drop", &self.on_drop.is_some())
            .field("on_end", &self.on_end.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// DragController
// ---------------------------------------------------------------------------

/// Coarse gesture phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    Idle,
    /// Pressed, no movement yet.
    Pressed,
    Dragging,
}

/// How the most recent gesture ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragOutcome {
    Dropped(NodeId),
    /// Released away from any target; the element returns to its origin.
    Reverted,
    /// Aborted by pointer-cancel, `destroy()`, or a failing callback.
    Cancelled,
}

#[derive(Debug)]
struct DragSession {
    pointer: PointerSession,
    proxy: DisplayProxy,
    containment: Option<Rect>,
    target: Option<NodeId>,
    _capture: Capture,
}

/// Gesture controller for one draggable element.
#[derive(Debug)]
pub struct DragController {
    id: ControllerId,
    element: NodeId,
    handle: Option<Selector>,
    options: DragOptions,
    enabled: bool,
    session: Option<DragSession>,
    settle: Option<Settle>,
    last_outcome: Option<DragOutcome>,
}

impl DragController {
    pub(crate) fn new(
        id: ControllerId,
        element: NodeId,
        handle: Option<Selector>,
        options: DragOptions,
    ) -> Self {
        Self {
            id,
            element,
            handle,
            options,
            enabled: true,
            session: None,
            settle: None,
            last_outcome: None,
        }
    }

    /// The registered element.
    pub fn element(&self) -> NodeId {
        self.element
    }

    pub fn options(&self) -> &DragOptions {
        &self.options
    }

    /// Whether a gesture is in progress (pressed or moving).
    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn phase(&self) -> DragPhase {
        match &self.session {
            None => DragPhase::Idle,
            Some(s) if s.pointer.active => DragPhase::Dragging,
            Some(_) => DragPhase::Pressed,
        }
    }

    pub fn last_outcome(&self) -> Option<DragOutcome> {
        self.last_outcome
    }

    /// Whether the return-to-origin animation is still running.
    pub fn is_settling(&self) -> bool {
        self.settle.is_some()
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

    /// Append a drop target; it ranks after every existing one.
    pub fn push_drop_target(&mut self, target: DropTarget) {
        self.options.drop_targets.push(target);
    }

    /// Unregister the target on `node`.
    pub fn remove_drop_target(&mut self, node: NodeId) -> Option<DropTarget> {
        let idx = self.options.drop_targets.iter().position(|t| t.node == node)?;
        Some(self.options.drop_targets.remove(idx))
    }

    /// Try to start a gesture for a press on `target` (inside the element).
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
        if let Some(handle) = &self.handle
            && surface.closest(target, handle, self.element).is_none()
        {
            pinboard_core::trace!(
                target: DRAG_TARGET,
                element = %self.element,
                handle = %handle,
                "press outside drag handle"
            );
            return false;
        }

        self.snap_settle(surface);
        let Some(origin) = surface.rect(self.element) else {
            return false;
        };
        let Some(proxy) = self.options.visual.acquire(surface, self.element) else {
            return false;
        };
        let containment = self
            .options
            .containment
            .and_then(|c| c.resolve(&*surface, self.element));
        surface.add_class(proxy.node, &self.options.active_class);

        self.session = Some(DragSession {
            pointer: PointerSession::new(event, origin),
            proxy,
            containment,
            target: None,
            _capture: listeners.acquire(self.id),
        });
        self.last_outcome = None;
        pinboard_core::debug!(
            target: DRAG_TARGET,
            element = %self.element,
            x = origin.x,
            y = origin.y,
            clone = proxy.owned,
            "drag pressed"
        );
        true
    }

    /// Route a captured move/up/leave/cancel event.
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
        let element = self.element;
        let options = &mut self.options;
        let Some(active) = self.session.as_mut() else {
            return Ok(());
        };
        if !active.pointer.owns(event) {
            return Ok(());
        }
        let origin = active.pointer.origin;

        if !active.pointer.active {
            active.pointer.active = true;
            let start = DragStartEvent {
                element,
                x: origin.x,
                y: origin.y,
                event: *event,
            };
            emit(&mut options.on_start, "on_start", &start)?;
        }

        let position = options.constrain(origin, active.pointer.delta(event), active.containment);
        active.proxy.place(surface, origin.origin(), position);

        let dragged = origin.moved_to(position);
        let hit = options.hit_test(&*surface, &dragged, [element, active.proxy.node]);
        if hit != active.target {
            let ctx = |target| DropContext {
                target,
                element,
                event: *event,
            };
            if let Some(prev) = active.target.take()
                && let Some(t) = options.target_mut(prev)
            {
                t.leave(surface, &ctx(prev))?;
            }
            active.target = hit;
            if let Some(next) = hit
                && let Some(t) = options.target_mut(next)
            {
                t.enter(surface, &ctx(next))?;
            }
            pinboard_core::trace!(target: DRAG_TARGET, element = %element, drop_target = ?hit, "drop target changed");
        }

        let moved = DragMoveEvent {
            element,
            x: position.x,
            y: position.y,
            drop_target: active.target,
            event: *event,
        };
        emit(&mut options.on_drag, "on_drag", &moved)
    }

    fn finish(&mut self, surface: &mut dyn Surface, event: &PointerEvent) -> Result<(), CallbackFault> {
        let Some(active) = self.session.take_if(|s| s.pointer.owns(event)) else {
            pinboard_core::trace!(target: DRAG_TARGET, element = %self.element, "terminal event without matching gesture");
            return Ok(());
        };
        let element = self.element;
        let proxy = active.proxy;
        surface.remove_class(proxy.node, &self.options.active_class);

        let cancelled = event.kind == PointerKind::Cancel;
        let ctx = |target| DropContext {
            target,
            element,
            event: *event,
        };
        let mut fault = None;

        let mut dropped_on = None;
        if let Some(t) = active.target {
            if let Some(target) = self.options.target_mut(t) {
                let result = if cancelled {
                    target.leave(surface, &ctx(t))
                } else {
                    dropped_on = Some(t);
                    target.accept(surface, &ctx(t))
                };
                if let Err(err) = result {
                    fault = Some(err);
                }
            }
        }
        if let Some(t) = dropped_on {
            let dropped = DropEvent {
                element,
                target: t,
                event: *event,
            };
            emit_unless_faulted(&mut fault, &mut self.options.on_drop, "on_drop", &dropped);
        }

        if proxy.owned {
            proxy.release(surface);
        } else if dropped_on.is_none() {
            self.start_settle(surface, proxy.base_offset);
        }
        self.last_outcome = Some(match dropped_on {
            Some(t) => DragOutcome::Dropped(t),
            None if cancelled => DragOutcome::Cancelled,
            None => DragOutcome::Reverted,
        });

        let ended = DragEndEvent {
            element,
            dropped: dropped_on.is_some(),
            target: dropped_on,
            event: *event,
        };
        emit_unless_faulted(&mut fault, &mut self.options.on_end, "on_end", &ended);
        pinboard_core::debug!(
            target: DRAG_TARGET,
            element = %element,
            outcome = ?self.last_outcome,
            "drag ended"
        );
        // The capture guard drops with `active` here.
        drop(active);
        fault.map_or(Ok(()), Err)
    }

    /// Abort without callbacks, restoring the element and discarding the clone.
    pub(crate) fn teardown(&mut self, surface: &mut dyn Surface) {
        self.snap_settle(surface);
        let Some(active) = self.session.take() else {
            return;
        };
        surface.remove_class(active.proxy.node, &self.options.active_class);
        if let Some(t) = active.target
            && let Some(target) = self.options.drop_targets.iter().find(|d| d.node == t)
        {
            target.clear_hover(surface);
        }
        if active.proxy.owned {
            active.proxy.release(surface);
        } else {
            surface.set_offset(self.element, active.proxy.base_offset);
        }
        self.last_outcome = Some(DragOutcome::Cancelled);
        pinboard_core::debug!(target: DRAG_TARGET, element = %self.element, "drag torn down");
    }

    /// Advance the settle animation. Returns whether it is still running.
    pub(crate) fn tick(&mut self, surface: &mut dyn Surface, dt: Duration) -> bool {
        let element = self.element;
        let Some(settle) = self.settle.as_mut() else {
            return false;
        };
        settle.tick(dt);
        surface.set_offset(element, settle.position());
        if settle.is_complete() {
            self.settle = None;
            return false;
        }
        true
    }

    fn start_settle(&mut self, surface: &mut dyn Surface, to: Point) {
        let from = surface.offset(self.element);
        if self.options.revert_duration.is_zero() || from == to {
            surface.set_offset(self.element, to);
            self.settle = None;
        } else {
            self.settle = Some(Settle::new(from, to, self.options.revert_duration));
        }
    }

    fn snap_settle(&mut self, surface: &mut dyn Surface) {
        if let Some(settle) = self.settle.take() {
            surface.set_offset(self.element, settle.target());
        }
    }
}
