#![forbid(unsafe_code)]

//! Registration and pointer routing.
//!
//! [`GestureHub`] owns the host [`Surface`] and every registered controller.
//! The host feeds it raw [`PointerEvent`]s:
//!
//! - A press is hit-tested and offered to the controllers anchored on the hit
//!   node and each of its ancestors, innermost first and in registration order
//!   per node.
//! - Every other event goes only to controllers holding a pointer capture,
//!   i.e. those with a gesture in progress.
//!
//! Handles returned by registration are plain ids. A handle whose
//! registration failed (or whose controller was destroyed) is inert: every
//! operation on it does nothing.

use std::collections::BTreeMap;
use std::time::Duration;

use pinboard_core::event::{PointerEvent, PointerKind};
use pinboard_core::logging::HUB_TARGET;
use pinboard_layout::{NodeId, Selector, Surface};

use crate::boundary::CallbackFault;
use crate::drag::{DragController, DragOptions};
use crate::error::RegistrationError;
use crate::session::{ControllerId, ListenerSet};
use crate::sortable::{SortableController, SortableOptions};

#[derive(Debug)]
enum Controller {
    Drag(DragController),
    Sort(SortableController),
}

impl Controller {
    /// The node whose subtree receives presses for this controller.
    fn anchor(&self) -> NodeId {
        match self {
            Self::Drag(drag) => drag.element(),
            Self::Sort(sort) => sort.list(),
        }
    }

    fn begin(
        &mut self,
        surface: &mut dyn Surface,
        listeners: &ListenerSet,
        target: NodeId,
        event: &PointerEvent,
    ) -> bool {
        match self {
            Self::Drag(drag) => drag.begin(surface, listeners, target, event),
            Self::Sort(sort) => sort.begin(surface, listeners, target, event),
        }
    }

    fn pointer_event(
        &mut self,
        surface: &mut dyn Surface,
        event: &PointerEvent,
    ) -> Result<(), CallbackFault> {
        match self {
            Self::Drag(drag) => drag.pointer_event(surface, event),
            Self::Sort(sort) => sort.pointer_event(surface, event),
        }
    }

    fn teardown(&mut self, surface: &mut dyn Surface) {
        match self {
            Self::Drag(drag) => drag.teardown(surface),
            Self::Sort(sort) => sort.teardown(surface),
        }
    }
}

/// Handle to a registered draggable element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DragHandle(Option<ControllerId>);

impl DragHandle {
    /// A handle bound to nothing.
    pub const INERT: Self = Self(None);

    pub fn is_inert(&self) -> bool {
        self.0.is_none()
    }

    pub fn enable<S: Surface>(&self, hub: &mut GestureHub<S>) {
        if let Some(drag) = hub.draggable_mut(*self) {
            drag.enable();
        }
    }

    /// Stop new gestures; one already running completes normally.
    pub fn disable<S: Surface>(&self, hub: &mut GestureHub<S>) {
        if let Some(drag) = hub.draggable_mut(*self) {
            drag.disable();
        }
    }

    pub fn is_enabled<S: Surface>(&self, hub: &GestureHub<S>) -> bool {
        hub.draggable(*self).is_some_and(DragController::is_enabled)
    }

    pub fn is_dragging<S: Surface>(&self, hub: &GestureHub<S>) -> bool {
        hub.draggable(*self).is_some_and(DragController::is_dragging)
    }

    /// Unregister; an in-progress gesture is torn down without callbacks.
    pub fn destroy<S: Surface>(self, hub: &mut GestureHub<S>) {
        if let Some(id) = self.0 {
            hub.destroy(id);
        }
    }
}

/// Handle to a registered sortable list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SortHandle(Option<ControllerId>);

impl SortHandle {
    /// A handle bound to nothing.
    pub const INERT: Self = Self(None);

    pub fn is_inert(&self) -> bool {
        self.0.is_none()
    }

    /// The list's items in current structural order.
    pub fn get_items<S: Surface>(&self, hub: &GestureHub<S>) -> Vec<NodeId> {
        hub.sortable(*self)
            .map(|sort| sort.items(&hub.surface))
            .unwrap_or_default()
    }

    pub fn enable<S: Surface>(&self, hub: &mut GestureHub<S>) {
        if let Some(sort) = hub.sortable_mut(*self) {
            sort.enable();
        }
    }

    /// Stop new gestures; one already running completes normally.
    pub fn disable<S: Surface>(&self, hub: &mut GestureHub<S>) {
        if let Some(sort) = hub.sortable_mut(*self) {
            sort.disable();
        }
    }

    pub fn is_enabled<S: Surface>(&self, hub: &GestureHub<S>) -> bool {
        hub.sortable(*self).is_some_and(SortableController::is_enabled)
    }

    pub fn is_sorting<S: Surface>(&self, hub: &GestureHub<S>) -> bool {
        hub.sortable(*self).is_some_and(SortableController::is_sorting)
    }

    /// Unregister; an in-progress gesture is torn down without callbacks.
    pub fn destroy<S: Surface>(self, hub: &mut GestureHub<S>) {
        if let Some(id) = self.0 {
            hub.destroy(id);
        }
    }
}

/// Owner of the surface and all gesture controllers.
#[derive(Debug)]
pub struct GestureHub<S: Surface> {
    surface: S,
    controllers: BTreeMap<ControllerId, Controller>,
    next_id: u64,
    listeners: ListenerSet,
    last_fault: Option<CallbackFault>,
}

impl<S: Surface> GestureHub<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            controllers: BTreeMap::new(),
            next_id: 0,
            listeners: ListenerSet::default(),
            last_fault: None,
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access for host-side edits between events.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Make `element` draggable.
    pub fn try_register_draggable(
        &mut self,
        element: NodeId,
        options: DragOptions,
    ) -> Result<DragHandle, RegistrationError> {
        if !self.surface.is_attached(element) {
            return Err(RegistrationError::MissingElement(element));
        }
        let handle = parse_locator("handle", options.handle.as_deref())?;
        let id = self.allocate_id();
        self.controllers
            .insert(id, Controller::Drag(DragController::new(id, element, handle, options)));
        pinboard_core::debug!(target: HUB_TARGET, controller = %id, element = %element, "draggable registered");
        Ok(DragHandle(Some(id)))
    }

    /// Like [`try_register_draggable`](Self::try_register_draggable), but a
    /// refused registration is logged and yields [`DragHandle::INERT`].
    pub fn register_draggable(&mut self, element: NodeId, options: DragOptions) -> DragHandle {
        self.try_register_draggable(element, options)
            .unwrap_or_else(|err| {
                pinboard_core::warn!(target: HUB_TARGET, error = %err, "draggable registration refused");
                DragHandle::INERT
            })
    }

    /// Make the children of `list` reorderable.
    pub fn try_register_sortable(
        &mut self,
        list: NodeId,
        options: SortableOptions,
    ) -> Result<SortHandle, RegistrationError> {
        if !self.surface.is_attached(list) {
            return Err(RegistrationError::MissingElement(list));
        }
        let items = parse_locator("items", options.items.as_deref())?;
        let handle = parse_locator("handle", options.handle.as_deref())?;
        let id = self.allocate_id();
        self.controllers.insert(
            id,
            Controller::Sort(SortableController::new(id, list, items, handle, options)),
        );
        pinboard_core::debug!(target: HUB_TARGET, controller = %id, list = %list, "sortable registered");
        Ok(SortHandle(Some(id)))
    }

    /// Like [`try_register_sortable`](Self::try_register_sortable), but a
    /// refused registration is logged and yields [`SortHandle::INERT`].
    pub fn register_sortable(&mut self, list: NodeId, options: SortableOptions) -> SortHandle {
        self.try_register_sortable(list, options)
            .unwrap_or_else(|err| {
                pinboard_core::warn!(target: HUB_TARGET, error = %err, "sortable registration refused");
                SortHandle::INERT
            })
    }

    fn allocate_id(&mut self) -> ControllerId {
        let id = ControllerId(self.next_id);
        self.next_id += 1;
        id
    }

    fn destroy(&mut self, id: ControllerId) {
        if let Some(mut controller) = self.controllers.remove(&id) {
            controller.teardown(&mut self.surface);
            pinboard_core::debug!(target: HUB_TARGET, controller = %id, "controller destroyed");
        }
    }

    // -----------------------------------------------------------------------
    // Controller access
    // -----------------------------------------------------------------------

    pub fn draggable(&self, handle: DragHandle) -> Option<&DragController> {
        match self.controllers.get(&handle.0?)? {
            Controller::Drag(drag) => Some(drag),
            Controller::Sort(_) => None,
        }
    }

    /// Mutable controller access, e.g. to add or remove drop targets.
    pub fn draggable_mut(&mut self, handle: DragHandle) -> Option<&mut DragController> {
        match self.controllers.get_mut(&handle.0?)? {
            Controller::Drag(drag) => Some(drag),
            Controller::Sort(_) => None,
        }
    }

    pub fn sortable(&self, handle: SortHandle) -> Option<&SortableController> {
        match self.controllers.get(&handle.0?)? {
            Controller::Sort(sort) => Some(sort),
            Controller::Drag(_) => None,
        }
    }

    pub fn sortable_mut(&mut self, handle: SortHandle) -> Option<&mut SortableController> {
        match self.controllers.get_mut(&handle.0?)? {
            Controller::Sort(sort) => Some(sort),
            Controller::Drag(_) => None,
        }
    }

    // -----------------------------------------------------------------------
    // Event routing
    // -----------------------------------------------------------------------

    /// Route one pointer event. Returns whether any controller took it.
    pub fn dispatch(&mut self, event: &PointerEvent) -> bool {
        match event.kind {
            PointerKind::Down => self.dispatch_press(event),
            PointerKind::Move | PointerKind::Up | PointerKind::Leave | PointerKind::Cancel => {
                self.dispatch_captured(event)
            }
        }
    }

    fn dispatch_press(&mut self, event: &PointerEvent) -> bool {
        let Some(hit) = self.surface.hit_test(event.position) else {
            return false;
        };
        let mut started = false;
        let mut cursor = Some(hit);
        while let Some(node) = cursor {
            let anchored: Vec<ControllerId> = self
                .controllers
                .iter()
                .filter(|(_, c)| c.anchor() == node)
                .map(|(id, _)| *id)
                .collect();
            for id in anchored {
                if let Some(controller) = self.controllers.get_mut(&id)
                    && controller.begin(&mut self.surface, &self.listeners, hit, event)
                {
                    started = true;
                }
            }
            cursor = self.surface.parent(node);
        }
        started
    }

    fn dispatch_captured(&mut self, event: &PointerEvent) -> bool {
        let captured = self.listeners.snapshot();
        if captured.is_empty() {
            return false;
        }
        for id in captured {
            let Some(controller) = self.controllers.get_mut(&id) else {
                continue;
            };
            if let Err(fault) = controller.pointer_event(&mut self.surface, event) {
                pinboard_core::error!(
                    target: HUB_TARGET,
                    controller = %id,
                    callback = fault.callback,
                    reason = %fault.message,
                    "host callback panicked; gesture aborted"
                );
                self.last_fault = Some(fault);
            }
        }
        true
    }

    /// Advance settle animations by `dt`. Returns whether any are still running.
    pub fn tick(&mut self, dt: Duration) -> bool {
        let mut running = false;
        for controller in self.controllers.values_mut() {
            if let Controller::Drag(drag) = controller {
                running |= drag.tick(&mut self.surface, dt);
            }
        }
        running
    }

    /// Number of controllers currently capturing the pointer.
    pub fn active_captures(&self) -> usize {
        self.listeners.len()
    }

    /// The most recent callback panic, if any; clears it.
    pub fn take_fault(&mut self) -> Option<CallbackFault> {
        self.last_fault.take()
    }
}

fn parse_locator(
    option: &'static str,
    source: Option<&str>,
) -> Result<Option<Selector>, RegistrationError> {
    source
        .map(Selector::parse)
        .transpose()
        .map_err(|error| RegistrationError::InvalidSelector { option, error })
}
