//! Ordered listener registry with deferred after-notifications.

use std::collections::{HashSet, VecDeque};
use std::fmt;

use super::traits::{ShadowVariableSink, VariableListener};
use crate::domain::EntityRef;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notification {
    VariableChanged(usize),
    EntityAdded(usize),
    EntityRemoved(usize),
    ListChanged { entity: usize, from: usize, to: usize },
    ElementUnassigned(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NotificationKey {
    Variable(usize),
    Added(usize),
    Removed(usize),
    List(usize),
    Unassigned(usize),
}

impl Notification {
    fn key(&self) -> NotificationKey {
        match *self {
            Notification::VariableChanged(e) => NotificationKey::Variable(e),
            Notification::EntityAdded(e) => NotificationKey::Added(e),
            Notification::EntityRemoved(e) => NotificationKey::Removed(e),
            Notification::ListChanged { entity, .. } => NotificationKey::List(entity),
            Notification::ElementUnassigned(e) => NotificationKey::Unassigned(e),
        }
    }

    fn concerns_entity(&self, entity: usize) -> bool {
        match *self {
            Notification::VariableChanged(e)
            | Notification::EntityAdded(e)
            | Notification::ListChanged { entity: e, .. } => e == entity,
            Notification::EntityRemoved(_) | Notification::ElementUnassigned(_) => false,
        }
    }
}

struct ListenerSlot<S> {
    listener: Box<dyn VariableListener<S>>,
    queue: VecDeque<Notification>,
    queued: HashSet<NotificationKey>,
}

impl<S> ListenerSlot<S> {
    fn matches(&self, descriptor_index: usize, variable: Option<&str>) -> bool {
        let source = self.listener.source();
        source.descriptor_index == descriptor_index
            && variable.map_or(true, |v| v == source.variable)
    }

    fn enqueue(&mut self, notification: Notification) {
        self.queued.insert(notification.key());
        self.queue.push_back(notification);
    }

    fn dispatch_after(
        &mut self,
        notification: Notification,
        solution: &mut S,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        let listener = &mut self.listener;
        match notification {
            Notification::VariableChanged(e) => listener.after_variable_changed(solution, e, sink),
            Notification::EntityAdded(e) => listener.after_entity_added(solution, e, sink),
            Notification::EntityRemoved(e) => listener.after_entity_removed(solution, e, sink),
            Notification::ListChanged { entity, from, to } => {
                listener.after_list_changed(solution, entity, from, to, sink)
            }
            Notification::ElementUnassigned(e) => {
                listener.after_element_unassigned(solution, e, sink)
            }
        }
    }

    /// Runs the pending after-hooks concerning `entity` right away.
    fn flush_entity(
        &mut self,
        entity: usize,
        solution: &mut S,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        let (due, rest): (Vec<_>, Vec<_>) = self
            .queue
            .drain(..)
            .partition(|n| n.concerns_entity(entity));
        self.queue = rest.into();
        for notification in due {
            self.queued.remove(&notification.key());
            self.dispatch_after(notification, solution, sink)?;
        }
        Ok(())
    }
}

/// The listeners of one working solution, in registration order.
///
/// Registration order is also execution order: a listener may read shadow
/// variables maintained by listeners registered before it.
pub struct VariableListenerGraph<S> {
    slots: Vec<ListenerSlot<S>>,
}

impl<S> Default for VariableListenerGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> VariableListenerGraph<S> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    pub fn with_listener(mut self, listener: impl VariableListener<S> + 'static) -> Self {
        self.register(Box::new(listener));
        self
    }

    pub fn register(&mut self, listener: Box<dyn VariableListener<S>>) {
        self.slots.push(ListenerSlot {
            listener,
            queue: VecDeque::new(),
            queued: HashSet::new(),
        });
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Returns true while some after-notification awaits [`trigger`](Self::trigger).
    pub fn has_pending(&self) -> bool {
        self.slots.iter().any(|slot| !slot.queue.is_empty())
    }

    pub fn before_variable_changed(
        &mut self,
        solution: &mut S,
        entity: EntityRef,
        variable: &str,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        for slot in &mut self.slots {
            if !slot.matches(entity.descriptor_index, Some(variable)) {
                continue;
            }
            let notification = Notification::VariableChanged(entity.entity_index);
            if slot.queued.contains(&notification.key()) {
                continue;
            }
            slot.listener
                .before_variable_changed(solution, entity.entity_index, sink)?;
            slot.enqueue(notification);
        }
        Ok(())
    }

    pub fn before_entity_added(
        &mut self,
        solution: &mut S,
        entity: EntityRef,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        for slot in &mut self.slots {
            if !slot.matches(entity.descriptor_index, None) {
                continue;
            }
            let notification = Notification::EntityAdded(entity.entity_index);
            if slot.queued.contains(&notification.key()) {
                continue;
            }
            slot.listener
                .before_entity_added(solution, entity.entity_index, sink)?;
            slot.enqueue(notification);
        }
        Ok(())
    }

    /// Pending notifications for the entity are delivered first, so listeners
    /// clear its contributions from a consistent state.
    pub fn before_entity_removed(
        &mut self,
        solution: &mut S,
        entity: EntityRef,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        for slot in &mut self.slots {
            if !slot.matches(entity.descriptor_index, None) {
                continue;
            }
            slot.flush_entity(entity.entity_index, solution, sink)?;
            slot.listener
                .before_entity_removed(solution, entity.entity_index, sink)?;
            slot.enqueue(Notification::EntityRemoved(entity.entity_index));
        }
        Ok(())
    }

    pub fn before_list_variable_changed(
        &mut self,
        solution: &mut S,
        entity: EntityRef,
        variable: &str,
        from: usize,
        to: usize,
        sink: &mut dyn ShadowVariableSink<S>,
    ) -> Result<()> {
        for slot in &mut self.slots {
            if !slot.matches(entity.descriptor_index, Some(variable)) {
                continue;
            }
            if slot.queued.contains(&NotificationKey::List(entity.entity_index)) {
                Self::widen_list_range(slot, entity.entity_index, from, to);
                continue;
            }
            slot.listener
                .before_list_changed(solution, entity.entity_index, from, to, sink)?;
            slot.enqueue(Notification::ListChanged {
                entity: entity.entity_index,
                from,
                to,
            });
        }
        Ok(())
    }

    /// Records the range that actually changed, which may differ from the
    /// announced one when elements were added or removed.
    pub fn after_list_variable_changed(
        &mut self,
        entity: EntityRef,
        variable: &str,
        from: usize,
        to: usize,
    ) {
        for slot in &mut self.slots {
            if slot.matches(entity.descriptor_index, Some(variable)) {
                Self::widen_list_range(slot, entity.entity_index, from, to);
            }
        }
    }

    fn widen_list_range(slot: &mut ListenerSlot<S>, entity: usize, from: usize, to: usize) {
        for pending in slot.queue.iter_mut() {
            if let Notification::ListChanged {
                entity: e,
                from: f,
                to: t,
            } = pending
            {
                if *e == entity {
                    *f = (*f).min(from);
                    *t = (*t).max(to);
                }
            }
        }
    }

    /// `element` was taken out of the list variable `variable` of `owner_descriptor`.
    pub fn list_element_unassigned(&mut self, owner_descriptor: usize, variable: &str, element: usize) {
        for slot in &mut self.slots {
            if !slot.matches(owner_descriptor, Some(variable)) {
                continue;
            }
            let notification = Notification::ElementUnassigned(element);
            if !slot.queued.contains(&notification.key()) {
                slot.enqueue(notification);
            }
        }
    }

    /// Delivers every pending after-notification, listener by listener.
    pub fn trigger(&mut self, solution: &mut S, sink: &mut dyn ShadowVariableSink<S>) -> Result<()> {
        for slot in &mut self.slots {
            while let Some(notification) = slot.queue.pop_front() {
                slot.queued.remove(&notification.key());
                slot.dispatch_after(notification, solution, sink)?;
            }
        }
        Ok(())
    }

    /// Drops pending notifications and lets every listener rebuild its state.
    pub fn reset_working_solution(&mut self, solution: &mut S) -> Result<()> {
        for slot in &mut self.slots {
            slot.queue.clear();
            slot.queued.clear();
            slot.listener.reset_working_solution(solution)?;
        }
        Ok(())
    }
}

impl<S> fmt::Debug for VariableListenerGraph<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableListenerGraph")
            .field(
                "listeners",
                &self.slots.iter().map(|s| &s.listener).collect::<Vec<_>>(),
            )
            .field("pending", &self.has_pending())
            .finish()
    }
}
