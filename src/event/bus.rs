use std::cell::{Cell, RefCell};

use crate::event::{EditorEvent, EventHandler};

/// Handle returned by [`EventBus::subscribe`], used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Fans editor events out to the subscribers of one store.
///
/// Handlers run synchronously, in subscription order, and must not subscribe
/// or unsubscribe from inside `handle_event`.
pub struct EventBus {
    subscribers: RefCell<Vec<(Subscription, Box<dyn EventHandler>)>>,
    next_id: Cell<u64>,
}

impl Clone for EventBus {
    fn clone(&self) -> Self {
        // subscriptions belong to one store; clones start empty
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.len())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn subscribe(&self, handler: Box<dyn EventHandler>) -> Subscription {
        let id = Subscription(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.subscribers.borrow_mut().push((id, handler));
        id
    }

    /// Returns false if the subscription was already gone
    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        let mut subscribers = self.subscribers.borrow_mut();
        let before = subscribers.len();
        subscribers.retain(|(id, _)| *id != subscription);
        subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn emit(&self, event: EditorEvent) {
        log::trace!("emit {:?}", event);
        for (_, handler) in self.subscribers.borrow_mut().iter_mut() {
            handler.handle_event(&event);
        }
    }
}
