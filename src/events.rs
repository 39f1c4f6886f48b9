//! Generation events and a session-owned event bus
//!
//! The level manager queues events while it mutates state; the owning
//! session drains the queue after each tick and publishes it here. The bus
//! lives and dies with its session, so listeners never outlive the run.

use crate::terrain::{EnemyHandle, LevelState};

#[derive(Debug, Clone, PartialEq)]
pub enum LevelEvent {
    RowGenerated { row_id: u32, y: f32, maze: bool },
    RowRetired { row_id: u32 },
    EnemyPlaced { row_id: u32, handle: EnemyHandle },
    EnemyReleased { handle: EnemyHandle },
    StateChanged { from: LevelState, to: LevelState },
    RiserToggled { enabled: bool },
    PatternSpawned { pattern: usize, rows: usize },
    TierChanged { tier: u32 },
    PlayerCaught { y: f32 },
}

/// Opaque listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u32);

type Listener = Box<dyn FnMut(&LevelEvent)>;

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(ListenerId, Listener)>,
    next_id: u32,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LevelEvent) + 'static,
    {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns false if the id was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Deliver to every listener in registration order
    pub fn publish(&mut self, event: &LevelEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Drop every listener (session teardown)
    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_publish_reaches_subscribers_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();
        let a = Rc::clone(&log);
        bus.subscribe(move |e| a.borrow_mut().push(("a", e.clone())));
        let b = Rc::clone(&log);
        bus.subscribe(move |e| b.borrow_mut().push(("b", e.clone())));

        bus.publish(&LevelEvent::RowRetired { row_id: 3 });
        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, "a");
        assert_eq!(log[1].1, LevelEvent::RowRetired { row_id: 3 });
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        let c = Rc::clone(&count);
        let id = bus.subscribe(move |_| *c.borrow_mut() += 1);
        bus.publish(&LevelEvent::RiserToggled { enabled: false });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&LevelEvent::RiserToggled { enabled: true });
        assert_eq!(*count.borrow(), 1);
        assert_eq!(bus.listener_count(), 0);
    }
}
