//! One climbing run
//!
//! A session owns the level manager and the event bus. The bus is created
//! with the session and cleared when it ends; listeners register through
//! `bus_mut` and never through ambient state.

use crate::error::GenError;
use crate::events::{EventBus, ListenerId, LevelEvent};
use crate::host::HostCapabilities;
use crate::settings::GenerationSettings;
use crate::terrain::{LevelManager, TickReport};

#[derive(Debug)]
pub struct Session<H: HostCapabilities> {
    level: LevelManager<H>,
    bus: EventBus,
    ticks: u64,
    ended: bool,
}

impl<H: HostCapabilities> Session<H> {
    pub fn new(host: H, settings: GenerationSettings) -> Result<Self, GenError> {
        let level = LevelManager::new(host, settings)?;
        Ok(Self::from_level(level))
    }

    /// Wrap an already constructed level manager (custom spawners)
    pub fn from_level(level: LevelManager<H>) -> Self {
        Self {
            level,
            bus: EventBus::new(),
            ticks: 0,
            ended: false,
        }
    }

    pub fn level(&self) -> &LevelManager<H> {
        &self.level
    }

    pub fn level_mut(&mut self) -> &mut LevelManager<H> {
        &mut self.level
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }

    pub fn subscribe<F>(&mut self, listener: F) -> ListenerId
    where
        F: FnMut(&LevelEvent) + 'static,
    {
        self.bus.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.bus.unsubscribe(id)
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Advance the level one frame and publish what happened
    pub fn tick(&mut self, dt: f32) -> TickReport {
        if self.ended {
            return TickReport::default();
        }
        self.ticks += 1;
        let report = self.level.update(dt);
        self.flush_events();
        report
    }

    /// Publish events queued by calls made outside `tick` (dev tooling)
    pub fn flush_events(&mut self) {
        for event in self.level.drain_events() {
            self.bus.publish(&event);
        }
    }

    /// Tear the session down. Pending events are delivered first; every
    /// listener is dropped afterwards.
    pub fn end(&mut self) {
        if self.ended {
            return;
        }
        self.flush_events();
        self.bus.clear();
        self.ended = true;
        log::info!("Session ended after {} ticks", self.ticks);
    }
}
