//! Playground / dev tooling
//!
//! Handlers are plain data (category, icon, item list, action) kept in a
//! registry and dispatched on the action kind. Entering the playground
//! applies the start rules: automatic generation is frozen and the riser is
//! disabled, so only explicit spawns shape the level.

use crate::consts::*;
use crate::host::HostCapabilities;
use crate::terrain::{LevelManager, LevelState, PatternLibrary, Row};

/// Width and sweep of the platform presets, in menu order
const PLATFORM_PRESETS: [(&str, f32, f32); 3] = [
    ("Narrow", PLATFORM_MIN_WIDTH, 0.0),
    ("Wide", PLATFORM_MAX_WIDTH, 0.0),
    ("Moving", PLATFORM_MIN_WIDTH + 20.0, MOVING_MAX_RANGE),
];

/// Distance above the player where dev spawns start
pub const DEV_SPAWN_OFFSET: f32 = 120.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DevAction {
    /// Item index is a pattern index
    SpawnPattern,
    /// Item index selects a platform preset
    SpawnPlatform,
    ToggleGeneration,
    ToggleRiser,
    /// Put the riser back below the player
    ResetRiser,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DevHandler {
    pub category: &'static str,
    pub icon: &'static str,
    pub items: Vec<String>,
    pub action: DevAction,
}

/// What an invocation did
#[derive(Debug, Clone, PartialEq)]
pub enum DevOutcome {
    Spawned(Vec<Row>),
    Toggled(bool),
    Moved(f32),
    /// Unknown category or item
    Ignored,
}

#[derive(Debug, Clone)]
pub struct Playground {
    handlers: Vec<DevHandler>,
}

impl Playground {
    /// Registry with the built-in categories
    pub fn new(library: &PatternLibrary) -> Self {
        let mut playground = Self {
            handlers: Vec::new(),
        };
        playground.register(DevHandler {
            category: "Mazes",
            icon: "maze",
            items: library.patterns().iter().map(|p| p.name.to_string()).collect(),
            action: DevAction::SpawnPattern,
        });
        playground.register(DevHandler {
            category: "Platforms",
            icon: "platform",
            items: PLATFORM_PRESETS.iter().map(|(name, _, _)| name.to_string()).collect(),
            action: DevAction::SpawnPlatform,
        });
        playground.register(DevHandler {
            category: "Generation",
            icon: "gear",
            items: vec!["Toggle auto-generation".into()],
            action: DevAction::ToggleGeneration,
        });
        playground.register(DevHandler {
            category: "Riser",
            icon: "wave",
            items: vec!["Toggle riser".into()],
            action: DevAction::ToggleRiser,
        });
        playground.register(DevHandler {
            category: "Riser reset",
            icon: "reset",
            items: vec!["Drop below player".into()],
            action: DevAction::ResetRiser,
        });
        playground
    }

    /// Later registrations replace a handler with the same category
    pub fn register(&mut self, handler: DevHandler) {
        match self.handlers.iter_mut().find(|h| h.category == handler.category) {
            Some(existing) => *existing = handler,
            None => self.handlers.push(handler),
        }
    }

    pub fn handlers(&self) -> &[DevHandler] {
        &self.handlers
    }

    pub fn find(&self, category: &str) -> Option<&DevHandler> {
        self.handlers.iter().find(|h| h.category == category)
    }

    /// Freeze automatic generation and stop the riser
    pub fn apply_start_rules<H: HostCapabilities>(level: &mut LevelManager<H>) {
        level.freeze();
        level.set_riser_enabled(false);
        log::info!("Playground start rules applied");
    }

    /// Run item `item` of `category` against the level
    pub fn invoke<H: HostCapabilities>(
        &self,
        level: &mut LevelManager<H>,
        category: &str,
        item: usize,
    ) -> DevOutcome {
        let Some(handler) = self.find(category) else {
            log::warn!("Unknown dev category '{category}'");
            return DevOutcome::Ignored;
        };
        if item >= handler.items.len() {
            log::warn!("Dev category '{}' has no item {}", category, item);
            return DevOutcome::Ignored;
        }

        let player_y = level.host().player_position().y;
        let spawn_y = player_y - DEV_SPAWN_OFFSET;
        log::debug!("Dev action {:?} item {}", handler.action, item);

        match handler.action {
            DevAction::SpawnPattern => DevOutcome::Spawned(level.spawn_pattern(spawn_y, item)),
            DevAction::SpawnPlatform => {
                let (_, width, range) = PLATFORM_PRESETS[item];
                let x = level.settings().world_width / 2.0;
                let row = level.spawn_platform(x, spawn_y, width, range > 0.0, range);
                DevOutcome::Spawned(row.into_iter().collect())
            }
            DevAction::ToggleGeneration => {
                let running = level.state() == LevelState::Running;
                if running {
                    level.freeze();
                } else {
                    level.unfreeze();
                }
                DevOutcome::Toggled(!running)
            }
            DevAction::ToggleRiser => {
                let enabled = !level.riser().is_enabled();
                level.set_riser_enabled(enabled);
                DevOutcome::Toggled(enabled)
            }
            DevAction::ResetRiser => {
                let y = player_y + RISER_START_OFFSET;
                level.riser_mut().reset_to(y);
                DevOutcome::Moved(y)
            }
        }
    }
}
