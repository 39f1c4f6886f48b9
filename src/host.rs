//! Capabilities supplied by the embedding game
//!
//! The generator never touches rendering, cameras or physics bodies. It reads
//! the player position and physics constants through this trait and asks the
//! host to materialize what it generated.

use glam::Vec2;

use crate::settings::PhysicsConstants;
use crate::terrain::{Decoration, EnemyHandle, EnemyKind, Platform};

/// Something the host should make visible
#[derive(Debug, Clone, PartialEq)]
pub enum VisualRequest {
    Platform {
        row_id: u32,
        platform: Platform,
        /// Built from maze tiles rather than a plain platform
        tile: bool,
    },
    Enemy {
        row_id: u32,
        handle: EnemyHandle,
        kind: EnemyKind,
        pos: Vec2,
    },
    Decoration {
        row_id: u32,
        decoration: Decoration,
    },
}

impl VisualRequest {
    pub fn row_id(&self) -> u32 {
        match self {
            VisualRequest::Platform { row_id, .. }
            | VisualRequest::Enemy { row_id, .. }
            | VisualRequest::Decoration { row_id, .. } => *row_id,
        }
    }
}

pub trait HostCapabilities {
    /// Movement physics, read once at construction
    fn physics(&self) -> PhysicsConstants;

    /// Player world position, read every tick
    fn player_position(&self) -> Vec2;

    /// Materialize generated geometry
    fn spawn_visual(&mut self, request: VisualRequest);

    /// A row left active tracking; its visuals may be dropped
    fn retire_row(&mut self, _row_id: u32) {}

    /// An enemy went back to its pool
    fn despawn_enemy(&mut self, _handle: EnemyHandle) {}
}

/// Host without rendering. Keeps counts and, optionally, every request.
#[derive(Debug, Clone, Default)]
pub struct HeadlessHost {
    pub physics: PhysicsConstants,
    pub player: Vec2,
    /// Keep every request in `requests`
    pub record: bool,
    pub requests: Vec<VisualRequest>,
    pub visuals_spawned: usize,
    pub rows_retired: usize,
    pub enemies_despawned: usize,
}

impl HeadlessHost {
    pub fn new(player: Vec2) -> Self {
        Self {
            player,
            ..Self::default()
        }
    }

    pub fn recording(player: Vec2) -> Self {
        Self {
            player,
            record: true,
            ..Self::default()
        }
    }
}

impl HostCapabilities for HeadlessHost {
    fn physics(&self) -> PhysicsConstants {
        self.physics
    }

    fn player_position(&self) -> Vec2 {
        self.player
    }

    fn spawn_visual(&mut self, request: VisualRequest) {
        self.visuals_spawned += 1;
        if self.record {
            self.requests.push(request);
        }
    }

    fn retire_row(&mut self, _row_id: u32) {
        self.rows_retired += 1;
    }

    fn despawn_enemy(&mut self, _handle: EnemyHandle) {
        self.enemies_despawned += 1;
    }
}
