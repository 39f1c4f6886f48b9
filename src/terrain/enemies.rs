//! Enemy placement policy and per-kind object pools
//!
//! Only placement is decided here (whether a row gets an enemy, which kind,
//! and where on the row). Behaviour belongs to the host.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::{HazardFront, Row};
use super::weighted_index;
use crate::consts::*;

/// Enemy types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    Patrol,
    Shooter,
    JumperShooter,
    Spike,
}

impl EnemyKind {
    pub const ALL: [EnemyKind; 4] = [
        EnemyKind::Patrol,
        EnemyKind::Shooter,
        EnemyKind::JumperShooter,
        EnemyKind::Spike,
    ];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            EnemyKind::Patrol => 0,
            EnemyKind::Shooter => 1,
            EnemyKind::JumperShooter => 2,
            EnemyKind::Spike => 3,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EnemyKind::Patrol => "patrol",
            EnemyKind::Shooter => "shooter",
            EnemyKind::JumperShooter => "jumperShooter",
            EnemyKind::Spike => "spike",
        }
    }

    /// Selection weight at a difficulty tier (0 = not yet unlocked)
    pub fn weight(self, tier: u32) -> u32 {
        match self {
            EnemyKind::Patrol => 10,
            EnemyKind::Spike => 3 + tier / 2,
            EnemyKind::Shooter if tier >= 2 => 2 + tier,
            EnemyKind::JumperShooter if tier >= 4 => tier - 2,
            _ => 0,
        }
    }
}

/// A pooled enemy entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub x: f32,
    pub y: f32,
    /// Row the enemy stands on
    pub row_id: u32,
    pub active: bool,
}

/// Stable reference to a pool slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EnemyHandle {
    pub kind: EnemyKind,
    pub slot: usize,
}

/// Reusable enemies of a single kind. Grows on demand, never shrinks.
#[derive(Debug, Clone)]
pub struct EnemyPool {
    kind: EnemyKind,
    slots: Vec<Enemy>,
    free: Vec<usize>,
}

impl EnemyPool {
    pub fn new(kind: EnemyKind) -> Self {
        Self {
            kind,
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    pub fn kind(&self) -> EnemyKind {
        self.kind
    }

    /// Total slots ever allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn active_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn get(&self, slot: usize) -> Option<&Enemy> {
        self.slots.get(slot).filter(|e| e.active)
    }

    /// Borrow a slot, reusing a free one before allocating
    fn acquire(&mut self, id: u32, x: f32, y: f32, row_id: u32) -> EnemyHandle {
        let enemy = Enemy {
            id,
            kind: self.kind,
            x,
            y,
            row_id,
            active: true,
        };
        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = enemy;
                slot
            }
            None => {
                self.slots.push(enemy);
                self.slots.len() - 1
            }
        };
        EnemyHandle {
            kind: self.kind,
            slot,
        }
    }

    /// Return a slot; false if it was not active
    fn release(&mut self, slot: usize) -> bool {
        match self.slots.get_mut(slot) {
            Some(enemy) if enemy.active => {
                enemy.active = false;
                self.free.push(slot);
                true
            }
            _ => false,
        }
    }
}

/// One pool per enemy kind
#[derive(Debug, Clone)]
pub struct EnemyPools {
    pools: [EnemyPool; 4],
    next_id: u32,
}

impl Default for EnemyPools {
    fn default() -> Self {
        Self {
            pools: EnemyKind::ALL.map(EnemyPool::new),
            next_id: 1,
        }
    }
}

impl EnemyPools {
    pub fn pool(&self, kind: EnemyKind) -> &EnemyPool {
        &self.pools[kind.index()]
    }

    pub fn acquire(&mut self, kind: EnemyKind, x: f32, y: f32, row_id: u32) -> EnemyHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.pools[kind.index()].acquire(id, x, y, row_id)
    }

    pub fn release(&mut self, handle: EnemyHandle) -> bool {
        self.pools[handle.kind.index()].release(handle.slot)
    }

    pub fn get(&self, handle: EnemyHandle) -> Option<&Enemy> {
        self.pools[handle.kind.index()].get(handle.slot)
    }

    pub fn active_count(&self) -> usize {
        self.pools.iter().map(EnemyPool::active_count).sum()
    }

    /// Active enemies in stable (kind, slot) order
    pub fn active(&self) -> impl Iterator<Item = &Enemy> {
        self.pools.iter().flat_map(|p| p.slots.iter().filter(|e| e.active))
    }
}

/// Decides whether and where a new row receives an enemy
#[derive(Debug, Clone)]
pub struct EnemyPlacementPolicy {
    pub min_platform_width: f32,
    /// Minimum vertical distance between the row and the hazard front
    pub spawn_safe_padding: f32,
    /// The enemy stays strictly farther than this from either platform edge
    pub safe_zone_padding: f32,
}

impl Default for EnemyPlacementPolicy {
    fn default() -> Self {
        Self {
            min_platform_width: ENEMY_MIN_PLATFORM_WIDTH,
            spawn_safe_padding: ENEMY_SPAWN_SAFE_PADDING,
            safe_zone_padding: SAFE_ZONE_PADDING,
        }
    }
}

impl EnemyPlacementPolicy {
    /// Chance a row that passes the safety checks receives an enemy
    pub fn spawn_chance(tier: u32) -> f32 {
        (ENEMY_BASE_CHANCE + tier as f32 * ENEMY_CHANCE_PER_TIER).min(ENEMY_MAX_CHANCE)
    }

    /// Horizontal span an enemy may stand in, if the row is safe to populate
    pub fn eligible_span(&self, row: &Row, hazard: &HazardFront) -> Option<(f32, f32)> {
        if hazard.clearance(row.y) < self.spawn_safe_padding {
            return None;
        }
        let platform = row.widest_static()?;
        if platform.width < self.min_platform_width {
            return None;
        }
        let inset = self.safe_zone_padding + SAFE_ZONE_MARGIN;
        let left = platform.left() + inset;
        let right = platform.right() - inset;
        (right > left).then_some((left, right))
    }

    /// Place an enemy on the row if it is eligible and the tier roll succeeds
    pub fn place_if_eligible<R: Rng>(
        &self,
        row: &Row,
        hazard: &HazardFront,
        tier: u32,
        pools: &mut EnemyPools,
        rng: &mut R,
    ) -> Option<EnemyHandle> {
        let (left, right) = self.eligible_span(row, hazard)?;

        if rng.random::<f32>() >= Self::spawn_chance(tier) {
            return None;
        }

        let weights = EnemyKind::ALL.map(|k| k.weight(tier));
        let kind = EnemyKind::ALL[weighted_index(&weights, rng)?];
        let x = rng.random_range(left..right);
        let handle = pools.acquire(kind, x, row.y, row.id);
        log::debug!("Placed {} on row {} at x={:.0}", kind.as_str(), row.id, x);
        Some(handle)
    }
}
