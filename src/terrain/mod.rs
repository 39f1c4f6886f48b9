//! Deterministic terrain generation
//!
//! All generation logic lives here. This module must stay pure and deterministic:
//! - Seeded RNG only (one `Pcg32` owned by the level manager)
//! - Stable iteration order (rows by id, pools by kind then slot)
//! - No rendering or platform dependencies (the host is reached through `HostCapabilities`)

pub mod enemies;
pub mod level;
pub mod maze;
pub mod patterns;
pub mod platform;
pub mod reachability;
pub mod riser;
pub mod slots;
pub mod state;

use rand::Rng;
use rand_pcg::Pcg32;

pub use enemies::{Enemy, EnemyHandle, EnemyKind, EnemyPlacementPolicy, EnemyPool, EnemyPools};
pub use level::{LevelManager, LevelState, TickReport};
pub use maze::{MazeHooks, MazeRowConfig, MazeSpawn, MazeSpawner};
pub use patterns::{DecorationPattern, MazePattern, PatternLibrary, DECORATION_PATTERNS, MAZE_PATTERNS};
pub use platform::{PlatformSpawn, PlatformSpawner};
pub use reachability::{Band, ReachabilityConstraints};
pub use riser::RiserManager;
pub use slots::{RowPlan, SlotGenerator, SlotState, difficulty_tier};
pub use state::{Decoration, GenerationState, HazardFront, MazeCursor, MazeRef, Platform, Row};

/// RNG used by every spawner
pub type GenRng = Pcg32;

/// Pick an index with probability proportional to its weight (None if all weights are 0)
pub(crate) fn weighted_index<R: Rng>(weights: &[u32], rng: &mut R) -> Option<usize> {
    let total: u32 = weights.iter().sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.random_range(0..total);
    for (i, &w) in weights.iter().enumerate() {
        if roll < w {
            return Some(i);
        }
        roll -= w;
    }
    None
}
