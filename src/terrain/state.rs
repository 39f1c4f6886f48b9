//! Terrain data model
//!
//! Rows, platforms and the generation bookkeeping owned by the level
//! manager. Everything here is plain data; the spawners and the level
//! manager are the only writers.

use serde::{Deserialize, Serialize};

use super::enemies::EnemyHandle;
use crate::consts::*;

/// A single platform (or a run of maze tiles)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Anchor centre x
    pub x: f32,
    /// Top surface y
    pub y: f32,
    pub width: f32,
    pub is_moving: bool,
    /// Full horizontal sweep of a moving platform (0 for static)
    pub move_range: f32,
    /// Current displacement from `x` (moving platforms only)
    #[serde(default)]
    pub offset: f32,
}

impl Platform {
    pub fn new(x: f32, y: f32, width: f32, is_moving: bool, move_range: f32) -> Self {
        Self {
            x,
            y,
            width,
            is_moving,
            move_range: if is_moving { move_range.max(0.0) } else { 0.0 },
            offset: 0.0,
        }
    }

    pub fn fixed(x: f32, y: f32, width: f32) -> Self {
        Self::new(x, y, width, false, 0.0)
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.x - self.width / 2.0
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width / 2.0
    }

    /// Half the distance the platform can drift from its anchor
    #[inline]
    pub fn sweep_half(&self) -> f32 {
        if self.is_moving { self.move_range / 2.0 } else { 0.0 }
    }

    /// Half-width including the moving sweep
    #[inline]
    pub fn half_extent(&self) -> f32 {
        self.width / 2.0 + self.sweep_half()
    }

    /// Leftmost and rightmost x the platform ever covers
    pub fn swept_span(&self) -> (f32, f32) {
        (self.x - self.half_extent(), self.x + self.half_extent())
    }

    /// Current centre x
    #[inline]
    pub fn current_x(&self) -> f32 {
        self.x + self.offset
    }

    /// Advance a moving platform along its sweep (triangle wave over `MOVING_PERIOD`)
    pub fn update(&mut self, time_secs: f32) {
        if !self.is_moving || self.move_range <= 0.0 {
            return;
        }
        let phase = (time_secs / MOVING_PERIOD).fract();
        let tri = if phase < 0.5 {
            phase * 4.0 - 1.0
        } else {
            3.0 - phase * 4.0
        };
        self.offset = tri * self.move_range / 2.0;
    }
}

/// Where a maze row came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeRef {
    /// Index into the pattern library
    pub pattern: usize,
    /// Row index within the pattern
    pub row: usize,
    pub mirrored: bool,
}

/// A purely cosmetic placement produced from a decoration pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    /// Index into the decoration catalogue
    pub pattern: usize,
    pub x: f32,
    pub y: f32,
}

/// One generated horizontal slice of terrain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub id: u32,
    pub y: f32,
    pub platforms: Vec<Platform>,
    /// Index of the platform carrying the reachability guarantee
    pub reference: usize,
    pub maze: Option<MazeRef>,
    #[serde(default)]
    pub decorations: Vec<Decoration>,
    #[serde(skip)]
    pub enemy: Option<EnemyHandle>,
}

impl Row {
    /// Row with a single platform as its reference
    pub fn single(id: u32, platform: Platform) -> Self {
        Self {
            id,
            y: platform.y,
            platforms: vec![platform],
            reference: 0,
            maze: None,
            decorations: Vec::new(),
            enemy: None,
        }
    }

    /// Whether `reference` points at a platform (always true for spawner-built rows)
    pub fn has_reference(&self) -> bool {
        self.reference < self.platforms.len()
    }

    /// Panics on a row without a reference; tracked rows are checked by the level manager
    pub fn reference_platform(&self) -> &Platform {
        &self.platforms[self.reference]
    }

    pub fn is_maze(&self) -> bool {
        self.maze.is_some()
    }

    /// Widest non-moving platform (where enemies may stand)
    pub fn widest_static(&self) -> Option<&Platform> {
        self.platforms
            .iter()
            .filter(|p| !p.is_moving)
            .max_by(|a, b| a.width.total_cmp(&b.width))
    }

    /// Full-width floor the run starts on
    pub fn floor(id: u32, y: f32, world_width: f32) -> Self {
        Self::single(id, Platform::fixed(world_width / 2.0, y, world_width))
    }
}

/// Resume point of a multi-row maze still being emitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MazeCursor {
    pub pattern: usize,
    pub next_row: usize,
    pub mirrored: bool,
}

/// Generation bookkeeping, owned by the level manager
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationState {
    /// Height of the starting floor
    pub start_y: f32,
    /// y of the most recently generated row
    pub last_platform_y: f32,
    /// Progress-derived difficulty (never decreases)
    pub difficulty_tier: u32,
    /// Cleared by the playground to stop automatic generation
    pub generation_enabled: bool,
    pub rows_generated: u32,
    pub rows_since_maze: u32,
    /// Seconds since the run started
    pub elapsed: f32,
    pub maze_cursor: Option<MazeCursor>,
    /// Next row/entity id
    next_id: u32,
}

impl GenerationState {
    pub fn new(start_y: f32) -> Self {
        Self {
            start_y,
            last_platform_y: start_y,
            difficulty_tier: 0,
            generation_enabled: true,
            rows_generated: 0,
            rows_since_maze: 0,
            elapsed: 0.0,
            maze_cursor: None,
            next_id: 1,
        }
    }

    /// Allocate a new row id
    pub fn next_row_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Height climbed by generation so far
    #[inline]
    pub fn height_climbed(&self) -> f32 {
        (self.start_y - self.last_platform_y).max(0.0)
    }
}

/// The rising lethal boundary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HazardFront {
    pub y: f32,
    /// Pixels per second (upward)
    pub speed: f32,
    pub enabled: bool,
}

impl HazardFront {
    pub fn new(y: f32, speed: f32, enabled: bool) -> Self {
        Self { y, speed, enabled }
    }

    /// Vertical distance from a row down to the hazard (positive when the row is above it)
    #[inline]
    pub fn clearance(&self, row_y: f32) -> f32 {
        self.y - row_y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_platform_ignores_range() {
        let p = Platform::new(100.0, 0.0, 80.0, false, 50.0);
        assert_eq!(p.move_range, 0.0);
        assert_eq!(p.half_extent(), 40.0);
    }

    #[test]
    fn test_moving_platform_stays_in_sweep() {
        let mut p = Platform::new(200.0, 0.0, 80.0, true, 60.0);
        for i in 0..200 {
            p.update(i as f32 * 0.05);
            assert!(p.offset.abs() <= 30.0 + 1e-4);
        }
        let (l, r) = p.swept_span();
        assert!((l - 130.0).abs() < 1e-4);
        assert!((r - 270.0).abs() < 1e-4);
    }

    #[test]
    fn test_widest_static_skips_moving() {
        let mut row = Row::single(1, Platform::new(100.0, 0.0, 200.0, true, 40.0));
        row.platforms.push(Platform::fixed(300.0, 0.0, 90.0));
        assert_eq!(row.widest_static().map(|p| p.width), Some(90.0));
    }

    #[test]
    fn test_height_climbed() {
        let mut state = GenerationState::new(-500.0);
        state.last_platform_y = -800.0;
        assert_eq!(state.height_climbed(), 300.0);
    }
}
