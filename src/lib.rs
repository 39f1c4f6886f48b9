//! Sky Ascent - endless vertical platformer terrain generator
//!
//! Core modules:
//! - `terrain`: Deterministic generation (reachability model, spawners, pacing, riser)
//! - `host`: Capabilities the embedding game provides (physics constants, player, visuals)
//! - `events`: Session-owned pub/sub for generation events
//! - `session`: Top-level object owning the level manager and its event bus
//! - `playground`: Dev/test handlers that freeze or override generation
//! - `settings`: Data-driven generation tuning

pub mod error;
pub mod events;
pub mod host;
pub mod playground;
pub mod session;
pub mod settings;
pub mod terrain;

pub use error::GenError;
pub use session::Session;
pub use settings::{GenerationSettings, PhysicsConstants};

/// Generation tuning constants
pub mod consts {
    /// Fixed host timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Upper bound on rows produced by a single `update` call
    pub const MAX_ROWS_PER_TICK: u32 = 4;

    /// Default movement physics (pixels, seconds)
    pub const DEFAULT_GRAVITY_Y: f32 = 1200.0;
    pub const DEFAULT_JUMP_VELOCITY: f32 = -600.0;
    pub const DEFAULT_RUN_SPEED: f32 = 300.0;

    /// Playfield
    pub const WORLD_WIDTH: f32 = 480.0;
    pub const DEFAULT_START_Y: f32 = -500.0;
    /// Thickness of every platform/tile (visual only, used by the host)
    pub const PLATFORM_THICKNESS: f32 = 16.0;

    /// Simple platform rows
    pub const PLATFORM_MIN_WIDTH: f32 = 60.0;
    pub const PLATFORM_MAX_WIDTH: f32 = 140.0;
    pub const PLATFORM_WIDTH_SHRINK_PER_TIER: f32 = 8.0;
    pub const MOVING_CHANCE_PER_TIER: f32 = 0.06;
    pub const MOVING_MAX_CHANCE: f32 = 0.45;
    pub const MOVING_MIN_RANGE: f32 = 30.0;
    pub const MOVING_MAX_RANGE: f32 = 120.0;
    /// Moving platforms complete a full sweep in this many seconds
    pub const MOVING_PERIOD: f32 = 3.0;
    pub const FILLER_PLATFORM_CHANCE: f32 = 0.35;
    /// Minimum clear space between two platforms of the same row
    pub const FILLER_MIN_SPACING: f32 = 40.0;

    /// Difficulty
    pub const HARD_TIER_THRESHOLD: u32 = 3;
    pub const MAX_DIFFICULTY_TIER: u32 = 10;
    /// Height climbed per tier step
    pub const TIER_CLIMB_STEP: f32 = 1000.0;
    /// Seconds survived per tier step
    pub const TIER_TIME_STEP: f32 = 45.0;
    /// Hard-band probability gained per tier above the threshold
    pub const HARD_BAND_CHANCE_PER_TIER: f32 = 0.12;
    pub const HARD_BAND_MAX_CHANCE: f32 = 0.75;

    /// Mazes
    pub const TILE_SIZE: f32 = 40.0;
    pub const MAZE_COLUMNS: usize = 12;
    pub const MAZE_ROW_SPACING: f32 = 100.0;
    /// Height that must be climbed before the first maze
    pub const MAZE_MIN_CLIMB: f32 = 800.0;
    pub const MAZE_COOLDOWN_ROWS: u32 = 6;
    pub const MAZE_BASE_CHANCE: f32 = 0.15;
    pub const MAZE_CHANCE_PER_TIER: f32 = 0.04;
    pub const MAZE_MAX_CHANCE: f32 = 0.5;
    /// Vertical extent of a decoration pattern above its segment
    pub const DECORATION_HEIGHT: f32 = 48.0;

    /// Enemies
    pub const ENEMY_MIN_PLATFORM_WIDTH: f32 = 80.0;
    pub const ENEMY_SPAWN_SAFE_PADDING: f32 = 300.0;
    pub const SAFE_ZONE_PADDING: f32 = 16.0;
    /// Extra inset so an enemy never sits exactly on the padding line
    pub const SAFE_ZONE_MARGIN: f32 = 0.5;
    pub const ENEMY_BASE_CHANCE: f32 = 0.1;
    pub const ENEMY_CHANCE_PER_TIER: f32 = 0.05;
    pub const ENEMY_MAX_CHANCE: f32 = 0.6;

    /// Riser (hazard front)
    pub const RISER_BASE_SPEED: f32 = 20.0;
    pub const RISER_SPEED_PER_TIER: f32 = 4.0;
    pub const RISER_MAX_SPEED: f32 = 70.0;
    pub const RISER_START_DELAY: f32 = 3.0;
    /// Initial distance of the riser below the start row
    pub const RISER_START_OFFSET: f32 = 400.0;
    /// Extra margin on top of one max jump the generator keeps above the riser
    pub const RISER_SAFETY_MARGIN: f32 = 60.0;

    /// Rows are generated while the player is closer than this to the top row
    pub const GENERATION_LOOKAHEAD: f32 = 800.0;
    /// Rows this far below the player are retired
    pub const RETIRE_DISTANCE: f32 = 900.0;
    /// Level events kept for a host that never drains them (oldest dropped first)
    pub const MAX_QUEUED_EVENTS: usize = 1024;
}

/// Clamp a platform centre so the whole platform (plus sweep) stays in the world
#[inline]
pub fn clamp_center_x(x: f32, half_extent: f32, world_width: f32) -> f32 {
    if half_extent * 2.0 >= world_width {
        return world_width / 2.0;
    }
    x.clamp(half_extent, world_width - half_extent)
}

/// Edge-to-edge horizontal distance between two spans (0 when they overlap)
#[inline]
pub fn span_gap(a_left: f32, a_right: f32, b_left: f32, b_right: f32) -> f32 {
    (b_left - a_right).max(a_left - b_right).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_center_x() {
        assert_eq!(clamp_center_x(10.0, 30.0, 480.0), 30.0);
        assert_eq!(clamp_center_x(470.0, 30.0, 480.0), 450.0);
        assert_eq!(clamp_center_x(100.0, 300.0, 480.0), 240.0);
    }

    #[test]
    fn test_span_gap() {
        assert_eq!(span_gap(0.0, 10.0, 15.0, 20.0), 5.0);
        assert_eq!(span_gap(15.0, 20.0, 0.0, 10.0), 5.0);
        assert_eq!(span_gap(0.0, 10.0, 5.0, 20.0), 0.0);
    }
}
