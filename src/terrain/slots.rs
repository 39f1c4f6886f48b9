//! Pacing controller
//!
//! Decides, per generation step, whether the next row is a plain platform
//! row or the next row of a maze, and derives the difficulty tier from
//! progress.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::GenRng;
use super::patterns::PatternLibrary;
use super::state::GenerationState;
use super::weighted_index;
use crate::consts::*;

/// Slot generator mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlotState {
    /// Normal cadence
    Active,
    /// Auto-generation disabled; every request is a no-op
    Suspended,
}

/// What the next generation step should produce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowPlan {
    Platform,
    Maze {
        pattern: usize,
        /// Pattern row to emit next
        row: usize,
        mirrored: bool,
    },
}

/// Difficulty tier from height climbed and seconds survived
pub fn difficulty_tier(height_climbed: f32, elapsed: f32) -> u32 {
    let by_height = (height_climbed.max(0.0) / TIER_CLIMB_STEP) as u32;
    let by_time = (elapsed.max(0.0) / TIER_TIME_STEP) as u32;
    (by_height + by_time).min(MAX_DIFFICULTY_TIER)
}

/// Chance a fresh maze starts once the cooldown has passed
pub fn maze_chance(tier: u32) -> f32 {
    (MAZE_BASE_CHANCE + tier as f32 * MAZE_CHANCE_PER_TIER).min(MAZE_MAX_CHANCE)
}

#[derive(Debug, Clone)]
pub struct SlotGenerator {
    state: SlotState,
    library: PatternLibrary,
    mazes_enabled: bool,
}

impl SlotGenerator {
    pub fn new(library: PatternLibrary, mazes_enabled: bool) -> Self {
        Self {
            state: SlotState::Active,
            library,
            mazes_enabled,
        }
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == SlotState::Active
    }

    /// Stop producing plans. Any maze in progress is abandoned so no
    /// half-applied structure is resumed later.
    pub fn suspend(&mut self, gen_state: &mut GenerationState) {
        if self.state == SlotState::Suspended {
            return;
        }
        self.state = SlotState::Suspended;
        if let Some(cursor) = gen_state.maze_cursor.take() {
            log::info!(
                "Slot generator suspended; abandoned maze {} at row {}",
                cursor.pattern,
                cursor.next_row
            );
            gen_state.rows_since_maze = 0;
        }
    }

    pub fn resume(&mut self) {
        self.state = SlotState::Active;
    }

    /// Plan the next row, or None while suspended
    pub fn next_row_type(&self, state: &GenerationState, rng: &mut GenRng) -> Option<RowPlan> {
        if self.state == SlotState::Suspended {
            return None;
        }

        if let Some(cursor) = state.maze_cursor {
            return Some(RowPlan::Maze {
                pattern: cursor.pattern,
                row: cursor.next_row,
                mirrored: cursor.mirrored,
            });
        }

        if !self.mazes_enabled
            || self.library.is_empty()
            || state.height_climbed() < MAZE_MIN_CLIMB
            || state.rows_since_maze < MAZE_COOLDOWN_ROWS
        {
            return Some(RowPlan::Platform);
        }

        if rng.random::<f32>() >= maze_chance(state.difficulty_tier) {
            return Some(RowPlan::Platform);
        }

        let tier = state.difficulty_tier;
        let weights: Vec<u32> = self
            .library
            .patterns()
            .iter()
            .map(|p| if p.min_tier <= tier { p.difficulty_weight } else { 0 })
            .collect();
        let Some(pattern) = weighted_index(&weights, rng) else {
            return Some(RowPlan::Platform);
        };

        Some(RowPlan::Maze {
            pattern,
            row: 0,
            mirrored: rng.random_bool(0.5),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::state::MazeCursor;
    use rand::SeedableRng;

    fn climbed_state(height: f32, rows_since_maze: u32) -> GenerationState {
        let mut state = GenerationState::new(0.0);
        state.last_platform_y = -height;
        state.rows_since_maze = rows_since_maze;
        state.difficulty_tier = difficulty_tier(height, 0.0);
        state
    }

    #[test]
    fn test_tier_progression() {
        assert_eq!(difficulty_tier(0.0, 0.0), 0);
        assert_eq!(difficulty_tier(TIER_CLIMB_STEP * 2.5, 0.0), 2);
        assert_eq!(difficulty_tier(TIER_CLIMB_STEP, TIER_TIME_STEP), 2);
        assert_eq!(difficulty_tier(1e9, 1e9), MAX_DIFFICULTY_TIER);
        assert_eq!(difficulty_tier(-100.0, 0.0), 0);
    }

    #[test]
    fn test_suspended_is_noop() {
        let mut slots = SlotGenerator::new(PatternLibrary::default(), true);
        let mut state = climbed_state(5000.0, 10);
        slots.suspend(&mut state);
        let mut rng = GenRng::seed_from_u64(1);
        assert_eq!(slots.next_row_type(&state, &mut rng), None);
        slots.resume();
        assert!(slots.next_row_type(&state, &mut rng).is_some());
    }

    #[test]
    fn test_no_maze_before_min_climb() {
        let slots = SlotGenerator::new(PatternLibrary::default(), true);
        let state = climbed_state(MAZE_MIN_CLIMB - 1.0, 100);
        let mut rng = GenRng::seed_from_u64(2);
        for _ in 0..200 {
            assert_eq!(slots.next_row_type(&state, &mut rng), Some(RowPlan::Platform));
        }
    }

    #[test]
    fn test_cooldown_blocks_mazes() {
        let slots = SlotGenerator::new(PatternLibrary::default(), true);
        let state = climbed_state(5000.0, MAZE_COOLDOWN_ROWS - 1);
        let mut rng = GenRng::seed_from_u64(3);
        for _ in 0..200 {
            assert_eq!(slots.next_row_type(&state, &mut rng), Some(RowPlan::Platform));
        }
    }

    #[test]
    fn test_mazes_appear_and_respect_unlock_tier() {
        let lib = PatternLibrary::default();
        let slots = SlotGenerator::new(lib, true);
        let state = climbed_state(MAZE_MIN_CLIMB, MAZE_COOLDOWN_ROWS);
        let mut rng = GenRng::seed_from_u64(4);
        let mut mazes = 0;
        for _ in 0..500 {
            if let Some(RowPlan::Maze { pattern, row, .. }) = slots.next_row_type(&state, &mut rng) {
                mazes += 1;
                assert_eq!(row, 0);
                assert!(lib.patterns()[pattern].min_tier <= state.difficulty_tier);
            }
        }
        assert!(mazes > 0);
    }

    #[test]
    fn test_disabled_mazes() {
        let slots = SlotGenerator::new(PatternLibrary::default(), false);
        let state = climbed_state(5000.0, 100);
        let mut rng = GenRng::seed_from_u64(5);
        for _ in 0..100 {
            assert_eq!(slots.next_row_type(&state, &mut rng), Some(RowPlan::Platform));
        }
    }

    #[test]
    fn test_cursor_continues_maze_and_suspend_clears_it() {
        let mut slots = SlotGenerator::new(PatternLibrary::default(), true);
        let mut state = climbed_state(0.0, 0);
        state.maze_cursor = Some(MazeCursor {
            pattern: 2,
            next_row: 1,
            mirrored: true,
        });
        let mut rng = GenRng::seed_from_u64(6);
        assert_eq!(
            slots.next_row_type(&state, &mut rng),
            Some(RowPlan::Maze {
                pattern: 2,
                row: 1,
                mirrored: true
            })
        );
        slots.suspend(&mut state);
        assert!(state.maze_cursor.is_none());
    }
}
