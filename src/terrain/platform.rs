//! Simple platform rows
//!
//! A row is anchored on its reference platform. The reference is placed
//! relative to the previous row's reference so the worst-case gap (anchor
//! offset plus both moving sweeps) stays inside the tier's jump envelope.

use rand::Rng;

use super::GenRng;
use super::reachability::ReachabilityConstraints;
use super::state::{GenerationState, Platform, Row};
use crate::clamp_center_x;
use crate::consts::*;

/// Row generation strategy for plain platform rows
pub trait PlatformSpawn {
    /// Generate the next row above `previous`; advances `state.last_platform_y`
    fn spawn_row(
        &mut self,
        previous: &Row,
        tier: u32,
        state: &mut GenerationState,
        rng: &mut GenRng,
    ) -> Row;

    /// Build an explicit single-platform row (no pacing, no validation)
    fn spawn_platform(&mut self, x: f32, y: f32, width: f32, is_moving: bool, move_range: f32)
    -> Row;
}

/// Probability a row samples from the hard band at this tier
pub fn hard_band_chance(tier: u32) -> f32 {
    if !ReachabilityConstraints::allows_hard(tier) {
        return 0.0;
    }
    let steps = (tier - HARD_TIER_THRESHOLD + 1) as f32;
    (steps * HARD_BAND_CHANCE_PER_TIER).min(HARD_BAND_MAX_CHANCE)
}

/// Probability the reference platform moves at this tier
pub fn moving_chance(tier: u32) -> f32 {
    (tier as f32 * MOVING_CHANCE_PER_TIER).min(MOVING_MAX_CHANCE)
}

/// Widest reference platform allowed at this tier
pub fn max_width_for_tier(tier: u32) -> f32 {
    (PLATFORM_MAX_WIDTH - tier as f32 * PLATFORM_WIDTH_SHRINK_PER_TIER).max(PLATFORM_MIN_WIDTH)
}

#[derive(Debug, Clone)]
pub struct PlatformSpawner {
    constraints: ReachabilityConstraints,
    world_width: f32,
}

impl PlatformSpawner {
    pub fn new(constraints: ReachabilityConstraints, world_width: f32) -> Self {
        Self {
            constraints,
            world_width,
        }
    }

    pub fn constraints(&self) -> &ReachabilityConstraints {
        &self.constraints
    }

    /// Fallback when a sampled gap fails validation: a narrow static platform
    /// straight above the reference, at the lowest safe rise.
    fn safe_fallback(&self, reference: &Platform, previous_y: f32) -> Platform {
        let width = PLATFORM_MIN_WIDTH;
        let x = clamp_center_x(reference.x, width / 2.0, self.world_width);
        Platform::fixed(x, previous_y - self.constraints.dy_safe.min, width)
    }

    /// Clamp a sampled reference into the world, then re-check the worst-case
    /// gap. Clamping can push a wide moving platform out of the budget; such a
    /// row falls back to the safe platform.
    #[allow(clippy::too_many_arguments)]
    fn place_reference(
        &self,
        reference: &Platform,
        previous_y: f32,
        dy: f32,
        width: f32,
        move_range: f32,
        offset: f32,
        hard: bool,
    ) -> Platform {
        let half_extent = width / 2.0 + move_range / 2.0;
        let mut x = reference.x + offset;
        if x < half_extent || x > self.world_width - half_extent {
            x = reference.x - offset;
        }
        let x = clamp_center_x(x, half_extent, self.world_width);

        let platform = Platform::new(x, previous_y - dy, width, move_range > 0.0, move_range);
        let worst_dx = (x - reference.x).abs() + reference.sweep_half() + platform.sweep_half();
        match self.constraints.check_gap(worst_dx, dy, hard) {
            Ok(()) => platform,
            Err(err) => {
                log::warn!("{err}; clamping row to the safe band");
                self.safe_fallback(reference, previous_y)
            }
        }
    }

    /// Optionally add an unguaranteed static platform beside the reference
    fn add_filler(&self, row: &mut Row, tier: u32, rng: &mut GenRng) {
        if rng.random::<f32>() >= FILLER_PLATFORM_CHANCE {
            return;
        }
        let (ref_left, ref_right) = row.reference_platform().swept_span();
        let left_space = ref_left - FILLER_MIN_SPACING;
        let right_space = self.world_width - (ref_right + FILLER_MIN_SPACING);

        let (region_start, region_len) = if left_space >= right_space {
            (0.0, left_space)
        } else {
            (ref_right + FILLER_MIN_SPACING, right_space)
        };
        if region_len < PLATFORM_MIN_WIDTH {
            return;
        }

        let max_w = max_width_for_tier(tier).min(region_len);
        let width = rng.random_range(PLATFORM_MIN_WIDTH..=max_w);
        let x = region_start + width / 2.0 + rng.random_range(0.0..=(region_len - width));
        row.platforms.push(Platform::fixed(x, row.y, width));
    }
}

impl PlatformSpawn for PlatformSpawner {
    fn spawn_row(
        &mut self,
        previous: &Row,
        tier: u32,
        state: &mut GenerationState,
        rng: &mut GenRng,
    ) -> Row {
        let c = self.constraints;
        let reference = previous.reference_platform();

        let hard = rng.random::<f32>() < hard_band_chance(tier);
        let (dy_band, max_dx) = if hard {
            (c.dy_hard, c.dx_hard)
        } else {
            (c.dy_safe, c.dx_safe)
        };
        let dy = rng.random_range(dy_band.min..=dy_band.max);

        let width = rng.random_range(PLATFORM_MIN_WIDTH..=max_width_for_tier(tier));

        // Horizontal budget left after the previous platform's own sweep
        let budget = (max_dx - reference.sweep_half()).max(0.0);
        let mut move_range = 0.0;
        if rng.random::<f32>() < moving_chance(tier) {
            let range = rng
                .random_range(MOVING_MIN_RANGE..=MOVING_MAX_RANGE)
                .min(budget * 2.0);
            if range >= MOVING_MIN_RANGE {
                move_range = range;
            }
        }

        let dx_budget = (budget - move_range / 2.0).max(0.0);
        let dx = rng.random_range(0.0..=dx_budget);
        let dir = if rng.random_bool(0.5) { 1.0 } else { -1.0 };

        let platform =
            self.place_reference(reference, previous.y, dy, width, move_range, dir * dx, hard);

        let mut row = Row::single(0, platform);
        self.add_filler(&mut row, tier, rng);

        state.last_platform_y = row.y;
        row
    }

    fn spawn_platform(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        is_moving: bool,
        move_range: f32,
    ) -> Row {
        Row::single(0, Platform::new(x, y, width, is_moving, move_range))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;

    fn spawner() -> PlatformSpawner {
        let c = ReachabilityConstraints::from_physics(1200.0, -600.0, 300.0).unwrap();
        PlatformSpawner::new(c, WORLD_WIDTH)
    }

    /// Worst-case horizontal distance between two reference platforms
    fn worst_dx(a: &Platform, b: &Platform) -> f32 {
        (a.x - b.x).abs() + a.sweep_half() + b.sweep_half()
    }

    #[test]
    fn test_hard_chance_ramps_after_threshold() {
        assert_eq!(hard_band_chance(0), 0.0);
        assert_eq!(hard_band_chance(HARD_TIER_THRESHOLD - 1), 0.0);
        assert!(hard_band_chance(HARD_TIER_THRESHOLD) > 0.0);
        assert!(hard_band_chance(HARD_TIER_THRESHOLD + 2) > hard_band_chance(HARD_TIER_THRESHOLD));
        assert!(hard_band_chance(100) <= HARD_BAND_MAX_CHANCE);
    }

    #[test]
    fn test_spawn_row_advances_last_platform_y() {
        let mut s = spawner();
        let mut state = GenerationState::new(-500.0);
        let mut rng = GenRng::seed_from_u64(1);
        let floor = Row::floor(0, -500.0, WORLD_WIDTH);
        let row = s.spawn_row(&floor, 0, &mut state, &mut rng);
        assert_eq!(state.last_platform_y, row.y);
        assert!(row.y < -500.0);
    }

    #[test]
    fn test_spawn_platform_is_verbatim() {
        let mut s = spawner();
        let row = s.spawn_platform(10.0, 20.0, 100.0, true, 50.0);
        let p = row.reference_platform();
        assert_eq!((p.x, p.y, p.width, p.is_moving, p.move_range), (10.0, 20.0, 100.0, true, 50.0));
    }

    #[test]
    fn test_fillers_never_overlap_reference() {
        let mut s = spawner();
        let mut state = GenerationState::new(-500.0);
        let mut rng = GenRng::seed_from_u64(11);
        let mut prev = Row::floor(0, -500.0, WORLD_WIDTH);
        for _ in 0..200 {
            let row = s.spawn_row(&prev, 6, &mut state, &mut rng);
            let (l, r) = row.reference_platform().swept_span();
            for filler in row.platforms.iter().skip(1) {
                assert!(filler.right() <= l || filler.left() >= r);
                assert!(filler.left() >= -1e-3 && filler.right() <= WORLD_WIDTH + 1e-3);
            }
            prev = row;
        }
    }

    #[test]
    fn test_wall_clamp_falls_back_to_safe_platform() {
        let s = spawner();
        let c = *s.constraints();
        // Against the left wall a wide moving platform is clamped inward,
        // past the safe horizontal budget
        let reference = Platform::fixed(30.0, -500.0, 60.0);
        let p = s.place_reference(&reference, -500.0, 100.0, 124.0, 120.0, 0.0, false);

        assert!(!p.is_moving);
        assert_eq!(p.width, PLATFORM_MIN_WIDTH);
        assert_eq!(p.y, -500.0 - c.dy_safe.min);
        assert_eq!(p.x, 30.0);
        assert!(worst_dx(&reference, &p) <= c.dx_safe);

        // The same geometry fits the hard envelope
        let p = s.place_reference(&reference, -500.0, 100.0, 124.0, 120.0, 0.0, true);
        assert!(p.is_moving);
        assert_eq!(p.y, -600.0);
    }

    #[test]
    fn test_fallback_rows_advance_last_platform_y() {
        let mut s = spawner();
        let c = *s.constraints();
        let previous = Row::single(0, Platform::fixed(30.0, -500.0, 60.0));
        let mut rng = GenRng::seed_from_u64(17);
        let mut fallbacks = 0;
        for _ in 0..20_000 {
            let mut state = GenerationState::new(-500.0);
            let row = s.spawn_row(&previous, 2, &mut state, &mut rng);
            assert_eq!(state.last_platform_y, row.y);

            let p = row.reference_platform();
            if !p.is_moving && p.width == PLATFORM_MIN_WIDTH && p.x == 30.0 && row.y == -500.0 - c.dy_safe.min {
                fallbacks += 1;
            }
            assert!(worst_dx(previous.reference_platform(), p) <= c.dx_safe + 1e-3);
        }
        assert!(fallbacks > 0);
    }

    proptest! {
        #[test]
        fn prop_rows_stay_inside_tier_envelope(seed in any::<u64>(), tier in 0u32..12) {
            let mut s = spawner();
            let c = *s.constraints();
            let mut state = GenerationState::new(-500.0);
            let mut rng = GenRng::seed_from_u64(seed);
            let mut prev = Row::floor(0, -500.0, WORLD_WIDTH);
            for _ in 0..40 {
                let row = s.spawn_row(&prev, tier, &mut state, &mut rng);
                let dy = prev.y - row.y;
                let dx = worst_dx(prev.reference_platform(), row.reference_platform());

                prop_assert!(dy > 0.0 && dy <= c.dy_hard.max + 1e-3);
                prop_assert!(dx <= c.dx_hard + 1e-3);
                if tier < HARD_TIER_THRESHOLD {
                    prop_assert!(dy >= c.dy_safe.min - 1e-3 && dy <= c.dy_safe.max + 1e-3);
                    prop_assert!(dx <= c.dx_safe + 1e-3);
                }

                let (l, r) = row.reference_platform().swept_span();
                prop_assert!(l >= -1e-3 && r <= WORLD_WIDTH + 1e-3);
                prev = row;
            }
        }
    }
}
