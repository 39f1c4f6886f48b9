//! Jump reachability model
//!
//! Derives the legal vertical/horizontal gap ranges from the player's
//! movement physics. Every spawner consults these bands; they are computed
//! once per session and never hand-tuned.
//!
//! Vertical gaps `dy` are measured as rise (previous row y minus next row y).
//! Horizontal gaps `dx` are distances between platforms: centre-to-centre for
//! single platform rows, edge-to-edge for maze segments.

use serde::{Deserialize, Serialize};

use crate::error::GenError;
use crate::settings::PhysicsConstants;

/// Fractions of the max jump height bounding each vertical band
const DY_SAFE_MIN_FRACTION: f32 = 0.55;
const DY_SAFE_MAX_FRACTION: f32 = 0.80;
const DY_HARD_MAX_FRACTION: f32 = 0.92;
/// Fractions of the horizontal distance coverable at each band's top
const DX_SAFE_FRACTION: f32 = 0.60;
const DX_HARD_FRACTION: f32 = 0.90;

/// Closed interval of gap magnitudes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub min: f32,
    pub max: f32,
}

impl Band {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }

    #[inline]
    pub fn clamp(&self, v: f32) -> f32 {
        v.clamp(self.min, self.max)
    }

    #[inline]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }
}

/// Derived, immutable reachability limits
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReachabilityConstraints {
    /// Seconds from launch to apex
    pub time_to_apex: f32,
    /// Apex height of a standing jump
    pub max_jump_height: f32,
    /// Air time of a jump landing at launch height
    pub max_air_time: f32,
    /// Horizontal distance covered during `max_air_time` at top speed
    pub max_horizontal_reach: f32,
    pub dy_safe: Band,
    pub dy_hard: Band,
    pub dx_safe: f32,
    pub dx_hard: f32,
    gravity: f32,
    run_speed: f32,
}

impl ReachabilityConstraints {
    /// Derive constraints from movement physics.
    ///
    /// Only magnitudes matter; a negative (screen-space upward) jump velocity
    /// is accepted. Zero, negative or non-finite magnitudes are rejected.
    pub fn from_physics(
        gravity: f32,
        jump_velocity: f32,
        run_speed: f32,
    ) -> Result<Self, GenError> {
        let invalid = || GenError::InvalidPhysicsConstants {
            gravity,
            jump_velocity,
            run_speed,
        };

        let g = gravity;
        let v = jump_velocity.abs();
        if !(g.is_finite() && v.is_finite() && run_speed.is_finite()) {
            return Err(invalid());
        }
        if g <= 0.0 || v <= 0.0 || run_speed <= 0.0 {
            return Err(invalid());
        }

        let time_to_apex = v / g;
        let max_jump_height = v * v / (2.0 * g);
        let max_air_time = 2.0 * time_to_apex;
        let max_horizontal_reach = run_speed * max_air_time;

        let dy_safe = Band::new(
            max_jump_height * DY_SAFE_MIN_FRACTION,
            max_jump_height * DY_SAFE_MAX_FRACTION,
        );
        let dy_hard = Band::new(dy_safe.max, max_jump_height * DY_HARD_MAX_FRACTION);

        let air_time_to = |dy: f32| time_to_apex + (2.0 * (max_jump_height - dy) / g).sqrt();
        let dx_safe = DX_SAFE_FRACTION * run_speed * air_time_to(dy_safe.max);
        let dx_hard = DX_HARD_FRACTION * run_speed * air_time_to(dy_hard.max);

        let constraints = Self {
            time_to_apex,
            max_jump_height,
            max_air_time,
            max_horizontal_reach,
            dy_safe,
            dy_hard,
            dx_safe,
            dx_hard,
            gravity: g,
            run_speed,
        };

        if !constraints.bands_are_ordered() {
            return Err(invalid());
        }

        log::info!(
            "Reachability: apex={:.3}s height={:.1} dy_safe=[{:.1},{:.1}] dy_hard=[{:.1},{:.1}] dx_safe={:.1} dx_hard={:.1}",
            time_to_apex,
            max_jump_height,
            dy_safe.min,
            dy_safe.max,
            dy_hard.min,
            dy_hard.max,
            dx_safe,
            dx_hard
        );

        Ok(constraints)
    }

    pub fn from_constants(physics: &PhysicsConstants) -> Result<Self, GenError> {
        Self::from_physics(physics.gravity_y, physics.jump_velocity, physics.run_speed)
    }

    /// Check the band ordering every spawner relies on
    pub fn bands_are_ordered(&self) -> bool {
        self.dy_safe.min > 0.0
            && self.dy_safe.min <= self.dy_safe.max
            && self.dy_safe.max <= self.dy_hard.min
            && self.dy_hard.min <= self.dy_hard.max
            && self.dy_hard.max < self.max_jump_height
            && self.dx_safe > 0.0
            && self.dx_safe < self.dx_hard
            && self.dx_hard < self.max_horizontal_reach
    }

    /// Seconds until a jump falls back to a ledge `dy` above launch (None if above apex)
    pub fn air_time_to(&self, dy: f32) -> Option<f32> {
        if dy > self.max_jump_height {
            return None;
        }
        let fall = (2.0 * (self.max_jump_height - dy) / self.gravity).sqrt();
        Some(self.time_to_apex + fall)
    }

    /// Physical horizontal reach when landing `dy` above the launch point
    pub fn horizontal_reach_at(&self, dy: f32) -> f32 {
        self.air_time_to(dy).map(|t| t * self.run_speed).unwrap_or(0.0)
    }

    /// Whether hard-band gaps are allowed at this tier
    #[inline]
    pub fn allows_hard(tier: u32) -> bool {
        tier >= crate::consts::HARD_TIER_THRESHOLD
    }

    /// Vertical band the given tier may sample from
    pub fn dy_band_for_tier(&self, tier: u32) -> Band {
        if Self::allows_hard(tier) {
            Band::new(self.dy_safe.min, self.dy_hard.max)
        } else {
            self.dy_safe
        }
    }

    /// Largest horizontal gap the given tier may produce
    pub fn max_dx_for_tier(&self, tier: u32) -> f32 {
        if Self::allows_hard(tier) {
            self.dx_hard
        } else {
            self.dx_safe
        }
    }

    /// Whether a gap is inside the envelope (`hard` selects the outer band).
    ///
    /// Drops (negative `dy`) are bounded by the same magnitude as rises.
    pub fn is_reachable(&self, dx: f32, dy: f32, hard: bool) -> bool {
        let (max_dx, max_dy) = if hard {
            (self.dx_hard, self.dy_hard.max)
        } else {
            (self.dx_safe, self.dy_safe.max)
        };
        dx.abs() <= max_dx && dy.abs() <= max_dy
    }

    /// Validate a gap, naming the violated limits
    pub fn check_gap(&self, dx: f32, dy: f32, hard: bool) -> Result<(), GenError> {
        if self.is_reachable(dx, dy, hard) {
            return Ok(());
        }
        let (max_dx, max_dy) = if hard {
            (self.dx_hard, self.dy_hard.max)
        } else {
            (self.dx_safe, self.dy_safe.max)
        };
        Err(GenError::UnreachableGapAttempt {
            dx,
            dy,
            max_dx,
            max_dy,
        })
    }

    /// Clamp a sampled rise into the envelope for the tier
    pub fn clamp_dy(&self, dy: f32, tier: u32) -> f32 {
        self.dy_band_for_tier(tier).clamp(dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn default_constraints() -> ReachabilityConstraints {
        ReachabilityConstraints::from_physics(1200.0, -600.0, 300.0).expect("valid physics")
    }

    #[test]
    fn test_derivation_matches_reference_physics() {
        let c = default_constraints();
        assert!((c.time_to_apex - 0.5).abs() < 1e-5);
        assert!((c.max_jump_height - 150.0).abs() < 1e-3);
        assert!((c.max_air_time - 1.0).abs() < 1e-5);
        assert!((c.dy_safe.min - 82.5).abs() < 1e-3);
        assert!((c.dy_safe.max - 120.0).abs() < 1e-3);
        assert!((c.dy_hard.min - 120.0).abs() < 1e-3);
        assert!((c.dy_hard.max - 138.0).abs() < 1e-3);
    }

    #[test]
    fn test_band_ordering() {
        let c = default_constraints();
        assert!(c.bands_are_ordered());
        assert!(c.dy_safe.max <= c.dy_hard.min);
        assert!(c.dy_hard.max < c.max_jump_height);
        assert!(c.dx_safe < c.dx_hard);
        assert!(c.dx_hard < c.max_horizontal_reach);
    }

    #[test]
    fn test_dx_bands_within_physical_reach() {
        let c = default_constraints();
        assert!(c.dx_safe < c.horizontal_reach_at(c.dy_safe.max));
        assert!(c.dx_hard < c.horizontal_reach_at(c.dy_hard.max));
    }

    #[test]
    fn test_rejects_non_positive_physics() {
        for (g, v, s) in [
            (0.0, -600.0, 300.0),
            (-1200.0, -600.0, 300.0),
            (1200.0, 0.0, 300.0),
            (1200.0, -600.0, 0.0),
            (f32::NAN, -600.0, 300.0),
            (1200.0, f32::INFINITY, 300.0),
        ] {
            let err = ReachabilityConstraints::from_physics(g, v, s).unwrap_err();
            assert!(matches!(err, GenError::InvalidPhysicsConstants { .. }));
        }
    }

    #[test]
    fn test_jump_velocity_sign_is_ignored() {
        let up = ReachabilityConstraints::from_physics(1200.0, -600.0, 300.0).unwrap();
        let down = ReachabilityConstraints::from_physics(1200.0, 600.0, 300.0).unwrap();
        assert_eq!(up, down);
    }

    #[test]
    fn test_tier_bands() {
        let c = default_constraints();
        assert_eq!(c.dy_band_for_tier(0), c.dy_safe);
        assert_eq!(c.max_dx_for_tier(0), c.dx_safe);
        let hard = c.dy_band_for_tier(crate::consts::HARD_TIER_THRESHOLD);
        assert_eq!(hard.max, c.dy_hard.max);
        assert_eq!(c.max_dx_for_tier(crate::consts::HARD_TIER_THRESHOLD), c.dx_hard);
    }

    #[test]
    fn test_check_gap_reports_limits() {
        let c = default_constraints();
        assert!(c.check_gap(10.0, 100.0, false).is_ok());
        let err = c.check_gap(10.0, 149.0, true).unwrap_err();
        assert!(matches!(err, GenError::UnreachableGapAttempt { .. }));
    }

    proptest! {
        #[test]
        fn prop_derivation_is_deterministic_and_ordered(
            g in 100.0f32..5000.0,
            v in 100.0f32..2000.0,
            s in 50.0f32..1000.0,
        ) {
            let a = ReachabilityConstraints::from_physics(g, -v, s).unwrap();
            let b = ReachabilityConstraints::from_physics(g, -v, s).unwrap();
            prop_assert_eq!(a, b);
            prop_assert!(a.bands_are_ordered());
        }

        #[test]
        fn prop_clamped_dy_is_reachable(dy in -500.0f32..500.0, tier in 0u32..12) {
            let c = default_constraints();
            let clamped = c.clamp_dy(dy, tier);
            prop_assert!(c.is_reachable(0.0, clamped, true));
            if tier < crate::consts::HARD_TIER_THRESHOLD {
                prop_assert!(c.dy_safe.contains(clamped));
            }
        }
    }
}
