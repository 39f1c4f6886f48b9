//! Rising hazard front
//!
//! The riser only moves; keeping generated terrain ahead of it is the level
//! manager's job (see `LevelManager::update`).

use super::state::HazardFront;
use crate::consts::*;

#[derive(Debug, Clone)]
pub struct RiserManager {
    front: HazardFront,
    base_speed: f32,
    /// Seconds left before the front starts moving
    delay: f32,
}

impl RiserManager {
    pub fn new(start_y: f32, base_speed: f32, start_delay: f32, enabled: bool) -> Self {
        Self {
            front: HazardFront::new(start_y, base_speed, enabled),
            base_speed,
            delay: start_delay.max(0.0),
        }
    }

    pub fn front(&self) -> &HazardFront {
        &self.front
    }

    #[inline]
    pub fn y(&self) -> f32 {
        self.front.y
    }

    pub fn is_enabled(&self) -> bool {
        self.front.enabled
    }

    /// Toggle without touching the accumulated position
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.front.enabled != enabled {
            log::info!("Riser {}", if enabled { "enabled" } else { "disabled" });
        }
        self.front.enabled = enabled;
    }

    /// Scale speed with difficulty
    pub fn set_tier(&mut self, tier: u32) {
        self.front.speed =
            (self.base_speed + tier as f32 * RISER_SPEED_PER_TIER).min(RISER_MAX_SPEED.max(self.base_speed));
    }

    /// Advance the front upward (y decreases)
    pub fn tick(&mut self, dt: f32) {
        if !self.front.enabled {
            return;
        }
        if self.delay > 0.0 {
            self.delay -= dt;
            if self.delay > 0.0 {
                return;
            }
            // Spend the remainder of this step moving
            let spill = -self.delay;
            self.delay = 0.0;
            self.front.y -= self.front.speed * spill;
            return;
        }
        self.front.y -= self.front.speed * dt;
    }

    /// Player has been overtaken by the front
    pub fn has_caught(&self, player_y: f32) -> bool {
        self.front.enabled && player_y >= self.front.y
    }

    /// Vertical distance from the front up to a row
    pub fn margin_to(&self, row_y: f32) -> f32 {
        self.front.clearance(row_y)
    }

    /// Playground helper: place the front explicitly
    pub fn reset_to(&mut self, y: f32) {
        self.front.y = y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rises_after_delay() {
        let mut riser = RiserManager::new(0.0, 20.0, 1.0, true);
        riser.tick(0.5);
        assert_eq!(riser.y(), 0.0);
        riser.tick(0.75);
        assert!((riser.y() - (-5.0)).abs() < 1e-4);
        riser.tick(1.0);
        assert!((riser.y() - (-25.0)).abs() < 1e-4);
    }

    #[test]
    fn test_disable_keeps_position() {
        let mut riser = RiserManager::new(0.0, 10.0, 0.0, true);
        riser.tick(2.0);
        riser.set_enabled(false);
        riser.tick(5.0);
        assert!((riser.y() - (-20.0)).abs() < 1e-4);
        riser.set_enabled(true);
        riser.tick(1.0);
        assert!((riser.y() - (-30.0)).abs() < 1e-4);
    }

    #[test]
    fn test_speed_scales_with_tier_and_caps() {
        let mut riser = RiserManager::new(0.0, RISER_BASE_SPEED, 0.0, true);
        riser.set_tier(2);
        assert_eq!(riser.front().speed, RISER_BASE_SPEED + 2.0 * RISER_SPEED_PER_TIER);
        riser.set_tier(1000);
        assert_eq!(riser.front().speed, RISER_MAX_SPEED);
    }

    #[test]
    fn test_has_caught() {
        let mut riser = RiserManager::new(100.0, 10.0, 0.0, true);
        assert!(!riser.has_caught(50.0));
        assert!(riser.has_caught(100.0));
        riser.set_enabled(false);
        assert!(!riser.has_caught(150.0));
    }
}
