//! Generation settings
//!
//! Loaded once at session start. Anything that affects reachability (the
//! physics constants) is validated up front; a session must not start with
//! settings the safety model cannot trust.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::GenError;

/// Movement physics the reachability model is derived from
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConstants {
    /// Downward acceleration (pixels/s²)
    pub gravity_y: f32,
    /// Jump launch velocity (negative = upward in screen space)
    pub jump_velocity: f32,
    /// Top horizontal speed (pixels/s)
    pub run_speed: f32,
}

impl Default for PhysicsConstants {
    fn default() -> Self {
        Self {
            gravity_y: DEFAULT_GRAVITY_Y,
            jump_velocity: DEFAULT_JUMP_VELOCITY,
            run_speed: DEFAULT_RUN_SPEED,
        }
    }
}

/// Session-wide generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Playfield width in pixels
    pub world_width: f32,
    /// Height of the starting floor row
    pub start_y: f32,

    // === Riser ===
    /// Whether the hazard front rises at all
    pub riser_enabled: bool,
    /// Base riser speed (pixels/s), scaled up by difficulty tier
    pub riser_base_speed: f32,
    /// Seconds before the riser starts moving
    pub riser_start_delay: f32,
    /// Initial distance of the riser below the start row
    pub riser_start_offset: f32,

    // === Generation ===
    /// Rows are generated while the player is closer than this to the top row
    pub generation_lookahead: f32,
    /// Rows further than this below the player are retired
    pub retire_distance: f32,
    /// Allow maze rows
    pub mazes_enabled: bool,
    /// Allow enemy placement
    pub enemies_enabled: bool,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            world_width: WORLD_WIDTH,
            start_y: DEFAULT_START_Y,

            riser_enabled: true,
            riser_base_speed: RISER_BASE_SPEED,
            riser_start_delay: RISER_START_DELAY,
            riser_start_offset: RISER_START_OFFSET,

            generation_lookahead: GENERATION_LOOKAHEAD,
            retire_distance: RETIRE_DISTANCE,
            mazes_enabled: true,
            enemies_enabled: true,
        }
    }
}

impl GenerationSettings {
    /// Default settings with the given seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parse settings from JSON (missing fields fall back to defaults)
    pub fn from_json(json: &str) -> Result<Self, GenError> {
        let settings: Self =
            serde_json::from_str(json).map_err(|e| GenError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, GenError> {
        serde_json::to_string_pretty(self).map_err(|e| GenError::InvalidSettings(e.to_string()))
    }

    /// Reject values the generator cannot work with
    pub fn validate(&self) -> Result<(), GenError> {
        // A maze pattern must fit across the playfield
        let maze_width = MAZE_COLUMNS as f32 * TILE_SIZE;
        if !(self.world_width.is_finite() && self.world_width >= maze_width) {
            return Err(GenError::InvalidSettings(format!(
                "world_width {} must be at least {}",
                self.world_width, maze_width
            )));
        }
        if !self.start_y.is_finite() {
            return Err(GenError::InvalidSettings("start_y must be finite".into()));
        }
        if !(self.riser_base_speed >= 0.0 && self.riser_base_speed.is_finite()) {
            return Err(GenError::InvalidSettings(format!(
                "riser_base_speed {} must be non-negative",
                self.riser_base_speed
            )));
        }
        if self.riser_start_delay < 0.0 || self.riser_start_offset < 0.0 {
            return Err(GenError::InvalidSettings(
                "riser delay and offset must be non-negative".into(),
            ));
        }
        if self.generation_lookahead <= 0.0 || self.retire_distance <= 0.0 {
            return Err(GenError::InvalidSettings(
                "lookahead and retire distance must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(GenerationSettings::default().validate().is_ok());
        assert_eq!(GenerationSettings::default().start_y, -500.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = GenerationSettings::from_json(r#"{ "seed": 42, "riser_enabled": false }"#)
            .expect("valid json");
        assert_eq!(settings.seed, 42);
        assert!(!settings.riser_enabled);
        assert_eq!(settings.world_width, WORLD_WIDTH);
    }

    #[test]
    fn test_rejects_narrow_world() {
        let err = GenerationSettings::from_json(r#"{ "world_width": 100.0 }"#).unwrap_err();
        assert!(matches!(err, GenError::InvalidSettings(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(GenerationSettings::from_json("{ seed: }").is_err());
    }

    #[test]
    fn test_json_roundtrip_keeps_seed() {
        let settings = GenerationSettings::with_seed(7);
        let json = settings.to_json().expect("serializable");
        let back = GenerationSettings::from_json(&json).expect("valid json");
        assert_eq!(back.seed, 7);
    }
}
