//! Maze rows instantiated from the pattern library
//!
//! A pattern is laid out bottom-to-top, one row every `MAZE_ROW_SPACING`,
//! centred in the playfield. Each instantiated row is re-validated against
//! its predecessor before it is emitted, using the safe envelope unless the
//! config allows hard gaps; a row that would break the envelope is skipped.

use rand::{Rng, SeedableRng};

use super::GenRng;
use super::enemies::EnemyKind;
use super::patterns::{MazePattern, PatternLibrary};
use super::reachability::ReachabilityConstraints;
use super::state::{Decoration, MazeRef, Platform, Row};
use crate::consts::*;
use crate::span_gap;

/// Salt mixed into the run seed for the decoration RNG
const DECORATION_SEED_SALT: u64 = 0x6d61_7a65_6465_636f;

/// Which part of a pattern to instantiate
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MazeRowConfig {
    /// Index into the pattern library
    pub pattern: usize,
    /// First pattern row to emit when resuming (`partial` only)
    pub row_offset: usize,
    /// Maximum rows to emit when resuming (`partial` only; None = rest of pattern)
    pub max_rows: Option<usize>,
    /// Platform the first emitted row must be reachable from
    pub anchor: Option<(Platform, f32)>,
    /// Validate against the hard envelope instead of the safe one
    pub hard: bool,
}

impl MazeRowConfig {
    /// Whole pattern, no anchor
    pub fn whole(pattern: usize) -> Self {
        Self {
            pattern,
            ..Self::default()
        }
    }

    /// `count` rows starting at `row_offset`
    pub fn resume(pattern: usize, row_offset: usize, count: usize) -> Self {
        Self {
            pattern,
            row_offset,
            max_rows: Some(count),
            ..Self::default()
        }
    }

    /// Require the first row to be reachable from `platform` on a row at `row_y`
    pub fn anchored(mut self, platform: &Platform, row_y: f32) -> Self {
        self.anchor = Some((platform.clone(), row_y));
        self
    }

    /// Allow hard-band gaps (difficulty tiers past the hard threshold)
    pub fn with_hard(mut self, hard: bool) -> Self {
        self.hard = hard;
        self
    }
}

/// Reserved placement hooks.
///
/// These slots exist so call sites can already pass them; none of them is
/// consulted yet and every field defaults to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MazeHooks {
    /// Reserved: force-exclude enemies from the emitted rows
    pub exclude_enemies: Option<bool>,
    /// Reserved: force a specific segment as the row reference
    pub segment_index: Option<usize>,
    /// Reserved: override the pattern's decoration template
    pub decoration: Option<usize>,
    /// Reserved: force the enemy kind placed on the rows
    pub enemy_kind: Option<EnemyKind>,
    /// Reserved: tint passed through to the host's tile visuals
    pub tint: Option<u32>,
}

impl MazeHooks {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Row generation strategy for structured maze rows
pub trait MazeSpawn {
    /// Instantiate rows of a pattern starting at `start_y` (see `MazeRowConfig`)
    fn spawn_maze_row_from_config(
        &mut self,
        start_y: f32,
        config: &MazeRowConfig,
        mirrored: bool,
        partial: bool,
        hooks: MazeHooks,
    ) -> Vec<Row>;

    /// Playground entry point: the whole pattern, unmirrored
    fn spawn_pattern(&mut self, start_y: f32, pattern: usize) -> Vec<Row> {
        self.spawn_maze_row_from_config(
            start_y,
            &MazeRowConfig::whole(pattern),
            false,
            false,
            MazeHooks::default(),
        )
    }
}

#[derive(Debug, Clone)]
pub struct MazeSpawner {
    library: PatternLibrary,
    constraints: ReachabilityConstraints,
    world_width: f32,
    rng: GenRng,
}

impl MazeSpawner {
    pub fn new(
        library: PatternLibrary,
        constraints: ReachabilityConstraints,
        world_width: f32,
        seed: u64,
    ) -> Self {
        Self {
            library,
            constraints,
            world_width,
            rng: GenRng::seed_from_u64(seed ^ DECORATION_SEED_SALT),
        }
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    /// Left edge of column 0 (patterns are centred in the playfield)
    fn origin_x(&self) -> f32 {
        ((self.world_width - MAZE_COLUMNS as f32 * TILE_SIZE) / 2.0).max(0.0)
    }

    fn build_platforms(&self, pattern: &MazePattern, row: usize, mirrored: bool, y: f32) -> Vec<Platform> {
        let origin = self.origin_x();
        pattern
            .segments(row, mirrored)
            .into_iter()
            .map(|seg| {
                let width = seg.len as f32 * TILE_SIZE;
                let left = origin + seg.start_col as f32 * TILE_SIZE;
                Platform::fixed(left + width / 2.0, y, width)
            })
            .collect()
    }

    /// Index of the platform closest to `from` if the hop is inside the envelope
    fn reachable_reference(
        &self,
        platforms: &[Platform],
        from: &Platform,
        from_y: f32,
        y: f32,
        hard: bool,
    ) -> Option<usize> {
        let c = &self.constraints;
        let dy = from_y - y;
        let (from_left, from_right) = from.swept_span();

        let (index, gap) = platforms
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let (l, r) = p.swept_span();
                (i, span_gap(from_left, from_right, l, r))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))?;

        match c.check_gap(gap, dy, hard) {
            Ok(()) => Some(index),
            Err(err) => {
                log::warn!("Skipping maze row at y={y:.0}: {err}");
                None
            }
        }
    }

    fn decorate(&mut self, pattern: &MazePattern, row: &mut Row) {
        let Some(deco) = pattern.decoration.and_then(|d| self.library.decoration(d).map(|p| (d, p))) else {
            return;
        };
        let (index, template) = deco;
        for platform in &row.platforms {
            for &(u, v) in template.placements {
                if self.rng.random::<f32>() < template.density {
                    row.decorations.push(Decoration {
                        pattern: index,
                        x: platform.left() + u * platform.width,
                        y: row.y - v * DECORATION_HEIGHT,
                    });
                }
            }
        }
    }
}

impl MazeSpawn for MazeSpawner {
    fn spawn_maze_row_from_config(
        &mut self,
        start_y: f32,
        config: &MazeRowConfig,
        mirrored: bool,
        partial: bool,
        _hooks: MazeHooks,
    ) -> Vec<Row> {
        let pattern = match self.library.get(config.pattern) {
            Ok(p) => p,
            Err(err) => {
                log::warn!("{err}; no maze rows spawned");
                return Vec::new();
            }
        };

        let (first, count) = if partial {
            let remaining = pattern.row_count().saturating_sub(config.row_offset);
            (config.row_offset, config.max_rows.map_or(remaining, |m| m.min(remaining)))
        } else {
            (0, pattern.row_count())
        };
        if count == 0 {
            log::warn!(
                "Pattern '{}' exhausted at row {}; no maze rows spawned",
                pattern.name,
                config.row_offset
            );
            return Vec::new();
        }

        let mut rows: Vec<Row> = Vec::with_capacity(count);
        for (i, pattern_row) in (first..first + count).enumerate() {
            let y = start_y - i as f32 * MAZE_ROW_SPACING;
            let platforms = self.build_platforms(pattern, pattern_row, mirrored, y);
            if platforms.is_empty() {
                continue;
            }

            let predecessor = match rows.last() {
                Some(prev) => Some((prev.reference_platform().clone(), prev.y)),
                None => config.anchor.clone(),
            };
            let reference = match predecessor {
                Some((from, from_y)) => {
                    match self.reachable_reference(&platforms, &from, from_y, y, config.hard) {
                        Some(idx) => idx,
                        None => continue,
                    }
                }
                None => 0,
            };

            let mut row = Row {
                id: 0,
                y,
                platforms,
                reference,
                maze: Some(MazeRef {
                    pattern: config.pattern,
                    row: pattern_row,
                    mirrored,
                }),
                decorations: Vec::new(),
                enemy: None,
            };
            self.decorate(pattern, &mut row);
            rows.push(row);
        }

        log::debug!(
            "Maze '{}' rows {}..{} (mirrored={}) -> {} rows",
            pattern.name,
            first,
            first + count,
            mirrored,
            rows.len()
        );
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::patterns::MAZE_PATTERNS;

    fn spawner() -> MazeSpawner {
        let c = ReachabilityConstraints::from_physics(1200.0, -600.0, 300.0).unwrap();
        MazeSpawner::new(PatternLibrary::default(), c, WORLD_WIDTH, 42)
    }

    #[test]
    fn test_every_pattern_instantiates_fully() {
        let mut s = spawner();
        for (i, pattern) in MAZE_PATTERNS.iter().enumerate() {
            for mirrored in [false, true] {
                let rows = s.spawn_maze_row_from_config(
                    -1000.0,
                    &MazeRowConfig::whole(i),
                    mirrored,
                    false,
                    MazeHooks::default(),
                );
                assert_eq!(rows.len(), pattern.row_count(), "{} mirrored={}", pattern.name, mirrored);
            }
        }
    }

    #[test]
    fn test_rows_ascend_by_spacing() {
        let mut s = spawner();
        let rows = s.spawn_pattern(-1000.0, 0);
        for (i, row) in rows.iter().enumerate() {
            assert_eq!(row.y, -1000.0 - i as f32 * MAZE_ROW_SPACING);
            assert_eq!(row.maze.map(|m| m.row), Some(i));
            assert!(row.platforms.iter().all(|p| p.y == row.y));
        }
    }

    #[test]
    fn test_partial_resumes_from_offset() {
        let mut s = spawner();
        let rows = s.spawn_maze_row_from_config(
            -700.0,
            &MazeRowConfig::resume(1, 2, 1),
            false,
            true,
            MazeHooks::default(),
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].y, -700.0);
        assert_eq!(rows[0].maze.map(|m| m.row), Some(2));
    }

    #[test]
    fn test_partial_ignored_when_not_partial() {
        let mut s = spawner();
        let rows = s.spawn_maze_row_from_config(
            -700.0,
            &MazeRowConfig::resume(1, 2, 1),
            false,
            false,
            MazeHooks::default(),
        );
        assert_eq!(rows.len(), MAZE_PATTERNS[1].row_count());
    }

    #[test]
    fn test_exhausted_partial_is_noop() {
        let mut s = spawner();
        let rows = s.spawn_maze_row_from_config(
            -700.0,
            &MazeRowConfig::resume(1, 99, 1),
            false,
            true,
            MazeHooks::default(),
        );
        assert!(rows.is_empty());
    }

    #[test]
    fn test_out_of_range_pattern_is_noop() {
        let mut s = spawner();
        assert!(s.spawn_pattern(-700.0, MAZE_PATTERNS.len()).is_empty());
    }

    #[test]
    fn test_mirroring_flips_geometry() {
        let mut s = spawner();
        let plain = s.spawn_pattern(-700.0, 0);
        let mirrored = s.spawn_maze_row_from_config(
            -700.0,
            &MazeRowConfig::whole(0),
            true,
            false,
            MazeHooks::default(),
        );
        let a = &plain[0].platforms[0];
        let b = &mirrored[0].platforms[0];
        assert!((a.x - (WORLD_WIDTH - b.x)).abs() < 1e-3);
        assert_eq!(a.width, b.width);
    }

    #[test]
    fn test_unreachable_anchor_skips_rows() {
        let mut s = spawner();
        // Anchor far below: every row is out of vertical reach
        let anchor = Platform::fixed(240.0, -200.0, 100.0);
        let config = MazeRowConfig::whole(0).anchored(&anchor, -200.0);
        let rows = s.spawn_maze_row_from_config(-700.0, &config, false, false, MazeHooks::default());
        assert!(rows.is_empty());
    }

    #[test]
    fn test_anchor_gap_respects_selected_band() {
        let mut s = spawner();
        // Zigzag row 0 covers x in [0, 160]; the anchor's left edge sits 150 px
        // to the right, between the safe and hard horizontal limits
        let anchor = Platform::fixed(340.0, -600.0, 60.0);
        let safe = MazeRowConfig::resume(0, 0, 1).anchored(&anchor, -600.0);
        let rows = s.spawn_maze_row_from_config(-700.0, &safe, false, true, MazeHooks::default());
        assert!(rows.is_empty());

        let hard = safe.with_hard(true);
        let rows = s.spawn_maze_row_from_config(-700.0, &hard, false, true, MazeHooks::default());
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_anchor_selects_nearest_segment() {
        let mut s = spawner();
        // Split Ladder row 0 has segments on both walls; anchor on the right wall
        let anchor = Platform::fixed(440.0, -600.0, 60.0);
        let config = MazeRowConfig::whole(1).anchored(&anchor, -600.0);
        let rows = s.spawn_maze_row_from_config(-700.0, &config, false, false, MazeHooks::default());
        assert_eq!(rows.len(), 4);
        assert!(rows[0].reference_platform().x > WORLD_WIDTH / 2.0);
    }

    #[test]
    fn test_decorations_stay_on_row() {
        let mut s = spawner();
        for _ in 0..10 {
            for row in s.spawn_pattern(-700.0, 0) {
                for deco in &row.decorations {
                    assert!(deco.y <= row.y && deco.y >= row.y - DECORATION_HEIGHT);
                    assert!(row.platforms.iter().any(|p| deco.x >= p.left() && deco.x <= p.right()));
                }
            }
        }
    }

    #[test]
    fn test_default_hooks_are_empty() {
        assert!(MazeHooks::default().is_empty());
    }
}
