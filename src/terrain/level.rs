//! Level manager: the generation orchestrator
//!
//! Owns the generation state, the active row history, the enemy pools and
//! the riser. Every mutation happens synchronously inside one of its
//! methods; the host calls `update` once per frame.
//!
//! Two states:
//! - `Running`: `generate_next_row` delegates to the pacing controller and
//!   the spawners
//! - `Frozen`: `generate_next_row` is a no-op; direct spawns, moving
//!   platforms and the riser keep working

use std::collections::VecDeque;

use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::GenRng;
use super::enemies::{EnemyHandle, EnemyPlacementPolicy, EnemyPools};
use super::maze::{MazeHooks, MazeRowConfig, MazeSpawn, MazeSpawner};
use super::patterns::PatternLibrary;
use super::platform::{PlatformSpawn, PlatformSpawner};
use super::reachability::ReachabilityConstraints;
use super::riser::RiserManager;
use super::slots::{RowPlan, SlotGenerator, difficulty_tier};
use super::state::{GenerationState, MazeCursor, Row};
use crate::consts::*;
use crate::error::GenError;
use crate::events::LevelEvent;
use crate::host::{HostCapabilities, VisualRequest};
use crate::settings::GenerationSettings;

/// Orchestrator state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelState {
    /// Normal endless generation
    Running,
    /// Automatic generation neutralized (playground rules)
    Frozen,
}

/// Summary of one `update` call
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub rows_generated: u32,
    pub rows_retired: u32,
    pub tier: u32,
    pub hazard_y: f32,
    /// The hazard front has reached the player
    pub player_caught: bool,
}

pub struct LevelManager<H: HostCapabilities> {
    host: H,
    settings: GenerationSettings,
    constraints: ReachabilityConstraints,
    library: PatternLibrary,
    state: LevelState,
    gen_state: GenerationState,
    /// Last automatically generated row (predecessor of the next one)
    frontier: Row,
    /// Rows under active tracking, in creation order
    rows: Vec<Row>,
    platform_spawner: Box<dyn PlatformSpawn>,
    maze_spawner: Option<Box<dyn MazeSpawn>>,
    slots: SlotGenerator,
    riser: RiserManager,
    enemy_policy: EnemyPlacementPolicy,
    pools: EnemyPools,
    rng: GenRng,
    /// Bounded by `MAX_QUEUED_EVENTS`
    events: VecDeque<LevelEvent>,
    /// Overflow already reported since the last drain
    events_overflowed: bool,
    player_caught: bool,
}

impl<H: HostCapabilities> std::fmt::Debug for LevelManager<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LevelManager")
            .field("state", &self.state)
            .field("gen_state", &self.gen_state)
            .field("rows", &self.rows.len())
            .field("hazard", self.riser.front())
            .finish()
    }
}

impl<H: HostCapabilities> LevelManager<H> {
    /// Build a manager with the default spawners.
    ///
    /// Fails if the settings or the host's physics constants are invalid;
    /// nothing may be generated without a trustworthy reachability model.
    pub fn new(host: H, settings: GenerationSettings) -> Result<Self, GenError> {
        settings.validate()?;
        let constraints = ReachabilityConstraints::from_constants(&host.physics())?;
        let library = PatternLibrary::default();
        let platform = Box::new(PlatformSpawner::new(constraints, settings.world_width));
        let maze = Box::new(MazeSpawner::new(
            library,
            constraints,
            settings.world_width,
            settings.seed,
        ));
        Self::build(host, settings, constraints, library, platform, Some(maze))
    }

    /// Build a manager with caller-supplied spawners (tests, dev tooling).
    /// A `None` maze spawner makes every maze request a logged no-op.
    pub fn with_spawners(
        host: H,
        settings: GenerationSettings,
        platform_spawner: Box<dyn PlatformSpawn>,
        maze_spawner: Option<Box<dyn MazeSpawn>>,
    ) -> Result<Self, GenError> {
        settings.validate()?;
        let constraints = ReachabilityConstraints::from_constants(&host.physics())?;
        Self::build(
            host,
            settings,
            constraints,
            PatternLibrary::default(),
            platform_spawner,
            maze_spawner,
        )
    }

    fn build(
        mut host: H,
        settings: GenerationSettings,
        constraints: ReachabilityConstraints,
        library: PatternLibrary,
        platform_spawner: Box<dyn PlatformSpawn>,
        maze_spawner: Option<Box<dyn MazeSpawn>>,
    ) -> Result<Self, GenError> {
        let mut gen_state = GenerationState::new(settings.start_y);
        let floor = Row::floor(gen_state.next_row_id(), settings.start_y, settings.world_width);
        for platform in &floor.platforms {
            host.spawn_visual(VisualRequest::Platform {
                row_id: floor.id,
                platform: platform.clone(),
                tile: false,
            });
        }

        let riser = RiserManager::new(
            settings.start_y + settings.riser_start_offset,
            settings.riser_base_speed,
            settings.riser_start_delay,
            settings.riser_enabled,
        );

        log::info!(
            "Level manager ready: seed={} start_y={} patterns={}",
            settings.seed,
            settings.start_y,
            library.len()
        );

        Ok(Self {
            host,
            slots: SlotGenerator::new(library, settings.mazes_enabled),
            rng: GenRng::seed_from_u64(settings.seed),
            settings,
            constraints,
            library,
            state: LevelState::Running,
            gen_state,
            rows: vec![floor.clone()],
            frontier: floor,
            platform_spawner,
            maze_spawner,
            riser,
            enemy_policy: EnemyPlacementPolicy::default(),
            pools: EnemyPools::default(),
            events: VecDeque::new(),
            events_overflowed: false,
            player_caught: false,
        })
    }

    // === Accessors ===

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    pub fn constraints(&self) -> &ReachabilityConstraints {
        &self.constraints
    }

    pub fn library(&self) -> &PatternLibrary {
        &self.library
    }

    pub fn state(&self) -> LevelState {
        self.state
    }

    pub fn generation_state(&self) -> &GenerationState {
        &self.gen_state
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Predecessor of the next automatically generated row
    pub fn frontier(&self) -> &Row {
        &self.frontier
    }

    pub fn riser(&self) -> &RiserManager {
        &self.riser
    }

    pub fn riser_mut(&mut self) -> &mut RiserManager {
        &mut self.riser
    }

    pub fn pools(&self) -> &EnemyPools {
        &self.pools
    }

    pub fn enemy_policy_mut(&mut self) -> &mut EnemyPlacementPolicy {
        &mut self.enemy_policy
    }

    /// Take the events queued since the last drain
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        self.events_overflowed = false;
        self.events.drain(..).collect()
    }

    pub fn queued_events(&self) -> usize {
        self.events.len()
    }

    fn push_event(&mut self, event: LevelEvent) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            self.events.pop_front();
            if !self.events_overflowed {
                self.events_overflowed = true;
                log::warn!("Level event queue full ({MAX_QUEUED_EVENTS}); dropping oldest events until drained");
            }
        }
        self.events.push_back(event);
    }

    // === State machine ===

    /// Neutralize automatic generation. Takes effect at the next call.
    pub fn freeze(&mut self) {
        if self.state == LevelState::Frozen {
            return;
        }
        self.slots.suspend(&mut self.gen_state);
        self.gen_state.generation_enabled = false;
        self.set_state(LevelState::Frozen);
    }

    pub fn unfreeze(&mut self) {
        if self.state == LevelState::Running {
            return;
        }
        self.slots.resume();
        self.gen_state.generation_enabled = true;
        self.set_state(LevelState::Running);
    }

    fn set_state(&mut self, to: LevelState) {
        let from = self.state;
        self.state = to;
        log::info!("Level state {:?} -> {:?}", from, to);
        self.push_event(LevelEvent::StateChanged { from, to });
    }

    pub fn set_riser_enabled(&mut self, enabled: bool) {
        if self.riser.is_enabled() != enabled {
            self.riser.set_enabled(enabled);
            self.push_event(LevelEvent::RiserToggled { enabled });
        }
    }

    // === Generation ===

    /// Produce the next row through the pacing controller.
    ///
    /// Returns None while frozen (and never touches the generation state).
    pub fn generate_next_row(&mut self) -> Option<Row> {
        if self.state == LevelState::Frozen || !self.gen_state.generation_enabled {
            return None;
        }

        self.refresh_tier();
        let tier = self.gen_state.difficulty_tier;
        let plan = self.slots.next_row_type(&self.gen_state, &mut self.rng)?;

        let row = match plan {
            RowPlan::Platform => None,
            RowPlan::Maze {
                pattern,
                row,
                mirrored,
            } => self.spawn_maze_step(pattern, row, mirrored),
        };
        let row = match row {
            Some(row) => row,
            None => {
                let last_y = self.gen_state.last_platform_y;
                let row = self.platform_spawner.spawn_row(
                    &self.frontier,
                    tier,
                    &mut self.gen_state,
                    &mut self.rng,
                );
                if !row.has_reference() {
                    log::warn!("Platform spawner returned a row without a reference platform; dropped");
                    self.gen_state.last_platform_y = last_y;
                    return None;
                }
                row
            }
        };

        self.gen_state.rows_generated += 1;
        if row.is_maze() {
            self.gen_state.rows_since_maze = 0;
        } else {
            self.gen_state.rows_since_maze += 1;
        }

        let row = self.commit_row(row, true)?;
        self.frontier = row.clone();
        Some(row)
    }

    /// One row of a maze, resuming at `pattern_row`. The cursor only advances
    /// when a row is produced; a failed step abandons the maze.
    fn spawn_maze_step(&mut self, pattern: usize, pattern_row: usize, mirrored: bool) -> Option<Row> {
        let Some(spawner) = self.maze_spawner.as_mut() else {
            log::warn!("{}; falling back to a platform row", GenError::SpawnerUnavailable("maze"));
            self.gen_state.maze_cursor = None;
            return None;
        };

        let start_y = self.frontier.y - MAZE_ROW_SPACING;
        let hard = ReachabilityConstraints::allows_hard(self.gen_state.difficulty_tier);
        let config = MazeRowConfig::resume(pattern, pattern_row, 1)
            .anchored(self.frontier.reference_platform(), self.frontier.y)
            .with_hard(hard);
        let row = spawner
            .spawn_maze_row_from_config(start_y, &config, mirrored, true, MazeHooks::default())
            .into_iter()
            .next()
            .filter(Row::has_reference);

        match row {
            Some(row) => {
                let emitted = row.maze.map_or(pattern_row, |m| m.row);
                let next_row = emitted + 1;
                let row_count = self.library.get(pattern).map_or(0, |p| p.row_count());
                self.gen_state.maze_cursor = (next_row < row_count).then_some(MazeCursor {
                    pattern,
                    next_row,
                    mirrored,
                });
                self.gen_state.last_platform_y = row.y;
                Some(row)
            }
            None => {
                log::debug!("Maze {} abandoned at row {}", pattern, pattern_row);
                self.gen_state.maze_cursor = None;
                None
            }
        }
    }

    /// Explicit row without pacing (tests, dev tooling). Does not move the frontier.
    ///
    /// None only if the platform spawner produced an unusable row.
    pub fn spawn_platform(
        &mut self,
        x: f32,
        y: f32,
        width: f32,
        is_moving: bool,
        move_range: f32,
    ) -> Option<Row> {
        let row = self
            .platform_spawner
            .spawn_platform(x, y, width, is_moving, move_range);
        self.commit_row(row, false)
    }

    /// Maze rows with every placement hook left at its default
    pub fn spawn_maze_row_from_config(
        &mut self,
        start_y: f32,
        config: &MazeRowConfig,
        mirrored: bool,
        partial: bool,
    ) -> Vec<Row> {
        self.spawn_maze_row_from_config_with(start_y, config, mirrored, partial, MazeHooks::default())
    }

    /// Pass-through to the maze spawner. Does not move the frontier.
    pub fn spawn_maze_row_from_config_with(
        &mut self,
        start_y: f32,
        config: &MazeRowConfig,
        mirrored: bool,
        partial: bool,
        hooks: MazeHooks,
    ) -> Vec<Row> {
        let Some(spawner) = self.maze_spawner.as_mut() else {
            log::warn!("{}; spawn_maze_row_from_config ignored", GenError::SpawnerUnavailable("maze"));
            return Vec::new();
        };
        let rows = spawner.spawn_maze_row_from_config(start_y, config, mirrored, partial, hooks);
        rows.into_iter().filter_map(|row| self.commit_row(row, false)).collect()
    }

    /// Playground entry point: materialize a whole pattern, no pacing, no enemies
    pub fn spawn_pattern(&mut self, start_y: f32, pattern: usize) -> Vec<Row> {
        let Some(spawner) = self.maze_spawner.as_mut() else {
            log::warn!("{}; spawn_pattern ignored", GenError::SpawnerUnavailable("maze"));
            return Vec::new();
        };
        let rows = spawner.spawn_pattern(start_y, pattern);
        if rows.is_empty() {
            return rows;
        }
        self.push_event(LevelEvent::PatternSpawned {
            pattern,
            rows: rows.len(),
        });
        rows.into_iter().filter_map(|row| self.commit_row(row, false)).collect()
    }

    /// Assign an id, optionally place an enemy, materialize and track the row.
    /// Rows without a reference platform are rejected.
    fn commit_row(&mut self, mut row: Row, place_enemy: bool) -> Option<Row> {
        if !row.has_reference() {
            log::warn!(
                "Rejected row at y={:.0}: reference {} out of {} platforms",
                row.y,
                row.reference,
                row.platforms.len()
            );
            return None;
        }
        row.id = self.gen_state.next_row_id();

        if place_enemy && self.settings.enemies_enabled {
            row.enemy = self.enemy_policy.place_if_eligible(
                &row,
                self.riser.front(),
                self.gen_state.difficulty_tier,
                &mut self.pools,
                &mut self.rng,
            );
        }

        let tile = row.is_maze();
        for platform in &row.platforms {
            self.host.spawn_visual(VisualRequest::Platform {
                row_id: row.id,
                platform: platform.clone(),
                tile,
            });
        }
        for decoration in &row.decorations {
            self.host.spawn_visual(VisualRequest::Decoration {
                row_id: row.id,
                decoration: decoration.clone(),
            });
        }
        if let Some(handle) = row.enemy
            && let Some(enemy) = self.pools.get(handle)
        {
            self.host.spawn_visual(VisualRequest::Enemy {
                row_id: row.id,
                handle,
                kind: enemy.kind,
                pos: glam::Vec2::new(enemy.x, enemy.y),
            });
            self.push_event(LevelEvent::EnemyPlaced {
                row_id: row.id,
                handle,
            });
        }

        self.push_event(LevelEvent::RowGenerated {
            row_id: row.id,
            y: row.y,
            maze: tile,
        });
        self.rows.push(row.clone());
        Some(row)
    }

    fn refresh_tier(&mut self) {
        let tier = difficulty_tier(self.gen_state.height_climbed(), self.gen_state.elapsed);
        if tier > self.gen_state.difficulty_tier {
            self.gen_state.difficulty_tier = tier;
            self.riser.set_tier(tier);
            log::info!("Difficulty tier {}", tier);
            self.push_event(LevelEvent::TierChanged { tier });
        }
    }

    /// Distance the riser must stay below the newest row
    pub fn required_riser_margin(&self) -> f32 {
        self.constraints.max_jump_height + RISER_SAFETY_MARGIN
    }

    // === Per-frame update ===

    /// Advance one host frame.
    pub fn update(&mut self, dt: f32) -> TickReport {
        self.gen_state.elapsed += dt;
        let player = self.host.player_position();

        let time = self.gen_state.elapsed;
        for row in &mut self.rows {
            for platform in row.platforms.iter_mut().filter(|p| p.is_moving) {
                platform.update(time);
            }
        }

        self.refresh_tier();
        self.riser.tick(dt);

        let mut rows_generated = 0;
        let margin = self.required_riser_margin();
        while self.state == LevelState::Running && rows_generated < MAX_ROWS_PER_TICK {
            let ahead = player.y - self.gen_state.last_platform_y;
            let needs_lookahead = ahead < self.settings.generation_lookahead;
            let needs_margin =
                self.riser.is_enabled() && self.riser.margin_to(self.gen_state.last_platform_y) < margin;
            if !(needs_lookahead || needs_margin) {
                break;
            }
            if self.generate_next_row().is_none() {
                break;
            }
            rows_generated += 1;
        }

        let rows_retired = self.retire_rows(player.y);

        let caught = self.riser.has_caught(player.y);
        if caught && !self.player_caught {
            log::info!("Player caught by the riser at y={:.0}", player.y);
            self.push_event(LevelEvent::PlayerCaught { y: player.y });
        }
        self.player_caught = caught;

        TickReport {
            rows_generated,
            rows_retired,
            tier: self.gen_state.difficulty_tier,
            hazard_y: self.riser.y(),
            player_caught: caught,
        }
    }

    /// Drop rows far below the player and return their enemies to the pools
    fn retire_rows(&mut self, player_y: f32) -> u32 {
        let cutoff = player_y + self.settings.retire_distance;
        let (retired, kept): (Vec<Row>, Vec<Row>) =
            std::mem::take(&mut self.rows).into_iter().partition(|r| r.y > cutoff);
        self.rows = kept;

        for row in &retired {
            if let Some(handle) = row.enemy {
                self.release_enemy(handle);
            }
            self.host.retire_row(row.id);
            self.push_event(LevelEvent::RowRetired { row_id: row.id });
        }
        retired.len() as u32
    }

    fn release_enemy(&mut self, handle: EnemyHandle) -> bool {
        if !self.pools.release(handle) {
            return false;
        }
        self.host.despawn_enemy(handle);
        self.push_event(LevelEvent::EnemyReleased { handle });
        true
    }

    /// The host reports an enemy defeated; its slot goes back to the pool
    pub fn defeat_enemy(&mut self, handle: EnemyHandle) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| r.enemy == Some(handle)) else {
            return false;
        };
        row.enemy = None;
        if self.frontier.enemy == Some(handle) {
            self.frontier.enemy = None;
        }
        self.release_enemy(handle)
    }
}
