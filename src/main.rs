//! Sky Ascent headless runner
//!
//! Climbs a seeded level with a scripted player and prints a JSON summary.
//!
//! Usage: `sky-ascent [seed] [rows]`

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use serde::Serialize;
use sky_ascent::consts::*;
use sky_ascent::events::LevelEvent;
use sky_ascent::host::HeadlessHost;
use sky_ascent::{GenerationSettings, Session};

/// Vertical speed of the scripted climber (pixels per second)
const CLIMB_SPEED: f32 = 260.0;
/// Give up after this many simulated seconds
const MAX_RUN_SECS: f32 = 600.0;

#[derive(Debug, Default, Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    rows_generated: u32,
    maze_rows: u32,
    rows_retired: u32,
    enemies_placed: u32,
    enemies_active: usize,
    final_tier: u32,
    height_climbed: f32,
    caught: bool,
}

#[derive(Debug, Default)]
struct Counters {
    maze_rows: u32,
    rows_retired: u32,
    enemies_placed: u32,
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let target_rows: u32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(200);

    match run(seed, target_rows) {
        Ok(summary) => match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => log::error!("Failed to serialize summary: {}", e),
        },
        Err(e) => {
            log::error!("Run failed: {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {}

fn run(seed: u64, target_rows: u32) -> Result<RunSummary, sky_ascent::GenError> {
    log::info!("Sky Ascent headless run: seed={} rows={}", seed, target_rows);

    let settings = GenerationSettings::with_seed(seed);
    let start = Vec2::new(settings.world_width / 2.0, settings.start_y);
    let mut session = Session::new(HeadlessHost::new(start), settings)?;

    let counters = Rc::new(RefCell::new(Counters::default()));
    let sink = Rc::clone(&counters);
    session.subscribe(move |event| {
        let mut c = sink.borrow_mut();
        match event {
            LevelEvent::RowGenerated { maze: true, .. } => c.maze_rows += 1,
            LevelEvent::RowRetired { .. } => c.rows_retired += 1,
            LevelEvent::EnemyPlaced { .. } => c.enemies_placed += 1,
            _ => {}
        }
    });

    let mut caught = false;
    let mut elapsed = 0.0;
    while elapsed < MAX_RUN_SECS {
        step_climber(&mut session, SIM_DT);
        let report = session.tick(SIM_DT);
        elapsed += SIM_DT;

        if report.player_caught {
            caught = true;
            break;
        }
        if session.level().generation_state().rows_generated >= target_rows {
            break;
        }
    }

    let level = session.level();
    let state = level.generation_state();
    let c = counters.borrow();
    let summary = RunSummary {
        seed,
        ticks: session.ticks(),
        rows_generated: state.rows_generated,
        maze_rows: c.maze_rows,
        rows_retired: c.rows_retired,
        enemies_placed: c.enemies_placed,
        enemies_active: level.pools().active_count(),
        final_tier: state.difficulty_tier,
        height_climbed: state.height_climbed(),
        caught,
    };
    drop(c);
    session.end();
    Ok(summary)
}

/// Move the scripted player toward the lowest row still above it
fn step_climber(session: &mut Session<HeadlessHost>, dt: f32) {
    let player = session.level().host().player;
    let target = session
        .level()
        .rows()
        .iter()
        .filter(|r| r.y < player.y)
        .max_by(|a, b| a.y.total_cmp(&b.y))
        .map(|r| {
            let p = r.reference_platform();
            Vec2::new(p.current_x(), r.y)
        });

    let Some(target) = target else {
        return;
    };
    let host = session.level_mut().host_mut();
    host.player.y = (player.y - CLIMB_SPEED * dt).max(target.y);
    host.player.x = target.x;
}
