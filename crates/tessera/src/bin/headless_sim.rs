//! # TESSERA Headless Simulation
//!
//! Runs a scripted scene with no window: drifting crates bouncing inside the
//! arena, and a pack of followers chasing a runner around a wall. Prints
//! frame statistics and how many world events reached the outbound bus.
//!
//! ## Usage
//!
//! ```bash
//! # Defaults, 30 simulated seconds
//! ./headless_sim
//!
//! # Custom config and duration
//! RUST_LOG=debug ./headless_sim tessera.toml 120
//! ```

use std::process::ExitCode;
use std::time::Instant;

use tessera::core::{Entity, Position, Velocity, World};
use tessera::nav::{FollowState, FollowTarget, Grid, TargetFollow};
use tessera::shared::{Cell, Rect, Vec2};
use tessera::spatial::Extent;
use tessera::{GameLoop, KernelConfig};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Simulated frame length handed to the loop (a steady 60 Hz display).
const FRAME_SECONDS: f32 = 1.0 / 60.0;

const DRIFTERS: usize = 512;
const FOLLOWERS: usize = 16;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => match KernelConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, "cannot start");
                return ExitCode::FAILURE;
            }
        },
        None => KernelConfig::default(),
    };
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(30.0);

    let mut game = match GameLoop::new(config) {
        Ok(game) => game,
        Err(err) => {
            error!(%err, "cannot start");
            return ExitCode::FAILURE;
        }
    };

    let cell = config.navigation.cell_size;
    let (width, height) = (config.navigation.width, config.navigation.height);
    game.set_navigation_grid(arena(width, height));
    let arena_bounds = Rect::from_min_max(0.0, 0.0, width as f32 * cell, height as f32 * cell);

    let runner = spawn_scene(game.world_mut(), arena_bounds, cell);
    let events = game.event_receiver();
    let mut events_seen = 0usize;

    let frames = (seconds / FRAME_SECONDS) as u64;
    info!(frames, drifters = DRIFTERS, followers = FOLLOWERS, "simulation starting");
    let started = Instant::now();

    for frame in 0..frames {
        bounce(game.world_mut(), arena_bounds);
        // The runner hops between two corners every ten seconds.
        if frame % 600 == 0 {
            let corner = if (frame / 600) % 2 == 0 { 0.15 } else { 0.85 };
            let to = Vec2::new(arena_bounds.width() * corner, arena_bounds.height() * corner);
            let world = game.world_mut();
            if let Some(p) = world.component_mut::<Position>(runner) {
                let offset = to - p.as_vec2();
                *p = Position::from(to);
                world.notify_moved(runner, offset);
            }
        }

        game.step(FRAME_SECONDS);
        events_seen += events.drain().len();
    }

    let elapsed = started.elapsed();
    let stats = game.stats();
    let reached = game
        .world()
        .entities()
        .filter_map(|e| game.world().component::<TargetFollow>(e))
        .filter(|f| f.state() == FollowState::Reached)
        .count();
    let center = arena_bounds.center();
    let near_center = game
        .query_region(&Rect::new(center - Vec2::new(64.0, 64.0), center + Vec2::new(64.0, 64.0)))
        .len();

    info!(
        frames = stats.frames,
        ticks = stats.ticks,
        avg_ticks = stats.avg_ticks_per_frame(),
        saturated = stats.saturated_frames,
        wall_ms = elapsed.as_millis() as u64,
        "simulation finished"
    );
    info!(
        entities = game.world().entity_count(),
        proxies = game.tree().len(),
        tree_height = game.tree().height(),
        reinsertions = game.tree().stats().reinsertions,
        near_center,
        followers_at_runner = reached,
        events = events_seen,
        "final state"
    );
    ExitCode::SUCCESS
}

/// Open arena with a vertical wall down the middle, gapped at both ends.
fn arena(width: u32, height: u32) -> Grid<u32> {
    let mut grid = Grid::new(width, height);
    let x = (width / 2) as i32;
    for y in 2..height.saturating_sub(2) {
        grid.set(Cell::new(x, y as i32), 1);
    }
    grid
}

/// Spawns drifters on a lattice and followers behind the runner. Returns
/// the runner.
fn spawn_scene(world: &mut World, bounds: Rect, cell: f32) -> Entity {
    let columns = (DRIFTERS as f32).sqrt().ceil() as usize;
    let spacing = Vec2::new(
        bounds.width() / (columns + 1) as f32,
        bounds.height() / (columns + 1) as f32,
    );
    for i in 0..DRIFTERS {
        let (col, row) = (i % columns, i / columns);
        let e = world.create_entity();
        world.add_component(
            e,
            Position::new(spacing.x * (col + 1) as f32, spacing.y * (row + 1) as f32),
        );
        // Deterministic spread of headings.
        let angle = i as f32 * 2.399_963;
        world.add_component(e, Velocity::new(angle.cos() * 40.0, angle.sin() * 40.0));
        world.add_component(e, Extent::new(4.0, 4.0));
        world.enable_entity(e);
    }

    let runner = world.create_entity();
    world.add_component(runner, Position::new(bounds.width() * 0.15, bounds.height() * 0.15));
    world.add_component(runner, Extent::new(6.0, 6.0));
    world.enable_entity(runner);

    for i in 0..FOLLOWERS {
        let e = world.create_entity();
        let start = Cell::new(1 + (i % 4) as i32, 1 + (i / 4) as i32);
        world.add_component(e, Position::from(start.center(cell)));
        world.add_component(e, Velocity::default());
        world.add_component(e, Extent::new(5.0, 5.0));
        world.add_component(e, TargetFollow::new(FollowTarget::Entity(runner), 96.0, cell));
        world.enable_entity(e);
    }
    runner
}

/// Reflects drifters off the arena edges.
fn bounce(world: &mut World, bounds: Rect) {
    let drifters: Vec<Entity> = world
        .entities()
        .filter(|&e| !world.has_component::<TargetFollow>(e))
        .collect();
    for e in drifters {
        let Some(&p) = world.component::<Position>(e) else {
            continue;
        };
        let Some(v) = world.component_mut::<Velocity>(e) else {
            continue;
        };
        if (p.x < bounds.min.x && v.dx < 0.0) || (p.x > bounds.max.x && v.dx > 0.0) {
            v.dx = -v.dx;
        }
        if (p.y < bounds.min.y && v.dy < 0.0) || (p.y > bounds.max.y && v.dy > 0.0) {
            v.dy = -v.dy;
        }
    }
}
