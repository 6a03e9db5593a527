//! # World Tick Benchmark
//!
//! Measures entity churn and a full movement tick over a populated world.
//!
//! Run with: `cargo bench --package tessera_core`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use tessera_core::{ComponentsFilter, Entity, MovementSystem, Position, System, Velocity, World};

fn populated_world(count: usize) -> World {
    let mut world = World::with_capacity(count);
    world.add_system(MovementSystem, MovementSystem::required());
    for i in 0..count {
        let f = i as f32;
        let e = world.create_entity();
        world.add_component(e, Position::new(f, f * 0.5));
        world.add_component(e, Velocity::new(1.0, -1.0));
        world.enable_entity(e);
    }
    world.refresh();
    world
}

/// Benchmark: create, enable and destroy entities through the deferred queue.
fn bench_entity_churn(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_churn");

    for count in [1_000, 10_000] {
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &count| {
            let mut world = World::with_capacity(count);
            let mut handles = Vec::with_capacity(count);
            b.iter(|| {
                handles.clear();
                for _ in 0..count {
                    let e = world.create_entity();
                    world.enable_entity(e);
                    handles.push(e);
                }
                world.refresh();
                for &e in &handles {
                    world.destroy_entity(e);
                }
                black_box(world.refresh())
            });
        });
    }

    group.finish();
}

/// Benchmark: one tick of MovementSystem.
fn bench_movement_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("movement_tick");

    for count in [1_000, 10_000, 100_000] {
        let mut world = populated_world(count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                world.update(black_box(1.0 / 60.0));
            });
        });
    }

    group.finish();
}

/// Benchmark: gathering cost alone, with a system that does nothing.
fn bench_gather_only(c: &mut Criterion) {
    struct Noop;
    impl System for Noop {
        fn update(&mut self, _world: &mut World, entities: &[Entity], _dt: f32) {
            black_box(entities.len());
        }
    }

    let mut world = populated_world(100_000);
    world.add_system(Noop, ComponentsFilter::of::<Position>());

    c.bench_function("gather_100k", |b| {
        b.iter(|| world.update(0.0));
    });
}

criterion_group!(benches, bench_entity_churn, bench_movement_tick, bench_gather_only);
criterion_main!(benches);
