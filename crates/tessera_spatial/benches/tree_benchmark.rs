//! # AABB Tree Benchmark
//!
//! Measures insertion, small and large moves, and region queries.
//!
//! Run with: `cargo bench --package tessera_spatial`

#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_shared::{Rect, Vec2};
use tessera_spatial::{DynamicAabbTree, ProxyId, TreeConfig};

fn random_rects(count: usize, seed: u64) -> Vec<Rect> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let origin = Vec2::new(rng.gen_range(0.0..4096.0), rng.gen_range(0.0..4096.0));
            Rect::from_origin_size(origin, rng.gen_range(4.0..32.0), rng.gen_range(4.0..32.0))
        })
        .collect()
}

fn filled_tree(rects: &[Rect]) -> (DynamicAabbTree<usize>, Vec<ProxyId>) {
    let mut tree = DynamicAabbTree::with_capacity(TreeConfig::default(), rects.len());
    let ids = rects
        .iter()
        .enumerate()
        .map(|(i, &r)| tree.insert(r, i).expect("bench rects are proper"))
        .collect();
    (tree, ids)
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_insert");
    for count in [1_000, 10_000] {
        let rects = random_rects(count, 1);
        group.bench_with_input(BenchmarkId::from_parameter(count), &rects, |b, rects| {
            b.iter(|| black_box(filled_tree(rects).0.height()));
        });
    }
    group.finish();
}

fn bench_moves(c: &mut Criterion) {
    let rects = random_rects(10_000, 2);

    c.bench_function("tree_move_within_margin_10k", |b| {
        let (mut tree, ids) = filled_tree(&rects);
        let step = Vec2::new(0.5, -0.5);
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            let offset = if flip { step } else { Vec2::ZERO };
            for (&id, rect) in ids.iter().zip(&rects) {
                black_box(tree.move_proxy(id, rect.translated(offset), offset).ok());
            }
        });
    });

    c.bench_function("tree_move_escaping_10k", |b| {
        let (mut tree, ids) = filled_tree(&rects);
        let mut current = rects.clone();
        let step = Vec2::new(12.0, 0.0);
        b.iter(|| {
            for (&id, rect) in ids.iter().zip(current.iter_mut()) {
                *rect = rect.translated(step);
                black_box(tree.move_proxy(id, *rect, step).ok());
            }
        });
    });
}

fn bench_query(c: &mut Criterion) {
    let rects = random_rects(10_000, 3);
    let (tree, _) = filled_tree(&rects);
    let regions = random_rects(256, 4);

    c.bench_function("tree_query_10k", |b| {
        b.iter(|| {
            let mut hits = 0usize;
            for region in &regions {
                tree.query_tight(region, |_, _| {
                    hits += 1;
                    true
                });
            }
            black_box(hits)
        });
    });
}

criterion_group!(benches, bench_insert, bench_moves, bench_query);
criterion_main!(benches);
