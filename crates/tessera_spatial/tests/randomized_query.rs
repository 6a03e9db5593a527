//! # Randomized Tree Query Test
//!
//! Proves that region queries over a churning tree return exactly the proxies
//! whose tight bounds overlap the region, checked against a brute-force scan.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tessera_shared::{Rect, Vec2};
use tessera_spatial::{DynamicAabbTree, ProxyId, TreeConfig};

const WORLD: f32 = 1000.0;

fn random_rect(rng: &mut ChaCha8Rng) -> Rect {
    let origin = Vec2::new(rng.gen_range(0.0..WORLD), rng.gen_range(0.0..WORLD));
    Rect::from_origin_size(origin, rng.gen_range(1.0..40.0), rng.gen_range(1.0..40.0))
}

fn brute_force(live: &[(ProxyId, u32, Rect)], region: &Rect) -> Vec<u32> {
    let mut out: Vec<_> = live
        .iter()
        .filter(|(_, _, bounds)| bounds.overlaps(region))
        .map(|&(_, payload, _)| payload)
        .collect();
    out.sort_unstable();
    out
}

fn tree_hits(tree: &DynamicAabbTree<u32>, region: &Rect) -> Vec<u32> {
    let mut out = Vec::new();
    tree.query_tight(region, |_, &payload| {
        out.push(payload);
        true
    });
    out.sort_unstable();
    out
}

/// Test: tight queries match a brute-force scan through inserts, moves and removals.
#[test]
fn test_query_matches_brute_force() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x7e55e7a);
    let mut tree = DynamicAabbTree::new(TreeConfig::default());
    let mut live: Vec<(ProxyId, u32, Rect)> = Vec::new();
    let mut next_payload = 0u32;

    for round in 0..2_000 {
        match rng.gen_range(0..10) {
            0..=4 => {
                let bounds = random_rect(&mut rng);
                let id = tree.insert(bounds, next_payload).unwrap();
                live.push((id, next_payload, bounds));
                next_payload += 1;
            }
            5..=7 if !live.is_empty() => {
                let slot = rng.gen_range(0..live.len());
                let (id, _, old) = live[slot];
                let step = Vec2::new(rng.gen_range(-15.0..15.0), rng.gen_range(-15.0..15.0));
                let bounds = old.translated(step);
                tree.move_proxy(id, bounds, step).unwrap();
                live[slot].2 = bounds;
            }
            8 | 9 if !live.is_empty() => {
                let slot = rng.gen_range(0..live.len());
                let (id, payload, _) = live.swap_remove(slot);
                assert_eq!(tree.remove_proxy(id), payload);
            }
            _ => {}
        }

        if round % 50 == 0 {
            tree.validate().unwrap();
        }

        let region = {
            let origin = Vec2::new(rng.gen_range(-50.0..WORLD), rng.gen_range(-50.0..WORLD));
            Rect::from_origin_size(origin, rng.gen_range(1.0..200.0), rng.gen_range(1.0..200.0))
        };
        assert_eq!(
            tree_hits(&tree, &region),
            brute_force(&live, &region),
            "round {round}, region {region:?}"
        );
    }

    assert_eq!(tree.len(), live.len());
    tree.validate().unwrap();
}

/// Test: the fat-bounds query never misses a tight hit.
#[test]
fn test_fat_query_is_superset() {
    let mut rng = ChaCha8Rng::seed_from_u64(99);
    let mut tree = DynamicAabbTree::new(TreeConfig::default());
    let mut live = Vec::new();
    for payload in 0..500u32 {
        let bounds = random_rect(&mut rng);
        live.push((tree.insert(bounds, payload).unwrap(), payload, bounds));
    }

    for _ in 0..200 {
        let region = random_rect(&mut rng);
        let mut fat = Vec::new();
        tree.query(&region, |_, &payload| {
            fat.push(payload);
            true
        });
        for hit in brute_force(&live, &region) {
            assert!(fat.contains(&hit), "fat query missed {hit}");
        }
    }
}

/// Test: jitter inside the margin never rebuilds anything.
#[test]
fn test_jitter_inside_margin_is_free() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let config = TreeConfig {
        margin: 2.0,
        displacement_multiplier: 2.0,
    };
    let mut tree = DynamicAabbTree::new(config);
    let proxies: Vec<_> = (0..300u32)
        .map(|payload| {
            let bounds = random_rect(&mut rng);
            (tree.insert(bounds, payload).unwrap(), bounds)
        })
        .collect();
    tree.reset_stats();

    for _ in 0..10 {
        for &(id, home) in &proxies {
            let jitter = Vec2::new(rng.gen_range(-1.5..1.5), rng.gen_range(-1.5..1.5));
            assert!(!tree.move_proxy(id, home.translated(jitter), jitter).unwrap());
        }
    }

    assert_eq!(tree.stats().reinsertions, 0);
    assert_eq!(tree.stats().rotations, 0);
    tree.validate().unwrap();
}
