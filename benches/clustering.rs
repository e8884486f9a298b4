//! Benchmarks for the initial clustering pass.

use std::collections::HashSet;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use graph_dbscan::{AdjacencyGraph, Clustering, Graph};

/// A seeded graph of `count` integer nodes with every pairwise distance
/// materialised.
fn random_delta_graph(count: usize, seed: u64) -> AdjacencyGraph<i64, i64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut unique = HashSet::new();
    while unique.len() < count {
        unique.insert(rng.gen_range(0..(count as i64 * 4)));
    }
    let nodes: Vec<i64> = unique.into_iter().collect();
    let mut graph = AdjacencyGraph::new();
    for &node in &nodes {
        graph.insert_node(node);
    }
    for (index, &a) in nodes.iter().enumerate() {
        for &b in &nodes[index + 1..] {
            graph
                .set_edge(a, b, (a - b).abs())
                .expect("both endpoints inserted");
        }
    }
    graph
}

fn initial_clustering(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial-clustering");
    for count in [50, 100, 200] {
        let graph = random_delta_graph(count, 42);
        group.bench_function(format!("{count}-nodes"), |b| {
            b.iter(|| Clustering::new(black_box(graph.clone()), 4, 3).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, initial_clustering);
criterion_main!(benches);
