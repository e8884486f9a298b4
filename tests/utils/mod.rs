#![allow(dead_code)]

//! Shared helpers for the integration tests.

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Once;

use distances::Number;
use mt_logger::{mt_new, Level, OutputStream};

use graph_dbscan::{AdjacencyGraph, Cluster, Clustering, DeltaMetric, DistanceGraph, Graph};

/// Initialises the logger once per test binary.
pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        mt_new!(None, Level::Debug, OutputStream::StdOut);
    });
}

/// A computed-distance graph over integer nodes measured by `|a - b|`.
pub fn delta_graph(nodes: &[i64]) -> DistanceGraph<i64, i64, DeltaMetric> {
    DistanceGraph::new(nodes.iter().copied(), DeltaMetric)
}

/// A clustering over [`delta_graph`] nodes.
pub fn delta_clustering(
    nodes: &[i64],
    cluster_distance: i64,
    core_neighbours: usize,
) -> Clustering<i64, i64, DistanceGraph<i64, i64, DeltaMetric>> {
    init_logging();
    Clustering::new(delta_graph(nodes), cluster_distance, core_neighbours)
        .expect("clustering over a computed-distance graph")
}

/// An adjacency graph materialising `|a - b|` for every pair of nodes.
pub fn delta_adjacency(nodes: &[i64]) -> AdjacencyGraph<i64, i64> {
    let mut graph = AdjacencyGraph::new();
    for &node in nodes {
        graph.insert_node(node);
    }
    for (index, &a) in nodes.iter().enumerate() {
        for &b in &nodes[index + 1..] {
            graph.set_edge(a, b, (a - b).abs()).expect("both endpoints inserted");
        }
    }
    graph
}

/// The cluster holding the given node as core, if any.
pub fn cluster_with_core<'a, N, U, G>(
    clustering: &'a Clustering<N, U, G>,
    node: &N,
) -> Option<&'a Cluster<N>>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: Graph<N, U>,
{
    clustering
        .clusters()
        .iter()
        .find(|cluster| cluster.core_nodes().contains(node))
}

/// Asserts every quantified invariant of the clustering.
pub fn assert_invariants<N, U, G>(clustering: &Clustering<N, U, G>)
where
    N: Eq + Hash + Clone + Debug,
    U: Number,
    G: Graph<N, U>,
{
    let epsilon = clustering.cluster_distance();
    for cluster in clustering.clusters() {
        // Disjoint roles, non-empty core.
        assert!(
            cluster.core_nodes().is_disjoint(cluster.border_nodes()),
            "core and border sets overlap"
        );
        assert!(!cluster.core_nodes().is_empty(), "cluster without cores");
        for core in cluster.core_nodes() {
            let reachable = clustering
                .graph()
                .neighbours(core, Some(epsilon))
                .expect("cores are graph nodes");
            // Core density.
            assert!(
                reachable.len() >= clustering.core_neighbours(),
                "core {core:?} has only {} neighbours",
                reachable.len()
            );
            // Every neighbour of a core shares its cluster; this subsumes
            // density-reachability closure for adjacent cores.
            for (neighbour, _) in &reachable {
                assert!(
                    cluster.contains(neighbour),
                    "neighbour {neighbour:?} of core {core:?} escaped the cluster"
                );
            }
        }
        // Border attachment.
        for border in cluster.border_nodes() {
            let reachable = clustering
                .graph()
                .neighbours(border, Some(epsilon))
                .expect("borders are graph nodes");
            assert!(
                reachable
                    .iter()
                    .any(|(neighbour, _)| cluster.core_nodes().contains(neighbour)),
                "border {border:?} has no core within reach"
            );
        }
    }
    // Unique core membership.
    let mut cores_seen: HashSet<&N> = HashSet::new();
    for cluster in clustering.clusters() {
        for core in cluster.core_nodes() {
            assert!(cores_seen.insert(core), "{core:?} is core in two clusters");
        }
    }
    // Partition coverage: every graph node is noise or clustered, never
    // both.
    for node in clustering.graph().iter_nodes() {
        let clustered = clustering.contains(node);
        let noise = clustering.noise().contains(node);
        assert!(
            clustered ^ noise,
            "{node:?} is in {} of noise and clusters",
            if clustered { "both" } else { "neither" }
        );
    }
    for node in clustering.noise() {
        assert!(
            clustering.graph().contains(node),
            "noise node {node:?} is not a graph node"
        );
    }
}
