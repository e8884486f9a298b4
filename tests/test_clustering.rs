//! Scenario and law tests for the incremental clustering engine.

mod utils;

use std::collections::{BTreeSet, HashMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use test_case::test_case;

use graph_dbscan::{
    AdjacencyGraph, BoundedAdjacencyGraph, CachedDistanceGraph, Clustering, DeltaMetric, Graph,
    GraphError,
};

/// The core sets of all clusters, in a comparable order.
fn core_sets<G: Graph<i64, i64>>(clustering: &Clustering<i64, i64, G>) -> Vec<BTreeSet<i64>> {
    let mut sets: Vec<BTreeSet<i64>> = clustering
        .clusters()
        .iter()
        .map(|cluster| cluster.core_nodes().iter().copied().collect())
        .collect();
    sets.sort();
    sets
}

#[test]
fn separates_dense_nodes_from_noise() {
    let clustering = utils::delta_clustering(&[1, 2, 3, 4, 5, 6, 20], 5, 5);
    utils::assert_invariants(&clustering);
    assert_eq!(clustering.clusters().len(), 1);
    let cluster = &clustering.clusters()[0];
    assert_eq!(
        cluster.core_nodes().iter().copied().collect::<BTreeSet<_>>(),
        (1..=6).collect()
    );
    assert!(cluster.border_nodes().is_empty());
    assert_eq!(
        clustering.noise().iter().copied().collect::<BTreeSet<_>>(),
        BTreeSet::from([20])
    );
}

#[test]
fn separated_groups_form_disjoint_clusters() {
    let clustering =
        utils::delta_clustering(&[1, 2, 3, 4, 5, 6, 13, 14, 15, 16, 17, 18], 5, 5);
    utils::assert_invariants(&clustering);
    assert_eq!(
        core_sets(&clustering),
        vec![(1..=6).collect(), (13..=18).collect()]
    );
    for cluster in clustering.clusters() {
        assert!(cluster.border_nodes().is_empty());
    }
    assert!(clustering.noise().is_empty());
}

#[test]
fn clusters_overlap_on_border_nodes() {
    let clustering =
        utils::delta_clustering(&[1, 2, 3, 4, 5, 6, 9, 14, 15, 16, 17, 18, 19, 20], 5, 5);
    utils::assert_invariants(&clustering);
    assert_eq!(
        core_sets(&clustering),
        vec![(1..=6).collect(), (14..=20).collect()]
    );
    for cluster in clustering.clusters() {
        assert!(cluster.border_nodes().contains(&9));
    }
    assert!(clustering.noise().is_empty());
    assert!(clustering.contains(&9));
    // The engine length sums cluster sizes, counting the shared border
    // once per cluster: 7 + 8 over 14 graph nodes.
    assert_eq!(clustering.len(), 15);
}

#[test]
fn removing_a_bridge_node_splits_the_cluster() {
    let mut clustering =
        utils::delta_clustering(&[1, 2, 3, 4, 5, 6, 12, 13, 14, 15, 16, 17, 7], 5, 5);
    assert_eq!(clustering.clusters().len(), 1);
    assert_eq!(clustering.clusters()[0].len(), 13);

    clustering.delete_node(&7).unwrap();
    utils::assert_invariants(&clustering);
    assert_eq!(
        core_sets(&clustering),
        vec![(1..=6).collect(), (12..=17).collect()]
    );
    assert!(clustering.noise().is_empty());
}

#[test]
fn deleting_noise_matches_fresh_clustering() {
    let mut edited = utils::delta_clustering(&[1, 2, 3, 4, 5, 6, 30, 31], 5, 5);
    assert_eq!(
        edited.noise().iter().copied().collect::<BTreeSet<_>>(),
        BTreeSet::from([30, 31])
    );
    edited.delete_node(&30).unwrap();
    edited.delete_node(&31).unwrap();
    utils::assert_invariants(&edited);

    let fresh = utils::delta_clustering(&[1, 2, 3, 4, 5, 6], 5, 5);
    assert_eq!(edited, fresh);
    assert!(edited.noise().is_empty());
}

#[test_case(&[1, 2], 1, 1, 1, 0 ; "a mutually reachable pair clusters at eta one")]
#[test_case(&[1, 2, 50], 1, 1, 1, 1 ; "a degree zero node stays noise at eta one")]
#[test_case(&[0, 100, 200], 5, 2, 0, 3 ; "all distances beyond epsilon leave only noise")]
#[test_case(&[10], 5, 5, 0, 1 ; "a single node is noise")]
fn boundary_partitions(
    nodes: &[i64],
    cluster_distance: i64,
    core_neighbours: usize,
    clusters: usize,
    noise: usize,
) {
    let clustering = utils::delta_clustering(nodes, cluster_distance, core_neighbours);
    utils::assert_invariants(&clustering);
    assert_eq!(clustering.clusters().len(), clusters);
    assert_eq!(clustering.noise().len(), noise);
}

#[test]
fn a_clique_is_one_all_core_cluster() {
    utils::init_logging();
    let mut graph = AdjacencyGraph::new();
    for node in 0..6_i64 {
        graph.insert_node(node);
    }
    for a in 0..6_i64 {
        for b in a + 1..6 {
            graph.set_edge(a, b, 1).unwrap();
        }
    }
    let clustering = Clustering::new(graph, 5, 5).unwrap();
    utils::assert_invariants(&clustering);
    assert_eq!(clustering.clusters().len(), 1);
    assert_eq!(clustering.clusters()[0].core_nodes().len(), 6);
    assert!(clustering.clusters()[0].border_nodes().is_empty());
}

#[test]
fn an_empty_graph_clusters_to_nothing() {
    utils::init_logging();
    let clustering = Clustering::new(AdjacencyGraph::<i64, i64>::new(), 5, 5).unwrap();
    assert!(clustering.is_empty());
    assert!(clustering.noise().is_empty());
    assert_eq!(clustering.len(), 0);
}

#[test]
fn batch_equals_incremental() {
    utils::init_logging();
    let nodes = [1, 2, 3, 4, 5, 6, 9, 14, 15, 16, 17, 18, 19, 20];
    let batch = Clustering::new(utils::delta_adjacency(&nodes), 5, 5).unwrap();

    let mut incremental = Clustering::new(AdjacencyGraph::<i64, i64>::new(), 5, 5).unwrap();
    for &node in &nodes {
        incremental.insert_node(node).unwrap();
    }
    for (index, &a) in nodes.iter().enumerate() {
        for &b in &nodes[index + 1..] {
            incremental.set_edge(a, b, (a - b).abs()).unwrap();
            utils::assert_invariants(&incremental);
        }
    }
    assert_eq!(incremental, batch);
}

#[test]
fn batch_equals_incremental_on_random_graphs() {
    utils::init_logging();
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..5 {
        let mut unique = HashSet::new();
        while unique.len() < 24 {
            unique.insert(rng.gen_range(0..60_i64));
        }
        let nodes: Vec<i64> = unique.into_iter().collect();

        let batch = Clustering::new(utils::delta_adjacency(&nodes), 4, 3).unwrap();
        let mut incremental = Clustering::new(AdjacencyGraph::<i64, i64>::new(), 4, 3).unwrap();
        for &node in &nodes {
            incremental.insert_node(node).unwrap();
        }
        for (index, &a) in nodes.iter().enumerate() {
            for &b in &nodes[index + 1..] {
                incremental.set_edge(a, b, (a - b).abs()).unwrap();
            }
        }
        utils::assert_invariants(&incremental);
        assert_eq!(incremental, batch);
    }
}

#[test]
fn partition_is_independent_of_edit_order() {
    utils::init_logging();
    let nodes = [1, 2, 3, 4, 5, 6, 9, 14, 15, 16, 17, 18, 19, 20];
    let mut edges: Vec<(i64, i64)> = Vec::new();
    for (index, &a) in nodes.iter().enumerate() {
        for &b in &nodes[index + 1..] {
            edges.push((a, b));
        }
    }

    let build = |edges: &[(i64, i64)]| {
        let mut clustering = Clustering::new(AdjacencyGraph::<i64, i64>::new(), 5, 5).unwrap();
        for &node in &nodes {
            clustering.insert_node(node).unwrap();
        }
        for &(a, b) in edges {
            clustering.set_edge(a, b, (a - b).abs()).unwrap();
        }
        clustering
    };

    let reference = build(&edges);
    for seed in 0..3_u64 {
        let mut shuffled = edges.clone();
        shuffled.shuffle(&mut StdRng::seed_from_u64(seed));
        let permuted = build(&shuffled);
        utils::assert_invariants(&permuted);
        assert_eq!(permuted, reference);
    }
}

#[test]
fn insert_then_delete_node_restores_the_partition() {
    utils::init_logging();
    let nodes = [1, 2, 3, 4, 5, 6, 12, 13, 14, 15, 16, 17];
    let mut clustering = Clustering::new(utils::delta_adjacency(&nodes), 5, 5).unwrap();
    let before = clustering.clone();
    assert_eq!(clustering.clusters().len(), 2);

    let adjacency: HashMap<i64, i64> = nodes.iter().map(|&node| (node, (7 - node).abs())).collect();
    clustering.insert_node_with_adjacency(7, adjacency).unwrap();
    utils::assert_invariants(&clustering);
    // The new node bridges the two groups into one cluster.
    assert_eq!(clustering.clusters().len(), 1);
    assert_ne!(clustering, before);

    clustering.delete_node(&7).unwrap();
    utils::assert_invariants(&clustering);
    assert_eq!(clustering, before);
}

#[test]
fn set_then_delete_edge_restores_the_partition() {
    utils::init_logging();
    let nodes = [1, 2, 3, 4, 5, 6, 13, 14, 15, 16, 17, 18];
    let mut clustering = Clustering::new(utils::delta_adjacency(&nodes), 5, 5).unwrap();
    let before = clustering.clone();
    assert_eq!(clustering.clusters().len(), 2);

    clustering.set_edge(6, 13, 2).unwrap();
    utils::assert_invariants(&clustering);
    assert_eq!(clustering.clusters().len(), 1);

    clustering.delete_edge(&6, &13).unwrap();
    utils::assert_invariants(&clustering);
    assert_eq!(clustering, before);
}

#[test]
fn random_deletions_match_batch_reclustering() {
    utils::init_logging();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..3 {
        let mut unique = HashSet::new();
        while unique.len() < 20 {
            unique.insert(rng.gen_range(0..50_i64));
        }
        let nodes: Vec<i64> = unique.into_iter().collect();
        let mut clustering = Clustering::new(utils::delta_adjacency(&nodes), 4, 3).unwrap();

        let mut remaining = nodes;
        for _ in 0..10 {
            let index = rng.gen_range(0..remaining.len());
            let node = remaining.swap_remove(index);
            clustering.delete_node(&node).unwrap();
            utils::assert_invariants(&clustering);
            let batch = Clustering::new(utils::delta_adjacency(&remaining), 4, 3).unwrap();
            assert_eq!(clustering, batch);
        }
    }
}

#[test]
fn raising_a_weight_beyond_epsilon_splits() {
    utils::init_logging();
    let nodes = [1, 2, 3, 4, 5, 6, 13, 14, 15, 16, 17, 18];
    let mut clustering = Clustering::new(utils::delta_adjacency(&nodes), 5, 5).unwrap();
    let before = clustering.clone();

    clustering.set_edge(6, 13, 2).unwrap();
    assert_eq!(clustering.clusters().len(), 1);

    // Mutating the weight back across the threshold severs the bridge.
    clustering.set_edge(6, 13, 9).unwrap();
    utils::assert_invariants(&clustering);
    assert_eq!(clustering, before);
}

#[test]
fn noise_becomes_border_then_core_and_degrades_back() {
    utils::init_logging();
    let nodes = [1, 2, 3, 4, 5, 6, 20];
    let mut clustering = Clustering::new(utils::delta_adjacency(&nodes), 5, 5).unwrap();
    assert!(clustering.noise().contains(&20));

    // A single connection to a core makes the node a border.
    clustering.set_edge(6, 20, 4).unwrap();
    utils::assert_invariants(&clustering);
    assert!(clustering.clusters()[0].border_nodes().contains(&20));
    assert!(!clustering.noise().contains(&20));

    // More in-range neighbours, but still below the density threshold.
    for (peer, weight) in [(2, 1), (3, 2), (4, 2)] {
        clustering.set_edge(20, peer, weight).unwrap();
        assert!(utils::cluster_with_core(&clustering, &20).is_none());
    }

    // The fifth neighbour promotes the border to core.
    clustering.set_edge(20, 5, 1).unwrap();
    utils::assert_invariants(&clustering);
    assert!(utils::cluster_with_core(&clustering, &20).is_some());
    assert_eq!(clustering.clusters().len(), 1);

    // Severing connections degrades the core back to border, then noise.
    clustering.delete_edge(&20, &5).unwrap();
    utils::assert_invariants(&clustering);
    assert!(clustering.clusters()[0].border_nodes().contains(&20));
    for peer in [2, 3, 4, 6] {
        clustering.delete_edge(&20, &peer).unwrap();
    }
    utils::assert_invariants(&clustering);
    assert!(clustering.noise().contains(&20));
}

#[test]
fn weight_changes_within_a_class_do_not_reclassify() {
    utils::init_logging();
    let nodes = [1, 2, 3, 4, 5, 6, 20];
    let mut clustering = Clustering::new(utils::delta_adjacency(&nodes), 5, 5).unwrap();
    let before = clustering.clone();
    // Both weights stay beyond the clustering distance.
    clustering.set_edge(6, 20, 10).unwrap();
    assert_eq!(clustering, before);
    // Both weights stay within it.
    clustering.set_edge(1, 2, 3).unwrap();
    assert_eq!(clustering, before);
}

#[test]
fn engine_edge_reads_are_gated_by_membership() {
    utils::init_logging();
    let clustering = Clustering::new(utils::delta_adjacency(&[1, 2, 3, 4, 5, 6, 20]), 5, 5).unwrap();
    assert!(clustering.contains(&1));
    assert!(!clustering.contains(&20));
    assert!(clustering.contains_edge(&1, &2));
    assert!(!clustering.contains_edge(&1, &20));
    assert_eq!(clustering.edge(&1, &2), Ok(1));
    assert_eq!(clustering.edge(&1, &20), Err(GraphError::NoSuchEdge));
}

#[test]
fn cached_substrates_support_edge_deletion() {
    utils::init_logging();
    let graph = CachedDistanceGraph::new([1_i64, 2, 3, 4, 5, 6], DeltaMetric);
    let mut clustering = Clustering::new(graph, 5, 5).unwrap();
    assert_eq!(clustering.clusters().len(), 1);

    // Both endpoints drop to four in-range neighbours and degrade.
    clustering.delete_edge(&1, &6).unwrap();
    utils::assert_invariants(&clustering);
    let cluster = &clustering.clusters()[0];
    assert!(cluster.border_nodes().contains(&1));
    assert!(cluster.border_nodes().contains(&6));
    assert_eq!(
        cluster.core_nodes().iter().copied().collect::<BTreeSet<_>>(),
        (2..=5).collect()
    );
}

#[test]
fn bounded_substrates_cluster_like_full_ones() {
    utils::init_logging();
    let nodes: [i64; 7] = [1, 2, 3, 4, 5, 6, 20];
    let mut graph = BoundedAdjacencyGraph::new(5);
    for &node in &nodes {
        graph.insert_node(node);
    }
    for (index, &a) in nodes.iter().enumerate() {
        for &b in &nodes[index + 1..] {
            graph.set_edge(a, b, (a - b).abs()).unwrap();
        }
    }
    let mut clustering = Clustering::new(graph, 5, 5).unwrap();
    let before = clustering.clone();
    assert_eq!(clustering.clusters().len(), 1);
    assert!(clustering.noise().contains(&20));

    // A write above the bound is dropped and changes nothing.
    clustering.set_edge(6, 20, 9).unwrap();
    assert_eq!(clustering, before);

    // Within the bound it lands and attaches the node.
    clustering.set_edge(6, 20, 4).unwrap();
    utils::assert_invariants(&clustering);
    assert!(clustering.clusters()[0].border_nodes().contains(&20));
}

#[test]
fn inserting_a_present_node_changes_nothing() {
    let mut clustering = utils::delta_clustering(&[1, 2, 3, 4, 5, 6], 5, 5);
    let before = clustering.clone();
    clustering.insert_node(3).unwrap();
    assert_eq!(clustering, before);
}

#[test]
fn deleting_an_absent_node_fails() {
    let mut clustering = utils::delta_clustering(&[1, 2, 3], 5, 5);
    assert_eq!(clustering.delete_node(&9), Err(GraphError::NoSuchNode));
}

#[test]
fn engines_with_different_parameters_are_not_equal() {
    let nodes = [1, 2, 3, 4, 5, 6];
    assert_ne!(
        utils::delta_clustering(&nodes, 5, 5),
        utils::delta_clustering(&nodes, 5, 4)
    );
    assert_ne!(
        utils::delta_clustering(&nodes, 5, 5),
        utils::delta_clustering(&nodes, 4, 5)
    );
    assert_eq!(
        utils::delta_clustering(&nodes, 5, 5),
        utils::delta_clustering(&nodes, 5, 5)
    );
}
