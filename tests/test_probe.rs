//! Tests for the virtual-probe facet.

mod utils;

use float_cmp::approx_eq;
use ordered_float::OrderedFloat;

use graph_dbscan::{
    DeltaMetric, DistanceGraph, Graph, GraphError, IncrementalDeltaMetric, ProbeClustering,
};

fn of(value: f64) -> OrderedFloat<f64> {
    OrderedFloat(value)
}

fn probed(
    nodes: &[f64],
) -> ProbeClustering<OrderedFloat<f64>, f64, DistanceGraph<OrderedFloat<f64>, f64, IncrementalDeltaMetric>>
{
    utils::init_logging();
    let graph = DistanceGraph::new(nodes.iter().copied().map(of), IncrementalDeltaMetric);
    ProbeClustering::new(graph, 5.0, 5).unwrap()
}

#[test]
fn probes_measure_against_the_cluster_mean() {
    let mut probes = probed(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    assert_eq!(probes.clustering().clusters().len(), 1);

    let measurements = probes.probe(&of(1.0)).unwrap();
    assert_eq!(measurements.len(), 1);
    // The cluster mean is 3.5.
    assert!(approx_eq!(f64, measurements[0].1, 2.5));
}

#[test]
fn structural_edits_invalidate_cached_means() {
    let mut probes = probed(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let before = probes.probe(&of(1.0)).unwrap();
    assert!(approx_eq!(f64, before[0].1, 2.5));

    probes.insert_node(of(7.0)).unwrap();
    // The mean moved to 4.0 and the cache was dropped with the edit.
    let after = probes.probe(&of(1.0)).unwrap();
    assert!(approx_eq!(f64, after[0].1, 3.0));
}

#[test]
fn incremental_updates_match_fresh_probes() {
    let mut probes = probed(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let start = probes.probe(&of(1.0)).unwrap()[0].1;
    assert!(approx_eq!(f64, start, 2.5));
    for drift in 1..4 {
        let drift = drift as f64;
        let fresh = probes.probe(&of(1.0 + drift)).unwrap()[0].1;
        let updated = probes.update_probe(&of(1.0), &[of(drift)]).unwrap()[0].1;
        assert!(approx_eq!(f64, updated, fresh));
    }
}

#[test]
fn update_probe_falls_back_to_a_fresh_distance() {
    let mut probes = probed(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    // Never probed before: there is no cached distance to update from.
    let measurements = probes.update_probe(&of(2.0), &[]).unwrap();
    assert!(approx_eq!(f64, measurements[0].1, 1.5));
}

#[test]
fn persisting_admits_the_virtual_node() {
    let mut probes = probed(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let distance = probes.probe(&of(7.0)).unwrap()[0].1;
    assert!(approx_eq!(f64, distance, 3.5));

    probes.persist(of(7.0)).unwrap();
    assert!(probes.clustering().graph().contains(&of(7.0)));
    assert!(probes.clustering().contains(&of(7.0)));
    // The persisted node shifted the mean to 4.0.
    let after = probes.probe(&of(1.0)).unwrap();
    assert!(approx_eq!(f64, after[0].1, 3.0));
}

#[test]
fn probing_without_mean_support_fails() {
    utils::init_logging();
    let graph: DistanceGraph<i64, i64, DeltaMetric> = utils::delta_graph(&[1, 2, 3, 4, 5, 6]);
    let mut probes = ProbeClustering::new(graph, 5, 5).unwrap();
    assert_eq!(probes.probe(&1), Err(GraphError::NoDistanceSupport));
}
