//! The Calinski-Harabasz score, also called the variance ratio criterion.

use std::hash::Hash;

use distances::Number;

use crate::core::cluster::Cluster;
use crate::core::graph::distance::MetricGraph;
use crate::core::graph::{Graph, GraphError};

use super::inter_intra::{between_cluster_variance, within_cluster_variance};

/// Relates cluster cohesion to separation: the ratio of between-cluster to
/// within-cluster variance, scaled by the node and cluster counts. Higher
/// is better; perfectly tight clusters score infinite.
///
/// Noise is accounted for through the graph's node count.
///
/// Err:
///
/// * `InvalidArgument` unless at least two clusters are given.
/// * `NoDistanceSupport` if the metric has no notion of a mean.
pub fn calinski_harabasz_score<N, U, G>(
    clusters: &[Cluster<N>],
    graph: &G,
) -> Result<f64, GraphError>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: MetricGraph<N, U>,
{
    if clusters.len() < 2 {
        return Err(GraphError::InvalidArgument(
            "the Calinski-Harabasz score requires at least two clusters".to_string(),
        ));
    }
    let between = between_cluster_variance(clusters, graph)?;
    let within = within_cluster_variance(clusters, graph)?;
    let ratio = if within == 0.0 {
        f64::INFINITY
    } else {
        between / within
    };
    let nodes = graph.len() as f64;
    let groups = clusters.len() as f64;
    Ok(ratio * ((nodes - groups) / (groups - 1.0)))
}
