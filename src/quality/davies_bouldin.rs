//! The Davies-Bouldin score.

use std::hash::Hash;

use distances::Number;

use crate::core::cluster::Cluster;
use crate::core::graph::distance::MetricGraph;
use crate::core::graph::GraphError;
use crate::metric::Metric;

use super::inter_intra::centroid_scatter;

/// Averages, over all clusters, the worst ratio of combined scatter to
/// centroid separation against any other cluster.
///
/// Small values correspond to dense, well separated clusters. A pair of
/// clusters with coinciding centroids contributes an infinite ratio.
///
/// Err:
///
/// * `InvalidArgument` unless at least two clusters are given.
/// * `NoDistanceSupport` if the metric has no notion of a mean.
pub fn davies_bouldin_score<N, U, G>(clusters: &[Cluster<N>], graph: &G) -> Result<f64, GraphError>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: MetricGraph<N, U>,
{
    if clusters.len() < 2 {
        return Err(GraphError::InvalidArgument(
            "the Davies-Bouldin score requires at least two clusters".to_string(),
        ));
    }
    let mut centroids = Vec::with_capacity(clusters.len());
    let mut scatters = Vec::with_capacity(clusters.len());
    for cluster in clusters {
        let members: Vec<N> = cluster.iter().cloned().collect();
        let centroid = graph.metric().mean(&members)?;
        scatters.push(centroid_scatter(cluster, graph, Some(&centroid))?);
        centroids.push(centroid);
    }
    let mut total = 0.0;
    for (first, first_scatter) in scatters.iter().enumerate() {
        let mut worst: f64 = 0.0;
        for (second, second_scatter) in scatters.iter().enumerate() {
            if first == second {
                continue;
            }
            let separation = graph
                .metric()
                .distance(&centroids[first], &centroids[second])?
                .as_f64();
            let ratio = if separation == 0.0 {
                f64::INFINITY
            } else {
                (first_scatter + second_scatter) / separation
            };
            worst = worst.max(ratio);
        }
        total += worst;
    }
    Ok(total / clusters.len() as f64)
}
