//! Centroid-based scatter and variance measures.

use std::hash::Hash;

use distances::Number;

use crate::core::cluster::Cluster;
use crate::core::graph::distance::MetricGraph;
use crate::core::graph::GraphError;
use crate::metric::Metric;

/// The mean distance of a cluster's members to the cluster centroid.
///
/// A precomputed centroid may be supplied to avoid recomputation; `None`
/// derives it from the graph's metric.
///
/// Err:
///
/// * `InvalidArgument` if the cluster is empty.
/// * `NoDistanceSupport` if the metric has no notion of a mean.
pub fn centroid_scatter<N, U, G>(
    cluster: &Cluster<N>,
    graph: &G,
    centroid: Option<&N>,
) -> Result<f64, GraphError>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: MetricGraph<N, U>,
{
    if cluster.is_empty() {
        return Err(GraphError::InvalidArgument(
            "scatter of an empty cluster".to_string(),
        ));
    }
    let members: Vec<N> = cluster.iter().cloned().collect();
    let centroid = match centroid {
        Some(centroid) => centroid.clone(),
        None => graph.metric().mean(&members)?,
    };
    let distances = members
        .iter()
        .map(|member| {
            graph
                .metric()
                .distance(&centroid, member)
                .map(Number::as_f64)
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(statistical::mean(&distances))
}

/// The between-cluster sum of squares: for every cluster, the squared
/// distance of its centroid to the overall centroid, weighted by cluster
/// size.
pub fn between_cluster_variance<N, U, G>(
    clusters: &[Cluster<N>],
    graph: &G,
) -> Result<f64, GraphError>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: MetricGraph<N, U>,
{
    let population: Vec<N> = clusters
        .iter()
        .flat_map(|cluster| cluster.iter().cloned())
        .collect();
    let overall = graph.metric().mean(&population)?;
    let mut variance = 0.0;
    for cluster in clusters {
        let members: Vec<N> = cluster.iter().cloned().collect();
        let centroid = graph.metric().mean(&members)?;
        let distance = graph.metric().distance(&centroid, &overall)?.as_f64();
        variance += cluster.len() as f64 * distance.powi(2);
    }
    Ok(variance)
}

/// The within-cluster sum of squares: for every cluster, the summed
/// squared distances of its members to the cluster centroid.
///
/// An empty clustering has infinite within-cluster variance.
pub fn within_cluster_variance<N, U, G>(
    clusters: &[Cluster<N>],
    graph: &G,
) -> Result<f64, GraphError>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: MetricGraph<N, U>,
{
    if clusters.is_empty() {
        return Ok(f64::INFINITY);
    }
    let mut variance = 0.0;
    for cluster in clusters {
        let members: Vec<N> = cluster.iter().cloned().collect();
        let centroid = graph.metric().mean(&members)?;
        for member in &members {
            let distance = graph.metric().distance(&centroid, member)?.as_f64();
            variance += distance.powi(2);
        }
    }
    Ok(variance)
}
