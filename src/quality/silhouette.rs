//! The silhouette score.

use std::hash::Hash;

use distances::Number;
use rayon::prelude::*;

use crate::core::cluster::Cluster;
use crate::core::graph::distance::MetricGraph;
use crate::core::graph::GraphError;

use super::node_distance;

/// Measures how similar members are to their own cluster compared to the
/// nearest other cluster.
///
/// Every member contributes `(b - a) / max(a, b)`, where `a` is its mean
/// distance within its cluster and `b` the smallest mean distance to any
/// cluster it does not belong to; the result averages the contributions
/// over the total cluster population. Scores range from -1 (poor) to 1
/// (well matched); a lone cluster scores -1 since nothing separates it.
///
/// Err:
///
/// * `InvalidArgument` if no clusters are given.
pub fn silhouette_score<N, U, G>(clusters: &[Cluster<N>], graph: &G) -> Result<f64, GraphError>
where
    N: Eq + Hash + Clone + Sync,
    U: Number,
    G: MetricGraph<N, U> + Sync,
{
    if clusters.is_empty() {
        return Err(GraphError::InvalidArgument(
            "the silhouette score requires at least one cluster".to_string(),
        ));
    }
    let contributions = clusters
        .par_iter()
        .map(|cluster| -> Result<f64, GraphError> {
            let mut contribution = 0.0;
            for member in cluster.iter() {
                let own = mean_distance_within(member, cluster, graph)?;
                let mut nearest = f64::INFINITY;
                for other in clusters {
                    if !other.contains(member) {
                        nearest = nearest.min(mean_distance_to(member, other, graph)?);
                    }
                }
                // With no foreign cluster to compare against, separation
                // degenerates to zero.
                let foreign = if nearest.is_finite() { nearest } else { 0.0 };
                let maximum = own.max(foreign);
                let maximum = if maximum == 0.0 { 1e-10 } else { maximum };
                contribution += (foreign - own) / maximum;
            }
            Ok(contribution)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let population: usize = clusters.iter().map(Cluster::len).sum();
    Ok(contributions.into_iter().sum::<f64>() / population as f64)
}

/// The mean distance from a member to the other members of its cluster.
///
/// Err:
///
/// * `NoSuchNode` if the sample is not a member of the cluster.
fn mean_distance_within<N, U, G>(
    sample: &N,
    cluster: &Cluster<N>,
    graph: &G,
) -> Result<f64, GraphError>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: MetricGraph<N, U>,
{
    if !cluster.contains(sample) {
        return Err(GraphError::NoSuchNode);
    }
    let mut distances = Vec::with_capacity(cluster.len().saturating_sub(1));
    for member in cluster.iter() {
        if member == sample {
            continue;
        }
        distances.push(node_distance(graph, member, sample)?.as_f64());
    }
    if distances.is_empty() {
        return Ok(0.0);
    }
    Ok(statistical::mean(&distances))
}

/// The mean distance from a sample to the members of a cluster it does not
/// belong to.
fn mean_distance_to<N, U, G>(
    sample: &N,
    cluster: &Cluster<N>,
    graph: &G,
) -> Result<f64, GraphError>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: MetricGraph<N, U>,
{
    let mut distances = Vec::with_capacity(cluster.len());
    for member in cluster.iter() {
        distances.push(node_distance(graph, member, sample)?.as_f64());
    }
    if distances.is_empty() {
        return Ok(0.0);
    }
    Ok(statistical::mean(&distances))
}
