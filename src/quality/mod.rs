//! Scores judging how well a clustering fits its graph.
//!
//! All scorers consume a snapshot of clusters together with the
//! metric-bearing graph they were built over; stored edges are preferred
//! and missing ones fall back to the metric. The scorers are pure reads
//! and leave the engine untouched.

mod calinski_harabasz;
mod davies_bouldin;
mod inter_intra;
mod silhouette;

pub use calinski_harabasz::calinski_harabasz_score;
pub use davies_bouldin::davies_bouldin_score;
pub use inter_intra::{between_cluster_variance, centroid_scatter, within_cluster_variance};
pub use silhouette::silhouette_score;

use std::hash::Hash;

use distances::Number;

use crate::core::graph::distance::MetricGraph;
use crate::core::graph::GraphError;
use crate::metric::Metric;

/// The distance between two nodes: the stored edge where one exists, the
/// metric otherwise.
pub(crate) fn node_distance<N, U, G>(graph: &G, a: &N, b: &N) -> Result<U, GraphError>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: MetricGraph<N, U>,
{
    match graph.edge(a, b) {
        Ok(weight) => Ok(weight),
        Err(GraphError::NoSuchEdge) => graph.metric().distance(a, b),
        Err(error) => Err(error),
    }
}
