//! Measuring transient nodes against current clusters.

use std::collections::HashMap;
use std::hash::Hash;

use distances::Number;

use crate::metric::Metric;

use super::cluster::ClusterId;
use super::clustering::Clustering;
use super::graph::distance::MetricGraph;
use super::graph::GraphError;

/// Cached measurements of one virtual node against the clusters.
#[derive(Debug, Clone)]
struct ProbeState<N, U> {
    means: HashMap<ClusterId, N>,
    distances: HashMap<ClusterId, U>,
}

impl<N, U> ProbeState<N, U> {
    fn new() -> Self {
        Self {
            means: HashMap::new(),
            distances: HashMap::new(),
        }
    }
}

/// A clustering that can measure *virtual* nodes against its clusters.
///
/// Virtual nodes are external points that are never added to the graph;
/// they are expected to be dynamic objects that either converge towards an
/// existing cluster or diverge into noise. A probe computes the distance
/// from the virtual node to the mean of every current cluster; once the
/// object has settled, [`persist`](Self::persist) admits it as a real node.
///
/// Cluster means and probe distances are cached per virtual node and
/// invalidated by every structural edit made through this facade, so a
/// probe after an edit observes the updated clusters.
///
/// The substrate must expose a metric supporting `mean` (and `update` for
/// [`update_probe`](Self::update_probe)); a metric without that support
/// surfaces [`GraphError::NoDistanceSupport`] at the first probe.
#[derive(Debug, Clone)]
pub struct ProbeClustering<N: Eq + Hash, U, G> {
    clustering: Clustering<N, U, G>,
    probes: HashMap<N, ProbeState<N, U>>,
}

impl<N, U, G> ProbeClustering<N, U, G>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: MetricGraph<N, U>,
{
    /// Takes ownership of the graph and performs the initial clustering.
    pub fn new(graph: G, cluster_distance: U, core_neighbours: usize) -> Result<Self, GraphError> {
        Ok(Self {
            clustering: Clustering::new(graph, cluster_distance, core_neighbours)?,
            probes: HashMap::new(),
        })
    }

    /// The wrapped clustering.
    pub const fn clustering(&self) -> &Clustering<N, U, G> {
        &self.clustering
    }

    /// Measures the virtual node against every current cluster, yielding
    /// the cluster ids with the distance to their means.
    ///
    /// Means are computed lazily per cluster and cached for the virtual
    /// node until the next structural edit.
    pub fn probe(&mut self, virtual_node: &N) -> Result<Vec<(ClusterId, U)>, GraphError> {
        let snapshots: Vec<(ClusterId, Vec<N>)> = self
            .clustering
            .clusters()
            .iter()
            .map(|cluster| (cluster.id(), cluster.iter().cloned().collect()))
            .collect();
        let state = self
            .probes
            .entry(virtual_node.clone())
            .or_insert_with(ProbeState::new);
        let metric = self.clustering.graph().metric();
        let mut measurements = Vec::with_capacity(snapshots.len());
        for (id, members) in snapshots {
            let mean = match state.means.get(&id) {
                Some(mean) => mean.clone(),
                None => {
                    let mean = metric.mean(&members)?;
                    state.means.insert(id, mean.clone());
                    mean
                }
            };
            let distance = metric.distance(&mean, virtual_node)?;
            state.distances.insert(id, distance);
            measurements.push((id, distance));
        }
        Ok(measurements)
    }

    /// Refreshes the measurements of a virtual node that has drifted by the
    /// given changes, using the metric's incremental update where a prior
    /// probe distance is cached and a fresh distance otherwise.
    pub fn update_probe(
        &mut self,
        virtual_node: &N,
        changes: &[N],
    ) -> Result<Vec<(ClusterId, U)>, GraphError> {
        let snapshots: Vec<(ClusterId, Vec<N>)> = self
            .clustering
            .clusters()
            .iter()
            .map(|cluster| (cluster.id(), cluster.iter().cloned().collect()))
            .collect();
        let state = self
            .probes
            .entry(virtual_node.clone())
            .or_insert_with(ProbeState::new);
        let metric = self.clustering.graph().metric();
        let mut measurements = Vec::with_capacity(snapshots.len());
        for (id, members) in snapshots {
            let mean = match state.means.get(&id) {
                Some(mean) => mean.clone(),
                None => {
                    let mean = metric.mean(&members)?;
                    state.means.insert(id, mean.clone());
                    mean
                }
            };
            let distance = match state.distances.get(&id) {
                Some(&base) => metric.update(&mean, virtual_node, changes, base)?,
                None => metric.distance(&mean, virtual_node)?,
            };
            state.distances.insert(id, distance);
            measurements.push((id, distance));
        }
        Ok(measurements)
    }

    /// Forgets the virtual state of the node and admits it to the graph as
    /// a real node, reclassifying its neighbourhood.
    pub fn persist(&mut self, virtual_node: N) -> Result<(), GraphError> {
        self.probes.remove(&virtual_node);
        self.insert_node(virtual_node)
    }

    /// Adds a node with empty adjacency; see [`Clustering::insert_node`].
    pub fn insert_node(&mut self, node: N) -> Result<(), GraphError> {
        let result = self.clustering.insert_node(node);
        self.invalidate();
        result
    }

    /// Adds a node with its edges; see
    /// [`Clustering::insert_node_with_adjacency`].
    pub fn insert_node_with_adjacency(
        &mut self,
        node: N,
        adjacency: HashMap<N, U>,
    ) -> Result<(), GraphError> {
        let result = self.clustering.insert_node_with_adjacency(node, adjacency);
        self.invalidate();
        result
    }

    /// Stores or updates an edge; see [`Clustering::set_edge`].
    pub fn set_edge(&mut self, a: N, b: N, weight: U) -> Result<(), GraphError> {
        let result = self.clustering.set_edge(a, b, weight);
        self.invalidate();
        result
    }

    /// Removes an edge; see [`Clustering::delete_edge`].
    pub fn delete_edge(&mut self, a: &N, b: &N) -> Result<(), GraphError> {
        let result = self.clustering.delete_edge(a, b);
        self.invalidate();
        result
    }

    /// Removes a node; see [`Clustering::delete_node`].
    pub fn delete_node(&mut self, node: &N) -> Result<(), GraphError> {
        let result = self.clustering.delete_node(node);
        self.invalidate();
        result
    }

    /// Drops every cached mean and probe distance. Even a failed edit may
    /// have reshaped the clusters, so the caches are cleared regardless of
    /// the outcome.
    fn invalidate(&mut self) {
        self.probes.clear();
    }
}
