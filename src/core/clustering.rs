//! The incremental density-based clustering engine.

use std::collections::{HashMap, HashSet, VecDeque};
use std::hash::Hash;

use distances::Number;
use mt_logger::{mt_log, Level};

use super::cluster::{Cluster, ClusterId, NodeRole};
use super::graph::{Graph, GraphError};

/// Density-based clustering of a weighted graph, allowing for overlap and
/// incremental updates.
///
/// The engine owns its substrate and maintains a dynamic collection of
/// clusters plus a residual noise set under live edits: inserting or
/// removing nodes, inserting or removing edges, and mutating edge weights.
/// Two clusters never share a core node; they may overlap on border nodes.
///
/// A node is *core* if it has at least `core_neighbours` neighbours within
/// `cluster_distance`, where a node's own self-edge never counts. Given the
/// same final graph, any sequence of edits yields the same partition as
/// clustering the final graph from scratch; intermediate states depend on
/// edit order.
///
/// ```
/// use graph_dbscan::{Clustering, DeltaMetric, DistanceGraph};
///
/// let graph = DistanceGraph::new(vec![1_i64, 2, 3, 4, 5, 6, 20], DeltaMetric);
/// let clustering = Clustering::new(graph, 5, 5).unwrap();
/// assert_eq!(clustering.clusters().len(), 1);
/// assert!(clustering.noise().contains(&20));
/// ```
#[derive(Debug, Clone)]
pub struct Clustering<N: Eq + Hash, U, G> {
    graph: G,
    cluster_distance: U,
    core_neighbours: usize,
    clusters: Vec<Cluster<N>>,
    noise: HashSet<N>,
}

impl<N, U, G> Clustering<N, U, G>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: Graph<N, U>,
{
    /// Takes ownership of the graph and performs the initial clustering.
    ///
    /// `cluster_distance` is the neighbourhood threshold ε and
    /// `core_neighbours` the minimum neighbour count η making a node core;
    /// both are fixed for the life of the engine.
    pub fn new(graph: G, cluster_distance: U, core_neighbours: usize) -> Result<Self, GraphError> {
        let noise: HashSet<N> = graph.iter_nodes().cloned().collect();
        let mut clustering = Self {
            graph,
            cluster_distance,
            core_neighbours,
            clusters: Vec::new(),
            noise,
        };
        clustering.initial_clustering()?;
        mt_log!(
            Level::Info,
            "initial clustering: {} clusters, {} noise nodes",
            clustering.clusters.len(),
            clustering.noise.len()
        );
        Ok(clustering)
    }

    /// The neighbourhood threshold ε.
    pub const fn cluster_distance(&self) -> U {
        self.cluster_distance
    }

    /// The minimum neighbour count η making a node core.
    pub const fn core_neighbours(&self) -> usize {
        self.core_neighbours
    }

    /// The underlying graph. Mutation goes through the engine only.
    pub const fn graph(&self) -> &G {
        &self.graph
    }

    /// The current clusters. After the initial clustering the list is
    /// sorted by ascending size to cheapen containment searches; edits do
    /// not maintain the order.
    pub fn clusters(&self) -> &[Cluster<N>] {
        &self.clusters
    }

    /// Returns the cluster with the given id, if it is still alive.
    pub fn cluster(&self, id: ClusterId) -> Option<&Cluster<N>> {
        self.clusters.iter().find(|cluster| cluster.id() == id)
    }

    /// The current noise set: every graph node belonging to no cluster.
    pub const fn noise(&self) -> &HashSet<N> {
        &self.noise
    }

    /// The summed size of all clusters. A border shared by several clusters
    /// is counted once per cluster holding it.
    pub fn len(&self) -> usize {
        self.clusters.iter().map(Cluster::len).sum()
    }

    /// Whether no cluster exists.
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Whether the node belongs to some cluster.
    pub fn contains(&self, node: &N) -> bool {
        self.clusters.iter().any(|cluster| cluster.contains(node))
    }

    /// Whether both endpoints belong to some cluster.
    pub fn contains_edge(&self, a: &N, b: &N) -> bool {
        self.contains(a) && self.contains(b)
    }

    /// Returns the substrate weight of the edge between two clustered
    /// nodes.
    ///
    /// Err:
    ///
    /// * `NoSuchEdge` unless both endpoints belong to some cluster and the
    ///   substrate defines the edge.
    pub fn edge(&self, a: &N, b: &N) -> Result<U, GraphError> {
        if !self.contains_edge(a, b) {
            return Err(GraphError::NoSuchEdge);
        }
        self.graph.edge(a, b)
    }

    /// Adds a node with empty adjacency and reclassifies its
    /// neighbourhood. Inserting a present node is a no-op.
    pub fn insert_node(&mut self, node: N) -> Result<(), GraphError> {
        if self.graph.contains(&node) {
            return Ok(());
        }
        self.graph.insert_node(node.clone());
        self.node_added(node)
    }

    /// Adds a node together with its edges in one step, then reclassifies
    /// its neighbourhood. Inserting a present node is a no-op.
    ///
    /// Err:
    ///
    /// * `NoSuchNode` if a neighbour in `adjacency` is not part of the
    ///   graph.
    pub fn insert_node_with_adjacency(
        &mut self,
        node: N,
        adjacency: HashMap<N, U>,
    ) -> Result<(), GraphError> {
        if self.graph.contains(&node) {
            return Ok(());
        }
        self.graph.set_adjacency(node.clone(), adjacency)?;
        self.node_added(node)
    }

    /// Stores or updates an edge and reclassifies the endpoints.
    ///
    /// Only transitions across the clustering distance matter: an edge
    /// newly within ε runs the edge-added reclassification, an edge pushed
    /// beyond ε runs the edge-removed one, and weight changes on the same
    /// side of ε change nothing.
    ///
    /// Err:
    ///
    /// * `NoSuchNode` if either endpoint is not part of the graph.
    pub fn set_edge(&mut self, a: N, b: N, weight: U) -> Result<(), GraphError> {
        let before = self.graph.edge(&a, &b).ok();
        self.graph.set_edge(a.clone(), b.clone(), weight)?;
        // Read back instead of trusting `weight`: bounded substrates drop
        // writes above their bound.
        let after = self.graph.edge(&a, &b).ok();
        let was_near = before.map_or(false, |weight| weight <= self.cluster_distance);
        let now_near = after.map_or(false, |weight| weight <= self.cluster_distance);
        match (was_near, now_near) {
            (false, true) => self.edge_added(&a, &b),
            (true, false) => self.edge_removed(&a, &b),
            _ => Ok(()),
        }
    }

    /// Removes an edge and reclassifies both endpoints.
    ///
    /// Err:
    ///
    /// * `NoSuchEdge` if no edge is defined for the pair.
    pub fn delete_edge(&mut self, a: &N, b: &N) -> Result<(), GraphError> {
        let weight = self.graph.delete_edge(a, b)?;
        if weight <= self.cluster_distance {
            self.edge_removed(a, b)?;
        }
        Ok(())
    }

    /// Removes a node, its incident edges, and its cluster memberships.
    ///
    /// Former neighbours are re-examined: cores may degrade, and every
    /// cluster that held the node is re-validated for density
    /// reachability, splitting into siblings where the node was the only
    /// connection.
    ///
    /// Err:
    ///
    /// * `NoSuchNode` if the node is not part of the graph.
    pub fn delete_node(&mut self, node: &N) -> Result<(), GraphError> {
        if self.noise.remove(node) {
            return self.graph.delete_node(node);
        }
        if !self.graph.contains(node) {
            return Err(GraphError::NoSuchNode);
        }
        let near: Vec<N> = self.neighbourhood(node)?;
        let mut dirty: Vec<ClusterId> = self
            .clusters
            .iter()
            .filter(|cluster| cluster.contains(node))
            .map(Cluster::id)
            .collect();
        self.graph.delete_node(node)?;
        for cluster in &mut self.clusters {
            cluster.discard(node);
        }
        // Cores adjacent to the node may have degraded; any such core is a
        // member of a cluster that held the node, so only those clusters
        // need re-validation.
        for neighbour in near {
            if let Some(position) = self.core_position(&neighbour) {
                if self.neighbourhood(&neighbour)?.len() < self.core_neighbours {
                    let id = self.clusters[position].id();
                    self.clusters[position].categorize(neighbour, NodeRole::Border);
                    mt_log!(Level::Debug, "core degraded to border in cluster {:?}", id);
                    dirty.push(id);
                }
            }
        }
        dirty.sort_unstable();
        dirty.dedup();
        for id in dirty {
            if self.position(id).is_some() {
                self.revalidate(id)?;
            }
        }
        Ok(())
    }

    /// Performs the one-off clustering of the graph the engine was built
    /// over: every node still unclaimed that has enough neighbours seeds a
    /// cluster, which is then expanded neighbour-to-neighbour.
    fn initial_clustering(&mut self) -> Result<(), GraphError> {
        let nodes: Vec<N> = self.graph.iter_nodes().cloned().collect();
        for node in nodes {
            // Core nodes claim their whole neighbourhood when discovered,
            // so anything still in noise is either a fresh core or left
            // for a later cluster to claim.
            if !self.noise.contains(&node) {
                continue;
            }
            let neighbours = self.neighbourhood(&node)?;
            if neighbours.len() < self.core_neighbours {
                continue;
            }
            let mut cluster = Cluster::new(self.graph.id());
            cluster.categorize(node.clone(), NodeRole::Core);
            self.noise.remove(&node);
            let mut visited: HashSet<N> = HashSet::new();
            visited.insert(node);
            let mut unchecked: VecDeque<N> = neighbours.into_iter().collect();
            while let Some(current) = unchecked.pop_front() {
                if !visited.insert(current.clone()) {
                    continue;
                }
                let reachable = self.neighbourhood(&current)?;
                if reachable.len() >= self.core_neighbours {
                    cluster.categorize(current.clone(), NodeRole::Core);
                    unchecked.extend(
                        reachable
                            .into_iter()
                            .filter(|neighbour| !visited.contains(neighbour)),
                    );
                } else {
                    cluster.categorize(current.clone(), NodeRole::Border);
                }
                self.noise.remove(&current);
            }
            self.clusters.push(cluster);
        }
        // Big clusters answer most containment checks; keeping the list
        // sorted lets short clusters fail fast first.
        self.clusters.sort_by_key(Cluster::len);
        Ok(())
    }

    /// The nodes within the clustering distance of the given node.
    fn neighbourhood(&self, node: &N) -> Result<Vec<N>, GraphError> {
        Ok(self
            .graph
            .neighbours(node, Some(self.cluster_distance))?
            .into_iter()
            .map(|(neighbour, _)| neighbour)
            .collect())
    }

    /// The position of a cluster in the list, by id.
    fn position(&self, id: ClusterId) -> Option<usize> {
        self.clusters.iter().position(|cluster| cluster.id() == id)
    }

    /// The position of the cluster holding the node as core, if any.
    fn core_position(&self, node: &N) -> Option<usize> {
        self.clusters
            .iter()
            .position(|cluster| cluster.core_nodes().contains(node))
    }

    /// Absorbs the `source` cluster into `target` and drops it from the
    /// list. Merging a cluster with itself is a no-op.
    fn merge_clusters(&mut self, target: ClusterId, source: ClusterId) -> Result<(), GraphError> {
        if target == source {
            return Ok(());
        }
        let source_position = self
            .position(source)
            .unwrap_or_else(|| unreachable!("merge sources are live clusters"));
        let absorbed = self.clusters.remove(source_position);
        let target_position = self
            .position(target)
            .unwrap_or_else(|| unreachable!("merge targets are live clusters"));
        self.clusters[target_position].merge_from(&absorbed)?;
        mt_log!(Level::Debug, "cluster {:?} absorbed into {:?}", source, target);
        Ok(())
    }

    /// Provisionally places a new node in noise and treats each of its
    /// in-range connections as a newly added edge.
    fn node_added(&mut self, node: N) -> Result<(), GraphError> {
        self.noise.insert(node.clone());
        for neighbour in self.neighbourhood(&node)? {
            self.edge_added(&node, &neighbour)?;
        }
        Ok(())
    }

    /// Reclassifies the endpoints of an edge that is newly within the
    /// clustering distance.
    fn edge_added(&mut self, a: &N, b: &N) -> Result<(), GraphError> {
        let endpoints = [(a.clone(), b.clone()), (b.clone(), a.clone())];
        for (endpoint, other) in endpoints {
            let reachable = self.neighbourhood(&endpoint)?;
            match self.core_position(&endpoint) {
                // The endpoint just reached the density threshold: it seeds
                // a cluster which claims its whole neighbourhood, merging
                // with every cluster another core of the neighbourhood
                // belongs to. Density reachability is transitive, so the
                // merges close the chain.
                None if reachable.len() >= self.core_neighbours => {
                    let mut cluster = Cluster::new(self.graph.id());
                    let id = cluster.id();
                    cluster.categorize(endpoint.clone(), NodeRole::Core);
                    self.clusters.push(cluster);
                    self.noise.remove(&endpoint);
                    mt_log!(Level::Debug, "cluster {:?} seeded", id);
                    for neighbour in &reachable {
                        if let Some(position) = self.core_position(neighbour) {
                            let source = self.clusters[position].id();
                            self.merge_clusters(id, source)?;
                        } else {
                            let position = self
                                .position(id)
                                .unwrap_or_else(|| unreachable!("the seeded cluster is live"));
                            self.clusters[position]
                                .categorize(neighbour.clone(), NodeRole::Border);
                            self.noise.remove(neighbour);
                        }
                    }
                }
                // The endpoint already anchors a cluster: the other
                // endpoint is now reachable from it and joins as border,
                // or merges its own cluster in if it is a core elsewhere.
                Some(position) => {
                    let target = self.clusters[position].id();
                    if let Some(other_position) = self.core_position(&other) {
                        let source = self.clusters[other_position].id();
                        self.merge_clusters(target, source)?;
                    } else {
                        let position = self
                            .position(target)
                            .unwrap_or_else(|| unreachable!("the target cluster is live"));
                        self.clusters[position].categorize(other.clone(), NodeRole::Border);
                        self.noise.remove(&other);
                    }
                }
                // Not core and not dense enough: if the other endpoint is a
                // core, its own pass claims this one.
                None => {}
            }
        }
        Ok(())
    }

    /// Reclassifies the endpoints of an edge that was within the clustering
    /// distance and no longer is.
    fn edge_removed(&mut self, a: &N, b: &N) -> Result<(), GraphError> {
        let mut dirty: Vec<ClusterId> = Vec::new();
        for endpoint in [a, b] {
            let reachable = self.neighbourhood(endpoint)?;
            if reachable.len() < self.core_neighbours {
                if let Some(position) = self.core_position(endpoint) {
                    let id = self.clusters[position].id();
                    self.clusters[position].categorize(endpoint.clone(), NodeRole::Border);
                    mt_log!(Level::Debug, "core degraded to border in cluster {:?}", id);
                    dirty.push(id);
                }
            }
        }
        // The severed edge may have been the only density connection of a
        // cluster both endpoints belong to.
        for cluster in &self.clusters {
            if cluster.contains(a) && cluster.contains(b) {
                dirty.push(cluster.id());
            }
        }
        dirty.sort_unstable();
        dirty.dedup();
        for id in dirty {
            if self.position(id).is_some() {
                self.revalidate(id)?;
            }
        }
        Ok(())
    }

    /// Re-establishes density reachability within a cluster after it lost
    /// a core or an in-range edge.
    ///
    /// The surviving cores are partitioned into ε-connected components,
    /// each becoming a cluster of its own; the former members reattach as
    /// borders to every component with a core in range. Members reached by
    /// no component fall to noise unless they are borders of an unrelated
    /// cluster.
    fn revalidate(&mut self, id: ClusterId) -> Result<(), GraphError> {
        let position = self
            .position(id)
            .unwrap_or_else(|| unreachable!("re-validation targets live clusters"));
        let cluster = self.clusters.remove(position);
        let members: Vec<N> = cluster.iter().cloned().collect();
        let cores = cluster.core_nodes().clone();

        let mut remaining = cores.clone();
        let mut survivors: Vec<Cluster<N>> = Vec::new();
        while let Some(seed) = remaining.iter().next().cloned() {
            remaining.remove(&seed);
            let mut component: HashSet<N> = HashSet::new();
            component.insert(seed.clone());
            let mut frontier = vec![seed];
            while let Some(core) = frontier.pop() {
                for neighbour in self.neighbourhood(&core)? {
                    if remaining.remove(&neighbour) {
                        component.insert(neighbour.clone());
                        frontier.push(neighbour);
                    }
                }
            }
            let mut survivor = Cluster::new(self.graph.id());
            for core in component {
                survivor.categorize(core, NodeRole::Core);
            }
            survivors.push(survivor);
        }

        for member in members {
            if cores.contains(&member) {
                continue;
            }
            let reachable: HashSet<N> = self.neighbourhood(&member)?.into_iter().collect();
            let mut attached = false;
            for survivor in &mut survivors {
                if survivor
                    .core_nodes()
                    .iter()
                    .any(|core| reachable.contains(core))
                {
                    survivor.categorize(member.clone(), NodeRole::Border);
                    attached = true;
                }
            }
            if !attached && !self.contains(&member) {
                self.noise.insert(member);
            }
        }

        match survivors.len() {
            0 => mt_log!(Level::Debug, "cluster {:?} destroyed", id),
            1 => {}
            parts => mt_log!(Level::Debug, "cluster {:?} split into {} parts", id, parts),
        }
        self.clusters.extend(survivors);
        Ok(())
    }
}

/// Two engines are equal if they agree on the parameters, the total size,
/// the noise set, and, up to order, the membership of every cluster. The
/// substrate instances themselves are not compared.
impl<N, U, G> PartialEq for Clustering<N, U, G>
where
    N: Eq + Hash + Clone,
    U: Number,
    G: Graph<N, U>,
{
    fn eq(&self, other: &Self) -> bool {
        if self.cluster_distance != other.cluster_distance
            || self.core_neighbours != other.core_neighbours
            || self.noise != other.noise
            || self.clusters.len() != other.clusters.len()
            || self.len() != other.len()
        {
            return false;
        }
        let mut matched = vec![false; other.clusters.len()];
        self.clusters.iter().all(|cluster| {
            other.clusters.iter().enumerate().any(|(index, candidate)| {
                if !matched[index] && cluster.same_membership(candidate) {
                    matched[index] = true;
                    true
                } else {
                    false
                }
            })
        })
    }
}
