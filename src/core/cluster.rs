//! The cluster value: two disjoint node sets over a fixed substrate.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use distances::Number;
use serde::{Deserialize, Serialize};

use super::graph::{Graph, GraphError, GraphId};

/// The role a node plays within a cluster.
///
/// Unassigned nodes are simply absent from every cluster; there is no
/// stored sentinel for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeRole {
    /// A node with at least `core_neighbours` neighbours within the
    /// clustering distance. A node is core in at most one cluster.
    Core,
    /// A non-core node within the clustering distance of at least one core.
    /// A node may be border in any number of clusters; this is how clusters
    /// overlap.
    Border,
}

/// Identity of a cluster, stable for the life of the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClusterId(u64);

impl ClusterId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A cluster over a fixed substrate: a set of core nodes and a disjoint set
/// of border nodes.
///
/// The cluster borrows its substrate by identity only; operations that need
/// edge data take the graph as an argument and verify it is the cluster's
/// substrate.
#[derive(Debug, Clone)]
pub struct Cluster<N: Eq + Hash> {
    id: ClusterId,
    graph: GraphId,
    core_nodes: HashSet<N>,
    border_nodes: HashSet<N>,
}

impl<N: Eq + Hash + Clone> Cluster<N> {
    /// Creates an empty cluster over the substrate identified by `graph`.
    pub fn new(graph: GraphId) -> Self {
        Self {
            id: ClusterId::fresh(),
            graph,
            core_nodes: HashSet::new(),
            border_nodes: HashSet::new(),
        }
    }

    /// The identity of this cluster.
    pub const fn id(&self) -> ClusterId {
        self.id
    }

    /// The identity of the substrate this cluster was built over.
    pub const fn graph_id(&self) -> GraphId {
        self.graph
    }

    /// Ensures the node is in exactly the named role set, removing it from
    /// the other set if present.
    pub fn categorize(&mut self, node: N, role: NodeRole) {
        match role {
            NodeRole::Core => {
                self.border_nodes.remove(&node);
                self.core_nodes.insert(node);
            }
            NodeRole::Border => {
                self.core_nodes.remove(&node);
                self.border_nodes.insert(node);
            }
        }
    }

    /// Returns the role of the node within this cluster, if any.
    pub fn role(&self, node: &N) -> Option<NodeRole> {
        if self.core_nodes.contains(node) {
            Some(NodeRole::Core)
        } else if self.border_nodes.contains(node) {
            Some(NodeRole::Border)
        } else {
            None
        }
    }

    /// Whether the node is a member of this cluster, in either role.
    pub fn contains(&self, node: &N) -> bool {
        self.core_nodes.contains(node) || self.border_nodes.contains(node)
    }

    /// Returns the number of members, cores and borders combined.
    pub fn len(&self) -> usize {
        self.core_nodes.len() + self.border_nodes.len()
    }

    /// Whether the cluster has no members.
    pub fn is_empty(&self) -> bool {
        self.core_nodes.is_empty() && self.border_nodes.is_empty()
    }

    /// The core nodes of this cluster.
    pub const fn core_nodes(&self) -> &HashSet<N> {
        &self.core_nodes
    }

    /// The border nodes of this cluster.
    pub const fn border_nodes(&self) -> &HashSet<N> {
        &self.border_nodes
    }

    /// Iterates over the members, cores first, then borders.
    pub fn iter(&self) -> impl Iterator<Item = &N> + '_ {
        self.core_nodes.iter().chain(self.border_nodes.iter())
    }

    /// Removes a node from whichever role set holds it.
    pub(crate) fn discard(&mut self, node: &N) {
        self.core_nodes.remove(node);
        self.border_nodes.remove(node);
    }

    /// Returns the weight of the edge between two members.
    ///
    /// Err:
    ///
    /// * `CrossGraph` if `graph` is not this cluster's substrate.
    /// * `NoSuchEdge` unless both endpoints are members of the cluster.
    pub fn edge_between<U, G>(&self, graph: &G, a: &N, b: &N) -> Result<U, GraphError>
    where
        U: Number,
        G: Graph<N, U>,
    {
        if graph.id() != self.graph {
            return Err(GraphError::CrossGraph);
        }
        if !self.contains(a) || !self.contains(b) {
            return Err(GraphError::NoSuchEdge);
        }
        graph.edge(a, b)
    }

    /// Yields the members of this cluster within `limit` of the given node.
    ///
    /// Err:
    ///
    /// * `CrossGraph` if `graph` is not this cluster's substrate.
    /// * `NoSuchNode` if the node is not part of the graph.
    pub fn neighbours_within<U, G>(
        &self,
        graph: &G,
        node: &N,
        limit: Option<U>,
    ) -> Result<Vec<(N, U)>, GraphError>
    where
        U: Number,
        G: Graph<N, U>,
    {
        if graph.id() != self.graph {
            return Err(GraphError::CrossGraph);
        }
        Ok(graph
            .neighbours(node, limit)?
            .into_iter()
            .filter(|(neighbour, _)| self.contains(neighbour))
            .collect())
    }

    /// Merges another cluster into this one: cores union, borders union,
    /// with the resulting core set subtracted from the borders to keep the
    /// roles disjoint. Merging a cluster with itself is a no-op.
    ///
    /// Err:
    ///
    /// * `CrossGraph` if the clusters were built over different substrates.
    pub fn merge_from(&mut self, other: &Cluster<N>) -> Result<(), GraphError> {
        if self.graph != other.graph {
            return Err(GraphError::CrossGraph);
        }
        if self.id == other.id {
            return Ok(());
        }
        self.core_nodes.extend(other.core_nodes.iter().cloned());
        self.border_nodes.extend(other.border_nodes.iter().cloned());
        let core_nodes = &self.core_nodes;
        self.border_nodes.retain(|node| !core_nodes.contains(node));
        Ok(())
    }

    /// Removes another cluster's members from this one.
    ///
    /// Err:
    ///
    /// * `CrossGraph` if the clusters were built over different substrates.
    /// * `NoSuchNode` if a core of `other` is not a core of this cluster.
    pub fn subtract(&mut self, other: &Cluster<N>) -> Result<(), GraphError> {
        if self.graph != other.graph {
            return Err(GraphError::CrossGraph);
        }
        if !other.core_nodes.is_subset(&self.core_nodes) {
            return Err(GraphError::NoSuchNode);
        }
        for core in &other.core_nodes {
            self.core_nodes.remove(core);
        }
        for border in &other.border_nodes {
            self.border_nodes.remove(border);
        }
        Ok(())
    }

    /// Whether both role sets are equal, regardless of substrate identity.
    ///
    /// Engine equality compares clusters across substrate instances with
    /// this; [`PartialEq`] on clusters additionally requires the same
    /// substrate.
    pub fn same_membership(&self, other: &Cluster<N>) -> bool {
        self.core_nodes == other.core_nodes && self.border_nodes == other.border_nodes
    }

    /// Produces an immutable, hashable snapshot of this cluster.
    pub fn freeze(&self) -> FrozenCluster<N> {
        FrozenCluster {
            graph: self.graph,
            core_nodes: self.core_nodes.clone(),
            border_nodes: self.border_nodes.clone(),
        }
    }
}

/// Two clusters are equal if they hold the same role sets over the same
/// substrate.
impl<N: Eq + Hash + Clone> PartialEq for Cluster<N> {
    fn eq(&self, other: &Self) -> bool {
        self.graph == other.graph && self.same_membership(other)
    }
}

impl<N: Eq + Hash + Clone> Eq for Cluster<N> {}

/// An immutable, hashable snapshot of a cluster.
///
/// The role sets of a frozen cluster cannot change; there simply is no
/// mutating operation. This makes it usable as a key in hash-based
/// containers, e.g. for memoising per-cluster scores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrozenCluster<N: Eq + Hash> {
    graph: GraphId,
    core_nodes: HashSet<N>,
    border_nodes: HashSet<N>,
}

impl<N: Eq + Hash> FrozenCluster<N> {
    /// The identity of the substrate the cluster was built over.
    pub const fn graph_id(&self) -> GraphId {
        self.graph
    }

    /// The core nodes of the snapshot.
    pub const fn core_nodes(&self) -> &HashSet<N> {
        &self.core_nodes
    }

    /// The border nodes of the snapshot.
    pub const fn border_nodes(&self) -> &HashSet<N> {
        &self.border_nodes
    }

    /// Returns the number of members, cores and borders combined.
    pub fn len(&self) -> usize {
        self.core_nodes.len() + self.border_nodes.len()
    }

    /// Whether the snapshot has no members.
    pub fn is_empty(&self) -> bool {
        self.core_nodes.is_empty() && self.border_nodes.is_empty()
    }

    /// Whether the node was a member of the cluster, in either role.
    pub fn contains(&self, node: &N) -> bool {
        self.core_nodes.contains(node) || self.border_nodes.contains(node)
    }

    /// Iterates over the members, cores first, then borders.
    pub fn iter(&self) -> impl Iterator<Item = &N> + '_ {
        self.core_nodes.iter().chain(self.border_nodes.iter())
    }
}

impl<N: Eq + Hash> Hash for FrozenCluster<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Set digests are order-independent sums of per-element hashes, so
        // equal snapshots hash equally regardless of set iteration order.
        fn digest<N: Hash>(set: &HashSet<N>) -> u64 {
            set.iter()
                .map(|node| {
                    let mut hasher = DefaultHasher::new();
                    node.hash(&mut hasher);
                    hasher.finish()
                })
                .fold(0, u64::wrapping_add)
        }
        self.graph.hash(state);
        state.write_u64(digest(&self.core_nodes));
        state.write_u64(digest(&self.border_nodes));
    }
}
