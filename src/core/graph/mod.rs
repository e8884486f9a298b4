//! Provides the `Graph` trait, the `Edge` pair literal and the substrate
//! implementations.
//!
//! Graphs are modelled as containers of *nodes* and weighted *edges* between
//! pairs of nodes. The interface primarily works on nodes: `len` and
//! `iter_nodes` treat the graph as a node container, while edges are
//! addressed by their node pair. All substrates guarantee symmetric reads,
//! `edge(a, b) == edge(b, a)`, unless explicitly constructed asymmetric for
//! matrix loading.

pub mod adjacency;
pub mod distance;
pub mod io;

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use distances::Number;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced at the graph and clustering boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The named node is not part of the graph.
    #[error("no such node in graph")]
    NoSuchNode,
    /// No edge is defined between the given pair of nodes.
    #[error("no such edge in graph")]
    NoSuchEdge,
    /// The substrate has no metric capable of the requested operation.
    #[error("graph distance does not support this operation")]
    NoDistanceSupport,
    /// Clusters over different substrates cannot be combined.
    #[error("clusters belong to different graphs")]
    CrossGraph,
    /// A malformed argument, e.g. a ragged matrix row or an unparsable cell.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Two graphs disagree on the weight of a common edge.
    #[error("conflicting edge weights: {0}")]
    ConflictingEdge(String),
}

/// Identity of a substrate instance, unique for the life of the process.
///
/// Clusters record the id of the graph they were built over; combining
/// clusters across ids fails with [`GraphError::CrossGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct GraphId(u64);

impl GraphId {
    /// Returns a fresh, process-unique id for a new substrate.
    pub fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// An unordered pair of nodes addressing an edge independent of any graph.
///
/// Equality and hashing are symmetric in the two endpoints, so
/// `Edge::new(a, b) == Edge::new(b, a)` and both land in the same hash
/// bucket. Nodes themselves are a distinct type from `Edge`, so a node can
/// never be mistaken for an edge identifier.
#[derive(Debug, Clone)]
pub struct Edge<N> {
    /// One endpoint of the edge.
    pub left: N,
    /// The other endpoint of the edge.
    pub right: N,
}

impl<N> Edge<N> {
    /// Creates the pair literal for the edge between `left` and `right`.
    pub fn new(left: N, right: N) -> Self {
        Self { left, right }
    }

    /// A 2-slice of the nodes in this pair.
    pub const fn nodes(&self) -> [&N; 2] {
        [&self.left, &self.right]
    }

    /// Whether this is a pair from a node to itself.
    pub fn is_circular(&self) -> bool
    where
        N: PartialEq,
    {
        self.left == self.right
    }

    /// Whether this pair has the given node at one of its ends.
    pub fn contains(&self, node: &N) -> bool
    where
        N: PartialEq,
    {
        *node == self.left || *node == self.right
    }

    /// Returns the endpoint opposite to the given node.
    ///
    /// Err:
    ///
    /// * If `node` is not one of the endpoints of this pair.
    pub fn other(&self, node: &N) -> Result<&N, GraphError>
    where
        N: PartialEq,
    {
        if *node == self.left {
            Ok(&self.right)
        } else if *node == self.right {
            Ok(&self.left)
        } else {
            Err(GraphError::InvalidArgument(
                "node is not an endpoint of this edge".to_string(),
            ))
        }
    }
}

impl<N: PartialEq> PartialEq for Edge<N> {
    fn eq(&self, other: &Self) -> bool {
        (self.left == other.left && self.right == other.right)
            || (self.left == other.right && self.right == other.left)
    }
}

impl<N: Eq> Eq for Edge<N> {}

impl<N: Hash> Hash for Edge<N> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Endpoint digests are combined commutatively so that the hash is
        // independent of endpoint order, consistent with `PartialEq`.
        let mut left = DefaultHasher::new();
        self.left.hash(&mut left);
        let mut right = DefaultHasher::new();
        self.right.hash(&mut right);
        state.write_u64(left.finish().wrapping_add(right.finish()));
    }
}

impl<N: fmt::Display> fmt::Display for Edge<N> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -- {}", self.left, self.right)
    }
}

/// A container of nodes and weighted edges between pairs of nodes.
///
/// Edge weights are nonnegative distances; a neighbour query bounded by a
/// distance is the primitive the clustering engine is built on. A `limit`
/// of `None` means "any distance".
pub trait Graph<N, U: Number> {
    /// The identity of this substrate instance.
    fn id(&self) -> GraphId;

    /// Returns the number of nodes in the graph.
    fn len(&self) -> usize;

    /// Whether the graph holds no nodes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the given node is part of the graph.
    fn contains(&self, node: &N) -> bool;

    /// Whether an edge is defined between the two nodes.
    fn contains_edge(&self, a: &N, b: &N) -> bool;

    /// Whether an edge is defined for the given pair literal.
    fn contains_pair(&self, pair: &Edge<N>) -> bool {
        self.contains_edge(&pair.left, &pair.right)
    }

    /// Iterates over the nodes of the graph in an unspecified but, for a
    /// single traversal, stable order.
    fn iter_nodes(&self) -> Box<dyn Iterator<Item = &N> + '_>;

    /// Returns the weight of the edge between `a` and `b`.
    ///
    /// Err:
    ///
    /// * `NoSuchEdge` if no edge is defined for the pair.
    fn edge(&self, a: &N, b: &N) -> Result<U, GraphError>;

    /// Stores or updates the edge between `a` and `b`.
    ///
    /// Symmetric substrates store both directions atomically.
    ///
    /// Err:
    ///
    /// * `NoSuchNode` if either endpoint is not part of the graph.
    fn set_edge(&mut self, a: N, b: N, weight: U) -> Result<(), GraphError>;

    /// Removes the edge between `a` and `b`, returning its weight.
    ///
    /// Err:
    ///
    /// * `NoSuchEdge` if no edge is defined for the pair.
    fn delete_edge(&mut self, a: &N, b: &N) -> Result<U, GraphError>;

    /// Adds a node without edges. Inserting a present node is a no-op.
    fn insert_node(&mut self, node: N);

    /// Adds a node together with its adjacency, inserting the node if it is
    /// absent and storing every given edge.
    ///
    /// Err:
    ///
    /// * `NoSuchNode` if a neighbour in `adjacency` is not part of the graph.
    fn set_adjacency(&mut self, node: N, adjacency: HashMap<N, U>) -> Result<(), GraphError>;

    /// Removes the node and every edge incident to it.
    ///
    /// Err:
    ///
    /// * `NoSuchNode` if the node is not part of the graph.
    fn delete_node(&mut self, node: &N) -> Result<(), GraphError>;

    /// Yields every node `u != node` with `edge(node, u) <= limit`, together
    /// with the edge weight. A `limit` of `None` yields all neighbours. The
    /// node itself is never yielded, even if a self-edge is stored.
    ///
    /// Err:
    ///
    /// * `NoSuchNode` if `node` is not part of the graph.
    fn neighbours(&self, node: &N, limit: Option<U>) -> Result<Vec<(N, U)>, GraphError>;
}
