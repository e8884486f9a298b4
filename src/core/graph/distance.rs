//! Graphs whose edges are computed on demand from a metric.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::marker::PhantomData;

use distances::Number;

use crate::metric::Metric;

use super::{Edge, Graph, GraphError, GraphId};

/// Access to the metric backing a computed-distance substrate.
///
/// The virtual-probe facet and the quality scorers require the substrate to
/// expose its metric; materialised adjacency stores have none.
pub trait MetricGraph<N, U: Number>: Graph<N, U> {
    /// The metric type computing edge weights.
    type Metric: Metric<N, U>;

    /// The metric backing this graph.
    fn metric(&self) -> &Self::Metric;
}

/// A graph holding nodes only; edge weights are computed from a metric.
///
/// Every pair of distinct nodes has an edge whose weight is the metric
/// distance between them. Edges cannot be stored or deleted: `set_edge`
/// and `delete_edge` are rejected with `InvalidArgument`.
#[derive(Debug, Clone)]
pub struct DistanceGraph<N: Eq + Hash, U, M> {
    id: GraphId,
    nodes: HashSet<N>,
    metric: M,
    weight: PhantomData<U>,
}

impl<N, U, M> DistanceGraph<N, U, M>
where
    N: Eq + Hash + Clone,
    U: Number,
    M: Metric<N, U>,
{
    /// Creates a graph over the given nodes, measured by `metric`.
    pub fn new(nodes: impl IntoIterator<Item = N>, metric: M) -> Self {
        Self {
            id: GraphId::fresh(),
            nodes: nodes.into_iter().collect(),
            metric,
            weight: PhantomData,
        }
    }

    /// Combines this graph with another over the union of their nodes.
    ///
    /// Both graphs must be measured by the same metric; the weights of
    /// common edges then agree by construction.
    pub fn merged(&self, other: &Self) -> Self
    where
        M: Clone,
    {
        Self {
            id: GraphId::fresh(),
            nodes: self.nodes.union(&other.nodes).cloned().collect(),
            metric: self.metric.clone(),
            weight: PhantomData,
        }
    }
}

impl<N, U, M> Graph<N, U> for DistanceGraph<N, U, M>
where
    N: Eq + Hash + Clone,
    U: Number,
    M: Metric<N, U>,
{
    fn id(&self) -> GraphId {
        self.id
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn contains(&self, node: &N) -> bool {
        self.nodes.contains(node)
    }

    fn contains_edge(&self, a: &N, b: &N) -> bool {
        self.nodes.contains(a) && self.nodes.contains(b)
    }

    fn iter_nodes(&self) -> Box<dyn Iterator<Item = &N> + '_> {
        Box::new(self.nodes.iter())
    }

    fn edge(&self, a: &N, b: &N) -> Result<U, GraphError> {
        if !self.contains_edge(a, b) {
            return Err(GraphError::NoSuchEdge);
        }
        self.metric.distance(a, b)
    }

    fn set_edge(&mut self, _a: N, _b: N, _weight: U) -> Result<(), GraphError> {
        Err(GraphError::InvalidArgument(
            "computed-distance graphs do not store edges".to_string(),
        ))
    }

    fn delete_edge(&mut self, _a: &N, _b: &N) -> Result<U, GraphError> {
        Err(GraphError::InvalidArgument(
            "computed-distance graphs do not store edges".to_string(),
        ))
    }

    fn insert_node(&mut self, node: N) {
        self.nodes.insert(node);
    }

    fn set_adjacency(&mut self, node: N, adjacency: HashMap<N, U>) -> Result<(), GraphError> {
        if !adjacency.is_empty() {
            return Err(GraphError::InvalidArgument(
                "computed-distance graphs do not store edges".to_string(),
            ));
        }
        self.nodes.insert(node);
        Ok(())
    }

    fn delete_node(&mut self, node: &N) -> Result<(), GraphError> {
        if self.nodes.remove(node) {
            Ok(())
        } else {
            Err(GraphError::NoSuchNode)
        }
    }

    fn neighbours(&self, node: &N, limit: Option<U>) -> Result<Vec<(N, U)>, GraphError> {
        if !self.nodes.contains(node) {
            return Err(GraphError::NoSuchNode);
        }
        let mut neighbours = Vec::new();
        for other in &self.nodes {
            if other == node {
                continue;
            }
            let weight = self.metric.distance(node, other)?;
            if limit.map_or(true, |limit| weight <= limit) {
                neighbours.push((other.clone(), weight));
            }
        }
        Ok(neighbours)
    }
}

impl<N, U, M> MetricGraph<N, U> for DistanceGraph<N, U, M>
where
    N: Eq + Hash + Clone,
    U: Number,
    M: Metric<N, U>,
{
    type Metric = M;

    fn metric(&self) -> &M {
        &self.metric
    }
}

/// A computed-distance graph that memoises its weights.
///
/// Computed weights are cached keyed by the unordered [`Edge`] pair.
/// Deleting an edge stores a tombstone: the pair then behaves as if no
/// edge existed at all (an infinite distance), and is excluded from every
/// neighbour query until the cache entry is dropped with the node.
#[derive(Debug, Clone)]
pub struct CachedDistanceGraph<N: Eq + Hash, U, M> {
    base: DistanceGraph<N, U, M>,
    cache: RefCell<HashMap<Edge<N>, Option<U>>>,
}

impl<N, U, M> CachedDistanceGraph<N, U, M>
where
    N: Eq + Hash + Clone,
    U: Number,
    M: Metric<N, U>,
{
    /// Creates a caching graph over the given nodes, measured by `metric`.
    pub fn new(nodes: impl IntoIterator<Item = N>, metric: M) -> Self {
        Self {
            base: DistanceGraph::new(nodes, metric),
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Combines this graph with another over the union of their nodes.
    ///
    /// Cached weights and tombstones are carried over from both sides.
    ///
    /// Err:
    ///
    /// * `ConflictingEdge` if the caches disagree on a common pair, e.g. a
    ///   weight on one side and a deletion tombstone on the other.
    pub fn merged(&self, other: &Self) -> Result<Self, GraphError>
    where
        M: Clone,
    {
        let mut cache = self.cache.borrow().clone();
        for (pair, weight) in other.cache.borrow().iter() {
            match cache.get(pair) {
                Some(existing) if existing != weight => {
                    return Err(GraphError::ConflictingEdge(
                        "caches disagree on a common edge".to_string(),
                    ));
                }
                Some(_) => {}
                None => {
                    cache.insert(pair.clone(), *weight);
                }
            }
        }
        Ok(Self {
            base: self.base.merged(&other.base),
            cache: RefCell::new(cache),
        })
    }
}

impl<N, U, M> Graph<N, U> for CachedDistanceGraph<N, U, M>
where
    N: Eq + Hash + Clone,
    U: Number,
    M: Metric<N, U>,
{
    fn id(&self) -> GraphId {
        self.base.id()
    }

    fn len(&self) -> usize {
        self.base.len()
    }

    fn contains(&self, node: &N) -> bool {
        self.base.contains(node)
    }

    fn contains_edge(&self, a: &N, b: &N) -> bool {
        self.edge(a, b).is_ok()
    }

    fn iter_nodes(&self) -> Box<dyn Iterator<Item = &N> + '_> {
        self.base.iter_nodes()
    }

    fn edge(&self, a: &N, b: &N) -> Result<U, GraphError> {
        let pair = Edge::new(a.clone(), b.clone());
        if let Some(cached) = self.cache.borrow().get(&pair) {
            return (*cached).ok_or(GraphError::NoSuchEdge);
        }
        let weight = self.base.edge(a, b)?;
        self.cache.borrow_mut().insert(pair, Some(weight));
        Ok(weight)
    }

    fn set_edge(&mut self, _a: N, _b: N, _weight: U) -> Result<(), GraphError> {
        Err(GraphError::InvalidArgument(
            "computed-distance graphs do not store edges".to_string(),
        ))
    }

    fn delete_edge(&mut self, a: &N, b: &N) -> Result<U, GraphError> {
        let weight = self.edge(a, b)?;
        self.cache
            .borrow_mut()
            .insert(Edge::new(a.clone(), b.clone()), None);
        Ok(weight)
    }

    fn insert_node(&mut self, node: N) {
        self.base.insert_node(node);
    }

    fn set_adjacency(&mut self, node: N, adjacency: HashMap<N, U>) -> Result<(), GraphError> {
        self.base.set_adjacency(node, adjacency)
    }

    fn delete_node(&mut self, node: &N) -> Result<(), GraphError> {
        self.base.delete_node(node)?;
        self.cache.borrow_mut().retain(|pair, _| !pair.contains(node));
        Ok(())
    }

    fn neighbours(&self, node: &N, limit: Option<U>) -> Result<Vec<(N, U)>, GraphError> {
        if !self.base.contains(node) {
            return Err(GraphError::NoSuchNode);
        }
        let others: Vec<N> = self
            .base
            .iter_nodes()
            .filter(|other| *other != node)
            .cloned()
            .collect();
        let mut neighbours = Vec::new();
        for other in others {
            match self.edge(node, &other) {
                Ok(weight) => {
                    if limit.map_or(true, |limit| weight <= limit) {
                        neighbours.push((other, weight));
                    }
                }
                // Tombstoned pairs read as "no edge".
                Err(GraphError::NoSuchEdge) => {}
                Err(error) => return Err(error),
            }
        }
        Ok(neighbours)
    }
}

impl<N, U, M> MetricGraph<N, U> for CachedDistanceGraph<N, U, M>
where
    N: Eq + Hash + Clone,
    U: Number,
    M: Metric<N, U>,
{
    type Metric = M;

    fn metric(&self) -> &M {
        self.base.metric()
    }
}
