//! Graphs storing distances via adjacency maps.

use std::collections::HashMap;
use std::hash::Hash;

use distances::Number;

use super::{Graph, GraphError, GraphId};

/// A graph with materialised edges, stored as nested adjacency maps.
///
/// The default construction is symmetric: `set_edge` and `delete_edge`
/// write both directions atomically. An asymmetric storage mode exists for
/// loading directed distance matrices (see [`crate::CsvMatrixReader`]); the
/// clustering engine itself expects symmetric substrates.
#[derive(Debug, Clone)]
pub struct AdjacencyGraph<N: Eq + Hash, U> {
    id: GraphId,
    adjacency: HashMap<N, HashMap<N, U>>,
    symmetric: bool,
}

impl<N: Eq + Hash + Clone, U: Number> AdjacencyGraph<N, U> {
    /// Creates an empty symmetric graph.
    pub fn new() -> Self {
        Self {
            id: GraphId::fresh(),
            adjacency: HashMap::new(),
            symmetric: true,
        }
    }

    /// Creates an empty graph whose edges are stored one direction at a
    /// time.
    pub fn asymmetric() -> Self {
        Self {
            id: GraphId::fresh(),
            adjacency: HashMap::new(),
            symmetric: false,
        }
    }

    /// Whether edge writes mirror both directions.
    pub const fn is_symmetric(&self) -> bool {
        self.symmetric
    }

    /// Creates a symmetric graph from a raw adjacency mapping.
    ///
    /// The mapping is taken as-is; callers are responsible for providing
    /// mirrored entries when symmetric reads are expected.
    pub fn from_adjacency(adjacency: HashMap<N, HashMap<N, U>>) -> Self {
        Self {
            id: GraphId::fresh(),
            adjacency,
            symmetric: true,
        }
    }

    /// Creates a symmetric graph from a raw adjacency mapping, dropping
    /// every edge heavier than `max_distance`.
    pub fn from_adjacency_bounded(adjacency: HashMap<N, HashMap<N, U>>, max_distance: U) -> Self {
        let adjacency = adjacency
            .into_iter()
            .map(|(node, neighbours)| {
                let neighbours = neighbours
                    .into_iter()
                    .filter(|(_, weight)| *weight <= max_distance)
                    .collect();
                (node, neighbours)
            })
            .collect();
        Self {
            id: GraphId::fresh(),
            adjacency,
            symmetric: true,
        }
    }

    /// Materialises any other graph, keeping edges within `max_distance`
    /// when a bound is given.
    pub fn from_graph<G: Graph<N, U>>(graph: &G, max_distance: Option<U>) -> Result<Self, GraphError> {
        let mut adjacency = HashMap::new();
        for node in graph.iter_nodes() {
            let neighbours = graph
                .neighbours(node, max_distance)?
                .into_iter()
                .collect::<HashMap<_, _>>();
            adjacency.insert(node.clone(), neighbours);
        }
        Ok(Self {
            id: GraphId::fresh(),
            adjacency,
            symmetric: true,
        })
    }

    /// Combines this graph with another into a new graph holding the union
    /// of nodes and edges.
    ///
    /// Err:
    ///
    /// * `ConflictingEdge` if the graphs disagree on the weight of a common
    ///   edge.
    /// * `InvalidArgument` if the graphs differ in symmetry mode.
    pub fn merged(&self, other: &Self) -> Result<Self, GraphError> {
        if self.symmetric != other.symmetric {
            return Err(GraphError::InvalidArgument(
                "cannot combine graphs of differing symmetry".to_string(),
            ));
        }
        let mut adjacency: HashMap<N, HashMap<N, U>> = self.adjacency.clone();
        for (node, neighbours) in &other.adjacency {
            let merged = adjacency.entry(node.clone()).or_default();
            for (neighbour, weight) in neighbours {
                match merged.get(neighbour) {
                    Some(existing) if existing != weight => {
                        return Err(GraphError::ConflictingEdge(
                            "graphs disagree on a common edge".to_string(),
                        ));
                    }
                    Some(_) => {}
                    None => {
                        merged.insert(neighbour.clone(), *weight);
                    }
                }
            }
        }
        Ok(Self {
            id: GraphId::fresh(),
            adjacency,
            symmetric: self.symmetric,
        })
    }
}

impl<N: Eq + Hash + Clone, U: Number> Default for AdjacencyGraph<N, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Eq + Hash + Clone, U: Number> Graph<N, U> for AdjacencyGraph<N, U> {
    fn id(&self) -> GraphId {
        self.id
    }

    fn len(&self) -> usize {
        self.adjacency.len()
    }

    fn contains(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    fn contains_edge(&self, a: &N, b: &N) -> bool {
        self.adjacency
            .get(a)
            .map_or(false, |neighbours| neighbours.contains_key(b))
    }

    fn iter_nodes(&self) -> Box<dyn Iterator<Item = &N> + '_> {
        Box::new(self.adjacency.keys())
    }

    fn edge(&self, a: &N, b: &N) -> Result<U, GraphError> {
        self.adjacency
            .get(a)
            .and_then(|neighbours| neighbours.get(b))
            .copied()
            .ok_or(GraphError::NoSuchEdge)
    }

    fn set_edge(&mut self, a: N, b: N, weight: U) -> Result<(), GraphError> {
        if !self.adjacency.contains_key(&a) || !self.adjacency.contains_key(&b) {
            return Err(GraphError::NoSuchNode);
        }
        if self.symmetric && a != b {
            self.adjacency
                .get_mut(&b)
                .unwrap_or_else(|| unreachable!("presence checked above"))
                .insert(a.clone(), weight);
        }
        self.adjacency
            .get_mut(&a)
            .unwrap_or_else(|| unreachable!("presence checked above"))
            .insert(b, weight);
        Ok(())
    }

    fn delete_edge(&mut self, a: &N, b: &N) -> Result<U, GraphError> {
        let weight = self
            .adjacency
            .get_mut(a)
            .and_then(|neighbours| neighbours.remove(b))
            .ok_or(GraphError::NoSuchEdge)?;
        if self.symmetric && a != b {
            if let Some(neighbours) = self.adjacency.get_mut(b) {
                neighbours.remove(a);
            }
        }
        Ok(weight)
    }

    fn insert_node(&mut self, node: N) {
        self.adjacency.entry(node).or_default();
    }

    fn set_adjacency(&mut self, node: N, adjacency: HashMap<N, U>) -> Result<(), GraphError> {
        self.insert_node(node.clone());
        for (neighbour, weight) in adjacency {
            self.set_edge(node.clone(), neighbour, weight)?;
        }
        Ok(())
    }

    fn delete_node(&mut self, node: &N) -> Result<(), GraphError> {
        let neighbours = self.adjacency.remove(node).ok_or(GraphError::NoSuchNode)?;
        if self.symmetric {
            for neighbour in neighbours.keys() {
                if let Some(adjacency) = self.adjacency.get_mut(neighbour) {
                    adjacency.remove(node);
                }
            }
        } else {
            for adjacency in self.adjacency.values_mut() {
                adjacency.remove(node);
            }
        }
        Ok(())
    }

    fn neighbours(&self, node: &N, limit: Option<U>) -> Result<Vec<(N, U)>, GraphError> {
        let adjacency = self.adjacency.get(node).ok_or(GraphError::NoSuchNode)?;
        Ok(adjacency
            .iter()
            .filter(|(neighbour, weight)| {
                *neighbour != node && limit.map_or(true, |limit| **weight <= limit)
            })
            .map(|(neighbour, weight)| (neighbour.clone(), *weight))
            .collect())
    }
}

/// An adjacency graph that records its maximum distance.
///
/// The bound is used to optimise storage and lookups: edges heavier than
/// `max_distance` are silently ignored on insertion, and neighbour queries
/// at or beyond the bound return the full adjacency without filtering.
#[derive(Debug, Clone)]
pub struct BoundedAdjacencyGraph<N: Eq + Hash, U> {
    base: AdjacencyGraph<N, U>,
    max_distance: U,
}

impl<N: Eq + Hash + Clone, U: Number> BoundedAdjacencyGraph<N, U> {
    /// Creates an empty symmetric graph keeping edges up to `max_distance`.
    pub fn new(max_distance: U) -> Self {
        Self {
            base: AdjacencyGraph::new(),
            max_distance,
        }
    }

    /// Creates a bounded graph from a raw adjacency mapping, dropping every
    /// edge heavier than `max_distance`.
    pub fn from_adjacency(adjacency: HashMap<N, HashMap<N, U>>, max_distance: U) -> Self {
        Self {
            base: AdjacencyGraph::from_adjacency_bounded(adjacency, max_distance),
            max_distance,
        }
    }

    /// The maximum distance stored by this graph.
    pub const fn max_distance(&self) -> U {
        self.max_distance
    }

    /// Combines this graph with another bounded graph of the same bound.
    ///
    /// Err:
    ///
    /// * `InvalidArgument` if the bounds differ.
    /// * `ConflictingEdge` if the graphs disagree on a common edge.
    pub fn merged(&self, other: &Self) -> Result<Self, GraphError> {
        if self.max_distance != other.max_distance {
            return Err(GraphError::InvalidArgument(
                "cannot combine graphs of differing distance bounds".to_string(),
            ));
        }
        Ok(Self {
            base: self.base.merged(&other.base)?,
            max_distance: self.max_distance,
        })
    }
}

impl<N: Eq + Hash + Clone, U: Number> Graph<N, U> for BoundedAdjacencyGraph<N, U> {
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
        self.base.contains_edge(a, b)
    }

    fn iter_nodes(&self) -> Box<dyn Iterator<Item = &N> + '_> {
        self.base.iter_nodes()
    }

    fn edge(&self, a: &N, b: &N) -> Result<U, GraphError> {
        self.base.edge(a, b)
    }

    fn set_edge(&mut self, a: N, b: N, weight: U) -> Result<(), GraphError> {
        if weight > self.max_distance {
            // The edge can never satisfy a neighbour query within the bound.
            return Ok(());
        }
        self.base.set_edge(a, b, weight)
    }

    fn delete_edge(&mut self, a: &N, b: &N) -> Result<U, GraphError> {
        self.base.delete_edge(a, b)
    }

    fn insert_node(&mut self, node: N) {
        self.base.insert_node(node);
    }

    fn set_adjacency(&mut self, node: N, adjacency: HashMap<N, U>) -> Result<(), GraphError> {
        self.base.insert_node(node.clone());
        for (neighbour, weight) in adjacency {
            self.set_edge(node.clone(), neighbour, weight)?;
        }
        Ok(())
    }

    fn delete_node(&mut self, node: &N) -> Result<(), GraphError> {
        self.base.delete_node(node)
    }

    fn neighbours(&self, node: &N, limit: Option<U>) -> Result<Vec<(N, U)>, GraphError> {
        match limit {
            // Every stored edge is within the bound already.
            Some(limit) if limit >= self.max_distance => self.base.neighbours(node, None),
            _ => self.base.neighbours(node, limit),
        }
    }
}
